//! Health check endpoint

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::api::ApiState;
use crate::database;

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
}

async fn health(State(state): State<ApiState>) -> Json<Value> {
    let db_healthy = database::health_check(&state.pool).await.is_ok();

    Json(json!({
        "status": if db_healthy { "ok" } else { "degraded" },
        "database": db_healthy,
        "version": crate::VERSION,
    }))
}
