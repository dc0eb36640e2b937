//! Broadcast endpoint
//!
//! Sends a text to every distinct order owner; the response carries the
//! delivery tally.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::{authorize_admin, ApiError, ApiResult, ApiState};
use crate::services::BroadcastReport;

pub fn router() -> Router<ApiState> {
    Router::new().route("/broadcast", post(broadcast))
}

#[derive(Debug, Deserialize)]
struct BroadcastBody {
    message: String,
}

async fn broadcast(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<BroadcastBody>,
) -> ApiResult<Json<BroadcastReport>> {
    authorize_admin(&headers, &state.settings)?;

    let text = body.message.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("broadcast text is empty".to_string()));
    }

    let report = state.services.order_service.broadcast(text).await?;
    Ok(Json(report))
}
