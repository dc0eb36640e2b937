//! Admin HTTP API and dashboard hosting
//!
//! Serves the CRM endpoints under `/api`, the storefront endpoints under
//! `/api/client`, and the static dashboard bundles under `/admin` and
//! `/shop`. Admin routes are gated by the `X-Telegram-User` header
//! matching the configured admin id.

pub mod error;
pub mod routes;

use axum::http::HeaderMap;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Settings;
use crate::database::{DatabasePool, DatabaseService};
use crate::services::ServiceFactory;
use crate::utils::errors::{LeadflowError, Result};

pub use error::{ApiError, ApiResult};

/// Shared state for all API handlers
#[derive(Debug, Clone)]
pub struct ApiState {
    pub pool: DatabasePool,
    pub db: DatabaseService,
    pub services: ServiceFactory,
    pub settings: Settings,
}

/// Build the full application router
pub fn build_router(state: ApiState) -> Router {
    let static_dir = state.settings.api.static_dir.clone();

    let api = Router::new()
        .merge(routes::stats::router())
        .merge(routes::orders::router())
        .merge(routes::products::router())
        .merge(routes::broadcast::router());

    Router::new()
        .merge(routes::health::router())
        .nest("/api", api)
        .nest("/api/client", routes::client::router())
        .nest_service("/admin", ServeDir::new(format!("{}/admin", static_dir)))
        .nest_service("/shop", ServeDir::new(format!("{}/shop", static_dir)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve the API until shutdown
pub async fn serve(state: ApiState) -> Result<()> {
    let addr = format!("{}:{}", state.settings.api.host, state.settings.api.port);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Admin API listening");

    axum::serve(listener, router)
        .await
        .map_err(LeadflowError::Io)?;

    Ok(())
}

/// Telegram user id taken from the `X-Telegram-User` header
pub(crate) fn caller_id(headers: &HeaderMap) -> ApiResult<i64> {
    headers
        .get("x-telegram-user")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .ok_or(ApiError::Unauthorized)
}

/// Gate for admin-only handlers: the `X-Telegram-User` header must carry
/// the configured admin's Telegram id.
pub(crate) fn authorize_admin(headers: &HeaderMap, settings: &Settings) -> ApiResult<()> {
    let caller = caller_id(headers)?;
    if settings.is_admin(caller) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn settings_with_admin(admin_id: i64) -> Settings {
        let mut settings = Settings::default();
        settings.bot.admin_id = admin_id;
        settings
    }

    #[test]
    fn test_matching_admin_header_passes() {
        let mut headers = HeaderMap::new();
        headers.insert("x-telegram-user", HeaderValue::from_static("42"));
        assert!(authorize_admin(&headers, &settings_with_admin(42)).is_ok());
    }

    #[test]
    fn test_mismatched_admin_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("x-telegram-user", HeaderValue::from_static("7"));
        assert!(matches!(
            authorize_admin(&headers, &settings_with_admin(42)),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_missing_or_garbled_header_is_rejected() {
        let empty = HeaderMap::new();
        assert!(matches!(caller_id(&empty), Err(ApiError::Unauthorized)));

        let mut garbled = HeaderMap::new();
        garbled.insert("x-telegram-user", HeaderValue::from_static("not-a-number"));
        assert!(matches!(caller_id(&garbled), Err(ApiError::Unauthorized)));
    }
}
