//! HTTP error mapping for the admin API
//!
//! Domain errors are translated to consistent JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::utils::errors::LeadflowError;

/// Application-level error type for HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values
pub type ApiResult<T> = Result<T, ApiError>;

impl From<LeadflowError> for ApiError {
    fn from(err: LeadflowError) -> Self {
        match err {
            LeadflowError::OrderNotFound { order_id } => {
                ApiError::NotFound(format!("order {}", order_id))
            }
            LeadflowError::ProductNotFound { product_id } => {
                ApiError::NotFound(format!("product {}", product_id))
            }
            LeadflowError::UserNotFound { user_id } => {
                ApiError::NotFound(format!("user {}", user_id))
            }
            LeadflowError::InvalidInput(msg) => ApiError::BadRequest(msg),
            LeadflowError::PermissionDenied(_) => ApiError::Unauthorized,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid X-Telegram-User header".to_string(),
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal API error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_mapping() {
        assert!(matches!(
            ApiError::from(LeadflowError::OrderNotFound { order_id: 5 }),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(LeadflowError::InvalidInput("bad".to_string())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(LeadflowError::PermissionDenied("api".to_string())),
            ApiError::Unauthorized
        ));
    }
}
