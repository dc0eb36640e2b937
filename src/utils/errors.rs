//! Error handling for Leadflow
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the Leadflow application
#[derive(Error, Debug)]
pub enum LeadflowError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("AI backend error: {0}")]
    Ai(#[from] AiError),

    #[error("Sheets relay error: {0}")]
    Sheets(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: i64 },

    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: i64 },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Gemini backend specific errors
#[derive(Error, Debug)]
pub enum AiError {
    #[error("AI request failed: {0}")]
    RequestFailed(String),

    #[error("AI request timed out")]
    Timeout,

    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),

    #[error("AI backend is not configured")]
    NotConfigured,
}

/// Result type alias for Leadflow operations
pub type Result<T> = std::result::Result<T, LeadflowError>;

impl LeadflowError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            LeadflowError::Database(_) => false,
            LeadflowError::Migration(_) => false,
            LeadflowError::Telegram(_) => true,
            LeadflowError::Ai(_) => true,
            LeadflowError::Sheets(_) => true,
            LeadflowError::Config(_) => false,
            LeadflowError::PermissionDenied(_) => false,
            LeadflowError::UserNotFound { .. } => false,
            LeadflowError::OrderNotFound { .. } => false,
            LeadflowError::ProductNotFound { .. } => false,
            LeadflowError::Redis(_) => true,
            LeadflowError::Http(_) => true,
            LeadflowError::Serialization(_) => false,
            LeadflowError::Io(_) => true,
            LeadflowError::UrlParse(_) => false,
            LeadflowError::InvalidInput(_) => false,
            LeadflowError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LeadflowError::Database(_) => ErrorSeverity::Critical,
            LeadflowError::Migration(_) => ErrorSeverity::Critical,
            LeadflowError::Config(_) => ErrorSeverity::Critical,
            LeadflowError::PermissionDenied(_) => ErrorSeverity::Warning,
            LeadflowError::InvalidInput(_) => ErrorSeverity::Info,
            LeadflowError::Ai(_) | LeadflowError::Sheets(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_effect_errors_are_recoverable() {
        assert!(LeadflowError::Sheets("relay down".to_string()).is_recoverable());
        assert!(LeadflowError::Ai(AiError::Timeout).is_recoverable());
        assert!(!LeadflowError::OrderNotFound { order_id: 1 }.is_recoverable());
    }

    #[test]
    fn test_severity_classification() {
        assert_eq!(
            LeadflowError::Config("missing token".to_string()).severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            LeadflowError::Ai(AiError::NotConfigured).severity(),
            ErrorSeverity::Warning
        );
    }
}
