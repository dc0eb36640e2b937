//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging
//! helpers for the Leadflow application.

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "leadflow.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a submitted lead with structured data
pub fn log_lead_submitted(user_id: i64, order_id: i64, service_context: &str) {
    info!(
        user_id = user_id,
        order_id = order_id,
        service_context = service_context,
        "Lead submitted"
    );
}

/// Log an order status change
pub fn log_status_change(order_id: i64, status: &str, notified: bool) {
    info!(
        order_id = order_id,
        status = status,
        client_notified = notified,
        "Order status changed"
    );
}

/// Log a broadcast run
pub fn log_broadcast(total: usize, sent: usize) {
    if sent < total {
        warn!(total = total, sent = sent, "Broadcast completed with failures");
    } else {
        info!(total = total, sent = sent, "Broadcast completed");
    }
}

/// Log a swallowed side-effect failure (notify/export)
pub fn log_side_effect_failure(effect: &str, error: &str) {
    error!(effect = effect, error = error, "Best-effort side effect failed");
}
