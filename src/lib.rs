//! Leadflow Telegram Bot
//!
//! A business-facing Telegram bot that collects leads through a multi-step
//! intake form, stores orders in Postgres, exposes an admin HTTP API with a
//! pocket-CRM dashboard and answers free-text questions through a hosted
//! LLM with persisted per-user chat history.

pub mod api;
pub mod config;
pub mod database;
pub mod handlers;
pub mod i18n;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{LeadflowError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use i18n::I18n;
pub use services::ServiceFactory;
pub use state::StateStorage;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
