//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub api: ApiConfig,
    pub ai: AiConfig,
    pub sheets: SheetsConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// Public base URL of the deployment; used for the WebApp dashboard
    /// link and logged as the webhook candidate.
    pub public_url: Option<String>,
    /// Admin who receives lead notifications and may use admin commands.
    pub admin_id: i64,
    /// Admin username (without @) for the direct-contact button.
    pub admin_username: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration for conversation state
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Admin API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the admin/shop dashboard static files.
    pub static_dir: String,
}

/// Gemini configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    /// Missing key disables the responder (canned apology instead).
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
    /// How many history turns are fed back as context.
    pub history_limit: i64,
}

/// Spreadsheet export relay configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsConfig {
    /// Apps Script relay that appends a row; unset disables the export.
    pub webhook_url: Option<String>,
    pub timeout_seconds: u64,
}

/// Internationalization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct I18nConfig {
    pub default_language: String,
    pub supported_languages: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("LEADFLOW").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::LeadflowError> {
        super::validation::validate_settings(self)
    }

    /// Check whether the given Telegram user id is the configured admin
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.bot.admin_id == user_id
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                public_url: None,
                admin_id: 0,
                admin_username: "admin".to_string(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/leadflow".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "leadflow:".to_string(),
                ttl_seconds: 3600,
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                static_dir: "static".to_string(),
            },
            ai: AiConfig {
                api_key: None,
                model: "gemini-2.0-flash".to_string(),
                timeout_seconds: 30,
                history_limit: 20,
            },
            sheets: SheetsConfig {
                webhook_url: None,
                timeout_seconds: 10,
            },
            i18n: I18nConfig {
                default_language: "ru".to_string(),
                supported_languages: vec!["ru".to_string(), "en".to_string()],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "./logs".to_string(),
            },
        }
    }
}
