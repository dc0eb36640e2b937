//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{LeadflowError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_ai_config(&settings.ai)?;
    validate_i18n_config(&settings.i18n)?;
    validate_logging_config(&settings.logging)?;
    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(LeadflowError::Config("Bot token is required".to_string()));
    }

    if config.admin_id <= 0 {
        return Err(LeadflowError::Config(
            "Admin ID must be configured".to_string(),
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(LeadflowError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(LeadflowError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(LeadflowError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(LeadflowError::Config("Redis URL is required".to_string()));
    }

    Ok(())
}

/// Validate Gemini configuration
fn validate_ai_config(config: &super::AiConfig) -> Result<()> {
    if config.model.is_empty() {
        return Err(LeadflowError::Config("AI model name is required".to_string()));
    }

    if config.timeout_seconds == 0 {
        return Err(LeadflowError::Config(
            "AI timeout must be greater than 0".to_string(),
        ));
    }

    if config.history_limit <= 0 {
        return Err(LeadflowError::Config(
            "AI history limit must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate internationalization configuration
fn validate_i18n_config(config: &super::I18nConfig) -> Result<()> {
    if config.default_language.is_empty() {
        return Err(LeadflowError::Config(
            "Default language is required".to_string(),
        ));
    }

    if config.supported_languages.is_empty() {
        return Err(LeadflowError::Config(
            "At least one supported language is required".to_string(),
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(LeadflowError::Config(
            "Default language must be in supported languages list".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(LeadflowError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(LeadflowError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_need_token_and_admin() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.bot.token = "123:abc".to_string();
        settings.bot.admin_id = 42;
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut settings = Settings::default();
        settings.bot.token = "123:abc".to_string();
        settings.bot.admin_id = 42;
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
