//! Translation loader and i18n management
//!
//! Loads per-language JSON files from `translations/`, resolves nested keys
//! like `intake.ask_name` and formats `{param}` placeholders. Missing keys
//! fall back to the default language, then to the key itself.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tokio::fs;
use tracing::{error, info, warn};

use crate::config::I18nConfig;
use crate::utils::errors::{LeadflowError, Result};

/// Main internationalization manager
#[derive(Debug, Clone)]
pub struct I18n {
    translations: HashMap<String, Map<String, Value>>,
    default_language: String,
    supported_languages: Vec<String>,
}

/// Translation parameters for message formatting
pub type TranslationParams = HashMap<String, String>;

impl I18n {
    /// Create a new I18n instance
    pub fn new(config: &I18nConfig) -> Self {
        Self {
            translations: HashMap::new(),
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
        }
    }

    /// Load all translation files from the translations directory
    pub async fn load_translations(&mut self) -> Result<()> {
        let translations_dir = Path::new("translations");

        let supported_languages = self.supported_languages.clone();
        for lang_code in &supported_languages {
            let file_path = translations_dir.join(format!("{}.json", lang_code));

            if file_path.exists() {
                match self.load_language_file(&file_path, lang_code).await {
                    Ok(_) => info!("Loaded translations for language: {}", lang_code),
                    Err(e) => {
                        error!("Failed to load translations for {}: {}", lang_code, e);
                        if lang_code == &self.default_language {
                            return Err(LeadflowError::Config(format!(
                                "Failed to load default language translations: {}",
                                e
                            )));
                        }
                    }
                }
            } else {
                warn!("Translation file not found: {:?}", file_path);
                if lang_code == &self.default_language {
                    return Err(LeadflowError::Config(format!(
                        "Default language file missing: {:?}",
                        file_path
                    )));
                }
            }
        }

        Ok(())
    }

    async fn load_language_file(&mut self, path: &Path, lang_code: &str) -> Result<()> {
        let content = fs::read_to_string(path).await?;
        let parsed: Value = serde_json::from_str(&content)?;

        match parsed {
            Value::Object(map) => {
                self.translations.insert(lang_code.to_string(), map);
                Ok(())
            }
            _ => Err(LeadflowError::Config(format!(
                "Translation file {:?} must contain a JSON object",
                path
            ))),
        }
    }

    /// Get a translated message
    pub fn t(&self, key: &str, lang: &str, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.effective_language(lang);

        match self.lookup(key, &effective_lang) {
            Some(text) => Self::format_message(&text, params),
            None => {
                if effective_lang != self.default_language {
                    if let Some(text) = self.lookup(key, &self.default_language) {
                        return Self::format_message(&text, params);
                    }
                }
                warn!("Translation key '{}' not found", key);
                key.to_string()
            }
        }
    }

    /// Check if a language is supported
    pub fn is_language_supported(&self, lang: &str) -> bool {
        self.supported_languages.contains(&lang.to_string())
    }

    /// Pick the best language for a Telegram language code
    pub fn detect_user_language(&self, telegram_language_code: Option<&str>) -> String {
        match telegram_language_code {
            Some(code) if self.is_language_supported(code) => code.to_string(),
            _ => self.default_language.clone(),
        }
    }

    fn effective_language(&self, lang: &str) -> String {
        if self.is_language_supported(lang) && self.translations.contains_key(lang) {
            lang.to_string()
        } else {
            self.default_language.clone()
        }
    }

    fn lookup(&self, key: &str, lang: &str) -> Option<String> {
        let translations = self.translations.get(lang)?;

        let mut current = Value::Object(translations.clone());
        for k in key.split('.') {
            current = current.get(k)?.clone();
        }

        current.as_str().map(|s| s.to_string())
    }

    fn format_message(text: &str, params: Option<&TranslationParams>) -> String {
        match params {
            Some(params) => {
                let mut result = text.to_string();
                for (name, value) in params {
                    result = result.replace(&format!("{{{}}}", name), value);
                }
                result
            }
            None => text.to_string(),
        }
    }

    /// Insert translations directly, bypassing file loading (tests)
    #[cfg(test)]
    pub fn with_translations(
        config: &I18nConfig,
        translations: HashMap<String, Map<String, Value>>,
    ) -> Self {
        Self {
            translations,
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_i18n() -> I18n {
        let config = I18nConfig {
            default_language: "ru".to_string(),
            supported_languages: vec!["ru".to_string(), "en".to_string()],
        };

        let ru: Value = serde_json::json!({
            "intake": { "ask_name": "Как вас зовут?" },
            "greeting": "Привет, {name}!"
        });
        let en: Value = serde_json::json!({
            "intake": { "ask_name": "What is your name?" }
        });

        let mut translations = HashMap::new();
        translations.insert("ru".to_string(), ru.as_object().unwrap().clone());
        translations.insert("en".to_string(), en.as_object().unwrap().clone());

        I18n::with_translations(&config, translations)
    }

    #[test]
    fn test_nested_key_lookup() {
        let i18n = test_i18n();
        assert_eq!(i18n.t("intake.ask_name", "en", None), "What is your name?");
        assert_eq!(i18n.t("intake.ask_name", "ru", None), "Как вас зовут?");
    }

    #[test]
    fn test_fallback_to_default_language() {
        let i18n = test_i18n();
        // "greeting" only exists in ru
        let mut params = TranslationParams::new();
        params.insert("name".to_string(), "Ivan".to_string());
        assert_eq!(i18n.t("greeting", "en", Some(&params)), "Привет, Ivan!");
    }

    #[test]
    fn test_missing_key_returns_key() {
        let i18n = test_i18n();
        assert_eq!(i18n.t("missing.key", "ru", None), "missing.key");
    }

    #[test]
    fn test_detect_user_language() {
        let i18n = test_i18n();
        assert_eq!(i18n.detect_user_language(Some("en")), "en");
        assert_eq!(i18n.detect_user_language(Some("de")), "ru");
        assert_eq!(i18n.detect_user_language(None), "ru");
    }
}
