//! AI chat responder backed by Gemini
//!
//! Idle-state messages are answered by the Gemini `generateContent` REST
//! endpoint with a fixed consultant persona and the user's recent history
//! as context. When the backend is unconfigured or fails, the user gets a
//! canned apology and the turn is not recorded.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AiConfig;
use crate::database::DatabaseService;
use crate::models::{ChatMessage, MessageRole};
use crate::utils::errors::{AiError, Result};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Consultant persona injected as the system instruction on every request.
const SYSTEM_PROMPT: &str = "Ты — ассистент разработчика Telegram-ботов для бизнеса. \
Отвечай кратко и по делу, на языке собеседника. Помогай с вопросами об автоматизации \
продаж, записи клиентов и чат-ботах поддержки. Если вопрос про цену или сроки, \
предложи оставить заявку через меню бота. Не выдумывай услуги, которых нет.";

const APOLOGY_RU: &str =
    "Извините, сейчас не могу ответить 😔 Попробуйте позже или оставьте заявку через меню.";
const APOLOGY_EN: &str =
    "Sorry, I can't answer right now 😔 Try again later or leave a request via the menu.";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: ContentPart,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct ContentPart {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// Thin client over the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout_seconds: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
            model,
        })
    }

    /// Point the client at a different host (tests).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// One completion: history plus the new user turn, persona attached.
    pub async fn generate(
        &self,
        history: &[ChatMessage],
        user_text: &str,
    ) -> std::result::Result<String, AiError> {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|m| Content {
                role: m.role.as_str().to_string(),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();
        contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: user_text.to_string(),
            }],
        });

        let request = GenerateRequest {
            system_instruction: ContentPart {
                parts: vec![Part {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
            contents,
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(AiError::RequestFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AiError::InvalidResponse("empty candidate list".to_string()))
    }
}

/// AI responder service
#[derive(Debug, Clone)]
pub struct AiService {
    db: DatabaseService,
    client: Option<GeminiClient>,
    history_limit: i64,
}

impl AiService {
    /// Create the service; a missing API key yields a disabled backend.
    pub fn new(db: DatabaseService, config: &AiConfig) -> Result<Self> {
        let client = match &config.api_key {
            Some(key) if !key.trim().is_empty() => Some(GeminiClient::new(
                key.clone(),
                config.model.clone(),
                config.timeout_seconds,
            )?),
            _ => {
                warn!("AI backend not configured, idle chat will use the canned apology");
                None
            }
        };

        Ok(Self {
            db,
            client,
            history_limit: config.history_limit,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Answer one idle-state message. Never fails toward the user: any
    /// backend problem turns into the apology, and failed turns are not
    /// persisted into history.
    pub async fn respond(&self, user_id: i64, text: &str, language: &str) -> String {
        let client = match &self.client {
            Some(client) => client,
            None => return apology(language).to_string(),
        };

        let history = match self.db.messages.recent_history(user_id, self.history_limit).await {
            Ok(history) => history,
            Err(e) => {
                warn!(user_id = user_id, error = %e, "Failed to load chat history");
                Vec::new()
            }
        };

        match client.generate(&history, text).await {
            Ok(reply) => {
                debug!(user_id = user_id, "AI reply generated");
                // Both turns are recorded only after a successful completion
                if let Err(e) = self.db.messages.append(user_id, MessageRole::User, text).await {
                    warn!(user_id = user_id, error = %e, "Failed to persist user turn");
                }
                if let Err(e) = self
                    .db
                    .messages
                    .append(user_id, MessageRole::Model, &reply)
                    .await
                {
                    warn!(user_id = user_id, error = %e, "Failed to persist model turn");
                }
                reply
            }
            Err(e) => {
                warn!(user_id = user_id, error = %e, "AI backend failed, sending apology");
                apology(language).to_string()
            }
        }
    }
}

fn apology(language: &str) -> &'static str {
    match language {
        "en" => APOLOGY_EN,
        _ => APOLOGY_RU,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apology_language_selection() {
        assert_eq!(apology("en"), APOLOGY_EN);
        assert_eq!(apology("ru"), APOLOGY_RU);
        assert_eq!(apology("de"), APOLOGY_RU);
    }

    #[test]
    fn test_request_serialization_shape() {
        let request = GenerateRequest {
            system_instruction: ContentPart {
                parts: vec![Part {
                    text: "persona".to_string(),
                }],
            },
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: "привет".to_string(),
                }],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("systemInstruction").is_some());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "привет");
    }

    #[test]
    fn test_response_parsing_tolerates_missing_candidates() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
