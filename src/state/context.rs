//! Conversation context management
//!
//! Tracks the per-user intake flow position and the in-flight form
//! accumulator. The context lives only in the short-TTL state store; an
//! aborted form has no business value and is never persisted durably.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::state::intake::IntakeStep;
use crate::utils::errors::Result;

/// Per-user conversation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    /// User this context belongs to
    pub user_id: i64,
    /// Current intake step, `None` when the user is idle
    pub step: Option<IntakeStep>,
    /// Captured form fields, keyed by field name
    pub data: HashMap<String, serde_json::Value>,
    /// When this context expires (for cleanup)
    pub expires_at: Option<DateTime<Utc>>,
    /// When this context was last updated
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    /// Create a new, idle conversation context for a user
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            step: None,
            data: HashMap::new(),
            expires_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Begin the intake flow, discarding any previous accumulator
    pub fn start_intake(&mut self) {
        self.step = Some(IntakeStep::CollectingName);
        self.data.clear();
        self.updated_at = Utc::now();
        self.expires_at = Some(Utc::now() + Duration::hours(24));
    }

    /// Advance to the given step
    pub fn set_step(&mut self, step: IntakeStep) {
        self.step = Some(step);
        self.updated_at = Utc::now();
    }

    /// Cancel the flow and drop the accumulator. Side-effect free: nothing
    /// has been persisted yet.
    pub fn cancel(&mut self) {
        self.step = None;
        self.data.clear();
        self.expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Whether the user currently has an active intake flow
    pub fn is_idle(&self) -> bool {
        self.step.is_none()
    }

    /// Store a captured field value
    pub fn set_field<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        self.data.insert(key.to_string(), json_value);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Get a captured field as a string
    pub fn get_field(&self, key: &str) -> Option<String> {
        self.data
            .get(key)
            .and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    /// Check if context has expired
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Utc::now() > expires_at
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_is_idle() {
        let context = ConversationContext::new(123);
        assert_eq!(context.user_id, 123);
        assert!(context.is_idle());
        assert!(context.data.is_empty());
        assert!(context.expires_at.is_none());
    }

    #[test]
    fn test_start_intake() {
        let mut context = ConversationContext::new(123);
        context.start_intake();

        assert_eq!(context.step, Some(IntakeStep::CollectingName));
        assert!(context.expires_at.is_some());
        assert!(!context.is_idle());
    }

    #[test]
    fn test_cancel_discards_accumulator() {
        let mut context = ConversationContext::new(123);
        context.start_intake();
        context.set_field("name", "Ivan").unwrap();

        context.cancel();
        assert!(context.is_idle());
        assert!(context.data.is_empty());
    }

    #[test]
    fn test_field_round_trip() {
        let mut context = ConversationContext::new(123);
        context.set_field("name", "Ivan").unwrap();
        assert_eq!(context.get_field("name"), Some("Ivan".to_string()));
        assert_eq!(context.get_field("missing"), None);
    }

    #[test]
    fn test_expiry() {
        let mut context = ConversationContext::new(123);
        context.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(context.is_expired());

        context.expires_at = Some(Utc::now() + Duration::hours(1));
        assert!(!context.is_expired());
    }
}
