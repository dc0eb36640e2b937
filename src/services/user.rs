//! User service implementation
//!
//! Registration on first contact, referral attribution and language
//! preference management.

use tracing::info;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::models::User;
use crate::utils::errors::{LeadflowError, Result};

/// User management service
#[derive(Debug, Clone)]
pub struct UserService {
    db: DatabaseService,
    settings: Settings,
}

impl UserService {
    pub fn new(db: DatabaseService, settings: Settings) -> Self {
        Self { db, settings }
    }

    /// Register a user on first contact or return the existing row.
    /// The inviter's referral counter is bumped only on actual creation.
    pub async fn register_or_get(
        &self,
        id: i64,
        username: Option<String>,
        full_name: Option<String>,
        language_code: Option<String>,
        invited_by: Option<i64>,
    ) -> Result<User> {
        let user = self
            .db
            .initialize_user(id, username, full_name, language_code, invited_by)
            .await?;

        Ok(user)
    }

    /// Look up a user by Telegram id
    pub async fn find(&self, id: i64) -> Result<Option<User>> {
        self.db.users.find_by_id(id).await
    }

    /// Persist the user's language choice
    pub async fn set_language(&self, id: i64, language_code: &str) -> Result<User> {
        let user = self
            .db
            .users
            .set_language(id, language_code)
            .await?
            .ok_or(LeadflowError::UserNotFound { user_id: id })?;

        info!(user_id = id, language = language_code, "User language updated");
        Ok(user)
    }

    /// Preferred language of a known user, falling back to the default
    pub async fn language_of(&self, id: i64) -> Result<String> {
        let language = self
            .db
            .users
            .find_by_id(id)
            .await?
            .map(|user| user.language_code)
            .unwrap_or_else(|| self.settings.i18n.default_language.clone());

        Ok(language)
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.settings.is_admin(user_id)
    }

    /// Admin username for the direct-contact button
    pub fn admin_username(&self) -> &str {
        &self.settings.bot.admin_username
    }
}
