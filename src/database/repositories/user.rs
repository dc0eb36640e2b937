//! User repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::user::{CreateUserRequest, User};
use crate::utils::errors::LeadflowError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, LeadflowError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, full_name, language_code, invited_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, full_name, language_code, invited_by, referral_count, created_at, updated_at
            "#,
        )
        .bind(request.id)
        .bind(request.username)
        .bind(request.full_name)
        .bind(request.language_code.unwrap_or_else(|| "ru".to_string()))
        .bind(request.invited_by)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by Telegram ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, LeadflowError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, full_name, language_code, invited_by, referral_count, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Set the user's language preference
    pub async fn set_language(&self, id: i64, language_code: &str) -> Result<Option<User>, LeadflowError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET language_code = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, username, full_name, language_code, invited_by, referral_count, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(language_code)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Increment the referral counter of the inviting user
    pub async fn increment_referral_count(&self, id: i64) -> Result<(), LeadflowError> {
        sqlx::query("UPDATE users SET referral_count = referral_count + 1, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64, LeadflowError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
