//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A bot user. `id` is the Telegram user id; users are created on first
/// contact and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub language_code: String,
    pub invited_by: Option<i64>,
    pub referral_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub language_code: Option<String>,
    pub invited_by: Option<i64>,
}
