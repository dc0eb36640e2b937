//! Chat history repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::message::{ChatMessage, MessageRole};
use crate::utils::errors::LeadflowError;

#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one history turn
    pub async fn append(
        &self,
        user_id: i64,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage, LeadflowError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO messages (user_id, role, content, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, role, content, created_at
            "#,
        )
        .bind(user_id)
        .bind(role)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Most-recent `limit` turns, restored to chronological order for
    /// context assembly
    pub async fn recent_history(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, LeadflowError> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, user_id, role, content, created_at FROM (
                SELECT id, user_id, role, content, created_at
                FROM messages
                WHERE user_id = $1
                ORDER BY id DESC
                LIMIT $2
            ) recent
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
