//! State storage implementation
//!
//! Persists conversation contexts in Redis with a TTL so abandoned forms
//! evaporate on their own. Contexts are JSON-serialized under a per-user
//! key.

use redis::AsyncCommands;
use tracing::{debug, error, warn};

use super::context::ConversationContext;
use crate::config::RedisConfig;
use crate::utils::errors::Result;

/// Redis-based state storage manager
#[derive(Clone)]
pub struct StateStorage {
    connection_manager: redis::aio::ConnectionManager,
    config: RedisConfig,
}

impl StateStorage {
    /// Create a new state storage instance
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// Save conversation context
    pub async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        let key = self.context_key(context.user_id);
        debug!(user_id = context.user_id, step = ?context.step, "Saving context");

        let serialized = serde_json::to_string(context)?;
        let mut conn = self.connection_manager.clone();

        let ttl_seconds = if let Some(expires_at) = context.expires_at {
            let duration = expires_at - chrono::Utc::now();
            std::cmp::max(duration.num_seconds(), 60) as u64
        } else {
            self.config.ttl_seconds
        };

        match conn.set_ex::<_, _, ()>(&key, serialized, ttl_seconds).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(user_id = context.user_id, error = %e, "Failed to save context");
                Err(e.into())
            }
        }
    }

    /// Load conversation context, dropping it if it has expired
    pub async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>> {
        let key = self.context_key(user_id);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = conn.get(&key).await?;

        match serialized {
            Some(data) => {
                let context: ConversationContext = serde_json::from_str(&data)?;

                if context.is_expired() {
                    warn!(user_id = user_id, "Context has expired, removing");
                    self.delete_context(user_id).await?;
                    return Ok(None);
                }

                Ok(Some(context))
            }
            None => Ok(None),
        }
    }

    /// Delete conversation context
    pub async fn delete_context(&self, user_id: i64) -> Result<()> {
        let key = self.context_key(user_id);
        let mut conn = self.connection_manager.clone();

        let _deleted: u32 = conn.del(&key).await?;
        Ok(())
    }

    /// Check if a context exists for a user
    pub async fn context_exists(&self, user_id: i64) -> Result<bool> {
        let key = self.context_key(user_id);
        let mut conn = self.connection_manager.clone();

        let exists: bool = conn.exists(&key).await?;
        Ok(exists)
    }

    /// Test Redis connection
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn context_key(&self, user_id: i64) -> String {
        format!("{}context:{}", self.config.prefix, user_id)
    }
}

impl std::fmt::Debug for StateStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStorage")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
