//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{
    DatabasePool, MessageRepository, OrderRepository, ProductRepository, UserRepository,
};
use crate::models::*;
use crate::utils::errors::LeadflowError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub orders: OrderRepository,
    pub products: ProductRepository,
    pub messages: MessageRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            orders: OrderRepository::new(pool.clone()),
            products: ProductRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
        }
    }

    /// Initialize a user on first contact; an existing row is returned
    /// untouched.
    pub async fn initialize_user(
        &self,
        id: i64,
        username: Option<String>,
        full_name: Option<String>,
        language_code: Option<String>,
        invited_by: Option<i64>,
    ) -> Result<User, LeadflowError> {
        if let Some(existing_user) = self.users.find_by_id(id).await? {
            return Ok(existing_user);
        }

        let request = CreateUserRequest {
            id,
            username,
            full_name,
            language_code,
            invited_by,
        };

        let user = self.users.create(request).await?;

        // Referral event: bump the inviter's counter once, on first contact
        if let Some(inviter) = user.invited_by {
            if inviter != user.id {
                self.users.increment_referral_count(inviter).await?;
            }
        }

        Ok(user)
    }

    /// Dashboard statistics: totals plus the daily histogram
    pub async fn dashboard_stats(&self, window_days: i64) -> Result<DashboardStats, LeadflowError> {
        let total_users = self.users.count().await?;
        let total_orders = self.orders.count().await?;
        let daily = self.orders.daily_counts(window_days).await?;

        Ok(DashboardStats {
            total_users,
            total_orders,
            daily,
        })
    }
}

/// Aggregated dashboard counters
#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_orders: i64,
    pub daily: Vec<(chrono::NaiveDate, i64)>,
}
