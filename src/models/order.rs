//! Order (lead) model and status lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Closed set of order statuses. Transitions are admin- or client-triggered
/// only; any value in the set is accepted idempotently (no transition-graph
/// validation, matching the storefront's observable behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal orders stay editable for corrections; this only marks the
    /// logical end of the lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = crate::utils::errors::LeadflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(OrderStatus::New),
            "in_progress" => Ok(OrderStatus::InProgress),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(crate::utils::errors::LeadflowError::InvalidInput(format!(
                "Unknown order status: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line item embedded in an order (no product foreign key by design).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub title: String,
    pub price: f64,
}

/// A captured business inquiry tracked through the status lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub contact_info: Option<String>,
    pub business_type: Option<String>,
    pub budget: Option<String>,
    pub task_description: Option<String>,
    pub service_context: Option<String>,
    pub items: Json<Vec<OrderItem>>,
    pub admin_comment: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub name: Option<String>,
    pub contact_info: Option<String>,
    pub business_type: Option<String>,
    pub budget: Option<String>,
    pub task_description: Option<String>,
    pub service_context: Option<String>,
    pub items: Option<Vec<OrderItem>>,
}

/// Whitelist of editable order fields. Unknown JSON keys are dropped during
/// deserialization rather than treated as errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderDetails {
    pub budget: Option<String>,
    pub contact_info: Option<String>,
    pub task_description: Option<String>,
    pub admin_comment: Option<String>,
    pub items: Option<Vec<OrderItem>>,
}

impl UpdateOrderDetails {
    pub fn is_empty(&self) -> bool {
        self.budget.is_none()
            && self.contact_info.is_none()
            && self.task_description.is_none()
            && self.admin_comment.is_none()
            && self.items.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        for status in [
            OrderStatus::New,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_status_closed_set() {
        assert!(OrderStatus::from_str("archived").is_err());
        assert!(OrderStatus::from_str("").is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::New.is_terminal());
        assert!(!OrderStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_update_details_ignores_unknown_fields() {
        let patch: UpdateOrderDetails = serde_json::from_str(
            r#"{"budget": "5000", "status": "completed", "user_id": 1}"#,
        )
        .unwrap();
        assert_eq!(patch.budget.as_deref(), Some("5000"));
        assert!(patch.contact_info.is_none());
        assert!(patch.items.is_none());
    }

    #[test]
    fn test_update_details_is_empty() {
        assert!(UpdateOrderDetails::default().is_empty());
        let patch = UpdateOrderDetails {
            admin_comment: Some("call back tomorrow".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
