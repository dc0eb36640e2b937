//! Order service implementation
//!
//! Persists finalized leads and runs the surrounding side effects: the
//! admin summary, the spreadsheet export, client status notifications,
//! negotiation offers and broadcasts. Side effects never fail the core
//! write.

use tokio::time::{sleep, Duration};
use tracing::info;

use crate::database::DatabaseService;
use crate::models::{CreateOrderRequest, Order, OrderStatus, User};
use crate::services::notification::NotificationService;
use crate::services::sheets::SheetsService;
use crate::state::LeadForm;
use crate::utils::errors::{LeadflowError, Result};
use crate::utils::logging::{log_broadcast, log_lead_submitted, log_side_effect_failure, log_status_change};

/// Pause between consecutive broadcast sends, keeps the bot inside
/// Telegram's per-second limits.
const BROADCAST_DELAY: Duration = Duration::from_millis(50);

/// Outcome of a broadcast run
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BroadcastReport {
    pub total: usize,
    pub sent: usize,
}

/// Order lifecycle service
#[derive(Debug, Clone)]
pub struct OrderService {
    db: DatabaseService,
    notifications: NotificationService,
    sheets: SheetsService,
}

impl OrderService {
    pub fn new(
        db: DatabaseService,
        notifications: NotificationService,
        sheets: SheetsService,
    ) -> Self {
        Self {
            db,
            notifications,
            sheets,
        }
    }

    /// Persist a finalized intake form as a new order and fire the
    /// best-effort side effects. The order row is the source of truth: a
    /// failed notification or export is logged and swallowed.
    pub async fn submit_lead(&self, user: &User, form: LeadForm) -> Result<Order> {
        let request = CreateOrderRequest {
            user_id: user.id,
            name: Some(form.name),
            contact_info: Some(form.contact_info),
            business_type: Some(form.business_type),
            budget: Some(form.budget),
            task_description: Some(form.task_description),
            service_context: Some(form.service_context),
            items: None,
        };

        let order = self.db.orders.create(request).await?;
        log_lead_submitted(
            user.id,
            order.id,
            order.service_context.as_deref().unwrap_or(""),
        );

        if let Err(e) = self
            .notifications
            .notify_admin_lead(&order, user.username.as_deref())
            .await
        {
            log_side_effect_failure("admin_notify", &e.to_string());
        }

        if let Err(e) = self.sheets.export_lead(&order).await {
            log_side_effect_failure("sheets_export", &e.to_string());
        }

        Ok(order)
    }

    /// Place a storefront order (shop WebApp checkout) with line items.
    pub async fn submit_storefront_order(&self, request: CreateOrderRequest) -> Result<Order> {
        let order = self.db.orders.create(request).await?;
        info!(order_id = order.id, user_id = order.user_id, "Storefront order created");

        if let Err(e) = self.notifications.notify_admin_lead(&order, None).await {
            log_side_effect_failure("admin_notify", &e.to_string());
        }

        Ok(order)
    }

    /// Set the order status. With `notify` the owner gets the per-status
    /// message in their language; a failed send does not roll back the
    /// status write.
    pub async fn set_status(
        &self,
        order_id: i64,
        status: OrderStatus,
        notify: bool,
    ) -> Result<Order> {
        let order = self
            .db
            .orders
            .update_status(order_id, status)
            .await?
            .ok_or(LeadflowError::OrderNotFound { order_id })?;

        let mut notified = false;
        if notify {
            let language = self.owner_language(order.user_id).await;
            match self
                .notifications
                .notify_status(order.user_id, &language, status)
                .await
            {
                Ok(sent) => notified = sent,
                Err(e) => log_side_effect_failure("status_notify", &e.to_string()),
            }
        }

        log_status_change(order.id, status.as_str(), notified);
        Ok(order)
    }

    /// Send the current offer (items + admin comment) to the order owner
    /// with accept/reject buttons.
    pub async fn send_offer(&self, order_id: i64) -> Result<Order> {
        let order = self
            .db
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(LeadflowError::OrderNotFound { order_id })?;

        let language = self.owner_language(order.user_id).await;
        let items_text = render_items(&order);
        self.notifications
            .send_offer(order.user_id, &language, &order, &items_text)
            .await?;

        Ok(order)
    }

    /// Record the client's answer to an offer: acceptance moves the order
    /// to `in_progress`, rejection cancels it. The admin is told either way.
    pub async fn respond_to_offer(&self, order_id: i64, accepted: bool) -> Result<Order> {
        let status = if accepted {
            OrderStatus::InProgress
        } else {
            OrderStatus::Cancelled
        };

        let order = self.set_status(order_id, status, false).await?;

        let note = if accepted {
            format!("✅ Клиент принял предложение по заявке #{}", order.id)
        } else {
            format!("❌ Клиент отклонил предложение по заявке #{}", order.id)
        };
        if let Err(e) = self.notifications.notify_admin_text(&note).await {
            log_side_effect_failure("admin_notify", &e.to_string());
        }

        Ok(order)
    }

    /// Send a text to every distinct order owner. Failed recipients are
    /// skipped; the report carries the tally.
    pub async fn broadcast(&self, text: &str) -> Result<BroadcastReport> {
        let recipients = self.db.orders.distinct_user_ids().await?;
        let total = recipients.len();
        let mut sent = 0;

        for user_id in recipients {
            if self
                .notifications
                .send_broadcast_message(user_id, text)
                .await
                .is_ok()
            {
                sent += 1;
            }
            sleep(BROADCAST_DELAY).await;
        }

        log_broadcast(total, sent);
        Ok(BroadcastReport { total, sent })
    }

    async fn owner_language(&self, user_id: i64) -> String {
        match self.db.users.find_by_id(user_id).await {
            Ok(Some(user)) => user.language_code,
            _ => "ru".to_string(),
        }
    }
}

fn render_items(order: &Order) -> String {
    if order.items.0.is_empty() {
        return "—".to_string();
    }

    order
        .items
        .0
        .iter()
        .map(|item| format!("• {} — {:.0}", item.title, item.price))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderItem;
    use sqlx::types::Json;

    fn order_with_items(items: Vec<OrderItem>) -> Order {
        Order {
            id: 1,
            user_id: 10,
            name: None,
            contact_info: None,
            business_type: None,
            budget: None,
            task_description: None,
            service_context: None,
            items: Json(items),
            admin_comment: None,
            status: OrderStatus::New,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_render_items_empty() {
        assert_eq!(render_items(&order_with_items(vec![])), "—");
    }

    #[test]
    fn test_render_items_lines() {
        let text = render_items(&order_with_items(vec![
            OrderItem {
                title: "Бот-магазин".to_string(),
                price: 1500.0,
            },
            OrderItem {
                title: "Поддержка".to_string(),
                price: 500.0,
            },
        ]));
        assert_eq!(text, "• Бот-магазин — 1500\n• Поддержка — 500");
    }
}
