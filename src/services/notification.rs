//! Notification service implementation
//!
//! Formats and sends outbound Telegram messages: the admin lead summary,
//! client status updates, negotiation offers and plain broadcast texts.
//! Templates are keyed by name with per-language content.

use std::collections::HashMap;

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Request;
use teloxide::requests::Requester;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};
use teloxide::Bot;
use tracing::{debug, error, info};

use crate::config::Settings;
use crate::models::{Order, OrderStatus};
use crate::utils::errors::{LeadflowError, Result};

/// Message template with per-language content
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub key: String,
    pub content: HashMap<String, String>,
}

/// Notification service for outbound messages
#[derive(Clone)]
pub struct NotificationService {
    bot: Bot,
    settings: Settings,
    templates: HashMap<String, MessageTemplate>,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(bot: Bot, settings: Settings) -> Self {
        Self {
            bot,
            settings,
            templates: Self::load_default_templates(),
        }
    }

    /// Send the lead summary to the configured admin.
    pub async fn notify_admin_lead(&self, order: &Order, username: Option<&str>) -> Result<()> {
        let mut params = HashMap::new();
        params.insert("order_id".to_string(), order.id.to_string());
        params.insert("name".to_string(), field(&order.name));
        params.insert("business".to_string(), field(&order.business_type));
        params.insert("budget".to_string(), field(&order.budget));
        params.insert("task".to_string(), field(&order.task_description));
        params.insert("contact".to_string(), field(&order.contact_info));
        params.insert("service".to_string(), field(&order.service_context));
        params.insert(
            "username".to_string(),
            username.map(|u| format!("@{}", u)).unwrap_or_else(|| "—".to_string()),
        );

        let text = self.format_message("lead.admin_summary", "ru", &params)?;
        self.send_html(ChatId(self.settings.bot.admin_id), &text).await?;

        info!(order_id = order.id, "Admin notified about new lead");
        Ok(())
    }

    /// Notify the order owner about a status change. Returns `false` when
    /// the status has no client-facing template (e.g. `new`).
    pub async fn notify_status(
        &self,
        user_id: i64,
        language: &str,
        status: OrderStatus,
    ) -> Result<bool> {
        let key = match status {
            OrderStatus::InProgress => "status.in_progress",
            OrderStatus::Completed => "status.completed",
            OrderStatus::Cancelled => "status.cancelled",
            OrderStatus::New => return Ok(false),
        };

        let text = self.format_message(key, language, &HashMap::new())?;
        self.send_html(ChatId(user_id), &text).await?;
        Ok(true)
    }

    /// Send a negotiation offer with accept/reject inline buttons.
    pub async fn send_offer(
        &self,
        user_id: i64,
        language: &str,
        order: &Order,
        items_text: &str,
    ) -> Result<()> {
        let mut params = HashMap::new();
        params.insert("order_id".to_string(), order.id.to_string());
        params.insert("items".to_string(), items_text.to_string());
        params.insert(
            "comment".to_string(),
            field(&order.admin_comment),
        );

        let text = self.format_message("negotiate.offer", language, &params)?;
        let keyboard = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback(
                self.format_message("negotiate.accept_button", language, &HashMap::new())?,
                format!("negotiate:accept:{}", order.id),
            ),
            InlineKeyboardButton::callback(
                self.format_message("negotiate.reject_button", language, &HashMap::new())?,
                format!("negotiate:reject:{}", order.id),
            ),
        ]]);

        self.bot
            .send_message(ChatId(user_id), text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .send()
            .await?;

        debug!(order_id = order.id, user_id = user_id, "Negotiation offer sent");
        Ok(())
    }

    /// Send a short admin note (used for negotiation responses).
    pub async fn notify_admin_text(&self, text: &str) -> Result<()> {
        self.send_html(ChatId(self.settings.bot.admin_id), text).await
    }

    /// Send a plain broadcast message to one recipient.
    pub async fn send_broadcast_message(&self, user_id: i64, text: &str) -> Result<()> {
        self.send_html(ChatId(user_id), text).await
    }

    async fn send_html(&self, chat_id: ChatId, text: &str) -> Result<()> {
        match self
            .bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(chat_id = ?chat_id, error = %e, "Failed to send notification");
                Err(LeadflowError::Telegram(e))
            }
        }
    }

    /// Format a template with parameters
    pub fn format_message(
        &self,
        template_key: &str,
        language: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<String> {
        let template = self.templates.get(template_key).ok_or_else(|| {
            LeadflowError::Config(format!("Template not found: {}", template_key))
        })?;

        let content = template
            .content
            .get(language)
            .or_else(|| template.content.get("ru"))
            .ok_or_else(|| {
                LeadflowError::Config(format!(
                    "No content for template {} in language {}",
                    template_key, language
                ))
            })?;

        let mut message = content.clone();
        for (param_name, param_value) in parameters {
            message = message.replace(&format!("{{{}}}", param_name), param_value);
        }

        Ok(message)
    }

    fn load_default_templates() -> HashMap<String, MessageTemplate> {
        let mut templates = HashMap::new();

        templates.insert(
            "lead.admin_summary".to_string(),
            template(
                "lead.admin_summary",
                &[(
                    "ru",
                    "🔥 <b>Новая заявка #{order_id}</b>\n\n\
                     🛠 <b>Услуга:</b> {service}\n\
                     👤 <b>Имя:</b> {name}\n\
                     🏢 <b>Бизнес:</b> {business}\n\
                     💰 <b>Бюджет:</b> {budget}\n\
                     📝 <b>Задача:</b> {task}\n\
                     📞 <b>Контакт:</b> {contact}\n\
                     💬 <b>Telegram:</b> {username}",
                )],
            ),
        );

        templates.insert(
            "status.in_progress".to_string(),
            template(
                "status.in_progress",
                &[
                    ("ru", "🛠 Ваш заказ взят в работу! Скоро мы свяжемся с вами."),
                    ("en", "🛠 Your order is now in progress! We will contact you soon."),
                ],
            ),
        );

        templates.insert(
            "status.completed".to_string(),
            template(
                "status.completed",
                &[
                    ("ru", "✅ Ваш заказ выполнен! Спасибо, что выбрали нас."),
                    ("en", "✅ Your order is complete! Thank you for choosing us."),
                ],
            ),
        );

        templates.insert(
            "status.cancelled".to_string(),
            template(
                "status.cancelled",
                &[
                    (
                        "ru",
                        "❌ Ваш заказ был отменен. Для уточнения деталей свяжитесь с нами.",
                    ),
                    ("en", "❌ Your order was cancelled. Contact us for details."),
                ],
            ),
        );

        templates.insert(
            "negotiate.offer".to_string(),
            template(
                "negotiate.offer",
                &[
                    (
                        "ru",
                        "📋 <b>Предложение по вашей заявке #{order_id}</b>\n\n{items}\n\n💬 {comment}\n\nПодтвердить?",
                    ),
                    (
                        "en",
                        "📋 <b>Offer for your request #{order_id}</b>\n\n{items}\n\n💬 {comment}\n\nConfirm?",
                    ),
                ],
            ),
        );

        templates.insert(
            "negotiate.accept_button".to_string(),
            template(
                "negotiate.accept_button",
                &[("ru", "✅ Принять"), ("en", "✅ Accept")],
            ),
        );

        templates.insert(
            "negotiate.reject_button".to_string(),
            template(
                "negotiate.reject_button",
                &[("ru", "❌ Отклонить"), ("en", "❌ Decline")],
            ),
        );

        templates
    }
}

fn template(key: &str, content: &[(&str, &str)]) -> MessageTemplate {
    MessageTemplate {
        key: key.to_string(),
        content: content
            .iter()
            .map(|(lang, text)| (lang.to_string(), text.to_string()))
            .collect(),
    }
}

fn field(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "Не указано".to_string())
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("templates", &self.templates.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> NotificationService {
        NotificationService::new(
            Bot::new("123456:TEST".to_string()),
            Settings::default(),
        )
    }

    #[test]
    fn test_format_message_substitutes_params() {
        let svc = service();
        let mut params = HashMap::new();
        params.insert("order_id".to_string(), "7".to_string());
        params.insert("items".to_string(), "• Бот — 1500".to_string());
        params.insert("comment".to_string(), "Срок 2 недели".to_string());

        let text = svc.format_message("negotiate.offer", "ru", &params).unwrap();
        assert!(text.contains("#7"));
        assert!(text.contains("• Бот — 1500"));
        assert!(text.contains("Срок 2 недели"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_russian() {
        let svc = service();
        let text = svc
            .format_message("status.completed", "de", &HashMap::new())
            .unwrap();
        assert!(text.contains("выполнен"));
    }

    #[test]
    fn test_all_client_statuses_have_templates() {
        let svc = service();
        for key in ["status.in_progress", "status.completed", "status.cancelled"] {
            assert!(svc.format_message(key, "ru", &HashMap::new()).is_ok());
            assert!(svc.format_message(key, "en", &HashMap::new()).is_ok());
        }
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let svc = service();
        assert!(svc
            .format_message("status.archived", "ru", &HashMap::new())
            .is_err());
    }
}
