//! Admin command handlers
//!
//! `/stats`, `/admin` (CRM dashboard link) and `/seed` (demo catalog).
//! All three are restricted to the configured admin.

use std::collections::HashMap;

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Request;
use teloxide::requests::Requester;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, Message, ParseMode, WebAppInfo,
};
use teloxide::Bot;
use tracing::{info, warn};

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::i18n::I18n;
use crate::models::CreateProductRequest;
use crate::utils::errors::{LeadflowError, Result};

fn admin_only(msg: &Message, settings: &Settings) -> Result<i64> {
    let user_id = msg
        .from
        .as_ref()
        .map(|u| u.id.0 as i64)
        .ok_or_else(|| LeadflowError::InvalidInput("No user in message".to_string()))?;

    if !settings.is_admin(user_id) {
        warn!(user_id = user_id, "Non-admin attempted an admin command");
        return Err(LeadflowError::PermissionDenied(
            "admin command".to_string(),
        ));
    }

    Ok(user_id)
}

/// Handle /stats command - user and order totals
pub async fn handle_stats(
    bot: Bot,
    msg: Message,
    db: DatabaseService,
    settings: Settings,
    i18n: I18n,
) -> Result<()> {
    admin_only(&msg, &settings)?;

    let total_users = db.users.count().await?;
    let total_orders = db.orders.count().await?;

    let mut params = HashMap::new();
    params.insert("users".to_string(), total_users.to_string());
    params.insert("orders".to_string(), total_orders.to_string());

    bot.send_message(msg.chat.id, i18n.t("admin.stats", "ru", Some(&params)))
        .parse_mode(ParseMode::Html)
        .send()
        .await?;

    Ok(())
}

/// Handle /admin command - WebApp button opening the CRM dashboard
pub async fn handle_admin_panel(
    bot: Bot,
    msg: Message,
    settings: Settings,
    i18n: I18n,
) -> Result<()> {
    admin_only(&msg, &settings)?;

    let text = i18n.t("admin.crm_prompt", "ru", None);

    match &settings.bot.public_url {
        Some(base_url) => {
            let dashboard_url =
                url::Url::parse(&format!("{}/admin/index.html", base_url.trim_end_matches('/')))?;
            let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::web_app(
                i18n.t("buttons.open_crm", "ru", None),
                WebAppInfo { url: dashboard_url },
            )]]);

            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .send()
                .await?;
        }
        None => {
            // No public URL: the WebApp button cannot be built, point at
            // the local dashboard address instead.
            let fallback = format!(
                "{}\n\nhttp://{}:{}/admin/index.html",
                text, settings.api.host, settings.api.port
            );
            bot.send_message(msg.chat.id, fallback)
                .parse_mode(ParseMode::Html)
                .send()
                .await?;
        }
    }

    Ok(())
}

/// Handle /seed command - fill the catalog with demo products
pub async fn handle_seed(
    bot: Bot,
    msg: Message,
    db: DatabaseService,
    settings: Settings,
    i18n: I18n,
) -> Result<()> {
    let admin_id = admin_only(&msg, &settings)?;

    let demo_products = vec![
        CreateProductRequest {
            title: "Бот-магазин".to_string(),
            price: 1500.0,
            icon: Some("🛍".to_string()),
            category: Some("shops".to_string()),
            description: Some("Каталог, корзина и приём заказов в Telegram".to_string()),
        },
        CreateProductRequest {
            title: "Бот записи клиентов".to_string(),
            price: 1200.0,
            icon: Some("📅".to_string()),
            category: Some("booking".to_string()),
            description: Some("Онлайн-запись с напоминаниями".to_string()),
        },
        CreateProductRequest {
            title: "Чат-бот поддержки".to_string(),
            price: 1000.0,
            icon: Some("🤖".to_string()),
            category: Some("support".to_string()),
            description: Some("Автоответы на частые вопросы 24/7".to_string()),
        },
    ];

    let count = demo_products.len();
    for product in demo_products {
        db.products.create(product).await?;
    }

    info!(admin_id = admin_id, count = count, "Demo catalog seeded");

    bot.send_message(msg.chat.id, i18n.t("admin.seed_done", "ru", None))
        .send()
        .await?;

    Ok(())
}
