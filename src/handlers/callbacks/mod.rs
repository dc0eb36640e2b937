//! Callback query handlers module
//!
//! This module contains handlers for all inline keyboard button callbacks

use std::collections::HashMap;

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Request;
use teloxide::requests::Requester;
use teloxide::types::{
    CallbackQuery, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode,
};
use teloxide::Bot;
use tracing::{debug, warn};

use crate::handlers::commands::start::show_main_menu;
use crate::handlers::messages::{budget_keyboard, send_step_prompt};
use crate::i18n::I18n;
use crate::services::ServiceFactory;
use crate::state::{advance, budget_label, ConversationContext, IntakeInput, StateStorage, StepOutcome};
use crate::utils::errors::Result;

/// Main callback query dispatcher
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    services: ServiceFactory,
    state_storage: StateStorage,
    i18n: I18n,
) -> Result<()> {
    let user_id = query.from.id.0 as i64;
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(user_id));

    let data = match query.data {
        Some(data) => data,
        None => return Ok(()),
    };

    debug!(user_id = user_id, callback_data = %data, "Processing callback query");

    // Answer first to clear the loading state on the button
    if let Err(e) = bot.answer_callback_query(query.id.clone()).send().await {
        warn!(error = %e, "Failed to answer callback query");
    }

    let parts: Vec<&str> = data.split(':').collect();
    let language = services.user_service.language_of(user_id).await?;

    match parts.as_slice() {
        ["nav", target] => {
            handle_navigation(&bot, chat_id, &i18n, &language, target).await?;
        }
        ["cat", category] => {
            show_service_detail(&bot, chat_id, &i18n, &language, category).await?;
        }
        ["apply", "new"] => {
            start_intake(&bot, chat_id, user_id, &state_storage, &i18n, &language, None).await?;
        }
        ["order", category] => {
            let service_name = i18n.t(&format!("service_names.{}", category), &language, None);
            start_intake(
                &bot,
                chat_id,
                user_id,
                &state_storage,
                &i18n,
                &language,
                Some(service_name),
            )
            .await?;
        }
        ["budget", suffix] => {
            handle_budget_choice(&bot, chat_id, user_id, &state_storage, &i18n, &language, suffix)
                .await?;
        }
        ["lang", code] => {
            handle_language_choice(&bot, chat_id, user_id, &services, &i18n, code).await?;
        }
        ["negotiate", decision, order_id] if *decision == "accept" || *decision == "reject" => {
            if let Ok(order_id) = order_id.parse::<i64>() {
                let accepted = *decision == "accept";
                services
                    .order_service
                    .respond_to_offer(order_id, accepted)
                    .await?;

                let key = if accepted {
                    "negotiate.accepted"
                } else {
                    "negotiate.rejected"
                };
                bot.send_message(chat_id, i18n.t(key, &language, None))
                    .send()
                    .await?;
            }
        }
        _ => {
            warn!(callback_data = %data, "Unknown callback action");
        }
    }

    Ok(())
}

async fn handle_navigation(
    bot: &Bot,
    chat_id: ChatId,
    i18n: &I18n,
    language: &str,
    target: &str,
) -> Result<()> {
    match target {
        "main" => show_main_menu(bot, chat_id, i18n, language).await,
        "services" => show_services_menu(bot, chat_id, i18n, language).await,
        "about" => {
            send_with_back(bot, chat_id, i18n, language, "menu.about", "nav:main").await
        }
        "how" => {
            send_with_back(bot, chat_id, i18n, language, "menu.how_it_works", "nav:main").await
        }
        other => {
            warn!(target = %other, "Unknown navigation target");
            Ok(())
        }
    }
}

async fn show_services_menu(bot: &Bot, chat_id: ChatId, i18n: &I18n, language: &str) -> Result<()> {
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            i18n.t("service_names.shops", language, None),
            "cat:shops",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("service_names.booking", language, None),
            "cat:booking",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("service_names.support", language, None),
            "cat:support",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.back", language, None),
            "nav:main",
        )],
    ]);

    bot.send_message(chat_id, i18n.t("menu.services", language, None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .send()
        .await?;

    Ok(())
}

async fn show_service_detail(
    bot: &Bot,
    chat_id: ChatId,
    i18n: &I18n,
    language: &str,
    category: &str,
) -> Result<()> {
    let text_key = format!("services.{}", category);
    let mut text = i18n.t(&text_key, language, None);
    if text == text_key {
        text = i18n.t("services.unknown", language, None);
    }

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.order_this", language, None),
            format!("order:{}", category),
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.back_to_services", language, None),
            "nav:services",
        )],
    ]);

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .send()
        .await?;

    Ok(())
}

/// Begin the intake flow, optionally tagged with the chosen service
async fn start_intake(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    state_storage: &StateStorage,
    i18n: &I18n,
    language: &str,
    service_context: Option<String>,
) -> Result<()> {
    let mut context = state_storage
        .load_context(user_id)
        .await?
        .unwrap_or_else(|| ConversationContext::new(user_id));

    context.start_intake();

    let text = match service_context {
        Some(service) => {
            context.set_field("service_context", &service)?;
            let mut params = HashMap::new();
            params.insert("context".to_string(), service);
            i18n.t("intake.start_with_context", language, Some(&params))
        }
        None => i18n.t("intake.start_generic", language, None),
    };

    state_storage.save_context(&context).await?;

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .send()
        .await?;

    Ok(())
}

/// Budget tier chosen via inline button
async fn handle_budget_choice(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    state_storage: &StateStorage,
    i18n: &I18n,
    language: &str,
    suffix: &str,
) -> Result<()> {
    let mut context = state_storage
        .load_context(user_id)
        .await?
        .unwrap_or_else(|| ConversationContext::new(user_id));

    match advance(&mut context, IntakeInput::BudgetChoice(suffix.to_string()))? {
        StepOutcome::Advanced { next, prompt_key } => {
            state_storage.save_context(&context).await?;

            if let Some(label) = budget_label(suffix) {
                let mut params = HashMap::new();
                params.insert("budget".to_string(), label.to_string());
                bot.send_message(
                    chat_id,
                    i18n.t("intake.budget_confirmed", language, Some(&params)),
                )
                .send()
                .await?;
            }

            send_step_prompt(bot, chat_id, i18n, language, next, prompt_key).await?;
        }
        StepOutcome::Rejected { retry_key } => {
            bot.send_message(chat_id, i18n.t(retry_key, language, None))
                .reply_markup(budget_keyboard())
                .send()
                .await?;
        }
        // A stale button outside the flow is ignored
        _ => {
            debug!(user_id = user_id, "Budget callback outside an active flow");
        }
    }

    Ok(())
}

async fn handle_language_choice(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    services: &ServiceFactory,
    i18n: &I18n,
    code: &str,
) -> Result<()> {
    if !i18n.is_language_supported(code) {
        warn!(user_id = user_id, language = %code, "Unsupported language selected");
        return Ok(());
    }

    services.user_service.set_language(user_id, code).await?;

    bot.send_message(chat_id, i18n.t("start.language_saved", code, None))
        .send()
        .await?;
    show_main_menu(bot, chat_id, i18n, code).await?;

    Ok(())
}

async fn send_with_back(
    bot: &Bot,
    chat_id: ChatId,
    i18n: &I18n,
    language: &str,
    text_key: &str,
    back_target: &str,
) -> Result<()> {
    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        i18n.t("buttons.back", language, None),
        back_target.to_string(),
    )]]);

    bot.send_message(chat_id, i18n.t(text_key, language, None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .send()
        .await?;

    Ok(())
}
