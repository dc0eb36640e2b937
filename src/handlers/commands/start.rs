//! Start and cancel command handlers
//!
//! `/start` registers the user (with referral attribution from a
//! `ref{id}` deep-link payload) and shows the main menu; `/cancel` drops
//! any in-flight intake flow.

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Request;
use teloxide::requests::Requester;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardRemove, Message, ParseMode,
    ReplyMarkup,
};
use teloxide::Bot;
use tracing::{debug, info};

use crate::i18n::I18n;
use crate::services::ServiceFactory;
use crate::state::StateStorage;
use crate::utils::errors::{LeadflowError, Result};

/// Extract the inviter id from a `/start ref{id}` deep-link payload
pub fn parse_referrer(text: &str) -> Option<i64> {
    let re = regex::Regex::new(r"^/start\s+ref(\d+)\s*$").ok()?;
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Handle /start command - registration, referral attribution, main menu
pub async fn handle_start(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let from = msg
        .from
        .as_ref()
        .ok_or_else(|| LeadflowError::InvalidInput("No user in message".to_string()))?;

    let user_id = from.id.0 as i64;
    let chat_id = msg.chat.id;

    if !chat_id.is_user() {
        return Ok(());
    }

    let invited_by = msg
        .text()
        .and_then(parse_referrer)
        .filter(|inviter| *inviter != user_id);

    debug!(user_id = user_id, invited_by = ?invited_by, "Processing /start command");

    match services.user_service.find(user_id).await? {
        Some(user) => {
            show_main_menu(&bot, chat_id, &i18n, &user.language_code).await?;
        }
        None => {
            let language = i18n.detect_user_language(from.language_code.as_deref());
            services
                .user_service
                .register_or_get(
                    user_id,
                    from.username.clone(),
                    Some(from.full_name()),
                    Some(language.clone()),
                    invited_by,
                )
                .await?;

            info!(user_id = user_id, invited_by = ?invited_by, "New user registered");

            bot.send_message(chat_id, i18n.t("start.greeting", &language, None))
                .parse_mode(ParseMode::Html)
                .send()
                .await?;
            show_language_selection(&bot, chat_id, &i18n, &language).await?;
        }
    }

    Ok(())
}

/// Handle /cancel command - abort the intake flow and drop the accumulator
pub async fn handle_cancel(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    state_storage: StateStorage,
    i18n: I18n,
) -> Result<()> {
    let from = msg
        .from
        .as_ref()
        .ok_or_else(|| LeadflowError::InvalidInput("No user in message".to_string()))?;

    let user_id = from.id.0 as i64;
    let chat_id = msg.chat.id;

    state_storage.delete_context(user_id).await?;
    debug!(user_id = user_id, "Intake flow cancelled");

    let language = services.user_service.language_of(user_id).await?;
    bot.send_message(chat_id, i18n.t("cancel.done", &language, None))
        .reply_markup(ReplyMarkup::KeyboardRemove(KeyboardRemove::new()))
        .send()
        .await?;

    show_main_menu(&bot, chat_id, &i18n, &language).await?;
    Ok(())
}

/// Show the main menu with navigation buttons
pub async fn show_main_menu(bot: &Bot, chat_id: ChatId, i18n: &I18n, language: &str) -> Result<()> {
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.services", language, None),
            "nav:services",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.about", language, None),
            "nav:about",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.apply", language, None),
            "apply:new",
        )],
    ]);

    bot.send_message(chat_id, i18n.t("menu.main", language, None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .send()
        .await?;

    Ok(())
}

async fn show_language_selection(
    bot: &Bot,
    chat_id: ChatId,
    i18n: &I18n,
    language: &str,
) -> Result<()> {
    let keyboard = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(i18n.t("buttons.language.russian", "ru", None), "lang:ru"),
        InlineKeyboardButton::callback(i18n.t("buttons.language.english", "en", None), "lang:en"),
    ]]);

    bot.send_message(chat_id, i18n.t("start.choose_language", language, None))
        .reply_markup(keyboard)
        .send()
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_referrer() {
        assert_eq!(parse_referrer("/start ref42"), Some(42));
        assert_eq!(parse_referrer("/start ref123456789"), Some(123456789));
        assert_eq!(parse_referrer("/start"), None);
        assert_eq!(parse_referrer("/start promo"), None);
        assert_eq!(parse_referrer("/start refabc"), None);
    }
}
