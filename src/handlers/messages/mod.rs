//! Message handlers module
//!
//! Routes plain messages: an active intake flow consumes them first,
//! everything else goes to the AI responder.

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Request;
use teloxide::requests::Requester;
use teloxide::types::{
    ButtonRequest, ChatAction, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton,
    KeyboardMarkup, KeyboardRemove, Message, ParseMode, ReplyMarkup,
};
use teloxide::Bot;
use tracing::{debug, error};

use crate::i18n::I18n;
use crate::services::ServiceFactory;
use crate::state::{advance, ConversationContext, IntakeInput, IntakeStep, StateStorage, StepOutcome, BUDGET_TIERS};
use crate::utils::errors::{LeadflowError, Result};

/// Handle a non-command private message
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    state_storage: StateStorage,
    i18n: I18n,
) -> Result<()> {
    let from = match msg.from.as_ref() {
        Some(user) => user,
        None => return Ok(()),
    };

    let user_id = from.id.0 as i64;
    let chat_id = msg.chat.id;

    if !chat_id.is_user() {
        return Ok(());
    }

    let input = if let Some(contact) = msg.contact() {
        IntakeInput::Contact(contact.phone_number.clone())
    } else if let Some(text) = msg.text() {
        IntakeInput::Text(text.to_string())
    } else {
        IntakeInput::Unsupported
    };

    let language = services.user_service.language_of(user_id).await?;
    let mut context = state_storage
        .load_context(user_id)
        .await?
        .unwrap_or_else(|| ConversationContext::new(user_id));

    match advance(&mut context, input.clone())? {
        StepOutcome::Advanced { next, prompt_key } => {
            state_storage.save_context(&context).await?;
            send_step_prompt(&bot, chat_id, &i18n, &language, next, prompt_key).await?;
        }
        StepOutcome::Rejected { retry_key } => {
            let mut request = bot.send_message(chat_id, i18n.t(retry_key, &language, None));
            if let Some(keyboard) = retry_keyboard(context.step) {
                request = request.reply_markup(keyboard);
            }
            request.send().await?;
        }
        StepOutcome::Finalized(form) => {
            let user = services
                .user_service
                .find(user_id)
                .await?
                .ok_or(LeadflowError::UserNotFound { user_id })?;

            let order = services.order_service.submit_lead(&user, *form).await?;
            debug!(user_id = user_id, order_id = order.id, "Intake flow finalized");

            state_storage.save_context(&context).await?;

            bot.send_message(chat_id, i18n.t("intake.thanks", &language, None))
                .reply_markup(ReplyMarkup::KeyboardRemove(KeyboardRemove::new()))
                .send()
                .await?;
            send_post_submit_menu(&bot, chat_id, &i18n, &language, &services).await?;
        }
        StepOutcome::AlreadySubmitted => {
            send_already_received(&bot, chat_id, &i18n, &language, &services).await?;
        }
        StepOutcome::Idle => {
            if let IntakeInput::Text(text) = input {
                bot.send_chat_action(chat_id, ChatAction::Typing)
                    .send()
                    .await?;
                let reply = services.ai_service.respond(user_id, &text, &language).await;
                bot.send_message(chat_id, reply).send().await?;
            }
        }
    }

    Ok(())
}

/// Send the prompt for the next intake step, with the step-specific
/// keyboard where one applies.
pub async fn send_step_prompt(
    bot: &Bot,
    chat_id: ChatId,
    i18n: &I18n,
    language: &str,
    next: IntakeStep,
    prompt_key: &str,
) -> Result<()> {
    let text = i18n.t(prompt_key, language, None);
    let request = bot.send_message(chat_id, text).parse_mode(ParseMode::Html);

    let result = match next {
        IntakeStep::CollectingBudget => {
            request
                .reply_markup(budget_keyboard())
                .send()
                .await
        }
        IntakeStep::CollectingContact => {
            let keyboard = KeyboardMarkup::new(vec![vec![KeyboardButton::new(
                i18n.t("buttons.send_contact", language, None),
            )
            .request(ButtonRequest::Contact)]])
            .resize_keyboard()
            .one_time_keyboard();

            request.reply_markup(keyboard).send().await
        }
        _ => request.send().await,
    };

    if let Err(e) = result {
        error!(chat_id = ?chat_id, error = %e, "Failed to send intake prompt");
        return Err(LeadflowError::Telegram(e));
    }

    Ok(())
}

/// Keyboard to re-attach when a step rejects the input, so the retry
/// prompt carries the same controls as the original one. Only the budget
/// step has one.
fn retry_keyboard(step: Option<IntakeStep>) -> Option<ReplyMarkup> {
    match step {
        Some(IntakeStep::CollectingBudget) => {
            Some(ReplyMarkup::InlineKeyboard(budget_keyboard()))
        }
        _ => None,
    }
}

/// Inline keyboard of the fixed budget tiers
pub fn budget_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        BUDGET_TIERS
            .iter()
            .map(|(suffix, label)| {
                vec![InlineKeyboardButton::callback(
                    label.to_string(),
                    format!("budget:{}", suffix),
                )]
            })
            .collect::<Vec<_>>(),
    )
}

/// Confirmation plus navigation after a successful submit
async fn send_post_submit_menu(
    bot: &Bot,
    chat_id: ChatId,
    i18n: &I18n,
    language: &str,
    services: &ServiceFactory,
) -> Result<()> {
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.main_menu", language, None),
            "nav:main",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.apply_again", language, None),
            "apply:new",
        )],
        vec![contact_direct_button(i18n, language, services)?],
    ]);

    bot.send_message(chat_id, i18n.t("intake.submitted_menu", language, None))
        .reply_markup(keyboard)
        .send()
        .await?;

    Ok(())
}

/// Static acknowledgment for messages after a submitted form
async fn send_already_received(
    bot: &Bot,
    chat_id: ChatId,
    i18n: &I18n,
    language: &str,
    services: &ServiceFactory,
) -> Result<()> {
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.apply_again", language, None),
            "apply:new",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.how_it_works", language, None),
            "nav:how",
        )],
        vec![contact_direct_button(i18n, language, services)?],
    ]);

    bot.send_message(chat_id, i18n.t("intake.already_received", language, None))
        .reply_markup(keyboard)
        .send()
        .await?;

    Ok(())
}

fn contact_direct_button(
    i18n: &I18n,
    language: &str,
    services: &ServiceFactory,
) -> Result<InlineKeyboardButton> {
    let url = url::Url::parse(&format!(
        "https://t.me/{}",
        services.user_service.admin_username()
    ))?;
    Ok(InlineKeyboardButton::url(
        i18n.t("buttons.contact_direct", language, None),
        url,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_retry_keeps_tier_buttons() {
        let markup = retry_keyboard(Some(IntakeStep::CollectingBudget));
        match markup {
            Some(ReplyMarkup::InlineKeyboard(keyboard)) => {
                assert_eq!(keyboard.inline_keyboard.len(), BUDGET_TIERS.len());
            }
            other => panic!("expected the budget tier keyboard, got {:?}", other),
        }
    }

    #[test]
    fn test_text_steps_retry_without_keyboard() {
        assert!(retry_keyboard(Some(IntakeStep::CollectingName)).is_none());
        assert!(retry_keyboard(Some(IntakeStep::CollectingTask)).is_none());
        assert!(retry_keyboard(None).is_none());
    }
}
