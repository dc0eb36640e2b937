//! Lead-intake state machine
//!
//! The flow is intentionally linear: five fields captured in a fixed order
//! with a single global cancel escape. The transition core is a pure
//! function over the conversation context so it can be exercised without
//! Telegram or the state store.

use serde::{Deserialize, Serialize};

use crate::state::context::ConversationContext;
use crate::utils::errors::Result;

/// Position within the intake flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    CollectingName,
    CollectingBusinessType,
    CollectingBudget,
    CollectingTask,
    CollectingContact,
    Submitted,
}

/// Fixed budget tiers offered as inline buttons. The callback suffix is
/// what arrives in `budget:{suffix}` callback data.
pub const BUDGET_TIERS: &[(&str, &str)] = &[
    ("low", "Эконом (1000-2000 с.)"),
    ("mid", "Бизнес (2000-5000 с.)"),
    ("high", "Премиум (от 5000 с.)"),
];

/// Resolve a budget callback suffix to its display label
pub fn budget_label(suffix: &str) -> Option<&'static str> {
    BUDGET_TIERS
        .iter()
        .find(|(id, _)| *id == suffix)
        .map(|(_, label)| *label)
}

/// One inbound update, reduced to what the machine cares about
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeInput {
    /// Plain text message
    Text(String),
    /// Shared contact payload (phone number)
    Contact(String),
    /// Budget tier chosen via inline button (callback suffix)
    BudgetChoice(String),
    /// Anything else (sticker, photo, empty message)
    Unsupported,
}

/// Finalized form data, ready to become an Order
#[derive(Debug, Clone, PartialEq)]
pub struct LeadForm {
    pub name: String,
    pub business_type: String,
    pub budget: String,
    pub task_description: String,
    pub contact_info: String,
    pub service_context: String,
}

/// Result of feeding one input to the machine
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Valid input captured; the flow moved to `next` and the handler
    /// should send the prompt behind `prompt_key`.
    Advanced {
        next: IntakeStep,
        prompt_key: &'static str,
    },
    /// Input did not fit the step; state unchanged, re-issue the prompt
    /// with the clarification behind `retry_key`.
    Rejected { retry_key: &'static str },
    /// Contact captured; the accumulator was finalized. The caller persists
    /// the order and fires the best-effort side effects.
    Finalized(Box<LeadForm>),
    /// Flow already submitted; reply with the static acknowledgment.
    AlreadySubmitted,
    /// No active flow; the input belongs to the AI chat router.
    Idle,
}

const DEFAULT_SERVICE_CONTEXT: &str = "Общая заявка";

fn non_empty(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Feed one input into the machine, mutating the context accumulator.
///
/// The contract per step: mismatched or empty input leaves the step and
/// accumulator untouched; valid input stores the field and advances.
pub fn advance(context: &mut ConversationContext, input: IntakeInput) -> Result<StepOutcome> {
    let step = match context.step {
        Some(step) => step,
        None => return Ok(StepOutcome::Idle),
    };

    let outcome = match step {
        IntakeStep::CollectingName => match input {
            IntakeInput::Text(ref text) => match non_empty(text) {
                Some(name) => {
                    context.set_field("name", name)?;
                    context.set_step(IntakeStep::CollectingBusinessType);
                    StepOutcome::Advanced {
                        next: IntakeStep::CollectingBusinessType,
                        prompt_key: "intake.ask_business_type",
                    }
                }
                None => StepOutcome::Rejected {
                    retry_key: "intake.retry_name",
                },
            },
            _ => StepOutcome::Rejected {
                retry_key: "intake.retry_name",
            },
        },
        IntakeStep::CollectingBusinessType => match input {
            IntakeInput::Text(ref text) => match non_empty(text) {
                Some(business) => {
                    context.set_field("business_type", business)?;
                    context.set_step(IntakeStep::CollectingBudget);
                    StepOutcome::Advanced {
                        next: IntakeStep::CollectingBudget,
                        prompt_key: "intake.ask_budget",
                    }
                }
                None => StepOutcome::Rejected {
                    retry_key: "intake.retry_business_type",
                },
            },
            _ => StepOutcome::Rejected {
                retry_key: "intake.retry_business_type",
            },
        },
        IntakeStep::CollectingBudget => match input {
            IntakeInput::BudgetChoice(ref suffix) => match budget_label(suffix) {
                Some(label) => {
                    context.set_field("budget", label)?;
                    context.set_step(IntakeStep::CollectingTask);
                    StepOutcome::Advanced {
                        next: IntakeStep::CollectingTask,
                        prompt_key: "intake.ask_task",
                    }
                }
                None => StepOutcome::Rejected {
                    retry_key: "intake.retry_budget",
                },
            },
            _ => StepOutcome::Rejected {
                retry_key: "intake.retry_budget",
            },
        },
        IntakeStep::CollectingTask => match input {
            IntakeInput::Text(ref text) => match non_empty(text) {
                Some(task) => {
                    context.set_field("task_description", task)?;
                    context.set_step(IntakeStep::CollectingContact);
                    StepOutcome::Advanced {
                        next: IntakeStep::CollectingContact,
                        prompt_key: "intake.ask_contact",
                    }
                }
                None => StepOutcome::Rejected {
                    retry_key: "intake.retry_task",
                },
            },
            _ => StepOutcome::Rejected {
                retry_key: "intake.retry_task",
            },
        },
        IntakeStep::CollectingContact => {
            let contact = match input {
                IntakeInput::Contact(ref phone) => non_empty(phone),
                IntakeInput::Text(ref text) => non_empty(text),
                _ => None,
            };

            match contact {
                Some(contact_info) => {
                    context.set_field("contact_info", contact_info)?;
                    let form = finalize(context);
                    context.set_step(IntakeStep::Submitted);
                    StepOutcome::Finalized(Box::new(form))
                }
                None => StepOutcome::Rejected {
                    retry_key: "intake.retry_contact",
                },
            }
        }
        IntakeStep::Submitted => StepOutcome::AlreadySubmitted,
    };

    Ok(outcome)
}

/// Assemble the form from the accumulator. Missing fields fall back to a
/// placeholder so the admin summary never renders holes.
fn finalize(context: &ConversationContext) -> LeadForm {
    let field = |key: &str| {
        context
            .get_field(key)
            .unwrap_or_else(|| "Не указано".to_string())
    };

    LeadForm {
        name: field("name"),
        business_type: field("business_type"),
        budget: field("budget"),
        task_description: field("task_description"),
        contact_info: field("contact_info"),
        service_context: context
            .get_field("service_context")
            .unwrap_or_else(|| DEFAULT_SERVICE_CONTEXT.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn text(s: &str) -> IntakeInput {
        IntakeInput::Text(s.to_string())
    }

    #[test]
    fn test_five_valid_inputs_reach_submitted() {
        let mut context = ConversationContext::new(1);
        context.start_intake();

        assert_matches!(
            advance(&mut context, text("Ivan")).unwrap(),
            StepOutcome::Advanced { next: IntakeStep::CollectingBusinessType, .. }
        );
        assert_matches!(
            advance(&mut context, text("магазин")).unwrap(),
            StepOutcome::Advanced { next: IntakeStep::CollectingBudget, .. }
        );
        assert_matches!(
            advance(&mut context, IntakeInput::BudgetChoice("mid".to_string())).unwrap(),
            StepOutcome::Advanced { next: IntakeStep::CollectingTask, .. }
        );
        assert_matches!(
            advance(&mut context, text("прием заказов")).unwrap(),
            StepOutcome::Advanced { next: IntakeStep::CollectingContact, .. }
        );

        let outcome = advance(
            &mut context,
            IntakeInput::Contact("+992900000000".to_string()),
        )
        .unwrap();

        let form = match outcome {
            StepOutcome::Finalized(form) => form,
            other => panic!("expected finalized form, got {:?}", other),
        };

        assert_eq!(form.name, "Ivan");
        assert_eq!(form.business_type, "магазин");
        assert_eq!(form.budget, "Бизнес (2000-5000 с.)");
        assert_eq!(form.task_description, "прием заказов");
        assert_eq!(form.contact_info, "+992900000000");
        assert_eq!(form.service_context, DEFAULT_SERVICE_CONTEXT);
        assert_eq!(context.step, Some(IntakeStep::Submitted));
    }

    #[test]
    fn test_invalid_input_leaves_state_unchanged() {
        let mut context = ConversationContext::new(1);
        context.start_intake();

        assert_matches!(
            advance(&mut context, text("   ")).unwrap(),
            StepOutcome::Rejected { .. }
        );
        assert_eq!(context.step, Some(IntakeStep::CollectingName));
        assert!(context.data.is_empty());

        assert_matches!(
            advance(&mut context, IntakeInput::Unsupported).unwrap(),
            StepOutcome::Rejected { .. }
        );
        assert_eq!(context.step, Some(IntakeStep::CollectingName));
    }

    #[test]
    fn test_budget_requires_known_tier() {
        let mut context = ConversationContext::new(1);
        context.start_intake();
        advance(&mut context, text("Ivan")).unwrap();
        advance(&mut context, text("кафе")).unwrap();

        // Free text is not accepted at the budget step
        assert_matches!(
            advance(&mut context, text("сколько-нибудь")).unwrap(),
            StepOutcome::Rejected { .. }
        );
        assert_matches!(
            advance(&mut context, IntakeInput::BudgetChoice("luxury".to_string())).unwrap(),
            StepOutcome::Rejected { .. }
        );
        assert_eq!(context.step, Some(IntakeStep::CollectingBudget));

        assert_matches!(
            advance(&mut context, IntakeInput::BudgetChoice("high".to_string())).unwrap(),
            StepOutcome::Advanced { next: IntakeStep::CollectingTask, .. }
        );
    }

    #[test]
    fn test_typed_contact_is_accepted() {
        let mut context = ConversationContext::new(1);
        context.start_intake();
        advance(&mut context, text("Alex")).unwrap();
        advance(&mut context, text("услуги")).unwrap();
        advance(&mut context, IntakeInput::BudgetChoice("low".to_string())).unwrap();
        advance(&mut context, text("запись клиентов")).unwrap();

        let outcome = advance(&mut context, text("@alex_handle")).unwrap();
        assert_matches!(outcome, StepOutcome::Finalized(form) if form.contact_info == "@alex_handle");
    }

    #[test]
    fn test_submitted_gets_static_acknowledgment() {
        let mut context = ConversationContext::new(1);
        context.start_intake();
        context.set_step(IntakeStep::Submitted);

        assert_matches!(
            advance(&mut context, text("привет")).unwrap(),
            StepOutcome::AlreadySubmitted
        );
    }

    #[test]
    fn test_idle_routes_to_ai() {
        let mut context = ConversationContext::new(1);
        assert_matches!(advance(&mut context, text("привет")).unwrap(), StepOutcome::Idle);
    }

    #[test]
    fn test_cancel_mid_flow_discards_everything() {
        let mut context = ConversationContext::new(1);
        context.start_intake();
        advance(&mut context, text("Ivan")).unwrap();
        advance(&mut context, text("магазин")).unwrap();

        context.cancel();
        assert!(context.is_idle());
        assert!(context.data.is_empty());
        assert_matches!(advance(&mut context, text("еще")).unwrap(), StepOutcome::Idle);
    }

    #[test]
    fn test_service_context_carried_through() {
        let mut context = ConversationContext::new(1);
        context.start_intake();
        context.set_field("service_context", "Интернет-магазин").unwrap();

        advance(&mut context, text("Ivan")).unwrap();
        advance(&mut context, text("магазин")).unwrap();
        advance(&mut context, IntakeInput::BudgetChoice("mid".to_string())).unwrap();
        advance(&mut context, text("продажи")).unwrap();
        let outcome = advance(&mut context, text("+992001112233")).unwrap();

        assert_matches!(outcome, StepOutcome::Finalized(form) if form.service_context == "Интернет-магазин");
    }
}
