//! End-to-end exercise of the intake flow machine
//!
//! Drives the pure transition function through full conversations without
//! Telegram or the state store.

use assert_matches::assert_matches;

use leadflow::state::{advance, ConversationContext, IntakeInput, IntakeStep, StepOutcome};

fn text(s: &str) -> IntakeInput {
    IntakeInput::Text(s.to_string())
}

fn budget(suffix: &str) -> IntakeInput {
    IntakeInput::BudgetChoice(suffix.to_string())
}

#[test]
fn full_flow_produces_verbatim_form() {
    let mut context = ConversationContext::new(42);
    context.start_intake();
    context
        .set_field("service_context", "Интернет-магазин")
        .unwrap();

    advance(&mut context, text("Мария")).unwrap();
    advance(&mut context, text("цветочный магазин")).unwrap();
    advance(&mut context, budget("high")).unwrap();
    advance(&mut context, text("приём заказов и доставка")).unwrap();
    let outcome = advance(&mut context, IntakeInput::Contact("+992933334455".to_string())).unwrap();

    let form = match outcome {
        StepOutcome::Finalized(form) => form,
        other => panic!("expected finalized form, got {:?}", other),
    };

    assert_eq!(form.name, "Мария");
    assert_eq!(form.business_type, "цветочный магазин");
    assert_eq!(form.budget, "Премиум (от 5000 с.)");
    assert_eq!(form.task_description, "приём заказов и доставка");
    assert_eq!(form.contact_info, "+992933334455");
    assert_eq!(form.service_context, "Интернет-магазин");
    assert_eq!(context.step, Some(IntakeStep::Submitted));
}

#[test]
fn mismatched_inputs_never_advance_or_mutate() {
    let mut context = ConversationContext::new(1);
    context.start_intake();
    advance(&mut context, text("Иван")).unwrap();

    // Business type step rejects non-text
    assert_matches!(
        advance(&mut context, IntakeInput::Unsupported).unwrap(),
        StepOutcome::Rejected { .. }
    );
    assert_matches!(
        advance(&mut context, budget("mid")).unwrap(),
        StepOutcome::Rejected { .. }
    );
    assert_eq!(context.step, Some(IntakeStep::CollectingBusinessType));
    assert_eq!(context.get_field("business_type"), None);

    // Then a valid input still works
    assert_matches!(
        advance(&mut context, text("кафе")).unwrap(),
        StepOutcome::Advanced {
            next: IntakeStep::CollectingBudget,
            ..
        }
    );
}

#[test]
fn messages_after_submit_get_static_acknowledgment() {
    let mut context = ConversationContext::new(1);
    context.start_intake();
    advance(&mut context, text("Иван")).unwrap();
    advance(&mut context, text("кафе")).unwrap();
    advance(&mut context, budget("low")).unwrap();
    advance(&mut context, text("запись")).unwrap();
    advance(&mut context, text("@ivan")).unwrap();

    for _ in 0..3 {
        assert_matches!(
            advance(&mut context, text("что дальше?")).unwrap(),
            StepOutcome::AlreadySubmitted
        );
    }
}

#[test]
fn cancel_then_restart_yields_fresh_accumulator() {
    let mut context = ConversationContext::new(1);
    context.start_intake();
    advance(&mut context, text("Иван")).unwrap();
    advance(&mut context, text("магазин")).unwrap();

    context.cancel();
    assert!(context.is_idle());
    assert_matches!(advance(&mut context, text("привет")).unwrap(), StepOutcome::Idle);

    context.start_intake();
    assert_eq!(context.get_field("name"), None);
    assert_eq!(context.step, Some(IntakeStep::CollectingName));
}

#[test]
fn restarting_mid_flow_discards_previous_answers() {
    let mut context = ConversationContext::new(1);
    context.start_intake();
    context.set_field("service_context", "Чат-бот поддержки").unwrap();
    advance(&mut context, text("Иван")).unwrap();

    // A second apply button press restarts the flow from scratch
    context.start_intake();
    assert_eq!(context.get_field("name"), None);
    assert_eq!(context.get_field("service_context"), None);

    advance(&mut context, text("Пётр")).unwrap();
    advance(&mut context, text("доставка")).unwrap();
    advance(&mut context, budget("mid")).unwrap();
    advance(&mut context, text("заявки")).unwrap();
    let outcome = advance(&mut context, text("+992001")).unwrap();

    assert_matches!(outcome, StepOutcome::Finalized(form) => {
        assert_eq!(form.name, "Пётр");
        assert_eq!(form.service_context, "Общая заявка");
    });
}

#[test]
fn idle_user_is_routed_to_ai() {
    let mut context = ConversationContext::new(7);
    assert_matches!(
        advance(&mut context, text("сколько стоит бот?")).unwrap(),
        StepOutcome::Idle
    );
    assert_matches!(
        advance(&mut context, IntakeInput::Contact("+992".to_string())).unwrap(),
        StepOutcome::Idle
    );
}
