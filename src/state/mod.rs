//! Conversation state management
//!
//! Holds the per-user intake flow position and accumulator in a short-TTL
//! Redis store, plus the pure intake transition machine.

pub mod context;
pub mod intake;
pub mod storage;

pub use context::ConversationContext;
pub use intake::{advance, budget_label, IntakeInput, IntakeStep, LeadForm, StepOutcome, BUDGET_TIERS};
pub use storage::StateStorage;
