//! Conversation domain module.
//!
//! Per-customer conversation records, the delivery-state machine that governs
//! bot/agent handoff, and the transcript each record keeps.

mod errors;
mod events;
mod handoff;
mod message;
mod record;
mod state;
mod transcript;
mod transition;

#[cfg(test)]
mod proptests;

pub use errors::ConversationError;
pub use events::ConversationStateChanged;
pub use handoff::{HandoffError, HandoffEvent, HandoffFailure};
pub use message::Message;
pub use record::ConversationRecord;
pub use state::ConversationState;
pub use transcript::{StateChange, TranscriptLine};
pub use transition::{
    AgentBinding, ConversationStateMachine, Operation, OperationKind, Transition,
    TransitionContext, WatcherChange,
};
