//! Inbound handoff events.
//!
//! One tagged union over every event kind the transport layer can raise
//! about a conversation. Each variant holds exactly the fields it needs.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{ConversationError, Operation, OperationKind};
use crate::domain::foundation::{Address, DomainError, ErrorCode};

/// A request from the transport layer to change a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HandoffEvent {
    Connect { customer: Address, agent: Address },
    Disconnect { customer: Address, agent: Address },
    Queue { customer: Address },
    Dequeue { customer: Address },
    Watch { customer: Address, agent: Address },
    Unwatch { customer: Address, agent: Address },
    /// The transport reports a failure concerning a participant.
    Error { address: Address, reason: String },
}

impl HandoffEvent {
    /// Returns the customer the event is addressed to.
    ///
    /// `Error` events carry whichever participant the transport reported.
    pub fn address(&self) -> &Address {
        match self {
            HandoffEvent::Connect { customer, .. }
            | HandoffEvent::Disconnect { customer, .. }
            | HandoffEvent::Queue { customer }
            | HandoffEvent::Dequeue { customer }
            | HandoffEvent::Watch { customer, .. }
            | HandoffEvent::Unwatch { customer, .. } => customer,
            HandoffEvent::Error { address, .. } => address,
        }
    }

    /// Converts the event into a state-machine operation.
    ///
    /// `Error` events have no operation.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            HandoffEvent::Connect { agent, .. } => Some(Operation::Connect(agent.clone())),
            HandoffEvent::Disconnect { agent, .. } => Some(Operation::Disconnect(agent.clone())),
            HandoffEvent::Queue { .. } => Some(Operation::Queue),
            HandoffEvent::Dequeue { .. } => Some(Operation::Dequeue),
            HandoffEvent::Watch { agent, .. } => Some(Operation::Watch(agent.clone())),
            HandoffEvent::Unwatch { agent, .. } => Some(Operation::Unwatch(agent.clone())),
            HandoffEvent::Error { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<OperationKind> {
        self.operation().map(|op| op.kind())
    }
}

/// Why a handoff event was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandoffError {
    #[error(transparent)]
    Rejected(#[from] ConversationError),

    #[error("Transport reported an error: {0}")]
    Reported(String),
}

impl HandoffError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HandoffError::Rejected(err) => err.code(),
            HandoffError::Reported(_) => ErrorCode::ExternalError,
        }
    }
}

/// A failed handoff event together with the event that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct HandoffFailure {
    pub event: HandoffEvent,
    pub error: HandoffError,
}

impl HandoffFailure {
    pub fn new(event: HandoffEvent, error: impl Into<HandoffError>) -> Self {
        Self {
            event,
            error: error.into(),
        }
    }
}

impl fmt::Display for HandoffFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.event.kind() {
            Some(kind) => kind.to_string(),
            None => "error".to_string(),
        };
        write!(f, "{} for {} failed: {}", label, self.event.address(), self.error)
    }
}

impl From<HandoffFailure> for DomainError {
    fn from(failure: HandoffFailure) -> Self {
        DomainError::new(failure.error.code(), failure.to_string())
            .with_detail("address", failure.event.address().key().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Address {
        Address::new("webchat", "alice")
    }

    fn agent() -> Address {
        Address::new("agents", "x")
    }

    #[test]
    fn operation_matches_variant() {
        let event = HandoffEvent::Watch {
            customer: customer(),
            agent: agent(),
        };
        assert_eq!(event.operation(), Some(Operation::Watch(agent())));
        assert_eq!(event.kind(), Some(OperationKind::Watch));
        assert_eq!(event.address(), &customer());
    }

    #[test]
    fn error_event_has_no_operation() {
        let event = HandoffEvent::Error {
            address: customer(),
            reason: "timeout".to_string(),
        };
        assert!(event.operation().is_none());
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = HandoffEvent::Queue { customer: customer() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "queue");
        assert_eq!(json["customer"]["user_id"], "alice");
    }

    #[test]
    fn failure_message_names_event_and_address() {
        let failure = HandoffFailure::new(
            HandoffEvent::Queue { customer: customer() },
            ConversationError::ConversationStateUnchanged {
                customer: customer().key(),
                state: crate::domain::conversation::ConversationState::Wait,
            },
        );

        assert_eq!(
            failure.to_string(),
            "queue for webchat:alice failed: Conversation webchat/alice is already in state Wait"
        );
        let domain: DomainError = failure.into();
        assert_eq!(domain.code, ErrorCode::ConversationStateUnchanged);
    }
}
