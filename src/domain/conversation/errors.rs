//! Conversation-specific error types.
//!
//! Every variant rejects a single operation. None of them is fatal, and a
//! rejected operation leaves record, index and transcript untouched.

use thiserror::Error;

use super::ConversationState;
use crate::domain::foundation::{AddressKey, DomainError, ErrorCode};

/// Rejection reasons for conversation operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// The requested transition would leave the state as it is.
    #[error("Conversation {customer} is already in state {state:?}")]
    ConversationStateUnchanged {
        customer: AddressKey,
        state: ConversationState,
    },

    /// The connecting agent is already bridged to this customer.
    #[error("Agent {agent} is already in conversation with {customer}")]
    AgentAlreadyInConversation {
        customer: AddressKey,
        agent: AddressKey,
    },

    /// Another agent is already bridged to this customer.
    #[error("Customer {customer} is already connected to agent {connected_agent}")]
    CustomerAlreadyConnected {
        customer: AddressKey,
        connected_agent: AddressKey,
    },

    /// The agent is bridged to a different customer.
    #[error("Agent {agent} is already connected on conversation {customer}")]
    AgentAlreadyConnectedOnConversationId {
        agent: AddressKey,
        customer: AddressKey,
    },

    /// The agent has no matching binding.
    #[error("Agent {agent} is not in a conversation")]
    AgentNotInConversation { agent: AddressKey },

    /// Connect from a watched state by someone other than the binding watcher.
    #[error("Agent {agent} is not the agent watching {customer}")]
    ConnectingAgentIsNotWatching {
        customer: AddressKey,
        agent: AddressKey,
    },

    /// The bot tried to talk while an agent bridge is open.
    #[error("Bot attempted to record a message for {customer} while agent {agent} has a connection")]
    BotAttemptedToRecordMessageWhileAgentHasConnection {
        customer: AddressKey,
        agent: AddressKey,
    },

    /// The state graph does not allow this move.
    #[error("Illegal transition from {from:?} to {to:?}")]
    IllegalTransition {
        from: ConversationState,
        to: ConversationState,
    },
}

impl ConversationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConversationError::ConversationStateUnchanged { .. } => {
                ErrorCode::ConversationStateUnchanged
            }
            ConversationError::AgentAlreadyInConversation { .. } => {
                ErrorCode::AgentAlreadyInConversation
            }
            ConversationError::CustomerAlreadyConnected { .. } => {
                ErrorCode::CustomerAlreadyConnected
            }
            ConversationError::AgentAlreadyConnectedOnConversationId { .. } => {
                ErrorCode::AgentAlreadyConnected
            }
            ConversationError::AgentNotInConversation { .. } => ErrorCode::AgentNotInConversation,
            ConversationError::ConnectingAgentIsNotWatching { .. } => ErrorCode::AgentNotWatching,
            ConversationError::BotAttemptedToRecordMessageWhileAgentHasConnection { .. } => {
                ErrorCode::BotBlockedByAgent
            }
            ConversationError::IllegalTransition { .. } => ErrorCode::InvalidStateTransition,
        }
    }

    /// Returns the customer the rejection concerns, when known.
    pub fn customer(&self) -> Option<&AddressKey> {
        match self {
            ConversationError::ConversationStateUnchanged { customer, .. }
            | ConversationError::AgentAlreadyInConversation { customer, .. }
            | ConversationError::CustomerAlreadyConnected { customer, .. }
            | ConversationError::AgentAlreadyConnectedOnConversationId { customer, .. }
            | ConversationError::ConnectingAgentIsNotWatching { customer, .. }
            | ConversationError::BotAttemptedToRecordMessageWhileAgentHasConnection {
                customer,
                ..
            } => Some(customer),
            ConversationError::AgentNotInConversation { .. }
            | ConversationError::IllegalTransition { .. } => None,
        }
    }
}

impl From<ConversationError> for DomainError {
    fn from(err: ConversationError) -> Self {
        let code = err.code();
        let customer = err.customer().map(ToString::to_string);
        let error = DomainError::new(code, err.to_string());
        match customer {
            Some(customer) => error.with_detail("customer", customer),
            None => error,
        }
    }
}
