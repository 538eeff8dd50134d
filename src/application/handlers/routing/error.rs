//! Routing errors.

use thiserror::Error;

use crate::domain::conversation::{ConversationError, Message};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::DeliveryError;

/// Why an inbound or outbound message was not routed.
///
/// Every variant carries the message that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("Message from {} rejected: {error}", .message.address)]
    Rejected {
        message: Message,
        #[source]
        error: ConversationError,
    },

    /// The agent has no open bridge and implicit promotion is disabled.
    #[error("Agent {} is not connected to a customer", .message.address)]
    NotBridged { message: Message },

    #[error("Message from {} could not be delivered: {error}", .message.address)]
    Delivery {
        message: Message,
        #[source]
        error: DeliveryError,
    },
}

impl RoutingError {
    pub(crate) fn rejected(message: &Message, error: ConversationError) -> Self {
        RoutingError::Rejected {
            message: message.clone(),
            error,
        }
    }

    pub(crate) fn delivery(message: &Message, error: DeliveryError) -> Self {
        RoutingError::Delivery {
            message: message.clone(),
            error,
        }
    }

    pub fn message(&self) -> &Message {
        match self {
            RoutingError::Rejected { message, .. }
            | RoutingError::NotBridged { message }
            | RoutingError::Delivery { message, .. } => message,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RoutingError::Rejected { error, .. } => error.code(),
            RoutingError::NotBridged { .. } => ErrorCode::AgentNotInConversation,
            RoutingError::Delivery { .. } => ErrorCode::DeliveryFailed,
        }
    }
}

impl From<RoutingError> for DomainError {
    fn from(err: RoutingError) -> Self {
        DomainError::new(err.code(), err.to_string())
            .with_detail("address", err.message().address.key().to_string())
    }
}
