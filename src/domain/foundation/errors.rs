//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    ConversationNotFound,

    // State errors
    InvalidStateTransition,
    ConversationStateUnchanged,
    AgentAlreadyInConversation,
    CustomerAlreadyConnected,
    AgentAlreadyConnected,
    AgentNotInConversation,
    AgentNotWatching,
    BotBlockedByAgent,

    // Delivery errors
    DeliveryFailed,
    ExternalError,

    // Infrastructure errors
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::ConversationNotFound => "CONVERSATION_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::ConversationStateUnchanged => "CONVERSATION_STATE_UNCHANGED",
            ErrorCode::AgentAlreadyInConversation => "AGENT_ALREADY_IN_CONVERSATION",
            ErrorCode::CustomerAlreadyConnected => "CUSTOMER_ALREADY_CONNECTED",
            ErrorCode::AgentAlreadyConnected => "AGENT_ALREADY_CONNECTED_ON_CONVERSATION_ID",
            ErrorCode::AgentNotInConversation => "AGENT_NOT_IN_CONVERSATION",
            ErrorCode::AgentNotWatching => "CONNECTING_AGENT_IS_NOT_WATCHING",
            ErrorCode::BotBlockedByAgent => "BOT_ATTEMPTED_TO_RECORD_MESSAGE_WHILE_AGENT_HAS_CONNECTION",
            ErrorCode::DeliveryFailed => "DELIVERY_FAILED",
            ErrorCode::ExternalError => "EXTERNAL_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::new(ErrorCode::ValidationFailed, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("user_id");
        assert_eq!(format!("{}", err), "Field 'user_id' cannot be empty");
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("address", "expected channel:user");
        assert_eq!(
            format!("{}", err),
            "Field 'address' has invalid format: expected channel:user"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::ConversationNotFound, "No conversation");
        assert_eq!(format!("{}", err), "[CONVERSATION_NOT_FOUND] No conversation");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::new(ErrorCode::AgentNotInConversation, "Agent not bridged")
            .with_detail("agent", "webchat/agent-1");

        assert_eq!(err.details.get("agent"), Some(&"webchat/agent-1".to_string()));
    }

    #[test]
    fn validation_error_converts_to_domain_error() {
        let err: DomainError = ValidationError::empty_field("channel_id").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(
            format!("{}", ErrorCode::ConversationStateUnchanged),
            "CONVERSATION_STATE_UNCHANGED"
        );
        assert_eq!(format!("{}", ErrorCode::InternalError), "INTERNAL_ERROR");
    }
}
