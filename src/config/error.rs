//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid log filter directive: {0}")]
    InvalidLogLevel(String),

    #[error("No agent user ids or agent channel ids configured")]
    NoAgentsConfigured,

    #[error("Empty entry in {0}")]
    EmptyListEntry(&'static str),

    #[error("Console customer channel must not be empty")]
    EmptyCustomerChannel,

    #[error("Customer channel {0} is also an agent channel")]
    CustomerChannelIsAgentChannel(String),
}
