//! Console binary configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Settings for the `handoff-console` binary
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Prompt printed before each input line
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Channel assumed for bare customer names (`alice` means `webchat:alice`)
    #[serde(default = "default_customer_channel")]
    pub customer_channel: String,

    /// Channel assumed for bare agent names in operation commands
    #[serde(default = "default_agent_channel")]
    pub agent_channel: String,
}

impl ConsoleConfig {
    pub fn validate(&self, agent_channels: &[String]) -> Result<(), ValidationError> {
        let channel = self.customer_channel.trim().to_lowercase();
        if channel.is_empty() {
            return Err(ValidationError::EmptyCustomerChannel);
        }
        if agent_channels.iter().any(|c| *c == channel) {
            return Err(ValidationError::CustomerChannelIsAgentChannel(channel));
        }
        Ok(())
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            customer_channel: default_customer_channel(),
            agent_channel: default_agent_channel(),
        }
    }
}

fn default_prompt() -> String {
    "handoff> ".to_string()
}

fn default_customer_channel() -> String {
    "webchat".to_string()
}

fn default_agent_channel() -> String {
    "agents".to_string()
}
