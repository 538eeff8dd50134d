//! Static agent directory built from configuration.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::config::RoutingConfig;
use crate::domain::foundation::Address;
use crate::ports::AgentClassifier;

/// Classifies addresses against fixed sets of agent user ids and channels.
#[derive(Debug, Clone, Default)]
pub struct AgentDirectory {
    user_ids: HashSet<String>,
    channel_ids: HashSet<String>,
}

impl AgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        let mut directory = Self::new();
        for user in config.agent_user_ids_list() {
            directory = directory.with_user(user);
        }
        for channel in config.agent_channel_ids_list() {
            directory = directory.with_channel(channel);
        }
        directory
    }

    /// Treats `user_id` as an agent on every channel.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_ids.insert(user_id.into().trim().to_string());
        self
    }

    /// Treats every participant of `channel_id` as an agent.
    pub fn with_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_ids
            .insert(channel_id.into().trim().to_lowercase());
        self
    }

    pub fn contains(&self, address: &Address) -> bool {
        let key = address.key();
        self.channel_ids.contains(key.channel_id())
            || self.user_ids.contains(address.user_id.trim())
    }
}

#[async_trait]
impl AgentClassifier for AgentDirectory {
    async fn is_agent(&self, address: &Address) -> bool {
        self.contains(address)
    }
}
