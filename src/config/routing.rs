//! Routing configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Routing configuration
///
/// Agent identities are configured as comma-separated lists, e.g.
/// `HANDOFF__ROUTING__AGENT_USER_IDS=alice,bob`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// User ids that belong to agents on any channel
    pub agent_user_ids: Option<String>,

    /// Channels whose every participant is an agent
    #[serde(default = "default_agent_channel_ids")]
    pub agent_channel_ids: Option<String>,

    /// Whether a watching agent's message promotes the conversation to a
    /// bridge. When false such messages are rejected by the agent router.
    #[serde(default = "default_implicit_connect")]
    pub implicit_connect: bool,
}

impl RoutingConfig {
    pub fn agent_user_ids_list(&self) -> Vec<String> {
        split_list(self.agent_user_ids.as_deref())
    }

    /// Agent channel ids, lower-cased to match address keys.
    pub fn agent_channel_ids_list(&self) -> Vec<String> {
        split_list(self.agent_channel_ids.as_deref())
            .into_iter()
            .map(|c| c.to_lowercase())
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if has_empty_entry(self.agent_user_ids.as_deref()) {
            return Err(ValidationError::EmptyListEntry("agent_user_ids"));
        }
        if has_empty_entry(self.agent_channel_ids.as_deref()) {
            return Err(ValidationError::EmptyListEntry("agent_channel_ids"));
        }
        if self.agent_user_ids_list().is_empty() && self.agent_channel_ids_list().is_empty() {
            return Err(ValidationError::NoAgentsConfigured);
        }
        Ok(())
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            agent_user_ids: None,
            agent_channel_ids: default_agent_channel_ids(),
            implicit_connect: default_implicit_connect(),
        }
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// A trailing comma is tolerated, a blank entry between two commas is not.
fn has_empty_entry(raw: Option<&str>) -> bool {
    raw.map(|s| {
        let entries: Vec<&str> = s.trim().trim_end_matches(',').split(',').collect();
        !s.trim().is_empty() && entries.iter().any(|e| e.trim().is_empty())
    })
    .unwrap_or(false)
}

fn default_agent_channel_ids() -> Option<String> {
    Some("agents".to_string())
}

fn default_implicit_connect() -> bool {
    true
}
