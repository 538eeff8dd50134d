//! Participant addresses and their canonical keys.
//!
//! An [`Address`] is what the transport hands us: everything needed to reach a
//! participant again. An [`AddressKey`] is the stable part of it, used for
//! equality and map lookups so that two deliveries from the same endpoint
//! (possibly with a different service URL) land on the same conversation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Endpoint of a conversation participant (customer or agent).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Channel the participant is reached through (e.g. "webchat", "teams").
    pub channel_id: String,

    /// User identifier within the channel.
    pub user_id: String,

    /// Channel conversation identifier, when the channel has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    /// Service URL used by the transport to reply. Not part of the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
}

impl Address {
    /// Creates an address for a user on a channel.
    pub fn new(channel_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            conversation_id: None,
            service_url: None,
        }
    }

    /// Sets the channel conversation identifier.
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Sets the reply service URL.
    pub fn with_service_url(mut self, service_url: impl Into<String>) -> Self {
        self.service_url = Some(service_url.into());
        self
    }

    /// Returns the canonical key for this address.
    pub fn key(&self) -> AddressKey {
        AddressKey::from(self)
    }

    /// Returns true if both addresses denote the same participant.
    pub fn same_endpoint(&self, other: &Address) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.conversation_id {
            Some(conversation) => write!(f, "{}:{}@{}", self.channel_id, self.user_id, conversation),
            None => write!(f, "{}:{}", self.channel_id, self.user_id),
        }
    }
}

/// Parses `channel:user` or `channel:user@conversation`.
impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (channel, rest) = s
            .split_once(':')
            .ok_or_else(|| ValidationError::invalid_format("address", "expected channel:user"))?;
        let (user, conversation) = match rest.split_once('@') {
            Some((user, conversation)) => (user, Some(conversation)),
            None => (rest, None),
        };

        if channel.trim().is_empty() {
            return Err(ValidationError::empty_field("channel_id"));
        }
        if user.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }

        let mut address = Address::new(channel.trim(), user.trim());
        if let Some(conversation) = conversation.map(str::trim).filter(|c| !c.is_empty()) {
            address = address.with_conversation(conversation);
        }
        Ok(address)
    }
}

/// Canonical, comparable form of an [`Address`].
///
/// The channel id is trimmed and lower-cased. The endpoint is the channel
/// conversation id when present, otherwise the user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AddressKey {
    channel_id: String,
    endpoint_id: String,
}

impl AddressKey {
    /// Builds a key from raw parts, applying the same canonicalization as
    /// [`Address::key`].
    pub fn new(channel_id: &str, endpoint_id: &str) -> Self {
        Self {
            channel_id: channel_id.trim().to_lowercase(),
            endpoint_id: endpoint_id.trim().to_string(),
        }
    }

    /// Returns the canonical channel id.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Returns the endpoint id (conversation id or user id).
    pub fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }
}

impl From<&Address> for AddressKey {
    fn from(address: &Address) -> Self {
        let endpoint = address
            .conversation_id
            .as_deref()
            .unwrap_or(address.user_id.as_str());
        AddressKey::new(&address.channel_id, endpoint)
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel_id, self.endpoint_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod keys {
        use super::*;

        #[test]
        fn key_uses_user_id_without_conversation() {
            let address = Address::new("webchat", "alice");
            assert_eq!(address.key(), AddressKey::new("webchat", "alice"));
        }

        #[test]
        fn key_prefers_conversation_id() {
            let address = Address::new("teams", "alice").with_conversation("conv-1");
            assert_eq!(address.key().endpoint_id(), "conv-1");
        }

        #[test]
        fn key_ignores_service_url() {
            let a = Address::new("webchat", "alice").with_service_url("https://a.example.com");
            let b = Address::new("webchat", "alice").with_service_url("https://b.example.com");
            assert_ne!(a, b);
            assert_eq!(a.key(), b.key());
            assert!(a.same_endpoint(&b));
        }

        #[test]
        fn key_canonicalizes_channel_case_and_whitespace() {
            let a = Address::new(" WebChat ", "alice");
            let b = Address::new("webchat", "alice");
            assert_eq!(a.key(), b.key());
        }

        #[test]
        fn key_keeps_endpoint_case() {
            let a = Address::new("webchat", "Alice");
            let b = Address::new("webchat", "alice");
            assert_ne!(a.key(), b.key());
        }

        #[test]
        fn key_displays_channel_and_endpoint() {
            let key = Address::new("webchat", "alice").key();
            assert_eq!(key.to_string(), "webchat/alice");
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn parses_channel_and_user() {
            let address: Address = "webchat:alice".parse().unwrap();
            assert_eq!(address, Address::new("webchat", "alice"));
        }

        #[test]
        fn parses_conversation_suffix() {
            let address: Address = "teams:bob@conv-9".parse().unwrap();
            assert_eq!(address.conversation_id.as_deref(), Some("conv-9"));
            assert_eq!(address.to_string(), "teams:bob@conv-9");
        }

        #[test]
        fn rejects_missing_separator() {
            assert!("alice".parse::<Address>().is_err());
        }

        #[test]
        fn rejects_empty_user() {
            let result = "webchat: ".parse::<Address>();
            assert!(matches!(result, Err(ValidationError::EmptyField { .. })));
        }
    }

    #[test]
    fn serializes_without_optional_fields() {
        let json = serde_json::to_string(&Address::new("webchat", "alice")).unwrap();
        assert_eq!(json, r#"{"channel_id":"webchat","user_id":"alice"}"#);
    }
}
