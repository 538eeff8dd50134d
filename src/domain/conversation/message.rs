//! Inbound and outbound message value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Address, Timestamp};

/// A chat message as it crosses the core.
///
/// `address` is always the participant on the far side of the transport:
/// the sender for inbound messages, the customer for bot replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub address: Address,
    pub text: String,
    pub timestamp: Timestamp,
}

impl Message {
    /// Creates a message stamped with the current time.
    pub fn new(address: Address, text: impl Into<String>) -> Self {
        Self {
            address,
            text: text.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Overrides the message timestamp.
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}
