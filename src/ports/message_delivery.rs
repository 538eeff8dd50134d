//! Message delivery ports - Outbound transmission and bot hand-off points.
//!
//! The routers decide *where* a message goes; these ports do the going.

use async_trait::async_trait;

use crate::domain::conversation::{ConversationRecord, Message};
use crate::domain::foundation::{Address, AddressKey};

/// Errors raised by delivery adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("Recipient {0} is unreachable")]
    Unreachable(AddressKey),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Bot dialog failed: {0}")]
    Dialog(String),
}

/// Sends a message to a participant.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Delivers `message` verbatim to `to`.
    ///
    /// `message.address` still names the original author.
    async fn send(&self, to: &Address, message: &Message) -> Result<(), DeliveryError>;
}

/// The bot that answers customers while no agent is bridged.
#[async_trait]
pub trait BotDialog: Send + Sync {
    async fn handle(&self, message: &Message) -> Result<(), DeliveryError>;
}

/// Invoked for customer messages while the customer is queued.
#[async_trait]
pub trait WaitingHandler: Send + Sync {
    async fn on_waiting(
        &self,
        message: &Message,
        record: &ConversationRecord,
    ) -> Result<(), DeliveryError>;
}
