//! Message sender that logs deliveries instead of transmitting them.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use crate::domain::conversation::Message;
use crate::domain::foundation::Address;
use crate::ports::{DeliveryError, MessageSender};

/// One outbound message and its recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: Address,
    pub message: Message,
}

/// Logs every delivery through `tracing` and keeps it for inspection.
///
/// Used by the console binary, where "delivering" means printing.
#[derive(Debug, Default)]
pub struct TracingMessageSender {
    sent: Mutex<Vec<Delivery>>,
}

impl TracingMessageSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns everything delivered so far.
    pub fn drain(&self) -> Vec<Delivery> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl MessageSender for TracingMessageSender {
    async fn send(&self, to: &Address, message: &Message) -> Result<(), DeliveryError> {
        tracing::info!(
            to = %to.key(),
            from = %message.address.key(),
            text = %message.text,
            "Delivering message"
        );
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Delivery {
                to: to.clone(),
                message: message.clone(),
            });
        Ok(())
    }
}
