//! AgentMessageRouter - Routes agent messages to their bridged customer.

use std::sync::Arc;
use tracing::debug;

use super::RoutingError;
use crate::domain::conversation::{ConversationError, ConversationRecord, Message};
use crate::ports::{ConversationProvider, MessageSender};

/// Routes inbound agent messages.
///
/// The agent's conversation is resolved through the connection index, then
/// through watch bindings. A watching agent's message promotes the
/// conversation to a bridge unless `implicit_connect` is off.
pub struct AgentMessageRouter {
    provider: Arc<dyn ConversationProvider>,
    sender: Arc<dyn MessageSender>,
    implicit_connect: bool,
}

impl AgentMessageRouter {
    pub fn new(provider: Arc<dyn ConversationProvider>, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            provider,
            sender,
            implicit_connect: true,
        }
    }

    /// Sets whether watchers may bridge by simply talking.
    pub fn with_implicit_connect(mut self, enabled: bool) -> Self {
        self.implicit_connect = enabled;
        self
    }

    /// Records the message and delivers it to the customer.
    ///
    /// Returns the record after the message was appended.
    pub async fn route(&self, message: &Message) -> Result<ConversationRecord, RoutingError> {
        let agent = &message.address;

        let record = if self.implicit_connect {
            self.provider
                .record_agent_message(message)
                .await
                .map_err(|e| RoutingError::rejected(message, e))?
        } else {
            self.provider
                .record_bridged_agent_message(message)
                .await
                .map_err(|e| match e {
                    ConversationError::AgentNotInConversation { .. } => RoutingError::NotBridged {
                        message: message.clone(),
                    },
                    other => RoutingError::rejected(message, other),
                })?
        };

        let customer = record.customer();
        debug!(agent = %agent.key(), customer = %customer.key(), "Routing agent message");
        self.sender
            .send(customer, message)
            .await
            .map_err(|e| RoutingError::delivery(message, e))?;

        Ok(record)
    }
}
