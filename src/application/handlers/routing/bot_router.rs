//! BotMessageRouter - Delivers bot replies.

use std::sync::Arc;

use super::RoutingError;
use crate::domain::conversation::{ConversationRecord, Message};
use crate::domain::foundation::Address;
use crate::ports::{ConversationProvider, MessageSender};

/// Records a bot reply, sends it to the customer and mirrors it to the
/// watchers while the conversation is watched.
pub struct BotMessageRouter {
    provider: Arc<dyn ConversationProvider>,
    sender: Arc<dyn MessageSender>,
}

impl BotMessageRouter {
    pub fn new(provider: Arc<dyn ConversationProvider>, sender: Arc<dyn MessageSender>) -> Self {
        Self { provider, sender }
    }

    /// Sends `text` from the bot to `customer`.
    ///
    /// Rejected while an agent is bridged; nothing is recorded or sent then.
    pub async fn reply(
        &self,
        customer: &Address,
        text: impl Into<String> + Send,
    ) -> Result<ConversationRecord, RoutingError> {
        let message = Message::new(customer.clone(), text);
        let record = self
            .provider
            .record_bot_message(&message)
            .await
            .map_err(|e| RoutingError::rejected(&message, e))?;

        self.sender
            .send(customer, &message)
            .await
            .map_err(|e| RoutingError::delivery(&message, e))?;

        if record.state().is_watched() {
            for watcher in record.watching_agents() {
                self.sender
                    .send(watcher, &message)
                    .await
                    .map_err(|e| RoutingError::delivery(&message, e))?;
            }
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::RecordingSender;
    use super::*;
    use crate::adapters::InMemoryConversationProvider;
    use crate::domain::conversation::ConversationError;

    fn customer() -> Address {
        Address::new("webchat", "c")
    }

    fn agent(id: &str) -> Address {
        Address::new("agents", id)
    }

    #[tokio::test]
    async fn reply_reaches_customer_and_watchers() {
        let provider = Arc::new(InMemoryConversationProvider::new());
        let sender = Arc::new(RecordingSender::default());
        provider.watch(&customer(), &agent("y")).await.unwrap();
        let router = BotMessageRouter::new(provider, sender.clone());

        let record = router.reply(&customer(), "How can I help?").await.unwrap();

        assert_eq!(sender.recipients(), vec![customer(), agent("y")]);
        assert!(record.transcript()[0].is_from_bot());
    }

    #[tokio::test]
    async fn reply_in_bot_state_reaches_customer_only() {
        let provider = Arc::new(InMemoryConversationProvider::new());
        let sender = Arc::new(RecordingSender::default());
        let router = BotMessageRouter::new(provider, sender.clone());

        router.reply(&customer(), "Hello!").await.unwrap();

        assert_eq!(sender.recipients(), vec![customer()]);
    }

    #[tokio::test]
    async fn reply_during_bridge_is_rejected_and_not_sent() {
        let provider = Arc::new(InMemoryConversationProvider::new());
        let sender = Arc::new(RecordingSender::default());
        provider.connect(&customer(), &agent("x")).await.unwrap();
        let router = BotMessageRouter::new(provider, sender.clone());

        let err = router.reply(&customer(), "auto").await.unwrap_err();

        assert!(matches!(
            err,
            RoutingError::Rejected {
                error: ConversationError::BotAttemptedToRecordMessageWhileAgentHasConnection { .. },
                ..
            }
        ));
        assert!(sender.sent().is_empty());
    }
}
