//! CustomerMessageRouter - Routes customer messages by conversation state.

use std::sync::Arc;
use tracing::debug;

use super::RoutingError;
use crate::domain::conversation::{ConversationState, Message};
use crate::domain::foundation::Address;
use crate::ports::{BotDialog, ConversationProvider, MessageSender, WaitingHandler};

/// Where a customer message went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerRoute {
    /// Handled by the bot dialog alone.
    Bot,
    /// Mirrored to the bridged agent; the bot never saw it.
    Agent { agent: Address },
    /// Mirrored to the watchers and handled by the bot dialog.
    Watched { watchers: Vec<Address> },
    /// Handed to the waiting handler instead of the bot.
    Waiting,
    /// Mirrored to the watchers and handed to the waiting handler.
    WatchedWaiting { watchers: Vec<Address> },
}

/// Routes inbound customer messages.
///
/// | State          | Mirror to        | Then            |
/// |----------------|------------------|-----------------|
/// | `Bot`          | nobody           | bot dialog      |
/// | `Agent`        | bound agent only | nothing         |
/// | `Watch`        | all watchers     | bot dialog      |
/// | `Wait`         | nobody           | waiting handler |
/// | `WatchAndWait` | all watchers     | waiting handler |
pub struct CustomerMessageRouter {
    provider: Arc<dyn ConversationProvider>,
    sender: Arc<dyn MessageSender>,
    bot: Arc<dyn BotDialog>,
    waiting: Arc<dyn WaitingHandler>,
}

impl CustomerMessageRouter {
    pub fn new(
        provider: Arc<dyn ConversationProvider>,
        sender: Arc<dyn MessageSender>,
        bot: Arc<dyn BotDialog>,
        waiting: Arc<dyn WaitingHandler>,
    ) -> Self {
        Self {
            provider,
            sender,
            bot,
            waiting,
        }
    }

    /// Records the message, then delivers it according to the state it was
    /// recorded in.
    pub async fn route(&self, message: &Message) -> Result<CustomerRoute, RoutingError> {
        let record = self
            .provider
            .record_customer_message(message)
            .await
            .map_err(|e| RoutingError::rejected(message, e))?;

        let state = record.state();
        debug!(customer = %message.address.key(), state = ?state, "Routing customer message");

        let route = match state {
            ConversationState::Bot => CustomerRoute::Bot,
            ConversationState::Agent => match record.connected_agent() {
                Some(agent) => CustomerRoute::Agent {
                    agent: agent.clone(),
                },
                None => CustomerRoute::Bot,
            },
            ConversationState::Watch => CustomerRoute::Watched {
                watchers: record.watching_agents().to_vec(),
            },
            ConversationState::Wait => CustomerRoute::Waiting,
            ConversationState::WatchAndWait => CustomerRoute::WatchedWaiting {
                watchers: record.watching_agents().to_vec(),
            },
        };

        match &route {
            CustomerRoute::Bot => self.to_bot(message).await?,
            CustomerRoute::Agent { agent } => self.mirror(message, std::slice::from_ref(agent)).await?,
            CustomerRoute::Watched { watchers } => {
                self.mirror(message, watchers).await?;
                self.to_bot(message).await?;
            }
            CustomerRoute::Waiting => {
                self.waiting
                    .on_waiting(message, &record)
                    .await
                    .map_err(|e| RoutingError::delivery(message, e))?;
            }
            CustomerRoute::WatchedWaiting { watchers } => {
                self.mirror(message, watchers).await?;
                self.waiting
                    .on_waiting(message, &record)
                    .await
                    .map_err(|e| RoutingError::delivery(message, e))?;
            }
        }

        Ok(route)
    }

    async fn to_bot(&self, message: &Message) -> Result<(), RoutingError> {
        self.bot
            .handle(message)
            .await
            .map_err(|e| RoutingError::delivery(message, e))
    }

    async fn mirror(&self, message: &Message, recipients: &[Address]) -> Result<(), RoutingError> {
        for recipient in recipients {
            self.sender
                .send(recipient, message)
                .await
                .map_err(|e| RoutingError::delivery(message, e))?;
        }
        Ok(())
    }
}
