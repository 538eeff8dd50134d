//! Port implementations the console wires in.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::BotMessageRouter;
use crate::domain::conversation::{
    ConversationRecord, ConversationStateChanged, HandoffEvent, HandoffFailure, Message,
};
use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{BotDialog, DeliveryError, EventHandler, HandoffCallbacks, WaitingHandler};

/// Bot that acknowledges every message it receives.
pub struct EchoBot {
    replies: Arc<BotMessageRouter>,
}

impl EchoBot {
    pub fn new(replies: Arc<BotMessageRouter>) -> Self {
        Self { replies }
    }
}

#[async_trait]
impl BotDialog for EchoBot {
    async fn handle(&self, message: &Message) -> Result<(), DeliveryError> {
        self.replies
            .reply(&message.address, format!("You said: {}", message.text))
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::Dialog(e.to_string()))
    }
}

/// Tells a queued customer that an agent is on the way.
pub struct QueueNotice {
    replies: Arc<BotMessageRouter>,
}

impl QueueNotice {
    pub const TEXT: &'static str = "Connecting you to the next available agent.";

    pub fn new(replies: Arc<BotMessageRouter>) -> Self {
        Self { replies }
    }
}

#[async_trait]
impl WaitingHandler for QueueNotice {
    async fn on_waiting(
        &self,
        message: &Message,
        _record: &ConversationRecord,
    ) -> Result<(), DeliveryError> {
        self.replies
            .reply(&message.address, Self::TEXT)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::Dialog(e.to_string()))
    }
}

/// Logs handoff outcomes.
pub struct LoggingCallbacks;

#[async_trait]
impl HandoffCallbacks for LoggingCallbacks {
    async fn on_success(&self, event: &HandoffEvent, record: &ConversationRecord) {
        info!(
            customer = %record.customer().key(),
            event = ?event.kind(),
            state = ?record.state(),
            "Handoff event applied"
        );
    }

    async fn on_failure(&self, failure: &HandoffFailure) {
        warn!(code = %failure.error.code(), "{}", failure);
    }
}

/// Logs every published state change.
pub struct StateChangeLogger;

#[async_trait]
impl EventHandler for StateChangeLogger {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let change: ConversationStateChanged = event.payload_as().map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Malformed state change payload: {}", e),
            )
        })?;
        info!(
            customer = %change.customer,
            operation = %change.operation,
            from = ?change.from,
            to = ?change.to,
            watchers = change.watcher_count,
            "Conversation state changed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "StateChangeLogger"
    }
}
