//! HandoffEventHandler - Applies transport handoff events to conversations.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::conversation::{
    ConversationStateChanged, HandoffError, HandoffEvent, HandoffFailure, Operation,
};
use crate::domain::foundation::EventEnvelope;
use crate::ports::{ConversationProvider, EventPublisher, HandoffCallbacks, OperationOutcome};

/// Dispatches each [`HandoffEvent`] to the provider, announces the change
/// and reports the outcome through [`HandoffCallbacks`].
pub struct HandoffEventHandler {
    provider: Arc<dyn ConversationProvider>,
    event_publisher: Arc<dyn EventPublisher>,
    callbacks: Arc<dyn HandoffCallbacks>,
}

impl HandoffEventHandler {
    pub fn new(
        provider: Arc<dyn ConversationProvider>,
        event_publisher: Arc<dyn EventPublisher>,
        callbacks: Arc<dyn HandoffCallbacks>,
    ) -> Self {
        Self {
            provider,
            event_publisher,
            callbacks,
        }
    }

    /// Handles one event.
    ///
    /// Exactly one callback fires per call. A failure carries the event that
    /// caused it.
    pub async fn handle(&self, event: HandoffEvent) -> Result<OperationOutcome, HandoffFailure> {
        match self.dispatch(&event).await {
            Ok(outcome) => {
                if outcome.changed {
                    self.announce(&outcome).await;
                }
                self.callbacks.on_success(&event, &outcome.record).await;
                Ok(outcome)
            }
            Err(error) => {
                let failure = HandoffFailure::new(event, error);
                warn!(code = %failure.error.code(), error = %failure, "Handoff event failed");
                self.callbacks.on_failure(&failure).await;
                Err(failure)
            }
        }
    }

    async fn dispatch(&self, event: &HandoffEvent) -> Result<OperationOutcome, HandoffError> {
        let outcome = match event {
            HandoffEvent::Connect { customer, agent } => {
                self.provider
                    .execute(customer, Operation::Connect(agent.clone()))
                    .await?
            }
            HandoffEvent::Disconnect { customer, agent } => {
                self.provider
                    .execute(customer, Operation::Disconnect(agent.clone()))
                    .await?
            }
            HandoffEvent::Queue { customer } => {
                self.provider.execute(customer, Operation::Queue).await?
            }
            HandoffEvent::Dequeue { customer } => {
                self.provider.execute(customer, Operation::Dequeue).await?
            }
            HandoffEvent::Watch { customer, agent } => {
                self.provider
                    .execute(customer, Operation::Watch(agent.clone()))
                    .await?
            }
            HandoffEvent::Unwatch { customer, agent } => {
                self.provider
                    .execute(customer, Operation::Unwatch(agent.clone()))
                    .await?
            }
            HandoffEvent::Error { reason, .. } => {
                return Err(HandoffError::Reported(reason.clone()));
            }
        };
        Ok(outcome)
    }

    /// Publishes the state change. The operation has already committed, so
    /// a publishing failure is logged and does not fail the event.
    async fn announce(&self, outcome: &OperationOutcome) {
        let Some(event) = ConversationStateChanged::from_record(&outcome.record) else {
            return;
        };

        let envelope = match EventEnvelope::from_event(&event) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(customer = %event.customer, error = %e, "Failed to serialize state change");
                return;
            }
        };

        match self.event_publisher.publish(envelope).await {
            Ok(()) => debug!(customer = %event.customer, to = ?event.to, "Published state change"),
            Err(e) => warn!(customer = %event.customer, error = %e, "Failed to publish state change"),
        }
    }
}
