//! In-process event bus.
//!
//! Handlers run inline in publish order. Every envelope is kept so the
//! console and the tests can read the state-change log back.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::warn;

use crate::domain::conversation::ConversationStateChanged;
use crate::domain::foundation::{AddressKey, DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

type Handlers = HashMap<String, Vec<Arc<dyn EventHandler>>>;

#[derive(Default)]
pub struct InMemoryEventBus {
    handlers: RwLock<Handlers>,
    log: Mutex<Vec<EventEnvelope>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every envelope published so far, oldest first.
    pub fn published(&self) -> Vec<EventEnvelope> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Decoded state changes, oldest first.
    pub fn state_changes(&self) -> Vec<ConversationStateChanged> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.is::<ConversationStateChanged>())
            .filter_map(|e| e.payload_as().ok())
            .collect()
    }

    /// State changes of one customer's conversation.
    pub fn state_changes_for(&self, customer: &AddressKey) -> Vec<ConversationStateChanged> {
        self.state_changes()
            .into_iter()
            .filter(|change| &change.customer == customer)
            .collect()
    }

    fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    /// Records the envelope, then runs every handler for its type.
    ///
    /// A failing handler does not stop the others; the failures are
    /// reported together.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());

        let mut failed = Vec::new();
        for handler in self.handlers_for(&event.event_type) {
            if let Err(e) = handler.handle(event.clone()).await {
                warn!(
                    handler = handler.name(),
                    event_type = %event.event_type,
                    aggregate = %event.aggregate_id,
                    error = %e,
                    "Event handler failed"
                );
                failed.push(handler.name());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Event handlers failed: {}", failed.join(", ")),
            ))
        }
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }
}
