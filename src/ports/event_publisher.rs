//! EventPublisher port - Where conversation state changes are announced.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Accepts published events.
///
/// Events for one conversation must reach subscribers in publish order.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;
}
