//! Conversation domain events.

use serde::{Deserialize, Serialize};

use super::{ConversationRecord, ConversationState, OperationKind};
use crate::domain::foundation::{AddressKey, DomainEvent, EventId, Timestamp};

/// Published after a provider operation changed a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationStateChanged {
    pub event_id: EventId,
    pub customer: AddressKey,
    pub operation: OperationKind,
    pub from: ConversationState,
    pub to: ConversationState,
    /// Agent address held by the record after the change.
    pub agent: Option<AddressKey>,
    pub watcher_count: usize,
    pub occurred_at: Timestamp,
}

impl ConversationStateChanged {
    /// Builds the event from the record's latest history entry.
    ///
    /// Returns `None` when the record has no history yet.
    pub fn from_record(record: &ConversationRecord) -> Option<Self> {
        let change = record.history().last()?;
        Some(Self {
            event_id: EventId::new(),
            customer: record.customer().key(),
            operation: change.operation,
            from: change.from,
            to: change.to,
            agent: record.agent().map(|a| a.key()),
            watcher_count: record.watching_agents().len(),
            occurred_at: change.at,
        })
    }
}

impl DomainEvent for ConversationStateChanged {
    const EVENT_TYPE: &'static str = "conversation.state_changed.v1";

    fn event_id(&self) -> &EventId {
        &self.event_id
    }

    fn aggregate_id(&self) -> String {
        self.customer.to_string()
    }

    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
}
