//! Transcript and state-history entries.

use serde::{Deserialize, Serialize};

use super::{ConversationState, OperationKind};
use crate::domain::foundation::{Address, Timestamp};

/// One message in a conversation transcript.
///
/// `None` on either end means the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub text: String,
    /// State of the conversation when the line was recorded.
    pub state: ConversationState,
    pub recorded_at: Timestamp,
}

impl TranscriptLine {
    pub fn is_from_bot(&self) -> bool {
        self.from.is_none()
    }

    pub fn is_to_bot(&self) -> bool {
        self.to.is_none()
    }

    /// Returns true if the line was sent by the given participant.
    pub fn is_from(&self, address: &Address) -> bool {
        self.from
            .as_ref()
            .is_some_and(|from| from.same_endpoint(address))
    }
}

/// Audit entry for a successful state operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub operation: OperationKind,
    pub from: ConversationState,
    pub to: ConversationState,
    /// Agent that triggered the operation, if any.
    pub agent: Option<Address>,
    pub at: Timestamp,
}
