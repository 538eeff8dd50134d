//! HandoffCallbacks port - Outcome notification for handoff events.

use async_trait::async_trait;

use crate::domain::conversation::{ConversationRecord, HandoffEvent, HandoffFailure};

/// Receives the outcome of every handoff event the application handles.
///
/// Hosts use this to tell agents "you are now connected" or to surface the
/// rejection reason. Callbacks cannot fail the operation they report on.
#[async_trait]
pub trait HandoffCallbacks: Send + Sync {
    async fn on_success(&self, event: &HandoffEvent, record: &ConversationRecord);

    async fn on_failure(&self, failure: &HandoffFailure);
}
