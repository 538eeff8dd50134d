//! ConversationProvider port - The conversation store and its operations.
//!
//! A provider owns every customer record and the agent connection index. All
//! mutating operations are single-attempt and all-or-nothing: they either
//! commit state, index and history together or leave everything untouched.

use async_trait::async_trait;

use crate::domain::conversation::{ConversationError, ConversationRecord, Message, Operation};
use crate::domain::foundation::{Address, Timestamp};

/// Identifies a conversation by one of its participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationLookup {
    Customer(Address),
    Agent(Address),
}

/// Result of an accepted provider operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    /// Snapshot of the record after the operation.
    pub record: ConversationRecord,

    /// For watch: the agent was already watching.
    pub already_watching: bool,

    /// False when the operation was accepted but changed nothing.
    pub changed: bool,
}

/// Port for the conversation store.
///
/// Records returned by this port are snapshots; mutating them does not
/// affect the store.
#[async_trait]
pub trait ConversationProvider: Send + Sync {
    /// Applies a state operation to the customer's conversation.
    ///
    /// Creates the record on first reference.
    async fn execute(
        &self,
        customer: &Address,
        operation: Operation,
    ) -> Result<OperationOutcome, ConversationError>;

    /// Appends a customer message. Never changes state.
    async fn record_customer_message(
        &self,
        message: &Message,
    ) -> Result<ConversationRecord, ConversationError>;

    /// Appends an agent message to the conversation the agent is bound to.
    ///
    /// A watching agent's first message promotes the conversation to
    /// `Agent` through `implicit_connect`.
    ///
    /// # Errors
    ///
    /// `AgentNotInConversation` when the agent is neither bridged nor the
    /// state-determining watcher of any conversation.
    async fn record_agent_message(
        &self,
        message: &Message,
    ) -> Result<ConversationRecord, ConversationError>;

    /// Appends an agent message only if the agent holds an open bridge.
    ///
    /// Watch bindings are not consulted and no state changes. The bridge is
    /// checked under the same record lock the line is appended under.
    ///
    /// # Errors
    ///
    /// `AgentNotInConversation` when the agent is not bridged.
    async fn record_bridged_agent_message(
        &self,
        message: &Message,
    ) -> Result<ConversationRecord, ConversationError>;

    /// Appends a bot message addressed to `message.address`.
    ///
    /// # Errors
    ///
    /// `BotAttemptedToRecordMessageWhileAgentHasConnection` in `Agent` state.
    async fn record_bot_message(
        &self,
        message: &Message,
    ) -> Result<ConversationRecord, ConversationError>;

    /// Returns the customer's record without creating one.
    async fn get_conversation_for_customer(&self, customer: &Address)
        -> Option<ConversationRecord>;

    /// Returns the record the agent is bridged to, falling back to the
    /// conversation the agent determines as watcher.
    async fn get_conversation_for_agent(&self, agent: &Address) -> Option<ConversationRecord>;

    /// All records in creation order.
    async fn get_all_conversations(&self) -> Vec<ConversationRecord>;

    /// Records in `Agent` state touched at or after `since`.
    async fn get_conversations_connected_to_agent(
        &self,
        since: Timestamp,
    ) -> Vec<ConversationRecord>;

    async fn get_conversation(&self, lookup: &ConversationLookup) -> Option<ConversationRecord> {
        match lookup {
            ConversationLookup::Customer(customer) => {
                self.get_conversation_for_customer(customer).await
            }
            ConversationLookup::Agent(agent) => self.get_conversation_for_agent(agent).await,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operation wrappers
    // ─────────────────────────────────────────────────────────────────────────

    async fn connect(
        &self,
        customer: &Address,
        agent: &Address,
    ) -> Result<ConversationRecord, ConversationError> {
        let outcome = self
            .execute(customer, Operation::Connect(agent.clone()))
            .await?;
        Ok(outcome.record)
    }

    async fn disconnect(
        &self,
        customer: &Address,
        agent: &Address,
    ) -> Result<ConversationRecord, ConversationError> {
        let outcome = self
            .execute(customer, Operation::Disconnect(agent.clone()))
            .await?;
        Ok(outcome.record)
    }

    async fn queue(&self, customer: &Address) -> Result<ConversationRecord, ConversationError> {
        Ok(self.execute(customer, Operation::Queue).await?.record)
    }

    async fn dequeue(&self, customer: &Address) -> Result<ConversationRecord, ConversationError> {
        Ok(self.execute(customer, Operation::Dequeue).await?.record)
    }

    /// Adds a watcher. Repeating it is accepted and flagged in the outcome.
    async fn watch(
        &self,
        customer: &Address,
        agent: &Address,
    ) -> Result<OperationOutcome, ConversationError> {
        self.execute(customer, Operation::Watch(agent.clone())).await
    }

    async fn unwatch(
        &self,
        customer: &Address,
        agent: &Address,
    ) -> Result<ConversationRecord, ConversationError> {
        let outcome = self
            .execute(customer, Operation::Unwatch(agent.clone()))
            .await?;
        Ok(outcome.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn ConversationProvider) {}
}
