//! In-memory conversation provider.
//!
//! Composes the registry, the connection index and the state machine into the
//! [`ConversationProvider`] port. Lock order is registry map, then record,
//! then index; no lock is taken while a later one in that order is held.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{AgentConnectionIndex, ConversationRegistry, SharedRecord};
use crate::domain::conversation::{
    ConversationError, ConversationRecord, ConversationStateMachine, Message, Operation, Transition,
};
use crate::domain::foundation::{Address, AddressKey, Timestamp};
use crate::ports::{ConversationProvider, OperationOutcome};

/// Provider that keeps every conversation in process memory.
///
/// Lives as long as the host wires it; nothing here is global.
pub struct InMemoryConversationProvider {
    registry: Arc<ConversationRegistry>,
    index: Mutex<AgentConnectionIndex>,
}

impl InMemoryConversationProvider {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ConversationRegistry::new()),
            index: Mutex::new(AgentConnectionIndex::new()),
        }
    }

    /// Serves an existing registry, e.g. one shared with a read model.
    ///
    /// The connection index is rebuilt from the records in `Agent` state.
    ///
    /// # Errors
    ///
    /// `AgentAlreadyConnectedOnConversationId` when two records are bridged
    /// to the same agent.
    pub async fn with_registry(
        registry: Arc<ConversationRegistry>,
    ) -> Result<Self, ConversationError> {
        let mut index = AgentConnectionIndex::new();
        for shared in registry.all().await {
            let record = shared.lock().await;
            if let Some(agent) = record.connected_agent() {
                index.link(agent, record.customer())?;
            }
        }
        debug!(bridges = index.len(), "Connection index rebuilt");

        Ok(Self {
            registry,
            index: Mutex::new(index),
        })
    }

    pub fn registry(&self) -> &Arc<ConversationRegistry> {
        &self.registry
    }

    /// Returns the customer the agent is bridged to, per the index.
    pub async fn resolve_agent(&self, agent: &Address) -> Option<Address> {
        self.index.lock().await.resolve(agent).cloned()
    }

    /// Snapshot of the connection index as `(agent, customer)` pairs.
    pub async fn connections(&self) -> Vec<(AddressKey, Address)> {
        let index = self.index.lock().await;
        index
            .iter()
            .map(|(agent, customer)| (agent.clone(), customer.clone()))
            .collect()
    }

    /// Finds the earliest-created conversation the agent determines as watcher.
    async fn find_watched_by(&self, agent: &Address) -> Option<SharedRecord> {
        for shared in self.registry.all().await {
            let record = shared.lock().await;
            let determines = record.state().is_watched()
                && record.agent().is_some_and(|bound| bound.same_endpoint(agent));
            drop(record);
            if determines {
                return Some(shared);
            }
        }
        None
    }

    /// Finds the record the agent is bridged to, per the index.
    async fn find_bridged(&self, agent: &Address) -> Option<SharedRecord> {
        let customer = self.resolve_agent(agent).await?;
        self.registry.get_by_key(&customer.key()).await
    }

    /// Finds the record an agent message belongs to.
    async fn find_for_agent(&self, agent: &Address) -> Option<SharedRecord> {
        if let Some(shared) = self.find_bridged(agent).await {
            return Some(shared);
        }
        self.find_watched_by(agent).await
    }

    /// Applies an accepted transition, keeping the index in step.
    ///
    /// The caller holds the record lock for the whole call.
    async fn commit(
        &self,
        record: &mut ConversationRecord,
        transition: &Transition,
    ) -> Result<(), ConversationError> {
        let customer = record.customer().key();
        if transition.is_noop() {
            debug!(customer = %customer, operation = %transition.kind(), "Operation changed nothing");
            return Ok(());
        }

        let at = Timestamp::now();
        if transition.opens_bridge() || transition.closes_bridge() {
            let mut index = self.index.lock().await;
            if transition.opens_bridge() {
                if let Some(agent) = transition.agent() {
                    index.link(agent, record.customer())?;
                    info!(customer = %customer, agent = %agent.key(), "Agent bridge opened");
                }
            } else if let Some(agent) = record.agent() {
                index.unlink(agent);
                info!(customer = %customer, agent = %agent.key(), "Agent bridge closed");
            }
            record.apply(transition, at);
        } else {
            record.apply(transition, at);
        }

        debug!(
            customer = %customer,
            operation = %transition.kind(),
            from = ?transition.from(),
            to = ?transition.to(),
            watchers = record.watching_agents().len(),
            "Conversation updated"
        );
        Ok(())
    }
}

impl Default for InMemoryConversationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationProvider for InMemoryConversationProvider {
    async fn execute(
        &self,
        customer: &Address,
        operation: Operation,
    ) -> Result<OperationOutcome, ConversationError> {
        let shared = self.registry.get(customer).await;
        let mut record = shared.lock().await;

        let computed = ConversationStateMachine::transition(&record.transition_context(), &operation);
        let result = match computed {
            Ok(transition) => self
                .commit(&mut record, &transition)
                .await
                .map(|()| transition),
            Err(err) => Err(err),
        };

        match result {
            Ok(transition) => Ok(OperationOutcome {
                record: record.clone(),
                already_watching: transition.already_watching(),
                changed: !transition.is_noop(),
            }),
            Err(err) => {
                warn!(
                    customer = %customer.key(),
                    operation = %operation.kind(),
                    state = ?record.state(),
                    error = %err,
                    "Operation rejected"
                );
                Err(err)
            }
        }
    }

    async fn record_customer_message(
        &self,
        message: &Message,
    ) -> Result<ConversationRecord, ConversationError> {
        let shared = self.registry.get(&message.address).await;
        let mut record = shared.lock().await;

        let to = record.connected_agent().cloned();
        record.append_line(
            Some(message.address.clone()),
            to,
            message.text.as_str(),
            Timestamp::now(),
        );
        Ok(record.clone())
    }

    async fn record_agent_message(
        &self,
        message: &Message,
    ) -> Result<ConversationRecord, ConversationError> {
        let agent = &message.address;
        let not_in_conversation = || ConversationError::AgentNotInConversation { agent: agent.key() };

        let shared = match self.find_for_agent(agent).await {
            Some(shared) => shared,
            None => {
                warn!(agent = %agent.key(), "Agent message without a conversation");
                return Err(not_in_conversation());
            }
        };
        let mut record = shared.lock().await;

        // The record may have moved on since it was looked up; the state
        // machine re-checks the binding under the lock.
        let transition =
            ConversationStateMachine::implicit_connect(&record.transition_context(), agent)
                .map_err(|err| {
                    warn!(agent = %agent.key(), state = ?record.state(), error = %err, "Agent message rejected");
                    err
                })?;
        self.commit(&mut record, &transition).await?;

        let customer = record.customer().clone();
        record.append_line(
            Some(agent.clone()),
            Some(customer),
            message.text.as_str(),
            Timestamp::now(),
        );
        Ok(record.clone())
    }

    async fn record_bridged_agent_message(
        &self,
        message: &Message,
    ) -> Result<ConversationRecord, ConversationError> {
        let agent = &message.address;
        let not_in_conversation = || ConversationError::AgentNotInConversation { agent: agent.key() };

        let Some(shared) = self.find_bridged(agent).await else {
            warn!(agent = %agent.key(), "Agent message outside a bridge");
            return Err(not_in_conversation());
        };
        let mut record = shared.lock().await;

        // The bridge may have closed between the index lookup and the lock.
        let bridged = record
            .connected_agent()
            .is_some_and(|bound| bound.same_endpoint(agent));
        if !bridged {
            warn!(agent = %agent.key(), state = ?record.state(), "Agent bridge closed before message");
            return Err(not_in_conversation());
        }

        let customer = record.customer().clone();
        record.append_line(
            Some(agent.clone()),
            Some(customer),
            message.text.as_str(),
            Timestamp::now(),
        );
        Ok(record.clone())
    }

    async fn record_bot_message(
        &self,
        message: &Message,
    ) -> Result<ConversationRecord, ConversationError> {
        let shared = self.registry.get(&message.address).await;
        let mut record = shared.lock().await;

        if let Some(agent) = record.connected_agent() {
            let err = ConversationError::BotAttemptedToRecordMessageWhileAgentHasConnection {
                customer: record.customer().key(),
                agent: agent.key(),
            };
            warn!(customer = %message.address.key(), error = %err, "Bot message rejected");
            return Err(err);
        }

        let customer = record.customer().clone();
        record.append_line(None, Some(customer), message.text.as_str(), Timestamp::now());
        Ok(record.clone())
    }

    async fn get_conversation_for_customer(
        &self,
        customer: &Address,
    ) -> Option<ConversationRecord> {
        let shared = self.registry.get_if_exists(customer).await?;
        let record = shared.lock().await;
        Some(record.clone())
    }

    async fn get_conversation_for_agent(&self, agent: &Address) -> Option<ConversationRecord> {
        let shared = self.find_for_agent(agent).await?;
        let record = shared.lock().await;
        Some(record.clone())
    }

    async fn get_all_conversations(&self) -> Vec<ConversationRecord> {
        let mut records = Vec::new();
        for shared in self.registry.all().await {
            records.push(shared.lock().await.clone());
        }
        records
    }

    async fn get_conversations_connected_to_agent(
        &self,
        since: Timestamp,
    ) -> Vec<ConversationRecord> {
        let mut records = Vec::new();
        for shared in self.registry.all().await {
            let record = shared.lock().await;
            if record.state().is_bridged() && !record.updated_at().is_before(&since) {
                records.push(record.clone());
            }
        }
        records
    }
}
