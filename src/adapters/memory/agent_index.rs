//! Agent to customer connection index.

use std::collections::HashMap;

use crate::domain::conversation::ConversationError;
use crate::domain::foundation::{Address, AddressKey};

/// Maps each bridged agent to the one customer it is bridged to.
///
/// The index is injective: an agent appears at most once. The provider keeps
/// it in step with the records, so an entry exists exactly while the
/// customer's record is in `Agent` state bound to that agent.
#[derive(Debug, Default)]
pub struct AgentConnectionIndex {
    links: HashMap<AddressKey, Address>,
}

impl AgentConnectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links `agent` to `customer`.
    ///
    /// Re-linking to the same customer is accepted.
    ///
    /// # Errors
    ///
    /// `AgentAlreadyConnectedOnConversationId` if the agent is linked to a
    /// different customer.
    pub fn link(&mut self, agent: &Address, customer: &Address) -> Result<(), ConversationError> {
        self.check_link(agent, customer)?;
        self.links.insert(agent.key(), customer.clone());
        Ok(())
    }

    /// Fails exactly when [`link`](Self::link) would, without linking.
    pub fn check_link(&self, agent: &Address, customer: &Address) -> Result<(), ConversationError> {
        match self.links.get(&agent.key()) {
            Some(existing) if !existing.same_endpoint(customer) => {
                Err(ConversationError::AgentAlreadyConnectedOnConversationId {
                    agent: agent.key(),
                    customer: existing.key(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Drops the agent's link, returning the customer it pointed at.
    pub fn unlink(&mut self, agent: &Address) -> Option<Address> {
        self.links.remove(&agent.key())
    }

    /// Returns the customer the agent is bridged to.
    pub fn resolve(&self, agent: &Address) -> Option<&Address> {
        self.links.get(&agent.key())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterates `(agent, customer)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&AddressKey, &Address)> {
        self.links.iter()
    }
}
