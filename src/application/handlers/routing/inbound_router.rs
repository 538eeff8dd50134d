//! InboundRouter - Sends each inbound message to the customer or agent side.

use std::sync::Arc;

use super::{AgentMessageRouter, CustomerMessageRouter, CustomerRoute, RoutingError};
use crate::domain::conversation::{ConversationRecord, Message};
use crate::ports::AgentClassifier;

/// Outcome of routing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundRoute {
    Customer(CustomerRoute),
    Agent(ConversationRecord),
}

pub struct InboundRouter {
    classifier: Arc<dyn AgentClassifier>,
    customers: CustomerMessageRouter,
    agents: AgentMessageRouter,
}

impl InboundRouter {
    pub fn new(
        classifier: Arc<dyn AgentClassifier>,
        customers: CustomerMessageRouter,
        agents: AgentMessageRouter,
    ) -> Self {
        Self {
            classifier,
            customers,
            agents,
        }
    }

    pub async fn route(&self, message: &Message) -> Result<InboundRoute, RoutingError> {
        if self.classifier.is_agent(&message.address).await {
            self.agents.route(message).await.map(InboundRoute::Agent)
        } else {
            self.customers.route(message).await.map(InboundRoute::Customer)
        }
    }
}
