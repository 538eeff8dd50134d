//! AgentClassifier port - Tells agents apart from customers.

use async_trait::async_trait;

use crate::domain::foundation::Address;

/// Decides whether an inbound address belongs to a human agent.
///
/// Everything that is not an agent is treated as a customer.
#[async_trait]
pub trait AgentClassifier: Send + Sync {
    async fn is_agent(&self, address: &Address) -> bool;
}
