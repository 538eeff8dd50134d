//! Message routing.
//!
//! Routers record each message through the provider, then decide from the
//! resulting record where the message goes.

mod agent_router;
mod bot_router;
mod customer_router;
mod error;
mod inbound_router;

pub use agent_router::AgentMessageRouter;
pub use bot_router::BotMessageRouter;
pub use customer_router::{CustomerMessageRouter, CustomerRoute};
pub use error::RoutingError;
pub use inbound_router::{InboundRoute, InboundRouter};

#[cfg(test)]
pub(crate) mod test_support;
