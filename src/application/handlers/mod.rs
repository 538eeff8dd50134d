//! Application handlers.
//!
//! Handlers that orchestrate conversation operations across ports.

pub mod handoff;
pub mod routing;

pub use handoff::HandoffEventHandler;
pub use routing::{
    AgentMessageRouter, BotMessageRouter, CustomerMessageRouter, CustomerRoute, InboundRoute,
    InboundRouter, RoutingError,
};
