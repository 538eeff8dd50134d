//! Application layer - Handlers and routers.
//!
//! This layer orchestrates conversation operations and coordinates between
//! ports. Handoff events change conversation state; routers move messages.

pub mod handlers;

pub use handlers::{
    // Handoff events
    HandoffEventHandler,
    // Message routing
    AgentMessageRouter, BotMessageRouter, CustomerMessageRouter, CustomerRoute, InboundRoute,
    InboundRouter, RoutingError,
};
