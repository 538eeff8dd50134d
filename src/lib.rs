//! Handoff - Conversation routing between a bot, customers and human agents
//!
//! Each customer conversation is a record in one of five delivery states.
//! Handoff events move records between states under a fixed transition
//! graph, and inbound messages are transcribed and routed according to the
//! state they arrive in.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
