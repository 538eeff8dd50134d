//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (addresses, timestamps, errors, events)
//! - `conversation` - Conversation records, delivery states and transition rules

pub mod conversation;
pub mod foundation;
