//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and event infrastructure
//! that form the vocabulary of the handoff domain.

mod address;
mod errors;
mod events;
mod state_machine;
mod timestamp;

pub use address::{Address, AddressKey};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId};
pub use state_machine::{InvalidTransition, StateMachine};
pub use timestamp::Timestamp;
