//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-memory conversation store and provider
//! - `events` - In-memory event bus
//! - `classifier` - Configuration-backed agent classifier
//! - `delivery` - Logging message sender
//! - `console` - Stdin front end used by the `handoff-console` binary

pub mod classifier;
pub mod console;
pub mod delivery;
pub mod events;
pub mod memory;

pub use classifier::AgentDirectory;
pub use delivery::{Delivery, TracingMessageSender};
pub use events::InMemoryEventBus;
pub use memory::{AgentConnectionIndex, ConversationRegistry, InMemoryConversationProvider};
