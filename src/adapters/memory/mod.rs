//! In-memory conversation store.
//!
//! - `ConversationRegistry` - address to record mapping, lazily populated
//! - `AgentConnectionIndex` - agent to bridged customer mapping
//! - `InMemoryConversationProvider` - the `ConversationProvider` built on both

mod agent_index;
mod provider;
mod registry;

pub use agent_index::AgentConnectionIndex;
pub use provider::InMemoryConversationProvider;
pub use registry::{ConversationRegistry, SharedRecord};
