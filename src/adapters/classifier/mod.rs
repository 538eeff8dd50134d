//! Agent classifier adapters.

mod agent_directory;

pub use agent_directory::AgentDirectory;
