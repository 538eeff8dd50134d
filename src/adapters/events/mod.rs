//! Event bus adapters.
//!
//! - `InMemoryEventBus` - In-process bus that keeps the state-change log

mod in_memory;

pub use in_memory::InMemoryEventBus;
