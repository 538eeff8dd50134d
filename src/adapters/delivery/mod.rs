//! Outbound delivery adapters.

mod tracing_sender;

pub use tracing_sender::{Delivery, TracingMessageSender};
