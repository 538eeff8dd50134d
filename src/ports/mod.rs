//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the conversation core and the outside world. Adapters implement these ports.
//!
//! ## Conversation Ports
//!
//! - `ConversationProvider` - Conversation store and the operations on it
//! - `AgentClassifier` - Decides whether an address belongs to an agent
//! - `HandoffCallbacks` - Success/failure notification for handoff events
//!
//! ## Delivery Ports
//!
//! - `MessageSender` - Outbound transmission to a participant
//! - `BotDialog` - The bot that answers unbridged customers
//! - `WaitingHandler` - What a queued customer hears instead of the bot
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events

mod agent_classifier;
mod conversation_provider;
mod event_publisher;
mod event_subscriber;
mod handoff_callbacks;
mod message_delivery;

pub use agent_classifier::AgentClassifier;
pub use conversation_provider::{ConversationLookup, ConversationProvider, OperationOutcome};
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventHandler, EventSubscriber};
pub use handoff_callbacks::HandoffCallbacks;
pub use message_delivery::{BotDialog, DeliveryError, MessageSender, WaitingHandler};
