//! Line-oriented console front end.
//!
//! Stands in for a chat transport: each stdin line becomes an inbound
//! message or a handoff event, and outbound deliveries are printed.

mod command;
mod services;
mod session;

pub use command::{CommandError, CommandParser, ConsoleCommand};
pub use services::{EchoBot, LoggingCallbacks, QueueNotice, StateChangeLogger};
pub use session::{ConsoleSession, Step};
