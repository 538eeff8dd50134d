//! Handoff event handling.

mod handle_handoff_event;

pub use handle_handoff_event::HandoffEventHandler;
