//! Conversation delivery state.
//!
//! A conversation is on two independent axes: whether the customer is queued
//! for an agent, and whether one or more agents are watching. `Agent` is the
//! bridged mode where neither axis applies.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The delivery mode a customer conversation is currently in.
///
/// - `Bot`: default, the bot dialog handles the customer
/// - `Wait`: queued for an agent, no agent bound
/// - `Agent`: bridged to exactly one agent, bot excluded
/// - `Watch`: one or more agents observe, bot still handles the customer
/// - `WatchAndWait`: queued and watched at the same time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Bot,
    Wait,
    Agent,
    Watch,
    WatchAndWait,
}

impl ConversationState {
    /// All states, in declaration order.
    pub const ALL: [ConversationState; 5] = [
        ConversationState::Bot,
        ConversationState::Wait,
        ConversationState::Agent,
        ConversationState::Watch,
        ConversationState::WatchAndWait,
    ];

    /// Composes a non-bridged state from its two axes.
    pub fn from_axes(queued: bool, watched: bool) -> Self {
        match (queued, watched) {
            (false, false) => Self::Bot,
            (true, false) => Self::Wait,
            (false, true) => Self::Watch,
            (true, true) => Self::WatchAndWait,
        }
    }

    /// Returns true if the customer is waiting for an agent.
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Wait | Self::WatchAndWait)
    }

    /// Returns true if agents are passively observing.
    pub fn is_watched(&self) -> bool {
        matches!(self, Self::Watch | Self::WatchAndWait)
    }

    /// Returns true if the customer is bridged to an agent.
    pub fn is_bridged(&self) -> bool {
        matches!(self, Self::Agent)
    }

    /// Returns true if a record in this state must carry an agent address.
    pub fn requires_agent(&self) -> bool {
        matches!(self, Self::Agent | Self::Watch | Self::WatchAndWait)
    }

    /// Returns true if the bot dialog still receives customer messages.
    pub fn reaches_bot(&self) -> bool {
        matches!(self, Self::Bot | Self::Watch)
    }
}

impl StateMachine for ConversationState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationState::*;
        matches!(
            (self, target),
            // queue / dequeue
            (Bot, Wait) | (Wait, Bot) | (Watch, WatchAndWait) | (WatchAndWait, Watch) |
            // watch / unwatch
            (Bot, Watch) | (Watch, Bot) | (Wait, WatchAndWait) | (WatchAndWait, Wait) |
            // connect
            (Bot, Agent) | (Wait, Agent) | (Watch, Agent) | (WatchAndWait, Agent) |
            // disconnect
            (Agent, Bot)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationState::*;
        match self {
            Bot => vec![Wait, Watch, Agent],
            Wait => vec![Bot, WatchAndWait, Agent],
            Agent => vec![Bot],
            Watch => vec![WatchAndWait, Bot, Agent],
            WatchAndWait => vec![Watch, Wait, Agent],
        }
    }
}
