//! Per-customer conversation aggregate.

use serde::{Deserialize, Serialize};

use super::{
    AgentBinding, ConversationState, StateChange, TranscriptLine, Transition, TransitionContext,
    WatcherChange,
};
use crate::domain::foundation::{Address, Timestamp};

/// Conversation record keyed by the customer address.
///
/// # Invariants
///
/// - `agent` is set exactly when `state` is `Agent`, `Watch` or `WatchAndWait`
/// - in `Agent` and watched states the agent is a member of `watching_agents`
/// - `watching_agents` holds no two addresses with the same key
/// - `transcript` and `history` are append-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    customer: Address,
    agent: Option<Address>,
    watching_agents: Vec<Address>,
    state: ConversationState,
    transcript: Vec<TranscriptLine>,
    history: Vec<StateChange>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl ConversationRecord {
    /// Creates a fresh record in `Bot` state.
    pub fn new(customer: Address) -> Self {
        let now = Timestamp::now();
        Self {
            customer,
            agent: None,
            watching_agents: Vec::new(),
            state: ConversationState::Bot,
            transcript: Vec::new(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn customer(&self) -> &Address {
        &self.customer
    }

    /// Bound agent in `Agent`, state-determining watcher when watched.
    pub fn agent(&self) -> Option<&Address> {
        self.agent.as_ref()
    }

    /// Returns the agent only while the bridge is open.
    pub fn connected_agent(&self) -> Option<&Address> {
        self.agent.as_ref().filter(|_| self.state.is_bridged())
    }

    pub fn watching_agents(&self) -> &[Address] {
        &self.watching_agents
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn transcript(&self) -> &[TranscriptLine] {
        &self.transcript
    }

    pub fn history(&self) -> &[StateChange] {
        &self.history
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_watched_by(&self, agent: &Address) -> bool {
        self.watching_agents.iter().any(|w| w.same_endpoint(agent))
    }

    /// Returns the view the state machine computes transitions from.
    pub fn transition_context(&self) -> TransitionContext<'_> {
        TransitionContext {
            customer: &self.customer,
            state: self.state,
            bound_agent: self.agent.as_ref(),
            watchers: &self.watching_agents,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies an accepted transition and records it in the history.
    ///
    /// No-op transitions leave the record untouched.
    pub fn apply(&mut self, transition: &Transition, at: Timestamp) {
        if transition.is_noop() {
            return;
        }

        match transition.binding() {
            AgentBinding::Keep => {}
            AgentBinding::Bind(agent) => self.agent = Some(agent.clone()),
            AgentBinding::Release => self.agent = None,
        }

        match transition.watchers() {
            WatcherChange::None => {}
            WatcherChange::Add(agent) => {
                if !self.is_watched_by(agent) {
                    self.watching_agents.push(agent.clone());
                }
            }
            WatcherChange::Remove(agent) => {
                self.watching_agents.retain(|w| !w.same_endpoint(agent));
            }
        }

        self.state = transition.to();
        self.updated_at = at;
        self.history.push(StateChange {
            operation: transition.kind(),
            from: transition.from(),
            to: transition.to(),
            agent: transition.agent().cloned(),
            at,
        });
    }

    /// Appends a transcript line stamped with the current state.
    pub fn append_line(
        &mut self,
        from: Option<Address>,
        to: Option<Address>,
        text: impl Into<String>,
        at: Timestamp,
    ) -> &TranscriptLine {
        self.updated_at = at;
        self.transcript.push(TranscriptLine {
            from,
            to,
            text: text.into(),
            state: self.state,
            recorded_at: at,
        });
        &self.transcript[self.transcript.len() - 1]
    }

    /// Describes the first broken invariant, if any.
    pub fn invariant_violation(&self) -> Option<&'static str> {
        if self.agent.is_some() != self.state.requires_agent() {
            return Some("agent must be set exactly in Agent, Watch and WatchAndWait");
        }
        if let Some(agent) = &self.agent {
            if !self.is_watched_by(agent) {
                return Some("bound agent must be a watcher");
            }
        }
        for (i, watcher) in self.watching_agents.iter().enumerate() {
            if self.watching_agents[..i]
                .iter()
                .any(|w| w.same_endpoint(watcher))
            {
                return Some("watching agents must be unique");
            }
        }
        None
    }
}
