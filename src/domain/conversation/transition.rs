//! Conversation state machine.
//!
//! `ConversationStateMachine` is a pure function from the current view of a
//! conversation and a requested operation to a [`Transition`] describing the
//! next state, the agent binding and the watcher-set change. Nothing is
//! mutated here; the record applies the transition and the provider keeps the
//! connection index in step with it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ConversationError, ConversationState};
use crate::domain::foundation::{Address, StateMachine};

/// A requested change to a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Connect(Address),
    Disconnect(Address),
    Queue,
    Dequeue,
    Watch(Address),
    Unwatch(Address),
    /// Promotion to `Agent` triggered by the agent's first bridged message.
    ImplicitConnect(Address),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Connect(_) => OperationKind::Connect,
            Operation::Disconnect(_) => OperationKind::Disconnect,
            Operation::Queue => OperationKind::Queue,
            Operation::Dequeue => OperationKind::Dequeue,
            Operation::Watch(_) => OperationKind::Watch,
            Operation::Unwatch(_) => OperationKind::Unwatch,
            Operation::ImplicitConnect(_) => OperationKind::ImplicitConnect,
        }
    }

    /// Returns the agent performing the operation, if any.
    pub fn agent(&self) -> Option<&Address> {
        match self {
            Operation::Connect(agent)
            | Operation::Disconnect(agent)
            | Operation::Watch(agent)
            | Operation::Unwatch(agent)
            | Operation::ImplicitConnect(agent) => Some(agent),
            Operation::Queue | Operation::Dequeue => None,
        }
    }
}

/// Operation discriminant, used in audit entries and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Connect,
    Disconnect,
    Queue,
    Dequeue,
    Watch,
    Unwatch,
    ImplicitConnect,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::Connect => "connect",
            OperationKind::Disconnect => "disconnect",
            OperationKind::Queue => "queue",
            OperationKind::Dequeue => "dequeue",
            OperationKind::Watch => "watch",
            OperationKind::Unwatch => "unwatch",
            OperationKind::ImplicitConnect => "implicit_connect",
        };
        write!(f, "{}", s)
    }
}

/// Read-only view of a conversation that transitions are computed from.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub customer: &'a Address,
    pub state: ConversationState,
    /// Bound agent in `Agent`, state-determining watcher in `Watch`/`WatchAndWait`.
    pub bound_agent: Option<&'a Address>,
    pub watchers: &'a [Address],
}

impl TransitionContext<'_> {
    fn is_bound(&self, agent: &Address) -> bool {
        self.bound_agent
            .is_some_and(|bound| bound.same_endpoint(agent))
    }

    fn is_watching(&self, agent: &Address) -> bool {
        self.watchers.iter().any(|w| w.same_endpoint(agent))
    }

    fn add_watcher(&self, agent: &Address) -> WatcherChange {
        if self.is_watching(agent) {
            WatcherChange::None
        } else {
            WatcherChange::Add(agent.clone())
        }
    }

    fn unchanged(&self) -> ConversationError {
        ConversationError::ConversationStateUnchanged {
            customer: self.customer.key(),
            state: self.state,
        }
    }
}

/// What happens to the record's agent address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentBinding {
    Keep,
    Bind(Address),
    Release,
}

/// What happens to the watcher set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherChange {
    None,
    Add(Address),
    Remove(Address),
}

/// Outcome of an accepted operation. Only the state machine builds these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    kind: OperationKind,
    agent: Option<Address>,
    from: ConversationState,
    to: ConversationState,
    binding: AgentBinding,
    watchers: WatcherChange,
    already_watching: bool,
}

impl Transition {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Agent that requested the operation.
    pub fn agent(&self) -> Option<&Address> {
        self.agent.as_ref()
    }

    pub fn from(&self) -> ConversationState {
        self.from
    }

    pub fn to(&self) -> ConversationState {
        self.to
    }

    pub fn binding(&self) -> &AgentBinding {
        &self.binding
    }

    pub fn watchers(&self) -> &WatcherChange {
        &self.watchers
    }

    /// For watch: the agent was already in the watcher set.
    pub fn already_watching(&self) -> bool {
        self.already_watching
    }

    pub fn changes_state(&self) -> bool {
        self.from != self.to
    }

    /// Returns true if applying this transition changes nothing.
    pub fn is_noop(&self) -> bool {
        !self.changes_state()
            && self.binding == AgentBinding::Keep
            && self.watchers == WatcherChange::None
    }

    /// Entering `Agent`: the connection index must gain a link.
    pub fn opens_bridge(&self) -> bool {
        self.to.is_bridged() && !self.from.is_bridged()
    }

    /// Leaving `Agent`: the connection index must drop the link.
    pub fn closes_bridge(&self) -> bool {
        self.from.is_bridged() && !self.to.is_bridged()
    }
}

/// Pure transition rules for customer conversations.
pub struct ConversationStateMachine;

impl ConversationStateMachine {
    /// Computes the transition for `operation`, or the reason it is rejected.
    pub fn transition(
        ctx: &TransitionContext<'_>,
        operation: &Operation,
    ) -> Result<Transition, ConversationError> {
        match operation {
            Operation::Connect(agent) => Self::connect(ctx, agent),
            Operation::Disconnect(agent) => Self::disconnect(ctx, agent),
            Operation::Queue => Self::queue(ctx),
            Operation::Dequeue => Self::dequeue(ctx),
            Operation::Watch(agent) => Self::watch(ctx, agent),
            Operation::Unwatch(agent) => Self::unwatch(ctx, agent),
            Operation::ImplicitConnect(agent) => Self::implicit_connect(ctx, agent),
        }
    }

    /// Bridges `agent` to the customer.
    ///
    /// From a watched state only the state-determining watcher may connect.
    pub fn connect(
        ctx: &TransitionContext<'_>,
        agent: &Address,
    ) -> Result<Transition, ConversationError> {
        use ConversationState::*;
        match ctx.state {
            Bot | Wait => Self::bridge(ctx, OperationKind::Connect, agent),
            Watch | WatchAndWait if ctx.is_bound(agent) => {
                Self::bridge(ctx, OperationKind::Connect, agent)
            }
            Watch | WatchAndWait => Err(ConversationError::ConnectingAgentIsNotWatching {
                customer: ctx.customer.key(),
                agent: agent.key(),
            }),
            Agent => Err(Self::bridge_conflict(ctx, agent)),
        }
    }

    /// Closes the bridge. Only the bound agent may disconnect.
    pub fn disconnect(
        ctx: &TransitionContext<'_>,
        agent: &Address,
    ) -> Result<Transition, ConversationError> {
        if ctx.state.is_bridged() && ctx.is_bound(agent) {
            Self::moved(
                ctx,
                OperationKind::Disconnect,
                Some(agent),
                ConversationState::Bot,
                AgentBinding::Release,
                WatcherChange::Remove(agent.clone()),
            )
        } else {
            Err(ConversationError::AgentNotInConversation { agent: agent.key() })
        }
    }

    /// Puts the customer in the waiting queue.
    pub fn queue(ctx: &TransitionContext<'_>) -> Result<Transition, ConversationError> {
        use ConversationState::*;
        let to = match ctx.state {
            Bot => Wait,
            Watch => WatchAndWait,
            Wait | WatchAndWait | Agent => return Err(ctx.unchanged()),
        };
        Self::moved(
            ctx,
            OperationKind::Queue,
            None,
            to,
            AgentBinding::Keep,
            WatcherChange::None,
        )
    }

    /// Takes the customer out of the waiting queue.
    pub fn dequeue(ctx: &TransitionContext<'_>) -> Result<Transition, ConversationError> {
        use ConversationState::*;
        let to = match ctx.state {
            Wait => Bot,
            WatchAndWait => Watch,
            Bot | Watch | Agent => return Err(ctx.unchanged()),
        };
        Self::moved(
            ctx,
            OperationKind::Dequeue,
            None,
            to,
            AgentBinding::Keep,
            WatcherChange::None,
        )
    }

    /// Adds `agent` to the watchers.
    ///
    /// Watching is a membership operation: repeating it is accepted and
    /// reported through [`Transition::already_watching`].
    pub fn watch(
        ctx: &TransitionContext<'_>,
        agent: &Address,
    ) -> Result<Transition, ConversationError> {
        use ConversationState::*;
        let already_watching = ctx.is_watching(agent);
        let watchers = ctx.add_watcher(agent);

        let mut transition = match ctx.state {
            Bot | Wait => Self::moved(
                ctx,
                OperationKind::Watch,
                Some(agent),
                ConversationState::from_axes(ctx.state.is_queued(), true),
                AgentBinding::Bind(agent.clone()),
                watchers,
            )?,
            Watch | WatchAndWait | Agent => Self::stay(
                ctx,
                OperationKind::Watch,
                Some(agent),
                AgentBinding::Keep,
                watchers,
            ),
        };
        transition.already_watching = already_watching;
        Ok(transition)
    }

    /// Removes `agent` from the watchers.
    ///
    /// When the state-determining watcher leaves, the earliest remaining
    /// watcher takes over; with none left the watch axis drops. The bound
    /// agent of an open bridge must disconnect instead.
    pub fn unwatch(
        ctx: &TransitionContext<'_>,
        agent: &Address,
    ) -> Result<Transition, ConversationError> {
        if !ctx.is_watching(agent) {
            return Ok(Self::stay(
                ctx,
                OperationKind::Unwatch,
                Some(agent),
                AgentBinding::Keep,
                WatcherChange::None,
            ));
        }

        if ctx.state.is_bridged() && ctx.is_bound(agent) {
            return Err(ConversationError::AgentAlreadyInConversation {
                customer: ctx.customer.key(),
                agent: agent.key(),
            });
        }

        let removal = WatcherChange::Remove(agent.clone());
        if ctx.state.is_watched() && ctx.is_bound(agent) {
            let successor = ctx.watchers.iter().find(|w| !w.same_endpoint(agent));
            return match successor {
                Some(next) => Ok(Self::stay(
                    ctx,
                    OperationKind::Unwatch,
                    Some(agent),
                    AgentBinding::Bind(next.clone()),
                    removal,
                )),
                None => Self::moved(
                    ctx,
                    OperationKind::Unwatch,
                    Some(agent),
                    ConversationState::from_axes(ctx.state.is_queued(), false),
                    AgentBinding::Release,
                    removal,
                ),
            };
        }

        Ok(Self::stay(
            ctx,
            OperationKind::Unwatch,
            Some(agent),
            AgentBinding::Keep,
            removal,
        ))
    }

    /// Promotes a watched conversation to `Agent` when its determining
    /// watcher sends a message to the customer.
    ///
    /// Already bridged to the same agent is accepted as a no-op.
    pub fn implicit_connect(
        ctx: &TransitionContext<'_>,
        agent: &Address,
    ) -> Result<Transition, ConversationError> {
        use ConversationState::*;
        match ctx.state {
            Agent if ctx.is_bound(agent) => Ok(Self::stay(
                ctx,
                OperationKind::ImplicitConnect,
                Some(agent),
                AgentBinding::Keep,
                WatcherChange::None,
            )),
            Agent => Err(Self::bridge_conflict(ctx, agent)),
            Watch | WatchAndWait if ctx.is_bound(agent) => {
                Self::bridge(ctx, OperationKind::ImplicitConnect, agent)
            }
            Bot | Wait | Watch | WatchAndWait => {
                Err(ConversationError::AgentNotInConversation { agent: agent.key() })
            }
        }
    }

    fn bridge(
        ctx: &TransitionContext<'_>,
        kind: OperationKind,
        agent: &Address,
    ) -> Result<Transition, ConversationError> {
        Self::moved(
            ctx,
            kind,
            Some(agent),
            ConversationState::Agent,
            AgentBinding::Bind(agent.clone()),
            ctx.add_watcher(agent),
        )
    }

    fn bridge_conflict(ctx: &TransitionContext<'_>, agent: &Address) -> ConversationError {
        match ctx.bound_agent {
            Some(bound) if bound.same_endpoint(agent) => {
                ConversationError::AgentAlreadyInConversation {
                    customer: ctx.customer.key(),
                    agent: agent.key(),
                }
            }
            Some(bound) => ConversationError::CustomerAlreadyConnected {
                customer: ctx.customer.key(),
                connected_agent: bound.key(),
            },
            None => ConversationError::IllegalTransition {
                from: ctx.state,
                to: ConversationState::Agent,
            },
        }
    }

    fn moved(
        ctx: &TransitionContext<'_>,
        kind: OperationKind,
        agent: Option<&Address>,
        to: ConversationState,
        binding: AgentBinding,
        watchers: WatcherChange,
    ) -> Result<Transition, ConversationError> {
        let to = ctx
            .state
            .transition_to(to)
            .map_err(|e| ConversationError::IllegalTransition {
                from: e.from,
                to: e.to,
            })?;
        Ok(Transition {
            kind,
            agent: agent.cloned(),
            from: ctx.state,
            to,
            binding,
            watchers,
            already_watching: false,
        })
    }

    fn stay(
        ctx: &TransitionContext<'_>,
        kind: OperationKind,
        agent: Option<&Address>,
        binding: AgentBinding,
        watchers: WatcherChange,
    ) -> Transition {
        Transition {
            kind,
            agent: agent.cloned(),
            from: ctx.state,
            to: ctx.state,
            binding,
            watchers,
            already_watching: false,
        }
    }
}
