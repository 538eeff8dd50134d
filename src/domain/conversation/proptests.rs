//! Property tests for the conversation state machine.
//!
//! Random operation sequences from a small pool of agents are applied to a
//! single record; after every step the record invariants must hold and
//! rejected operations must leave the record exactly as it was.

use proptest::prelude::*;

use super::*;
use crate::domain::foundation::{Address, StateMachine, Timestamp};

fn agent(i: u8) -> Address {
    Address::new("agents", format!("agent-{}", i))
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    let agent_idx = 0u8..3;
    prop_oneof![
        agent_idx.clone().prop_map(|i| Operation::Connect(agent(i))),
        agent_idx.clone().prop_map(|i| Operation::Disconnect(agent(i))),
        Just(Operation::Queue),
        Just(Operation::Dequeue),
        agent_idx.clone().prop_map(|i| Operation::Watch(agent(i))),
        agent_idx.clone().prop_map(|i| Operation::Unwatch(agent(i))),
        agent_idx.prop_map(|i| Operation::ImplicitConnect(agent(i))),
    ]
}

fn step(record: &mut ConversationRecord, op: &Operation) -> Result<Transition, ConversationError> {
    let result = ConversationStateMachine::transition(&record.transition_context(), op);
    if let Ok(transition) = &result {
        record.apply(transition, Timestamp::now());
    }
    result
}

proptest! {
    #[test]
    fn invariants_hold_after_every_operation(ops in prop::collection::vec(arb_operation(), 0..40)) {
        let mut record = ConversationRecord::new(Address::new("webchat", "customer"));
        for op in &ops {
            let _ = step(&mut record, op);
            prop_assert_eq!(record.invariant_violation(), None, "after {:?}", op);
        }
    }

    #[test]
    fn rejected_operations_leave_record_untouched(ops in prop::collection::vec(arb_operation(), 0..40)) {
        let mut record = ConversationRecord::new(Address::new("webchat", "customer"));
        for op in &ops {
            let before = record.clone();
            if step(&mut record, op).is_err() {
                prop_assert_eq!(&record, &before);
            }
        }
    }

    #[test]
    fn accepted_state_changes_follow_the_graph(ops in prop::collection::vec(arb_operation(), 0..40)) {
        let mut record = ConversationRecord::new(Address::new("webchat", "customer"));
        for op in &ops {
            if let Ok(t) = step(&mut record, op) {
                if t.changes_state() {
                    prop_assert!(t.from().can_transition_to(&t.to()));
                }
                prop_assert_eq!(t.kind(), op.kind());
            }
        }
    }

    #[test]
    fn second_queue_is_always_rejected(ops in prop::collection::vec(arb_operation(), 0..20)) {
        let mut record = ConversationRecord::new(Address::new("webchat", "customer"));
        for op in &ops {
            let _ = step(&mut record, op);
        }
        if step(&mut record, &Operation::Queue).is_ok() {
            let state = record.state();
            let second = step(&mut record, &Operation::Queue);
            let is_unchanged = matches!(
                second,
                Err(ConversationError::ConversationStateUnchanged { .. })
            );
            prop_assert!(is_unchanged);
            prop_assert_eq!(record.state(), state);
        }
    }

    #[test]
    fn history_grows_only_on_effective_changes(ops in prop::collection::vec(arb_operation(), 0..40)) {
        let mut record = ConversationRecord::new(Address::new("webchat", "customer"));
        for op in &ops {
            let before = record.history().len();
            match step(&mut record, op) {
                Ok(t) if !t.is_noop() => prop_assert_eq!(record.history().len(), before + 1),
                _ => prop_assert_eq!(record.history().len(), before),
            }
        }
    }
}
