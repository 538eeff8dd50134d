//! Consistency of the in-memory provider under operation sequences.
//!
//! The agent connection index must always mirror the records that are in
//! `Agent` state, and a single record must exist per customer key no matter
//! how many tasks reference it at once.

use std::sync::Arc;

use handoff::adapters::{ConversationRegistry, InMemoryConversationProvider};
use handoff::domain::conversation::{
    ConversationError, ConversationState, ConversationStateMachine, Message, OperationKind,
};
use handoff::domain::foundation::{Address, Timestamp};
use handoff::ports::{ConversationLookup, ConversationProvider};

fn customer(id: &str) -> Address {
    Address::new("webchat", id)
}

fn agent(id: &str) -> Address {
    Address::new("agents", id)
}

/// Every bridged record has an index entry and every entry points at a
/// bridged record with the same agent.
async fn assert_index_consistent(provider: &InMemoryConversationProvider) {
    let records = provider.get_all_conversations().await;
    let connections = provider.connections().await;

    let bridged: Vec<_> = records
        .iter()
        .filter(|r| r.state() == ConversationState::Agent)
        .collect();
    assert_eq!(bridged.len(), connections.len(), "index size");

    for (agent_key, customer) in &connections {
        let record = records
            .iter()
            .find(|r| r.customer().same_endpoint(customer))
            .expect("indexed customer has a record");
        assert_eq!(record.state(), ConversationState::Agent);
        assert_eq!(record.agent().map(|a| a.key()).as_ref(), Some(agent_key));
    }
}

// =============================================================================
// Watch And Wait
// =============================================================================

mod watch_and_wait {
    use super::*;

    async fn watched_and_queued(provider: &InMemoryConversationProvider) {
        provider.watch(&customer("c"), &agent("y")).await.unwrap();
        provider.queue(&customer("c")).await.unwrap();
    }

    #[tokio::test]
    async fn unwatch_keeps_the_queue() {
        let provider = InMemoryConversationProvider::new();
        watched_and_queued(&provider).await;

        let record = provider.unwatch(&customer("c"), &agent("y")).await.unwrap();

        assert_eq!(record.state(), ConversationState::Wait);
        assert!(record.agent().is_none());
    }

    #[tokio::test]
    async fn dequeue_keeps_the_watch() {
        let provider = InMemoryConversationProvider::new();
        watched_and_queued(&provider).await;

        let record = provider.dequeue(&customer("c")).await.unwrap();

        assert_eq!(record.state(), ConversationState::Watch);
        assert_eq!(record.agent(), Some(&agent("y")));
    }

    #[tokio::test]
    async fn connect_by_watcher_opens_the_bridge() {
        let provider = InMemoryConversationProvider::new();
        watched_and_queued(&provider).await;

        let record = provider.connect(&customer("c"), &agent("y")).await.unwrap();

        assert_eq!(record.state(), ConversationState::Agent);
        assert_index_consistent(&provider).await;
    }

    #[tokio::test]
    async fn connect_by_stranger_is_rejected() {
        let provider = InMemoryConversationProvider::new();
        watched_and_queued(&provider).await;

        let err = provider
            .connect(&customer("c"), &agent("z"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConversationError::ConnectingAgentIsNotWatching { .. }
        ));
        let record = provider
            .get_conversation_for_customer(&customer("c"))
            .await
            .unwrap();
        assert_eq!(record.state(), ConversationState::WatchAndWait);
    }
}

// =============================================================================
// Agent Connection Index
// =============================================================================

mod agent_index {
    use super::*;

    #[tokio::test]
    async fn bridged_agent_cannot_connect_to_a_second_customer() {
        let provider = InMemoryConversationProvider::new();
        let x = agent("x");
        provider.connect(&customer("c"), &x).await.unwrap();

        let err = provider.connect(&customer("b"), &x).await.unwrap_err();

        assert_eq!(
            err,
            ConversationError::AgentAlreadyConnectedOnConversationId {
                agent: x.key(),
                customer: customer("c").key(),
            }
        );
        let b = provider
            .get_conversation_for_customer(&customer("b"))
            .await
            .unwrap();
        assert_eq!(b.state(), ConversationState::Bot);
        assert!(b.history().is_empty());
        assert_eq!(provider.resolve_agent(&x).await, Some(customer("c")));
        assert_index_consistent(&provider).await;
    }

    #[tokio::test]
    async fn lookup_by_agent_follows_the_bridge() {
        let provider = InMemoryConversationProvider::new();
        provider.watch(&customer("a"), &agent("x")).await.unwrap();
        provider.connect(&customer("b"), &agent("x")).await.unwrap();

        let record = provider
            .get_conversation(&ConversationLookup::Agent(agent("x")))
            .await
            .unwrap();

        assert_eq!(record.customer(), &customer("b"));
    }

    #[tokio::test]
    async fn lookup_by_agent_falls_back_to_watched_conversation() {
        let provider = InMemoryConversationProvider::new();
        provider.watch(&customer("a"), &agent("y")).await.unwrap();

        let record = provider
            .get_conversation_for_agent(&agent("y"))
            .await
            .unwrap();

        assert_eq!(record.customer(), &customer("a"));
        assert!(provider.resolve_agent(&agent("y")).await.is_none());
    }

    #[tokio::test]
    async fn index_tracks_a_mixed_sequence() {
        let provider = InMemoryConversationProvider::new();
        let (c, b) = (customer("c"), customer("b"));
        let (x, y) = (agent("x"), agent("y"));

        provider.queue(&c).await.unwrap();
        assert_index_consistent(&provider).await;
        provider.connect(&c, &x).await.unwrap();
        assert_index_consistent(&provider).await;
        provider.watch(&b, &y).await.unwrap();
        provider
            .record_agent_message(&Message::new(y.clone(), "taking over"))
            .await
            .unwrap();
        assert_index_consistent(&provider).await;
        provider.disconnect(&c, &x).await.unwrap();
        assert_index_consistent(&provider).await;
        let _ = provider.disconnect(&c, &x).await;
        assert_index_consistent(&provider).await;

        let connections = provider.connections().await;
        assert_eq!(connections, vec![(y.key(), b)]);
    }

    #[tokio::test]
    async fn history_names_each_operation() {
        let provider = InMemoryConversationProvider::new();
        let c = customer("c");
        provider.watch(&c, &agent("y")).await.unwrap();
        provider.queue(&c).await.unwrap();
        provider.connect(&c, &agent("y")).await.unwrap();

        let record = provider.get_conversation_for_customer(&c).await.unwrap();
        let kinds: Vec<_> = record.history().iter().map(|h| h.operation).collect();

        assert_eq!(
            kinds,
            vec![OperationKind::Watch, OperationKind::Queue, OperationKind::Connect]
        );
    }
}

// =============================================================================
// Registry
// =============================================================================

mod registry {
    use super::*;

    #[tokio::test]
    async fn shared_registry_serves_one_record_per_customer() {
        let registry = Arc::new(ConversationRegistry::new());
        let first = InMemoryConversationProvider::with_registry(registry.clone())
            .await
            .unwrap();

        first.queue(&customer("c")).await.unwrap();
        let via_registry = registry.get(&customer("c")).await;

        assert_eq!(via_registry.lock().await.state(), ConversationState::Wait);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn second_provider_rebuilds_the_connection_index() {
        let registry = Arc::new(ConversationRegistry::new());
        let first = InMemoryConversationProvider::with_registry(registry.clone())
            .await
            .unwrap();
        first.connect(&customer("c"), &agent("x")).await.unwrap();
        first.watch(&customer("d"), &agent("y")).await.unwrap();

        let second = InMemoryConversationProvider::with_registry(registry)
            .await
            .unwrap();

        assert_eq!(second.resolve_agent(&agent("x")).await, Some(customer("c")));
        assert!(second.resolve_agent(&agent("y")).await.is_none());
        assert_index_consistent(&second).await;

        let err = second
            .connect(&customer("b"), &agent("x"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConversationError::AgentAlreadyConnectedOnConversationId { .. }
        ));
    }

    #[tokio::test]
    async fn conflicting_bridges_in_a_registry_are_refused() {
        let registry = Arc::new(ConversationRegistry::new());
        let x = agent("x");
        for id in ["c", "b"] {
            let shared = registry.get(&customer(id)).await;
            let mut record = shared.lock().await;
            let t = ConversationStateMachine::connect(&record.transition_context(), &x).unwrap();
            record.apply(&t, Timestamp::now());
        }

        let result = InMemoryConversationProvider::with_registry(registry).await;

        assert!(matches!(
            result,
            Err(ConversationError::AgentAlreadyConnectedOnConversationId { .. })
        ));
    }

    #[tokio::test]
    async fn channel_case_does_not_split_a_customer() {
        let provider = InMemoryConversationProvider::new();
        provider
            .record_customer_message(&Message::new(Address::new("WebChat", "c"), "hi"))
            .await
            .unwrap();
        provider
            .record_customer_message(&Message::new(Address::new(" webchat ", "c"), "again"))
            .await
            .unwrap();

        let all = provider.get_all_conversations().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].transcript().len(), 2);
    }

    #[tokio::test]
    async fn conversation_id_selects_the_record() {
        let provider = InMemoryConversationProvider::new();
        provider
            .queue(&customer("c").with_conversation("one"))
            .await
            .unwrap();

        let other = provider
            .get_conversation_for_customer(&customer("c").with_conversation("two"))
            .await;
        let same = provider
            .get_conversation_for_customer(&customer("c").with_conversation("one"))
            .await
            .unwrap();

        assert!(other.is_none());
        assert_eq!(same.state(), ConversationState::Wait);
    }

    #[tokio::test]
    async fn queries_keep_creation_order() {
        let provider = InMemoryConversationProvider::new();
        for id in ["c1", "c2", "c3"] {
            provider.queue(&customer(id)).await.unwrap();
        }

        let ids: Vec<_> = provider
            .get_all_conversations()
            .await
            .iter()
            .map(|r| r.customer().user_id.clone())
            .collect();

        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn bridged_since_filters_by_update_time() {
        let provider = InMemoryConversationProvider::new();
        provider.connect(&customer("c"), &agent("x")).await.unwrap();
        provider.queue(&customer("b")).await.unwrap();

        let recent = provider
            .get_conversations_connected_to_agent(Timestamp::now().minus_secs(60))
            .await;
        let future = provider
            .get_conversations_connected_to_agent(Timestamp::now().plus_secs(60))
            .await;

        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].customer(), &customer("c"));
        assert!(future.is_empty());
    }
}

// =============================================================================
// Concurrency
// =============================================================================

mod concurrency {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_agents_bridge_exactly_once() {
        let provider = Arc::new(InMemoryConversationProvider::new());

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let provider = provider.clone();
                tokio::spawn(async move {
                    provider
                        .connect(&customer("c"), &agent(&format!("a{}", i)))
                        .await
                })
            })
            .collect();

        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_index_consistent(&provider).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn one_agent_racing_for_many_customers_gets_one() {
        let provider = Arc::new(InMemoryConversationProvider::new());

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let provider = provider.clone();
                tokio::spawn(async move {
                    provider
                        .connect(&customer(&format!("c{}", i)), &agent("x"))
                        .await
                })
            })
            .collect();

        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(provider.connections().await.len(), 1);
        assert_index_consistent(&provider).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_messages_are_all_transcribed() {
        let provider = Arc::new(InMemoryConversationProvider::new());

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let provider = provider.clone();
                tokio::spawn(async move {
                    provider
                        .record_customer_message(&Message::new(customer("c"), format!("m{}", i)))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let record = provider
            .get_conversation_for_customer(&customer("c"))
            .await
            .unwrap();
        assert_eq!(record.transcript().len(), 20);
        assert_eq!(provider.get_all_conversations().await.len(), 1);
    }
}
