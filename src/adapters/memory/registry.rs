//! Address to record mapping.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::conversation::ConversationRecord;
use crate::domain::foundation::{Address, AddressKey};

/// A record shared between the registry and whoever is operating on it.
///
/// The record mutex is the unit of mutual exclusion for one customer.
pub type SharedRecord = Arc<Mutex<ConversationRecord>>;

#[derive(Default)]
struct Entries {
    by_key: HashMap<AddressKey, SharedRecord>,
    order: Vec<SharedRecord>,
}

/// Owns every conversation record, keyed by the customer's [`AddressKey`].
///
/// Records are created lazily and never duplicated: every `get` for equal
/// keys hands out the same `Arc`.
#[derive(Default)]
pub struct ConversationRegistry {
    entries: RwLock<Entries>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the customer's record, creating a `Bot` record on first use.
    pub async fn get(&self, customer: &Address) -> SharedRecord {
        let key = customer.key();
        if let Some(record) = self.entries.read().await.by_key.get(&key) {
            return Arc::clone(record);
        }

        let mut entries = self.entries.write().await;
        // Another task may have created it between the two locks.
        if let Some(record) = entries.by_key.get(&key) {
            return Arc::clone(record);
        }

        tracing::debug!(customer = %key, "Creating conversation record");
        let record = Arc::new(Mutex::new(ConversationRecord::new(customer.clone())));
        entries.by_key.insert(key, Arc::clone(&record));
        entries.order.push(Arc::clone(&record));
        record
    }

    /// Returns the customer's record without creating one.
    pub async fn get_if_exists(&self, customer: &Address) -> Option<SharedRecord> {
        self.get_by_key(&customer.key()).await
    }

    pub async fn get_by_key(&self, key: &AddressKey) -> Option<SharedRecord> {
        self.entries.read().await.by_key.get(key).cloned()
    }

    /// All records in creation order.
    pub async fn all(&self) -> Vec<SharedRecord> {
        self.entries.read().await.order.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ConversationState;

    fn alice() -> Address {
        Address::new("webchat", "alice")
    }

    #[tokio::test]
    async fn get_creates_default_record_once() {
        let registry = ConversationRegistry::new();

        let first = registry.get(&alice()).await;
        let second = registry.get(&alice()).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
        assert_eq!(first.lock().await.state(), ConversationState::Bot);
    }

    #[tokio::test]
    async fn equal_keys_share_a_record() {
        let registry = ConversationRegistry::new();
        let plain = Address::new("WebChat ", "alice");
        let routed = Address::new("webchat", "alice").with_service_url("https://relay-2");

        let a = registry.get(&plain).await;
        let b = registry.get(&routed).await;

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn get_if_exists_never_creates() {
        let registry = ConversationRegistry::new();

        assert!(registry.get_if_exists(&alice()).await.is_none());
        assert!(registry.is_empty().await);

        registry.get(&alice()).await;
        assert!(registry.get_if_exists(&alice()).await.is_some());
    }

    #[tokio::test]
    async fn all_keeps_creation_order() {
        let registry = ConversationRegistry::new();
        for id in ["c", "a", "b"] {
            registry.get(&Address::new("webchat", id)).await;
        }
        registry.get(&Address::new("webchat", "a")).await;

        let mut ids = Vec::new();
        for record in registry.all().await {
            ids.push(record.lock().await.customer().user_id.clone());
        }
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn concurrent_gets_agree_on_identity() {
        let registry = Arc::new(ConversationRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move { registry.get(&alice()).await }));
        }

        let mut records = Vec::new();
        for handle in handles {
            records.push(handle.await.unwrap());
        }
        assert!(records.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.len().await, 1);
    }
}
