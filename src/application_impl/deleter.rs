use crate::domain_model::*;
use crate::domain_port::RealtimeStore;
use std::sync::Arc;

/// Removes a message by id. Ownership is left to the store's access rules.
pub struct Deleter {
    store: Arc<dyn RealtimeStore>,
    collection: String,
}

impl Deleter {
    pub fn new(store: Arc<dyn RealtimeStore>, collection: &str) -> Self {
        Self {
            store,
            collection: collection.to_owned(),
        }
    }

    /// Failures are logged and swallowed. Returns whether the removal was
    /// accepted by the store.
    pub async fn delete(&self, id: &MessageId) -> bool {
        if id.is_empty() {
            return false;
        }
        tracing::debug!(%id, "deleting message");
        match self.store.remove(&self.collection, id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(%id, "delete failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::infra_memory::MemoryRealtimeStore;

    #[tokio::test]
    async fn deleting_twice_is_harmless() {
        let store = Arc::new(MemoryRealtimeStore::new());
        let id = store.append("messages", json!({ "text": "x" })).await.unwrap();
        let deleter = Deleter::new(store.clone(), "messages");

        assert!(deleter.delete(&id).await);
        assert!(deleter.delete(&id).await);
        assert!(store.is_empty("messages"));
    }

    #[tokio::test]
    async fn empty_id_is_ignored() {
        let store = Arc::new(MemoryRealtimeStore::new());
        store.append("messages", json!({ "text": "x" })).await.unwrap();
        let deleter = Deleter::new(store.clone(), "messages");

        assert!(!deleter.delete(&MessageId(String::new())).await);
        assert_eq!(store.len("messages"), 1);
    }

    #[tokio::test]
    async fn store_failure_is_swallowed() {
        let store = Arc::new(MemoryRealtimeStore::new());
        let id = store.append("messages", json!({ "text": "x" })).await.unwrap();
        store.set_available(false);
        let deleter = Deleter::new(store.clone(), "messages");

        assert!(!deleter.delete(&id).await);
        assert_eq!(store.len("messages"), 1);
    }
}
