use crate::domain_model::*;
use crate::domain_port::Subscription;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Point-in-time view of the records matching a query.
///
/// `value` is `null` when nothing matches, otherwise an object keyed by
/// record id whose iteration order is the store's native order.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    value: Value,
}

impl Snapshot {
    pub fn new(value: Value) -> Self {
        match value {
            Value::Object(ref children) if children.is_empty() => Self { value: Value::Null },
            value => Self { value },
        }
    }

    pub fn empty() -> Self {
        Self { value: Value::Null }
    }

    pub fn val(&self) -> &Value {
        &self.value
    }

    pub fn size(&self) -> usize {
        self.value.as_object().map_or(0, |children| children.len())
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

#[async_trait::async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Append under a freshly generated key and return that key.
    async fn append(&self, collection: &str, record: Value) -> Result<MessageId, StoreError>;

    /// Removing a key that does not exist succeeds.
    async fn remove(&self, collection: &str, id: &MessageId) -> Result<(), StoreError>;

    /// Live view of the last `limit` records in native order.
    fn subscribe_tail(&self, collection: &str, limit: FeedLimit) -> Subscription<Snapshot>;

    /// Live view of the whole collection. Consumers are expected to read
    /// only [`Snapshot::size`].
    fn subscribe_collection(&self, collection: &str) -> Subscription<Snapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_normalizes_to_null() {
        let snapshot = Snapshot::new(json!({}));
        assert_eq!(snapshot.val(), &Value::Null);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn size_counts_children() {
        let snapshot = Snapshot::new(json!({"a": {}, "b": {}}));
        assert_eq!(snapshot.size(), 2);
    }
}
