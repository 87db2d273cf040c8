use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::SubscriberSet;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

type Collection = BTreeMap<String, Value>;

struct TailWatch {
    collection: String,
    limit: usize,
    last: Snapshot,
}

/// In-process realtime database. Keys sort in insertion order, so the
/// native order of a collection is its key order.
pub struct MemoryRealtimeStore {
    collections: Mutex<HashMap<String, Collection>>,
    sequence: AtomicU64,
    available: AtomicBool,
    tails: SubscriberSet<TailWatch, Snapshot>,
    wholes: SubscriberSet<String, Snapshot>,
}

impl MemoryRealtimeStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(0),
            available: AtomicBool::new(true),
            tails: SubscriberSet::new(),
            wholes: SubscriberSet::new(),
        }
    }

    /// When unavailable, every write fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self, collection: &str) -> usize {
        self.lock().get(collection).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Live tail and collection subscriptions, for leak checks.
    pub fn live_subscriptions(&self) -> usize {
        self.tails.live_count() + self.wholes.live_count()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Collection>> {
        self.collections.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store is offline".to_owned()))
        }
    }

    fn next_key(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        format!("{:012}-{}", seq, nanoid::nanoid!(8))
    }

    fn tail_snapshot(records: Option<&Collection>, limit: usize) -> Snapshot {
        let Some(records) = records else {
            return Snapshot::empty();
        };
        let skip = records.len().saturating_sub(limit);
        let children: Map<String, Value> = records
            .iter()
            .skip(skip)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Snapshot::new(Value::Object(children))
    }

    fn whole_snapshot(records: Option<&Collection>) -> Snapshot {
        Self::tail_snapshot(records, usize::MAX)
    }

    /// Called with the collections lock held so that no subscriber can
    /// register between the mutation and its notification.
    fn notify(&self, collections: &HashMap<String, Collection>, collection: &str) {
        let records = collections.get(collection);

        let tails = self.tails.publish(|watch| {
            if watch.collection != collection {
                return None;
            }
            let snapshot = Self::tail_snapshot(records, watch.limit);
            if snapshot == watch.last {
                return None;
            }
            watch.last = snapshot.clone();
            Some(snapshot)
        });

        let mut whole = None;
        let wholes = self.wholes.publish(|watched| {
            if watched.as_str() != collection {
                return None;
            }
            Some(
                whole
                    .get_or_insert_with(|| Self::whole_snapshot(records))
                    .clone(),
            )
        });

        tracing::trace!(collection, tails, wholes, "snapshots delivered");
    }
}

impl Default for MemoryRealtimeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RealtimeStore for MemoryRealtimeStore {
    async fn append(&self, collection: &str, record: Value) -> Result<MessageId, StoreError> {
        self.ensure_available()?;
        if !record.is_object() {
            return Err(StoreError::InvalidRecord(format!(
                "expected an object, got {}",
                record
            )));
        }

        let key = self.next_key();
        let mut collections = self.lock();
        collections
            .entry(collection.to_owned())
            .or_default()
            .insert(key.clone(), record);
        self.notify(&collections, collection);
        Ok(MessageId(key))
    }

    async fn remove(&self, collection: &str, id: &MessageId) -> Result<(), StoreError> {
        self.ensure_available()?;

        let mut collections = self.lock();
        let removed = collections
            .get_mut(collection)
            .and_then(|records| records.remove(id.as_str()))
            .is_some();
        if removed {
            self.notify(&collections, collection);
        }
        Ok(())
    }

    fn subscribe_tail(&self, collection: &str, limit: FeedLimit) -> Subscription<Snapshot> {
        let collections = self.lock();
        let snapshot = Self::tail_snapshot(collections.get(collection), limit.as_usize());
        let (subscriber, subscription) = subscription_channel();
        subscriber.deliver(snapshot.clone());
        self.tails.register(
            TailWatch {
                collection: collection.to_owned(),
                limit: limit.as_usize(),
                last: snapshot,
            },
            subscriber,
        );
        subscription
    }

    fn subscribe_collection(&self, collection: &str) -> Subscription<Snapshot> {
        let collections = self.lock();
        let (subscriber, subscription) = subscription_channel();
        subscriber.deliver(Self::whole_snapshot(collections.get(collection)));
        self.wholes.register(collection.to_owned(), subscriber);
        subscription
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MESSAGES: &str = "messages";

    fn keys(snapshot: &Snapshot) -> Vec<String> {
        snapshot
            .val()
            .as_object()
            .map(|children| children.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn keys_sort_in_insertion_order() {
        let store = MemoryRealtimeStore::new();
        let mut ids = Vec::new();
        for n in 0..12 {
            ids.push(store.append(MESSAGES, json!({ "n": n })).await.unwrap());
        }

        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn tail_holds_last_records_and_starts_with_current_state() {
        let store = MemoryRealtimeStore::new();
        let mut ids = Vec::new();
        for n in 0..5 {
            ids.push(store.append(MESSAGES, json!({ "n": n })).await.unwrap());
        }

        let mut tail = store.subscribe_tail(MESSAGES, FeedLimit(2));
        let initial = tail.next().await.unwrap();

        assert_eq!(keys(&initial), vec![ids[3].0.clone(), ids[4].0.clone()]);
    }

    #[tokio::test]
    async fn empty_collection_yields_null_snapshot() {
        let store = MemoryRealtimeStore::new();
        let mut tail = store.subscribe_tail(MESSAGES, FeedLimit(10));
        let mut whole = store.subscribe_collection(MESSAGES);

        assert_eq!(tail.next().await.unwrap().val(), &Value::Null);
        assert_eq!(whole.next().await.unwrap().size(), 0);
    }

    #[tokio::test]
    async fn removal_outside_the_tail_is_not_delivered_to_it() {
        let store = MemoryRealtimeStore::new();
        let oldest = store.append(MESSAGES, json!({ "n": 0 })).await.unwrap();
        store.append(MESSAGES, json!({ "n": 1 })).await.unwrap();

        let mut tail = store.subscribe_tail(MESSAGES, FeedLimit(1));
        let mut whole = store.subscribe_collection(MESSAGES);
        tail.next().await.unwrap();
        whole.next().await.unwrap();

        store.remove(MESSAGES, &oldest).await.unwrap();

        assert_eq!(tail.try_next(), None);
        assert_eq!(whole.try_next().map(|s| s.size()), Some(1));
    }

    #[tokio::test]
    async fn removing_last_record_delivers_empty_snapshot() {
        let store = MemoryRealtimeStore::new();
        let id = store.append(MESSAGES, json!({ "n": 0 })).await.unwrap();
        let mut tail = store.subscribe_tail(MESSAGES, FeedLimit(10));
        tail.next().await.unwrap();

        store.remove(MESSAGES, &id).await.unwrap();

        assert!(tail.try_next().unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = MemoryRealtimeStore::new();
        let id = store.append(MESSAGES, json!({ "n": 0 })).await.unwrap();

        store.remove(MESSAGES, &id).await.unwrap();
        store.remove(MESSAGES, &id).await.unwrap();
        assert!(store.is_empty(MESSAGES));
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryRealtimeStore::new();
        let mut other = store.subscribe_collection("other");
        other.next().await.unwrap();

        store.append(MESSAGES, json!({ "n": 0 })).await.unwrap();

        assert_eq!(other.try_next(), None);
    }

    #[tokio::test]
    async fn offline_store_rejects_writes() {
        let store = MemoryRealtimeStore::new();
        store.set_available(false);

        let err = store.append(MESSAGES, json!({ "n": 0 })).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        let err = store
            .remove(MESSAGES, &MessageId("missing".to_owned()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn non_object_records_are_rejected() {
        let store = MemoryRealtimeStore::new();
        let err = store.append(MESSAGES, json!("text")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
    }

    #[tokio::test]
    async fn dropped_subscriptions_are_pruned() {
        let store = MemoryRealtimeStore::new();
        let tail = store.subscribe_tail(MESSAGES, FeedLimit(1));
        let whole = store.subscribe_collection(MESSAGES);
        assert_eq!(store.live_subscriptions(), 2);

        drop(tail);
        drop(whole);
        store.append(MESSAGES, json!({ "n": 0 })).await.unwrap();

        assert_eq!(store.live_subscriptions(), 0);
    }
}
