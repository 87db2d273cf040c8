use crate::application_port::FeedUpdate;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

/// Live, windowed view of the shared message collection.
///
/// Holds two independent subscriptions: the tail of the last `limit`
/// messages, and the whole collection (read only for its size). The visible
/// list is always a straight copy of the latest tail snapshot.
pub struct FeedViewModel {
    store: Arc<dyn RealtimeStore>,
    collection: String,
    initial_limit: FeedLimit,
    limit: FeedLimit,
    messages: Vec<Message>,
    total_count: usize,
    tail: Option<Subscription<Snapshot>>,
    count: Option<Subscription<Snapshot>>,
}

enum Incoming {
    Tail(Snapshot),
    Count(Snapshot),
}

impl FeedViewModel {
    pub fn new(store: Arc<dyn RealtimeStore>, collection: &str, initial_limit: FeedLimit) -> Self {
        Self {
            store,
            collection: collection.to_owned(),
            initial_limit,
            limit: initial_limit,
            messages: Vec::new(),
            total_count: 0,
            tail: None,
            count: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn limit(&self) -> FeedLimit {
        self.limit
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn is_open(&self) -> bool {
        self.tail.is_some()
    }

    /// Starts both subscriptions with the current window.
    pub fn open(&mut self) {
        if self.count.is_none() {
            self.count = Some(self.store.subscribe_collection(&self.collection));
        }
        self.subscribe(self.limit);
    }

    /// Replaces the tail subscription with one of size `limit`. The old one
    /// is cancelled first so nothing it still has queued gets applied.
    /// Only `open` and `grow` call this, so the window never shrinks while
    /// the feed is open.
    fn subscribe(&mut self, limit: FeedLimit) {
        if let Some(previous) = self.tail.take() {
            previous.cancel();
            tracing::debug!(limit = %self.limit, "tail subscription cancelled");
        }
        self.limit = limit;
        self.tail = Some(self.store.subscribe_tail(&self.collection, limit));
        tracing::debug!(%limit, collection = %self.collection, "tail subscription opened");
    }

    /// Moves the window by `increment` if the collection holds more than is
    /// shown. Returns the new limit when it grew.
    pub fn grow(&mut self, increment: PageIncrement) -> Option<FeedLimit> {
        if self.limit.covers(self.total_count) {
            return None;
        }
        let grown = self.limit.grown_by(increment);
        self.subscribe(grown);
        Some(grown)
    }

    /// Tears everything down and rewinds the window for the next session.
    pub fn close(&mut self) {
        if let Some(tail) = self.tail.take() {
            tail.cancel();
        }
        if let Some(count) = self.count.take() {
            count.cancel();
        }
        self.messages.clear();
        self.total_count = 0;
        self.limit = self.initial_limit;
        tracing::debug!(collection = %self.collection, "feed closed");
    }

    /// Waits for the next notification from either subscription and applies
    /// it. Returns `None` when the feed is closed.
    pub async fn next_update(&mut self) -> Option<FeedUpdate> {
        let incoming = match (self.tail.as_mut(), self.count.as_mut()) {
            (None, None) => return None,
            (Some(tail), None) => Incoming::Tail(tail.next().await?),
            (None, Some(count)) => Incoming::Count(count.next().await?),
            (Some(tail), Some(count)) => tokio::select! {
                Some(snapshot) = tail.next() => Incoming::Tail(snapshot),
                Some(snapshot) = count.next() => Incoming::Count(snapshot),
                else => return None,
            },
        };
        Some(self.apply(incoming))
    }

    /// Applies every notification already queued, without waiting.
    pub fn drain_pending(&mut self) -> Vec<FeedUpdate> {
        let mut updates = Vec::new();
        loop {
            let incoming = if let Some(snapshot) = self.count.as_mut().and_then(|c| c.try_next()) {
                Incoming::Count(snapshot)
            } else if let Some(snapshot) = self.tail.as_mut().and_then(|t| t.try_next()) {
                Incoming::Tail(snapshot)
            } else {
                break;
            };
            updates.push(self.apply(incoming));
        }
        updates
    }

    fn apply(&mut self, incoming: Incoming) -> FeedUpdate {
        match incoming {
            Incoming::Tail(snapshot) => {
                self.apply_snapshot(&snapshot);
                FeedUpdate::Messages {
                    visible: self.messages.len(),
                }
            }
            Incoming::Count(snapshot) => {
                self.total_count = snapshot.size();
                FeedUpdate::TotalCount(self.total_count)
            }
        }
    }

    /// Replaces the visible list with the snapshot's records, in the order
    /// the store delivered them. An empty snapshot empties the list.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        let Some(children) = snapshot.val().as_object() else {
            self.messages.clear();
            return;
        };

        self.messages = children
            .iter()
            .filter_map(|(key, value)| {
                match serde_json::from_value::<MessageRecord>(value.clone()) {
                    Ok(record) => Some(Message::from_record(MessageId(key.clone()), record)),
                    Err(e) => {
                        tracing::warn!(%key, "skipping undecodable record: {}", e);
                        None
                    }
                }
            })
            .collect();
    }
}

impl Drop for FeedViewModel {
    fn drop(&mut self) {
        self.close();
    }
}
