use crate::domain_port::Subscriber;
use std::sync::{Mutex, MutexGuard, PoisonError};

struct Registration<S, T> {
    state: S,
    subscriber: Subscriber<T>,
}

/// Live subscribers of an in-memory adapter, each with its own watch state.
/// Cancelled subscribers are pruned on the next publish.
pub struct SubscriberSet<S, T> {
    entries: Mutex<Vec<Registration<S, T>>>,
}

impl<S, T> SubscriberSet<S, T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Registration<S, T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, state: S, subscriber: Subscriber<T>) {
        self.lock().push(Registration { state, subscriber });
    }

    /// Offers an item to every live subscriber. `render` may update the
    /// subscriber's state and returns `None` to skip it this round.
    /// Returns how many subscribers received something.
    pub fn publish(&self, mut render: impl FnMut(&mut S) -> Option<T>) -> usize {
        let mut entries = self.lock();
        let mut delivered = 0;
        entries.retain_mut(|entry| {
            if entry.subscriber.is_closed() {
                return false;
            }
            match render(&mut entry.state) {
                Some(item) => {
                    let alive = entry.subscriber.deliver(item);
                    if alive {
                        delivered += 1;
                    }
                    alive
                }
                None => true,
            }
        });
        delivered
    }

    pub fn live_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|entry| !entry.subscriber.is_closed())
            .count()
    }
}

impl<S, T> Default for SubscriberSet<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_port::subscription_channel;

    #[tokio::test]
    async fn publish_skips_and_prunes() {
        let set = SubscriberSet::new();
        let (even, mut even_sub) = subscription_channel();
        let (odd, odd_sub) = subscription_channel();
        set.register(0u32, even);
        set.register(1u32, odd);

        drop(odd_sub);
        assert_eq!(set.live_count(), 1);

        let delivered = set.publish(|parity| (*parity == 0).then_some("even"));
        assert_eq!(delivered, 1);
        assert_eq!(even_sub.next().await, Some("even"));
        assert_eq!(set.live_count(), 1);
    }
}
