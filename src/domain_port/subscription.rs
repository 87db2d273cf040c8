use futures_util::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_util::sync::CancellationToken;

/// Cancellable handle on a live feed of notifications.
///
/// Once cancelled (explicitly or by drop) the handle yields nothing more,
/// even if the producer had already queued items.
pub struct Subscription<T> {
    receiver: UnboundedReceiver<T>,
    cancellation_token: CancellationToken,
}

/// Producer side of a [`Subscription`].
pub struct Subscriber<T> {
    sender: UnboundedSender<T>,
    cancellation_token: CancellationToken,
}

pub fn subscription_channel<T>() -> (Subscriber<T>, Subscription<T>) {
    let (sender, receiver) = unbounded_channel();
    let cancellation_token = CancellationToken::new();
    (
        Subscriber {
            sender,
            cancellation_token: cancellation_token.clone(),
        },
        Subscription {
            receiver,
            cancellation_token,
        },
    )
}

impl<T> Subscription<T> {
    pub async fn next(&mut self) -> Option<T> {
        tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => None,
            item = self.receiver.recv() => item,
        }
    }

    /// Non-blocking variant of [`Subscription::next`].
    pub fn try_next(&mut self) -> Option<T> {
        if self.cancellation_token.is_cancelled() {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        if self.cancellation_token.is_cancelled() {
            return Poll::Ready(None);
        }
        self.receiver.poll_recv(cx)
    }
}

impl<T> Subscriber<T> {
    /// Delivers `item`. Returns false once the subscription is gone, so the
    /// producer can prune it.
    pub fn deliver(&self, item: T) -> bool {
        if self.cancellation_token.is_cancelled() {
            return false;
        }
        self.sender.send(item).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.cancellation_token.is_cancelled() || self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn delivers_in_order() {
        let (subscriber, mut subscription) = subscription_channel();
        assert!(subscriber.deliver(1));
        assert!(subscriber.deliver(2));

        assert_eq!(subscription.next().await, Some(1));
        assert_eq!(subscription.next().await, Some(2));
        assert_eq!(subscription.try_next(), None);
    }

    #[tokio::test]
    async fn cancel_discards_queued_items() {
        let (subscriber, mut subscription) = subscription_channel();
        assert!(subscriber.deliver("stale"));

        subscription.cancel();

        assert_eq!(subscription.next().await, None);
        assert_eq!(StreamExt::next(&mut subscription).await, None);
        assert!(!subscriber.deliver("late"));
        assert!(subscriber.is_closed());
    }

    #[test]
    fn drop_closes_the_producer_side() {
        let (subscriber, subscription) = subscription_channel::<u32>();
        drop(subscription);
        assert!(subscriber.is_closed());
        assert!(!subscriber.deliver(7));
    }
}
