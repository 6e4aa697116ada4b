//! Subscribe/unsubscribe plumbing for raw scroll events.
//!
//! Hosts own an `EventHub` and emit into it whenever their scroll position
//! changes; the engine holds a `Subscription` and drains it. Dropping the
//! subscription unsubscribes.

use serde::Serialize;
use tokio::sync::mpsc;

/// A raw scroll notification. Carries no cause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollEvent {
    pub scroll_top: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct EventHub<E> {
    subscribers: Vec<(SubscriptionId, mpsc::UnboundedSender<E>)>,
    next_id: u64,
}

impl<E: Clone> EventHub<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe(&mut self) -> Subscription<E> {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push((id, tx));
        Subscription { id, rx }
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Deliver `event` to every live subscriber, pruning dropped ones.
    /// Returns the number of deliveries.
    pub fn emit(&mut self, event: E) -> usize {
        self.subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .count()
    }
}

impl<E: Clone> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Subscription<E> {
    id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<E>,
}

impl<E> Subscription<E> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Next queued event without waiting.
    pub fn try_next(&mut self) -> Option<E> {
        self.rx.try_recv().ok()
    }

    pub async fn next(&mut self) -> Option<E> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_subscribers() {
        let mut hub = EventHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.emit(ScrollEvent { scroll_top: 10.0 }), 2);
        assert_eq!(a.try_next(), Some(ScrollEvent { scroll_top: 10.0 }));
        assert_eq!(b.try_next(), Some(ScrollEvent { scroll_top: 10.0 }));
        assert_eq!(a.try_next(), None);
    }

    #[test]
    fn test_unsubscribe() {
        let mut hub = EventHub::new();
        let mut a = hub.subscribe();

        assert!(hub.unsubscribe(a.id()));
        assert!(!hub.unsubscribe(a.id()));
        assert_eq!(hub.emit(ScrollEvent { scroll_top: 1.0 }), 0);
        assert_eq!(a.try_next(), None);
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let mut hub = EventHub::new();
        let sub = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.emit(ScrollEvent { scroll_top: 1.0 }), 0);
    }

    #[tokio::test]
    async fn test_async_next() {
        let mut hub = EventHub::new();
        let mut sub = hub.subscribe();
        hub.emit(ScrollEvent { scroll_top: 3.0 });

        assert_eq!(sub.next().await, Some(ScrollEvent { scroll_top: 3.0 }));
    }
}
