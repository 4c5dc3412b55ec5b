//! # Event Publisher
//!
//! The publishing half of the bus plus the broadcast-backed bus itself.
//!
//! Publishing never blocks and never fails: a loader with nobody listening
//! is a normal deployment, so an event without receivers is only counted.

use crate::events::{EventFilter, EventTopic, LoaderEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Publishing side of the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Raise `event`, returning how many subscriptions it reached.
    async fn publish(&self, event: LoaderEvent) -> usize;

    /// Raise `events` in order, returning the total reach.
    async fn publish_all(&self, events: Vec<LoaderEvent>) -> usize {
        let mut reached = 0;
        for event in events {
            reached += self.publish(event).await;
        }
        reached
    }
}

// Indexes into the per-topic counters. `All` is a filter-only topic.
const TOPICS: [EventTopic; 5] = [
    EventTopic::FilePublic,
    EventTopic::FilePermission,
    EventTopic::FileShared,
    EventTopic::File,
    EventTopic::Error,
];

/// Broadcast bus shared by the stage and its listeners.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<LoaderEvent>,
    published: [AtomicU64; 5],
}

impl InMemoryEventBus {
    /// Bus buffering [`DEFAULT_CHANNEL_CAPACITY`] events per subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` events per subscriber before it lags.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: Default::default(),
        }
    }

    /// Listen for events accepted by `filter`.
    ///
    /// Only events raised after this call are seen.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "Bus subscription opened");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Events raised under `topic` so far. `EventTopic::All` sums every topic.
    #[must_use]
    pub fn published_on(&self, topic: EventTopic) -> u64 {
        match TOPICS.iter().position(|t| *t == topic) {
            Some(slot) => self.published[slot].load(Ordering::Relaxed),
            None => self
                .published
                .iter()
                .map(|c| c.load(Ordering::Relaxed))
                .sum(),
        }
    }

    fn count(&self, topic: EventTopic) {
        if let Some(slot) = TOPICS.iter().position(|t| *t == topic) {
            self.published[slot].fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LoaderEvent) -> usize {
        let topic = event.topic();
        self.count(topic);

        match self.sender.send(event) {
            Ok(reached) => {
                trace!(%topic, reached, "Event raised");
                reached
            }
            Err(_) => {
                trace!(%topic, "Event raised with no listeners");
                0
            }
        }
    }
}
