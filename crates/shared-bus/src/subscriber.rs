//! # Event Subscriber
//!
//! A [`Subscription`] is one broadcast receiver plus the filter applied to
//! everything it receives. A subscriber that falls more than the channel
//! capacity behind skips the overflow and keeps going.

use crate::events::{EventFilter, LoaderEvent};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

/// Subscription errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Every publisher is gone.
    #[error("Event bus closed")]
    Closed,
}

/// Filtered view of the bus.
pub struct Subscription {
    receiver: broadcast::Receiver<LoaderEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<LoaderEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Next matching event, or `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<LoaderEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscriber lagged behind the bus");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching event already buffered, without waiting.
    pub fn try_recv(&mut self) -> Result<Option<LoaderEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// The filter applied to received events.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Matching events as a stream ending when the bus is dropped.
    pub fn into_stream(self) -> impl Stream<Item = LoaderEvent> + Send + Unpin {
        let filter = self.filter;
        BroadcastStream::new(self.receiver)
            .filter_map(move |item| item.ok().filter(|event| filter.matches(event)))
    }
}
