//! # Shared Bus
//!
//! Fan-out of loader notifications. The stage publishes; listeners such as
//! the metrics handler subscribe with a topic filter.
//!
//! ```text
//!  LoaderStage ──publish()──→ InMemoryEventBus ──subscribe(filter)──→ Subscription
//!                                   │
//!                                   └──────────────────────────────→ Subscription
//! ```
//!
//! ## Topics
//!
//! | Topic | Raised for |
//! |-------|------------|
//! | `file:public` | public file fetched |
//! | `file:permission` | permission record recovered |
//! | `file:shared` | shared file fetched |
//! | `file` | every loaded file, after its specific topic |
//! | `error` | a unit rejected as a whole |

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, LoaderEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Events buffered per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
