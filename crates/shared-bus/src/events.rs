//! # Loader Events
//!
//! Defines all event types that flow through the shared bus.
//!
//! Every successful outcome is raised twice: once under its specific topic
//! (`file:public`, `file:permission`, `file:shared`) and once under the
//! generic `file` topic. Systemic failures are raised under `error`.

use serde::{Deserialize, Serialize};
use shared_types::entities::{FileKind, LoadedFile};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum LoaderEvent {
    // =========================================================================
    // SPECIFIC FILE EVENTS
    // =========================================================================
    /// A public file was fetched.
    #[serde(rename = "file:public")]
    FilePublic(LoadedFile),

    /// A permission record was recovered.
    #[serde(rename = "file:permission")]
    FilePermission(LoadedFile),

    /// A shared file was fetched (and decrypted if keyed).
    #[serde(rename = "file:shared")]
    FileShared(LoadedFile),

    // =========================================================================
    // GENERIC FILE EVENT
    // =========================================================================
    /// Raised for every file of any kind.
    #[serde(rename = "file")]
    File(LoadedFile),

    // =========================================================================
    // SYSTEMIC FAILURE
    // =========================================================================
    /// A batch failed as a whole.
    #[serde(rename = "error")]
    Error {
        /// Error description.
        message: String,
    },
}

impl LoaderEvent {
    /// The `{specific, generic}` pair raised for a loaded file.
    #[must_use]
    pub fn for_file(file: LoadedFile) -> [LoaderEvent; 2] {
        let specific = match file.kind {
            FileKind::Public => Self::FilePublic(file.clone()),
            FileKind::Permission => Self::FilePermission(file.clone()),
            FileKind::SharedFile => Self::FileShared(file.clone()),
        };
        [specific, Self::File(file)]
    }

    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::FilePublic(_) => EventTopic::FilePublic,
            Self::FilePermission(_) => EventTopic::FilePermission,
            Self::FileShared(_) => EventTopic::FileShared,
            Self::File(_) => EventTopic::File,
            Self::Error { .. } => EventTopic::Error,
        }
    }

    /// The file carried by this event, if any.
    #[must_use]
    pub fn file(&self) -> Option<&LoadedFile> {
        match self {
            Self::FilePublic(f) | Self::FilePermission(f) | Self::FileShared(f) | Self::File(f) => {
                Some(f)
            }
            Self::Error { .. } => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// `file:public`
    FilePublic,
    /// `file:permission`
    FilePermission,
    /// `file:shared`
    FileShared,
    /// `file`
    File,
    /// `error`
    Error,
    /// All events (no filtering).
    All,
}

impl EventTopic {
    /// Wire name of the topic.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilePublic => "file:public",
            Self::FilePermission => "file:permission",
            Self::FileShared => "file:shared",
            Self::File => "file",
            Self::Error => "error",
            Self::All => "*",
        }
    }
}

impl std::fmt::Display for EventTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LoaderEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
