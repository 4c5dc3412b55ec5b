//! # Load Outcomes
//!
//! Typed result of one `run`: one entry per produced artifact or dropped item.
//! The service only returns these; raising notifications is left to the
//! stream stage.

use shared_types::entities::{FileKind, LoadedFile};
use std::fmt;

/// Step of the pipeline at which an item left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Decoding the raw transaction or validating a parsed intent.
    Parse,
    /// Identity resolution and shared-secret derivation.
    Resolve,
    /// Opening the permission pointer carried in the payload.
    DecryptPayload,
    /// First batched fetch.
    FetchPrimary,
    /// Recovering the permission record.
    Recover,
    /// Second batched fetch.
    FetchShared,
    /// Decrypting the shared file.
    DecryptFile,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parse => "parse",
            Self::Resolve => "resolve",
            Self::DecryptPayload => "decrypt_payload",
            Self::FetchPrimary => "fetch_primary",
            Self::Recover => "recover",
            Self::FetchShared => "fetch_shared",
            Self::DecryptFile => "decrypt_file",
        };
        f.write_str(name)
    }
}

/// Why an item was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Not a directive for this loader.
    Unparseable,
    /// A pass-through intent failed validation.
    InvalidIntent,
    /// No shared secret could be derived for a permission intent.
    MissingSharedSecret,
    /// The permission pointer did not decrypt.
    PayloadDecryptFailed,
    /// A storage key was not valid UTF-8.
    MalformedPointer,
    /// The keeper has nothing under the requested key.
    NotFound,
    /// The fetched permission record did not decode.
    PermissionRecoveryFailed,
    /// The shared file did not decrypt with the record's key.
    FileDecryptFailed,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unparseable => "unparseable",
            Self::InvalidIntent => "invalid_intent",
            Self::MissingSharedSecret => "missing_shared_secret",
            Self::PayloadDecryptFailed => "payload_decrypt_failed",
            Self::MalformedPointer => "malformed_pointer",
            Self::NotFound => "not_found",
            Self::PermissionRecoveryFailed => "permission_recovery_failed",
            Self::FileDecryptFailed => "file_decrypt_failed",
        };
        f.write_str(name)
    }
}

/// Diagnostic record of a soft failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedItem {
    /// Position of the item in its input batch.
    pub original_index: usize,
    /// Where the item left the pipeline.
    pub stage: PipelineStage,
    /// Why.
    pub reason: DropReason,
}

impl DroppedItem {
    /// Create a drop record.
    pub fn new(original_index: usize, stage: PipelineStage, reason: DropReason) -> Self {
        Self {
            original_index,
            stage,
            reason,
        }
    }
}

/// Per-item result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A public or shared file reached the end of the pipeline.
    Loaded(LoadedFile),
    /// A permission record was recovered (intermediate, not returned by `load`).
    PermissionRecovered(LoadedFile),
    /// The item was dropped.
    Dropped(DroppedItem),
}

impl LoadOutcome {
    /// Batch position the outcome belongs to.
    pub fn original_index(&self) -> usize {
        match self {
            Self::Loaded(file) | Self::PermissionRecovered(file) => file.original_index,
            Self::Dropped(item) => item.original_index,
        }
    }

    /// File carried by a successful outcome.
    pub fn file(&self) -> Option<&LoadedFile> {
        match self {
            Self::Loaded(file) | Self::PermissionRecovered(file) => Some(file),
            Self::Dropped(_) => None,
        }
    }
}

/// Everything one run produced, ordered by `original_index`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    outcomes: Vec<LoadOutcome>,
    fetch_rounds: u8,
}

impl LoadReport {
    /// Build a report. Outcomes are stably sorted by batch position, so a
    /// recovered permission stays ahead of the shared file it led to.
    pub fn new(mut outcomes: Vec<LoadOutcome>, fetch_rounds: u8) -> Self {
        outcomes.sort_by_key(LoadOutcome::original_index);
        Self {
            outcomes,
            fetch_rounds,
        }
    }

    /// All outcomes in batch order.
    pub fn outcomes(&self) -> &[LoadOutcome] {
        &self.outcomes
    }

    /// Number of keeper round trips the run made (0, 1 or 2).
    pub fn fetch_rounds(&self) -> u8 {
        self.fetch_rounds
    }

    /// Dropped items in batch order.
    pub fn dropped(&self) -> impl Iterator<Item = &DroppedItem> {
        self.outcomes.iter().filter_map(|o| match o {
            LoadOutcome::Dropped(item) => Some(item),
            _ => None,
        })
    }

    /// Number of public and shared files.
    pub fn loaded_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Loaded(_)))
            .count()
    }

    /// Number of files of one kind, including recovered permissions.
    pub fn count_of(&self, kind: FileKind) -> usize {
        self.outcomes
            .iter()
            .filter_map(LoadOutcome::file)
            .filter(|f| f.kind == kind)
            .count()
    }

    /// Public and shared files, sorted by `original_index`.
    pub fn into_files(self) -> Vec<LoadedFile> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o {
                LoadOutcome::Loaded(file) => Some(file),
                _ => None,
            })
            .collect()
    }
}
