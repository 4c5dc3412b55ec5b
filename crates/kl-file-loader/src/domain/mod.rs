//! # Domain Layer
//!
//! Pure types of the loader pipeline. No I/O happens here.

pub mod entities;
pub mod errors;
pub mod outcome;
pub mod value_objects;

pub use entities::{FetchResult, IdentityMatch, KeyMaterial, ResolvedParties, SharedSecret};
pub use errors::{CodecError, KeeperError, LoaderError, LookupError};
pub use outcome::{DropReason, DroppedItem, LoadOutcome, LoadReport, PipelineStage};
pub use value_objects::{FetchRound, LoaderConfig, StageConfig};
