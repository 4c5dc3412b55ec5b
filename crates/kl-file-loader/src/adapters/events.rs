//! # Outcome Dispatch
//!
//! Fixed mapping from outcome kind to bus notifications:
//!
//! | Outcome | Specific | Generic |
//! |---------|----------|---------|
//! | `Loaded` (public) | `file:public` | `file` |
//! | `PermissionRecovered` | `file:permission` | `file` |
//! | `Loaded` (sharedfile) | `file:shared` | `file` |
//! | `Dropped` | none | none |

use crate::domain::outcome::LoadOutcome;
use shared_bus::LoaderEvent;

/// Notifications raised for one outcome, specific event first.
pub fn notifications_for(outcome: &LoadOutcome) -> Vec<LoaderEvent> {
    match outcome {
        LoadOutcome::Loaded(file) | LoadOutcome::PermissionRecovered(file) => {
            LoaderEvent::for_file(file.clone()).to_vec()
        }
        LoadOutcome::Dropped(_) => Vec::new(),
    }
}
