//! Checkpointing of crawl state
//!
//! Snapshots are JSON files named `crawler_checkpoint_<kind>_<timestamp>.json`.
//! Automatic checkpoints are written on a timer while the crawl runs, manual
//! ones on request, and a final one when the session terminates.

mod manager;
mod snapshot;
mod timer;

pub use manager::{CheckpointInfo, CheckpointManager, CHECKPOINT_PREFIX};
pub use snapshot::CrawlSnapshot;
pub use timer::CheckpointTimer;

use std::fmt;
use thiserror::Error;

/// Errors raised while saving or loading checkpoints
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid checkpoint: {0}")]
    Invalid(String),

    #[error("Cannot load a checkpoint while the crawl is {0}")]
    NotIdle(crate::state::CrawlPhase),
}

/// Why a checkpoint was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckpointKind {
    /// Periodic save while running
    Auto,
    /// Explicit save requested by the user
    Manual,
    /// Save made while the session terminates
    Final,
}

impl CheckpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::Final => "final",
        }
    }

    /// Determines the kind from a checkpoint file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix(CHECKPOINT_PREFIX)?;
        [Self::Auto, Self::Manual, Self::Final]
            .into_iter()
            .find(|kind| {
                rest.strip_prefix(kind.as_str())
                    .is_some_and(|tail| tail.starts_with('_'))
            })
    }
}

impl fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(
            CheckpointKind::from_file_name("crawler_checkpoint_auto_20240101_120000_000001.json"),
            Some(CheckpointKind::Auto)
        );
        assert_eq!(
            CheckpointKind::from_file_name("crawler_checkpoint_final_20240101_120000.json"),
            Some(CheckpointKind::Final)
        );
        assert_eq!(
            CheckpointKind::from_file_name("crawler_checkpoint_manual_x.json"),
            Some(CheckpointKind::Manual)
        );
        assert_eq!(CheckpointKind::from_file_name("crawler_checkpoint_other_x.json"), None);
        assert_eq!(CheckpointKind::from_file_name("results.json"), None);
    }
}
