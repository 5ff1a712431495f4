//! Errors the apply engine can raise (spec §7.1, §7.4, §7.5).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// An error raised while applying a [`planner::Plan`] to the filesystem.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// A MOD or REMOVE entry needs quarantining but no `clean_path` was
    /// configured.
    #[error("clean_path is required to quarantine MOD/REMOVE entries")]
    MissingCleanPath,
    /// The pre-flight capacity check failed (spec §4.H).
    #[error("insufficient free space on target device: need {needed} bytes, {free} available")]
    InsufficientSpace {
        /// Total bytes the NEW/MOD copies would consume.
        needed: u64,
        /// Free bytes currently available on the target device.
        free: u64,
    },
    /// A copy failed on all 9 attempts.
    #[error("failed to copy \"{0}\" after 9 retries")]
    CopyExhausted(PathBuf, #[source] io::Error),
    /// A target or quarantine folder could not be created.
    #[error("failed to create folder {0}")]
    CreateFolder(PathBuf, #[source] io::Error),
    /// A MOVE rename failed.
    #[error("failed to move {0} to {1}")]
    Rename(PathBuf, PathBuf, #[source] io::Error),
    /// Quarantining a MOD/REMOVE entry failed.
    #[error("failed to quarantine {0}")]
    Quarantine(PathBuf, #[source] io::Error),
    /// An otherwise-unclassified I/O failure.
    #[error("apply engine I/O failure: {0}")]
    Io(#[from] io::Error),
}
