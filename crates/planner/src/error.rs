//! Configuration-error taxonomy for the planning phase (spec §7.1).

use crate::job::Mode;
use std::path::PathBuf;
use thiserror::Error;

/// An error that aborts planning before any filesystem mutation occurs.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A job was built with no declared source roots.
    #[error("a job must declare at least one source root")]
    NoSourceRoots,
    /// A declared source root's path does not exist or is not a directory.
    #[error("source root path does not exist or is not a directory: {0}")]
    RootNotFound(PathBuf),
    /// Two source roots were declared with the same id.
    #[error("source root id `{0}` is declared more than once")]
    DuplicateRootId(String),
    /// `clean_path` is required for this mode but was not configured.
    #[error("clean_path is required for mode {0:?}")]
    MissingCleanPath(Mode),
    /// `target_path` is required for this mode but was not configured.
    #[error("target_path is required for mode {0:?}")]
    MissingTargetPath(Mode),
    /// Two or more top-level source roots were assigned the same target
    /// directory (spec §9 open question, resolved as a configuration error).
    #[error("two or more top-level source roots resolve to the same target path: {0}")]
    CollidingTargets(PathBuf),
    /// `clean_path` and `target_path` resolve to different storage devices,
    /// which would turn every REMOVE/MOD quarantine into a cross-device copy
    /// instead of the cheap rename the apply engine assumes (spec §8,
    /// testable property 6).
    #[error("clean_path ({clean}) and target_path ({target}) are on different devices")]
    CrossDeviceClean {
        /// The configured target path.
        target: PathBuf,
        /// The configured clean path.
        clean: PathBuf,
    },
    /// An underlying filesystem operation failed during planning.
    #[error("planning I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
