//! Aggregated error type for a full job run (spec §7).

use thiserror::Error;

/// An error raised anywhere in a job run: planning, move detection, apply,
/// or CSV reporting.
#[derive(Debug, Error)]
pub enum DirsyncError {
    /// Planning failed before any filesystem mutation occurred.
    #[error(transparent)]
    Planning(#[from] planner::PlannerError),
    /// The apply phase failed.
    #[error(transparent)]
    Apply(#[from] sync_engine::ApplyError),
    /// Move detection failed while reading the clean/quarantine inventory.
    #[error("move detection I/O failure: {0}")]
    MoveDetection(#[source] std::io::Error),
    /// The CSV report file could not be opened or written.
    #[error("failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),
    /// An otherwise-unclassified I/O failure, e.g. opening the report file.
    #[error("dirsync I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
