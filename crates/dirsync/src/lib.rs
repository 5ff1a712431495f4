#![deny(missing_docs)]

//! # Overview
//!
//! `dirsync` is the facade crate tying the workspace together: it runs a
//! [`planner::Job`] end to end (plan, detect moves, apply, report) and
//! exposes the CSV reporting surface described in spec §6. Binaries and
//! embedders depend on this crate alone; `planner`, `sync-engine`, `rules`,
//! `vfs`, `path-util`, and `logging` are its implementation.
//!
//! # Design
//!
//! Mirrors the workspace-facade role `rsync_core` plays for its sibling
//! crates: one crate re-exports the public surface sibling crates need to
//! be driven together, and owns the one cross-cutting concern none of them
//! owns individually (here, CSV reporting).
//!
//! # Errors
//!
//! [`error::DirsyncError`] wraps every stage's error type: [`planner::PlannerError`]
//! for configuration problems, [`sync_engine::ApplyError`] for apply-phase
//! failures, and I/O failures from move detection or CSV writing.

/// Aggregated error type for a job run.
pub mod error;
/// Job execution entry point.
pub mod run;
/// CSV reporting.
pub mod sink;

pub use error::DirsyncError;
pub use run::{run, RunOutcome};
pub use sink::{write_plan_rows, CsvRowSink, RowSink};

pub use logging::{Level, Logger, NullLogger};
pub use planner::{Classification, FileEntry, FilePolarity, Job, Mode, Plan, SourceRootConfig};
pub use rules::RuleError;
pub use sync_engine::ApplyOutcome;
pub use vfs::{memory::MemoryFileSystem, FileSystem, RealFileSystem};
