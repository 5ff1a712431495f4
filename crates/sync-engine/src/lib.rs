#![deny(missing_docs)]

//! # Overview
//!
//! `sync-engine` takes the [`planner::Plan`] a scan produced and turns it
//! into filesystem mutations: [`mover::detect_moves`] rewrites NEW/REMOVE
//! pairs into MOVE entries before anything is applied, and
//! [`apply::apply_plan`] executes the resulting plan's copies, moves,
//! quarantines, and empty-folder pruning (spec §4.G, §4.H).
//!
//! # Design
//!
//! Move detection and application are kept as separate passes, mirroring
//! the two-phase `__calc_mover_files`/`__perform_synchronization` split this
//! crate generalizes: a plan can be rewritten for move detection and
//! inspected before anything touches disk.
//!
//! # Errors
//!
//! [`error::ApplyError`] covers every way the apply phase can fail:
//! insufficient target capacity, a missing `clean_path`, and I/O failures
//! during copy, rename, or quarantine.

/// Executes a plan: copies, moves, quarantines, and folder pruning.
pub mod apply;
/// Errors the apply engine can raise.
pub mod error;
/// Rewrites NEW/REMOVE pairs into MOVE entries before apply.
pub mod mover;

pub use apply::{apply_plan, ApplyOutcome};
pub use error::ApplyError;
pub use mover::detect_moves;
