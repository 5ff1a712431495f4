#![deny(missing_docs)]

//! # Overview
//!
//! `planner` turns a declarative [`job::Job`] into a [`plan::Plan`]: the
//! source-root hierarchy and target mapping (§4.E), the folder-set and
//! file-set materialization that decides what is in scope (§4.C, §4.D), and
//! the scan sequence that classifies every file as NEW/MOD/SAME/SKIP/REMOVE
//! (§4.F). It does not decide whether a move happened (that is
//! `sync-engine`'s move detector) and it does not touch the filesystem
//! beyond read-only `walk`/`size`/`is_dir` queries.
//!
//! # Design
//!
//! Source roots live in a flat `Vec` and refer to one another by index
//! (`parent: Option<usize>`, `children: Vec<usize>`) rather than through
//! shared ownership, avoiding reference-counted cycles for what is
//! structurally a forest.
//!
//! # Errors
//!
//! [`error::PlannerError`] covers every configuration problem that must
//! abort a run before scanning begins: a missing source root, a duplicate
//! root id, a missing `clean_path` for a mode that needs one, and colliding
//! top-root targets.

/// Configuration-error type for the planning phase.
pub mod error;
/// File-set rule application within a single in-scope folder.
pub mod file_set;
/// Folder-set materialization and tag application.
pub mod folder_set;
/// Source-root hierarchy and target-path assignment.
pub mod hierarchy;
/// The external job description.
pub mod job;
/// Plan data model: source roots, scan folders, classified file entries.
pub mod plan;
/// The scan sequence that turns a job into a plan.
pub mod scan;

pub use error::PlannerError;
pub use job::{FilePolarity, Job, Mode, SourceRootConfig};
pub use plan::{Classification, FileEntry, Plan, RemoveEntry, ScanFolder, SkipEntry, SourceRoot};
pub use scan::build_plan;
