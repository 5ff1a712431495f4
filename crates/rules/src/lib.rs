#![deny(missing_docs)]

//! # Overview
//!
//! `rules` parses and evaluates the two rule languages the synchronizer's
//! configuration surface exposes: folder-set rules (which folders are
//! in-scope, and which tags they carry) and file-set rules (which files
//! within an in-scope folder are included).
//!
//! # Design
//!
//! Both rule kinds are represented as tagged-union condition types
//! ([`folder::FolderCondition`], [`file::FileCondition`]) rather than a
//! class hierarchy, matching the workspace's design note that rule
//! conditions should be an exhaustively-matched sum type. Parsing
//! ([`folder::parse_folder_rule`], [`file::parse_file_rule`]) and
//! evaluation ([`folder::folder_condition_matches`],
//! [`file::file_rule_matches`]) are kept as separate pure functions so the
//! planner crate can drive both without this crate depending on a logger.
//!
//! # Errors
//!
//! Parsing returns [`error::RuleError`]. A failing rule string is never
//! fatal on its own: the `parse_*_rules` batch helpers swallow individual
//! failures into a caller-supplied warning callback and keep the
//! successfully parsed rules, per spec §7.2.

/// Rule parsing/evaluation error type.
pub mod error;
/// File-set rule parsing and evaluation.
pub mod file;
/// Folder-set rule parsing and evaluation.
pub mod folder;
/// Byte-size suffix parsing shared by file-set `SIZE_*` conditions.
pub mod size;

pub use error::RuleError;
pub use file::{any_rule_matches, file_rule_matches, parse_file_rule, parse_file_rules, FileCondition, FileRule};
pub use folder::{folder_condition_matches, parse_folder_rule, parse_folder_rules, FolderCondition, FolderRule};
pub use size::parse_byte_size;
