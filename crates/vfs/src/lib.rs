#![deny(missing_docs)]

//! # Overview
//!
//! `vfs` abstracts over the directory-walk, file-size, copy, rename, and
//! free-space primitives the planner and apply engine need, so that both can
//! be exercised against an in-memory tree in tests rather than a real
//! filesystem. [`RealFileSystem`] implements [`FileSystem`] over
//! [`std::fs`] plus `fs2` for free-space queries; [`memory::MemoryFileSystem`]
//! implements it over a plain in-memory tree.
//!
//! # Design
//!
//! [`FileSystem::walk`] always returns entries in lexicographic path order,
//! matching the deterministic-iteration requirement in the workspace's
//! resource model (directory-walk order is a stable, reproducible total
//! order, not whatever the OS directory-entry order happens to be).
//!
//! # Errors
//!
//! All fallible operations return [`std::io::Error`]; callers that need a
//! richer error enum (the planner, the apply engine) wrap these in their own
//! `thiserror` types.

use path_util::DeviceId;
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem implementation used by tests across the workspace.
pub mod memory;
/// Real filesystem implementation backed by `std::fs` and `fs2`.
pub mod real;

pub use real::RealFileSystem;

/// Abstracts over the filesystem operations the planner and apply engine
/// need, so both can run against a real filesystem or an in-memory fake.
pub trait FileSystem {
    /// Returns whether `path` exists (file or directory).
    fn exists(&self, path: &Path) -> bool;
    /// Returns whether `path` exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;
    /// Returns whether `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;
    /// Returns the size in bytes of the file at `path`.
    fn size(&self, path: &Path) -> io::Result<u64>;
    /// Lists entries under `path`, in lexicographic order.
    ///
    /// When `recurse` is `false` only immediate children are returned. The
    /// `files`/`folders` flags select which entry kinds are included.
    fn walk(&self, path: &Path, recurse: bool, files: bool, folders: bool) -> io::Result<Vec<PathBuf>>;
    /// Creates `path` and any missing parents.
    fn ensure_dir(&self, path: &Path) -> io::Result<()>;
    /// Copies the file at `src` to `dst`, overwriting `dst` if present.
    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()>;
    /// Renames (moves) `src` to `dst`.
    fn rename(&self, src: &Path, dst: &Path) -> io::Result<()>;
    /// Recursively removes every folder under `root` that (transitively)
    /// contains no files, returning the paths removed.
    fn remove_empty_dirs(&self, root: &Path) -> io::Result<Vec<PathBuf>>;
    /// Returns the number of free bytes available on the device identified
    /// by `device`.
    fn free_bytes(&self, device: &DeviceId) -> io::Result<u64>;
    /// Returns the device identifier `path` resides on.
    fn device_of(&self, path: &Path) -> io::Result<DeviceId>;
}
