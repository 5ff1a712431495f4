#![deny(missing_docs)]

//! # Overview
//!
//! Shared helpers for the workspace's integration tests: a [`TempTree`]
//! builder that lays out files and directories under a [`tempfile::TempDir`]
//! so `dirsync`'s end-to-end tests can exercise [`vfs::RealFileSystem`]
//! instead of the in-memory fake every crate's unit tests use.
//!
//! # Design
//!
//! Mirrors the builder style of `vfs::memory::MemoryFileSystem`
//! (`with_dir`/`with_file`) so a test reads the same way whether it is
//! exercising the real or the in-memory filesystem.

use std::fs;
use std::path::{Path, PathBuf};

/// A temporary directory tree built for a single test.
///
/// The underlying [`tempfile::TempDir`] is removed when this value drops, so
/// keep it alive for the duration of the test.
pub struct TempTree {
    dir: tempfile::TempDir,
}

impl TempTree {
    /// Creates a new, empty temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created; this is always a
    /// test-environment failure, not something a test should recover from.
    #[must_use]
    pub fn new() -> Self {
        Self { dir: tempfile::tempdir().expect("failed to create temp dir for test") }
    }

    /// Returns the tree's root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Returns `root/relative`, without creating anything.
    #[must_use]
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Creates `relative` (and any missing parents) as a directory. Builder-style.
    ///
    /// # Panics
    ///
    /// Panics if directory creation fails.
    #[must_use]
    pub fn with_dir(self, relative: impl AsRef<Path>) -> Self {
        fs::create_dir_all(self.path(relative)).expect("failed to create directory in temp tree");
        self
    }

    /// Writes `relative` as a file containing `size` zero bytes, creating
    /// parent directories as needed. Builder-style.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn with_file(self, relative: impl AsRef<Path>, size: u64) -> Self {
        self.with_file_contents(relative, &vec![0u8; size as usize])
    }

    /// Writes `relative` as a file with exactly `contents`, creating parent
    /// directories as needed. Builder-style.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn with_file_contents(self, relative: impl AsRef<Path>, contents: &[u8]) -> Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directory in temp tree");
        }
        fs::write(&path, contents).expect("failed to write file in temp tree");
        self
    }
}

impl Default for TempTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_and_dirs_land_under_the_root() {
        let tree = TempTree::new().with_dir("a/b").with_file("a/b/c.txt", 3);
        assert!(tree.path("a/b").is_dir());
        assert_eq!(fs::metadata(tree.path("a/b/c.txt")).unwrap().len(), 3);
    }
}
