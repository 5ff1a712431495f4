#![deny(missing_docs)]

//! # Overview
//!
//! `path_util` centralises the small set of path operations the planner and
//! apply engine both depend on: normalizing a path to an absolute canonical
//! form, testing containment between two paths without being fooled by
//! lexical prefix matches, and identifying which storage device a path lives
//! on so the apply engine can decide whether a removal may be a rename.
//!
//! # Design
//!
//! [`normalize`] canonicalizes existing paths via [`std::fs::canonicalize`]
//! and falls back to a purely lexical absolutize-and-collapse pass for paths
//! that do not exist yet (the target of a not-yet-created mirror, for
//! example). [`is_under`] always normalizes both sides first, then compares
//! `Path` components rather than string prefixes. [`device_of`] reads the
//! Unix device number via `stat(2)` or, on Windows, uses the drive-letter
//! prefix as a stand-in device identifier.
//!
//! # Invariants
//!
//! - [`is_under`] never returns `true` because of a shared string prefix that
//!   does not fall on a path-component boundary (`/a/bc` is not under `/a/b`).
//! - [`normalize`] preserves a Windows drive letter when present.
//!
//! # Errors
//!
//! [`normalize`] and [`device_of`] return [`std::io::Error`] when the
//! underlying filesystem call fails; [`is_under`] never fails and instead
//! returns `false` if either path cannot be normalized.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Identifies the storage device a path resides on.
///
/// On Unix this wraps the `st_dev` field returned by `stat(2)`. On Windows,
/// where reading the volume serial number would require an extra
/// dependency, the normalized drive-letter prefix (`C:`, `D:`, ...) is used
/// instead; this is sufficient to detect the common case of two paths on
/// different drives.
///
/// Equality and hashing only consider the device identity, never the
/// `representative_path`, so two [`DeviceId`]s obtained from different paths
/// on the same volume compare equal.
#[derive(Clone, Debug)]
pub struct DeviceId {
    representative_path: PathBuf,
    inner: DeviceIdInner,
}

impl DeviceId {
    /// Returns a path known to reside on this device, suitable for
    /// filesystem calls (e.g. free-space queries) that require a path
    /// rather than a raw device identifier.
    #[must_use]
    pub fn representative_path(&self) -> &Path {
        &self.representative_path
    }

    /// Builds a device identifier from an arbitrary tag rather than a real
    /// `stat(2)` call, for in-memory filesystem fakes where every path is
    /// considered to live on a single simulated device. Two identifiers
    /// built with the same `tag` compare equal regardless of their
    /// `representative_path`.
    #[must_use]
    pub fn synthetic(representative_path: PathBuf, tag: impl Into<String>) -> DeviceId {
        DeviceId { representative_path, inner: DeviceIdInner::Prefix(tag.into()) }
    }
}

impl PartialEq for DeviceId {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for DeviceId {}

impl std::hash::Hash for DeviceId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
enum DeviceIdInner {
    #[cfg(unix)]
    Unix(u64),
    Prefix(String),
}

/// Resolves `path` to an absolute, canonical form.
///
/// If `path` exists, the result comes from [`std::fs::canonicalize`] (which
/// also resolves symlinks; this crate does not special-case symlink targets,
/// matching the workspace's non-goal of symlink semantics). If `path` does
/// not exist, the path is absolutized against the current directory and
/// lexically collapsed (`.`/`..` components removed) without touching the
/// filesystem.
pub fn normalize(path: &Path) -> io::Result<PathBuf> {
    if path.exists() {
        return std::fs::canonicalize(path).map(strip_verbatim_prefix);
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    Ok(lexically_collapse(&absolute))
}

/// Returns `true` iff `child` is strictly under `root` (or, when
/// `same_is_under` is set, also when `child` equals `root`).
///
/// Both paths are normalized first; if either fails to normalize the
/// function returns `false` rather than propagating an error, mirroring the
/// defensive behaviour of the original implementation this crate replaces.
#[must_use]
pub fn is_under(root: &Path, child: &Path, same_is_under: bool) -> bool {
    let (Ok(root), Ok(child)) = (normalize(root), normalize(child)) else {
        return false;
    };

    if root == child {
        return same_is_under;
    }

    let mut root_components = root.components();
    let mut child_components = child.components();

    loop {
        match root_components.next() {
            Some(component) => {
                if child_components.next() != Some(component) {
                    return false;
                }
            }
            None => return child_components.next().is_some(),
        }
    }
}

/// Returns the device identifier for `path`, which must exist.
pub fn device_of(path: &Path) -> io::Result<DeviceId> {
    let representative_path = normalize(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let metadata = std::fs::metadata(&representative_path)?;
        return Ok(DeviceId {
            representative_path,
            inner: DeviceIdInner::Unix(metadata.dev()),
        });
    }

    #[cfg(not(unix))]
    {
        let prefix = drive_prefix(&representative_path).unwrap_or_default();
        Ok(DeviceId {
            representative_path,
            inner: DeviceIdInner::Prefix(prefix),
        })
    }
}

fn drive_prefix(path: &Path) -> Option<String> {
    match path.components().next() {
        Some(Component::Prefix(prefix)) => Some(prefix.as_os_str().to_string_lossy().into_owned()),
        _ => None,
    }
}

fn lexically_collapse(path: &Path) -> PathBuf {
    let mut collapsed = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                collapsed.pop();
            }
            other => collapsed.push(other.as_os_str()),
        }
    }
    collapsed
}

#[cfg(windows)]
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(s) if s.starts_with(r"\\?\") => PathBuf::from(&s[4..]),
        _ => path,
    }
}

#[cfg(not(windows))]
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn normalize_existing_dir_is_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let normalized = normalize(dir.path()).unwrap();
        assert!(normalized.is_absolute());
    }

    #[test]
    fn normalize_nonexistent_collapses_dotdot() {
        let dir = tempfile::tempdir().unwrap();
        let messy = dir.path().join("a").join("..").join("b");
        let normalized = normalize(&messy).unwrap();
        assert_eq!(normalized, dir.path().join("b"));
    }

    #[test]
    fn is_under_rejects_sibling_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let bc = dir.path().join("a-bc");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&bc).unwrap();
        assert!(!is_under(&a, &bc, false));
    }

    #[test]
    fn is_under_true_for_descendant() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        let child = root.join("child");
        fs::create_dir_all(&child).unwrap();
        assert!(is_under(&root, &child, false));
    }

    #[test]
    fn is_under_same_path_respects_flag() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_under(dir.path(), dir.path(), false));
        assert!(is_under(dir.path(), dir.path(), true));
    }

    #[test]
    fn device_of_same_dir_matches() {
        let dir = tempfile::tempdir().unwrap();
        let a = device_of(dir.path()).unwrap();
        let b = device_of(dir.path()).unwrap();
        assert_eq!(a, b);
    }
}
