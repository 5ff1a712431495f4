//! Real filesystem implementation backed by `std::fs` and `fs2`.

use crate::FileSystem;
use path_util::DeviceId;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// [`FileSystem`] implementation that performs real I/O via `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn walk(&self, path: &Path, recurse: bool, files: bool, folders: bool) -> io::Result<Vec<PathBuf>> {
        let mut results = Vec::new();
        walk_into(path, recurse, files, folders, &mut results)?;
        results.sort();
        Ok(results)
    }

    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()> {
        fs::copy(src, dst)?;
        Ok(())
    }

    fn rename(&self, src: &Path, dst: &Path) -> io::Result<()> {
        fs::rename(src, dst)
    }

    fn remove_empty_dirs(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        remove_empty_dirs_into(root, &mut removed)?;
        Ok(removed)
    }

    fn free_bytes(&self, device: &DeviceId) -> io::Result<u64> {
        fs2::free_space(device.representative_path())
    }

    fn device_of(&self, path: &Path) -> io::Result<DeviceId> {
        path_util::device_of(path)
    }
}

fn walk_into(path: &Path, recurse: bool, files: bool, folders: bool, out: &mut Vec<PathBuf>) -> io::Result<()> {
    if !path.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        let is_dir = entry_path.is_dir();

        if is_dir {
            if folders {
                out.push(entry_path.clone());
            }
            if recurse {
                walk_into(&entry_path, recurse, files, folders, out)?;
            }
        } else if files {
            out.push(entry_path);
        }
    }

    Ok(())
}

/// Removes every folder under `root` that contains no files anywhere in its
/// subtree, deepest first. Returns the paths removed.
fn remove_empty_dirs_into(path: &Path, removed: &mut Vec<PathBuf>) -> io::Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }

    let mut is_empty = true;
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            subdirs.push(entry_path);
        } else {
            is_empty = false;
        }
    }

    for subdir in subdirs {
        let child_removed = remove_empty_dirs_into(&subdir, removed)?;
        if !child_removed {
            is_empty = false;
        }
    }

    if is_empty {
        fs::remove_dir(path)?;
        removed.push(path.to_path_buf());
    }

    Ok(is_empty)
}
