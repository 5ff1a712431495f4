//! Apply engine: executes a classified [`Plan`] against the filesystem
//! (spec §4.H). Only meaningful in BACKUP/SYNC; REVIEW/SYNCREVIEW stop at
//! the plan and never call this module.

use crate::error::ApplyError;
use logging::{Level, Logger};
use planner::{Classification, FileEntry, Plan};
use std::path::{Path, PathBuf};
use vfs::FileSystem;

/// Summary counters returned after a successful apply.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ApplyOutcome {
    /// Number of NEW/MOD files copied.
    pub copied: usize,
    /// Number of files relocated by a MOVE.
    pub moved: usize,
    /// Number of files quarantined via REMOVE.
    pub removed: usize,
    /// Number of empty target folders pruned.
    pub pruned_folders: usize,
}

/// Applies `plan` to the filesystem.
///
/// Pre-checks (spec §4.H): the total NEW/MOD byte count must not exceed 95%
/// of the target device's free space, and `clean_path` must be configured
/// whenever the plan contains a MOD or REMOVE entry. Execution is strictly
/// ordered: copies (with quarantine-before-overwrite for MOD) first, then
/// MOVE/REMOVE entries, then empty-folder pruning. `on_progress` is called
/// with the cumulative percentage of `total_bytes` transferred, at each 20%
/// step crossed.
pub fn apply_plan(
    plan: &Plan,
    target_path: &Path,
    clean_path: Option<&Path>,
    fs: &dyn FileSystem,
    logger: &dyn Logger,
    mut on_progress: impl FnMut(u8),
) -> Result<ApplyOutcome, ApplyError> {
    let needs_clean = plan
        .roots
        .iter()
        .flat_map(|root| &root.scan_folders)
        .flat_map(|folder| &folder.files)
        .any(|entry| entry.classification == Classification::Mod)
        || plan.remove_files.iter().any(|entry| entry.classification == Classification::Remove);
    if needs_clean && clean_path.is_none() {
        return Err(ApplyError::MissingCleanPath);
    }

    let total_bytes: u64 = plan
        .roots
        .iter()
        .flat_map(|root| &root.scan_folders)
        .flat_map(|folder| &folder.files)
        .filter(|entry| matches!(entry.classification, Classification::New | Classification::Mod))
        .map(|entry| entry.size)
        .sum();

    if total_bytes > 0 {
        let device = fs.device_of(target_path)?;
        let free = fs.free_bytes(&device)?;
        if (total_bytes as f64) > (free as f64) * 0.95 {
            return Err(ApplyError::InsufficientSpace { needed: total_bytes, free });
        }
    }

    let mut outcome = ApplyOutcome::default();
    let mut transferred = 0u64;
    let mut progress_next = 20u8;

    for root in &plan.roots {
        for folder in &root.scan_folders {
            let Some(target_dir) = &folder.target_path else { continue };
            for entry in &folder.files {
                match entry.classification {
                    Classification::Mod => {
                        let clean = clean_path.expect("checked by the needs_clean guard above");
                        quarantine_file(target_dir, &entry.name, target_path, clean, fs)?;
                        copy_new_or_mod(&folder.path, target_dir, entry, fs, logger)?;
                    }
                    Classification::New => {
                        copy_new_or_mod(&folder.path, target_dir, entry, fs, logger)?;
                    }
                    _ => continue,
                }

                outcome.copied += 1;
                transferred += entry.size;
                if total_bytes > 0 {
                    let percent = ((transferred.saturating_mul(100)) / total_bytes) as u8;
                    while percent >= progress_next && progress_next <= 100 {
                        on_progress(progress_next);
                        progress_next += 20;
                    }
                }
            }
        }
    }

    for entry in &plan.remove_files {
        match entry.classification {
            Classification::Move => {
                let destination_dir = entry.target_dir.as_ref().expect("MOVE entries always carry a target_dir");
                fs.ensure_dir(destination_dir)
                    .map_err(|source| ApplyError::CreateFolder(destination_dir.clone(), source))?;
                let source_file = entry.folder.join(&entry.name);
                let destination_file = destination_dir.join(&entry.name);
                fs.rename(&source_file, &destination_file)
                    .map_err(|source| ApplyError::Rename(source_file, destination_file, source))?;
                logger.log(Level::Details, &format!("moved misplaced file into {}", destination_dir.display()));
                outcome.moved += 1;
            }
            Classification::Remove => {
                let clean = clean_path.expect("checked by the needs_clean guard above");
                quarantine_file(&entry.folder, &entry.name, target_path, clean, fs)?;
                outcome.removed += 1;
            }
            _ => continue,
        }
    }

    for root in &plan.roots {
        let Some(root_target) = &root.target_path else { continue };
        if !fs.is_dir(root_target) {
            continue;
        }
        let pruned = fs.remove_empty_dirs(root_target)?;
        for folder in &pruned {
            logger.log(Level::Details, &format!("destroyed empty folder: {}", folder.display()));
        }
        outcome.pruned_folders += pruned.len();
    }

    Ok(outcome)
}

fn copy_new_or_mod(
    source_folder: &Path,
    target_dir: &Path,
    entry: &FileEntry,
    fs: &dyn FileSystem,
    logger: &dyn Logger,
) -> Result<(), ApplyError> {
    fs.ensure_dir(target_dir).map_err(|source| ApplyError::CreateFolder(target_dir.to_path_buf(), source))?;
    let source_file = source_folder.join(&entry.name);
    let target_file = target_dir.join(&entry.name);
    logger.log(Level::Details, &format!("copying source file: {}", source_file.display()));
    copy_with_retries(&source_file, &target_file, fs)
}

/// Copies `src` to `dst`, retrying up to 9 times on failure (spec §4.H).
fn copy_with_retries(src: &Path, dst: &Path, fs: &dyn FileSystem) -> Result<(), ApplyError> {
    let mut last_error = None;
    for _ in 0..9 {
        match fs.copy_file(src, dst) {
            Ok(()) => return Ok(()),
            Err(error) => last_error = Some(error),
        }
    }
    Err(ApplyError::CopyExhausted(src.to_path_buf(), last_error.expect("the loop above always runs at least once")))
}

/// Relocates a MOD/REMOVE target file into the quarantine area (`clean_file`
/// in the source this crate generalizes), resolving name collisions with a
/// `-NNN` suffix inserted before the extension.
fn quarantine_file(
    target_dir: &Path,
    name: &str,
    target_path: &Path,
    clean_path: &Path,
    fs: &dyn FileSystem,
) -> Result<PathBuf, ApplyError> {
    let relative = target_dir.strip_prefix(target_path).unwrap_or_else(|_| Path::new(""));
    let clean_dir = clean_path.join(relative);
    fs.ensure_dir(&clean_dir).map_err(|source| ApplyError::CreateFolder(clean_dir.clone(), source))?;

    let mut destination = clean_dir.join(name);
    if fs.exists(&destination) {
        let stem = Path::new(name).file_stem().and_then(|s| s.to_str()).unwrap_or(name);
        let extension = Path::new(name).extension().and_then(|s| s.to_str());
        let mut index = 0u32;
        loop {
            index += 1;
            let candidate_name = match extension {
                Some(extension) => format!("{stem}-{index:03}.{extension}"),
                None => format!("{stem}-{index:03}"),
            };
            let candidate = clean_dir.join(candidate_name);
            if !fs.exists(&candidate) {
                destination = candidate;
                break;
            }
        }
    }

    let source_file = target_dir.join(name);
    fs.rename(&source_file, &destination)
        .map_err(|source| ApplyError::Quarantine(source_file.clone(), source))?;
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logging::NullLogger;
    use planner::{FilePolarity, RemoveEntry, ScanFolder, SourceRoot};
    use std::collections::HashSet;
    use vfs::memory::MemoryFileSystem;

    fn root_with_new_file(name: &str, size: u64) -> SourceRoot {
        SourceRoot {
            id: "main".to_owned(),
            path: PathBuf::from("/src"),
            exclude_folder_rules: Vec::new(),
            folder_tag_rules: Vec::new(),
            include_file_rules: Vec::new(),
            exclude_file_rules: Vec::new(),
            default_file_polarity: FilePolarity::Include,
            parent: None,
            children: Vec::new(),
            target_path: Some(PathBuf::from("/dst")),
            scan_folders: vec![ScanFolder {
                path: PathBuf::from("/src"),
                target_path: Some(PathBuf::from("/dst")),
                tags: HashSet::new(),
                files: vec![FileEntry { name: name.to_owned(), size, classification: Classification::New, target_dir: None }],
            }],
        }
    }

    #[test]
    fn copies_new_file_into_target() {
        let fs = MemoryFileSystem::new().with_dir("/src").with_file("/src/a.txt", 10).with_dir("/dst");
        let plan = Plan { roots: vec![root_with_new_file("a.txt", 10)], skip_files: Vec::new(), remove_files: Vec::new() };

        let outcome =
            apply_plan(&plan, Path::new("/dst"), Some(Path::new("/clean")), &fs, &NullLogger, |_| {}).unwrap();

        assert_eq!(outcome.copied, 1);
        assert!(fs.is_file(Path::new("/dst/a.txt")));
    }

    #[test]
    fn mod_without_clean_path_is_an_error() {
        let fs = MemoryFileSystem::new().with_dir("/src").with_file("/src/a.txt", 10).with_dir("/dst").with_file("/dst/a.txt", 1);
        let mut root = root_with_new_file("a.txt", 10);
        root.scan_folders[0].files[0].classification = Classification::Mod;
        let plan = Plan { roots: vec![root], skip_files: Vec::new(), remove_files: Vec::new() };

        let result = apply_plan(&plan, Path::new("/dst"), None, &fs, &NullLogger, |_| {});
        assert!(matches!(result, Err(ApplyError::MissingCleanPath)));
    }

    #[test]
    fn remove_entry_is_quarantined_with_collision_suffix() {
        let fs = MemoryFileSystem::new()
            .with_dir("/dst")
            .with_file("/dst/black_cat.jpg", 4)
            .with_dir("/clean")
            .with_file("/clean/black_cat.jpg", 4);
        let plan = Plan {
            roots: Vec::new(),
            skip_files: Vec::new(),
            remove_files: vec![RemoveEntry {
                root_id: "main".to_owned(),
                folder: PathBuf::from("/dst"),
                name: "black_cat.jpg".to_owned(),
                size: 4,
                classification: Classification::Remove,
                target_dir: None,
            }],
        };

        let outcome =
            apply_plan(&plan, Path::new("/dst"), Some(Path::new("/clean")), &fs, &NullLogger, |_| {}).unwrap();

        assert_eq!(outcome.removed, 1);
        assert!(fs.is_file(Path::new("/clean/black_cat-001.jpg")));
        assert!(fs.is_file(Path::new("/clean/black_cat.jpg")));
    }

    #[test]
    fn move_entry_renames_without_touching_quarantine() {
        let fs = MemoryFileSystem::new().with_dir("/dst").with_file("/dst/heart.jpg", 9).with_dir("/dst/items");
        let plan = Plan {
            roots: Vec::new(),
            skip_files: Vec::new(),
            remove_files: vec![RemoveEntry {
                root_id: "main".to_owned(),
                folder: PathBuf::from("/dst"),
                name: "heart.jpg".to_owned(),
                size: 9,
                classification: Classification::Move,
                target_dir: Some(PathBuf::from("/dst/items")),
            }],
        };

        let outcome = apply_plan(&plan, Path::new("/dst"), None, &fs, &NullLogger, |_| {}).unwrap();

        assert_eq!(outcome.moved, 1);
        assert!(fs.is_file(Path::new("/dst/items/heart.jpg")));
        assert!(!fs.is_file(Path::new("/dst/heart.jpg")));
    }

    #[test]
    fn insufficient_capacity_aborts_before_any_copy() {
        let fs = MemoryFileSystem::new().with_dir("/src").with_file("/src/big.bin", 1_000).with_dir("/dst");
        fs.set_free_bytes(10);
        let plan = Plan { roots: vec![root_with_new_file("big.bin", 1_000)], skip_files: Vec::new(), remove_files: Vec::new() };

        let result = apply_plan(&plan, Path::new("/dst"), Some(Path::new("/clean")), &fs, &NullLogger, |_| {});
        assert!(matches!(result, Err(ApplyError::InsufficientSpace { .. })));
        assert!(!fs.is_file(Path::new("/dst/big.bin")));
    }
}
