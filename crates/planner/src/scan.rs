//! Scan planner: turns a [`Job`] into a [`Plan`] (spec §4.F).

use crate::error::PlannerError;
use crate::file_set::scan_folder_files;
use crate::folder_set::{apply_folder_tags, build_folder_set};
use crate::hierarchy::{assign_targets, compute_hierarchy};
use crate::job::{Job, Mode, SourceRootConfig};
use crate::plan::{Classification, FileEntry, Plan, RemoveEntry, ScanFolder, SkipEntry, SourceRoot};
use logging::{Level, Logger};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use vfs::FileSystem;

/// Runs the full scan sequence and returns the resulting [`Plan`].
///
/// Each stage completes before the next begins (spec §5): validation,
/// hierarchy/target assignment, per-root folder and file scans,
/// classification, and (mode-dependent) the SKIP and REMOVE collections.
pub fn build_plan(job: &Job, fs: &dyn FileSystem, logger: &dyn Logger) -> Result<Plan, PlannerError> {
    validate_job(job, fs)?;

    let mut roots = build_source_roots(&job.source_roots, fs)?;
    compute_hierarchy(&mut roots);
    assign_targets(&mut roots, job.target_path.as_deref())?;

    let mut global_exclusions: Vec<PathBuf> = Vec::new();
    if let Some(target) = &job.target_path {
        global_exclusions.push(target.clone());
    }
    if let Some(clean) = &job.clean_path {
        global_exclusions.push(clean.clone());
    }

    for i in 0..roots.len() {
        let folders = scan_root_folders(&roots, i, job, &global_exclusions, fs, logger)?;
        roots[i].scan_folders = folders;
    }

    for root in &mut roots {
        scan_root_files(root, job, fs, logger)?;
    }

    classify(&mut roots, fs);

    let skip_files = if job.log_skipped {
        collect_skips(&roots, job, fs)?
    } else {
        Vec::new()
    };

    let remove_files = if job.mode.wants_remove_scan() {
        collect_removes(&roots, job, fs)?
    } else {
        Vec::new()
    };

    Ok(Plan { roots, skip_files, remove_files })
}

/// Validates `job` before any scan begins (spec §5, §8 testable property 6).
///
/// The cross-device check only runs when both `target_path` and
/// `clean_path` already exist on the filesystem; neither may exist yet on a
/// first-ever run, and there is nothing to compare in that case.
fn validate_job(job: &Job, fs: &dyn FileSystem) -> Result<(), PlannerError> {
    if job.source_roots.is_empty() {
        return Err(PlannerError::NoSourceRoots);
    }
    if !matches!(job.mode, Mode::Review) && job.target_path.is_none() {
        return Err(PlannerError::MissingTargetPath(job.mode));
    }
    if job.mode.applies_changes() && job.clean_path.is_none() {
        return Err(PlannerError::MissingCleanPath(job.mode));
    }
    if let (Some(target), Some(clean)) = (&job.target_path, &job.clean_path) {
        if fs.exists(target) && fs.exists(clean) {
            let target_device = fs.device_of(target)?;
            let clean_device = fs.device_of(clean)?;
            if target_device != clean_device {
                return Err(PlannerError::CrossDeviceClean { target: target.clone(), clean: clean.clone() });
            }
        }
    }
    Ok(())
}

fn build_source_roots(configs: &[SourceRootConfig], fs: &dyn FileSystem) -> Result<Vec<SourceRoot>, PlannerError> {
    let mut roots = Vec::with_capacity(configs.len());
    let mut seen_ids = HashSet::new();

    for config in configs {
        if !seen_ids.insert(config.id.clone()) {
            return Err(PlannerError::DuplicateRootId(config.id.clone()));
        }
        if !fs.is_dir(&config.path) {
            return Err(PlannerError::RootNotFound(config.path.clone()));
        }
        let path = path_util::normalize(&config.path)?;

        roots.push(SourceRoot {
            id: config.id.clone(),
            path,
            exclude_folder_rules: config.exclude_folder_rules.clone(),
            folder_tag_rules: config.folder_tag_rules.clone(),
            include_file_rules: config.include_file_rules.clone(),
            exclude_file_rules: config.exclude_file_rules.clone(),
            default_file_polarity: config.default_file_polarity,
            parent: None,
            children: Vec::new(),
            target_path: None,
            scan_folders: Vec::new(),
        });
    }

    Ok(roots)
}

fn scan_root_folders(
    roots: &[SourceRoot],
    index: usize,
    job: &Job,
    global_exclusions: &[PathBuf],
    fs: &dyn FileSystem,
    logger: &dyn Logger,
) -> Result<Vec<ScanFolder>, PlannerError> {
    let root = &roots[index];
    let mut exclusion_list: Vec<PathBuf> = global_exclusions.to_vec();

    for &child_idx in &root.children {
        let child_path = roots[child_idx].path.clone();
        exclusion_list.push(child_path.clone());
        exclusion_list.extend(fs.walk(&child_path, true, false, true)?);
    }

    if !job.global_exclude_rules.is_empty() {
        let parsed = rules::parse_folder_rules(&job.global_exclude_rules, &root.path, fs, |warning| {
            logger.log(Level::Warning, warning);
        });
        let excluded = build_folder_set(&root.path, Some(&parsed), &exclusion_list, fs)?;
        exclusion_list.extend(excluded);
    }

    if !root.exclude_folder_rules.is_empty() {
        let parsed = rules::parse_folder_rules(&root.exclude_folder_rules, &root.path, fs, |warning| {
            logger.log(Level::Warning, warning);
        });
        let excluded = build_folder_set(&root.path, Some(&parsed), &exclusion_list, fs)?;
        exclusion_list.extend(excluded);
    }

    let folders = build_folder_set(&root.path, None, &exclusion_list, fs)?;
    let tag_rules = rules::parse_folder_rules(&root.folder_tag_rules, &root.path, fs, |warning| {
        logger.log(Level::Warning, warning);
    });
    let mut tags = apply_folder_tags(&folders, &tag_rules);

    Ok(folders
        .into_iter()
        .map(|path| {
            let target_path = root.target_path.as_ref().map(|target_root| {
                let relative = path.strip_prefix(&root.path).unwrap_or_else(|_| Path::new(""));
                target_root.join(relative)
            });
            let folder_tags = tags.remove(&path).unwrap_or_default();
            ScanFolder { path, target_path, tags: folder_tags, files: Vec::new() }
        })
        .collect())
}

fn scan_root_files(root: &mut SourceRoot, job: &Job, fs: &dyn FileSystem, logger: &dyn Logger) -> Result<(), PlannerError> {
    let _ = job;
    let include_rules = rules::parse_file_rules(&root.include_file_rules, |warning| {
        logger.log(Level::Warning, warning);
    });
    let exclude_rules = rules::parse_file_rules(&root.exclude_file_rules, |warning| {
        logger.log(Level::Warning, warning);
    });

    for folder in &mut root.scan_folders {
        let kept = scan_folder_files(
            &folder.path,
            &folder.tags,
            &include_rules,
            &exclude_rules,
            root.default_file_polarity,
            fs,
        )?;
        folder.files = kept
            .into_iter()
            .map(|(name, size)| FileEntry { name, size, classification: Classification::Same, target_dir: None })
            .collect();
    }

    Ok(())
}

/// Compares each scanned file against its target counterpart (spec §4.F
/// step 6): NEW if absent, SAME if sizes match, MOD otherwise. A folder with
/// no computed target (pure REVIEW without a target directory) treats every
/// file as NEW, since there is nothing to compare against.
fn classify(roots: &mut [SourceRoot], fs: &dyn FileSystem) {
    for root in roots.iter_mut() {
        for folder in &mut root.scan_folders {
            for entry in &mut folder.files {
                entry.classification = match &folder.target_path {
                    None => Classification::New,
                    Some(target_dir) => {
                        let target_file = target_dir.join(&entry.name);
                        if !fs.is_file(&target_file) {
                            Classification::New
                        } else {
                            match fs.size(&target_file) {
                                Ok(target_size) if target_size == entry.size => Classification::Same,
                                Ok(_) => Classification::Mod,
                                Err(_) => Classification::New,
                            }
                        }
                    }
                };
            }
        }
    }
}

fn collect_skips(roots: &[SourceRoot], job: &Job, fs: &dyn FileSystem) -> Result<Vec<SkipEntry>, PlannerError> {
    let mut present: HashSet<(PathBuf, String)> = HashSet::new();
    for root in roots {
        for folder in &root.scan_folders {
            for file in &folder.files {
                present.insert((folder.path.clone(), file.name.clone()));
            }
        }
    }

    let mut skips = Vec::new();
    for root in roots {
        if root.parent.is_some() {
            continue;
        }
        for file_path in fs.walk(&root.path, true, true, false)? {
            if under_excluded_area(&file_path, job) {
                continue;
            }
            let folder = file_path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
            let name = file_path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_owned();
            if present.contains(&(folder.clone(), name.clone())) {
                continue;
            }
            let size = fs.size(&file_path).unwrap_or(0);
            skips.push(SkipEntry { root_id: root.id.clone(), folder, name, size });
        }
    }

    Ok(skips)
}

fn collect_removes(roots: &[SourceRoot], job: &Job, fs: &dyn FileSystem) -> Result<Vec<RemoveEntry>, PlannerError> {
    let mut present: HashMap<(PathBuf, String), ()> = HashMap::new();
    for root in roots {
        for folder in &root.scan_folders {
            let Some(target_dir) = &folder.target_path else { continue };
            for file in &folder.files {
                present.insert((target_dir.clone(), file.name.clone()), ());
            }
        }
    }

    let mut removes = Vec::new();
    for root in roots {
        if root.parent.is_some() {
            continue;
        }
        let Some(target_root) = &root.target_path else { continue };
        if !fs.is_dir(target_root) {
            continue;
        }
        for file_path in fs.walk(target_root, true, true, false)? {
            if let Some(clean) = &job.clean_path {
                if path_util::is_under(clean, &file_path, true) {
                    continue;
                }
            }
            let folder = file_path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
            let name = file_path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_owned();
            if present.contains_key(&(folder.clone(), name.clone())) {
                continue;
            }
            let size = fs.size(&file_path).unwrap_or(0);
            removes.push(RemoveEntry {
                root_id: root.id.clone(),
                folder,
                name,
                size,
                classification: Classification::Remove,
                target_dir: None,
            });
        }
    }

    Ok(removes)
}

fn under_excluded_area(path: &Path, job: &Job) -> bool {
    if let Some(target) = &job.target_path {
        if path_util::is_under(target, path, true) {
            return true;
        }
    }
    if let Some(clean) = &job.clean_path {
        if path_util::is_under(clean, path, true) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::FilePolarity;
    use logging::NullLogger;
    use vfs::memory::MemoryFileSystem;

    fn source_root(id: &str, path: &str) -> SourceRootConfig {
        SourceRootConfig {
            id: id.to_owned(),
            path: PathBuf::from(path),
            exclude_folder_rules: Vec::new(),
            folder_tag_rules: Vec::new(),
            include_file_rules: Vec::new(),
            exclude_file_rules: Vec::new(),
            default_file_polarity: FilePolarity::Include,
        }
    }

    #[test]
    fn review_without_target_classifies_every_file_new() {
        let fs = MemoryFileSystem::new()
            .with_dir("/src")
            .with_file("/src/a.txt", 1)
            .with_file("/src/b.txt", 2);
        let job = Job {
            mode: Mode::Review,
            target_path: None,
            clean_path: None,
            source_roots: vec![source_root("main", "/src")],
            global_exclude_rules: Vec::new(),
            log_skipped: false,
            move_detection_enabled: false,
            csv_output_path: None,
        };

        let plan = build_plan(&job, &fs, &NullLogger).unwrap();
        let files = &plan.roots[0].scan_folders[0].files;
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.classification == Classification::New));
    }

    #[test]
    fn review_with_target_classifies_same_and_mod() {
        let fs = MemoryFileSystem::new()
            .with_dir("/src")
            .with_file("/src/a.txt", 10)
            .with_file("/src/b.txt", 10)
            .with_dir("/dst")
            .with_file("/dst/a.txt", 10)
            .with_file("/dst/b.txt", 99);
        let job = Job {
            mode: Mode::Review,
            target_path: Some(PathBuf::from("/dst")),
            clean_path: None,
            source_roots: vec![source_root("main", "/src")],
            global_exclude_rules: Vec::new(),
            log_skipped: false,
            move_detection_enabled: false,
            csv_output_path: None,
        };

        let plan = build_plan(&job, &fs, &NullLogger).unwrap();
        let files = &plan.roots[0].scan_folders[0].files;
        let a = files.iter().find(|f| f.name == "a.txt").unwrap();
        let b = files.iter().find(|f| f.name == "b.txt").unwrap();
        assert_eq!(a.classification, Classification::Same);
        assert_eq!(b.classification, Classification::Mod);
    }

    #[test]
    fn sync_mode_collects_target_only_files_as_remove() {
        let fs = MemoryFileSystem::new()
            .with_dir("/src")
            .with_file("/src/a.txt", 1)
            .with_dir("/dst")
            .with_file("/dst/a.txt", 1)
            .with_file("/dst/stale.txt", 5)
            .with_dir("/clean");
        let job = Job {
            mode: Mode::Sync,
            target_path: Some(PathBuf::from("/dst")),
            clean_path: Some(PathBuf::from("/clean")),
            source_roots: vec![source_root("main", "/src")],
            global_exclude_rules: Vec::new(),
            log_skipped: false,
            move_detection_enabled: false,
            csv_output_path: None,
        };

        let plan = build_plan(&job, &fs, &NullLogger).unwrap();
        assert_eq!(plan.remove_files.len(), 1);
        assert_eq!(plan.remove_files[0].name, "stale.txt");
    }

    #[test]
    fn log_skipped_reports_excluded_files() {
        let fs = MemoryFileSystem::new().with_dir("/src").with_file("/src/a.txt", 1).with_file("/src/a.tmp", 2);
        let mut root = source_root("main", "/src");
        root.exclude_file_rules = vec!["*.tmp".to_owned()];
        let job = Job {
            mode: Mode::Review,
            target_path: None,
            clean_path: None,
            source_roots: vec![root],
            global_exclude_rules: Vec::new(),
            log_skipped: true,
            move_detection_enabled: false,
            csv_output_path: None,
        };

        let plan = build_plan(&job, &fs, &NullLogger).unwrap();
        assert_eq!(plan.skip_files.len(), 1);
        assert_eq!(plan.skip_files[0].name, "a.tmp");
    }

    #[test]
    fn existing_target_and_clean_on_the_same_device_validate() {
        let fs = MemoryFileSystem::new().with_dir("/src").with_dir("/dst").with_dir("/clean");
        let job = Job {
            mode: Mode::Review,
            target_path: Some(PathBuf::from("/dst")),
            clean_path: Some(PathBuf::from("/clean")),
            source_roots: vec![source_root("main", "/src")],
            global_exclude_rules: Vec::new(),
            log_skipped: false,
            move_detection_enabled: false,
            csv_output_path: None,
        };

        assert!(build_plan(&job, &fs, &NullLogger).is_ok());
    }

    #[test]
    fn missing_clean_path_for_sync_is_a_configuration_error() {
        let fs = MemoryFileSystem::new().with_dir("/src");
        let job = Job {
            mode: Mode::Sync,
            target_path: Some(PathBuf::from("/dst")),
            clean_path: None,
            source_roots: vec![source_root("main", "/src")],
            global_exclude_rules: Vec::new(),
            log_skipped: false,
            move_detection_enabled: false,
            csv_output_path: None,
        };

        let err = build_plan(&job, &fs, &NullLogger);
        assert!(matches!(err, Err(PlannerError::MissingCleanPath(Mode::Sync))));
    }

    #[test]
    fn missing_target_path_for_backup_is_a_configuration_error() {
        let fs = MemoryFileSystem::new().with_dir("/src");
        let job = Job {
            mode: Mode::Backup,
            target_path: None,
            clean_path: Some(PathBuf::from("/clean")),
            source_roots: vec![source_root("main", "/src")],
            global_exclude_rules: Vec::new(),
            log_skipped: false,
            move_detection_enabled: false,
            csv_output_path: None,
        };

        let err = build_plan(&job, &fs, &NullLogger);
        assert!(matches!(err, Err(PlannerError::MissingTargetPath(Mode::Backup))));
    }
}
