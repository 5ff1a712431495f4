//! Folder-set materialization and tag application (spec §4.C).

use rules::{folder_condition_matches, FolderRule};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use vfs::FileSystem;

/// Builds the ordered, exclusion-filtered list of in-scope folders under
/// `root`.
///
/// With `rules = None`, every descendant folder is in scope. With rules
/// present, the **first** rule (in order) whose condition matches a folder
/// decides whether to emit it and whether to short-circuit further descent
/// into that subtree (spec §4.C step 3).
pub fn build_folder_set(
    root: &Path,
    rules: Option<&[FolderRule]>,
    exclude: &[PathBuf],
    fs: &dyn FileSystem,
) -> io::Result<Vec<PathBuf>> {
    let exclude_set: HashSet<&Path> = exclude.iter().map(PathBuf::as_path).collect();
    let mut out = Vec::new();

    match rules {
        None => {
            append(&mut out, &exclude_set, root);
            for descendant in fs.walk(root, true, false, true)? {
                append(&mut out, &exclude_set, &descendant);
            }
        }
        Some(rules) => evaluate(root, rules, &exclude_set, fs, &mut out)?,
    }

    Ok(out)
}

fn evaluate(
    path: &Path,
    rules: &[FolderRule],
    exclude: &HashSet<&Path>,
    fs: &dyn FileSystem,
    out: &mut Vec<PathBuf>,
) -> io::Result<()> {
    let matched = rules.iter().find(|rule| folder_condition_matches(&rule.condition, path));

    if let Some(rule) = matched {
        append(out, exclude, path);
        if rule.recurse {
            for descendant in fs.walk(path, true, false, true)? {
                append(out, exclude, &descendant);
            }
            return Ok(());
        }
    }

    for child in fs.walk(path, false, false, true)? {
        evaluate(&child, rules, exclude, fs, out)?;
    }

    Ok(())
}

fn append(out: &mut Vec<PathBuf>, exclude: &HashSet<&Path>, path: &Path) {
    if !exclude.contains(path) {
        out.push(path.to_path_buf());
    }
}

/// Applies `rules`' tags onto the already-materialized `folders` list.
///
/// A separate pass from [`build_folder_set`] because tags can come from
/// rules that never triggered folder selection (spec §4.C step 4).
#[must_use]
pub fn apply_folder_tags(folders: &[PathBuf], rules: &[FolderRule]) -> HashMap<PathBuf, HashSet<String>> {
    let mut tags: HashMap<PathBuf, HashSet<String>> = HashMap::new();

    for rule in rules {
        let Some(tag) = &rule.tag else { continue };
        let mut i = 0;
        while i < folders.len() {
            let path = &folders[i];
            if !folder_condition_matches(&rule.condition, path) {
                i += 1;
                continue;
            }

            if rule.recurse {
                for candidate in folders {
                    if candidate == path || path_util::is_under(path, candidate, false) {
                        tags.entry(candidate.clone()).or_default().insert(tag.clone());
                    }
                }
                let mut j = i + 1;
                while j < folders.len() && (folders[j] == *path || path_util::is_under(path, &folders[j], false)) {
                    j += 1;
                }
                i = j;
            } else {
                tags.entry(path.clone()).or_default().insert(tag.clone());
                i += 1;
            }
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules::parse_folder_rule;
    use vfs::memory::MemoryFileSystem;

    fn fs_with_tree() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_dir("/root/src")
            .with_dir("/root/src/keep")
            .with_dir("/root/src/build")
            .with_dir("/root/src/build/obj")
            .with_dir("/root/src/nested/build")
    }

    #[test]
    fn no_rules_emits_root_and_every_descendant() {
        let fs = fs_with_tree();
        let folders = build_folder_set(Path::new("/root/src"), None, &[], &fs).unwrap();
        assert!(folders.contains(&PathBuf::from("/root/src")));
        assert!(folders.contains(&PathBuf::from("/root/src/build/obj")));
        assert!(folders.contains(&PathBuf::from("/root/src/nested")));
        assert_eq!(folders.len(), 6);
    }

    #[test]
    fn recurse_rule_excludes_whole_subtree_from_further_evaluation() {
        let fs = fs_with_tree();
        let rule = parse_folder_rule("build|RECURSE", Path::new("/root/src"), &fs).unwrap();
        let folders = build_folder_set(Path::new("/root/src"), Some(&[rule]), &[], &fs).unwrap();
        assert!(folders.contains(&PathBuf::from("/root/src/build")));
        assert!(folders.contains(&PathBuf::from("/root/src/build/obj")));
        assert!(!folders.contains(&PathBuf::from("/root/src/nested/build")));
    }

    #[test]
    fn exclusion_list_filters_matched_folders() {
        let fs = fs_with_tree();
        let exclude = vec![PathBuf::from("/root/src/keep")];
        let folders = build_folder_set(Path::new("/root/src"), None, &exclude, &fs).unwrap();
        assert!(!folders.contains(&PathBuf::from("/root/src/keep")));
    }

    #[test]
    fn recurse_tag_propagates_to_descendants_and_skips_ahead() {
        let fs = fs_with_tree();
        let folders = build_folder_set(Path::new("/root/src"), None, &[], &fs).unwrap();
        let rule = parse_folder_rule("build|RECURSE|TAG=private", Path::new("/root/src"), &fs).unwrap();
        let tags = apply_folder_tags(&folders, &[rule]);
        assert!(tags[&PathBuf::from("/root/src/build")].contains("PRIVATE"));
        assert!(tags[&PathBuf::from("/root/src/build/obj")].contains("PRIVATE"));
        assert!(!tags.contains_key(&PathBuf::from("/root/src/nested/build")));
    }
}
