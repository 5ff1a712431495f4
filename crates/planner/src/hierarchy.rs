//! Source-root hierarchy and target mapping (spec §4.E).
//!
//! The parent/child graph among source roots is a forest: store children as
//! an index set on each root and the parent as an index reference, per the
//! workspace's design note, rather than shared-owning references.

use crate::error::PlannerError;
use crate::plan::SourceRoot;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Recomputes every root's `parent`/`children` fields.
///
/// A root's parent is the *nearest* other root that strictly contains it:
/// among every root whose path is an ancestor of this one, the parent is
/// whichever of those ancestors is itself nested the deepest.
pub fn compute_hierarchy(roots: &mut [SourceRoot]) {
    let paths: Vec<PathBuf> = roots.iter().map(|r| r.path.clone()).collect();

    let mut parents = vec![None; roots.len()];
    for i in 0..roots.len() {
        let mut nearest: Option<usize> = None;
        for j in 0..roots.len() {
            if i == j {
                continue;
            }
            if !path_util::is_under(&paths[j], &paths[i], false) {
                continue;
            }
            nearest = match nearest {
                None => Some(j),
                Some(current) if path_util::is_under(&paths[current], &paths[j], false) => Some(j),
                Some(current) => Some(current),
            };
        }
        parents[i] = nearest;
    }

    for root in roots.iter_mut() {
        root.children.clear();
    }
    for (i, parent) in parents.iter().enumerate() {
        roots[i].parent = *parent;
        if let Some(p) = parent {
            roots[*p].children.push(i);
        }
    }
}

/// Assigns each root's `target_path`, per spec §4.E.
///
/// No-op when the job carries no target (pure REVIEW without a target
/// directory configured). Returns a configuration error if two top roots
/// would collide on the same target directory (spec §9 open question,
/// resolved here rather than left silently undetected).
pub fn assign_targets(roots: &mut [SourceRoot], target_path: Option<&Path>) -> Result<(), PlannerError> {
    let Some(target_path) = target_path else {
        return Ok(());
    };

    let top_indices: Vec<usize> = (0..roots.len()).filter(|&i| roots[i].parent.is_none()).collect();
    let top_count = top_indices.len();

    for &i in &top_indices {
        roots[i].target_path = Some(if top_count == 1 {
            target_path.to_path_buf()
        } else {
            target_path.join(basename(&roots[i].path))
        });
    }

    for i in 0..roots.len() {
        if roots[i].parent.is_none() {
            continue;
        }
        let mut ancestor = i;
        while let Some(p) = roots[ancestor].parent {
            ancestor = p;
        }
        let ancestor_target = roots[ancestor]
            .target_path
            .clone()
            .expect("top roots are assigned a target before their descendants");
        let relative = roots[i]
            .path
            .strip_prefix(&roots[ancestor].path)
            .unwrap_or_else(|_| Path::new(""));
        roots[i].target_path = Some(ancestor_target.join(relative));
    }

    let mut seen = HashSet::new();
    for &i in &top_indices {
        let target = roots[i].target_path.clone().expect("just assigned above");
        if !seen.insert(target.clone()) {
            return Err(PlannerError::CollidingTargets(target));
        }
    }

    Ok(())
}

fn basename(path: &Path) -> PathBuf {
    path.file_name().map(PathBuf::from).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::FilePolarity;

    fn root(id: &str, path: &str) -> SourceRoot {
        SourceRoot {
            id: id.to_owned(),
            path: PathBuf::from(path),
            exclude_folder_rules: Vec::new(),
            folder_tag_rules: Vec::new(),
            include_file_rules: Vec::new(),
            exclude_file_rules: Vec::new(),
            default_file_polarity: FilePolarity::Include,
            parent: None,
            children: Vec::new(),
            target_path: None,
            scan_folders: Vec::new(),
        }
    }

    #[test]
    fn nested_root_gets_nearest_parent() {
        let mut roots = vec![root("a", "/src/a"), root("b", "/src/a/b"), root("c", "/src/a/b/c")];
        compute_hierarchy(&mut roots);
        assert_eq!(roots[0].parent, None);
        assert_eq!(roots[1].parent, Some(0));
        assert_eq!(roots[2].parent, Some(1));
        assert_eq!(roots[0].children, vec![1]);
        assert_eq!(roots[1].children, vec![2]);
    }

    #[test]
    fn single_top_root_targets_t_directly() {
        let mut roots = vec![root("a", "/src/a")];
        compute_hierarchy(&mut roots);
        assign_targets(&mut roots, Some(Path::new("/dst"))).unwrap();
        assert_eq!(roots[0].target_path, Some(PathBuf::from("/dst")));
    }

    #[test]
    fn multiple_top_roots_nest_under_basename() {
        let mut roots = vec![root("a", "/src/a"), root("b", "/src/b")];
        compute_hierarchy(&mut roots);
        assign_targets(&mut roots, Some(Path::new("/dst"))).unwrap();
        assert_eq!(roots[0].target_path, Some(PathBuf::from("/dst/a")));
        assert_eq!(roots[1].target_path, Some(PathBuf::from("/dst/b")));
    }

    #[test]
    fn nested_root_mirrors_relative_path_under_ancestor_target() {
        let mut roots = vec![root("a", "/src/a"), root("b", "/src/a/nested/b")];
        compute_hierarchy(&mut roots);
        assign_targets(&mut roots, Some(Path::new("/dst"))).unwrap();
        assert_eq!(roots[0].target_path, Some(PathBuf::from("/dst")));
        assert_eq!(roots[1].target_path, Some(PathBuf::from("/dst/nested/b")));
    }

    #[test]
    fn colliding_top_targets_is_a_configuration_error() {
        let mut roots = vec![root("a", "/src/x/a"), root("b", "/src/y/a")];
        compute_hierarchy(&mut roots);
        let err = assign_targets(&mut roots, Some(Path::new("/dst")));
        assert!(matches!(err, Err(PlannerError::CollidingTargets(_))));
    }
}
