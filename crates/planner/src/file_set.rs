//! File-set materialization within a single in-scope folder (spec §4.D).

use crate::job::FilePolarity;
use rules::{any_rule_matches, FileRule};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use vfs::FileSystem;

/// Lists `folder`'s immediate files, keeping only those the include/exclude
/// rule pair admits under `polarity`.
///
/// Returns `(name, size)` pairs in the order [`FileSystem::walk`] returns
/// entries (lexicographic).
pub fn scan_folder_files(
    folder: &Path,
    tags: &HashSet<String>,
    include_rules: &[FileRule],
    exclude_rules: &[FileRule],
    polarity: FilePolarity,
    fs: &dyn FileSystem,
) -> io::Result<Vec<(String, u64)>> {
    let mut kept = Vec::new();

    for file_path in fs.walk(folder, false, true, false)? {
        let name = file_path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_owned();
        let size = fs.size(&file_path)?;
        let size_of = || Ok(size);

        let included = match polarity {
            FilePolarity::Include => {
                let excluded = any_rule_matches(exclude_rules, &name, folder, tags, size_of);
                !excluded || any_rule_matches(include_rules, &name, folder, tags, size_of)
            }
            FilePolarity::Exclude => {
                let included = any_rule_matches(include_rules, &name, folder, tags, size_of);
                included && !any_rule_matches(exclude_rules, &name, folder, tags, size_of)
            }
        };

        if included {
            kept.push((name, size));
        }
    }

    Ok(kept)
}
