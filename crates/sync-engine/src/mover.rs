//! Move detection (spec §4.G).
//!
//! A "move" is a NEW file at some destination whose (name, size) pair also
//! shows up as a REMOVE elsewhere in the target tree, or in the clean/quarantine
//! area from a previous run. Rather than mutate entries in place with sentinel
//! strings, this rewrites typed [`planner::RemoveEntry`]/[`planner::FileEntry`]
//! values directly: the matched REMOVE becomes a MOVE, and the NEW entry is
//! relabeled INTERNAL_MOVED so the apply engine skips copying it.

use planner::{Classification, Plan, RemoveEntry};
use std::io;
use std::path::{Path, PathBuf};
use vfs::FileSystem;

struct CleanEntry {
    folder: PathBuf,
    name: String,
    size: u64,
    consumed: bool,
}

/// Rewrites `plan` in place, turning matched NEW/REMOVE pairs into MOVE
/// entries. Matching is first-hit by folder iteration order; ties are not
/// resolved further (implementation-defined, per spec §9).
pub fn detect_moves(plan: &mut Plan, clean_path: Option<&Path>, fs: &dyn FileSystem) -> io::Result<()> {
    let mut clean_inventory = build_clean_inventory(clean_path, fs)?;

    for root in &mut plan.roots {
        let root_id = root.id.clone();
        for folder in &mut root.scan_folders {
            let Some(destination) = folder.target_path.clone() else { continue };

            for entry in &mut folder.files {
                if entry.classification != Classification::New {
                    continue;
                }

                if let Some(index) = plan.remove_files.iter().position(|candidate| {
                    candidate.classification == Classification::Remove
                        && candidate.name == entry.name
                        && candidate.size == entry.size
                }) {
                    plan.remove_files[index].classification = Classification::Move;
                    plan.remove_files[index].target_dir = Some(destination.clone());
                    entry.classification = Classification::InternalMoved;
                    continue;
                }

                if let Some(index) = clean_inventory
                    .iter()
                    .position(|candidate| !candidate.consumed && candidate.name == entry.name && candidate.size == entry.size)
                {
                    clean_inventory[index].consumed = true;
                    entry.classification = Classification::InternalMoved;
                    plan.remove_files.push(RemoveEntry {
                        root_id: root_id.clone(),
                        folder: clean_inventory[index].folder.clone(),
                        name: entry.name.clone(),
                        size: entry.size,
                        classification: Classification::Move,
                        target_dir: Some(destination.clone()),
                    });
                }
            }
        }
    }

    Ok(())
}

fn build_clean_inventory(clean_path: Option<&Path>, fs: &dyn FileSystem) -> io::Result<Vec<CleanEntry>> {
    let Some(clean_path) = clean_path else { return Ok(Vec::new()) };
    if !fs.is_dir(clean_path) {
        return Ok(Vec::new());
    }

    let mut inventory = Vec::new();
    for file_path in fs.walk(clean_path, true, true, false)? {
        let folder = file_path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        let name = file_path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_owned();
        let size = fs.size(&file_path)?;
        inventory.push(CleanEntry { folder, name, size, consumed: false });
    }
    Ok(inventory)
}
