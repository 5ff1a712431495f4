//! Plan data model: classified file entries, source roots, and the plan
//! produced by a scan (spec §3, §4.F).

use crate::job::FilePolarity;
use std::collections::HashSet;
use std::path::PathBuf;

/// The label attached to a (folder, name) pair in a plan.
///
/// `InternalMoved` and `InternalCleaned` are bookkeeping states introduced by
/// the move detector (spec §4.G); they are never emitted to CSV output
/// (spec §6 excludes classifications whose source label begins with `*`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Classification {
    /// The file has no counterpart at the target.
    New,
    /// The file exists at the target with a different size.
    Mod,
    /// The file exists at the target with the same size.
    Same,
    /// Present at the source but excluded from the scan by rules.
    Skip,
    /// Present at the target with no source counterpart.
    Remove,
    /// A REMOVE entry rewritten into a same-device rename by the move
    /// detector.
    Move,
    /// A NEW entry absorbed into a MOVE by the move detector; no longer
    /// counts as a copy to perform.
    InternalMoved,
    /// A clean-area entry consumed as the source of a MOVE.
    InternalCleaned,
}

impl Classification {
    /// The CSV status label for this classification (spec §6).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Classification::New => "NEW",
            Classification::Mod => "MOD",
            Classification::Same => "SAME",
            Classification::Skip => "SKIP",
            Classification::Remove => "REMOVE",
            Classification::Move => "MOVE",
            Classification::InternalMoved => "*INTERNAL_MOVED",
            Classification::InternalCleaned => "*INTERNAL_CLEANED",
        }
    }

    /// Whether this classification is internal bookkeeping that must never
    /// appear in CSV output (spec §6).
    #[must_use]
    pub fn is_internal(self) -> bool {
        matches!(self, Classification::InternalMoved | Classification::InternalCleaned)
    }
}

/// A single classified file within an in-scope folder.
#[derive(Clone, Debug)]
pub struct FileEntry {
    /// The file's base name.
    pub name: String,
    /// The file's size in bytes, at whichever side it was scanned from.
    pub size: u64,
    /// The classification assigned during planning.
    pub classification: Classification,
    /// For `Move` entries, the destination directory of the rename.
    pub target_dir: Option<PathBuf>,
}

/// An in-scope folder within a source root, plus its classified files.
#[derive(Clone, Debug)]
pub struct ScanFolder {
    /// The folder's absolute, normalized source path.
    pub path: PathBuf,
    /// The folder's computed mirror under the job's target tree, if any.
    pub target_path: Option<PathBuf>,
    /// The union of tags applied to this folder by folder-tag rules.
    pub tags: HashSet<String>,
    /// The folder's classified files.
    pub files: Vec<FileEntry>,
}

/// A declared source root, enriched with the hierarchy and scan results
/// computed during planning (spec §3 `SourceRoot (FolderSection)`).
#[derive(Clone, Debug)]
pub struct SourceRoot {
    /// Unique identifier for this root.
    pub id: String,
    /// Absolute, normalized source path.
    pub path: PathBuf,
    /// Folder-set rules excluding folders from this root's scan.
    pub exclude_folder_rules: Vec<String>,
    /// Folder-set rules applying tags to folders within this root.
    pub folder_tag_rules: Vec<String>,
    /// File-set rules that include files.
    pub include_file_rules: Vec<String>,
    /// File-set rules that exclude files.
    pub exclude_file_rules: Vec<String>,
    /// Which side wins when both an include and an exclude rule match.
    pub default_file_polarity: FilePolarity,
    /// Index, into the owning [`Plan::roots`] vector, of the nearest root
    /// that strictly contains this one. `None` marks a top root.
    pub parent: Option<usize>,
    /// Indices of every root whose nearest containing root is this one.
    pub children: Vec<usize>,
    /// This root's computed mirror under the job's target tree.
    pub target_path: Option<PathBuf>,
    /// The in-scope folders discovered for this root.
    pub scan_folders: Vec<ScanFolder>,
}

/// A source-side file filtered out of the scan by folder or file rules.
#[derive(Clone, Debug)]
pub struct SkipEntry {
    /// The id of the top root the file was found under.
    pub root_id: String,
    /// The source folder containing the file.
    pub folder: PathBuf,
    /// The file's base name.
    pub name: String,
    /// The file's size in bytes.
    pub size: u64,
}

/// A target-side file with no source counterpart, or a rewritten MOVE.
#[derive(Clone, Debug)]
pub struct RemoveEntry {
    /// The id of the top root the entry was found under.
    pub root_id: String,
    /// The folder the entry currently resides in (target tree, or the clean
    /// area for entries absorbed from the clean inventory).
    pub folder: PathBuf,
    /// The entry's base name.
    pub name: String,
    /// The entry's size in bytes.
    pub size: u64,
    /// `Remove` or, after move detection, `Move`/`InternalCleaned`.
    pub classification: Classification,
    /// For `Move` entries, the destination directory of the rename.
    pub target_dir: Option<PathBuf>,
}

/// The output of a planning run: every source root's classified scan
/// results, plus the cross-cutting skip and remove collections.
#[derive(Clone, Debug, Default)]
pub struct Plan {
    /// Every declared source root, in configuration order.
    pub roots: Vec<SourceRoot>,
    /// Source-side files filtered out by rules (only when `log_skipped`).
    pub skip_files: Vec<SkipEntry>,
    /// Target-side files with no source counterpart (SYNC/SYNCREVIEW only),
    /// rewritten in place by the move detector.
    pub remove_files: Vec<RemoveEntry>,
}
