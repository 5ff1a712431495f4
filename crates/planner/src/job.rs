//! Job description: the external input to a planning run (spec §3, §6).

use std::path::PathBuf;

/// The run mode selected for a job.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Plan and report only; never touches the target tree.
    Review,
    /// Plan, report, and compute REMOVE/MOVE entries, but do not apply them.
    SyncReview,
    /// Plan and apply NEW/MOD copies; never removes or moves.
    Backup,
    /// Plan and apply the full copy/move/remove cycle.
    Sync,
}

impl Mode {
    /// Whether this mode computes REMOVE/MOVE entries (spec §4.F step 8).
    #[must_use]
    pub fn wants_remove_scan(self) -> bool {
        matches!(self, Mode::Sync | Mode::SyncReview)
    }

    /// Whether this mode executes the apply engine (spec §4.H).
    #[must_use]
    pub fn applies_changes(self) -> bool {
        matches!(self, Mode::Backup | Mode::Sync)
    }
}

/// Which side of a file-set rule pair wins when both an include and an
/// exclude rule match the same file (spec §4.D).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilePolarity {
    /// A file is included unless excluded; a later include re-admits it.
    Include,
    /// A file is excluded unless included; a later exclude re-rejects it.
    Exclude,
}

/// A declared source root, as supplied by the external configuration layer.
///
/// This is distinct from [`crate::plan::SourceRoot`], which additionally
/// carries the hierarchy and scan results computed during planning.
#[derive(Clone, Debug)]
pub struct SourceRootConfig {
    /// Unique identifier for this root, echoed in CSV output.
    pub id: String,
    /// The root's source path. Need not be normalized; planning normalizes it.
    pub path: PathBuf,
    /// Folder-set rules (spec §4.B) excluding folders from this root's scan.
    pub exclude_folder_rules: Vec<String>,
    /// Folder-set rules applying tags to folders within this root.
    pub folder_tag_rules: Vec<String>,
    /// File-set rules (spec §4.B) that include files.
    pub include_file_rules: Vec<String>,
    /// File-set rules that exclude files.
    pub exclude_file_rules: Vec<String>,
    /// Which side wins when both an include and an exclude rule match.
    pub default_file_polarity: FilePolarity,
}

/// The input to a planning run.
#[derive(Clone, Debug)]
pub struct Job {
    /// The selected run mode.
    pub mode: Mode,
    /// The root of the target mirror. Absent only in `Review` mode.
    pub target_path: Option<PathBuf>,
    /// The quarantine/clean area. Required for `Backup`/`Sync`.
    pub clean_path: Option<PathBuf>,
    /// The declared source roots, in configuration order.
    pub source_roots: Vec<SourceRootConfig>,
    /// Folder-set rules excluding folders across every root's scan.
    pub global_exclude_rules: Vec<String>,
    /// Whether to compute the SKIP collection (spec §4.F step 7).
    pub log_skipped: bool,
    /// Whether the move detector (spec §4.G) runs in SYNC/SYNCREVIEW.
    pub move_detection_enabled: bool,
    /// Optional path to write the CSV report to.
    pub csv_output_path: Option<PathBuf>,
}
