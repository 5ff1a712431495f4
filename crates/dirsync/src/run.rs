//! Job execution entry point (spec §2, §5).

use crate::error::DirsyncError;
use crate::sink::{write_plan_rows, CsvRowSink};
use logging::{Level, Logger};
use planner::{Classification, Job, Plan};
use sync_engine::ApplyOutcome;
use vfs::FileSystem;

/// Per-classification counters summarizing a finished [`Plan`], plus the
/// apply-phase outcome when the job's mode executes one.
#[derive(Clone, Debug, Default)]
pub struct RunOutcome {
    /// Count of files classified NEW.
    pub new: usize,
    /// Count of files classified MOD.
    pub modified: usize,
    /// Count of files classified SAME.
    pub same: usize,
    /// Count of files classified SKIP.
    pub skipped: usize,
    /// Count of target entries classified REMOVE.
    pub removed: usize,
    /// Count of target entries classified MOVE.
    pub moved: usize,
    /// The apply engine's summary, present only for BACKUP/SYNC.
    pub apply: Option<ApplyOutcome>,
}

impl RunOutcome {
    fn tally(plan: &Plan) -> Self {
        let mut outcome = RunOutcome::default();

        for root in &plan.roots {
            for folder in &root.scan_folders {
                for file in &folder.files {
                    match file.classification {
                        Classification::New => outcome.new += 1,
                        Classification::Mod => outcome.modified += 1,
                        Classification::Same => outcome.same += 1,
                        _ => {}
                    }
                }
            }
        }

        outcome.skipped = plan.skip_files.len();

        for remove in &plan.remove_files {
            match remove.classification {
                Classification::Remove => outcome.removed += 1,
                Classification::Move => outcome.moved += 1,
                _ => {}
            }
        }

        outcome
    }
}

/// Runs a full job: plans the scan, rewrites NEW/REMOVE pairs into MOVEs
/// when move detection is enabled, applies the plan if the mode calls for
/// it, and writes the CSV report if `job.csv_output_path` is set.
///
/// Every stage runs in the order laid out in spec §5: plan, detect moves,
/// apply, report. A failure at any stage stops the run and returns before
/// later stages execute.
pub fn run(job: &Job, fs: &dyn FileSystem, logger: &dyn Logger) -> Result<RunOutcome, DirsyncError> {
    let mut plan = planner::build_plan(job, fs, logger)?;
    logger.log(Level::Message, "scan complete");

    if job.move_detection_enabled && job.mode.wants_remove_scan() {
        sync_engine::detect_moves(&mut plan, job.clean_path.as_deref(), fs).map_err(DirsyncError::MoveDetection)?;
    }

    let apply_outcome = if job.mode.applies_changes() {
        let target = job.target_path.as_deref().expect("validated by build_plan: applies_changes requires target_path");
        let outcome = sync_engine::apply_plan(&plan, target, job.clean_path.as_deref(), fs, logger, |percent| {
            logger.log(Level::Details, &format!("apply progress: {percent}%"));
        })?;
        logger.log(Level::Message, "apply complete");
        Some(outcome)
    } else {
        None
    };

    if let Some(csv_path) = &job.csv_output_path {
        let mut sink = CsvRowSink::create(csv_path)?;
        write_plan_rows(&plan, &mut sink)?;
        sink.flush()?;
    }

    let mut outcome = RunOutcome::tally(&plan);
    outcome.apply = apply_outcome;
    Ok(outcome)
}
