//! CSV reporting (spec §6).
//!
//! A finished [`planner::Plan`] is flattened into rows and handed to a
//! [`RowSink`]; [`CsvRowSink`] is the convenience implementation that writes
//! them straight to a file. Report writing is not routed through
//! [`vfs::FileSystem`]: the CSV file is a side artifact of a run, not part of
//! the mirrored tree the filesystem abstraction exists to fake out in tests.

use crate::error::DirsyncError;
use planner::{Classification, Plan};
use std::fs::File;
use std::path::Path;

/// Receives one row per non-internal plan entry, in the column order laid
/// out in spec §6: `root_id, name, size, classification, source_dir, target_dir`.
pub trait RowSink {
    /// Writes a single CSV row.
    fn write_row(
        &mut self,
        root_id: &str,
        name: &str,
        size: u64,
        status: &str,
        source_dir: &str,
        target_dir: &str,
    ) -> Result<(), DirsyncError>;
}

/// Writes rows straight to a CSV file via the `csv` crate, with the header
/// `Source, File, Size, Status, Source, Target` (the repeated `Source`
/// column is as specified).
pub struct CsvRowSink {
    writer: csv::Writer<File>,
}

impl CsvRowSink {
    /// Creates (or truncates) `path` and writes the header row.
    pub fn create(path: &Path) -> Result<Self, DirsyncError> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(["Source", "File", "Size", "Status", "Source", "Target"])?;
        Ok(Self { writer })
    }

    /// Flushes any buffered rows to disk.
    pub fn flush(&mut self) -> Result<(), DirsyncError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl RowSink for CsvRowSink {
    fn write_row(
        &mut self,
        root_id: &str,
        name: &str,
        size: u64,
        status: &str,
        source_dir: &str,
        target_dir: &str,
    ) -> Result<(), DirsyncError> {
        self.writer.write_record([root_id, name, &size.to_string(), status, source_dir, target_dir])?;
        Ok(())
    }
}

/// Flattens `plan` into rows and feeds them to `sink`, in source-root order,
/// skipping every internal bookkeeping classification (spec §6).
pub fn write_plan_rows(plan: &Plan, sink: &mut dyn RowSink) -> Result<(), DirsyncError> {
    for root in &plan.roots {
        for folder in &root.scan_folders {
            let target_dir = folder.target_path.as_deref().map_or(String::new(), |p| p.display().to_string());
            for file in &folder.files {
                if file.classification.is_internal() {
                    continue;
                }
                sink.write_row(
                    &root.id,
                    &file.name,
                    file.size,
                    file.classification.label(),
                    &folder.path.display().to_string(),
                    &target_dir,
                )?;
            }
        }
    }

    for skip in &plan.skip_files {
        sink.write_row(
            &skip.root_id,
            &skip.name,
            skip.size,
            Classification::Skip.label(),
            &skip.folder.display().to_string(),
            "",
        )?;
    }

    for remove in &plan.remove_files {
        if remove.classification.is_internal() {
            continue;
        }
        let move_target = remove.target_dir.as_deref().map_or(String::new(), |p| p.display().to_string());
        sink.write_row(
            &remove.root_id,
            &remove.name,
            remove.size,
            remove.classification.label(),
            &remove.folder.display().to_string(),
            &move_target,
        )?;
    }

    Ok(())
}
