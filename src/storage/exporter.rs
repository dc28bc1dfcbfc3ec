//! Artifact export: five CSV tables plus the summary JSON.
//!
//! Files are written to a staging directory inside the output directory and
//! renamed into place only once all six were written. Each file is complete
//! when it appears; a reader between two renames can still see files from
//! different runs.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info, warn};
use zip::write::FileOptions;

use crate::config::defaults::{BUNDLE_FILE_NAME, SUMMARY_FILE_NAME};
use crate::types::{
    AnalyticsReport, MachineMetricRecord, OperatorPerformanceRecord, OrderTimelineRecord,
    PhaseMetricRecord, QueueAnalysisRecord, Tabular,
};

const STAGING_PREFIX: &str = ".staging-";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, io::Error),
    #[error("CSV error in {0}: {1}")]
    Csv(String, csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("invalid file name: {0}")]
    InvalidFileName(String),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> ExportError + '_ {
    move |e| ExportError::Io(path.to_path_buf(), e)
}

/// Metadata of one exported file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedFile {
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// Writes report artifacts into an output directory and optional dashboard directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    dashboard_dir: Option<PathBuf>,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, dashboard_dir: Option<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            dashboard_dir,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Names of the six artifacts one run produces.
    pub fn artifact_names() -> [String; 6] {
        [
            csv_name::<PhaseMetricRecord>(),
            csv_name::<MachineMetricRecord>(),
            csv_name::<OrderTimelineRecord>(),
            csv_name::<QueueAnalysisRecord>(),
            csv_name::<OperatorPerformanceRecord>(),
            SUMMARY_FILE_NAME.to_string(),
        ]
    }

    /// Write all six artifacts, then mirror them to the dashboard directory.
    pub fn export(&self, report: &AnalyticsReport) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(&self.output_dir).map_err(io_err(&self.output_dir))?;
        self.sweep_stale_staging();

        let staging = self
            .output_dir
            .join(format!("{STAGING_PREFIX}{}", Local::now().timestamp_millis()));
        fs::create_dir_all(&staging).map_err(io_err(&staging))?;

        let written = write_artifacts(&staging, report).and_then(|()| self.promote(&staging));
        // Staging is always discarded; after a successful promote it is empty
        let _ = fs::remove_dir_all(&staging);
        let written = written?;

        if let Some(dashboard) = &self.dashboard_dir {
            self.copy_to(dashboard)?;
            debug!(dir = %dashboard.display(), "Artifacts copied to dashboard directory");
        }

        info!(dir = %self.output_dir.display(), files = written.len(), "Analytics exported");
        Ok(written)
    }

    /// Remove staging directories an interrupted export left behind.
    fn sweep_stale_staging(&self) {
        let Ok(entries) = fs::read_dir(&self.output_dir) else {
            return;
        };
        for entry in entries.filter_map(Result::ok) {
            let is_staging = entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX);
            if is_staging && entry.path().is_dir() {
                match fs::remove_dir_all(entry.path()) {
                    Ok(()) => debug!(path = %entry.path().display(), "Removed stale staging directory"),
                    Err(e) => warn!(path = %entry.path().display(), error = %e, "Could not remove stale staging directory"),
                }
            }
        }
    }

    fn promote(&self, staging: &Path) -> Result<Vec<PathBuf>, ExportError> {
        Self::artifact_names()
            .iter()
            .map(|name| -> Result<PathBuf, ExportError> {
                let target = self.output_dir.join(name);
                fs::rename(staging.join(name), &target).map_err(io_err(&target))?;
                Ok(target)
            })
            .collect()
    }

    fn copy_to(&self, dir: &Path) -> Result<(), ExportError> {
        fs::create_dir_all(dir).map_err(io_err(dir))?;
        for name in Self::artifact_names() {
            let target = dir.join(&name);
            fs::copy(self.output_dir.join(&name), &target).map_err(io_err(&target))?;
        }
        Ok(())
    }

    /// Visible files in the output directory, sorted by name.
    pub fn list_files(&self) -> Result<Vec<ExportedFile>, ExportError> {
        let entries = match fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ExportError::Io(self.output_dir.clone(), e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_err(&self.output_dir))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let meta = entry.metadata().map_err(io_err(&entry.path()))?;
            if !meta.is_file() {
                continue;
            }
            files.push(ExportedFile {
                name,
                size: meta.len(),
                modified: meta.modified().ok().map(DateTime::<Local>::from),
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Resolve a download name to a path inside the output directory.
    ///
    /// Rejects anything that could leave the directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ExportError> {
        let invalid = name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
            || name.starts_with('.');
        if invalid {
            return Err(ExportError::InvalidFileName(name.to_string()));
        }
        Ok(self.output_dir.join(name))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(SUMMARY_FILE_NAME)
    }

    /// Zip every visible file in the output directory except the bundle itself.
    pub fn bundle_zip(&self) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.output_dir).map_err(io_err(&self.output_dir))?;
        let files = self.list_files()?;
        let bundle_path = self.output_dir.join(BUNDLE_FILE_NAME);

        let file = File::create(&bundle_path).map_err(io_err(&bundle_path))?;
        let mut zip = zip::ZipWriter::new(file);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for exported in files.iter().filter(|f| f.name != BUNDLE_FILE_NAME) {
            let path = self.output_dir.join(&exported.name);
            let mut source = File::open(&path).map_err(io_err(&path))?;
            zip.start_file(exported.name.as_str(), options)?;
            io::copy(&mut source, &mut zip).map_err(io_err(&path))?;
        }
        zip.finish()?;

        debug!(path = %bundle_path.display(), "Bundle written");
        Ok(bundle_path)
    }
}

fn csv_name<T: Tabular>() -> String {
    format!("{}.csv", T::TABLE)
}

fn write_artifacts(dir: &Path, report: &AnalyticsReport) -> Result<(), ExportError> {
    write_table(dir, &report.phase_metrics)?;
    write_table(dir, &report.machine_metrics)?;
    write_table(dir, &report.order_timeline)?;
    write_table(dir, &report.queue_analysis)?;
    write_table(dir, &report.operator_performance)?;

    let path = dir.join(SUMMARY_FILE_NAME);
    let file = File::create(&path).map_err(io_err(&path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report.summary)?;
    writer.flush().map_err(io_err(&path))?;
    Ok(())
}

/// Header row from the declared columns, so empty tables still carry it.
fn write_table<T: Tabular>(dir: &Path, rows: &[T]) -> Result<(), ExportError> {
    let name = csv_name::<T>();
    let path = dir.join(&name);
    let csv_err = |e: csv::Error| ExportError::Csv(name.clone(), e);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(csv_err)?;
    writer.write_record(T::COLUMNS).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(io_err(&path))?;
    Ok(())
}
