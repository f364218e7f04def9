//! Pipeline execution implementation.

use crate::core::metadata::{CaptureTimestamp, ReaderFactory};
use crate::core::record::FileRecord;
use crate::core::scanner::{ScanConfig, WalkDirScanner};
use crate::error::{FormatError, RetagError};
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary, RetagEvent,
    ScanEvent,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Access and modification times set to the capture timestamp
    Tagged {
        path: PathBuf,
        timestamp: CaptureTimestamp,
    },
    /// No usable timestamp; moved into the undated directory
    MovedUndated { from: PathBuf, to: PathBuf },
    /// Not a supported format; left in place
    Skipped { path: PathBuf, reason: String },
    /// Applying the change failed; left in place
    Failed { path: PathBuf, error: String },
}

impl FileOutcome {
    /// Path the file had when it was discovered
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Tagged { path, .. }
            | FileOutcome::Skipped { path, .. }
            | FileOutcome::Failed { path, .. } => path,
            FileOutcome::MovedUndated { from, .. } => from,
        }
    }
}

/// Result of pipeline execution
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Media files found by the scanner
    pub total_files: usize,
    /// Files whose times were set
    pub tagged: usize,
    /// Files moved into the undated directory
    pub moved: usize,
    /// Files left untouched because their format is unsupported
    pub skipped: usize,
    /// Files where applying a change failed
    pub failed: usize,
    /// One outcome per discovered file, in discovery order
    pub outcomes: Vec<FileOutcome>,
    /// Non-fatal errors (scan and apply), as messages
    pub errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    fn new() -> Self {
        Self {
            total_files: 0,
            tagged: 0,
            moved: 0,
            skipped: 0,
            failed: 0,
            outcomes: Vec::new(),
            errors: Vec::new(),
            duration_ms: 0,
        }
    }

    fn record(&mut self, outcome: FileOutcome) {
        self.total_files += 1;
        match &outcome {
            FileOutcome::Tagged { .. } => self.tagged += 1,
            FileOutcome::MovedUndated { .. } => self.moved += 1,
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { error, .. } => {
                self.failed += 1;
                self.errors.push(error.clone());
            }
        }
        self.outcomes.push(outcome);
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            total_files: self.total_files,
            tagged: self.tagged,
            moved: self.moved,
            skipped: self.skipped,
            failed: self.failed,
            duration_ms: self.duration_ms,
        }
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory to process recursively
    pub root: PathBuf,
    /// Scanner configuration
    pub scan_config: ScanConfig,
    /// Extraction workers; 0 or 1 processes files one at a time
    pub jobs: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            scan_config: ScanConfig::default(),
            jobs: 1,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the directory to process
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Name of the per-directory holding folder for undated files
    pub fn undated_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.scan_config.excluded_dir = name.into();
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Number of extraction workers
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.config.jobs = jobs;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline::from_config(self.config)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// What extraction found for one file
enum Extraction {
    Unsupported(FormatError),
    Dated(CaptureTimestamp),
    Undated,
}

/// The retagging pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Create a pipeline from a complete configuration, e.g. one loaded from JSON
    pub fn from_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, RetagError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    ///
    /// Only an unusable root is an error. Everything that goes wrong with
    /// a single file ends up in the returned result.
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, RetagError> {
        let start_time = Instant::now();
        let root = &self.config.root;

        events.send(Event::Pipeline(PipelineEvent::Started));
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let records = match scanner.fetch(root) {
            Ok(records) => records,
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };

        events.send(Event::Scan(ScanEvent::Started { root: root.clone() }));
        tracing::debug!(root = %root.display(), jobs = self.config.jobs, "starting retag run");

        let mut result = PipelineResult::new();
        let mut scan_errors = Vec::new();

        let records = records.filter_map(|item| match item {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::warn!(%error, "skipping unreadable entry");
                events.send(Event::Scan(ScanEvent::Error {
                    path: error.path().to_path_buf(),
                    message: error.to_string(),
                }));
                scan_errors.push(error.to_string());
                None
            }
        });

        if self.config.jobs > 1 {
            let records: Vec<FileRecord> = records.collect();
            events.send(Event::Scan(ScanEvent::Completed {
                total_files: records.len(),
            }));

            events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Extracting,
            }));
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.jobs)
                .build()
                .map_err(|e| RetagError::Config(e.to_string()))?;
            let extractions: Vec<Extraction> =
                pool.install(|| records.par_iter().map(|r| extract(r, events)).collect());

            events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Applying,
            }));
            for (record, extraction) in records.into_iter().zip(extractions) {
                let outcome = self.apply(record, extraction, events);
                result.record(outcome);
            }
        } else {
            for record in records {
                let extraction = extract(&record, events);
                let outcome = self.apply(record, extraction, events);
                result.record(outcome);
            }
            events.send(Event::Scan(ScanEvent::Completed {
                total_files: result.total_files,
            }));
        }

        scan_errors.append(&mut result.errors);
        result.errors = scan_errors;
        result.duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: result.summary(),
        }));

        Ok(result)
    }

    /// Apply one extraction result to the filesystem
    fn apply(&self, mut record: FileRecord, extraction: Extraction, events: &EventSender) -> FileOutcome {
        let path = record.path().to_path_buf();

        match extraction {
            Extraction::Unsupported(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping file");
                let reason = error.to_string();
                events.send(Event::Retag(RetagEvent::Skipped {
                    path: path.clone(),
                    reason: reason.clone(),
                }));
                FileOutcome::Skipped { path, reason }
            }
            Extraction::Dated(timestamp) => {
                let applied = record
                    .set_capture_timestamp(timestamp)
                    .map_err(RetagError::from)
                    .and_then(|()| record.save().map_err(RetagError::from));

                match applied {
                    Ok(()) => {
                        events.send(Event::Retag(RetagEvent::Tagged {
                            path: path.clone(),
                            timestamp: timestamp.to_string(),
                        }));
                        FileOutcome::Tagged { path, timestamp }
                    }
                    Err(error) => fail(path, error, events),
                }
            }
            Extraction::Undated => {
                let undated_dir = self.undated_dir_for(&path);
                match record.move_to_directory(&undated_dir) {
                    Ok(to) => {
                        events.send(Event::Retag(RetagEvent::MovedUndated {
                            from: path.clone(),
                            to: to.clone(),
                        }));
                        FileOutcome::MovedUndated { from: path, to }
                    }
                    Err(error) => fail(path, error.into(), events),
                }
            }
        }
    }

    /// Undated directory next to the given file
    fn undated_dir_for(&self, path: &Path) -> PathBuf {
        path.parent()
            .unwrap_or(&self.config.root)
            .join(&self.config.scan_config.excluded_dir)
    }
}

fn extract(record: &FileRecord, events: &EventSender) -> Extraction {
    events.send(Event::Retag(RetagEvent::Processing {
        path: record.path().to_path_buf(),
    }));

    let reader = match ReaderFactory::create(record) {
        Ok(reader) => reader,
        Err(error) => return Extraction::Unsupported(error),
    };

    match reader.capture_timestamp() {
        Some(timestamp) => Extraction::Dated(timestamp),
        None => Extraction::Undated,
    }
}

fn fail(path: PathBuf, error: RetagError, events: &EventSender) -> FileOutcome {
    tracing::warn!(path = %path.display(), %error, "failed to apply outcome");
    let message = error.to_string();
    events.send(Event::Retag(RetagEvent::Error {
        path: path.clone(),
        message: message.clone(),
    }));
    FileOutcome::Failed {
        path,
        error: message,
    }
}
