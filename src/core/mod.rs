//! # Core Module
//!
//! The front-end-agnostic retagging engine.
//!
//! ## Modules
//! - `format` - Classifies files by name
//! - `metadata` - Reads capture timestamps, one reader per format
//! - `record` - A discovered file and the changes applied to it
//! - `scanner` - Discovers media files in a directory tree
//! - `pipeline` - Orchestrates the full workflow

pub mod format;
pub mod metadata;
pub mod pipeline;
pub mod record;
pub mod scanner;

// Re-export commonly used types
pub use format::FormatTag;
pub use metadata::{CaptureTimestamp, MetadataReader, ReaderFactory};
pub use pipeline::{FileOutcome, Pipeline, PipelineResult};
pub use record::FileRecord;
pub use scanner::{ScanConfig, WalkDirScanner};
