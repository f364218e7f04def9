//! # Error Module
//!
//! Error types for the media retagger.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Contain failures** - a broken file never stops the batch

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum RetagError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Apply error: {0}")]
    Apply(#[from] ApplyError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while walking the directory tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Path the error is about
    pub fn path(&self) -> &Path {
        match self {
            ScanError::DirectoryNotFound { path }
            | ScanError::PermissionDenied { path }
            | ScanError::ReadDirectory { path, .. } => path,
        }
    }
}

/// Errors raised while classifying a file
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Unsupported format: {name}")]
    UnsupportedFormat { name: String },
}

/// Errors raised by a metadata reader
///
/// Readers return these from `read_capture_timestamp`; the public
/// `capture_timestamp` entry point logs them and reports "unknown".
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed metadata in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Invalid timestamp {value:?} in {path}")]
    InvalidTimestamp { path: PathBuf, value: String },

    #[error("Failed to parse EXIF in {path}: {source}")]
    Exif {
        path: PathBuf,
        #[source]
        source: exif::Error,
    },
}

/// Errors raised while applying an outcome to the filesystem
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("Failed to set file times on {path}: {source}")]
    SetTimes {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by `FileRecord` state transitions
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Capture timestamp already set for {path}")]
    TimestampAlreadySet { path: PathBuf },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, RetagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/vacation"));
    }

    #[test]
    fn unsupported_format_names_the_file() {
        let error = FormatError::UnsupportedFormat {
            name: "notes.txt".to_string(),
        };
        assert!(error.to_string().contains("notes.txt"));
    }

    #[test]
    fn invalid_timestamp_quotes_value() {
        let error = MetadataError::InvalidTimestamp {
            path: PathBuf::from("/raw/IMG_0001.CR3"),
            value: "garbage".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("\"garbage\""));
        assert!(message.contains("IMG_0001.CR3"));
    }

    #[test]
    fn move_error_names_both_paths() {
        let error = ApplyError::Move {
            from: PathBuf::from("/a/photo.png"),
            to: PathBuf::from("/a/_NotDated/photo.png"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let message = error.to_string();
        assert!(message.contains("/a/photo.png"));
        assert!(message.contains("_NotDated"));
        assert!(message.contains("disk full"));
    }
}
