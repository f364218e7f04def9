//! # Record Module
//!
//! In-memory descriptor of one discovered media file.
//!
//! A [`FileRecord`] has no effect until it is applied: [`FileRecord::save`]
//! writes the capture timestamp to the file's access and modification
//! times, [`FileRecord::move_to_directory`] relocates it without overwriting
//! anything already at the destination.

use crate::core::format::FormatTag;
use crate::core::metadata::CaptureTimestamp;
use crate::error::{ApplyError, FormatError, RecordError};
use filetime::FileTime;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A discovered media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: PathBuf,
    capture_timestamp: Option<CaptureTimestamp>,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            capture_timestamp: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, or the whole path if there is none
    pub fn file_name(&self) -> Cow<'_, str> {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => self.path.to_string_lossy(),
        }
    }

    /// Format derived from the file name
    ///
    /// Not cached: every call classifies the current name again.
    pub fn format(&self) -> Result<FormatTag, FormatError> {
        FormatTag::detect(&self.file_name())
    }

    pub fn capture_timestamp(&self) -> Option<CaptureTimestamp> {
        self.capture_timestamp
    }

    /// Record the extracted timestamp. It can only be set once.
    pub fn set_capture_timestamp(&mut self, timestamp: CaptureTimestamp) -> Result<(), RecordError> {
        if self.capture_timestamp.is_some() {
            return Err(RecordError::TimestampAlreadySet {
                path: self.path.clone(),
            });
        }
        self.capture_timestamp = Some(timestamp);
        Ok(())
    }

    /// Set access and modification time to the capture timestamp
    ///
    /// Does nothing when no timestamp has been recorded.
    pub fn save(&self) -> Result<(), ApplyError> {
        let Some(timestamp) = self.capture_timestamp else {
            return Ok(());
        };

        let time = FileTime::from_unix_time(timestamp.unix_timestamp(), 0);
        filetime::set_file_times(&self.path, time, time).map_err(|source| ApplyError::SetTimes {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(
            path = %self.path.display(),
            %timestamp,
            "applied capture timestamp"
        );
        Ok(())
    }

    /// `name (n).ext` for this record's file name
    pub fn alternate_name(&self, n: usize) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_else(|| self.file_name());

        match self.path.extension() {
            Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
            None => format!("{} ({})", stem, n),
        }
    }

    /// First free name for this file inside `directory`
    ///
    /// Tries the original name, then `name (1).ext`, `name (2).ext`, ...
    pub fn create_unique_alternate_name(&self, directory: &Path) -> PathBuf {
        let mut candidate = directory.join(&*self.file_name());
        let mut n = 0;

        while fs::symlink_metadata(&candidate).is_ok() {
            n += 1;
            candidate = directory.join(self.alternate_name(n));
        }

        candidate
    }

    /// Move the file into `directory` under a name that is not taken
    ///
    /// Creates the directory if needed. Falls back to copy + verify + delete
    /// when a rename is not possible (e.g. across filesystems).
    pub fn move_to_directory(&self, directory: &Path) -> Result<PathBuf, ApplyError> {
        fs::create_dir_all(directory).map_err(|source| ApplyError::CreateDir {
            path: directory.to_path_buf(),
            source,
        })?;

        let destination = self.create_unique_alternate_name(directory);

        move_file(&self.path, &destination).map_err(|source| ApplyError::Move {
            from: self.path.clone(),
            to: destination.clone(),
            source,
        })?;

        tracing::info!(
            from = %self.path.display(),
            to = %destination.display(),
            "moved undated file"
        );
        Ok(destination)
    }
}

fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    fs::rename(source, destination).or_else(|_| {
        let source_size = fs::metadata(source)?.len();
        fs::copy(source, destination)?;

        // Verify destination size matches source before deleting
        let dest_size = fs::metadata(destination)?.len();
        if dest_size != source_size {
            let _ = fs::remove_file(destination);
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "Copy verification failed: source {} bytes, dest {} bytes",
                    source_size, dest_size
                ),
            ));
        }

        fs::remove_file(source)
    })
}
