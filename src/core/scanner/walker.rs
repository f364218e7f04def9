//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, MediaFilter};
use super::ScanResult;
use crate::core::record::FileRecord;
use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Name of the holding folder for files without a capture date
pub const DEFAULT_UNDATED_DIR: &str = "_NotDated";

/// Configuration for the directory scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = every supported format)
    pub extensions: Option<Vec<String>>,
    /// Directory name skipped at every level
    pub excluded_dir: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            max_depth: None,
            extensions: None,
            excluded_dir: DEFAULT_UNDATED_DIR.to_string(),
        }
    }
}

/// Scanner implementation using the walkdir crate
///
/// Entries are visited depth-first, sorted by file name within each
/// directory, so a subdirectory's files come where its name sorts among
/// its siblings.
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: MediaFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = MediaFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self { config, filter }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Lazily yield the media files under `root`
    ///
    /// Fails up front only if `root` is not a directory. Errors on
    /// individual entries are yielded in place and do not end the walk.
    pub fn fetch(
        &self,
        root: &Path,
    ) -> Result<impl Iterator<Item = Result<FileRecord, ScanError>>, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let excluded = self.config.excluded_dir.clone();
        let include_hidden = self.filter.include_hidden();
        let filter = self.filter.clone();

        let records = walker
            .into_iter()
            .filter_entry(move |entry| keep_directory(entry, &excluded, include_hidden))
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    if entry.file_type().is_dir() || !filter.should_include(entry.path()) {
                        return None;
                    }
                    Some(Ok(FileRecord::new(entry.into_path())))
                }
                Err(e) => Some(Err(walk_error(e))),
            });

        Ok(records)
    }

    /// Walk `root` completely, collecting records and non-fatal errors
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        let mut records = Vec::new();
        let mut errors = Vec::new();

        for item in self.fetch(root)? {
            match item {
                Ok(record) => records.push(record),
                Err(error) => {
                    tracing::warn!(%error, "skipping unreadable entry");
                    errors.push(error);
                }
            }
        }

        Ok(ScanResult { records, errors })
    }
}

/// Prune excluded and hidden directories; files always pass here
fn keep_directory(entry: &DirEntry, excluded: &str, include_hidden: bool) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }

    if entry.file_name() == excluded {
        return false;
    }

    include_hidden || !is_hidden(entry.path())
}

fn walk_error(error: walkdir::Error) -> ScanError {
    let path: PathBuf = error.path().map(|p| p.to_path_buf()).unwrap_or_default();
    let message = error.to_string();

    match error.into_io_error() {
        Some(io_error) if io_error.kind() == io::ErrorKind::PermissionDenied => {
            ScanError::PermissionDenied { path }
        }
        Some(source) => ScanError::ReadDirectory { path, source },
        None => ScanError::ReadDirectory {
            path,
            source: io::Error::new(io::ErrorKind::Other, message),
        },
    }
}
