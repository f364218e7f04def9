//! # Scanner Module
//!
//! Discovers media files in a directory tree.
//!
//! ## Rules
//! - Recursive, sorted by file name within each directory
//! - Only files whose last extension is a supported media extension
//! - The undated holding directory (`_NotDated` by default) is never entered
//! - Hidden files and directories are skipped unless configured otherwise
//!
//! ## Example
//! ```rust,ignore
//! use media_retag::core::scanner::{ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! for record in scanner.fetch("/Users/me/Pictures".as_ref())? {
//!     println!("{}", record?.path().display());
//! }
//! ```

mod filter;
mod walker;

pub use filter::MediaFilter;
pub use walker::{ScanConfig, WalkDirScanner, DEFAULT_UNDATED_DIR};

use crate::core::record::FileRecord;
use crate::error::ScanError;

/// Result of a full scan
#[derive(Debug)]
pub struct ScanResult {
    /// Discovered media files, in walk order
    pub records: Vec<FileRecord>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}
