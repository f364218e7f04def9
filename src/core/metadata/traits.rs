//! Trait definitions for metadata readers.

use super::timestamp::CaptureTimestamp;
use crate::core::format::FormatTag;
use crate::error::MetadataError;
use std::path::Path;

/// Extracts the capture timestamp from one media file
///
/// A reader is bound to a single path when it is created and holds no
/// other state, so readers for different files can run on different
/// threads.
pub trait MetadataReader: Send + Sync {
    /// The file this reader is bound to
    fn path(&self) -> &Path;

    /// The format this reader understands
    fn format(&self) -> FormatTag;

    /// Read the embedded timestamp, surfacing every failure
    ///
    /// `Ok(None)` means the file was readable but carries no timestamp.
    fn read_capture_timestamp(&self) -> Result<Option<CaptureTimestamp>, MetadataError>;

    /// Read the embedded timestamp, degrading every failure to `None`
    ///
    /// Errors are logged with the file path. Values before
    /// [`MIN_CAPTURE_YEAR`](super::MIN_CAPTURE_YEAR) are discarded.
    fn capture_timestamp(&self) -> Option<CaptureTimestamp> {
        match self.read_capture_timestamp() {
            Ok(Some(ts)) if ts.is_plausible() => Some(ts),
            Ok(Some(ts)) => {
                tracing::debug!(
                    path = %self.path().display(),
                    timestamp = %ts,
                    "discarding implausible capture timestamp"
                );
                None
            }
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(
                    path = %self.path().display(),
                    format = %self.format(),
                    %error,
                    "could not read capture timestamp"
                );
                None
            }
        }
    }
}
