//! # Metadata Module
//!
//! Extracts capture timestamps from media files.
//!
//! ## Readers
//! - MOV / MP4 - `mvhd` creation time (seconds since 1904, UTC)
//! - JPEG / HEIC - EXIF `DateTimeOriginal`, falling back to `DateTime`
//! - PNG - date after an `eXIf` marker, falling back to XMP `CreateDate`
//! - CR3 / DNG - ASCII date at a fixed header offset
//!
//! ## Failure policy
//! Every reader reports problems through [`MetadataReader::read_capture_timestamp`].
//! Callers use [`MetadataReader::capture_timestamp`], which logs the error and
//! treats the file as undated. Timestamps before 1990 are discarded.
//!
//! ## Example
//! ```rust,ignore
//! use media_retag::core::metadata::{MetadataReader, ReaderFactory};
//! use media_retag::core::record::FileRecord;
//!
//! let record = FileRecord::new("/photos/IMG_0001.JPG");
//! let reader = ReaderFactory::create(&record)?;
//! if let Some(ts) = reader.capture_timestamp() {
//!     println!("captured {}", ts);
//! }
//! ```

mod embedded_exif;
mod png;
mod quicktime;
mod raw;
mod timestamp;
mod traits;

pub use embedded_exif::{HeicReader, JpegReader};
pub use png::{PngReader, XMP_NAMESPACE};
pub use quicktime::{QuickTimeReader, QUICKTIME_EPOCH_OFFSET};
pub use raw::{FixedOffsetReader, CR3_DATE_OFFSET, DNG_DATE_OFFSET, RAW_DATE_LEN};
pub use timestamp::{parse_exif_datetime, CaptureTimestamp, EXIF_DATETIME_FORMAT, MIN_CAPTURE_YEAR};
pub use traits::MetadataReader;

#[cfg(test)]
pub(crate) use embedded_exif::tests::jpeg as test_jpeg;

use crate::core::format::FormatTag;
use crate::core::record::FileRecord;
use crate::error::FormatError;
use std::path::Path;

/// Picks the reader for a file's format
pub struct ReaderFactory;

impl ReaderFactory {
    /// Create the reader for a record
    ///
    /// Fails only when the record's name has no supported extension.
    pub fn create(record: &FileRecord) -> Result<Box<dyn MetadataReader>, FormatError> {
        let format = record.format()?;
        Ok(Self::for_format(format, record.path()))
    }

    /// Create the reader for an already-classified path
    pub fn for_format(format: FormatTag, path: &Path) -> Box<dyn MetadataReader> {
        match format {
            FormatTag::Mov | FormatTag::Mp4 => Box::new(QuickTimeReader::new(path, format)),
            FormatTag::Jpeg => Box::new(JpegReader::new(path)),
            FormatTag::Png => Box::new(PngReader::new(path)),
            FormatTag::Heic => Box::new(HeicReader::new(path)),
            FormatTag::Cr3 => Box::new(FixedOffsetReader::cr3(path)),
            FormatTag::Dng => Box::new(FixedOffsetReader::dng(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::DETECTION_ORDER;

    #[test]
    fn factory_maps_every_tag_to_matching_reader() {
        for tag in DETECTION_ORDER {
            let reader = ReaderFactory::for_format(tag, Path::new("/media/file"));
            assert_eq!(reader.format(), tag);
            assert_eq!(reader.path(), Path::new("/media/file"));
        }
    }

    #[test]
    fn factory_uses_record_format() {
        let record = FileRecord::new("/media/holiday/CLIP.MP4");
        let reader = ReaderFactory::create(&record).unwrap();
        assert_eq!(reader.format(), FormatTag::Mp4);
    }

    #[test]
    fn factory_rejects_unsupported_record() {
        let record = FileRecord::new("/media/readme.txt");
        assert!(matches!(
            ReaderFactory::create(&record),
            Err(FormatError::UnsupportedFormat { .. })
        ));
    }
}
