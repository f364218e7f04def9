//! Raw camera formats with the date at a fixed header offset.
//!
//! CR3 (ISO-BMFF) and DNG (TIFF) both carry their EXIF date somewhere in
//! their own box/IFD structure. The files in practice place it at a stable
//! byte offset, which is what is read here: 20 bytes of NUL-padded
//! `YYYY:MM:DD HH:MM:SS`. A different writer or firmware version can move
//! the field, in which case the read fails and the file is treated as
//! undated.

use super::timestamp::{parse_exif_datetime, CaptureTimestamp};
use super::traits::MetadataReader;
use crate::core::format::FormatTag;
use crate::error::MetadataError;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Byte offset of the CR3 date
pub const CR3_DATE_OFFSET: u64 = 524;
/// Byte offset of the DNG date
pub const DNG_DATE_OFFSET: u64 = 448;
/// Width of the date field
pub const RAW_DATE_LEN: u64 = 20;

/// Reads an ASCII date at a fixed offset
#[derive(Debug, Clone)]
pub struct FixedOffsetReader {
    path: PathBuf,
    format: FormatTag,
    offset: u64,
}

impl FixedOffsetReader {
    /// Reader for Canon CR3 files
    pub fn cr3(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: FormatTag::Cr3,
            offset: CR3_DATE_OFFSET,
        }
    }

    /// Reader for Adobe DNG files
    pub fn dng(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: FormatTag::Dng,
            offset: DNG_DATE_OFFSET,
        }
    }
}

impl MetadataReader for FixedOffsetReader {
    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> FormatTag {
        self.format
    }

    fn read_capture_timestamp(&self) -> Result<Option<CaptureTimestamp>, MetadataError> {
        let io_error = |source| MetadataError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = File::open(&self.path).map_err(io_error)?;
        file.seek(SeekFrom::Start(self.offset)).map_err(io_error)?;

        let mut raw = Vec::with_capacity(RAW_DATE_LEN as usize);
        file.take(RAW_DATE_LEN)
            .read_to_end(&mut raw)
            .map_err(io_error)?;

        let text = String::from_utf8(raw).map_err(|e| MetadataError::Malformed {
            path: self.path.clone(),
            reason: format!("date field at offset {} is not text: {}", self.offset, e),
        })?;

        parse_exif_datetime(&text)
            .map(|dt| Some(CaptureTimestamp::Naive(dt)))
            .ok_or_else(|| MetadataError::InvalidTimestamp {
                path: self.path.clone(),
                value: text.replace('\0', ""),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::TempDir;

    fn raw_file(dir: &TempDir, name: &str, offset: u64, field: &[u8]) -> PathBuf {
        let mut bytes = vec![0x42u8; offset as usize];
        bytes.extend_from_slice(field);
        bytes.extend_from_slice(&[0u8; 64]);

        let path = dir.path().join(name);
        File::create(&path).unwrap().write_all(&bytes).unwrap();
        path
    }

    fn expected(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> CaptureTimestamp {
        CaptureTimestamp::Naive(
            NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap(),
        )
    }

    #[test]
    fn cr3_reads_date_at_offset() {
        let dir = TempDir::new().unwrap();
        let path = raw_file(&dir, "IMG_0001.CR3", CR3_DATE_OFFSET, b"2023:04:05 06:07:08\0");

        let ts = FixedOffsetReader::cr3(&path).capture_timestamp();
        assert_eq!(ts, Some(expected(2023, 4, 5, 6, 7, 8)));
    }

    #[test]
    fn dng_reads_date_at_offset() {
        let dir = TempDir::new().unwrap();
        let path = raw_file(&dir, "IMG_0002.DNG", DNG_DATE_OFFSET, b"2017:11:12 13:14:15\0");

        let ts = FixedOffsetReader::dng(&path).capture_timestamp();
        assert_eq!(ts, Some(expected(2017, 11, 12, 13, 14, 15)));
    }

    #[test]
    fn garbage_at_offset_is_unknown() {
        let dir = TempDir::new().unwrap();
        let path = raw_file(&dir, "IMG_0003.CR3", CR3_DATE_OFFSET, b"ftypcrx \0\0\0\x01CanonCR3");

        let reader = FixedOffsetReader::cr3(&path);
        assert!(matches!(
            reader.read_capture_timestamp(),
            Err(MetadataError::InvalidTimestamp { .. })
        ));
        assert!(reader.capture_timestamp().is_none());
    }

    #[test]
    fn non_utf8_bytes_are_malformed() {
        let dir = TempDir::new().unwrap();
        let path = raw_file(&dir, "IMG_0004.DNG", DNG_DATE_OFFSET, &[0xFF; 20]);

        let reader = FixedOffsetReader::dng(&path);
        assert!(matches!(
            reader.read_capture_timestamp(),
            Err(MetadataError::Malformed { .. })
        ));
        assert!(reader.capture_timestamp().is_none());
    }

    #[test]
    fn file_shorter_than_offset_is_unknown() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.cr3");
        File::create(&path).unwrap().write_all(b"too short").unwrap();

        assert!(FixedOffsetReader::cr3(&path).capture_timestamp().is_none());
    }

    #[test]
    fn offsets_match_formats() {
        assert_eq!(FixedOffsetReader::cr3("a.cr3").offset, CR3_DATE_OFFSET);
        assert_eq!(FixedOffsetReader::dng("a.dng").offset, DNG_DATE_OFFSET);
        assert_eq!(FixedOffsetReader::cr3("a.cr3").format(), FormatTag::Cr3);
        assert_eq!(FixedOffsetReader::dng("a.dng").format(), FormatTag::Dng);
    }
}
