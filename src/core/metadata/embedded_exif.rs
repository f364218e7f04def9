//! EXIF-backed readers for JPEG and HEIC.
//!
//! kamadak-exif locates the EXIF block in both containers (APP1 segment for
//! JPEG, the `Exif` item of the ISO-BMFF box tree for HEIC), so both formats
//! share one tag lookup: `DateTimeOriginal`, falling back to `DateTime`.

use super::timestamp::{parse_exif_datetime, CaptureTimestamp};
use super::traits::MetadataReader;
use crate::core::format::FormatTag;
use crate::error::MetadataError;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Tags consulted, most specific first
const DATE_TAGS: [Tag; 2] = [Tag::DateTimeOriginal, Tag::DateTime];

/// Reads EXIF capture dates from JPEG files
#[derive(Debug, Clone)]
pub struct JpegReader {
    path: PathBuf,
}

impl JpegReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataReader for JpegReader {
    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> FormatTag {
        FormatTag::Jpeg
    }

    fn read_capture_timestamp(&self) -> Result<Option<CaptureTimestamp>, MetadataError> {
        read_exif_timestamp(&self.path)
    }
}

/// Reads EXIF capture dates embedded in HEIC containers
#[derive(Debug, Clone)]
pub struct HeicReader {
    path: PathBuf,
}

impl HeicReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataReader for HeicReader {
    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> FormatTag {
        FormatTag::Heic
    }

    fn read_capture_timestamp(&self) -> Result<Option<CaptureTimestamp>, MetadataError> {
        read_exif_timestamp(&self.path)
    }
}

fn read_exif_timestamp(path: &Path) -> Result<Option<CaptureTimestamp>, MetadataError> {
    let file = File::open(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut bufreader = BufReader::new(file);
    let exif = match Reader::new().read_from_container(&mut bufreader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => {
            tracing::debug!(path = %path.display(), "no EXIF block");
            return Ok(None);
        }
        Err(source) => {
            return Err(MetadataError::Exif {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    find_date_tag(&exif, path)
}

/// Parse the first date tag that holds a usable value
///
/// A tag that is missing, not ASCII, or blank is passed over so the next
/// tag still gets a chance. If every present value fails to parse, the
/// first one is reported.
fn find_date_tag(exif: &Exif, path: &Path) -> Result<Option<CaptureTimestamp>, MetadataError> {
    let mut invalid = None;

    for tag in DATE_TAGS {
        let Some(raw) = exif
            .get_field(tag, In::PRIMARY)
            .and_then(|field| ascii_value(&field.value))
            .filter(|raw| !raw.is_empty())
        else {
            continue;
        };

        match parse_exif_datetime(&raw) {
            Some(dt) => return Ok(Some(CaptureTimestamp::Naive(dt))),
            None => {
                invalid.get_or_insert(raw);
            }
        }
    }

    match invalid {
        Some(value) => Err(MetadataError::InvalidTimestamp {
            path: path.to_path_buf(),
            value,
        }),
        None => Ok(None),
    }
}

/// Helper to extract string from EXIF ASCII value
fn ascii_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            let s = String::from_utf8_lossy(bytes);
            return Some(s.trim_end_matches('\0').trim().to_string());
        }
    }
    None
}
