//! PNG capture dates.
//!
//! Two passes, both heuristic:
//!
//! 1. Walk 4-byte windows from offset 2 looking for an `eXIf` marker. The
//!    date sits at a fixed 658 bytes past the marker as 26 bytes of
//!    `YYYY:MM:DD HH:MM:SS` NUL `±HH:MM`, which is where the files this tool
//!    was built against place it. Chunk length fields are not consulted.
//! 2. Otherwise search the raw bytes for an `<x:xmpmeta>` packet and read its
//!    `xmp:CreateDate`.

use super::timestamp::{CaptureTimestamp, EXIF_DATETIME_FORMAT};
use super::traits::MetadataReader;
use crate::core::format::FormatTag;
use crate::error::MetadataError;
use chrono::{DateTime, NaiveDateTime};
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const SCAN_START: u64 = 2;
const EXIF_MARKER: &[u8; 4] = b"eXIf";
const EXIF_DATE_SKIP: i64 = 658;
const EXIF_DATE_LEN: usize = 26;

/// Adobe XMP basic schema
pub const XMP_NAMESPACE: &str = "http://ns.adobe.com/xap/1.0/";

static XMP_PACKET: LazyLock<BytesRegex> =
    LazyLock::new(|| BytesRegex::new(r"(?s)<x:xmpmeta.*?</x:xmpmeta>").unwrap());

static XMP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"xmlns:([A-Za-z_][\w.-]*)\s*=\s*["']http://ns\.adobe\.com/xap/1\.0/["']"#)
        .unwrap()
});

/// Reads capture dates from PNG files
#[derive(Debug, Clone)]
pub struct PngReader {
    path: PathBuf,
}

impl PngReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataReader for PngReader {
    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> FormatTag {
        FormatTag::Png
    }

    fn read_capture_timestamp(&self) -> Result<Option<CaptureTimestamp>, MetadataError> {
        let io_error = |source| MetadataError::Io {
            path: self.path.clone(),
            source,
        };

        let file = File::open(&self.path).map_err(io_error)?;
        let mut reader = BufReader::new(file);

        if let Some(ts) = scan_exif_marker(&mut reader).map_err(io_error)? {
            return Ok(Some(ts));
        }

        reader.seek(SeekFrom::Start(0)).map_err(io_error)?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data).map_err(io_error)?;

        let Some(value) = xmp_create_date(&data) else {
            tracing::debug!(path = %self.path.display(), "no eXIf date or XMP CreateDate");
            return Ok(None);
        };

        parse_xmp_date(&value)
            .map(Some)
            .ok_or_else(|| MetadataError::InvalidTimestamp {
                path: self.path.clone(),
                value,
            })
    }
}

/// Pass 1: fixed-offset date after an aligned `eXIf` marker
pub(crate) fn scan_exif_marker<R: Read + Seek>(
    reader: &mut R,
) -> io::Result<Option<CaptureTimestamp>> {
    reader.seek(SeekFrom::Start(SCAN_START))?;

    let mut window = [0u8; 4];
    loop {
        let n = read_up_to(reader, &mut window)?;
        if n == 0 {
            return Ok(None);
        }
        if n == window.len() && &window == EXIF_MARKER {
            break;
        }
    }

    reader.seek(SeekFrom::Current(EXIF_DATE_SKIP))?;
    let mut raw = [0u8; EXIF_DATE_LEN];
    let n = read_up_to(reader, &mut raw)?;

    let parsed = parse_exif_chunk_date(&raw[..n]);
    if parsed.is_none() {
        tracing::debug!(
            raw = %String::from_utf8_lossy(&raw[..n]),
            "eXIf marker found but date did not parse"
        );
    }
    Ok(parsed)
}

/// Parse `YYYY:MM:DD HH:MM:SS ±HH:MM` with NULs standing in for spaces
fn parse_exif_chunk_date(raw: &[u8]) -> Option<CaptureTimestamp> {
    let text = std::str::from_utf8(raw).ok()?.replace('\0', " ");
    let text = text.trim();

    for format in ["%Y:%m:%d %H:%M:%S %:z", "%Y:%m:%d %H:%M:%S %z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(CaptureTimestamp::Zoned(dt));
        }
    }

    text.get(..19)
        .and_then(|head| NaiveDateTime::parse_from_str(head, EXIF_DATETIME_FORMAT).ok())
        .map(CaptureTimestamp::Naive)
}

/// Pass 2: `CreateDate` from the first XMP packet, element or attribute form
pub(crate) fn xmp_create_date(data: &[u8]) -> Option<String> {
    let packet = XMP_PACKET.find(data)?;
    let xml = String::from_utf8_lossy(packet.as_bytes());

    XMP_PREFIX.captures_iter(&xml).find_map(|caps| {
        let prefix = regex::escape(&caps[1]);
        let element = Regex::new(&format!(
            r"<{prefix}:CreateDate(?:\s[^>]*)?>\s*([^<]*?)\s*</{prefix}:CreateDate>"
        ))
        .ok()?;
        let attribute =
            Regex::new(&format!(r#"\b{prefix}:CreateDate\s*=\s*["']([^"']*)["']"#)).ok()?;

        element
            .captures(&xml)
            .or_else(|| attribute.captures(&xml))
            .map(|c| c[1].trim().to_string())
    })
}

fn parse_xmp_date(value: &str) -> Option<CaptureTimestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(CaptureTimestamp::Zoned(dt));
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(CaptureTimestamp::Naive)
}

/// Read until `buf` is full or the stream ends
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
