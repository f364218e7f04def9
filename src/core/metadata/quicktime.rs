//! QuickTime-family (MOV, MP4) creation time from the `mvhd` atom.
//!
//! Top-level atoms are skipped until `moov`. Its first child must be the
//! movie header `mvhd`; a compressed movie (`cmov`) or any other first child
//! means no timestamp.

use super::timestamp::CaptureTimestamp;
use super::traits::MetadataReader;
use crate::core::format::FormatTag;
use crate::error::MetadataError;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Seconds between 1904-01-01T00:00:00Z and 1970-01-01T00:00:00Z
pub const QUICKTIME_EPOCH_OFFSET: i64 = 2_082_844_800;

const ATOM_HEADER_SIZE: u64 = 8;
const EXTENDED_HEADER_SIZE: u64 = 16;

/// Reads the movie header creation time of MOV and MP4 files
#[derive(Debug, Clone)]
pub struct QuickTimeReader {
    path: PathBuf,
    format: FormatTag,
}

impl QuickTimeReader {
    pub fn new(path: impl Into<PathBuf>, format: FormatTag) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }
}

impl MetadataReader for QuickTimeReader {
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

        let file = File::open(&self.path).map_err(io_error)?;
        let mut reader = BufReader::new(file);

        let Some(creation_time) = read_creation_time(&mut reader).map_err(io_error)? else {
            return Ok(None);
        };

        Ok(CaptureTimestamp::from_unix_local(
            creation_time - QUICKTIME_EPOCH_OFFSET,
        ))
    }
}

/// Raw creation time in seconds since the QuickTime epoch
pub(crate) fn read_creation_time<R: Read + Seek>(reader: &mut R) -> io::Result<Option<i64>> {
    if !seek_to_moov(reader)? {
        tracing::debug!("no moov atom found");
        return Ok(None);
    }

    let Some((_, kind)) = read_atom_header(reader)? else {
        tracing::debug!("moov atom is empty");
        return Ok(None);
    };

    match &kind {
        b"mvhd" => {}
        b"cmov" => {
            tracing::debug!("moov atom is compressed");
            return Ok(None);
        }
        other => {
            tracing::debug!(
                atom = %String::from_utf8_lossy(other),
                "expected mvhd as first moov child"
            );
            return Ok(None);
        }
    }

    let mut version_flags = [0u8; 4];
    if !read_fully(reader, &mut version_flags)? {
        return Ok(None);
    }

    // Version 1 headers carry 64-bit times.
    if version_flags[0] == 1 {
        let mut buf = [0u8; 8];
        if !read_fully(reader, &mut buf)? {
            return Ok(None);
        }
        return Ok(i64::try_from(u64::from_be_bytes(buf)).ok());
    }

    let mut buf = [0u8; 4];
    if !read_fully(reader, &mut buf)? {
        return Ok(None);
    }
    Ok(Some(i64::from(u32::from_be_bytes(buf))))
}

/// Skip top-level atoms until just past the `moov` header
fn seek_to_moov<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    loop {
        let Some((size, kind)) = read_atom_header(reader)? else {
            return Ok(false);
        };

        if &kind == b"moov" {
            return Ok(true);
        }

        let skip = match size {
            // Atom extends to end of file: nothing comes after it
            0 => return Ok(false),
            1 => {
                let mut buf = [0u8; 8];
                if !read_fully(reader, &mut buf)? {
                    return Ok(false);
                }
                let extended = u64::from_be_bytes(buf);
                if extended < EXTENDED_HEADER_SIZE {
                    tracing::debug!(size = extended, "malformed extended atom size");
                    return Ok(false);
                }
                extended - EXTENDED_HEADER_SIZE
            }
            s if u64::from(s) < ATOM_HEADER_SIZE => {
                tracing::debug!(size = s, "malformed atom size");
                return Ok(false);
            }
            s => u64::from(s) - ATOM_HEADER_SIZE,
        };

        let Ok(skip) = i64::try_from(skip) else {
            return Ok(false);
        };
        reader.seek(SeekFrom::Current(skip))?;
    }
}

fn read_atom_header<R: Read>(reader: &mut R) -> io::Result<Option<(u32, [u8; 4])>> {
    let mut header = [0u8; 8];
    if !read_fully(reader, &mut header)? {
        return Ok(None);
    }

    let size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let kind = [header[4], header[5], header[6], header[7]];
    Ok(Some((size, kind)))
}

/// Fill `buf` completely, returning `false` on a short read at end of file
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}
