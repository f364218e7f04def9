//! # Format Module
//!
//! Classifies media files by filename.
//!
//! Detection is a case-insensitive *substring* match, not a suffix match:
//! `clip.MOV.backup` is still a MOV. The first matching marker wins, in the
//! order of [`DETECTION_ORDER`].
//!
//! This module also owns the table of supported extensions; the scanner's
//! extension filter is built from [`supported_extensions`].

use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported media kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatTag {
    /// QuickTime movie
    Mov,
    /// HEIF image (iPhone photos)
    Heic,
    /// JPEG image (.jpg, .jpeg)
    Jpeg,
    /// PNG image
    Png,
    /// MPEG-4 video
    Mp4,
    /// Canon raw
    Cr3,
    /// Adobe digital negative
    Dng,
}

/// Tags in the order their markers are tested.
pub const DETECTION_ORDER: [FormatTag; 7] = [
    FormatTag::Mov,
    FormatTag::Heic,
    FormatTag::Jpeg,
    FormatTag::Png,
    FormatTag::Mp4,
    FormatTag::Cr3,
    FormatTag::Dng,
];

const SUPPORTED_EXTENSIONS: &[&str] = &["mov", "heic", "jpg", "jpeg", "png", "mp4", "cr3", "dng"];

/// All extensions (lowercase, without the dot) that map to a tag
pub fn supported_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

impl FormatTag {
    /// Extensions (lowercase, without the dot) belonging to this tag
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FormatTag::Mov => &["mov"],
            FormatTag::Heic => &["heic"],
            FormatTag::Jpeg => &["jpg", "jpeg"],
            FormatTag::Png => &["png"],
            FormatTag::Mp4 => &["mp4"],
            FormatTag::Cr3 => &["cr3"],
            FormatTag::Dng => &["dng"],
        }
    }

    /// Classify a filename.
    pub fn detect(filename: &str) -> Result<Self, FormatError> {
        let lowered = filename.to_lowercase();

        DETECTION_ORDER
            .into_iter()
            .find(|tag| {
                tag.extensions()
                    .iter()
                    .any(|ext| lowered.contains(&format!(".{}", ext)))
            })
            .ok_or_else(|| FormatError::UnsupportedFormat {
                name: filename.to_string(),
            })
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatTag::Mov => write!(f, "MOV"),
            FormatTag::Heic => write!(f, "HEIC"),
            FormatTag::Jpeg => write!(f, "JPEG"),
            FormatTag::Png => write!(f, "PNG"),
            FormatTag::Mp4 => write!(f, "MP4"),
            FormatTag::Cr3 => write!(f, "CR3"),
            FormatTag::Dng => write!(f, "DNG"),
        }
    }
}
