//! File filtering logic for the scanner.

use crate::core::format;
use std::collections::HashSet;
use std::path::Path;

/// Decides which files the walker yields
#[derive(Debug, Clone)]
pub struct MediaFilter {
    /// File extensions to include (lowercase, no dot)
    extensions: HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl MediaFilter {
    /// Create a filter accepting every supported media extension
    pub fn new() -> Self {
        Self {
            extensions: format::supported_extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Check if a file should be included
    ///
    /// Only the last extension counts here: `clip.mov.bak` is not a media
    /// file for the walker, even though its name contains `.mov`.
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
