// ABOUTME: Raw source buffer: a .rkt file loaded into a path plus its physical lines

use crate::error::SourceError;
use std::fs;
use std::path::Path;

/// Longest physical line the interpreter accepts, in bytes.
pub const MAX_LINE_BYTES: usize = 1024;

/// A loaded source file: the path it came from and its lines, LF-split with
/// no trailing newlines.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: String,
    lines: Vec<String>,
}

impl SourceFile {
    /// Read a `.rkt` file from disk. Rejects other suffixes, unreadable
    /// files, and lines longer than [`MAX_LINE_BYTES`].
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let display = path.display().to_string();

        if path.extension().and_then(|e| e.to_str()) != Some("rkt") {
            return Err(SourceError::NotRacketSource(display));
        }

        let contents = fs::read_to_string(path).map_err(|source| SourceError::Unreadable {
            path: display.clone(),
            source,
        })?;

        Self::from_text(&display, &contents)
    }

    /// Build a source buffer from in-memory text, applying the same line
    /// checks as [`SourceFile::load`]. The path is only used in diagnostics.
    pub fn from_text(path: &str, text: &str) -> Result<Self, SourceError> {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();

        for (index, line) in lines.iter().enumerate() {
            if line.len() > MAX_LINE_BYTES {
                return Err(SourceError::LineTooLong {
                    path: path.to_string(),
                    line: index + 1,
                });
            }
        }

        Ok(SourceFile {
            path: path.to_string(),
            lines,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
