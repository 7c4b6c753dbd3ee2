//! The ordered list of files picked or dropped by the user.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for selection changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The file is not an image and cannot be cropped.
    #[error("{name} is not an image ({mime})")]
    NotAnImage { name: String, mime: String },
}

/// Metadata of one selected file blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// MIME type as reported by the browser, e.g. `image/png`.
    #[serde(rename = "type", default)]
    pub mime: String,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, size: u64, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime: mime.into(),
        }
    }

    /// Whether the MIME type is an `image/*` type.
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    /// Human readable size, see [`format_file_size`].
    pub fn size_label(&self) -> String {
        format_file_size(self.size)
    }
}

/// Ordered file selection.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    entries: Vec<FileEntry>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single file at the end.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::NotAnImage` for non-image MIME types.
    pub fn push(&mut self, entry: FileEntry) -> Result<(), SelectionError> {
        if !entry.is_image() {
            return Err(SelectionError::NotAnImage {
                name: entry.name,
                mime: entry.mime,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Append files in order, skipping non-images. Returns how many were skipped.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = FileEntry>) -> usize {
        let mut skipped = 0;
        for entry in entries {
            if let Err(e) = self.push(entry) {
                log::warn!("skipping file: {}", e);
                skipped += 1;
            }
        }
        skipped
    }

    /// Remove and return the file at `index`.
    pub fn remove(&mut self, index: usize) -> Option<FileEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }
}

/// Format a byte count with base-1024 units, rounded to two decimals.
///
/// `0 -> "0 Bytes"`, `1536 -> "1.5 KB"`, `1048576 -> "1 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
