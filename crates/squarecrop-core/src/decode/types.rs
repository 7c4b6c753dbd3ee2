//! Core types for image probing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::ImageSize;

/// Error types for image probing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image header is corrupted, truncated, or reports zero dimensions.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// No bytes were provided.
    #[error("Empty input")]
    EmptyInput,
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Flip horizontal + rotate 270 CW.
    Transpose = 5,
    Rotate90CW = 6,
    /// Flip horizontal + rotate 90 CW.
    Transverse = 7,
    Rotate270CW = 8,
}

impl Orientation {
    /// Whether the browser shows this image with width and height exchanged.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Header facts about an image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    /// Stored width in pixels, before orientation.
    pub width: u32,
    /// Stored height in pixels, before orientation.
    pub height: u32,
    pub orientation: Orientation,
    /// Canonical extension of the detected format, e.g. `"jpg"`.
    pub format: Option<String>,
}

impl ImageMetadata {
    /// Dimensions as displayed, i.e. with EXIF orientation applied.
    ///
    /// This is the pixel space crop rectangles are expressed in. `None` when
    /// either stored dimension is zero.
    pub fn display_size(&self) -> Option<ImageSize> {
        if self.orientation.swaps_dimensions() {
            ImageSize::new(self.height, self.width)
        } else {
            ImageSize::new(self.width, self.height)
        }
    }
}
