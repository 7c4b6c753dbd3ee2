//! Header probe built on the `image` and `kamadak-exif` crates.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::ImageReader;

use super::types::{DecodeError, ImageMetadata, Orientation};

/// Read dimensions, format and EXIF orientation without decoding pixels.
///
/// # Errors
///
/// Returns `DecodeError::EmptyInput` for an empty slice.
/// Returns `DecodeError::InvalidFormat` if the format cannot be detected.
/// Returns `DecodeError::CorruptedFile` if the header is unreadable or
/// reports a zero dimension.
pub fn probe_image(bytes: &[u8]) -> Result<ImageMetadata, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = reader.format().ok_or(DecodeError::InvalidFormat)?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if width == 0 || height == 0 {
        return Err(DecodeError::CorruptedFile(format!(
            "image reports {}x{} pixels",
            width, height
        )));
    }

    let metadata = ImageMetadata {
        width,
        height,
        orientation: read_orientation(bytes),
        format: format.extensions_str().first().map(|ext| ext.to_string()),
    };
    log::debug!(
        "probed {:?} image {}x{} ({:?})",
        metadata.format,
        width,
        height,
        metadata.orientation
    );
    Ok(metadata)
}

/// EXIF orientation of a JPEG, PNG, TIFF, HEIF or WebP container.
///
/// Returns `Orientation::Normal` when there is no EXIF block or no
/// orientation tag.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from)
        .unwrap_or_default()
}
