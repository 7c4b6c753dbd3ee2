//! Header probe bindings.

use serde::Serialize;
use squarecrop_core::decode::{self, DecodeError, ImageMetadata};
use wasm_bindgen::prelude::*;

use crate::cropper::to_js;

/// Probe result as seen by JavaScript.
#[derive(Debug, Serialize)]
struct ProbeView {
    /// Stored dimensions
    width: u32,
    height: u32,
    /// EXIF orientation tag value (1-8)
    orientation: u8,
    format: Option<String>,
    /// Dimensions after orientation, the space crops are expressed in
    display_width: u32,
    display_height: u32,
}

fn probe(bytes: &[u8]) -> Result<ProbeView, DecodeError> {
    let meta: ImageMetadata = decode::probe_image(bytes)?;
    let size = meta.display_size().ok_or_else(|| {
        DecodeError::CorruptedFile(format!("image reports {}x{} pixels", meta.width, meta.height))
    })?;
    Ok(ProbeView {
        width: meta.width,
        height: meta.height,
        orientation: meta.orientation as u8,
        format: meta.format,
        display_width: size.width(),
        display_height: size.height(),
    })
}

/// Read an image's dimensions and EXIF orientation without decoding it.
///
/// # Arguments
///
/// * `bytes` - The raw file bytes as a `Uint8Array`
///
/// # Returns
///
/// `{ width, height, orientation, format, display_width, display_height }`.
/// Pass `display_width`/`display_height` to `JsCropper.image_loaded`.
///
/// # Errors
///
/// Returns an error for empty input, unrecognized formats, or truncated
/// headers.
#[wasm_bindgen]
pub fn probe_image(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let view = probe(bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_rejects_empty() {
        let err = probe(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Empty input");
    }

    #[test]
    fn test_probe_rejects_unknown_format() {
        let err = probe(b"plain text, not pixels").unwrap_err();
        assert_eq!(err, DecodeError::InvalidFormat);
    }

    // Complete 3x2 RGB PNG
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x02, 0x08, 0x02, 0x00, 0x00, 0x00, 0x12,
        0x16, 0xF1, 0x4D, 0x00, 0x00, 0x00, 0x0B, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x60,
        0xC0, 0x04, 0x00, 0x00, 0x14, 0x00, 0x01, 0x7D, 0xFE, 0x1E, 0xEE, 0x00, 0x00, 0x00, 0x00,
        0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn test_probe_tiny_png() {
        let view = probe(TINY_PNG).unwrap();
        assert_eq!((view.width, view.height), (3, 2));
        assert_eq!((view.display_width, view.display_height), (3, 2));
        assert_eq!(view.orientation, 1);
        assert_eq!(view.format.as_deref(), Some("png"));
    }
}
