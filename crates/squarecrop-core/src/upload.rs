//! Multipart field plan for submitting a finished crop session.
//!
//! The processing service expects one `files` part per image, in selection
//! order, and an optional `crop_{index}` text part holding the square in
//! source pixels as JSON. Images without a `crop_{index}` part get the
//! service's own center crop.

use serde::Serialize;
use thiserror::Error;

use crate::session::FinishedCrop;

/// Form field carrying the image blobs.
pub const FILE_FIELD: &str = "files";

/// Error types for building the upload form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Failed to serialize crop: {0}")]
    Serialize(String),
}

/// Name of the text field holding the crop of image `index`.
pub fn crop_field_name(index: usize) -> String {
    format!("crop_{}", index)
}

/// One part of the multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormPart {
    /// The blob of image `index`, sent under [`FILE_FIELD`].
    File { index: usize },
    Text { name: String, value: String },
}

/// Ordered images and their crops, ready to become a form body.
#[derive(Debug, Clone)]
pub struct UploadManifest<H> {
    items: Vec<FinishedCrop<H>>,
}

impl<H> UploadManifest<H> {
    pub fn new(items: Vec<FinishedCrop<H>>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[FinishedCrop<H>] {
        &self.items
    }

    /// Number of images that carry an explicit crop.
    pub fn cropped_count(&self) -> usize {
        self.items.iter().filter(|item| item.crop.is_some()).count()
    }

    /// All file parts first, then one text part per cropped image.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Serialize` if a crop cannot be encoded as JSON.
    pub fn form_parts(&self) -> Result<Vec<FormPart>, UploadError> {
        let mut parts: Vec<FormPart> = (0..self.items.len())
            .map(|index| FormPart::File { index })
            .collect();

        for (index, item) in self.items.iter().enumerate() {
            if let Some(crop) = &item.crop {
                let value = serde_json::to_string(crop)
                    .map_err(|e| UploadError::Serialize(e.to_string()))?;
                parts.push(FormPart::Text {
                    name: crop_field_name(index),
                    value,
                });
            }
        }

        log::debug!(
            "upload form: {} files, {} crops",
            self.items.len(),
            parts.len() - self.items.len()
        );
        Ok(parts)
    }

    pub fn into_items(self) -> Vec<FinishedCrop<H>> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CropRect;

    fn finished(handle: &'static str, crop: Option<CropRect>) -> FinishedCrop<&'static str> {
        FinishedCrop { handle, crop }
    }

    #[test]
    fn test_crop_field_name() {
        assert_eq!(crop_field_name(0), "crop_0");
        assert_eq!(crop_field_name(12), "crop_12");
    }

    #[test]
    fn test_files_precede_crops() {
        let manifest = UploadManifest::new(vec![
            finished("a", Some(CropRect::square(500.0, 0.0, 1000.0))),
            finished("b", None),
            finished("c", Some(CropRect::square(0.0, 0.0, 250.5))),
        ]);
        let parts = manifest.form_parts().unwrap();

        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], FormPart::File { index: 0 });
        assert_eq!(parts[1], FormPart::File { index: 1 });
        assert_eq!(parts[2], FormPart::File { index: 2 });
        assert_eq!(
            parts[3],
            FormPart::Text {
                name: "crop_0".to_string(),
                value: r#"{"x":500.0,"y":0.0,"width":1000.0,"height":1000.0}"#.to_string(),
            }
        );
        assert!(matches!(&parts[4], FormPart::Text { name, .. } if name == "crop_2"));
        assert_eq!(manifest.cropped_count(), 2);
    }

    #[test]
    fn test_crop_value_parses_back() {
        let rect = CropRect::square(12.25, 40.0, 300.0);
        let manifest = UploadManifest::new(vec![finished("only", Some(rect))]);
        let parts = manifest.form_parts().unwrap();
        let FormPart::Text { value, .. } = &parts[1] else {
            panic!("expected a text part");
        };
        let json: serde_json::Value = serde_json::from_str(value).unwrap();
        assert_eq!(json["x"], 12.25);
        assert_eq!(json["y"], 40.0);
        assert_eq!(json["width"], 300.0);
        assert_eq!(json["height"], 300.0);
    }

    #[test]
    fn test_no_crops_sends_only_files() {
        let manifest = UploadManifest::new(vec![finished("a", None), finished("b", None)]);
        let parts = manifest.form_parts().unwrap();
        assert_eq!(
            parts,
            vec![FormPart::File { index: 0 }, FormPart::File { index: 1 }]
        );
        assert_eq!(manifest.cropped_count(), 0);
    }

    #[test]
    fn test_form_part_serialization() {
        let json = serde_json::to_value(FormPart::File { index: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "file", "index": 3}));
        let json = serde_json::to_value(FormPart::Text {
            name: "crop_1".to_string(),
            value: "{}".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "text", "name": "crop_1", "value": "{}"})
        );
    }
}
