//! Crop editor bindings.
//!
//! [`JsCropper`] owns the file selection and, once started, the crop
//! session over it. The page forwards DOM events (file input, image `load`
//! and `error`, pointer events relative to the display surface, navigation
//! buttons) and redraws from [`JsCropper::frame`] after each call.
//!
//! # Example
//!
//! ```typescript
//! import { JsCropper } from '@squarecrop/wasm';
//!
//! const cropper = new JsCropper({ max_display_width: 800 });
//! cropper.add_files([...input.files].map(f => ({ name: f.name, size: f.size, type: f.type })));
//! cropper.set_on_finish(result => upload(result.parts));
//!
//! const outcome = cropper.start(); // { status: "awaiting_metadata", index: 0 }
//! img.onload = () => { cropper.image_loaded(0, img.naturalWidth, img.naturalHeight); draw(cropper.frame()); };
//! ```

use serde::Serialize;
use squarecrop_core::{
    CropConfig, CropRect, CropSession, DisplayRect, DisplaySurface, FileEntry, FormPart,
    NavOutcome, Point, Selection, SessionError, UploadError, UploadManifest,
};
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Error types raised by the cropper facade.
#[derive(Debug, Error)]
pub enum CropperError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl From<CropperError> for JsValue {
    fn from(e: CropperError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// Serialize a value into a plain JS object.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// One selected file as listed on the page.
#[derive(Debug, Serialize)]
pub struct FileView<'a> {
    pub index: usize,
    pub name: &'a str,
    pub size: u64,
    /// e.g. `"1.5 KB"`
    pub size_label: String,
}

/// Everything needed to draw the editor for the active image.
#[derive(Debug, Serialize)]
pub struct FrameView {
    pub surface: DisplaySurface,
    pub crop_box: DisplayRect,
    /// CSS `clip-path` for the dimming overlay
    pub clip_path: String,
    /// Active rectangle in source pixels
    pub crop: CropRect,
    /// 1-based position of the active image
    pub position: usize,
    pub total: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub is_last: bool,
    pub dragging: bool,
}

/// Output of a finished session.
#[derive(Debug, Serialize)]
pub struct FinishView {
    /// Multipart plan; `file` parts index into `files`.
    pub parts: Vec<FormPart>,
    pub files: Vec<FileEntry>,
    /// Source-pixel crop per file, `undefined` where the service default applies
    pub crops: Vec<Option<CropRect>>,
}

/// Browser-facing crop editor.
#[wasm_bindgen]
pub struct JsCropper {
    selection: Selection,
    session: Option<CropSession<FileEntry>>,
    config: CropConfig,
    on_finish: Option<js_sys::Function>,
}

impl JsCropper {
    pub fn with_config(config: CropConfig) -> Self {
        Self {
            selection: Selection::new(),
            session: None,
            config: config.sanitized(),
            on_finish: None,
        }
    }

    /// Append files. Returns how many were skipped.
    ///
    /// A running session ends only if at least one file was appended.
    pub fn add_entries(&mut self, entries: Vec<FileEntry>) -> usize {
        let before = self.selection.len();
        let skipped = self.selection.extend(entries);
        if self.selection.len() > before {
            self.end_session("selection changed");
        }
        skipped
    }

    /// Remove a file, and its session slot when a session is running.
    pub fn remove_entry(&mut self, index: usize) -> NavOutcome {
        if self.selection.remove(index).is_none() {
            return NavOutcome::Unchanged;
        }
        match self.session.as_mut() {
            Some(session) => session.remove(index),
            None => NavOutcome::Unchanged,
        }
    }

    pub fn file_views(&self) -> Vec<FileView<'_>> {
        self.selection
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| FileView {
                index,
                name: &entry.name,
                size: entry.size,
                size_label: entry.size_label(),
            })
            .collect()
    }

    /// Begin a session over the current selection, replacing any running one.
    pub fn start_session(&mut self) -> Result<NavOutcome, CropperError> {
        let session = CropSession::begin(self.selection.entries().to_vec(), self.config)?;
        let outcome = session.outcome();
        self.session = Some(session);
        Ok(outcome)
    }

    pub fn session(&self) -> Option<&CropSession<FileEntry>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Result<&mut CropSession<FileEntry>, CropperError> {
        self.session
            .as_mut()
            .ok_or(CropperError::Session(SessionError::NotActive))
    }

    pub fn frame_view(&self) -> Option<FrameView> {
        let session = self.session.as_ref()?;
        let frame = session.frame()?;
        let crop = session.current_rect()?;
        let (position, total) = session.position();
        Some(FrameView {
            surface: frame.surface,
            crop_box: frame.crop_box,
            clip_path: frame.mask.to_css(),
            crop,
            position,
            total,
            has_previous: session.has_previous(),
            has_next: session.has_next(),
            is_last: session.is_last(),
            dragging: session.is_dragging(),
        })
    }

    /// Close the session and build the upload plan.
    pub fn finish_session(&mut self) -> Result<FinishView, CropperError> {
        let session = self
            .session
            .take()
            .ok_or(CropperError::Session(SessionError::NotActive))?;
        let manifest = UploadManifest::new(session.finish()?);
        let parts = manifest.form_parts()?;

        let (files, crops) = manifest
            .into_items()
            .into_iter()
            .map(|item| (item.handle, item.crop))
            .unzip();
        Ok(FinishView {
            parts,
            files,
            crops,
        })
    }

    fn end_session(&mut self, reason: &str) {
        if self.session.take().is_some() {
            log::info!("crop session discarded: {}", reason);
        }
    }
}

#[wasm_bindgen]
impl JsCropper {
    /// Create a cropper.
    ///
    /// # Arguments
    /// * `config` - Optional partial `CropConfig` object; `undefined` or
    ///   `null` selects the defaults
    ///
    /// # Errors
    /// Returns error if the config object cannot be deserialized
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsCropper, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            CropConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        Ok(JsCropper::with_config(config))
    }

    /// Append `{ name, size, type }` objects. Non-images are skipped.
    ///
    /// Changing the selection discards a running session. Returns the
    /// number of skipped files.
    pub fn add_files(&mut self, files: JsValue) -> Result<usize, JsValue> {
        let entries: Vec<FileEntry> = serde_wasm_bindgen::from_value(files)
            .map_err(|e| JsValue::from_str(&format!("Invalid file list: {}", e)))?;
        Ok(self.add_entries(entries))
    }

    /// Remove the file at `index`. Returns a navigation outcome.
    pub fn remove_file(&mut self, index: usize) -> Result<JsValue, JsValue> {
        to_js(&self.remove_entry(index))
    }

    /// Remove every file and discard the session.
    pub fn clear(&mut self) {
        self.end_session("selection cleared");
        self.selection.clear();
    }

    #[wasm_bindgen(getter)]
    pub fn file_count(&self) -> usize {
        self.selection.len()
    }

    /// `[{ index, name, size, size_label }]` in selection order.
    pub fn files(&self) -> Result<JsValue, JsValue> {
        to_js(&self.file_views())
    }

    #[wasm_bindgen(getter)]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Start cropping the current selection at the first image.
    ///
    /// # Errors
    /// Returns error if no file is selected
    pub fn start(&mut self) -> Result<JsValue, JsValue> {
        let outcome = self.start_session()?;
        to_js(&outcome)
    }

    /// Discard the session without emitting anything.
    pub fn cancel(&mut self) {
        self.end_session("cancelled");
    }

    /// Index of the image whose dimensions are awaited, if any.
    pub fn awaiting(&self) -> Option<usize> {
        self.session.as_ref().and_then(|s| s.awaiting())
    }

    /// Report natural dimensions of image `index` (in EXIF-oriented pixels).
    pub fn image_loaded(&mut self, index: usize, width: u32, height: u32) -> Result<JsValue, JsValue> {
        let outcome = self
            .session_mut()?
            .image_loaded(index, width, height)
            .map_err(CropperError::from)?;
        to_js(&outcome)
    }

    /// Report that image `index` could not be decoded.
    pub fn image_failed(&mut self, index: usize, message: String) -> Result<JsValue, JsValue> {
        let outcome = self
            .session_mut()?
            .image_failed(index, message)
            .map_err(CropperError::from)?;
        to_js(&outcome)
    }

    /// Error message recorded for image `index`.
    pub fn failure(&self, index: usize) -> Option<String> {
        self.session
            .as_ref()
            .and_then(|s| s.failure(index))
            .map(str::to_string)
    }

    pub fn goto(&mut self, index: usize) -> Result<JsValue, JsValue> {
        let outcome = self.session_mut()?.goto(index);
        to_js(&outcome)
    }

    pub fn next(&mut self) -> Result<JsValue, JsValue> {
        let outcome = self.session_mut()?.next();
        to_js(&outcome)
    }

    pub fn previous(&mut self) -> Result<JsValue, JsValue> {
        let outcome = self.session_mut()?.previous();
        to_js(&outcome)
    }

    /// Start a gesture at display coordinates. Returns the handle name
    /// (`"move"`, `"nw"`, `"ne"`, `"sw"`, `"se"`) or `undefined` on a miss.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<String> {
        let session = self.session.as_mut()?;
        session
            .pointer_down(Point::new(x, y))
            .map(|handle| handle.as_str().to_string())
    }

    /// Returns whether the crop changed and a redraw is needed.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.pointer_move(Point::new(x, y)))
    }

    pub fn pointer_up(&mut self) -> Option<String> {
        self.session
            .as_mut()
            .and_then(|session| session.pointer_up())
            .map(|handle| handle.as_str().to_string())
    }

    /// Abort the gesture (e.g. on Escape) and restore its starting crop.
    pub fn cancel_drag(&mut self) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.cancel_drag())
    }

    /// Current frame, or `null` while no image is ready.
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        match self.frame_view() {
            Some(view) => to_js(&view),
            None => Ok(JsValue::NULL),
        }
    }

    /// Register the completion callback; it receives the `finish` result.
    pub fn set_on_finish(&mut self, callback: js_sys::Function) {
        self.on_finish = Some(callback);
    }

    /// Save the active crop, end the session and return
    /// `{ parts, files, crops }`.
    ///
    /// # Errors
    /// Returns error if no session is running, every image was removed, or
    /// the completion callback throws
    pub fn finish(&mut self) -> Result<JsValue, JsValue> {
        let view = self.finish_session()?;
        let value = to_js(&view)?;
        if let Some(callback) = &self.on_finish {
            callback.call1(&JsValue::NULL, &value)?;
        }
        Ok(value)
    }
}
