//! Squarecrop Core - square crop region engine
//!
//! This crate holds the browser-independent part of the square cropper:
//! coordinate mapping, initial placement, drag handling, mask rendering and
//! the multi-image session, plus small helpers for file selection, header
//! probing and building the upload form.

pub mod config;
pub mod decode;
pub mod drag;
pub mod geometry;
pub mod placement;
pub mod render;
pub mod selection;
pub mod session;
pub mod upload;

pub use config::CropConfig;
pub use decode::{probe_image, DecodeError, ImageMetadata, Orientation};
pub use drag::{apply_drag, hit_test, DragController, DragState, Handle};
pub use geometry::{
    clamp_rect, display_to_source, source_to_display, CropRect, DisplayRect, DisplaySurface,
    ImageSize, Point,
};
pub use placement::initial_placement;
pub use render::{render_frame, CropFrame, MaskPolygon};
pub use selection::{format_file_size, FileEntry, Selection, SelectionError};
pub use session::{CropSession, FinishedCrop, NavOutcome, SessionError};
pub use upload::{crop_field_name, FormPart, UploadError, UploadManifest, FILE_FIELD};
