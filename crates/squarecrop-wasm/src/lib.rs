//! Squarecrop WASM - WebAssembly bindings for the square cropper
//!
//! This crate exposes the squarecrop-core session to the upload page.
//!
//! # Module Structure
//!
//! - `cropper` - `JsCropper`, the selection + crop session facade
//! - `probe` - Header probe for hosts that only hold raw bytes
//! - `logger` - `log` backend writing to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropper, set_log_level } from '@squarecrop/wasm';
//!
//! await init();
//! set_log_level('debug');
//! const cropper = new JsCropper();
//! ```

use wasm_bindgen::prelude::*;

mod cropper;
mod logger;
mod probe;

pub use cropper::{CropperError, FinishView, FrameView, JsCropper};
pub use probe::probe_image;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
}

/// Set the console log level: `off`, `error`, `warn`, `info`, `debug` or `trace`.
///
/// # Errors
/// Returns error for an unknown level name
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = logger::parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown log level: {}", level)))?;
    logger::init(filter);
    Ok(())
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
