//! Header-only image probing.
//!
//! Browsers decode images themselves and report natural dimensions, so the
//! crop engine never needs pixels. Hosts that only hold raw bytes use
//! [`probe_image`] to read the container header and the EXIF orientation,
//! which is enough to start a crop session.

mod probe;
mod types;

pub use probe::{probe_image, read_orientation};
pub use types::{DecodeError, ImageMetadata, Orientation};
