//! Geometry engine for square crop regions.
//!
//! Two coordinate spaces are involved:
//!
//! - **Source pixels**: the intrinsic resolution of the decoded image. Crop
//!   rectangles are always stored in this space.
//! - **Display pixels**: the scaled-down surface the image is drawn into.
//!   Pointer positions and on-screen boxes live in this space.
//!
//! The display surface always exactly fills its container, so conversion
//! between the two spaces is a single uniform scale factor
//! (`surface.width / image.width`) with no letterboxing offset.
//!
//! # Invariants
//!
//! After [`clamp_rect`] a [`CropRect`] is square, lies inside the image and
//! is at least [`MIN_CROP_SIZE`] wide. Every mutation of a crop rectangle is
//! followed by a clamp, so out-of-range values are a normal input rather
//! than an error.

use serde::{Deserialize, Serialize};

/// Smallest crop edge, in source pixels.
pub const MIN_CROP_SIZE: f64 = 1.0;

/// Tolerance used when checking invariants on floating-point rectangles.
pub const EPSILON: f64 = 1e-9;

/// Intrinsic dimensions of a decoded image, in source pixels.
///
/// Both dimensions are guaranteed to be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ImageSize {
    width: u32,
    height: u32,
}

impl ImageSize {
    /// Create an image size, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }

    /// Image width in source pixels.
    #[inline]
    pub fn width(self) -> u32 {
        self.width
    }

    /// Image height in source pixels.
    #[inline]
    pub fn height(self) -> u32 {
        self.height
    }

    /// Landscape or square (`width >= height`).
    #[inline]
    pub fn is_landscape(self) -> bool {
        self.width >= self.height
    }

    /// Length of the shorter edge; the largest square crop that fits.
    #[inline]
    pub fn min_edge(self) -> u32 {
        self.width.min(self.height)
    }
}

/// A 2D point. Used for both source and display coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Square crop region in source-pixel coordinates.
///
/// The fields are public so callers can restore stored data, but anything
/// coming from outside should be passed through [`clamp_rect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A square with its top-left corner at (`x`, `y`).
    pub fn square(x: f64, y: f64, size: f64) -> Self {
        Self::new(x, y, size, size)
    }

    /// X coordinate of the right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Y coordinate of the bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Return a copy with all invariants re-established for `image`.
    pub fn clamped(mut self, image: ImageSize) -> Self {
        clamp_rect(&mut self, image);
        self
    }

    /// Check the square, bounds and minimum-size invariants against `image`.
    pub fn is_valid_for(&self, image: ImageSize) -> bool {
        let max_size = f64::from(image.min_edge());
        self.width == self.height
            && self.width >= MIN_CROP_SIZE
            && self.width <= max_size
            && self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= f64::from(image.width()) + EPSILON
            && self.bottom() <= f64::from(image.height()) + EPSILON
    }
}

/// Axis-aligned rectangle in display-pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    /// Whether `point` lies inside the rectangle, edges included.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

/// The on-screen surface an image is scaled into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySurface {
    pub width: f64,
    pub height: f64,
}

impl DisplaySurface {
    /// Fit `image` inside `max_width` x `max_height`, preserving aspect ratio.
    ///
    /// Images are never upscaled. Dimensions are truncated to whole display
    /// pixels, the same way a canvas backing store truncates its size.
    pub fn fit(image: ImageSize, max_width: f64, max_height: f64) -> Self {
        let src_w = f64::from(image.width());
        let src_h = f64::from(image.height());

        let scale = (max_width / src_w).min(max_height / src_h).min(1.0);
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };

        Self {
            width: (src_w * scale).floor().max(1.0),
            height: (src_h * scale).floor().max(1.0),
        }
    }

    /// Display pixels per source pixel.
    #[inline]
    pub fn scale(&self, image: ImageSize) -> f64 {
        self.width / f64::from(image.width())
    }
}

/// Project a source-pixel crop rectangle onto the display surface.
pub fn source_to_display(rect: &CropRect, surface: &DisplaySurface, image: ImageSize) -> DisplayRect {
    let scale = surface.scale(image);
    DisplayRect {
        left: rect.x * scale,
        top: rect.y * scale,
        width: rect.width * scale,
        height: rect.height * scale,
    }
}

/// Project a source-pixel point onto the display surface.
pub fn source_point_to_display(point: Point, surface: &DisplaySurface, image: ImageSize) -> Point {
    let scale = surface.scale(image);
    Point::new(point.x * scale, point.y * scale)
}

/// Convert a display-pixel point (or delta) back to source pixels.
pub fn display_to_source(point: Point, surface: &DisplaySurface, image: ImageSize) -> Point {
    let scale = surface.scale(image);
    Point::new(point.x / scale, point.y / scale)
}

/// Re-establish the crop invariants for `image`, in place.
///
/// Order matters: the size is fixed first, then the position is clamped
/// against the remaining room.
///
/// 1. `width` clamped to `[MIN_CROP_SIZE, min(image.width, image.height)]`
/// 2. `height = width`
/// 3. `x` clamped to `[0, image.width - width]`
/// 4. `y` clamped to `[0, image.height - height]`
///
/// Non-finite fields are treated as saturating: `NaN` width becomes the
/// largest square, `NaN` position becomes 0. The function is idempotent.
pub fn clamp_rect(rect: &mut CropRect, image: ImageSize) {
    let max_size = f64::from(image.min_edge());

    rect.width = clamp_or(rect.width, MIN_CROP_SIZE, max_size, max_size);
    rect.height = rect.width;

    let max_x = f64::from(image.width()) - rect.width;
    let max_y = f64::from(image.height()) - rect.height;
    rect.x = clamp_or(rect.x, 0.0, max_x, 0.0);
    rect.y = clamp_or(rect.y, 0.0, max_y, 0.0);
}

/// `value.clamp(min, max)`, substituting `fallback` for NaN.
#[inline]
fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> ImageSize {
        ImageSize::new(w, h).unwrap()
    }

    #[test]
    fn test_image_size_rejects_zero() {
        assert!(ImageSize::new(0, 10).is_none());
        assert!(ImageSize::new(10, 0).is_none());
        assert!(ImageSize::new(1, 1).is_some());
    }

    #[test]
    fn test_image_size_orientation() {
        assert!(size(200, 100).is_landscape());
        assert!(size(100, 100).is_landscape());
        assert!(!size(100, 200).is_landscape());
        assert_eq!(size(300, 120).min_edge(), 120);
    }

    #[test]
    fn test_surface_fit_landscape() {
        let surface = DisplaySurface::fit(size(2000, 1000), 800.0, 600.0);
        assert_eq!(surface.width, 800.0);
        assert_eq!(surface.height, 400.0);
    }

    #[test]
    fn test_surface_fit_portrait() {
        let surface = DisplaySurface::fit(size(1000, 2000), 800.0, 600.0);
        assert_eq!(surface.width, 300.0);
        assert_eq!(surface.height, 600.0);
    }

    #[test]
    fn test_surface_never_upscales() {
        let surface = DisplaySurface::fit(size(500, 500), 800.0, 600.0);
        assert_eq!(surface.width, 500.0);
        assert_eq!(surface.height, 500.0);
        assert_eq!(surface.scale(size(500, 500)), 1.0);
    }

    #[test]
    fn test_surface_truncates_fractional_pixels() {
        // 1000x3 at scale 0.8 -> 800 x 2.4 -> 800 x 2
        let surface = DisplaySurface::fit(size(1000, 3), 800.0, 600.0);
        assert_eq!(surface.width, 800.0);
        assert_eq!(surface.height, 2.0);
    }

    #[test]
    fn test_surface_minimum_one_pixel() {
        let surface = DisplaySurface::fit(size(10_000, 1), 800.0, 600.0);
        assert_eq!(surface.height, 1.0);
    }

    #[test]
    fn test_source_to_display_scales_uniformly() {
        let image = size(2000, 1000);
        let surface = DisplaySurface::fit(image, 800.0, 600.0);
        let rect = CropRect::square(500.0, 0.0, 1000.0);

        let shown = source_to_display(&rect, &surface, image);
        assert_eq!(shown.left, 200.0);
        assert_eq!(shown.top, 0.0);
        assert_eq!(shown.width, 400.0);
        assert_eq!(shown.height, 400.0);
    }

    #[test]
    fn test_display_to_source() {
        let image = size(2000, 1000);
        let surface = DisplaySurface::fit(image, 800.0, 600.0);
        let p = display_to_source(Point::new(400.0, 200.0), &surface, image);
        assert!((p.x - 1000.0).abs() < 1e-9);
        assert!((p.y - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_rect_contains_edges() {
        let r = DisplayRect {
            left: 10.0,
            top: 10.0,
            width: 20.0,
            height: 20.0,
        };
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 30.0)));
        assert!(!r.contains(Point::new(30.1, 20.0)));
        assert!(!r.contains(Point::new(9.9, 20.0)));
    }

    #[test]
    fn test_clamp_forces_square() {
        let image = size(500, 400);
        let mut rect = CropRect::new(0.0, 0.0, 300.0, 100.0);
        clamp_rect(&mut rect, image);
        assert_eq!(rect.width, 300.0);
        assert_eq!(rect.height, 300.0);
    }

    #[test]
    fn test_clamp_caps_size_to_short_edge() {
        let image = size(500, 400);
        let mut rect = CropRect::square(0.0, 0.0, 900.0);
        clamp_rect(&mut rect, image);
        assert_eq!(rect, CropRect::square(0.0, 0.0, 400.0));
    }

    #[test]
    fn test_clamp_minimum_size() {
        let image = size(500, 400);
        let mut rect = CropRect::square(10.0, 10.0, -25.0);
        clamp_rect(&mut rect, image);
        assert_eq!(rect.width, MIN_CROP_SIZE);
        assert_eq!(rect.height, MIN_CROP_SIZE);
    }

    #[test]
    fn test_clamp_position_into_bounds() {
        let image = size(500, 400);
        let mut rect = CropRect::square(450.0, -20.0, 100.0);
        clamp_rect(&mut rect, image);
        assert_eq!(rect, CropRect::square(400.0, 0.0, 100.0));
    }

    #[test]
    fn test_clamp_sanitizes_non_finite() {
        let image = size(500, 400);
        let mut rect = CropRect::new(f64::NAN, f64::INFINITY, f64::NAN, f64::NAN);
        clamp_rect(&mut rect, image);
        assert_eq!(rect, CropRect::square(0.0, 0.0, 400.0));

        let mut rect = CropRect::new(f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY, 0.0);
        clamp_rect(&mut rect, image);
        assert_eq!(rect, CropRect::square(0.0, 0.0, MIN_CROP_SIZE));
    }

    #[test]
    fn test_clamp_one_pixel_image() {
        let image = size(1, 1);
        let rect = CropRect::square(3.0, 3.0, 3.0).clamped(image);
        assert_eq!(rect, CropRect::square(0.0, 0.0, 1.0));
        assert!(rect.is_valid_for(image));
    }

    #[test]
    fn test_is_valid_for() {
        let image = size(100, 100);
        assert!(CropRect::square(0.0, 0.0, 100.0).is_valid_for(image));
        assert!(!CropRect::new(0.0, 0.0, 100.0, 99.0).is_valid_for(image));
        assert!(!CropRect::square(1.0, 0.0, 100.0).is_valid_for(image));
        assert!(!CropRect::square(-1.0, 0.0, 10.0).is_valid_for(image));
        assert!(!CropRect::square(0.0, 0.0, 0.5).is_valid_for(image));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for image dimensions.
    fn image_strategy() -> impl Strategy<Value = ImageSize> {
        (1u32..=6000, 1u32..=6000).prop_map(|(w, h)| ImageSize::new(w, h).unwrap())
    }

    /// Strategy for arbitrary (often invalid) rectangles.
    fn wild_rect_strategy() -> impl Strategy<Value = CropRect> {
        (
            -10_000.0f64..10_000.0,
            -10_000.0f64..10_000.0,
            -10_000.0f64..10_000.0,
            -10_000.0f64..10_000.0,
        )
            .prop_map(|(x, y, w, h)| CropRect::new(x, y, w, h))
    }

    proptest! {
        /// Property: clamping always yields a valid rectangle.
        #[test]
        fn prop_clamp_establishes_invariants(
            image in image_strategy(),
            rect in wild_rect_strategy(),
        ) {
            let clamped = rect.clamped(image);
            prop_assert!(clamped.is_valid_for(image), "{:?} invalid for {:?}", clamped, image);
        }

        /// Property: clamping is idempotent.
        #[test]
        fn prop_clamp_idempotent(
            image in image_strategy(),
            rect in wild_rect_strategy(),
        ) {
            let once = rect.clamped(image);
            let twice = once.clamped(image);
            prop_assert_eq!(once, twice);
        }

        /// Property: a rectangle that is already valid is left untouched.
        #[test]
        fn prop_clamp_preserves_valid(
            image in image_strategy(),
            fx in 0.0f64..=1.0,
            fy in 0.0f64..=1.0,
            fs in 0.0f64..=1.0,
        ) {
            let max = f64::from(image.min_edge());
            let size = (MIN_CROP_SIZE + fs * (max - MIN_CROP_SIZE)).min(max);
            let x = fx * (f64::from(image.width()) - size);
            let y = fy * (f64::from(image.height()) - size);
            let rect = CropRect::square(x, y, size);

            prop_assert_eq!(rect.clamped(image), rect);
        }

        /// Property: display -> source -> display recovers the point.
        #[test]
        fn prop_display_round_trip(
            image in image_strategy(),
            fx in 0.0f64..=1.0,
            fy in 0.0f64..=1.0,
        ) {
            let surface = DisplaySurface::fit(image, 800.0, 600.0);
            let p = Point::new(fx * surface.width, fy * surface.height);

            let back = source_point_to_display(display_to_source(p, &surface, image), &surface, image);
            prop_assert!((back.x - p.x).abs() < 1e-6);
            prop_assert!((back.y - p.y).abs() < 1e-6);
        }

        /// Property: the display surface never exceeds its bounds or the image.
        #[test]
        fn prop_surface_bounded(image in image_strategy()) {
            let surface = DisplaySurface::fit(image, 800.0, 600.0);
            prop_assert!(surface.width >= 1.0 && surface.height >= 1.0);
            prop_assert!(surface.width <= 800.0 && surface.height <= 600.0);
            prop_assert!(surface.width <= f64::from(image.width()));
            prop_assert!(surface.height <= f64::from(image.height()));
        }
    }
}
