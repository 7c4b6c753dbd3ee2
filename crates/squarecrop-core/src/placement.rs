//! Default crop placement for images that have no stored rectangle.
//!
//! The policy picks the largest centered square, reasoning in terms of the
//! advisory output size: the image is scaled so its shorter side fills the
//! target, and the square is cut from the long axis. If the long side does
//! not cover the target after scaling, the square falls back to the full
//! length of the other axis and is centered along it instead.
//!
//! The target only steers which branch is taken. Stored coordinates stay in
//! source pixels and do not depend on it.

use crate::geometry::{clamp_rect, CropRect, ImageSize};

/// Output edge length the processing service produces.
pub const DEFAULT_TARGET_SIZE: f64 = 1080.0;

/// Compute the default square crop for `image`.
///
/// Non-positive or non-finite targets fall back to [`DEFAULT_TARGET_SIZE`].
pub fn initial_placement(image: ImageSize, target_size: f64) -> CropRect {
    let target = if target_size.is_finite() && target_size > 0.0 {
        target_size
    } else {
        DEFAULT_TARGET_SIZE
    };

    let w = f64::from(image.width());
    let h = f64::from(image.height());
    let max_size = f64::from(image.min_edge());

    let mut rect = if image.is_landscape() {
        // Fill the height, cut the width
        let scale = target / h;
        if w * scale >= target {
            // target / scale, i.e. the full height
            let size = h.min(max_size);
            CropRect::square((w - size) / 2.0, 0.0, size)
        } else {
            let size = w.min(max_size);
            CropRect::square(0.0, (h - size) / 2.0, size)
        }
    } else {
        // Fill the width, cut the height
        let scale = target / w;
        if h * scale >= target {
            let size = w.min(max_size);
            CropRect::square(0.0, (h - size) / 2.0, size)
        } else {
            let size = h.min(max_size);
            CropRect::square((w - size) / 2.0, 0.0, size)
        }
    };

    clamp_rect(&mut rect, image);
    log::debug!(
        "initial placement for {}x{}: {:?}",
        image.width(),
        image.height(),
        rect
    );
    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> ImageSize {
        ImageSize::new(w, h).unwrap()
    }

    #[test]
    fn test_landscape_crops_width() {
        let rect = initial_placement(size(2000, 1000), DEFAULT_TARGET_SIZE);
        assert_eq!(rect, CropRect::square(500.0, 0.0, 1000.0));
    }

    #[test]
    fn test_portrait_crops_height() {
        let rect = initial_placement(size(1000, 2000), DEFAULT_TARGET_SIZE);
        assert_eq!(rect, CropRect::square(0.0, 500.0, 1000.0));
    }

    #[test]
    fn test_square_image_uses_everything() {
        let rect = initial_placement(size(1500, 1500), DEFAULT_TARGET_SIZE);
        assert_eq!(rect, CropRect::square(0.0, 0.0, 1500.0));
    }

    #[test]
    fn test_small_image_below_target() {
        // Smaller than the target in both dimensions: still the full short side
        let rect = initial_placement(size(300, 200), DEFAULT_TARGET_SIZE);
        assert_eq!(rect, CropRect::square(50.0, 0.0, 200.0));
    }

    #[test]
    fn test_near_square_landscape() {
        let rect = initial_placement(size(1001, 1000), DEFAULT_TARGET_SIZE);
        assert_eq!(rect.width, 1000.0);
        assert_eq!(rect.y, 0.0);
        assert!((rect.x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_aspect_ratios() {
        let rect = initial_placement(size(10_000, 3), DEFAULT_TARGET_SIZE);
        assert_eq!(rect.width, 3.0);
        assert!(rect.is_valid_for(size(10_000, 3)));

        let rect = initial_placement(size(1, 5000), DEFAULT_TARGET_SIZE);
        assert_eq!(rect, CropRect::square(0.0, 2499.5, 1.0));
    }

    #[test]
    fn test_target_does_not_change_coordinates() {
        let image = size(4000, 3000);
        let a = initial_placement(image, 1080.0);
        let b = initial_placement(image, 512.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_target_falls_back() {
        let image = size(2000, 1000);
        let expected = initial_placement(image, DEFAULT_TARGET_SIZE);
        assert_eq!(initial_placement(image, 0.0), expected);
        assert_eq!(initial_placement(image, f64::NAN), expected);
        assert_eq!(initial_placement(image, -5.0), expected);
    }
}
