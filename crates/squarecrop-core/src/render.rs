//! Projection of the crop rectangle onto the display surface.
//!
//! A [`CropFrame`] carries everything a view needs to draw one state of the
//! editor: the surface size, the crop box in display pixels, and the dimming
//! mask. Frames are derived on demand and hold no state of their own.

use serde::Serialize;

use crate::geometry::{source_to_display, CropRect, DisplayRect, DisplaySurface, ImageSize, Point};

/// Clip outline covering the whole surface except the crop box interior.
///
/// Points are percentages of the surface (0.0 to 100.0). The outline walks
/// the surface border and cuts into the crop box through a zero-width slit
/// along its left edge, which yields a single polygon with a square hole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskPolygon {
    points: [Point; 10],
}

impl MaskPolygon {
    /// Build the mask for `crop_box` on `surface`.
    ///
    /// Coordinates are clamped to the surface. The surface height is
    /// truncated to whole pixels while the box is scaled by width, so on
    /// very flat images the box can overhang the bottom edge slightly.
    pub fn around(crop_box: &DisplayRect, surface: &DisplaySurface) -> Self {
        let pct_x = |v: f64| ((v / surface.width) * 100.0).clamp(0.0, 100.0);
        let pct_y = |v: f64| ((v / surface.height) * 100.0).clamp(0.0, 100.0);

        let left = pct_x(crop_box.left);
        let right = pct_x(crop_box.left + crop_box.width);
        let top = pct_y(crop_box.top);
        let bottom = pct_y(crop_box.top + crop_box.height);

        Self {
            points: [
                Point::new(0.0, 0.0),
                Point::new(0.0, 100.0),
                Point::new(left, 100.0),
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
                Point::new(left, 100.0),
                Point::new(100.0, 100.0),
                Point::new(100.0, 0.0),
            ],
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// CSS `clip-path` value, e.g. `polygon(0% 0%, 0% 100%, ...)`.
    pub fn to_css(&self) -> String {
        let coords: Vec<String> = self
            .points
            .iter()
            .map(|p| format!("{}% {}%", p.x, p.y))
            .collect();
        format!("polygon({})", coords.join(", "))
    }
}

/// Everything needed to draw the crop editor for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropFrame {
    /// Surface the image is drawn into.
    pub surface: DisplaySurface,
    /// Crop box in display pixels.
    pub crop_box: DisplayRect,
    /// Dimming mask around the box.
    pub mask: MaskPolygon,
}

/// Derive the frame for `rect` on `surface`.
pub fn render_frame(rect: &CropRect, surface: &DisplaySurface, image: ImageSize) -> CropFrame {
    let crop_box = source_to_display(rect, surface, image);
    let mask = MaskPolygon::around(&crop_box, surface);
    CropFrame {
        surface: *surface,
        crop_box,
        mask,
    }
}
