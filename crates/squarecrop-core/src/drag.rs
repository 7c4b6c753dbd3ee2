//! Pointer-driven move and corner-resize gestures.
//!
//! The controller is a two-state machine:
//!
//! ```text
//!   Idle --pointer_down(inside box)--> Dragging(handle)
//!   Dragging --pointer_move--> Dragging   (rectangle updated, then clamped)
//!   Dragging --pointer_up / cancel--> Idle
//! ```
//!
//! Updates are incremental. Each move applies only the delta since the
//! previous pointer position to the current rectangle, then re-snapshots
//! the pointer. Clamping can cap growth, and an absolute offset from the
//! gesture start would otherwise let the pointer run ahead of the box.
//!
//! Corner resizes keep the opposite corner fixed. The two axis deltas are
//! averaged into one signed magnitude, positive when the pointer moves away
//! from the anchor, so diagonal drags grow the square evenly.

use serde::{Deserialize, Serialize};

use crate::geometry::{
    clamp_rect, display_to_source, source_to_display, CropRect, DisplayRect, DisplaySurface,
    ImageSize, Point,
};

/// Side of the square corner hit zones, in display pixels.
pub const DEFAULT_HANDLE_SIZE: f64 = 20.0;

/// Which part of the crop box a gesture grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    /// Translate the whole box.
    Move,
    /// Top-left corner; anchored at bottom-right.
    NorthWest,
    /// Top-right corner; anchored at bottom-left.
    NorthEast,
    /// Bottom-left corner; anchored at top-right.
    SouthWest,
    /// Bottom-right corner; anchored at top-left.
    SouthEast,
}

impl Handle {
    /// True for the four resize corners.
    #[inline]
    pub fn is_corner(self) -> bool {
        !matches!(self, Handle::Move)
    }

    /// Short name matching the handle CSS classes (`crop-handle-nw`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Handle::Move => "move",
            Handle::NorthWest => "nw",
            Handle::NorthEast => "ne",
            Handle::SouthWest => "sw",
            Handle::SouthEast => "se",
        }
    }
}

/// Resolve which handle a display-space pointer grabs on `crop_box`.
///
/// Returns `None` when the pointer is outside the box. Corner zones are
/// tested in NW, NE, SW, SE order, so on boxes smaller than two handle
/// sizes the earlier corner wins.
pub fn hit_test(pointer: Point, crop_box: &DisplayRect, handle_size: f64) -> Option<Handle> {
    if !crop_box.contains(pointer) {
        return None;
    }

    let local_x = pointer.x - crop_box.left;
    let local_y = pointer.y - crop_box.top;
    let near_left = local_x < handle_size;
    let near_right = local_x > crop_box.width - handle_size;
    let near_top = local_y < handle_size;
    let near_bottom = local_y > crop_box.height - handle_size;

    let handle = if near_left && near_top {
        Handle::NorthWest
    } else if near_right && near_top {
        Handle::NorthEast
    } else if near_left && near_bottom {
        Handle::SouthWest
    } else if near_right && near_bottom {
        Handle::SouthEast
    } else {
        Handle::Move
    };
    Some(handle)
}

/// Apply a source-pixel `delta` to `rect` for `handle`, without clamping.
///
/// For corner handles the returned square keeps the opposite corner of
/// `rect` exactly where it was.
pub fn project_drag(rect: &CropRect, handle: Handle, delta: Point) -> CropRect {
    let (dx, dy) = (delta.x, delta.y);
    match handle {
        Handle::Move => CropRect::new(rect.x + dx, rect.y + dy, rect.width, rect.height),
        Handle::NorthWest => {
            let size = rect.width - (dx + dy) / 2.0;
            CropRect::square(rect.right() - size, rect.bottom() - size, size)
        }
        Handle::NorthEast => {
            let size = rect.width + (dx - dy) / 2.0;
            CropRect::square(rect.x, rect.bottom() - size, size)
        }
        Handle::SouthWest => {
            let size = rect.width + (dy - dx) / 2.0;
            CropRect::square(rect.right() - size, rect.y, size)
        }
        Handle::SouthEast => {
            let size = rect.width + (dx + dy) / 2.0;
            CropRect::square(rect.x, rect.y, size)
        }
    }
}

/// [`project_drag`] followed by [`clamp_rect`].
pub fn apply_drag(rect: &CropRect, handle: Handle, delta: Point, image: ImageSize) -> CropRect {
    let mut next = project_drag(rect, handle, delta);
    clamp_rect(&mut next, image);
    next
}

/// Live gesture data, kept between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    /// Grabbed handle.
    pub handle: Handle,
    /// Pointer position of the previous event, in display pixels.
    pub last_pointer: Point,
    /// Rectangle when the gesture started; restored by [`DragController::cancel`].
    pub start_rect: CropRect,
}

/// Drag controller state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(Gesture),
}

/// Translates pointer events into crop rectangle updates.
#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    handle_size: f64,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLE_SIZE)
    }
}

impl DragController {
    /// Create an idle controller with the given corner hit-zone size.
    pub fn new(handle_size: f64) -> Self {
        Self {
            state: DragState::Idle,
            handle_size,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Handle of the live gesture, if any.
    pub fn active_handle(&self) -> Option<Handle> {
        match self.state {
            DragState::Dragging(gesture) => Some(gesture.handle),
            DragState::Idle => None,
        }
    }

    /// Begin a gesture if `pointer` (display pixels) is inside the crop box.
    ///
    /// A pointer-down during a live gesture replaces it.
    pub fn pointer_down(
        &mut self,
        pointer: Point,
        rect: &CropRect,
        surface: &DisplaySurface,
        image: ImageSize,
    ) -> Option<Handle> {
        let crop_box = source_to_display(rect, surface, image);
        let handle = hit_test(pointer, &crop_box, self.handle_size)?;

        self.state = DragState::Dragging(Gesture {
            handle,
            last_pointer: pointer,
            start_rect: *rect,
        });
        log::debug!("drag start: {} at ({}, {})", handle.as_str(), pointer.x, pointer.y);
        Some(handle)
    }

    /// Feed a pointer position; returns whether `rect` changed.
    ///
    /// Does nothing while idle.
    pub fn pointer_move(
        &mut self,
        pointer: Point,
        rect: &mut CropRect,
        surface: &DisplaySurface,
        image: ImageSize,
    ) -> bool {
        let DragState::Dragging(gesture) = &mut self.state else {
            return false;
        };

        let display_delta = Point::new(
            pointer.x - gesture.last_pointer.x,
            pointer.y - gesture.last_pointer.y,
        );
        let delta = display_to_source(display_delta, surface, image);
        gesture.last_pointer = pointer;

        let next = apply_drag(rect, gesture.handle, delta, image);
        let changed = next != *rect;
        *rect = next;
        changed
    }

    /// End the gesture unconditionally, returning the handle it used.
    pub fn pointer_up(&mut self) -> Option<Handle> {
        let handle = self.active_handle();
        self.state = DragState::Idle;
        if let Some(handle) = handle {
            log::debug!("drag end: {}", handle.as_str());
        }
        handle
    }

    /// Abort the gesture and restore the rectangle it started from.
    ///
    /// Returns `false` when idle.
    pub fn cancel(&mut self, rect: &mut CropRect) -> bool {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(gesture) => {
                *rect = gesture.start_rect;
                log::debug!("drag cancelled: {}", gesture.handle.as_str());
                true
            }
            DragState::Idle => false,
        }
    }
}
