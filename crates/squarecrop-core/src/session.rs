//! Crop session: walks the selected images one at a time.
//!
//! A session owns one slot per selected image. Each slot remembers the
//! image's decoded dimensions (once known) and its saved crop rectangle.
//! Only the image under the cursor is *active*: it has a display surface,
//! a live rectangle, and receives pointer events through the
//! [`DragController`].
//!
//! # Lifecycle
//!
//! 1. [`CropSession::begin`] with the ordered selection.
//! 2. The host decodes the current image and reports it through
//!    [`CropSession::image_loaded`] or [`CropSession::image_failed`].
//! 3. Pointer events mutate the active rectangle.
//! 4. [`CropSession::goto`] / [`next`](CropSession::next) /
//!    [`previous`](CropSession::previous) save the active rectangle, then
//!    load the target image.
//! 5. [`CropSession::finish`] saves and emits every slot's rectangle.
//!
//! Dimensions are cached per slot, so a revisited image is ready at once.
//! Until the awaited metadata arrives the session is in a wait state:
//! there is no active rectangle, and navigation requests are remembered
//! and replayed when the callback fires.

use serde::Serialize;
use thiserror::Error;

use crate::config::CropConfig;
use crate::drag::{DragController, Handle};
use crate::geometry::{CropRect, DisplaySurface, ImageSize, Point};
use crate::placement::initial_placement;
use crate::render::{render_frame, CropFrame};

/// Error types for crop session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A session needs at least one image.
    #[error("Please select at least one image")]
    EmptySelection,

    /// The decoder reported a zero dimension.
    #[error("Image {index} has invalid dimensions {width}x{height}")]
    InvalidDimensions { index: usize, width: u32, height: u32 },

    /// A metadata callback named a slot that does not exist.
    #[error("Image index {index} is out of range for {len} images")]
    IndexOutOfRange { index: usize, len: usize },

    /// The operation needs a running session.
    #[error("No crop session is active")]
    NotActive,
}

/// Result of a navigation request or metadata callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "index", rename_all = "snake_case")]
pub enum NavOutcome {
    /// The image is active and has a crop rectangle.
    Ready(usize),
    /// The image must be decoded before it can be cropped.
    AwaitingMetadata(usize),
    /// Queued until the awaited image finishes decoding.
    Deferred(usize),
    /// The image could not be decoded; it has no rectangle.
    Unavailable(usize),
    /// Out of range, or already there.
    Unchanged,
    /// Every image was removed.
    Emptied,
}

/// Per-image output of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinishedCrop<H> {
    pub handle: H,
    /// `None` for images that were never shown or failed to decode.
    pub crop: Option<CropRect>,
}

#[derive(Debug, Clone, PartialEq)]
enum Metadata {
    Unknown,
    Known(ImageSize),
    Failed(String),
}

#[derive(Debug, Clone)]
struct Slot<H> {
    handle: H,
    metadata: Metadata,
    crop: Option<CropRect>,
}

impl<H> Slot<H> {
    fn new(handle: H) -> Self {
        Self {
            handle,
            metadata: Metadata::Unknown,
            crop: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveImage {
    image: ImageSize,
    surface: DisplaySurface,
    rect: CropRect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Active {
    /// Waiting for the cursor image's dimensions.
    Waiting { deferred: Option<usize> },
    Ready(ActiveImage),
    /// The cursor image failed to decode, or the session is empty.
    Unavailable,
}

/// Ordered crop session over caller-supplied image handles.
#[derive(Debug, Clone)]
pub struct CropSession<H> {
    slots: Vec<Slot<H>>,
    cursor: usize,
    active: Active,
    /// Active rectangle differs from the cursor slot's saved one.
    dirty: bool,
    drag: DragController,
    config: CropConfig,
}

impl<H> CropSession<H> {
    /// Start a session over `images`, positioned on the first one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySelection` when `images` is empty.
    pub fn begin(images: Vec<H>, config: CropConfig) -> Result<Self, SessionError> {
        if images.is_empty() {
            log::warn!("refusing to start a crop session without images");
            return Err(SessionError::EmptySelection);
        }

        let config = config.sanitized();
        let mut session = Self {
            slots: images.into_iter().map(Slot::new).collect(),
            cursor: 0,
            active: Active::Unavailable,
            dirty: false,
            drag: DragController::new(config.handle_size),
            config,
        };
        session.load();
        log::info!("crop session started with {} images", session.len());
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// One-based position and total, for "2 / 5" style counters.
    pub fn position(&self) -> (usize, usize) {
        (self.cursor + 1, self.slots.len())
    }

    pub fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.slots.len()
    }

    /// On the final image, where the page offers "finish" instead of "next".
    pub fn is_last(&self) -> bool {
        !self.slots.is_empty() && self.cursor + 1 == self.slots.len()
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Whether the active rectangle has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn handle(&self, index: usize) -> Option<&H> {
        self.slots.get(index).map(|slot| &slot.handle)
    }

    pub fn handles(&self) -> impl Iterator<Item = &H> {
        self.slots.iter().map(|slot| &slot.handle)
    }

    /// Current rectangle for `index`: the live one for the active image,
    /// the saved one otherwise.
    pub fn crop(&self, index: usize) -> Option<CropRect> {
        match self.active {
            Active::Ready(active) if index == self.cursor => Some(active.rect),
            _ => self.slots.get(index).and_then(|slot| slot.crop),
        }
    }

    /// Decode failure message recorded for `index`.
    pub fn failure(&self, index: usize) -> Option<&str> {
        match &self.slots.get(index)?.metadata {
            Metadata::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Index whose metadata the session is waiting for.
    pub fn awaiting(&self) -> Option<usize> {
        match self.active {
            Active::Waiting { .. } => Some(self.cursor),
            _ => None,
        }
    }

    /// State of the image under the cursor, expressed as a [`NavOutcome`].
    pub fn outcome(&self) -> NavOutcome {
        if self.slots.is_empty() {
            return NavOutcome::Emptied;
        }
        match self.active {
            Active::Ready(_) => NavOutcome::Ready(self.cursor),
            Active::Waiting { .. } => NavOutcome::AwaitingMetadata(self.cursor),
            Active::Unavailable => NavOutcome::Unavailable(self.cursor),
        }
    }

    /// Live rectangle of the active image.
    pub fn current_rect(&self) -> Option<CropRect> {
        match self.active {
            Active::Ready(active) => Some(active.rect),
            _ => None,
        }
    }

    /// Dimensions of the active image.
    pub fn current_image(&self) -> Option<ImageSize> {
        match self.active {
            Active::Ready(active) => Some(active.image),
            _ => None,
        }
    }

    /// Render data for the active image.
    pub fn frame(&self) -> Option<CropFrame> {
        match &self.active {
            Active::Ready(active) => Some(render_frame(&active.rect, &active.surface, active.image)),
            _ => None,
        }
    }

    /// Record decoded dimensions for `index`.
    ///
    /// If the session was waiting on this image it becomes active, and a
    /// navigation deferred meanwhile is replayed. A callback for the cursor
    /// image that is already active or failed reloads it with the new
    /// dimensions, keeping its rectangle clamped to them.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` for an unknown slot. `InvalidDimensions` for a zero
    /// width or height; the slot is then marked failed, as with
    /// [`image_failed`](Self::image_failed), so the session does not stall.
    pub fn image_loaded(
        &mut self,
        index: usize,
        width: u32,
        height: u32,
    ) -> Result<NavOutcome, SessionError> {
        self.check_index(index)?;
        let Some(image) = ImageSize::new(width, height) else {
            self.image_failed(index, format!("invalid dimensions {}x{}", width, height))?;
            return Err(SessionError::InvalidDimensions {
                index,
                width,
                height,
            });
        };

        log::debug!("image {} decoded: {}x{}", index, width, height);
        self.slots[index].metadata = Metadata::Known(image);
        Ok(self.resolve_wait(index))
    }

    /// Record that `index` could not be decoded.
    ///
    /// The failure is recoverable: the slot drops its rectangle, the session
    /// carries on, and a later [`image_loaded`](Self::image_loaded) for the
    /// same slot makes it croppable again.
    pub fn image_failed(
        &mut self,
        index: usize,
        message: impl Into<String>,
    ) -> Result<NavOutcome, SessionError> {
        self.check_index(index)?;
        let message = message.into();
        log::warn!("image {} could not be decoded: {}", index, message);
        let slot = &mut self.slots[index];
        slot.metadata = Metadata::Failed(message);
        slot.crop = None;
        Ok(self.resolve_wait(index))
    }

    /// Save the active rectangle and move to `index`.
    ///
    /// A live drag is ended first. Out-of-range targets and the current
    /// index are no-ops.
    pub fn goto(&mut self, index: usize) -> NavOutcome {
        if index >= self.slots.len() {
            return NavOutcome::Unchanged;
        }

        if let Active::Waiting { deferred } = &mut self.active {
            if index == self.cursor {
                *deferred = None;
                return NavOutcome::Unchanged;
            }
            *deferred = Some(index);
            log::debug!(
                "navigation to image {} deferred until image {} is decoded",
                index,
                self.cursor
            );
            return NavOutcome::Deferred(index);
        }

        if index == self.cursor {
            return NavOutcome::Unchanged;
        }

        self.drag.pointer_up();
        self.save();
        log::debug!("crop session: image {} -> {}", self.cursor, index);
        self.cursor = index;
        self.load()
    }

    pub fn previous(&mut self) -> NavOutcome {
        match self.cursor.checked_sub(1) {
            Some(index) => self.goto(index),
            None => NavOutcome::Unchanged,
        }
    }

    pub fn next(&mut self) -> NavOutcome {
        self.goto(self.cursor + 1)
    }

    /// Drop the slot at `index`, keeping the others and their rectangles.
    ///
    /// Removing an image before the cursor shifts the cursor down with it.
    /// Removing the active image moves to the previous one (or the new
    /// first one) and loads it.
    pub fn remove(&mut self, index: usize) -> NavOutcome {
        if index >= self.slots.len() {
            return NavOutcome::Unchanged;
        }

        self.slots.remove(index);
        log::debug!("removed image {} from crop session", index);

        if self.slots.is_empty() {
            self.drag.pointer_up();
            self.active = Active::Unavailable;
            self.cursor = 0;
            self.dirty = false;
            return NavOutcome::Emptied;
        }

        if index != self.cursor {
            if index < self.cursor {
                self.cursor -= 1;
            }
            if let Active::Waiting { deferred } = &mut self.active {
                *deferred = shift_after_removal(*deferred, index);
            }
            return self.outcome();
        }

        let deferred = match self.active {
            Active::Waiting { deferred } => shift_after_removal(deferred, index),
            _ => None,
        };
        self.drag.pointer_up();
        self.dirty = false;
        self.cursor = self.cursor.saturating_sub(1);
        let outcome = self.load();
        self.replay(deferred, outcome)
    }

    /// Save the active rectangle and emit every slot in order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySelection` if every image was removed.
    pub fn finish(mut self) -> Result<Vec<FinishedCrop<H>>, SessionError> {
        if self.slots.is_empty() {
            return Err(SessionError::EmptySelection);
        }

        self.drag.pointer_up();
        self.save();

        let cropped = self.slots.iter().filter(|slot| slot.crop.is_some()).count();
        log::info!(
            "crop session finished: {} of {} images cropped",
            cropped,
            self.slots.len()
        );

        Ok(self
            .slots
            .into_iter()
            .map(|slot| FinishedCrop {
                handle: slot.handle,
                crop: slot.crop,
            })
            .collect())
    }

    /// Start a gesture on the active image. `pointer` is in display pixels.
    pub fn pointer_down(&mut self, pointer: Point) -> Option<Handle> {
        let Active::Ready(active) = &self.active else {
            return None;
        };
        self.drag
            .pointer_down(pointer, &active.rect, &active.surface, active.image)
    }

    /// Continue the gesture; returns whether the rectangle changed.
    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        let Active::Ready(active) = &mut self.active else {
            return false;
        };
        let changed =
            self.drag
                .pointer_move(pointer, &mut active.rect, &active.surface, active.image);
        if changed {
            self.dirty = true;
        }
        changed
    }

    pub fn pointer_up(&mut self) -> Option<Handle> {
        self.drag.pointer_up()
    }

    /// Abort the gesture, restoring the rectangle it started from.
    pub fn cancel_drag(&mut self) -> bool {
        let Active::Ready(active) = &mut self.active else {
            return false;
        };
        self.drag.cancel(&mut active.rect)
    }

    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        if index >= self.slots.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        Ok(())
    }

    /// Rebind the cursor image after a metadata callback for it.
    fn resolve_wait(&mut self, index: usize) -> NavOutcome {
        if index != self.cursor {
            return self.outcome();
        }
        let Active::Waiting { deferred } = self.active else {
            self.drag.pointer_up();
            if matches!(self.slots[index].metadata, Metadata::Known(_)) {
                self.save();
            }
            return self.load();
        };

        let outcome = self.load();
        self.replay(deferred, outcome)
    }

    /// Carry a navigation queued during a wait over to the new cursor image.
    fn replay(&mut self, deferred: Option<usize>, outcome: NavOutcome) -> NavOutcome {
        let Some(target) = deferred.filter(|target| *target != self.cursor) else {
            return outcome;
        };
        match &mut self.active {
            Active::Waiting { deferred } => {
                *deferred = Some(target);
                outcome
            }
            _ => self.goto(target),
        }
    }

    /// Bind the cursor image as active, or enter the wait state.
    fn load(&mut self) -> NavOutcome {
        let index = self.cursor;
        self.dirty = false;

        match self.slots[index].metadata {
            Metadata::Known(image) => {
                self.activate(image);
                NavOutcome::Ready(index)
            }
            Metadata::Unknown => {
                self.active = Active::Waiting { deferred: None };
                NavOutcome::AwaitingMetadata(index)
            }
            Metadata::Failed(_) => {
                self.active = Active::Unavailable;
                NavOutcome::Unavailable(index)
            }
        }
    }

    fn activate(&mut self, image: ImageSize) {
        let surface = DisplaySurface::fit(
            image,
            self.config.max_display_width,
            self.config.max_display_height,
        );
        let rect = match self.slots[self.cursor].crop {
            Some(saved) => {
                let rect = saved.clamped(image);
                if rect != saved {
                    self.dirty = true;
                }
                rect
            }
            None => {
                self.dirty = true;
                initial_placement(image, self.config.target_size)
            }
        };
        self.active = Active::Ready(ActiveImage {
            image,
            surface,
            rect,
        });
    }

    fn save(&mut self) {
        if let Active::Ready(active) = self.active {
            if self.dirty {
                self.slots[self.cursor].crop = Some(active.rect);
                self.dirty = false;
            }
        }
    }
}

fn shift_after_removal(deferred: Option<usize>, removed: usize) -> Option<usize> {
    match deferred {
        Some(target) if target == removed => None,
        Some(target) if target > removed => Some(target - 1),
        other => other,
    }
}
