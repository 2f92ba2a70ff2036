//! Press/move/release handling for the crop rectangle.
//!
//! Every move recomputes the rectangle from the snapshot taken at press time
//! plus the total pointer delta, so the result depends only on the press
//! point and the current point.

use super::handle::{CursorHint, DragHandle, HandleClassifier};
use crate::config::{DEFAULT_HANDLE_SIZE, DEFAULT_MIN_CROP_SIZE};
use crate::geometry::{CropRect, Point, Size};

/// Pointer position and rectangle captured when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSnapshot {
    pub pointer: Point,
    pub crop: CropRect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropInteraction {
    classifier: HandleClassifier,
    min_size: f64,
    active: Option<(DragHandle, DragSnapshot)>,
}

impl Default for CropInteraction {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLE_SIZE, DEFAULT_MIN_CROP_SIZE)
    }
}

impl CropInteraction {
    pub const fn new(handle_size: f64, min_size: f64) -> Self {
        Self {
            classifier: HandleClassifier::new(handle_size),
            min_size,
            active: None,
        }
    }

    pub fn classify(&self, point: Point, crop: &CropRect) -> Option<DragHandle> {
        self.classifier.classify(point, crop)
    }

    pub fn cursor_at(&self, point: Point, crop: &CropRect) -> CursorHint {
        self.classifier.cursor_at(point, crop)
    }

    pub fn active_handle(&self) -> Option<DragHandle> {
        self.active.map(|(handle, _)| handle)
    }

    pub fn snapshot(&self) -> Option<&DragSnapshot> {
        self.active.as_ref().map(|(_, snapshot)| snapshot)
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Begins a drag if `point` hits the rectangle. A miss starts nothing and
    /// leaves any previous drag state alone.
    pub fn start_drag(&mut self, point: Point, crop: &CropRect) -> Option<DragHandle> {
        let handle = self.classify(point, crop)?;
        self.active = Some((
            handle,
            DragSnapshot {
                pointer: point,
                crop: *crop,
            },
        ));
        Some(handle)
    }

    /// Rectangle for the pointer now at `point`, or `None` without a drag.
    pub fn update_drag(&self, point: Point, canvas: Size) -> Option<CropRect> {
        let (handle, snapshot) = self.active.as_ref()?;
        Some(self.resize(*handle, snapshot, point, canvas))
    }

    pub fn end_drag(&mut self) {
        self.active = None;
    }

    fn resize(
        &self,
        handle: DragHandle,
        snapshot: &DragSnapshot,
        point: Point,
        canvas: Size,
    ) -> CropRect {
        let dx = point.x - snapshot.pointer.x;
        let dy = point.y - snapshot.pointer.y;
        let origin = snapshot.crop;
        let (canvas_w, canvas_h) = (canvas.width_f64(), canvas.height_f64());

        if handle == DragHandle::Move {
            return CropRect::new(
                clamp_low_wins(origin.x + dx, 0.0, canvas_w - origin.width),
                clamp_low_wins(origin.y + dy, 0.0, canvas_h - origin.height),
                origin.width,
                origin.height,
            );
        }

        let mut next = origin;
        if handle.moves_top() {
            (next.y, next.height) = self.drag_leading_edge(origin.y, origin.height, dy);
        }
        if handle.moves_bottom() {
            next.height = self.drag_trailing_edge(origin.y, origin.height, dy, canvas_h);
        }
        if handle.moves_left() {
            (next.x, next.width) = self.drag_leading_edge(origin.x, origin.width, dx);
        }
        if handle.moves_right() {
            next.width = self.drag_trailing_edge(origin.x, origin.width, dx, canvas_w);
        }
        next
    }

    /// Top/left edge: the far edge stays anchored, so origin and length both
    /// change. Returns `(origin, length)`.
    fn drag_leading_edge(&self, origin: f64, length: f64, delta: f64) -> (f64, f64) {
        let moved = clamp_low_wins(origin + delta, 0.0, origin + length - self.min_size);
        (moved, length - (moved - origin))
    }

    /// Bottom/right edge: only the length changes.
    fn drag_trailing_edge(&self, origin: f64, length: f64, delta: f64, limit: f64) -> f64 {
        (length + delta).min(limit - origin).max(self.min_size)
    }
}

/// `max(low, min(high, value))`; unlike `f64::clamp` this tolerates
/// `high < low` and lets the lower bound win.
fn clamp_low_wins(value: f64, low: f64, high: f64) -> f64 {
    value.min(high).max(low)
}
