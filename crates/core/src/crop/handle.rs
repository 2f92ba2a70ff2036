//! Handle hit-testing for the crop rectangle.

use crate::config::DEFAULT_HANDLE_SIZE;
use crate::geometry::{CropRect, Point};

/// Drag target on a crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragHandle {
    Move,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl DragHandle {
    pub const ALL: [DragHandle; 9] = [
        Self::Move,
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    pub const fn moves_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    pub const fn moves_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    pub const fn moves_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    pub const fn moves_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

/// Pointer cursor to show over a handle. UX feedback only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Move,
    NsResize,
    EwResize,
    NwseResize,
    NeswResize,
}

impl CursorHint {
    pub fn for_handle(handle: Option<DragHandle>) -> Self {
        match handle {
            Some(DragHandle::Top | DragHandle::Bottom) => Self::NsResize,
            Some(DragHandle::Left | DragHandle::Right) => Self::EwResize,
            Some(DragHandle::TopLeft | DragHandle::BottomRight) => Self::NwseResize,
            Some(DragHandle::TopRight | DragHandle::BottomLeft) => Self::NeswResize,
            Some(DragHandle::Move) => Self::Move,
            None => Self::Default,
        }
    }

    /// CSS cursor keyword.
    pub const fn css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Move => "move",
            Self::NsResize => "ns-resize",
            Self::EwResize => "ew-resize",
            Self::NwseResize => "nwse-resize",
            Self::NeswResize => "nesw-resize",
        }
    }
}

/// Classifies pointer positions against a crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleClassifier {
    handle_size: f64,
}

impl Default for HandleClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLE_SIZE)
    }
}

impl HandleClassifier {
    pub const fn new(handle_size: f64) -> Self {
        Self { handle_size }
    }

    pub const fn handle_size(&self) -> f64 {
        self.handle_size
    }

    /// Returns the handle under `point`, if any.
    ///
    /// Corners are tested before edges: near a corner the edge bands overlap
    /// the corner square, and the corner must win.
    pub fn classify(&self, point: Point, crop: &CropRect) -> Option<DragHandle> {
        let near = |a: f64, b: f64| (a - b).abs() < self.handle_size;
        let (left, top, right, bottom) = (crop.x, crop.y, crop.right(), crop.bottom());
        let within_x = point.x >= left && point.x <= right;
        let within_y = point.y >= top && point.y <= bottom;

        let handle = if near(point.x, left) && near(point.y, top) {
            DragHandle::TopLeft
        } else if near(point.x, right) && near(point.y, top) {
            DragHandle::TopRight
        } else if near(point.x, left) && near(point.y, bottom) {
            DragHandle::BottomLeft
        } else if near(point.x, right) && near(point.y, bottom) {
            DragHandle::BottomRight
        } else if near(point.y, top) && within_x {
            DragHandle::Top
        } else if near(point.y, bottom) && within_x {
            DragHandle::Bottom
        } else if near(point.x, left) && within_y {
            DragHandle::Left
        } else if near(point.x, right) && within_y {
            DragHandle::Right
        } else if crop.contains_strict(point) {
            DragHandle::Move
        } else {
            return None;
        };
        Some(handle)
    }

    /// Cursor for whatever lies under `point`.
    pub fn cursor_at(&self, point: Point, crop: &CropRect) -> CursorHint {
        CursorHint::for_handle(self.classify(point, crop))
    }
}
