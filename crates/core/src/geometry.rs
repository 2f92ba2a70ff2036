//! Geometry shared by the renderer, the crop interaction engine and export.
//!
//! Three coordinate spaces are involved:
//!
//! - **source space**: pixels of the decoded image as loaded;
//! - **rotated space**: source pixels after the current quarter-turn rotation,
//!   before any display scaling;
//! - **canvas space**: rotated space multiplied by the display scale, which is
//!   where the crop rectangle and pointer coordinates live.
//!
//! A crop rectangle drawn in canvas space maps back to rotated space by
//! dividing by the scale that was active when it was drawn (`crop_scale`).

/// Slack added before flooring scaled sizes so `800 * (600 / 800)` lands on
/// 600 rather than 599.
const SIZE_EPSILON: f64 = 1e-6;

/// Quarter-turn rotation, clockwise in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Normalizes any multiple of 90 (negative included) into a rotation.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Counter-clockwise quarter turn.
    pub const fn rotate_left(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg270,
            Self::Deg90 => Self::Deg0,
            Self::Deg180 => Self::Deg90,
            Self::Deg270 => Self::Deg180,
        }
    }

    /// Clockwise quarter turn.
    pub const fn rotate_right(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Whole-pixel dimensions of an image or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box of an image after rotation: width and height swap on 90/270.
pub fn rotated_dimensions(width: u32, height: u32, rotation: Rotation) -> Size {
    if rotation.swaps_axes() {
        Size::new(height, width)
    } else {
        Size::new(width, height)
    }
}

/// Largest scale `<= 1` at which `content` fits inside `max`.
///
/// Never upscales. Degenerate bounds (zero or negative room) collapse to 0
/// rather than producing a negative scale.
pub fn fit_scale(content_w: f64, content_h: f64, max_w: f64, max_h: f64) -> f64 {
    1.0_f64
        .min(max_w / content_w)
        .min(max_h / content_h)
        .max(0.0)
}

/// Pixel size of a canvas showing `rotated` at `scale`; at least 1x1.
pub fn canvas_size(rotated: Size, scale: f64) -> Size {
    Size::new(
        scaled_dimension(rotated.width_f64(), scale),
        scaled_dimension(rotated.height_f64(), scale),
    )
}

pub(crate) fn scaled_dimension(length: f64, scale: f64) -> u32 {
    let scaled = (length * scale + SIZE_EPSILON).floor();
    if scaled.is_finite() {
        (scaled as u32).max(1)
    } else {
        1
    }
}

/// Maps a pointer position on a displayed element (which the layout may have
/// shrunk or stretched) into canvas pixels.
pub fn display_to_canvas(point: Point, displayed_w: f64, displayed_h: f64, canvas: Size) -> Point {
    let scale_x = if displayed_w > 0.0 {
        canvas.width_f64() / displayed_w
    } else {
        1.0
    };
    let scale_y = if displayed_h > 0.0 {
        canvas.height_f64() / displayed_h
    } else {
        1.0
    };
    Point::new(point.x * scale_x, point.y * scale_y)
}

/// A crop rectangle in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle inset from every side of `canvas` by `margin` of that
    /// dimension.
    pub fn centered_inset(canvas: Size, margin: f64) -> Self {
        let width = canvas.width_f64();
        let height = canvas.height_f64();
        Self::new(
            width * margin,
            height * margin,
            width * (1.0 - margin * 2.0),
            height * (1.0 - margin * 2.0),
        )
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Strict interior test; points on the border are not inside.
    pub fn contains_strict(&self, point: Point) -> bool {
        point.x > self.x && point.x < self.right() && point.y > self.y && point.y < self.bottom()
    }

    pub fn is_within(&self, canvas: Size) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= canvas.width_f64()
            && self.bottom() <= canvas.height_f64()
    }

    /// Converts from the canvas space the rectangle was drawn in back to
    /// rotated-image space.
    pub fn to_rotated_space(&self, crop_scale: f64) -> Self {
        Self::new(
            self.x / crop_scale,
            self.y / crop_scale,
            self.width / crop_scale,
            self.height / crop_scale,
        )
    }
}

/// Integer sub-rectangle of a rotated-space surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Snaps a canvas-space crop to the pixels it covers on a rotated surface
    /// of size `bounds`.
    ///
    /// Each edge is rounded independently so adjacent crops share edges, and
    /// the result is clamped into the surface with at least one pixel per
    /// axis. Returns `None` for crops without area or a non-positive scale.
    pub fn from_crop(crop: &CropRect, crop_scale: f64, bounds: Size) -> Option<Self> {
        if !crop.has_area() || !(crop_scale > 0.0) || bounds.is_empty() {
            return None;
        }
        let rotated = crop.to_rotated_space(crop_scale);
        let (x, width) = snap_span(rotated.x, rotated.right(), bounds.width);
        let (y, height) = snap_span(rotated.y, rotated.bottom(), bounds.height);
        Some(Self::new(x, y, width, height))
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

fn snap_span(start: f64, end: f64, limit: u32) -> (u32, u32) {
    let limit_f = f64::from(limit);
    let start = start.round().clamp(0.0, limit_f - 1.0) as u32;
    let end = end.round().clamp(0.0, limit_f) as u32;
    (start, end.saturating_sub(start).max(1))
}
