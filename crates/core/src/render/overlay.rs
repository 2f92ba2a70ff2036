//! Crop overlay drawn on top of the full rotated view while cropping.

use crate::geometry::CropRect;
use image::{Rgba, RgbaImage};
use tiny_skia::{ColorU8, FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Darkness of the region outside the crop (0.6 of full black).
pub const DIM_ALPHA: u8 = 153;
pub const BORDER_WIDTH: f32 = 2.0;
pub const CORNER_RADIUS: f32 = 8.0;
pub const EDGE_BAR_LENGTH: f32 = 30.0;
pub const EDGE_BAR_THICKNESS: f32 = 4.0;

/// Runs `draw` on a pixmap view of `surface` and copies the result back.
///
/// tiny-skia works on premultiplied pixels, `RgbaImage` holds straight alpha.
fn with_pixmap(surface: &mut RgbaImage, draw: impl FnOnce(&mut Pixmap)) {
    let (width, height) = surface.dimensions();
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return;
    };
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(surface.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    draw(&mut pixmap);

    for (dst, src) in surface.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
}

fn fill(pixmap: &mut Pixmap, rect: Option<Rect>, paint: &Paint) {
    if let Some(rect) = rect {
        pixmap.fill_rect(rect, paint, Transform::identity(), None);
    }
}

/// Dims everything outside `crop`, outlines it, and marks the four corner
/// handles (discs) and four edge handles (bars at each edge midpoint).
pub fn draw_crop_overlay(surface: &mut RgbaImage, crop: &CropRect) {
    let canvas_w = surface.width() as f32;
    let canvas_h = surface.height() as f32;
    let x = crop.x as f32;
    let y = crop.y as f32;
    let w = crop.width as f32;
    let h = crop.height as f32;

    with_pixmap(surface, |pixmap| {
        let mut dim = Paint::default();
        dim.set_color_rgba8(0, 0, 0, DIM_ALPHA);

        // Above, below, then the left and right bands between them
        fill(pixmap, Rect::from_xywh(0.0, 0.0, canvas_w, y), &dim);
        fill(
            pixmap,
            Rect::from_xywh(0.0, y + h, canvas_w, canvas_h - y - h),
            &dim,
        );
        fill(pixmap, Rect::from_xywh(0.0, y, x, h), &dim);
        fill(pixmap, Rect::from_xywh(x + w, y, canvas_w - x - w, h), &dim);

        let mut white = Paint::default();
        white.set_color_rgba8(255, 255, 255, 255);
        white.anti_alias = true;

        if let Some(outline) = Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect) {
            let stroke = Stroke {
                width: BORDER_WIDTH,
                ..Stroke::default()
            };
            pixmap.stroke_path(&outline, &white, &stroke, Transform::identity(), None);
        }

        for (cx, cy) in [(x, y), (x + w, y), (x, y + h), (x + w, y + h)] {
            if let Some(disc) = PathBuilder::from_circle(cx, cy, CORNER_RADIUS) {
                pixmap.fill_path(&disc, &white, FillRule::Winding, Transform::identity(), None);
            }
        }

        let half_bar = EDGE_BAR_LENGTH / 2.0;
        let half_thick = EDGE_BAR_THICKNESS / 2.0;
        let bars = [
            (x + w / 2.0 - half_bar, y - half_thick, EDGE_BAR_LENGTH, EDGE_BAR_THICKNESS),
            (x + w / 2.0 - half_bar, y + h - half_thick, EDGE_BAR_LENGTH, EDGE_BAR_THICKNESS),
            (x - half_thick, y + h / 2.0 - half_bar, EDGE_BAR_THICKNESS, EDGE_BAR_LENGTH),
            (x + w - half_thick, y + h / 2.0 - half_bar, EDGE_BAR_THICKNESS, EDGE_BAR_LENGTH),
        ];
        for (bx, by, bw, bh) in bars {
            fill(pixmap, Rect::from_xywh(bx, by, bw, bh), &white);
        }
    });
}
