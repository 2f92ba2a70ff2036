//! Canvas rendering for the interactive editor.
//!
//! The renderer is a pure function of its [`RenderRequest`]: every frame is
//! drawn onto a fresh copy of the display surface, so redrawing on every
//! state change never accumulates artifacts. The rotated and scaled surfaces
//! underneath may come from a [`SurfaceCache`].
//!
//! - [`surface`]: allocation limits and the rotate/scale/copy primitives
//!   shared with export
//! - [`overlay`]: dimming and handle markers drawn while cropping

pub mod overlay;
pub mod surface;

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::geometry::{
    canvas_size, fit_scale, rotated_dimensions, CropRect, PixelRect, Rotation, Size,
};
use image::RgbaImage;
use surface::{SurfaceCache, SurfaceLimits};

/// Everything a redraw depends on.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub image: &'a RgbaImage,
    pub rotation: Rotation,
    pub crop: Option<CropRect>,
    /// `true` while the crop rectangle is being edited.
    pub crop_mode: bool,
    /// Display scale in effect when `crop` was drawn.
    pub crop_scale: f64,
    /// Size of the container the canvas is laid out in.
    pub viewport: Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Full rotated image, no crop overlay.
    Full,
    /// Full rotated image with the crop overlay on top.
    Cropping,
    /// Only the applied crop region, fitted to the viewport.
    Preview,
}

/// A rendered canvas plus the view parameters it was drawn with.
#[derive(Debug, Clone)]
pub struct Frame {
    pub pixels: RgbaImage,
    pub scale: f64,
    pub canvas: Size,
    pub kind: FrameKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderer {
    padding: f64,
    limits: SurfaceLimits,
}

impl Renderer {
    pub const fn new(padding: f64, limits: SurfaceLimits) -> Self {
        Self { padding, limits }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(
            config.viewport_padding,
            SurfaceLimits::new(config.max_surface_pixels),
        )
    }

    pub const fn limits(&self) -> SurfaceLimits {
        self.limits
    }

    /// Room available to the canvas inside `viewport`.
    pub fn fit_region(&self, viewport: Size) -> (f64, f64) {
        (
            viewport.width_f64() - self.padding,
            viewport.height_f64() - self.padding,
        )
    }

    pub fn render(&self, request: &RenderRequest<'_>) -> Result<Frame> {
        self.render_cached(request, &mut SurfaceCache::default())
    }

    /// Like [`Renderer::render`], reusing surfaces kept in `cache` for the
    /// same image. The caller clears the cache when the image changes.
    pub fn render_cached(
        &self,
        request: &RenderRequest<'_>,
        cache: &mut SurfaceCache,
    ) -> Result<Frame> {
        match request.crop {
            Some(crop) if !request.crop_mode => self.render_preview(request, &crop, cache),
            crop => self.render_full(request, crop.filter(|_| request.crop_mode), cache),
        }
    }

    /// Scale and canvas size of the full rotated view, without drawing it.
    pub fn full_view_metrics(
        &self,
        image: Size,
        rotation: Rotation,
        viewport: Size,
    ) -> Result<(f64, Size)> {
        let rotated = rotated_dimensions(image.width, image.height, rotation);
        let (max_w, max_h) = self.fit_region(viewport);
        let scale = fit_scale(rotated.width_f64(), rotated.height_f64(), max_w, max_h);
        if !(scale > 0.0) {
            return Err(EditorError::surface(format!(
                "viewport {viewport} leaves no room for the canvas"
            )));
        }
        let canvas = canvas_size(rotated, scale);
        self.limits.check(canvas)?;
        Ok((scale, canvas))
    }

    fn render_full(
        &self,
        request: &RenderRequest<'_>,
        overlay: Option<CropRect>,
        cache: &mut SurfaceCache,
    ) -> Result<Frame> {
        let (width, height) = request.image.dimensions();
        let (scale, canvas) = self.full_view_metrics(
            Size::new(width, height),
            request.rotation,
            request.viewport,
        )?;

        let mut pixels = cache
            .scaled(request.image, request.rotation, canvas, self.limits)?
            .clone();

        let kind = match overlay {
            Some(crop) => {
                overlay::draw_crop_overlay(&mut pixels, &crop);
                FrameKind::Cropping
            }
            None => FrameKind::Full,
        };

        Ok(Frame {
            pixels,
            scale,
            canvas,
            kind,
        })
    }

    /// Draws only the applied crop, cut from the full-resolution rotated
    /// surface with the same pixel rectangle export uses.
    fn render_preview(
        &self,
        request: &RenderRequest<'_>,
        crop: &CropRect,
        cache: &mut SurfaceCache,
    ) -> Result<Frame> {
        let (width, height) = request.image.dimensions();
        let rotated = rotated_dimensions(width, height, request.rotation);
        let region = PixelRect::from_crop(crop, request.crop_scale, rotated)
            .ok_or_else(|| EditorError::surface("applied crop has no area"))?;

        let (max_w, max_h) = self.fit_region(request.viewport);
        let scale = fit_scale(
            f64::from(region.width),
            f64::from(region.height),
            max_w,
            max_h,
        );
        if !(scale > 0.0) {
            return Err(EditorError::surface(format!(
                "viewport {} leaves no room for the preview",
                request.viewport
            )));
        }
        let canvas = canvas_size(region.size(), scale);
        self.limits.check(canvas)?;

        let full = cache.rotated(request.image, request.rotation, self.limits)?;
        let cropped = surface::copy_region(full, region, self.limits)?;
        let pixels = surface::scale_to(&cropped, canvas, self.limits)?;

        Ok(Frame {
            pixels,
            scale,
            canvas,
            kind: FrameKind::Preview,
        })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}
