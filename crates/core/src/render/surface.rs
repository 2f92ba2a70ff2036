//! Raster surfaces: allocation limits, quarter-turn rotation, scaling and
//! sub-rectangle extraction.
//!
//! Both the interactive renderer and the export pipeline draw through these
//! helpers so the two always produce the same pixels for the same rotation
//! and crop. [`SurfaceCache`] keeps the rotated and display-scaled surfaces
//! between interactive redraws.

use crate::error::{EditorError, Result};
use crate::geometry::{rotated_dimensions, PixelRect, Rotation, Size};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Upper bound on surface allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceLimits {
    pub max_pixels: u64,
}

impl SurfaceLimits {
    pub const fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }

    /// Fails with [`EditorError::Surface`] if a surface of `size` may not be
    /// allocated.
    pub fn check(&self, size: Size) -> Result<()> {
        if size.is_empty() {
            return Err(EditorError::surface(format!("surface {size} has no area")));
        }
        let pixels = u64::from(size.width) * u64::from(size.height);
        if pixels > self.max_pixels {
            return Err(EditorError::surface(format!(
                "surface {size} exceeds the {} pixel limit",
                self.max_pixels
            )));
        }
        Ok(())
    }
}

/// Renders `image` rotated about its centre onto a surface the size of its
/// rotated bounding box, at full resolution.
pub fn rotate_full(image: &RgbaImage, rotation: Rotation, limits: SurfaceLimits) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    limits.check(rotated_dimensions(width, height, rotation))?;
    Ok(match rotation {
        Rotation::Deg0 => image.clone(),
        Rotation::Deg90 => imageops::rotate90(image),
        Rotation::Deg180 => imageops::rotate180(image),
        Rotation::Deg270 => imageops::rotate270(image),
    })
}

/// Resamples `surface` to exactly `target`.
pub fn scale_to(surface: &RgbaImage, target: Size, limits: SurfaceLimits) -> Result<RgbaImage> {
    limits.check(target)?;
    if surface.dimensions() == (target.width, target.height) {
        return Ok(surface.clone());
    }
    Ok(imageops::resize(
        surface,
        target.width,
        target.height,
        FilterType::Triangle,
    ))
}

/// Copies the `region` sub-rectangle of `surface` onto a new surface.
pub fn copy_region(surface: &RgbaImage, region: PixelRect, limits: SurfaceLimits) -> Result<RgbaImage> {
    limits.check(region.size())?;
    let (width, height) = surface.dimensions();
    if u64::from(region.x) + u64::from(region.width) > u64::from(width)
        || u64::from(region.y) + u64::from(region.height) > u64::from(height)
    {
        return Err(EditorError::surface(format!(
            "region {}x{}+{}+{} lies outside the {width}x{height} surface",
            region.width, region.height, region.x, region.y
        )));
    }
    Ok(imageops::crop_imm(surface, region.x, region.y, region.width, region.height).to_image())
}

/// Rotated and display-scaled surfaces of one source image, reused across
/// redraws until the rotation or the canvas size changes.
///
/// The cache does not know which image filled it; owners clear it when the
/// image changes.
#[derive(Debug, Default)]
pub struct SurfaceCache {
    rotated: Option<(Rotation, RgbaImage)>,
    scaled: Option<(Rotation, Size, RgbaImage)>,
}

impl SurfaceCache {
    pub fn clear(&mut self) {
        self.rotated = None;
        self.scaled = None;
    }

    /// Full-resolution rotation of `image`.
    pub fn rotated<'a>(
        &'a mut self,
        image: &'a RgbaImage,
        rotation: Rotation,
        limits: SurfaceLimits,
    ) -> Result<&'a RgbaImage> {
        rotated_in(&mut self.rotated, image, rotation, limits)
    }

    /// Rotation of `image` resampled to `canvas`.
    pub fn scaled<'a>(
        &'a mut self,
        image: &'a RgbaImage,
        rotation: Rotation,
        canvas: Size,
        limits: SurfaceLimits,
    ) -> Result<&'a RgbaImage> {
        let hit = matches!(&self.scaled, Some((cached, size, _)) if *cached == rotation && *size == canvas);
        if !hit {
            let rotated = rotated_in(&mut self.rotated, image, rotation, limits)?;
            let surface = scale_to(rotated, canvas, limits)?;
            tracing::debug!(%rotation, %canvas, "display surface rebuilt");
            self.scaled = Some((rotation, canvas, surface));
        }
        let (_, _, surface) = self.scaled.as_ref().expect("display surface cached above");
        Ok(surface)
    }
}

fn rotated_in<'a>(
    slot: &'a mut Option<(Rotation, RgbaImage)>,
    image: &'a RgbaImage,
    rotation: Rotation,
    limits: SurfaceLimits,
) -> Result<&'a RgbaImage> {
    if rotation == Rotation::Deg0 {
        let (width, height) = image.dimensions();
        limits.check(Size::new(width, height))?;
        return Ok(image);
    }
    if matches!(slot, Some((cached, _)) if *cached == rotation) {
        if let Some((_, surface)) = slot {
            return Ok(surface);
        }
    }
    let surface = rotate_full(image, rotation, limits)?;
    Ok(&slot.insert((rotation, surface)).1)
}
