//! Export of the edited image at full source resolution.
//!
//! The export reproduces what the interactive view showed: the image is
//! rotated about its centre at full resolution, and the crop, drawn in
//! canvas space, is mapped back by the scale it was drawn at. The preview
//! renderer cuts its pixels with the same [`PixelRect`] conversion, so what
//! was previewed is what gets exported.

use crate::error::{EditorError, Result};
use crate::geometry::{CropRect, PixelRect, Rotation, Size};
use crate::render::surface::{self, SurfaceLimits};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

pub const EXPORT_MIME: &str = "image/png";

/// PNG-encoded result of an export, ready for a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    pub const fn mime(&self) -> &'static str {
        EXPORT_MIME
    }

    /// Name under which an edit of `original` should be stored:
    /// `scan.jpg` becomes `scan-edited.png` for the suffix `-edited`.
    pub fn file_name_for(original: &str, suffix: &str) -> String {
        let stem = Path::new(original)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or("image");
        format!("{stem}{suffix}.png")
    }

    /// Encodes an already rendered surface, such as a preview frame.
    pub fn from_surface(surface: &RgbaImage) -> Result<Self> {
        Ok(Self {
            bytes: encode_png(surface)?,
            width: surface.width(),
            height: surface.height(),
        })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Exports `image` under `rotation`, cropped to `crop`.
///
/// `crop_scale` must be the display scale in effect when `crop` was drawn;
/// the crop is ignored when it has no area.
///
/// # Errors
///
/// Returns [`EditorError::Surface`] if a full-resolution surface cannot be
/// allocated and [`EditorError::Encode`] if PNG encoding fails.
pub fn export(
    image: &RgbaImage,
    rotation: Rotation,
    crop: Option<&CropRect>,
    crop_scale: f64,
    limits: SurfaceLimits,
) -> Result<ExportedImage> {
    let rotated = surface::rotate_full(image, rotation, limits)?;

    let region = crop.and_then(|crop| PixelRect::from_crop(crop, crop_scale, dimensions(&rotated)));
    let output = match region {
        Some(region) => surface::copy_region(&rotated, region, limits)?,
        None => rotated,
    };

    let exported = ExportedImage::from_surface(&output)?;
    tracing::info!(
        rotation = %rotation,
        width = exported.width,
        height = exported.height,
        bytes = exported.bytes.len(),
        "exported edited image"
    );
    Ok(exported)
}

fn dimensions(image: &RgbaImage) -> Size {
    let (width, height) = image.dimensions();
    Size::new(width, height)
}

/// Encodes a surface as PNG in memory.
fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);

    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| EditorError::encode(format!("PNG encoding failed: {}", e)))?;

    Ok(buffer)
}
