use std::env;
use std::str::FromStr;

use crate::error::{EditorError, Result};
use dotenvy::dotenv;

/// Pixel distance within which a pointer grabs a crop handle.
pub const DEFAULT_HANDLE_SIZE: f64 = 20.0;
/// Smallest crop edge a resize drag may produce, in canvas pixels.
pub const DEFAULT_MIN_CROP_SIZE: f64 = 50.0;
/// Inset of the seeded crop rectangle, as a fraction of each canvas dimension.
pub const DEFAULT_CROP_MARGIN: f64 = 0.1;
/// Space reserved around the canvas inside its container.
pub const DEFAULT_VIEWPORT_PADDING: f64 = 32.0;
pub const DEFAULT_MAX_SURFACE_PIXELS: u64 = 100_000_000;

#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
    pub handle_size: f64,
    pub min_crop_size: f64,
    pub crop_margin: f64,
    pub viewport_padding: f64,
    pub max_surface_pixels: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            handle_size: DEFAULT_HANDLE_SIZE,
            min_crop_size: DEFAULT_MIN_CROP_SIZE,
            crop_margin: DEFAULT_CROP_MARGIN,
            viewport_padding: DEFAULT_VIEWPORT_PADDING,
            max_surface_pixels: DEFAULT_MAX_SURFACE_PIXELS,
        }
    }
}

impl EditorConfig {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults
    /// for keys that are absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            handle_size: parse_or(&lookup, "SCAN_EDITOR_HANDLE_SIZE", defaults.handle_size)?,
            min_crop_size: parse_or(&lookup, "SCAN_EDITOR_MIN_CROP_SIZE", defaults.min_crop_size)?,
            crop_margin: parse_or(&lookup, "SCAN_EDITOR_CROP_MARGIN", defaults.crop_margin)?,
            viewport_padding: parse_or(
                &lookup,
                "SCAN_EDITOR_VIEWPORT_PADDING",
                defaults.viewport_padding,
            )?,
            max_surface_pixels: parse_or(
                &lookup,
                "SCAN_EDITOR_MAX_SURFACE_PIXELS",
                defaults.max_surface_pixels,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.handle_size > 0.0) {
            return Err(EditorError::config("handle size must be positive"));
        }
        if !(self.min_crop_size > 0.0) {
            return Err(EditorError::config("minimum crop size must be positive"));
        }
        if !(0.0..0.5).contains(&self.crop_margin) {
            return Err(EditorError::config("crop margin must be in [0, 0.5)"));
        }
        if !(self.viewport_padding >= 0.0) {
            return Err(EditorError::config("viewport padding must not be negative"));
        }
        if self.max_surface_pixels == 0 {
            return Err(EditorError::config("surface pixel limit must be positive"));
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| EditorError::config(format!("{key} has an invalid value: {raw:?}"))),
        None => Ok(default),
    }
}
