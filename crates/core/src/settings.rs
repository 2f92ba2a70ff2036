//! User settings persisted between runs.
//!
//! Settings are stored as JSON in the user's config directory
//! (e.g., `~/.config/scan-editor/settings.json` on Linux).

use crate::error::Result;
use crate::geometry::Size;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 800;
pub const DEFAULT_OUTPUT_SUFFIX: &str = "-edited";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Viewport the canvas is laid out in when none is given.
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Appended to the input file stem to name the exported file.
    pub output_suffix: String,
}

impl Settings {
    /// Returns the path to the settings file, if a home directory is known.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "scan-editor", "scan-editor")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Loads settings from the user's config directory, falling back to
    /// defaults if the file is missing or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(settings) => Some(settings),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "ignoring malformed settings");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Persists settings to the user's config directory.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    pub fn viewport(&self) -> Size {
        Size::new(self.viewport_width, self.viewport_height)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}
