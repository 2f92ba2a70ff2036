//! Scan Editor Core Library
//!
//! This library provides the rotate and crop pipeline of an interactive
//! image editor for scanned documents.
//!
//! # Overview
//!
//! An image is loaded into an editing session, rotated in quarter turns,
//! cropped with a draggable rectangle and exported at full resolution. The
//! library handles:
//!
//! - **Geometry**: the source, rotated and canvas coordinate spaces via [`geometry`]
//! - **Rendering**: fitting the rotated image to a viewport via [`render`]
//! - **Crop Interaction**: handle hit-testing and drag updates via [`crop`]
//! - **Export**: full-resolution PNG output via [`export`]
//!
//! # Quick Start
//!
//! The simplest way to use the library is through the [`ImageEditor`] session:
//!
//! ```ignore
//! use scan_editor_core::{EditorConfig, ImageEditor, ImageSource};
//!
//! scan_editor_core::init();
//! let mut editor = ImageEditor::new(EditorConfig::load()?);
//! editor.set_viewport(1280, 800);
//! editor.load_image(ImageSource::Path("scan.jpg".into())).await?;
//!
//! editor.rotate_right();
//! editor.enter_crop();
//! editor.apply_crop();
//!
//! let png = editor.export()?;
//! png.write_to("scan-edited.png".as_ref())?;
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: Tunables loaded from the environment
//! - [`crop`]: Crop handles, cursors and drag arithmetic
//! - [`error`]: Error types and result aliases
//! - [`export`]: Full-resolution export
//! - [`geometry`]: Rotations, sizes and rectangles
//! - [`render`]: Canvas rendering and the crop overlay
//! - [`session`]: The editing session and its state machine
//! - [`settings`]: User settings persisted between runs

pub mod config;
pub mod crop;
pub mod error;
pub mod export;
pub mod geometry;
pub mod render;
pub mod session;
pub mod settings;

// Re-export primary types for convenience
pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use export::ExportedImage;
pub use geometry::{CropRect, Point, Rotation, Size};
pub use session::{EditMode, EditorState, ImageEditor, ImageSource, LoadOutcome};
pub use settings::Settings;

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup. This loads `.env` files if
/// present so [`EditorConfig::load`] sees their values.
pub fn init() {
    let _ = dotenvy::dotenv();
}
