//! Image decoding off the event loop, with supersession tickets.
//!
//! A session hands out a [`LoadTicket`] per load request. Only the result
//! carrying the most recent ticket may be applied; anything older finished
//! after a newer request was made and is dropped.

use crate::error::{EditorError, Result};
use image::{ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;

/// Where the raster to edit comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Identifies one load request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The decoded image replaced the session's image.
    Applied,
    /// A newer load was requested meanwhile; this result was discarded.
    Superseded,
}

/// Decodes `source` on the calling thread.
///
/// # Errors
///
/// Returns [`EditorError::Decode`] if the source cannot be read or is not a
/// supported image.
pub fn decode_blocking(source: &ImageSource) -> Result<RgbaImage> {
    let decoded = match source {
        ImageSource::Path(path) => ImageReader::open(path)
            .map_err(|e| EditorError::decode(format!("{}: {}", path.display(), e)))?
            .with_guessed_format()
            .map_err(|e| EditorError::decode(format!("{}: {}", path.display(), e)))?
            .decode(),
        ImageSource::Bytes(bytes) => ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| EditorError::decode(e.to_string()))?
            .decode(),
    }
    .map_err(|e| EditorError::decode(format!("{}: {}", source.describe(), e)))?;

    Ok(decoded.to_rgba8())
}

/// Decodes `source` on the blocking thread pool.
pub async fn decode(source: ImageSource) -> Result<RgbaImage> {
    tokio::task::spawn_blocking(move || decode_blocking(&source))
        .await
        .map_err(|e| EditorError::decode(format!("decoder task failed: {}", e)))?
}
