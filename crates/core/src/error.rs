//! Error types for the scan-editor-core library.
//!
//! This module provides granular error variants for the editor's failure
//! modes. Decode and encode failures reject the operation and leave the
//! session untouched; surface failures during interactive redraws are
//! logged and swallowed by the session.

use thiserror::Error;

/// Errors that can occur within the scan-editor-core library.
#[derive(Error, Debug)]
pub enum EditorError {
    /// The image source could not be read or decoded.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// A drawing surface could not be allocated.
    #[error("Drawing surface unavailable: {0}")]
    Surface(String),

    /// The exported raster could not be encoded.
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// The operation needs a loaded image and the session has none.
    #[error("No image loaded")]
    NoImage,

    /// Configuration-related errors (unparsable or out-of-range values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a surface error with the given message.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Creates an encode error with the given message.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// A convenient alias for Result with [`EditorError`].
pub type Result<T> = std::result::Result<T, EditorError>;
