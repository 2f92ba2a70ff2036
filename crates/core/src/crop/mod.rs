//! Crop rectangle interaction.
//!
//! - [`handle`]: hit-testing pointer positions against the rectangle's
//!   handles and mapping handles to cursor hints
//! - [`drag`]: the press/move/release lifecycle that turns pointer motion
//!   into a new, clamped rectangle

mod drag;
mod handle;

pub use drag::{CropInteraction, DragSnapshot};
pub use handle::{CursorHint, DragHandle, HandleClassifier};
