//! Editor state and its transition function.
//!
//! The editor follows a small state machine:
//! `Empty` -> `Viewing` (image loaded) <-> `Cropping` (crop overlay shown)
//! <-> `Previewing` (crop applied, cropped view shown).
//!
//! [`reduce`] is pure: it takes the current state and an action and returns
//! the next state, so transitions can be tested without any surface.

use crate::geometry::{CropRect, Rotation, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// No image loaded.
    #[default]
    Empty,
    /// Image shown, no crop rectangle.
    Viewing,
    /// Crop rectangle being adjusted on top of the full view.
    Cropping,
    /// Crop applied; only the cropped region is shown.
    Previewing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub mode: EditMode,
    /// Source image dimensions, before rotation.
    pub image_size: Size,
    pub rotation: Rotation,
    /// Display scale of the last full-view render.
    pub scale: f64,
    /// Canvas size of the last full-view render; empty until first render.
    pub canvas: Size,
    /// Crop rectangle in the canvas space it was drawn in.
    pub crop: Option<CropRect>,
    /// Display scale in effect when `crop` was seeded.
    pub crop_scale: f64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            mode: EditMode::Empty,
            image_size: Size::default(),
            rotation: Rotation::Deg0,
            scale: 1.0,
            canvas: Size::default(),
            crop: None,
            crop_scale: 1.0,
        }
    }
}

impl EditorState {
    pub fn has_changes(&self) -> bool {
        self.rotation != Rotation::Deg0 || self.crop.is_some()
    }

    pub fn is_cropping(&self) -> bool {
        self.mode == EditMode::Cropping
    }

    pub fn has_image(&self) -> bool {
        self.mode != EditMode::Empty
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorAction {
    /// A new image of the given size replaced whatever was loaded.
    Loaded(Size),
    /// The editor was closed.
    Closed,
    RotateLeft,
    RotateRight,
    /// Seed a crop rectangle inset by `margin` of each canvas dimension.
    EnterCrop { margin: f64 },
    ApplyCrop,
    CancelCrop,
    Reset,
    SetCropArea(CropRect),
    /// A full-view render happened at this scale and canvas size.
    ViewRendered { scale: f64, canvas: Size },
}

/// Computes the state that follows `state` under `action`.
///
/// Actions that make no sense in the current state (rotating with no image,
/// applying a crop that is not being edited) leave the state unchanged.
pub fn reduce(state: &EditorState, action: EditorAction) -> EditorState {
    use EditMode::*;

    let next = match (state.mode, action) {
        (_, EditorAction::Loaded(image_size)) => Some(EditorState {
            mode: Viewing,
            image_size,
            ..EditorState::default()
        }),
        (_, EditorAction::Closed) => Some(EditorState::default()),
        (Empty, _) => None,
        (_, EditorAction::RotateLeft) => Some(rotated(state, state.rotation.rotate_left())),
        (_, EditorAction::RotateRight) => Some(rotated(state, state.rotation.rotate_right())),
        (_, EditorAction::EnterCrop { margin }) if !state.canvas.is_empty() => Some(EditorState {
            mode: Cropping,
            crop: Some(CropRect::centered_inset(state.canvas, margin)),
            crop_scale: state.scale,
            ..state.clone()
        }),
        (Cropping, EditorAction::ApplyCrop) => Some(EditorState {
            mode: Previewing,
            ..state.clone()
        }),
        (Cropping | Previewing, EditorAction::CancelCrop) => Some(EditorState {
            mode: Viewing,
            crop: None,
            ..state.clone()
        }),
        (_, EditorAction::Reset) => Some(EditorState {
            mode: Viewing,
            rotation: Rotation::Deg0,
            crop: None,
            ..state.clone()
        }),
        (Cropping, EditorAction::SetCropArea(crop)) if crop.has_area() => Some(EditorState {
            crop: Some(crop),
            ..state.clone()
        }),
        (Cropping, EditorAction::ViewRendered { scale, canvas })
            if !state.canvas.is_empty() && canvas != state.canvas =>
        {
            // The rectangle was drawn against the old canvas; it no longer
            // describes the same region.
            tracing::debug!(
                old = %state.canvas,
                new = %canvas,
                "canvas resized while cropping, discarding crop"
            );
            Some(EditorState {
                mode: Viewing,
                scale,
                canvas,
                crop: None,
                ..state.clone()
            })
        }
        (_, EditorAction::ViewRendered { scale, canvas }) => Some(EditorState {
            scale,
            canvas,
            ..state.clone()
        }),
        _ => None,
    };

    next.unwrap_or_else(|| {
        tracing::debug!(mode = ?state.mode, action = ?action, "ignoring action");
        state.clone()
    })
}

fn rotated(state: &EditorState, rotation: Rotation) -> EditorState {
    EditorState {
        mode: EditMode::Viewing,
        rotation,
        crop: None,
        ..state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewing() -> EditorState {
        let loaded = reduce(&EditorState::default(), EditorAction::Loaded(Size::new(800, 600)));
        reduce(
            &loaded,
            EditorAction::ViewRendered {
                scale: 0.5,
                canvas: Size::new(400, 300),
            },
        )
    }

    fn cropping() -> EditorState {
        reduce(&viewing(), EditorAction::EnterCrop { margin: 0.1 })
    }

    #[test]
    fn loading_enters_viewing_with_a_clean_slate() {
        let state = viewing();
        assert_eq!(state.mode, EditMode::Viewing);
        assert_eq!(state.image_size, Size::new(800, 600));
        assert_eq!(state.rotation, Rotation::Deg0);
        assert!(!state.has_changes());

        let reloaded = reduce(&cropping(), EditorAction::Loaded(Size::new(10, 10)));
        assert_eq!(reloaded.mode, EditMode::Viewing);
        assert_eq!(reloaded.crop, None);
        assert!(reloaded.canvas.is_empty());
    }

    #[test]
    fn empty_state_ignores_editing_actions() {
        let empty = EditorState::default();
        for action in [
            EditorAction::RotateLeft,
            EditorAction::RotateRight,
            EditorAction::EnterCrop { margin: 0.1 },
            EditorAction::ApplyCrop,
            EditorAction::Reset,
        ] {
            assert_eq!(reduce(&empty, action), empty, "{action:?}");
        }
    }

    #[test]
    fn enter_crop_seeds_inset_rectangle_and_records_scale() {
        let state = cropping();
        assert_eq!(state.mode, EditMode::Cropping);
        assert_eq!(state.crop, Some(CropRect::new(40.0, 30.0, 320.0, 240.0)));
        assert_eq!(state.crop_scale, 0.5);
        assert!(state.has_changes());
    }

    #[test]
    fn enter_crop_requires_a_rendered_canvas() {
        let loaded = reduce(&EditorState::default(), EditorAction::Loaded(Size::new(800, 600)));
        let next = reduce(&loaded, EditorAction::EnterCrop { margin: 0.1 });
        assert_eq!(next, loaded);
    }

    #[test]
    fn apply_immediately_after_enter_keeps_seeded_rectangle() {
        let entered = cropping();
        let applied = reduce(&entered, EditorAction::ApplyCrop);
        assert_eq!(applied.mode, EditMode::Previewing);
        assert_eq!(applied.crop, entered.crop);
        assert_eq!(applied.crop_scale, entered.crop_scale);
    }

    #[test]
    fn rotation_always_clears_the_crop() {
        let rotated_left = reduce(&cropping(), EditorAction::RotateLeft);
        assert_eq!(rotated_left.crop, None);
        assert_eq!(rotated_left.rotation, Rotation::Deg270);
        assert_eq!(rotated_left.mode, EditMode::Viewing);

        let previewing = reduce(&cropping(), EditorAction::ApplyCrop);
        let rotated_right = reduce(&previewing, EditorAction::RotateRight);
        assert_eq!(rotated_right.crop, None);
        assert_eq!(rotated_right.rotation, Rotation::Deg90);
        assert!(rotated_right.has_changes());
    }

    #[test]
    fn cancel_discards_crop_and_reset_restores_everything() {
        let cancelled = reduce(&cropping(), EditorAction::CancelCrop);
        assert_eq!(cancelled.mode, EditMode::Viewing);
        assert_eq!(cancelled.crop, None);

        let edited = reduce(&reduce(&viewing(), EditorAction::RotateRight), EditorAction::EnterCrop {
            margin: 0.1,
        });
        let reset = reduce(&edited, EditorAction::Reset);
        assert_eq!(reset.mode, EditMode::Viewing);
        assert_eq!(reset.rotation, Rotation::Deg0);
        assert_eq!(reset.crop, None);
        assert!(!reset.has_changes());
    }

    #[test]
    fn crop_area_updates_only_while_cropping() {
        let moved = CropRect::new(10.0, 10.0, 100.0, 100.0);
        let state = reduce(&cropping(), EditorAction::SetCropArea(moved));
        assert_eq!(state.crop, Some(moved));

        let previewing = reduce(&cropping(), EditorAction::ApplyCrop);
        assert_eq!(reduce(&previewing, EditorAction::SetCropArea(moved)), previewing);

        let degenerate = CropRect::new(10.0, 10.0, 0.0, 100.0);
        assert_eq!(reduce(&cropping(), EditorAction::SetCropArea(degenerate)), cropping());
    }

    #[test]
    fn canvas_resize_while_cropping_discards_the_crop() {
        let same = reduce(
            &cropping(),
            EditorAction::ViewRendered {
                scale: 0.5,
                canvas: Size::new(400, 300),
            },
        );
        assert_eq!(same, cropping());

        let resized = reduce(
            &cropping(),
            EditorAction::ViewRendered {
                scale: 0.25,
                canvas: Size::new(200, 150),
            },
        );
        assert_eq!(resized.mode, EditMode::Viewing);
        assert_eq!(resized.crop, None);
        assert_eq!(resized.canvas, Size::new(200, 150));
    }

    #[test]
    fn view_updates_while_previewing_keep_the_applied_crop() {
        let previewing = reduce(&cropping(), EditorAction::ApplyCrop);
        let resized = reduce(
            &previewing,
            EditorAction::ViewRendered {
                scale: 0.25,
                canvas: Size::new(200, 150),
            },
        );
        assert_eq!(resized.mode, EditMode::Previewing);
        assert_eq!(resized.crop, previewing.crop);
        assert_eq!(resized.crop_scale, 0.5);
    }

    #[test]
    fn closing_returns_to_empty() {
        assert_eq!(reduce(&cropping(), EditorAction::Closed), EditorState::default());
    }
}
