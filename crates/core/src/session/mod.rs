//! The editing session: one loaded image and everything done to it.
//!
//! # Architecture
//!
//! - [`state`]: the pure state machine ([`EditorState`], [`reduce`])
//! - [`loader`]: asynchronous decoding and supersession tickets
//!
//! [`ImageEditor`] ties these to the renderer, the crop interaction engine
//! and export. It owns all session state; nothing is global, and a new
//! editor is built per edit.
//!
//! # Usage
//!
//! ```ignore
//! use scan_editor_core::{EditorConfig, ImageEditor, ImageSource};
//! use scan_editor_core::geometry::Point;
//!
//! let mut editor = ImageEditor::new(EditorConfig::load()?);
//! editor.set_viewport(1280, 800);
//! editor.load_image(ImageSource::Path("scan.jpg".into())).await?;
//!
//! editor.rotate_right();
//! editor.enter_crop();
//! editor.pointer_down(Point::new(60.0, 60.0));
//! editor.pointer_move(Point::new(120.0, 90.0));
//! editor.pointer_up();
//! editor.apply_crop();
//!
//! let png = editor.export()?;
//! ```

pub mod loader;
pub mod state;

pub use loader::{ImageSource, LoadOutcome, LoadTicket};
pub use state::{reduce, EditMode, EditorAction, EditorState};

use crate::config::EditorConfig;
use crate::crop::{CropInteraction, CursorHint, DragHandle};
use crate::error::{EditorError, Result};
use crate::export::{self, ExportedImage};
use crate::geometry::{CropRect, Point, Size};
use crate::render::surface::SurfaceCache;
use crate::render::{Frame, FrameKind, RenderRequest, Renderer};
use image::RgbaImage;
use std::sync::Arc;

pub struct ImageEditor {
    config: EditorConfig,
    renderer: Renderer,
    interaction: CropInteraction,
    image: Option<Arc<RgbaImage>>,
    surfaces: SurfaceCache,
    state: EditorState,
    frame: Option<Frame>,
    viewport: Size,
    load_generation: u64,
}

impl ImageEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            renderer: Renderer::from_config(&config),
            interaction: CropInteraction::new(config.handle_size, config.min_crop_size),
            config,
            image: None,
            surfaces: SurfaceCache::default(),
            state: EditorState::default(),
            frame: None,
            viewport: Size::default(),
            load_generation: 0,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The most recent successfully rendered canvas.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_deref()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn has_changes(&self) -> bool {
        self.state.has_changes()
    }

    pub fn active_handle(&self) -> Option<DragHandle> {
        self.interaction.active_handle()
    }

    /// Registers a new load request. Any load started earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket(self.load_generation)
    }

    /// Applies the result of the load identified by `ticket`.
    ///
    /// Results of superseded loads are dropped without touching the session,
    /// whether they succeeded or not.
    ///
    /// # Errors
    ///
    /// Returns the decode error of a current load; the session keeps its
    /// previous image and state.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        decoded: Result<RgbaImage>,
    ) -> Result<LoadOutcome> {
        if ticket.0 != self.load_generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.load_generation,
                "dropping superseded image load"
            );
            return Ok(LoadOutcome::Superseded);
        }

        let image = decoded?;
        let (width, height) = image.dimensions();
        tracing::debug!(width, height, "image loaded into editor");

        self.interaction.end_drag();
        self.image = Some(Arc::new(image));
        self.surfaces.clear();
        self.frame = None;
        self.state = reduce(&self.state, EditorAction::Loaded(Size::new(width, height)));
        self.redraw();
        Ok(LoadOutcome::Applied)
    }

    /// Decodes `source` off the event loop and loads it into the session.
    pub async fn load_image(&mut self, source: ImageSource) -> Result<LoadOutcome> {
        let ticket = self.begin_load();
        let decoded = loader::decode(source).await;
        self.complete_load(ticket, decoded)
    }

    /// Discards the image and all edits. In-flight loads become stale.
    pub fn close(&mut self) {
        self.load_generation += 1;
        self.interaction.end_drag();
        self.image = None;
        self.surfaces.clear();
        self.frame = None;
        self.state = reduce(&self.state, EditorAction::Closed);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        let viewport = Size::new(width, height);
        if viewport != self.viewport {
            self.viewport = viewport;
            self.redraw();
        }
    }

    /// Repaints the canvas from the current state.
    ///
    /// Returns `false` when nothing was drawn. A failed render keeps the
    /// previous frame.
    pub fn redraw(&mut self) -> bool {
        let Some(image) = self.image.clone() else {
            return false;
        };
        if self.viewport.is_empty() {
            return false;
        }

        // A resize while cropping discards the crop, which needs one more pass.
        for _ in 0..2 {
            let request = RenderRequest {
                image: &image,
                rotation: self.state.rotation,
                crop: self.state.crop,
                crop_mode: self.state.is_cropping(),
                crop_scale: self.state.crop_scale,
                viewport: self.viewport,
            };
            let frame = match self.renderer.render_cached(&request, &mut self.surfaces) {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::warn!(%err, "redraw failed, keeping previous frame");
                    return false;
                }
            };

            let mode_before = self.state.mode;
            if frame.kind != FrameKind::Preview {
                self.state = reduce(
                    &self.state,
                    EditorAction::ViewRendered {
                        scale: frame.scale,
                        canvas: frame.canvas,
                    },
                );
            }
            self.frame = Some(frame);
            if !self.state.is_cropping() {
                self.interaction.end_drag();
            }
            if self.state.mode == mode_before {
                break;
            }
        }
        true
    }

    /// Applies `action` and redraws if anything changed.
    fn dispatch(&mut self, action: EditorAction) -> bool {
        let next = reduce(&self.state, action);
        if next == self.state {
            return false;
        }
        self.state = next;
        self.redraw();
        true
    }

    pub fn rotate_left(&mut self) -> bool {
        self.interaction.end_drag();
        self.dispatch(EditorAction::RotateLeft)
    }

    pub fn rotate_right(&mut self) -> bool {
        self.interaction.end_drag();
        self.dispatch(EditorAction::RotateRight)
    }

    /// Starts cropping with a rectangle inset from the canvas edges.
    ///
    /// From the cropped preview the full-view metrics are refreshed first so
    /// the new rectangle is seeded against the canvas it will be drawn on.
    pub fn enter_crop(&mut self) -> bool {
        self.interaction.end_drag();
        if self.state.mode == EditMode::Previewing {
            self.refresh_view_metrics();
        }
        self.dispatch(EditorAction::EnterCrop {
            margin: self.config.crop_margin,
        })
    }

    pub fn apply_crop(&mut self) -> bool {
        self.interaction.end_drag();
        self.dispatch(EditorAction::ApplyCrop)
    }

    pub fn cancel_crop(&mut self) -> bool {
        self.interaction.end_drag();
        self.dispatch(EditorAction::CancelCrop)
    }

    pub fn reset(&mut self) -> bool {
        self.interaction.end_drag();
        self.dispatch(EditorAction::Reset)
    }

    /// Replaces the crop rectangle outright. Only honoured while cropping.
    pub fn set_crop_area(&mut self, crop: CropRect) -> bool {
        self.interaction.end_drag();
        self.dispatch(EditorAction::SetCropArea(crop))
    }

    fn refresh_view_metrics(&mut self) {
        let image_size = self.state.image_size;
        match self
            .renderer
            .full_view_metrics(image_size, self.state.rotation, self.viewport)
        {
            Ok((scale, canvas)) => {
                self.state = reduce(&self.state, EditorAction::ViewRendered { scale, canvas });
            }
            Err(err) => tracing::warn!(%err, "could not measure the full view"),
        }
    }

    /// Pointer pressed at `point` (canvas pixels). Starts a drag when the
    /// press lands on the crop rectangle while cropping.
    pub fn pointer_down(&mut self, point: Point) -> Option<DragHandle> {
        if !self.state.is_cropping() {
            return None;
        }
        let crop = self.state.crop?;
        let handle = self.interaction.start_drag(point, &crop);
        if let Some(handle) = handle {
            tracing::debug!(handle = handle.label(), x = point.x, y = point.y, "crop drag started");
        }
        handle
    }

    /// Pointer moved to `point`. Resizes or moves the crop during a drag;
    /// otherwise only reports the cursor for what lies under the pointer.
    pub fn pointer_move(&mut self, point: Point) -> CursorHint {
        if !self.state.is_cropping() {
            return CursorHint::Default;
        }
        if let Some(handle) = self.interaction.active_handle() {
            if let Some(next) = self.interaction.update_drag(point, self.state.canvas) {
                self.dispatch(EditorAction::SetCropArea(next));
            }
            return CursorHint::for_handle(Some(handle));
        }

        match self.state.crop {
            Some(crop) => self.interaction.cursor_at(point, &crop),
            None => CursorHint::Default,
        }
    }

    pub fn pointer_up(&mut self) {
        self.interaction.end_drag();
    }

    /// Exports the edited image at full resolution.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoImage`] without an image, otherwise the
    /// surface or encode error of the export.
    pub fn export(&self) -> Result<ExportedImage> {
        let image = self.image.as_deref().ok_or(EditorError::NoImage)?;
        export::export(
            image,
            self.state.rotation,
            self.state.crop.as_ref(),
            self.state.crop_scale,
            self.renderer.limits(),
        )
    }
}

impl Default for ImageEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rotation;
    use image::{GenericImageView, ImageFormat, Rgba};
    use std::io::Cursor;

    fn source(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 251) as u8, (y % 241) as u8, 90, 255])
        })
    }

    fn png_bytes(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("test image should encode");
        bytes
    }

    /// Editor with `image` loaded and a viewport leaving `room` for the canvas.
    fn editor_with(image: RgbaImage, room: (u32, u32)) -> ImageEditor {
        let mut editor = ImageEditor::default();
        let padding = editor.config().viewport_padding as u32;
        editor.set_viewport(room.0 + padding, room.1 + padding);
        let ticket = editor.begin_load();
        let outcome = editor
            .complete_load(ticket, Ok(image))
            .expect("load should apply");
        assert_eq!(outcome, LoadOutcome::Applied);
        editor
    }

    #[test]
    fn loading_renders_the_first_frame() {
        let editor = editor_with(source(800, 600), (400, 400));
        assert_eq!(editor.state().mode, EditMode::Viewing);
        assert_eq!(editor.state().scale, 0.5);
        assert_eq!(editor.state().canvas, Size::new(400, 300));
        let frame = editor.frame().expect("a frame was drawn");
        assert_eq!(frame.kind, FrameKind::Full);
        assert_eq!(frame.pixels.dimensions(), (400, 300));
    }

    #[test]
    fn rotate_right_then_crop_exports_the_selected_region() {
        let image = source(800, 600);
        let mut editor = editor_with(image.clone(), (2000, 2000));
        editor.rotate_right();
        assert_eq!(editor.state().canvas, Size::new(600, 800));
        assert_eq!(editor.state().scale, 1.0);

        assert!(editor.enter_crop());
        assert_eq!(editor.state().crop, Some(CropRect::new(60.0, 80.0, 480.0, 640.0)));
        assert!(editor.apply_crop());
        assert_eq!(editor.frame().map(|f| f.kind), Some(FrameKind::Preview));

        let exported = editor.export().expect("export should succeed");
        assert_eq!((exported.width, exported.height), (480, 640));

        let decoded = image::load_from_memory(&exported.bytes)
            .expect("valid PNG")
            .to_rgba8();
        let rotated = image::imageops::rotate90(&image);
        assert_eq!(decoded.get_pixel(0, 0), rotated.get_pixel(60, 80));
        assert_eq!(decoded.get_pixel(479, 639), rotated.get_pixel(539, 719));
    }

    #[test]
    fn preview_matches_export_at_unit_scale() {
        let mut editor = editor_with(source(300, 200), (1000, 1000));
        editor.enter_crop();
        editor.apply_crop();

        let preview = editor.frame().expect("preview frame").pixels.clone();
        let exported = editor.export().expect("export should succeed");
        let decoded = image::load_from_memory(&exported.bytes)
            .expect("valid PNG")
            .to_rgba8();
        assert_eq!(preview, decoded);
    }

    #[test]
    fn export_uses_crop_scale_even_after_the_view_shrinks() {
        let mut editor = editor_with(source(800, 600), (400, 400));
        editor.enter_crop();
        // Seeded at scale 0.5 on a 400x300 canvas.
        assert_eq!(editor.state().crop, Some(CropRect::new(40.0, 30.0, 320.0, 240.0)));
        editor.apply_crop();

        let padding = editor.config().viewport_padding as u32;
        editor.set_viewport(200 + padding, 200 + padding);
        assert_eq!(editor.state().mode, EditMode::Previewing);

        let exported = editor.export().expect("export should succeed");
        assert_eq!((exported.width, exported.height), (640, 480));
    }

    #[test]
    fn drag_updates_crop_through_pointer_events() {
        let mut editor = editor_with(source(500, 400), (500, 400));
        editor.enter_crop();
        assert_eq!(editor.state().crop, Some(CropRect::new(50.0, 40.0, 400.0, 320.0)));

        assert_eq!(editor.pointer_down(Point::new(450.0, 200.0)), Some(DragHandle::Right));
        assert_eq!(editor.pointer_move(Point::new(0.0, 200.0)), CursorHint::EwResize);
        assert_eq!(editor.state().crop.map(|c| c.width), Some(50.0));
        editor.pointer_up();
        assert_eq!(editor.active_handle(), None);

        // Hover after release only reports a cursor.
        assert_eq!(editor.pointer_move(Point::new(75.0, 200.0)), CursorHint::Move);
        assert_eq!(editor.state().crop.map(|c| c.width), Some(50.0));
        assert_eq!(editor.frame().map(|f| f.kind), Some(FrameKind::Cropping));
    }

    #[test]
    fn explicit_crop_area_is_exported() {
        let mut editor = editor_with(source(800, 600), (2000, 2000));
        assert!(!editor.set_crop_area(CropRect::new(0.0, 0.0, 100.0, 100.0)));

        editor.enter_crop();
        assert!(editor.set_crop_area(CropRect::new(100.0, 50.0, 200.0, 150.0)));
        editor.apply_crop();
        let exported = editor.export().expect("export should succeed");
        assert_eq!((exported.width, exported.height), (200, 150));
    }

    #[test]
    fn resize_mid_drag_cannot_push_the_reseeded_crop_off_canvas() {
        let mut editor = editor_with(source(800, 600), (800, 600));
        editor.enter_crop();
        assert_eq!(editor.pointer_down(Point::new(400.0, 300.0)), Some(DragHandle::Move));

        let padding = editor.config().viewport_padding as u32;
        editor.set_viewport(200 + padding, 200 + padding);
        assert_eq!(editor.state().mode, EditMode::Viewing);
        assert_eq!(editor.active_handle(), None);
        assert_eq!(editor.pointer_move(Point::new(401.0, 301.0)), CursorHint::Default);

        editor.enter_crop();
        let seeded = editor.state().crop;
        assert_eq!(seeded, Some(CropRect::new(20.0, 15.0, 160.0, 120.0)));
        editor.pointer_move(Point::new(401.0, 301.0));
        assert_eq!(editor.state().crop, seeded);
        let crop = editor.state().crop.expect("crop is seeded");
        assert!(crop.is_within(editor.state().canvas));
    }

    #[test]
    fn reentering_crop_ends_the_running_drag() {
        let mut editor = editor_with(source(500, 400), (500, 400));
        editor.enter_crop();
        editor.apply_crop();
        editor.enter_crop();
        assert_eq!(editor.pointer_down(Point::new(250.0, 200.0)), Some(DragHandle::Move));
        editor.enter_crop();
        assert_eq!(editor.active_handle(), None);
    }

    #[test]
    fn pointer_is_ignored_outside_crop_mode() {
        let mut editor = editor_with(source(500, 400), (500, 400));
        assert_eq!(editor.pointer_down(Point::new(250.0, 200.0)), None);
        assert_eq!(editor.pointer_move(Point::new(250.0, 200.0)), CursorHint::Default);
    }

    #[test]
    fn rotating_clears_crop() {
        let mut editor = editor_with(source(500, 400), (500, 400));
        editor.enter_crop();
        assert!(editor.state().crop.is_some());
        editor.rotate_left();
        assert_eq!(editor.state().crop, None);
        assert_eq!(editor.state().rotation, Rotation::Deg270);
        assert!(editor.has_changes());
        editor.reset();
        assert!(!editor.has_changes());
    }

    #[test]
    fn viewport_change_while_cropping_discards_the_crop() {
        let mut editor = editor_with(source(800, 600), (400, 400));
        editor.enter_crop();
        let padding = editor.config().viewport_padding as u32;
        editor.set_viewport(200 + padding, 200 + padding);

        assert_eq!(editor.state().mode, EditMode::Viewing);
        assert_eq!(editor.state().crop, None);
        assert_eq!(editor.state().canvas, Size::new(200, 150));
        assert_eq!(editor.frame().map(|f| f.kind), Some(FrameKind::Full));
    }

    #[test]
    fn entering_crop_from_preview_reseeds_against_the_full_view() {
        let mut editor = editor_with(source(800, 600), (400, 400));
        editor.enter_crop();
        editor.apply_crop();
        let padding = editor.config().viewport_padding as u32;
        editor.set_viewport(200 + padding, 200 + padding);

        assert!(editor.enter_crop());
        assert_eq!(editor.state().mode, EditMode::Cropping);
        assert_eq!(editor.state().canvas, Size::new(200, 150));
        assert_eq!(editor.state().crop, Some(CropRect::new(20.0, 15.0, 160.0, 120.0)));
        assert_eq!(editor.state().crop_scale, 0.25);
    }

    #[test]
    fn failed_redraw_keeps_the_previous_frame() {
        let mut editor = editor_with(source(100, 100), (100, 100));
        let before = editor.frame().expect("initial frame").pixels.clone();
        editor.set_viewport(10, 10);
        assert_eq!(editor.viewport(), Size::new(10, 10));
        assert_eq!(editor.frame().map(|f| &f.pixels), Some(&before));
    }

    #[test]
    fn superseded_load_is_discarded() {
        let mut editor = editor_with(source(100, 100), (500, 500));
        let stale = editor.begin_load();
        let current = editor.begin_load();

        let outcome = editor
            .complete_load(stale, Ok(source(10, 10)))
            .expect("stale loads are not errors");
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert_eq!(editor.image().map(|i| i.dimensions()), Some((100, 100)));

        let outcome = editor
            .complete_load(current, Ok(source(20, 30)))
            .expect("current load applies");
        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(editor.state().image_size, Size::new(20, 30));
    }

    #[test]
    fn failed_load_leaves_session_untouched() {
        let mut editor = editor_with(source(100, 100), (500, 500));
        editor.rotate_right();
        let before = editor.state().clone();

        let ticket = editor.begin_load();
        let err = editor
            .complete_load(ticket, Err(EditorError::decode("truncated")))
            .expect_err("decode error surfaces");
        assert!(matches!(err, EditorError::Decode(_)));
        assert_eq!(editor.state(), &before);
        assert_eq!(editor.image().map(|i| i.dimensions()), Some((100, 100)));
    }

    #[tokio::test]
    async fn load_image_decodes_and_renders() {
        let mut editor = ImageEditor::default();
        editor.set_viewport(1000, 1000);
        let outcome = editor
            .load_image(ImageSource::Bytes(png_bytes(&source(64, 32))))
            .await
            .expect("PNG should load");
        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(editor.state().image_size, Size::new(64, 32));
        assert_eq!(editor.frame().map(|f| f.canvas), Some(Size::new(64, 32)));

        let exported = editor.export().expect("export should succeed");
        let decoded = image::load_from_memory(&exported.bytes).expect("valid PNG");
        assert_eq!(decoded.dimensions(), (64, 32));
    }

    #[tokio::test]
    async fn load_image_rejects_garbage_without_mutation() {
        let mut editor = ImageEditor::default();
        let err = editor
            .load_image(ImageSource::Bytes(vec![0, 1, 2, 3]))
            .await
            .expect_err("garbage should fail");
        assert!(matches!(err, EditorError::Decode(_)));
        assert_eq!(editor.state().mode, EditMode::Empty);
        assert!(matches!(editor.export(), Err(EditorError::NoImage)));
    }

    #[test]
    fn close_empties_the_session_and_invalidates_loads() {
        let mut editor = editor_with(source(100, 100), (500, 500));
        let ticket = editor.begin_load();
        editor.close();
        assert_eq!(editor.state().mode, EditMode::Empty);
        assert!(editor.frame().is_none());
        let outcome = editor
            .complete_load(ticket, Ok(source(10, 10)))
            .expect("stale loads are not errors");
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert!(editor.image().is_none());
    }
}
