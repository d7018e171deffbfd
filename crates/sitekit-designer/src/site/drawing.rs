//! Drawing flow: collect clicks, then build, validate and save the shape.

use sitekit_core::{DrawingEvent, Position, Result, SceneEvent, SceneKey};

use super::SiteState;
use crate::drawing::{DrawMode, DrawingOutcome, PreviewFeedback};

impl SiteState {
    /// Category given to shapes drawn from now on
    pub fn set_drawing_category(&mut self, tag: Option<&str>) {
        self.drawing_category = tag.map(|t| self.catalog.canonical_tag(Some(t)));
    }

    /// Start drawing; closes any edit session first.
    pub fn begin_drawing(&mut self, mode: DrawMode) {
        self.stop_editing();
        self.drawing.begin(mode);
    }

    pub fn drawing_click(&mut self, position: Position) -> Result<usize> {
        Ok(self.drawing.click(position)?)
    }

    /// Track the pointer with the floating vertex
    pub fn drawing_pointer_move(&mut self, position: Position) -> Option<PreviewFeedback> {
        let frame = self.scene.boundary_frame();
        self.drawing.pointer_move(position, frame.as_ref())
    }

    /// Finish gesture.
    ///
    /// Returns the new shape, or `None` when the drawing had too few points
    /// and was discarded. Nothing is persisted for a discarded drawing.
    pub fn finish_drawing(&mut self) -> Result<Option<SceneKey>> {
        let (kind, vertices) = match self.drawing.finish()? {
            DrawingOutcome::Discarded { .. } => return Ok(None),
            DrawingOutcome::Completed { kind, vertices } => (kind, vertices),
        };

        let id = self.scene.add_shape(kind, vertices)?;
        let tag = self.catalog.canonical_tag(self.drawing_category.as_deref());
        self.scene.shape_mut(id)?.set_category(tag);

        tracing::info!("Drew {} ({})", id, kind.name());
        self.bus
            .publish(SceneEvent::Drawing(DrawingEvent::Finished { shape: id }));

        let key = SceneKey::Shape(id);
        self.persist(key);
        Ok(Some(key))
    }

    pub fn cancel_drawing(&mut self) {
        self.drawing.cancel();
    }
}
