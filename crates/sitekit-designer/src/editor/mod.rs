//! Shape and placed-object edit engine.
//!
//! One target is edited at a time. A session moves through
//! `idle -> editing -> dragging* -> editing -> idle`; every mutating
//! operation first consults [`Scene::is_protected`] so protected targets
//! and the boundary region can be inspected but never changed.

mod operations;
mod types;

pub use types::{EditMode, EditSession, EditSettings, ScreenProjector, VertexHandle};

use std::sync::Arc;

use sitekit_core::{
    EditError, EditEvent, Error, EventBus, ObjectId, Result, SceneError, SceneEvent, SceneKey,
    ShapeId,
};

use crate::scene::Scene;

/// Edit state machine over a [`Scene`].
#[derive(Debug)]
pub struct EditEngine {
    session: Option<EditSession>,
    settings: EditSettings,
    bus: Arc<EventBus>,
}

impl EditEngine {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self::with_settings(bus, EditSettings::default())
    }

    pub fn with_settings(bus: Arc<EventBus>, settings: EditSettings) -> Self {
        Self {
            session: None,
            settings,
            bus,
        }
    }

    pub fn settings(&self) -> &EditSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: EditSettings) {
        self.settings = settings;
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    pub fn target(&self) -> Option<SceneKey> {
        self.session.as_ref().map(|s| s.target)
    }

    pub fn mode(&self) -> Option<EditMode> {
        self.session.as_ref().map(|s| s.mode)
    }

    pub fn handles(&self) -> &[VertexHandle] {
        self.session
            .as_ref()
            .map(|s| s.handles.as_slice())
            .unwrap_or(&[])
    }

    /// Open a session on `target`.
    ///
    /// Re-selecting the current target is a no-op. Selecting a different
    /// target while a session is open is rejected; stop that session first.
    pub fn start_edit(&mut self, scene: &Scene, target: SceneKey) -> Result<()> {
        if let Some(session) = &self.session {
            if session.target == target {
                return Ok(());
            }
            return Err(self.rejected(EditError::SessionActive {
                current: session.target,
            }));
        }

        if !scene.contains(target) {
            let err = match target {
                SceneKey::Shape(id) => SceneError::UnknownShape(id),
                SceneKey::Object(id) => SceneError::UnknownObject(id),
            };
            return Err(self.rejected(err));
        }

        let read_only = scene.is_protected(target);
        let handles = match target {
            SceneKey::Shape(id) if !read_only => build_handles(scene, id),
            _ => Vec::new(),
        };

        tracing::info!(
            "Editing {}{}",
            target,
            if read_only { " (read-only)" } else { "" }
        );
        self.session = Some(EditSession {
            target,
            mode: EditMode::Editing,
            handles,
            read_only,
            changed: false,
        });
        self.bus
            .publish(SceneEvent::Edit(EditEvent::SessionStarted { target, read_only }));
        Ok(())
    }

    /// Close the session.
    ///
    /// Returns the target when it changed and needs to be saved.
    pub fn stop_edit(&mut self, scene: &mut Scene) -> Option<SceneKey> {
        let session = self.session.take()?;
        if session.changed {
            scene.mark_occupancy_stale();
        }

        tracing::info!(
            "Stopped editing {} (changed: {})",
            session.target,
            session.changed
        );
        self.bus.publish(SceneEvent::Edit(EditEvent::SessionStopped {
            target: session.target,
            changed: session.changed,
        }));
        session.changed.then_some(session.target)
    }

    /// Pointer release: any drag returns to plain editing
    pub fn end_drag(&mut self) {
        if let Some(session) = &mut self.session {
            if session.mode.is_dragging() {
                tracing::debug!("Drag ended on {}", session.target);
                session.mode = EditMode::Editing;
            }
        }
    }

    /// Drop the session without publishing (target deleted or scene reloaded)
    pub fn reset(&mut self) {
        self.session = None;
    }

    /// Log and publish a rejected operation, handing the error back.
    fn rejected(&self, err: impl Into<Error>) -> Error {
        let err = err.into();
        let target = self.target();
        tracing::warn!("Edit rejected: {}", err);
        self.bus.publish(SceneEvent::Edit(EditEvent::Rejected {
            target,
            reason: err.to_string(),
        }));
        err
    }

    fn require_session(&self) -> std::result::Result<&EditSession, EditError> {
        self.session.as_ref().ok_or(EditError::NoSession)
    }

    /// Active session whose target may be mutated
    fn writable(&self, scene: &Scene) -> std::result::Result<&EditSession, EditError> {
        let session = self.require_session()?;
        if session.read_only {
            return Err(EditError::ReadOnly {
                target: session.target,
            });
        }
        if scene.is_protected(session.target) {
            return Err(EditError::Protected {
                target: session.target,
            });
        }
        Ok(session)
    }

    fn writable_shape(&self, scene: &Scene, operation: &str) -> Result<ShapeId> {
        let session = self.writable(scene)?;
        session.target.shape().ok_or_else(|| {
            EditError::WrongTarget {
                operation: operation.to_string(),
                target: session.target,
            }
            .into()
        })
    }

    fn writable_object(&self, scene: &Scene, operation: &str) -> Result<ObjectId> {
        let session = self.writable(scene)?;
        session.target.object().ok_or_else(|| {
            EditError::WrongTarget {
                operation: operation.to_string(),
                target: session.target,
            }
            .into()
        })
    }

    /// Reject operations that need the session out of any drag
    fn require_editing(&self, operation: &str) -> std::result::Result<(), EditError> {
        let session = self.require_session()?;
        match session.mode {
            EditMode::Editing => Ok(()),
            mode => Err(EditError::InvalidTransition {
                current: mode.name().to_string(),
                requested: operation.to_string(),
            }),
        }
    }

    fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.session.as_mut()
    }

    /// Record a change and rebuild the vertex handles of a shape target
    fn after_shape_change(&mut self, scene: &mut Scene, id: ShapeId) {
        scene.shape_changed(id);
        let handles = build_handles(scene, id);
        if let Some(session) = self.session_mut() {
            session.handles = handles;
            session.changed = true;
        }
    }

    fn mark_changed(&mut self) {
        if let Some(session) = self.session_mut() {
            session.changed = true;
        }
    }

    fn publish(&self, event: EditEvent) {
        self.bus.publish(SceneEvent::Edit(event));
    }
}

fn build_handles(scene: &Scene, id: ShapeId) -> Vec<VertexHandle> {
    scene
        .shape(id)
        .map(|shape| {
            shape
                .vertices()
                .iter()
                .enumerate()
                .map(|(index, &position)| VertexHandle { index, position })
                .collect()
        })
        .unwrap_or_default()
}
