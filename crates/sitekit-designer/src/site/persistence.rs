//! Save submission, outcome handling and loading.

use sitekit_core::{PersistenceEvent, Result, SceneEvent, SceneKey};

use super::SiteState;
use crate::persistence::{SaveOutcome, SceneRecord};
use crate::scene::Scene;

impl SiteState {
    /// Queue a save of the current state of `key`
    pub(super) fn persist(&mut self, key: SceneKey) {
        match SceneRecord::capture(&self.scene, key) {
            Ok(record) => self.saves.submit_save(key, record),
            Err(e) => tracing::warn!("Not saving {}: {}", key, e),
        }
    }

    /// Queue a save of `key` regardless of edit state
    pub fn save(&mut self, key: SceneKey) -> Result<()> {
        let record = SceneRecord::capture(&self.scene, key)?;
        self.saves.submit_save(key, record);
        Ok(())
    }

    /// Apply finished save requests to the scene.
    ///
    /// Returns the number of outcomes handled. Outcomes for entities that
    /// were deleted in the meantime are only reported.
    pub fn apply_save_outcomes(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(outcome) = self.outcomes.try_recv() {
            handled += 1;
            let event = match outcome {
                SaveOutcome::Saved { key, persisted_id } => {
                    if self.scene.contains(key) {
                        if let Err(e) = self.scene.set_persisted_id(key, persisted_id.clone()) {
                            tracing::warn!("Could not record id of {}: {}", key, e);
                        }
                    }
                    PersistenceEvent::Saved { key, persisted_id }
                }
                SaveOutcome::Failed { key, error } => PersistenceEvent::Failed {
                    key,
                    error: error.to_string(),
                },
                SaveOutcome::Deleted { key, .. } => PersistenceEvent::Deleted { key },
            };
            self.bus.publish(SceneEvent::Persistence(event));
        }
        handled
    }

    /// Wait for all queued requests and apply their outcomes
    pub async fn flush_saves(&mut self) -> usize {
        self.saves.flush().await;
        self.apply_save_outcomes()
    }

    /// Replace the scene with everything stored in the gateway.
    ///
    /// Boundary records are restored first so every shape is validated
    /// against the boundary. Records that cannot be restored are logged and
    /// skipped; the current scene is only replaced once loading succeeded.
    /// Returns the number of records restored.
    pub async fn load_from_gateway(&mut self) -> Result<usize> {
        self.flush_saves().await;
        let mut records = self.saves.gateway().load_all().await?;
        records.sort_by_key(|r| !r.is_boundary());

        let mut scene = Scene::new(self.bus.clone());
        let mut restored = Vec::with_capacity(records.len());
        let mut skipped = 0;
        for record in records {
            let persisted = record.persisted_id().cloned();
            match record.restore_into(&mut scene, &self.catalog) {
                Ok(key) => restored.push((key, persisted)),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(
                        "Skipping stored record {}: {}",
                        persisted.as_ref().map_or("<unsaved>", |id| id.as_str()),
                        e
                    );
                }
            }
        }

        self.editor.reset();
        self.drawing.cancel();
        self.scene = scene;
        self.saves.forget_known();
        for (key, persisted) in &restored {
            if let Some(id) = persisted {
                self.saves.remember(*key, id.clone());
            }
        }

        if skipped > 0 {
            tracing::warn!("Loaded {} record(s), skipped {}", restored.len(), skipped);
        } else {
            tracing::info!("Loaded {} record(s)", restored.len());
        }
        Ok(restored.len())
    }
}
