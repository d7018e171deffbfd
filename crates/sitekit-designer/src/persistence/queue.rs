//! Per-key serialized save queue.
//!
//! Each scene key has a lane. A request waits on the oneshot of the
//! request before it in the same lane, so at most one gateway call per key
//! is in flight and requests complete in submission order. Different keys
//! proceed concurrently. The persisted id resolved by a request is handed
//! to the next one, so a shape saved twice before the first save returns
//! still maps to a single stored entry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sitekit_core::{ConnectivityError, PersistedId, SceneKey};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{PersistenceGateway, SceneRecord};

/// Result of a queued request, delivered through the outcome channel.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved {
        key: SceneKey,
        persisted_id: PersistedId,
    },
    Failed {
        key: SceneKey,
        error: ConnectivityError,
    },
    Deleted {
        key: SceneKey,
        /// False when the backend had no such entry (or it was never saved).
        removed: bool,
    },
}

impl SaveOutcome {
    pub fn key(&self) -> SceneKey {
        match self {
            SaveOutcome::Saved { key, .. }
            | SaveOutcome::Failed { key, .. }
            | SaveOutcome::Deleted { key, .. } => *key,
        }
    }
}

type LaneTail = oneshot::Receiver<Option<PersistedId>>;

pub struct SaveQueue {
    gateway: Arc<dyn PersistenceGateway>,
    lanes: HashMap<SceneKey, LaneTail>,
    known: Arc<Mutex<HashMap<SceneKey, PersistedId>>>,
    outcomes: mpsc::UnboundedSender<SaveOutcome>,
    pending: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for SaveQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveQueue")
            .field("lanes", &self.lanes.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl SaveQueue {
    /// Create a queue and the receiving end of its outcome channel.
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
    ) -> (Self, mpsc::UnboundedReceiver<SaveOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let queue = Self {
            gateway,
            lanes: HashMap::new(),
            known: Arc::new(Mutex::new(HashMap::new())),
            outcomes: tx,
            pending: Vec::new(),
        };
        (queue, rx)
    }

    pub fn gateway(&self) -> &Arc<dyn PersistenceGateway> {
        &self.gateway
    }

    /// Seed the id of an entity loaded from the backend
    pub fn remember(&self, key: SceneKey, persisted_id: PersistedId) {
        self.known.lock().insert(key, persisted_id);
    }

    /// Drop every remembered id; used when the scene is replaced
    pub fn forget_known(&self) {
        self.known.lock().clear();
    }

    pub fn known_id(&self, key: SceneKey) -> Option<PersistedId> {
        self.known.lock().get(&key).cloned()
    }

    /// Requests submitted and not yet awaited by [`flush`](Self::flush)
    pub fn pending_count(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }

    /// Queue a save of `record` for `key`.
    pub fn submit_save(&mut self, key: SceneKey, record: SceneRecord) {
        if !self.runtime_available(key) {
            return;
        }
        let (previous, done) = self.open_lane(key);
        let gateway = self.gateway.clone();
        let known = self.known.clone();
        let outcomes = self.outcomes.clone();

        let handle = tokio::spawn(async move {
            let inherited = wait_for(previous).await;
            let mut record = record;
            if record.persisted_id().is_none() {
                let id = inherited.clone().or_else(|| known.lock().get(&key).cloned());
                record.set_persisted_id(id);
            }

            let (resolved, outcome) = match gateway.save(&record).await {
                Ok(persisted_id) => {
                    tracing::info!("Saved {} as {}", key, persisted_id);
                    known.lock().insert(key, persisted_id.clone());
                    (
                        Some(persisted_id.clone()),
                        SaveOutcome::Saved { key, persisted_id },
                    )
                }
                Err(error) => {
                    tracing::warn!("Saving {} failed: {}", key, error);
                    (
                        record.persisted_id().cloned(),
                        SaveOutcome::Failed { key, error },
                    )
                }
            };

            let _ = done.send(resolved);
            let _ = outcomes.send(outcome);
        });
        self.pending.push(handle);
    }

    /// Queue deletion of `key`'s stored entry.
    ///
    /// `persisted_id` is the id the scene knew about; if absent the lane or
    /// the known ids are consulted. Nothing is sent to the backend when the
    /// entity was never saved.
    pub fn submit_delete(&mut self, key: SceneKey, persisted_id: Option<PersistedId>) {
        if !self.runtime_available(key) {
            return;
        }
        let (previous, done) = self.open_lane(key);
        let gateway = self.gateway.clone();
        let known = self.known.clone();
        let outcomes = self.outcomes.clone();

        let handle = tokio::spawn(async move {
            let inherited = wait_for(previous).await;
            let remembered = known.lock().remove(&key);
            let target = persisted_id.or(inherited).or(remembered);

            let outcome = match target {
                None => SaveOutcome::Deleted {
                    key,
                    removed: false,
                },
                Some(id) => match gateway.delete(&id).await {
                    Ok(removed) => {
                        tracing::info!("Deleted {} ({})", key, id);
                        SaveOutcome::Deleted { key, removed }
                    }
                    Err(error) => {
                        tracing::warn!("Deleting {} failed: {}", key, error);
                        SaveOutcome::Failed { key, error }
                    }
                },
            };

            let _ = done.send(None);
            let _ = outcomes.send(outcome);
        });
        self.pending.push(handle);
    }

    /// Wait until every submitted request has completed
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!("Save task aborted: {}", e);
            }
        }
        self.lanes.clear();
    }

    /// Requests need a tokio runtime; without one they fail immediately
    fn runtime_available(&self, key: SceneKey) -> bool {
        if tokio::runtime::Handle::try_current().is_ok() {
            return true;
        }
        tracing::error!("No async runtime; cannot persist {}", key);
        let _ = self.outcomes.send(SaveOutcome::Failed {
            key,
            error: ConnectivityError::Unreachable {
                reason: "no async runtime".to_string(),
            },
        });
        false
    }

    /// Open lanes; resolved ones are dropped when the next request is queued
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    fn open_lane(&mut self, key: SceneKey) -> (Option<LaneTail>, oneshot::Sender<Option<PersistedId>>) {
        self.pending.retain(|h| !h.is_finished());
        self.prune_lanes();
        let (tx, rx) = oneshot::channel();
        let previous = self.lanes.insert(key, rx);
        (previous, tx)
    }

    /// Drop lanes whose last request has resolved.
    ///
    /// A resolved id is kept in the known ids so the next request for the
    /// key still picks it up.
    fn prune_lanes(&mut self) {
        let known = self.known.clone();
        self.lanes.retain(|key, tail| match tail.try_recv() {
            Err(oneshot::error::TryRecvError::Empty) => true,
            Ok(Some(id)) => {
                known.lock().entry(*key).or_insert(id);
                false
            }
            Ok(None) | Err(oneshot::error::TryRecvError::Closed) => false,
        });
    }
}

/// Resolve the previous request in a lane; a dropped sender counts as done
async fn wait_for(previous: Option<LaneTail>) -> Option<PersistedId> {
    match previous {
        Some(rx) => rx.await.ok().flatten(),
        None => None,
    }
}
