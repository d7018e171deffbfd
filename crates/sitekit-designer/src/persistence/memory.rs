//! In-memory gateway.
//!
//! Counts calls and can inject latency or failures, which makes it the
//! backend of choice for tests and dry runs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sitekit_core::{ConnectivityError, PersistedId};

use super::{PersistenceGateway, SceneRecord};

#[derive(Debug, Default)]
pub struct MemoryGateway {
    records: Mutex<BTreeMap<String, SceneRecord>>,
    /// Order in which saves completed.
    save_log: Mutex<Vec<PersistedId>>,
    save_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    failing: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`
    pub fn with_latency(latency: Duration) -> Self {
        let gateway = Self::new();
        *gateway.latency.lock() = Some(latency);
        gateway
    }

    /// Make subsequent calls fail until switched back
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed running at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn save_log(&self) -> Vec<PersistedId> {
        self.save_log.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn get(&self, id: &PersistedId) -> Option<SceneRecord> {
        self.records.lock().get(id.as_str()).cloned()
    }

    /// Pre-populate a record (as if loaded from an earlier session)
    pub fn insert(&self, mut record: SceneRecord) -> PersistedId {
        let id = record
            .persisted_id()
            .cloned()
            .unwrap_or_else(PersistedId::generate);
        record.set_persisted_id(Some(id.clone()));
        self.records.lock().insert(id.0.clone(), record);
        id
    }

    async fn enter(&self) -> Result<(), ConnectivityError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            return Err(ConnectivityError::Unreachable {
                reason: "memory gateway is offline".to_string(),
            });
        }
        Ok(())
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn save(&self, record: &SceneRecord) -> Result<PersistedId, ConnectivityError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let id = self.insert(record.clone());
        self.save_log.lock().push(id.clone());
        tracing::debug!("Memory gateway stored {}", id);
        self.leave();
        Ok(id)
    }

    async fn load_all(&self) -> Result<Vec<SceneRecord>, ConnectivityError> {
        self.enter().await?;
        let records = self.records.lock().values().cloned().collect();
        self.leave();
        Ok(records)
    }

    async fn delete(&self, id: &PersistedId) -> Result<bool, ConnectivityError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        let removed = self.records.lock().remove(id.as_str()).is_some();
        self.leave();
        Ok(removed)
    }
}
