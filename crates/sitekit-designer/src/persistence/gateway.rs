//! Persistence gateway interface

use async_trait::async_trait;
use sitekit_core::{ConnectivityError, PersistedId};

use super::SceneRecord;

/// Backend that stores scene records.
///
/// Implementations must be safe to call from several tasks at once; the
/// [`SaveQueue`](super::SaveQueue) already guarantees that requests for the
/// same scene key never overlap.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Store `record`, returning its persisted id.
    ///
    /// A record carrying a persisted id overwrites that entry; otherwise a
    /// new id is assigned.
    async fn save(&self, record: &SceneRecord) -> Result<PersistedId, ConnectivityError>;

    /// Every stored record
    async fn load_all(&self) -> Result<Vec<SceneRecord>, ConnectivityError>;

    /// Remove an entry; returns false when it did not exist.
    async fn delete(&self, id: &PersistedId) -> Result<bool, ConnectivityError>;
}
