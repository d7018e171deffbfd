//! Single-document JSON gateway.
//!
//! The whole scene lives in one JSON file. Each call reads, updates and
//! rewrites it under an async lock; the file is replaced atomically via a
//! sibling temp file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitekit_core::{ConnectivityError, PersistedId};
use tokio::sync::Mutex;

use super::{PersistenceGateway, SceneRecord};

pub const DOCUMENT_VERSION: u32 = 1;

/// On-disk layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    /// Records keyed by persisted id.
    pub records: BTreeMap<String, SceneRecord>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            saved_at: Utc::now(),
            records: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct JsonFileGateway {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document; a missing file is an empty scene
    pub async fn read_document(&self) -> Result<SceneDocument, ConnectivityError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SceneDocument::default())
            }
            Err(e) => return Err(io_failure(&self.path, e)),
        };

        let document: SceneDocument =
            serde_json::from_str(&content).map_err(|e| ConnectivityError::Malformed {
                reason: format!("{}: {}", self.path.display(), e),
            })?;
        if document.version > DOCUMENT_VERSION {
            return Err(ConnectivityError::Malformed {
                reason: format!(
                    "{}: unsupported document version {}",
                    self.path.display(),
                    document.version
                ),
            });
        }
        Ok(document)
    }

    async fn write_document(&self, document: &mut SceneDocument) -> Result<(), ConnectivityError> {
        document.saved_at = Utc::now();
        let json = serde_json::to_string_pretty(document).map_err(|e| {
            ConnectivityError::Malformed {
                reason: e.to_string(),
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_failure(parent, e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_failure(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_failure(&self.path, e))
    }
}

fn io_failure(path: &Path, err: std::io::Error) -> ConnectivityError {
    tracing::warn!("Scene file {} not accessible: {}", path.display(), err);
    ConnectivityError::Unreachable {
        reason: format!("{}: {}", path.display(), err),
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileGateway {
    async fn save(&self, record: &SceneRecord) -> Result<PersistedId, ConnectivityError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;

        let id = record
            .persisted_id()
            .cloned()
            .unwrap_or_else(PersistedId::generate);
        let mut stored = record.clone();
        stored.set_persisted_id(Some(id.clone()));
        document.records.insert(id.0.clone(), stored);

        self.write_document(&mut document).await?;
        tracing::debug!("Saved {} to {}", id, self.path.display());
        Ok(id)
    }

    async fn load_all(&self) -> Result<Vec<SceneRecord>, ConnectivityError> {
        let _guard = self.lock.lock().await;
        let document = self.read_document().await?;
        Ok(document.records.into_values().collect())
    }

    async fn delete(&self, id: &PersistedId) -> Result<bool, ConnectivityError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        if document.records.remove(id.as_str()).is_none() {
            return Ok(false);
        }
        self.write_document(&mut document).await?;
        Ok(true)
    }
}
