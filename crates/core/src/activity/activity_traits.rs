//! Repository and upload traits for the activity log.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::activity::ActivityLogEntry;
use crate::errors::{Result, StoreError};

/// Durable, ordered storage for activity entries.
///
/// The log is append-only; the only permitted mutation is flipping an
/// entry's `synced` flag after server acknowledgment.
#[async_trait]
pub trait ActivityLogRepositoryTrait: Send + Sync {
    /// Append an entry to the log.
    async fn append(&self, entry: &ActivityLogEntry) -> Result<()>;

    /// Unsynced entries in creation order.
    async fn list_unsynced(&self) -> Result<Vec<ActivityLogEntry>>;

    /// Mark an entry as acknowledged by the server.
    async fn mark_synced(&self, id: &str) -> Result<()>;

    /// Most recent entries (synced or not), newest first, for audit views.
    async fn list_recent(&self, limit: usize) -> Result<Vec<ActivityLogEntry>>;
}

/// Uploads one entry to the server.
///
/// Implemented by the API gateway; any failure is treated as retryable by
/// the service layer.
#[async_trait]
pub trait ActivityUploaderTrait: Send + Sync {
    async fn upload(&self, entry: &ActivityLogEntry) -> Result<()>;
}

/// In-memory activity log.
///
/// Used in tests and by embedders that manage persistence elsewhere.
/// Entries keep their insertion order, which doubles as creation order.
#[derive(Default)]
pub struct MemoryActivityLogRepository {
    entries: Mutex<Vec<ActivityLogEntry>>,
}

impl MemoryActivityLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in creation order. Test helper.
    pub fn entries(&self) -> Vec<ActivityLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivityLogRepositoryTrait for MemoryActivityLogRepository {
    async fn append(&self, entry: &ActivityLogEntry) -> Result<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_unsynced(&self) -> Result<Vec<ActivityLogEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| !e.synced)
            .cloned()
            .collect())
    }

    async fn mark_synced(&self, id: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        match entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.synced = true;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("activity entry {}", id)).into()),
        }
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ActivityLogEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}
