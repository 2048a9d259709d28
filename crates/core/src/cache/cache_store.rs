//! Cache store trait and the in-memory implementation.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::cache::{CacheEntry, EntityKind};
use crate::errors::Result;
use crate::trading::ScopeKey;

/// Persistence for staleness-tracked cache entries.
///
/// One entry exists per (entity kind, scope key). Entries are overwritten on
/// every successful fetch and marked stale - never deleted - when an
/// upstream change invalidates them.
#[async_trait]
pub trait CacheStoreTrait: Send + Sync {
    /// The entry for this kind and scope, if one was ever stored.
    async fn get(&self, kind: EntityKind, scope: &ScopeKey) -> Result<Option<CacheEntry>>;

    /// Store or overwrite an entry.
    async fn put(&self, entry: CacheEntry) -> Result<()>;

    /// Mark an entry stale without touching its payload. No-op when the
    /// entry does not exist.
    async fn mark_stale(&self, kind: EntityKind, scope: &ScopeKey) -> Result<()>;
}

/// In-memory cache store.
///
/// The default store for tests and for embedders that treat the cache as
/// session-lived.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: DashMap<(EntityKind, ScopeKey), CacheEntry>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStoreTrait for MemoryCacheStore {
    async fn get(&self, kind: EntityKind, scope: &ScopeKey) -> Result<Option<CacheEntry>> {
        Ok(self
            .entries
            .get(&(kind, scope.clone()))
            .map(|e| e.value().clone()))
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.entries
            .insert((entry.kind(), entry.scope.clone()), entry);
        Ok(())
    }

    async fn mark_stale(&self, kind: EntityKind, scope: &ScopeKey) -> Result<()> {
        if let Some(mut entry) = self.entries.get_mut(&(kind, scope.clone())) {
            entry.stale = true;
        }
        Ok(())
    }
}
