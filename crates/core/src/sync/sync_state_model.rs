//! Sync status domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::EntityKind;

/// Observable status of the coordinator's full-sync cycle.
///
/// Transitions: Idle -> Syncing -> Success | Error, then back to Syncing on
/// the next trigger. Only one full sync's status is tracked at a time;
/// overlapping triggers coalesce into the in-flight pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncPhase {
    /// No sync has run yet this session
    #[default]
    Idle,
    /// A full sync is in flight
    Syncing,
    /// The last full sync refreshed every entity
    Success,
    /// The last full sync left at least one entity stale
    Error { message: String },
}

/// Outcome of syncing a single entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntitySyncOutcome {
    /// A network fetch ran and overwrote the cache entry
    Fetched,
    /// The cache entry was still within its TTL; no fetch was issued
    FreshCache,
    /// Another task was already fetching this entity; this trigger coalesced
    InFlight,
    /// The fetch failed; the existing entry is served stale-but-available
    Failed { message: String },
}

impl EntitySyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, EntitySyncOutcome::Failed { .. })
    }
}

/// Per-entity result row of a sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySyncResult {
    pub kind: EntityKind,
    pub outcome: EntitySyncOutcome,
}

/// Result of one full sync pass across all entity kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullSyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<EntitySyncResult>,
}

impl FullSyncReport {
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| !r.outcome.is_failure())
    }

    /// Failure messages, one per failed entity.
    pub fn failures(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                EntitySyncOutcome::Failed { message } => {
                    Some(format!("{}: {}", r.kind, message))
                }
                _ => None,
            })
            .collect()
    }
}

/// What became of a full-sync trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FullSyncOutcome {
    /// This trigger ran the pass
    Completed(FullSyncReport),
    /// Another pass was in flight; this trigger coalesced into it
    Coalesced,
}
