//! Sync coordinator: decides when cached entities can be reused and fans
//! out re-fetches.
//!
//! # Architecture
//!
//! ```text
//! SyncCoordinator
//!       │
//!       ├─► TradingDataProviderTrait (scoped fetches via trading-api crate)
//!       ├─► CacheStoreTrait (TTL-tracked entity cache)
//!       └─► PreferenceRepositoryTrait (exchange/account scope)
//! ```
//!
//! Every fetch is scoped to (user id, exchange, account type) read from the
//! preference snapshot at trigger time, so a remote exchange switch redirects
//! the very next sync to the new scope.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::cache::{CacheEntry, CachePayload, CacheStoreTrait, EntityKind};
use crate::errors::Result;
use crate::preferences::PreferenceRepositoryTrait;
use crate::sync::{
    EntitySyncOutcome, EntitySyncResult, FullSyncOutcome, FullSyncReport, SyncPhase,
};
use crate::trading::{Balance, ScopeKey, TradingDataProviderTrait};

/// RAII guard marking one entity kind as having a fetch in flight.
struct EntityGuard<'a> {
    locks: &'a Mutex<HashSet<EntityKind>>,
    kind: EntityKind,
}

impl<'a> EntityGuard<'a> {
    /// Try to acquire the in-flight slot for an entity kind. Returns None if
    /// another fetch already holds it.
    fn try_acquire(locks: &'a Mutex<HashSet<EntityKind>>, kind: EntityKind) -> Option<Self> {
        let mut held = locks.lock().unwrap();
        if held.contains(&kind) {
            None
        } else {
            held.insert(kind);
            Some(Self { locks, kind })
        }
    }
}

impl Drop for EntityGuard<'_> {
    fn drop(&mut self) {
        self.locks.lock().unwrap().remove(&self.kind);
    }
}

/// RAII guard marking a full sync pass as in flight.
struct FullSyncGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FullSyncGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for FullSyncGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Owns the fan-out of sync requests and applies results to the cache.
///
/// One coordinator exists per logged-in session; it is constructed by the
/// session context, never as a process-wide singleton.
pub struct SyncCoordinator {
    user_id: String,
    provider: Arc<dyn TradingDataProviderTrait>,
    cache: Arc<dyn CacheStoreTrait>,
    preferences: Arc<dyn PreferenceRepositoryTrait>,
    status_tx: watch::Sender<SyncPhase>,
    in_flight: Mutex<HashSet<EntityKind>>,
    full_sync_active: AtomicBool,
    last_full_sync_at: Mutex<Option<DateTime<Utc>>>,
}

impl SyncCoordinator {
    pub fn new(
        user_id: impl Into<String>,
        provider: Arc<dyn TradingDataProviderTrait>,
        cache: Arc<dyn CacheStoreTrait>,
        preferences: Arc<dyn PreferenceRepositoryTrait>,
    ) -> Self {
        let (status_tx, _) = watch::channel(SyncPhase::Idle);
        Self {
            user_id: user_id.into(),
            provider,
            cache,
            preferences,
            status_tx,
            in_flight: Mutex::new(HashSet::new()),
            full_sync_active: AtomicBool::new(false),
            last_full_sync_at: Mutex::new(None),
        }
    }

    /// Observable sync status for UI layers (spinner, toast).
    pub fn status(&self) -> watch::Receiver<SyncPhase> {
        self.status_tx.subscribe()
    }

    /// Heartbeat of the last completed full sync pass, regardless of its
    /// per-entity outcomes.
    pub fn last_full_sync_at(&self) -> Option<DateTime<Utc>> {
        *self.last_full_sync_at.lock().unwrap()
    }

    /// The scope every fetch is issued under right now.
    pub async fn scope(&self) -> Result<ScopeKey> {
        let snapshot = self.preferences.get_snapshot().await?;
        Ok(ScopeKey::new(
            self.user_id.clone(),
            snapshot.exchange,
            snapshot.account_type,
        ))
    }

    /// Sync one entity kind.
    ///
    /// With `force_refresh` false, a cache entry still within its TTL is
    /// reused and no network call is issued. A fetch failure leaves the
    /// existing entry untouched (stale-but-available) and is reported in
    /// the outcome rather than clearing anything.
    pub async fn sync_entity(
        &self,
        kind: EntityKind,
        force_refresh: bool,
    ) -> Result<EntitySyncResult> {
        let scope = self.scope().await?;
        self.sync_entity_scoped(kind, force_refresh, scope).await
    }

    async fn sync_entity_scoped(
        &self,
        kind: EntityKind,
        force_refresh: bool,
        scope: ScopeKey,
    ) -> Result<EntitySyncResult> {
        if !force_refresh {
            if let Some(entry) = self.cache.get(kind, &scope).await? {
                if entry.is_valid(Utc::now()) {
                    debug!("{} cache for {} is fresh, skipping fetch", kind, scope);
                    return Ok(EntitySyncResult {
                        kind,
                        outcome: EntitySyncOutcome::FreshCache,
                    });
                }
            }
        }

        let _guard = match EntityGuard::try_acquire(&self.in_flight, kind) {
            Some(guard) => guard,
            None => {
                debug!("{} fetch already in flight, coalescing trigger", kind);
                return Ok(EntitySyncResult {
                    kind,
                    outcome: EntitySyncOutcome::InFlight,
                });
            }
        };

        match self.fetch_payload(kind, &scope).await {
            Ok(payload) => {
                self.cache.put(CacheEntry::refreshed(scope, payload)).await?;
                Ok(EntitySyncResult {
                    kind,
                    outcome: EntitySyncOutcome::Fetched,
                })
            }
            Err(e) => {
                warn!("{} sync for {} failed, serving stale cache: {}", kind, scope, e);
                Ok(EntitySyncResult {
                    kind,
                    outcome: EntitySyncOutcome::Failed {
                        message: e.to_string(),
                    },
                })
            }
        }
    }

    async fn fetch_payload(&self, kind: EntityKind, scope: &ScopeKey) -> Result<CachePayload> {
        let payload = match kind {
            EntityKind::Positions => {
                CachePayload::Positions(self.provider.fetch_positions(scope).await?)
            }
            EntityKind::Balance => CachePayload::Balance(self.provider.fetch_balance(scope).await?),
            EntityKind::Orders => CachePayload::Orders(self.provider.fetch_orders(scope).await?),
            EntityKind::Trades => CachePayload::Trades(self.provider.fetch_trades(scope).await?),
        };
        Ok(payload)
    }

    /// Force-refresh all four entity kinds concurrently.
    ///
    /// The four fetches are independent failure domains: each catches its
    /// own error and a failure in one never cancels the others. A trigger
    /// arriving while a pass is already in flight coalesces into it.
    pub async fn full_sync(&self) -> Result<FullSyncOutcome> {
        let _guard = match FullSyncGuard::try_acquire(&self.full_sync_active) {
            Some(guard) => guard,
            None => {
                debug!("full sync already in flight, coalescing trigger");
                return Ok(FullSyncOutcome::Coalesced);
            }
        };

        let scope = self.scope().await?;
        let started_at = Utc::now();
        self.status_tx.send_replace(SyncPhase::Syncing);

        let (positions, balance, orders, trades) = tokio::join!(
            self.sync_entity_scoped(EntityKind::Positions, true, scope.clone()),
            self.sync_entity_scoped(EntityKind::Balance, true, scope.clone()),
            self.sync_entity_scoped(EntityKind::Orders, true, scope.clone()),
            self.sync_entity_scoped(EntityKind::Trades, true, scope.clone()),
        );

        let results = vec![
            Self::settle(EntityKind::Positions, positions),
            Self::settle(EntityKind::Balance, balance),
            Self::settle(EntityKind::Orders, orders),
            Self::settle(EntityKind::Trades, trades),
        ];

        let report = FullSyncReport {
            started_at,
            finished_at: Utc::now(),
            results,
        };
        *self.last_full_sync_at.lock().unwrap() = Some(report.finished_at);

        if report.all_succeeded() {
            self.status_tx.send_replace(SyncPhase::Success);
        } else {
            let message = report.failures().join("; ");
            warn!("full sync finished with failures: {}", message);
            self.status_tx.send_replace(SyncPhase::Error { message });
        }

        Ok(FullSyncOutcome::Completed(report))
    }

    /// Fold store-level errors into the per-entity result row so one
    /// entity's storage failure cannot erase the outcomes of its siblings.
    fn settle(kind: EntityKind, result: Result<EntitySyncResult>) -> EntitySyncResult {
        match result {
            Ok(row) => row,
            Err(e) => EntitySyncResult {
                kind,
                outcome: EntitySyncOutcome::Failed {
                    message: e.to_string(),
                },
            },
        }
    }

    /// Handle an upstream position change: the cached positions are no
    /// longer trustworthy even if the forced re-fetch below fails.
    pub async fn refresh_positions(&self) -> Result<EntitySyncResult> {
        let scope = self.scope().await?;
        self.cache.mark_stale(EntityKind::Positions, &scope).await?;
        self.sync_entity_scoped(EntityKind::Positions, true, scope)
            .await
    }

    /// Apply an authoritative balance push straight to the cache, bypassing
    /// a fetch.
    pub async fn apply_balance_push(&self, balance: Balance) -> Result<()> {
        let scope = self.scope().await?;
        debug!("applying pushed balance for {}", scope);
        self.cache
            .put(CacheEntry::refreshed(scope, CachePayload::Balance(balance)))
            .await
    }
}
