//! Session-scoped wiring and lifecycle for the sync engine.
//!
//! One [`SyncSession`] exists per logged-in user per device, constructed at
//! login and shut down at logout. It owns every background task the engine
//! runs (event routing, periodic sync, the login sync), so ending the
//! session cancels them as a unit and a stale fetch can never write into a
//! later session's cache.

use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::activity::{
    ActivityLogRepositoryTrait, ActivityService, ActivityServiceTrait, ActivityUploaderTrait,
};
use crate::cache::CacheStoreTrait;
use crate::errors::Result;
use crate::events::{EventRouter, PriceSink, RealtimeEvent, SignalSink, Source};
use crate::preferences::{PreferenceRepositoryTrait, PreferenceService, PreferenceServiceTrait};
use crate::sync::{FullSyncOutcome, SyncConfig, SyncCoordinator, SyncPhase};

/// External collaborators injected at login.
pub struct SessionHandles {
    pub preferences: Arc<dyn PreferenceRepositoryTrait>,
    pub cache: Arc<dyn CacheStoreTrait>,
    pub activity_log: Arc<dyn ActivityLogRepositoryTrait>,
    pub provider: Arc<dyn crate::trading::TradingDataProviderTrait>,
    pub gateway: Arc<dyn crate::trading::AccountGatewayTrait>,
    pub uploader: Arc<dyn ActivityUploaderTrait>,
    pub prices: Arc<dyn PriceSink>,
    pub signals: Arc<dyn SignalSink>,
}

/// The per-session engine context.
pub struct SyncSession {
    coordinator: Arc<SyncCoordinator>,
    preferences: Arc<dyn PreferenceServiceTrait>,
    activity_service: Arc<dyn ActivityServiceTrait>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncSession {
    /// Wire up the services and start the session's background tasks:
    /// the event routing worker, the jittered periodic sync loop, and an
    /// immediate login sync.
    ///
    /// `events` is the realtime feed produced by the transport crate.
    pub fn start(
        user_id: impl Into<String>,
        source: Source,
        config: SyncConfig,
        handles: SessionHandles,
        events: mpsc::UnboundedReceiver<RealtimeEvent>,
    ) -> Arc<Self> {
        let activity_service: Arc<dyn ActivityServiceTrait> = Arc::new(ActivityService::new(
            handles.activity_log,
            handles.uploader,
            source,
        ));
        let preferences: Arc<dyn PreferenceServiceTrait> = Arc::new(PreferenceService::new(
            handles.preferences.clone(),
            activity_service.clone(),
            handles.gateway,
        ));
        let coordinator = Arc::new(SyncCoordinator::new(
            user_id,
            handles.provider,
            handles.cache,
            handles.preferences,
        ));

        let router = Arc::new(EventRouter::new(
            source,
            coordinator.clone(),
            preferences.clone(),
            activity_service.clone(),
            handles.prices,
            handles.signals,
        ));

        let session = Arc::new(Self {
            coordinator: coordinator.clone(),
            preferences,
            activity_service: activity_service.clone(),
            tasks: Mutex::new(Vec::new()),
        });

        let router_task = tokio::spawn(router.run(events));

        let periodic_coordinator = coordinator.clone();
        let periodic_activity = activity_service.clone();
        let periodic_task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(config.next_delay()).await;
                debug!("Periodic sync trigger fired");
                if let Err(e) = periodic_coordinator.full_sync().await {
                    warn!("Periodic full sync failed: {}", e);
                }
                if let Err(e) = periodic_activity.flush_pending().await {
                    warn!("Periodic activity flush failed: {}", e);
                }
            }
        });

        let login_coordinator = coordinator;
        let login_activity = activity_service;
        let login_task = tokio::spawn(async move {
            info!("Running login sync");
            if let Err(e) = login_coordinator.full_sync().await {
                warn!("Login sync failed: {}", e);
            }
            if let Err(e) = login_activity.flush_pending().await {
                warn!("Login activity flush failed: {}", e);
            }
        });

        session
            .tasks
            .lock()
            .unwrap()
            .extend([router_task, periodic_task, login_task]);

        session
    }

    pub fn coordinator(&self) -> Arc<SyncCoordinator> {
        self.coordinator.clone()
    }

    pub fn preference_service(&self) -> Arc<dyn PreferenceServiceTrait> {
        self.preferences.clone()
    }

    pub fn activity_service(&self) -> Arc<dyn ActivityServiceTrait> {
        self.activity_service.clone()
    }

    /// Observable sync status for UI layers.
    pub fn sync_status(&self) -> watch::Receiver<SyncPhase> {
        self.coordinator.status()
    }

    /// Adopt an externally spawned task into this session's cancellation
    /// scope, so logout stops it together with the session's own tasks.
    /// The realtime transport's connection loop is adopted this way.
    pub fn adopt_task(&self, task: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().unwrap();
        if tasks.is_empty() {
            // Session already shut down; stop the latecomer immediately.
            task.abort();
            return;
        }
        tasks.push(task);
    }

    /// Immediate sync trigger for app foreground.
    pub async fn on_foreground(&self) -> Result<FullSyncOutcome> {
        debug!("Foreground sync trigger fired");
        let outcome = self.coordinator.full_sync().await?;
        if let Err(e) = self.activity_service.flush_pending().await {
            warn!("Foreground activity flush failed: {}", e);
        }
        Ok(outcome)
    }

    /// Cancel every task owned by this session.
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub fn shutdown(&self) {
        let mut tasks = self.tasks.lock().unwrap();
        if tasks.is_empty() {
            return;
        }
        info!("Shutting down sync session ({} tasks)", tasks.len());
        for task in tasks.drain(..) {
            task.abort();
        }
    }

    /// End the session and overwrite the preference snapshot with defaults.
    pub async fn logout(&self) -> Result<()> {
        self.shutdown();
        self.preferences.reset_to_defaults().await
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
