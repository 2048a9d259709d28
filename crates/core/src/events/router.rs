//! Deterministic routing of realtime channel events.
//!
//! Events are processed one at a time in arrival order on a single logical
//! worker per connection, so no two events race on the preference snapshot.
//! Reconnection is the transport's concern; when it succeeds, a `Connected`
//! event lands here and triggers a full resync to heal whatever was missed
//! (catch up on reconnect - there are no sequence numbers to replay).

use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::activity::{ActionCategory, ActivityServiceTrait, NewActivity};
use crate::events::{PriceSink, RealtimeEvent, SignalSink, Source};
use crate::preferences::PreferenceServiceTrait;
use crate::sync::SyncCoordinator;

/// Routes inbound realtime events to the coordinator, preference store,
/// activity log, and forwarding sinks.
pub struct EventRouter {
    /// This device's platform identifier, for echo suppression.
    self_source: Source,
    coordinator: Arc<SyncCoordinator>,
    preferences: Arc<dyn PreferenceServiceTrait>,
    activity_service: Arc<dyn ActivityServiceTrait>,
    prices: Arc<dyn PriceSink>,
    signals: Arc<dyn SignalSink>,
}

impl EventRouter {
    pub fn new(
        self_source: Source,
        coordinator: Arc<SyncCoordinator>,
        preferences: Arc<dyn PreferenceServiceTrait>,
        activity_service: Arc<dyn ActivityServiceTrait>,
        prices: Arc<dyn PriceSink>,
        signals: Arc<dyn SignalSink>,
    ) -> Self {
        Self {
            self_source,
            coordinator,
            preferences,
            activity_service,
            prices,
            signals,
        }
    }

    /// Consume events until the channel closes.
    ///
    /// Each event is fully routed before the next one is received; this is
    /// the single-worker ordering contract for the connection.
    pub async fn run(self: Arc<Self>, mut receiver: mpsc::UnboundedReceiver<RealtimeEvent>) {
        while let Some(event) = receiver.recv().await {
            self.route(event).await;
        }
        info!("Realtime event router shutting down");
    }

    /// Apply the routing table to one event.
    pub async fn route(&self, event: RealtimeEvent) {
        match event {
            RealtimeEvent::PositionUpdate => {
                if let Err(e) = self.coordinator.refresh_positions().await {
                    warn!("Position refresh after update event failed: {}", e);
                }
            }

            RealtimeEvent::BalanceUpdate { payload } => {
                if let Err(e) = self.coordinator.apply_balance_push(payload).await {
                    warn!("Failed to apply pushed balance: {}", e);
                }
            }

            RealtimeEvent::PriceUpdate { symbol, price } => {
                self.prices.price_update(&symbol, price);
            }

            RealtimeEvent::SignalReceived { payload } => {
                self.signals.signal_received(&payload);
            }

            RealtimeEvent::SettingsSync { source, value } => {
                let record = self
                    .activity_service
                    .record_observed(
                        source,
                        NewActivity {
                            action_type: "settings_sync".to_string(),
                            action_category: ActionCategory::Settings,
                            entity_type: Some("settings".to_string()),
                            old_value: None,
                            new_value: Some(value.to_string()),
                        },
                    )
                    .await;
                if let Err(e) = record {
                    warn!("Failed to record settings sync from {}: {}", source, e);
                }
            }

            RealtimeEvent::ExchangeSwitch { source, exchange } => {
                if source == self.self_source {
                    debug!("Ignoring echoed exchange switch from {}", source);
                    return;
                }
                match self.preferences.apply_remote_exchange(exchange).await {
                    Ok(snapshot) => {
                        info!(
                            "Applied exchange switch to {} from {}, resyncing",
                            snapshot.exchange, source
                        );
                        self.trigger_full_sync().await;
                    }
                    Err(e) => warn!("Failed to apply remote exchange switch: {}", e),
                }
            }

            RealtimeEvent::AccountSwitch {
                source,
                account_type,
            } => {
                if source == self.self_source {
                    debug!("Ignoring echoed account switch from {}", source);
                    return;
                }
                match self.preferences.apply_remote_account_type(account_type).await {
                    Ok(snapshot) => {
                        info!(
                            "Applied account switch to {} from {}, resyncing",
                            snapshot.account_type, source
                        );
                        self.trigger_full_sync().await;
                    }
                    Err(e) => warn!("Failed to apply remote account switch: {}", e),
                }
            }

            RealtimeEvent::Connected => {
                info!("Realtime channel connected, running catch-up sync");
                self.trigger_full_sync().await;
                match self.activity_service.flush_pending().await {
                    Ok(report) if report.remaining > 0 => {
                        debug!(
                            "Activity flush on reconnect: {} uploaded, {} still queued",
                            report.uploaded, report.remaining
                        );
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Activity flush on reconnect failed: {}", e),
                }
            }

            RealtimeEvent::Disconnected => {
                debug!("Realtime channel disconnected, awaiting transport reconnect");
            }

            RealtimeEvent::Error { message } => {
                error!("Realtime channel error: {}", message);
            }
        }
    }

    async fn trigger_full_sync(&self) {
        match self.coordinator.full_sync().await {
            Ok(_) => {}
            Err(e) => warn!("Full sync failed: {}", e),
        }
    }
}
