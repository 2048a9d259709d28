//! Forwarding sinks for events the sync engine does not own.
//!
//! Price ticks belong to the UI layer and trading signals to the
//! notification subsystem; both are external collaborators. The router
//! hands them through these traits.
//!
//! # Design Rules
//!
//! - Sink calls must be fast and non-blocking (no network calls, no store
//!   writes)
//! - Implementations should queue work for async processing
//! - A sink failure must not affect event routing (best-effort)

use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

/// Receives price ticks for display.
pub trait PriceSink: Send + Sync {
    fn price_update(&self, symbol: &str, price: Decimal);
}

/// Receives trading signals for notification delivery.
pub trait SignalSink: Send + Sync {
    fn signal_received(&self, payload: &serde_json::Value);
}

/// No-op price sink for tests or headless embedders.
#[derive(Clone, Default)]
pub struct NoOpPriceSink;

impl PriceSink for NoOpPriceSink {
    fn price_update(&self, _symbol: &str, _price: Decimal) {
        // Intentionally empty - ticks are discarded
    }
}

/// No-op signal sink for tests or headless embedders.
#[derive(Clone, Default)]
pub struct NoOpSignalSink;

impl SignalSink for NoOpSignalSink {
    fn signal_received(&self, _payload: &serde_json::Value) {
        // Intentionally empty - signals are discarded
    }
}

/// Mock price sink for testing - collects forwarded ticks.
#[derive(Clone, Default)]
pub struct MockPriceSink {
    ticks: Arc<Mutex<Vec<(String, Decimal)>>>,
}

impl MockPriceSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected ticks.
    pub fn ticks(&self) -> Vec<(String, Decimal)> {
        self.ticks.lock().unwrap().clone()
    }
}

impl PriceSink for MockPriceSink {
    fn price_update(&self, symbol: &str, price: Decimal) {
        self.ticks.lock().unwrap().push((symbol.to_string(), price));
    }
}

/// Mock signal sink for testing - collects forwarded signals.
#[derive(Clone, Default)]
pub struct MockSignalSink {
    signals: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl MockSignalSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected signals.
    pub fn signals(&self) -> Vec<serde_json::Value> {
        self.signals.lock().unwrap().clone()
    }
}

impl SignalSink for MockSignalSink {
    fn signal_received(&self, payload: &serde_json::Value) {
        self.signals.lock().unwrap().push(payload.clone());
    }
}
