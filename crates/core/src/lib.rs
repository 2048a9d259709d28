//! TradePulse Core - Domain entities, services, and traits for the sync engine.
//!
//! This crate contains the device-side synchronization protocol of the
//! TradePulse trading companion: preference storage, TTL-tracked entity
//! caches, the sync coordinator, realtime event routing, and the activity
//! log. It is database- and transport-agnostic; repository traits are
//! implemented by the `storage-sqlite` crate and the realtime feed is
//! produced by the `realtime` crate.

pub mod activity;
pub mod cache;
pub mod constants;
pub mod errors;
pub mod events;
pub mod preferences;
pub mod session;
pub mod sync;
pub mod trading;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
