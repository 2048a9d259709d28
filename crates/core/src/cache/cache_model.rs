//! Entity cache domain models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{BALANCE_TTL_SECS, ORDERS_TTL_SECS, POSITIONS_TTL_SECS, TRADES_TTL_SECS};
use crate::errors::Error;
use crate::trading::{Balance, Order, Position, ScopeKey, Trade};

/// The entity kinds the engine caches, each with its own staleness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Positions,
    Balance,
    Orders,
    Trades,
}

/// All cached entity kinds, in the order a full sync fans them out.
pub const ALL_ENTITY_KINDS: [EntityKind; 4] = [
    EntityKind::Positions,
    EntityKind::Balance,
    EntityKind::Orders,
    EntityKind::Trades,
];

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Positions => "positions",
            EntityKind::Balance => "balance",
            EntityKind::Orders => "orders",
            EntityKind::Trades => "trades",
        }
    }

    /// Maximum age before a cache entry of this kind must be re-fetched.
    pub fn ttl(&self) -> Duration {
        let secs = match self {
            EntityKind::Positions => POSITIONS_TTL_SECS,
            EntityKind::Balance => BALANCE_TTL_SECS,
            EntityKind::Orders => ORDERS_TTL_SECS,
            EntityKind::Trades => TRADES_TTL_SECS,
        };
        Duration::seconds(secs as i64)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positions" => Ok(EntityKind::Positions),
            "balance" => Ok(EntityKind::Balance),
            "orders" => Ok(EntityKind::Orders),
            "trades" => Ok(EntityKind::Trades),
            other => Err(Error::Validation(format!("Unknown entity kind: {}", other))),
        }
    }
}

/// Entity-specific cache payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CachePayload {
    Positions(Vec<Position>),
    Balance(Balance),
    Orders(Vec<Order>),
    Trades(Vec<Trade>),
}

impl CachePayload {
    pub fn kind(&self) -> EntityKind {
        match self {
            CachePayload::Positions(_) => EntityKind::Positions,
            CachePayload::Balance(_) => EntityKind::Balance,
            CachePayload::Orders(_) => EntityKind::Orders,
            CachePayload::Trades(_) => EntityKind::Trades,
        }
    }
}

/// One staleness-tracked cache slot for an entity kind within a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub scope: ScopeKey,
    pub last_fetched_at: DateTime<Utc>,
    /// Set when an upstream change or force refresh invalidated the entry.
    /// The payload stays available for display; it just no longer counts
    /// as fresh.
    pub stale: bool,
    pub payload: CachePayload,
}

impl CacheEntry {
    /// Create an entry for a payload fetched right now.
    pub fn refreshed(scope: ScopeKey, payload: CachePayload) -> Self {
        Self {
            scope,
            last_fetched_at: Utc::now(),
            stale: false,
            payload,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.payload.kind()
    }

    /// Whether the payload may be served without a re-fetch.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.stale && now - self.last_fetched_at < self.kind().ttl()
    }
}
