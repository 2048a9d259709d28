/// Cache TTL for positions, in seconds
pub const POSITIONS_TTL_SECS: u64 = 30;

/// Cache TTL for the account balance, in seconds
pub const BALANCE_TTL_SECS: u64 = 60;

/// Cache TTL for orders, in seconds
pub const ORDERS_TTL_SECS: u64 = 60;

/// Cache TTL for trades, in seconds
pub const TRADES_TTL_SECS: u64 = 300;

/// Base interval between periodic full syncs, in seconds
pub const SYNC_INTERVAL_SECS: u64 = 300;

/// Flexibility window added to the periodic interval so the platform can
/// batch scheduled work, in seconds
pub const SYNC_JITTER_SECS: u64 = 30;

/// Default language code for a fresh preference snapshot
pub const DEFAULT_LANGUAGE: &str = "en";
