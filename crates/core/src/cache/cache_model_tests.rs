//! Tests for cache domain models.

use super::*;
use crate::preferences::{AccountType, Exchange};
use crate::trading::{Balance, ScopeKey};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

fn scope() -> ScopeKey {
    ScopeKey::new("user-1", Exchange::Bybit, AccountType::Demo)
}

fn balance_entry() -> CacheEntry {
    CacheEntry::refreshed(
        scope(),
        CachePayload::Balance(Balance {
            total_equity: dec!(1250.50),
            available: dec!(1000),
            unrealized_pnl: dec!(-12.25),
            currency: "USDT".to_string(),
        }),
    )
}

#[test]
fn test_fresh_entry_is_valid() {
    let entry = balance_entry();
    assert!(entry.is_valid(Utc::now()));
    assert_eq!(entry.kind(), EntityKind::Balance);
}

#[test]
fn test_entry_expires_after_ttl() {
    let entry = balance_entry();
    let past_ttl = entry.last_fetched_at + EntityKind::Balance.ttl() + Duration::seconds(1);
    assert!(!entry.is_valid(past_ttl));
}

#[test]
fn test_stale_flag_overrides_age() {
    let mut entry = balance_entry();
    entry.stale = true;
    assert!(!entry.is_valid(Utc::now()));
}

#[test]
fn test_ttls_are_per_kind() {
    assert_eq!(EntityKind::Positions.ttl(), Duration::seconds(30));
    assert_eq!(EntityKind::Balance.ttl(), Duration::seconds(60));
    assert_eq!(EntityKind::Orders.ttl(), Duration::seconds(60));
    assert_eq!(EntityKind::Trades.ttl(), Duration::seconds(300));
}

#[test]
fn test_payload_round_trips_through_json() {
    let entry = balance_entry();
    let json = serde_json::to_string(&entry).unwrap();
    let parsed: CacheEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, entry);
}

#[tokio::test]
async fn test_memory_store_overwrites_and_marks_stale() {
    let store = MemoryCacheStore::new();
    let entry = balance_entry();
    store.put(entry.clone()).await.unwrap();

    let loaded = store
        .get(EntityKind::Balance, &scope())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded, entry);

    store
        .mark_stale(EntityKind::Balance, &scope())
        .await
        .unwrap();
    let stale = store
        .get(EntityKind::Balance, &scope())
        .await
        .unwrap()
        .unwrap();
    assert!(stale.stale);
    // Payload survives invalidation for stale-but-available display
    assert_eq!(stale.payload, entry.payload);

    // Unknown scopes are a no-op, not an error
    let other = ScopeKey::new("user-2", Exchange::Bybit, AccountType::Demo);
    store.mark_stale(EntityKind::Balance, &other).await.unwrap();
}
