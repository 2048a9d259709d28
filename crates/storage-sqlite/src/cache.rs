//! SQLite-backed entity cache store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::db::StoreHandle;
use crate::errors::StorageError;
use tradepulse_core::cache::{CacheEntry, CachePayload, CacheStoreTrait, EntityKind};
use tradepulse_core::errors::Result;
use tradepulse_core::trading::ScopeKey;

pub struct SqliteCacheStore {
    handle: StoreHandle,
}

impl SqliteCacheStore {
    pub fn new(handle: StoreHandle) -> Self {
        SqliteCacheStore { handle }
    }
}

#[async_trait]
impl CacheStoreTrait for SqliteCacheStore {
    async fn get(&self, kind: EntityKind, scope: &ScopeKey) -> Result<Option<CacheEntry>> {
        let scope = scope.clone();
        self.handle
            .exec(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT last_fetched_at, stale, payload FROM entity_cache \
                         WHERE entity_kind = ?1 AND user_id = ?2 AND exchange = ?3 AND account_type = ?4",
                        params![
                            kind.as_str(),
                            scope.user_id,
                            scope.exchange.as_str(),
                            scope.account_type.as_str()
                        ],
                        |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, bool>(1)?,
                                row.get::<_, String>(2)?,
                            ))
                        },
                    )
                    .optional()
                    .map_err(StorageError::from)?;

                let Some((fetched_at, stale, payload_json)) = row else {
                    return Ok(None);
                };

                let last_fetched_at = parse_timestamp(&fetched_at)?;
                let payload: CachePayload =
                    serde_json::from_str(&payload_json).map_err(StorageError::from)?;

                Ok(Some(CacheEntry {
                    scope,
                    last_fetched_at,
                    stale,
                    payload,
                }))
            })
            .await
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.handle
            .exec(move |conn| {
                let payload_json =
                    serde_json::to_string(&entry.payload).map_err(StorageError::from)?;
                conn.execute(
                    "INSERT OR REPLACE INTO entity_cache \
                     (entity_kind, user_id, exchange, account_type, last_fetched_at, stale, payload) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        entry.kind().as_str(),
                        entry.scope.user_id,
                        entry.scope.exchange.as_str(),
                        entry.scope.account_type.as_str(),
                        entry.last_fetched_at.to_rfc3339(),
                        entry.stale,
                        payload_json
                    ],
                )
                .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn mark_stale(&self, kind: EntityKind, scope: &ScopeKey) -> Result<()> {
        let scope = scope.clone();
        self.handle
            .exec(move |conn| {
                conn.execute(
                    "UPDATE entity_cache SET stale = 1 \
                     WHERE entity_kind = ?1 AND user_id = ?2 AND exchange = ?3 AND account_type = ?4",
                    params![
                        kind.as_str(),
                        scope.user_id,
                        scope.exchange.as_str(),
                        scope.account_type.as_str()
                    ],
                )
                .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::InvalidValue(format!("bad timestamp '{}': {}", value, e)).into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use rust_decimal_macros::dec;
    use tradepulse_core::preferences::{AccountType, Exchange};
    use tradepulse_core::trading::Balance;

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

    #[tokio::test]
    async fn test_get_missing_entry_returns_none() {
        let store = SqliteCacheStore::new(open_in_memory().unwrap());
        let entry = store.get(EntityKind::Balance, &scope()).await.unwrap();
        assert!(entry.is_none());
    }

    #[tokio::test]
    async fn test_entry_round_trips_with_timestamp() {
        let store = SqliteCacheStore::new(open_in_memory().unwrap());
        let entry = balance_entry();

        store.put(entry.clone()).await.unwrap();
        let loaded = store
            .get(EntityKind::Balance, &scope())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(loaded.payload, entry.payload);
        assert_eq!(loaded.scope, entry.scope);
        assert!(!loaded.stale);
        // RFC3339 round trip keeps sub-second precision
        assert_eq!(loaded.last_fetched_at, entry.last_fetched_at);
    }

    #[tokio::test]
    async fn test_entries_are_scoped_per_account() {
        let store = SqliteCacheStore::new(open_in_memory().unwrap());
        store.put(balance_entry()).await.unwrap();

        let other_scope = ScopeKey::new("user-1", Exchange::Bybit, AccountType::Real);
        let entry = store.get(EntityKind::Balance, &other_scope).await.unwrap();
        assert!(entry.is_none());
    }

    #[tokio::test]
    async fn test_mark_stale_preserves_payload() {
        let store = SqliteCacheStore::new(open_in_memory().unwrap());
        let entry = balance_entry();
        store.put(entry.clone()).await.unwrap();

        store.mark_stale(EntityKind::Balance, &scope()).await.unwrap();

        let loaded = store
            .get(EntityKind::Balance, &scope())
            .await
            .unwrap()
            .unwrap();
        assert!(loaded.stale);
        assert_eq!(loaded.payload, entry.payload);
    }
}
