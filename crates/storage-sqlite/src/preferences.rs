//! SQLite-backed preference repository.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::db::StoreHandle;
use crate::errors::StorageError;
use tradepulse_core::errors::Result;
use tradepulse_core::preferences::PreferenceRepositoryTrait;

pub struct SqlitePreferenceRepository {
    handle: StoreHandle,
}

impl SqlitePreferenceRepository {
    pub fn new(handle: StoreHandle) -> Self {
        SqlitePreferenceRepository { handle }
    }
}

#[async_trait]
impl PreferenceRepositoryTrait for SqlitePreferenceRepository {
    async fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.handle
            .exec(move |conn| {
                let value = conn
                    .query_row(
                        "SELECT pref_value FROM preferences WHERE pref_key = ?1",
                        params![key],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(StorageError::from)?;
                Ok(value)
            })
            .await
    }

    async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.handle
            .exec(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO preferences (pref_key, pref_value) VALUES (?1, ?2)",
                    params![key, value],
                )
                .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use tradepulse_core::preferences::{AccountType, Exchange, PreferenceSnapshot, Theme};

    #[tokio::test]
    async fn test_get_missing_preference_returns_none() {
        let repository = SqlitePreferenceRepository::new(open_in_memory().unwrap());

        let value = repository.get_preference("exchange").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_value() {
        let repository = SqlitePreferenceRepository::new(open_in_memory().unwrap());

        repository.set_preference("theme", "dark").await.unwrap();
        repository.set_preference("theme", "light").await.unwrap();

        let value = repository.get_preference("theme").await.unwrap();
        assert_eq!(value.as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_reopening_database_preserves_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.db");

        {
            let repository = SqlitePreferenceRepository::new(crate::db::open(&path).unwrap());
            repository
                .set_preference("exchange", "hyperliquid")
                .await
                .unwrap();
        }

        let repository = SqlitePreferenceRepository::new(crate::db::open(&path).unwrap());
        let value = repository.get_preference("exchange").await.unwrap();
        assert_eq!(value.as_deref(), Some("hyperliquid"));
    }

    #[tokio::test]
    async fn test_snapshot_round_trips() {
        let repository = SqlitePreferenceRepository::new(open_in_memory().unwrap());

        // Missing rows resolve to the default snapshot
        let fresh = repository.get_snapshot().await.unwrap();
        assert_eq!(fresh, PreferenceSnapshot::default());

        let snapshot = PreferenceSnapshot {
            exchange: Exchange::Hyperliquid,
            account_type: AccountType::Mainnet,
            language: "fr".to_string(),
            theme: Theme::Dark,
        };
        repository.save_snapshot(&snapshot).await.unwrap();

        let loaded = repository.get_snapshot().await.unwrap();
        assert_eq!(loaded, snapshot);
    }
}
