//! SQLite-backed activity log repository.
//!
//! The `seq` column (assigned on insert) is the creation order the flush
//! path relies on; `timestamp` alone cannot break ties between entries
//! recorded in the same millisecond.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::StoreHandle;
use crate::errors::StorageError;
use tradepulse_core::activity::{ActivityLogEntry, ActivityLogRepositoryTrait};
use tradepulse_core::errors::{Result, StoreError};

pub struct SqliteActivityLogRepository {
    handle: StoreHandle,
}

impl SqliteActivityLogRepository {
    pub fn new(handle: StoreHandle) -> Self {
        SqliteActivityLogRepository { handle }
    }
}

/// Raw column values read before domain-type conversion.
struct RawEntry {
    id: String,
    action_type: String,
    action_category: String,
    source: String,
    entity_type: Option<String>,
    old_value: Option<String>,
    new_value: Option<String>,
    timestamp: String,
    synced: bool,
}

impl RawEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawEntry {
            id: row.get(0)?,
            action_type: row.get(1)?,
            action_category: row.get(2)?,
            source: row.get(3)?,
            entity_type: row.get(4)?,
            old_value: row.get(5)?,
            new_value: row.get(6)?,
            timestamp: row.get(7)?,
            synced: row.get(8)?,
        })
    }

    fn into_entry(self) -> Result<ActivityLogEntry> {
        let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                StorageError::InvalidValue(format!("bad timestamp '{}': {}", self.timestamp, e))
            })?;

        Ok(ActivityLogEntry {
            id: self.id,
            action_type: self.action_type,
            action_category: self.action_category.parse()?,
            source: self.source.parse()?,
            entity_type: self.entity_type,
            old_value: self.old_value,
            new_value: self.new_value,
            timestamp,
            synced: self.synced,
        })
    }
}

const ENTRY_COLUMNS: &str =
    "id, action_type, action_category, source, entity_type, old_value, new_value, timestamp, synced";

fn load_entries(conn: &Connection, sql: &str) -> Result<Vec<ActivityLogEntry>> {
    let mut stmt = conn.prepare(sql).map_err(StorageError::from)?;
    let rows = stmt
        .query_map([], RawEntry::from_row)
        .map_err(StorageError::from)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(StorageError::from)?;

    rows.into_iter().map(RawEntry::into_entry).collect()
}

#[async_trait]
impl ActivityLogRepositoryTrait for SqliteActivityLogRepository {
    async fn append(&self, entry: &ActivityLogEntry) -> Result<()> {
        let entry = entry.clone();
        self.handle
            .exec(move |conn| {
                conn.execute(
                    "INSERT INTO activity_log \
                     (id, action_type, action_category, source, entity_type, old_value, new_value, timestamp, synced) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        entry.id,
                        entry.action_type,
                        entry.action_category.as_str(),
                        entry.source.as_str(),
                        entry.entity_type,
                        entry.old_value,
                        entry.new_value,
                        entry.timestamp.to_rfc3339(),
                        entry.synced
                    ],
                )
                .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn list_unsynced(&self) -> Result<Vec<ActivityLogEntry>> {
        self.handle
            .exec(move |conn| {
                load_entries(
                    conn,
                    &format!(
                        "SELECT {} FROM activity_log WHERE synced = 0 ORDER BY seq",
                        ENTRY_COLUMNS
                    ),
                )
            })
            .await
    }

    async fn mark_synced(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.handle
            .exec(move |conn| {
                let updated = conn
                    .execute(
                        "UPDATE activity_log SET synced = 1 WHERE id = ?1",
                        params![id],
                    )
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(StoreError::NotFound(format!("activity entry {}", id)).into());
                }
                Ok(())
            })
            .await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ActivityLogEntry>> {
        self.handle
            .exec(move |conn| {
                load_entries(
                    conn,
                    &format!(
                        "SELECT {} FROM activity_log ORDER BY seq DESC LIMIT {}",
                        ENTRY_COLUMNS, limit
                    ),
                )
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use tradepulse_core::activity::{ActionCategory, NewActivity};
    use tradepulse_core::events::Source;

    fn entry(action_type: &str) -> ActivityLogEntry {
        ActivityLogEntry::new(
            Source::Android,
            NewActivity {
                action_type: action_type.to_string(),
                action_category: ActionCategory::Settings,
                entity_type: Some("exchange".to_string()),
                old_value: Some("bybit".to_string()),
                new_value: Some("hyperliquid".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn test_append_and_round_trip() {
        let repository = SqliteActivityLogRepository::new(open_in_memory().unwrap());
        let original = entry("exchange_switch");

        repository.append(&original).await.unwrap();

        let unsynced = repository.list_unsynced().await.unwrap();
        assert_eq!(unsynced.len(), 1);
        assert_eq!(unsynced[0], original);
    }

    #[tokio::test]
    async fn test_unsynced_entries_come_back_in_creation_order() {
        let repository = SqliteActivityLogRepository::new(open_in_memory().unwrap());
        let first = entry("first");
        let second = entry("second");
        let third = entry("third");

        repository.append(&first).await.unwrap();
        repository.append(&second).await.unwrap();
        repository.append(&third).await.unwrap();
        repository.mark_synced(&second.id).await.unwrap();

        let ids: Vec<String> = repository
            .list_unsynced()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![first.id, third.id]);
    }

    #[tokio::test]
    async fn test_mark_synced_flips_the_flag_once() {
        let repository = SqliteActivityLogRepository::new(open_in_memory().unwrap());
        let original = entry("exchange_switch");
        repository.append(&original).await.unwrap();

        repository.mark_synced(&original.id).await.unwrap();

        assert!(repository.list_unsynced().await.unwrap().is_empty());
        let recent = repository.list_recent(10).await.unwrap();
        assert!(recent[0].synced);
    }

    #[tokio::test]
    async fn test_mark_synced_unknown_id_is_not_found() {
        let repository = SqliteActivityLogRepository::new(open_in_memory().unwrap());
        let result = repository.mark_synced("missing").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_recent_returns_newest_first() {
        let repository = SqliteActivityLogRepository::new(open_in_memory().unwrap());
        repository.append(&entry("first")).await.unwrap();
        repository.append(&entry("second")).await.unwrap();
        repository.append(&entry("third")).await.unwrap();

        let recent = repository.list_recent(2).await.unwrap();
        let types: Vec<String> = recent.into_iter().map(|e| e.action_type).collect();
        assert_eq!(types, vec!["third".to_string(), "second".to_string()]);
    }
}
