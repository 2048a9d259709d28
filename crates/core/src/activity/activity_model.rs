//! Activity log domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::Source;

/// Broad grouping of user actions for filtering and audit views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionCategory {
    Trading,
    #[default]
    Settings,
    Session,
}

impl ActionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCategory::Trading => "TRADING",
            ActionCategory::Settings => "SETTINGS",
            ActionCategory::Session => "SESSION",
        }
    }
}

impl std::str::FromStr for ActionCategory {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRADING" => Ok(ActionCategory::Trading),
            "SETTINGS" => Ok(ActionCategory::Settings),
            "SESSION" => Ok(ActionCategory::Session),
            other => Err(crate::errors::Error::Validation(format!(
                "Unknown action category: {}",
                other
            ))),
        }
    }
}

/// One record in the append-only activity log.
///
/// Entries are created at the moment of a user action with `synced = false`
/// and flip to `synced = true` exactly once, on confirmed server
/// acknowledgment. A synced entry is immutable history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    /// Client-generated entry ID (stable across upload retries)
    pub id: String,
    /// Action performed (e.g., "exchange_switch")
    pub action_type: String,
    pub action_category: ActionCategory,
    /// Device/platform the action originated on
    pub source: Source,
    /// Entity the action touched, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Whether the server has acknowledged this entry
    pub synced: bool,
}

/// Fields callers provide when recording an action; identity, source, and
/// timing are filled in by the service.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub action_type: String,
    pub action_category: ActionCategory,
    pub entity_type: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl ActivityLogEntry {
    /// Create a new unsynced entry for an action originating on `source`.
    pub fn new(source: Source, activity: NewActivity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action_type: activity.action_type,
            action_category: activity.action_category,
            source,
            entity_type: activity.entity_type,
            old_value: activity.old_value,
            new_value: activity.new_value,
            timestamp: Utc::now(),
            synced: false,
        }
    }

    /// Create an entry mirroring an action observed from another device's
    /// broadcast. Observed entries are history, not queued uploads, so they
    /// are born synced.
    pub fn observed(source: Source, activity: NewActivity) -> Self {
        Self {
            synced: true,
            ..Self::new(source, activity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_activity() -> NewActivity {
        NewActivity {
            action_type: "exchange_switch".to_string(),
            action_category: ActionCategory::Settings,
            entity_type: Some("exchange".to_string()),
            old_value: Some("bybit".to_string()),
            new_value: Some("hyperliquid".to_string()),
        }
    }

    #[test]
    fn test_new_entry_is_unsynced() {
        let entry = ActivityLogEntry::new(Source::Android, sample_activity());

        assert!(!entry.id.is_empty());
        assert_eq!(entry.source, Source::Android);
        assert!(!entry.synced);
    }

    #[test]
    fn test_observed_entry_is_born_synced() {
        let entry = ActivityLogEntry::observed(Source::Webapp, sample_activity());

        assert_eq!(entry.source, Source::Webapp);
        assert!(entry.synced);
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&ActionCategory::Settings).unwrap(),
            "\"SETTINGS\""
        );
        let parsed: ActionCategory = serde_json::from_str("\"TRADING\"").unwrap();
        assert_eq!(parsed, ActionCategory::Trading);
    }
}
