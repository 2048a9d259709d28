//! Repository trait for persisted preferences.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::errors::{Result, StoreError};
use crate::preferences::PreferenceSnapshot;

/// Preference keys understood by the repository.
pub const PREF_KEY_EXCHANGE: &str = "exchange";
pub const PREF_KEY_ACCOUNT_TYPE: &str = "account_type";
pub const PREF_KEY_LANGUAGE: &str = "language";
pub const PREF_KEY_THEME: &str = "theme";

/// Key-value persistence for the preference snapshot.
///
/// Implementations store each snapshot field as a separate row so partial
/// updates never rewrite unrelated preferences.
#[async_trait]
pub trait PreferenceRepositoryTrait: Send + Sync {
    /// Get a single preference value by key.
    async fn get_preference(&self, key: &str) -> Result<Option<String>>;

    /// Set a single preference value by key.
    async fn set_preference(&self, key: &str, value: &str) -> Result<()>;

    /// Load the full snapshot, falling back to defaults for missing keys.
    async fn get_snapshot(&self) -> Result<PreferenceSnapshot> {
        let mut snapshot = PreferenceSnapshot::default();

        if let Some(value) = self.get_preference(PREF_KEY_EXCHANGE).await? {
            snapshot.exchange = value.parse()?;
        }
        if let Some(value) = self.get_preference(PREF_KEY_ACCOUNT_TYPE).await? {
            snapshot.account_type = value.parse()?;
        }
        if let Some(value) = self.get_preference(PREF_KEY_LANGUAGE).await? {
            snapshot.language = value;
        }
        if let Some(value) = self.get_preference(PREF_KEY_THEME).await? {
            snapshot.theme = value.parse()?;
        }

        Ok(snapshot)
    }

    /// Persist the full snapshot.
    async fn save_snapshot(&self, snapshot: &PreferenceSnapshot) -> Result<()> {
        self.set_preference(PREF_KEY_EXCHANGE, snapshot.exchange.as_str())
            .await?;
        self.set_preference(PREF_KEY_ACCOUNT_TYPE, snapshot.account_type.as_str())
            .await?;
        self.set_preference(PREF_KEY_LANGUAGE, &snapshot.language)
            .await?;
        self.set_preference(PREF_KEY_THEME, snapshot.theme.as_str())
            .await?;
        Ok(())
    }
}

/// In-memory preference repository.
///
/// Used in tests and by embedders that manage persistence elsewhere.
#[derive(Default)]
pub struct MemoryPreferenceRepository {
    values: DashMap<String, String>,
}

impl MemoryPreferenceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceRepositoryTrait for MemoryPreferenceRepository {
    async fn get_preference(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::QueryFailed("empty preference key".to_string()).into());
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
