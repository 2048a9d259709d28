//! Preference service enforcing the exchange/account-type invariant.
//!
//! Local user actions persist the change, append an activity entry, and
//! notify the server of record (which broadcasts to the user's other
//! devices). Accepted remote broadcasts persist only - they never re-enter
//! the activity queue or go back to the server.

use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

use crate::activity::{ActionCategory, ActivityServiceTrait, NewActivity};
use crate::errors::Result;
use crate::preferences::{AccountType, Exchange, PreferenceRepositoryTrait, PreferenceSnapshot, Theme};
use crate::trading::AccountGatewayTrait;

#[async_trait]
pub trait PreferenceServiceTrait: Send + Sync {
    /// Current snapshot, with defaults for anything never set.
    async fn get_snapshot(&self) -> Result<PreferenceSnapshot>;

    /// Local user action: switch the active exchange.
    async fn switch_exchange(&self, exchange: Exchange) -> Result<PreferenceSnapshot>;

    /// Local user action: switch the active account type.
    async fn switch_account_type(&self, account_type: AccountType) -> Result<PreferenceSnapshot>;

    /// Local user action: change the UI language.
    async fn set_language(&self, language: &str) -> Result<PreferenceSnapshot>;

    /// Local user action: change the UI theme.
    async fn set_theme(&self, theme: Theme) -> Result<PreferenceSnapshot>;

    /// Apply an exchange switch broadcast from another device.
    async fn apply_remote_exchange(&self, exchange: Exchange) -> Result<PreferenceSnapshot>;

    /// Apply an account-type switch broadcast from another device.
    async fn apply_remote_account_type(&self, account_type: AccountType)
        -> Result<PreferenceSnapshot>;

    /// Overwrite the snapshot with defaults (logout).
    async fn reset_to_defaults(&self) -> Result<()>;
}

pub struct PreferenceService {
    repository: Arc<dyn PreferenceRepositoryTrait>,
    activity_service: Arc<dyn ActivityServiceTrait>,
    gateway: Arc<dyn AccountGatewayTrait>,
}

impl PreferenceService {
    pub fn new(
        repository: Arc<dyn PreferenceRepositoryTrait>,
        activity_service: Arc<dyn ActivityServiceTrait>,
        gateway: Arc<dyn AccountGatewayTrait>,
    ) -> Self {
        PreferenceService {
            repository,
            activity_service,
            gateway,
        }
    }

    async fn record_settings_change(
        &self,
        action_type: &str,
        entity_type: &str,
        old_value: String,
        new_value: String,
    ) {
        let result = self
            .activity_service
            .record(NewActivity {
                action_type: action_type.to_string(),
                action_category: ActionCategory::Settings,
                entity_type: Some(entity_type.to_string()),
                old_value: Some(old_value),
                new_value: Some(new_value),
            })
            .await;

        if let Err(e) = result {
            warn!("Failed to record {} activity: {}", action_type, e);
        }
    }
}

#[async_trait]
impl PreferenceServiceTrait for PreferenceService {
    async fn get_snapshot(&self) -> Result<PreferenceSnapshot> {
        self.repository.get_snapshot().await
    }

    async fn switch_exchange(&self, exchange: Exchange) -> Result<PreferenceSnapshot> {
        let mut snapshot = self.repository.get_snapshot().await?;
        if snapshot.exchange == exchange {
            debug!("Exchange already set to {}, skipping switch", exchange);
            return Ok(snapshot);
        }

        let previous = snapshot.exchange;
        snapshot.switch_exchange(exchange);
        self.repository.save_snapshot(&snapshot).await?;

        self.record_settings_change(
            "exchange_switch",
            "exchange",
            previous.to_string(),
            exchange.to_string(),
        )
        .await;

        // Inform the server of record; it broadcasts the switch to the
        // user's other devices. The local change stands even if this fails.
        if let Err(e) = self.gateway.push_exchange(exchange).await {
            warn!("Failed to push exchange switch to server: {}", e);
        }

        Ok(snapshot)
    }

    async fn switch_account_type(&self, account_type: AccountType) -> Result<PreferenceSnapshot> {
        let mut snapshot = self.repository.get_snapshot().await?;
        if snapshot.account_type == account_type {
            debug!(
                "Account type already set to {}, skipping switch",
                account_type
            );
            return Ok(snapshot);
        }

        let previous = snapshot.account_type;
        if !snapshot.switch_account_type(account_type) {
            warn!(
                "Account type {} is not valid on {}, corrected to {}",
                account_type, snapshot.exchange, snapshot.account_type
            );
        }
        self.repository.save_snapshot(&snapshot).await?;

        self.record_settings_change(
            "account_type_switch",
            "account_type",
            previous.to_string(),
            snapshot.account_type.to_string(),
        )
        .await;

        if let Err(e) = self.gateway.push_account_type(snapshot.account_type).await {
            warn!("Failed to push account type switch to server: {}", e);
        }

        Ok(snapshot)
    }

    async fn set_language(&self, language: &str) -> Result<PreferenceSnapshot> {
        let mut snapshot = self.repository.get_snapshot().await?;
        let previous = std::mem::replace(&mut snapshot.language, language.to_string());
        self.repository.save_snapshot(&snapshot).await?;

        self.record_settings_change("language_change", "language", previous, language.to_string())
            .await;

        Ok(snapshot)
    }

    async fn set_theme(&self, theme: Theme) -> Result<PreferenceSnapshot> {
        let mut snapshot = self.repository.get_snapshot().await?;
        let previous = std::mem::replace(&mut snapshot.theme, theme);
        self.repository.save_snapshot(&snapshot).await?;

        self.record_settings_change(
            "theme_change",
            "theme",
            previous.to_string(),
            theme.to_string(),
        )
        .await;

        Ok(snapshot)
    }

    async fn apply_remote_exchange(&self, exchange: Exchange) -> Result<PreferenceSnapshot> {
        let mut snapshot = self.repository.get_snapshot().await?;
        if snapshot.switch_exchange(exchange) {
            debug!(
                "Remote exchange switch to {} reset account type to {}",
                exchange, snapshot.account_type
            );
        }
        self.repository.save_snapshot(&snapshot).await?;
        Ok(snapshot)
    }

    async fn apply_remote_account_type(
        &self,
        account_type: AccountType,
    ) -> Result<PreferenceSnapshot> {
        let mut snapshot = self.repository.get_snapshot().await?;
        snapshot.switch_account_type(account_type);
        self.repository.save_snapshot(&snapshot).await?;
        Ok(snapshot)
    }

    async fn reset_to_defaults(&self) -> Result<()> {
        self.repository
            .save_snapshot(&PreferenceSnapshot::default())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityService, ActivityUploaderTrait, MemoryActivityLogRepository};
    use crate::events::Source;
    use crate::preferences::MemoryPreferenceRepository;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        pushes: Mutex<Vec<String>>,
    }

    impl RecordingGateway {
        fn pushes(&self) -> Vec<String> {
            self.pushes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AccountGatewayTrait for RecordingGateway {
        async fn push_exchange(&self, exchange: Exchange) -> Result<()> {
            self.pushes
                .lock()
                .unwrap()
                .push(format!("exchange:{}", exchange));
            Ok(())
        }

        async fn push_account_type(&self, account_type: AccountType) -> Result<()> {
            self.pushes
                .lock()
                .unwrap()
                .push(format!("account_type:{}", account_type));
            Ok(())
        }
    }

    #[derive(Default)]
    struct OkUploader;

    #[async_trait]
    impl ActivityUploaderTrait for OkUploader {
        async fn upload(&self, _entry: &crate::activity::ActivityLogEntry) -> Result<()> {
            Ok(())
        }
    }

    struct Fixture {
        activity_repo: Arc<MemoryActivityLogRepository>,
        gateway: Arc<RecordingGateway>,
        service: PreferenceService,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(MemoryPreferenceRepository::new());
        let activity_repo = Arc::new(MemoryActivityLogRepository::new());
        let gateway = Arc::new(RecordingGateway::default());
        let activity_service = Arc::new(ActivityService::new(
            activity_repo.clone(),
            Arc::new(OkUploader),
            Source::Ios,
        ));
        let service = PreferenceService::new(repository, activity_service, gateway.clone());
        Fixture {
            activity_repo,
            gateway,
            service,
        }
    }

    #[tokio::test]
    async fn test_local_exchange_switch_records_and_pushes() {
        let f = fixture();

        let snapshot = f.service.switch_exchange(Exchange::Hyperliquid).await.unwrap();

        assert_eq!(snapshot.exchange, Exchange::Hyperliquid);
        assert_eq!(snapshot.account_type, AccountType::Testnet);

        let entries = f.activity_repo.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action_type, "exchange_switch");
        assert_eq!(entries[0].source, Source::Ios);
        assert_eq!(entries[0].old_value.as_deref(), Some("bybit"));
        assert_eq!(entries[0].new_value.as_deref(), Some("hyperliquid"));

        assert_eq!(f.gateway.pushes(), vec!["exchange:hyperliquid".to_string()]);
    }

    #[tokio::test]
    async fn test_noop_switch_records_nothing() {
        let f = fixture();

        let snapshot = f.service.switch_exchange(Exchange::Bybit).await.unwrap();

        assert_eq!(snapshot.exchange, Exchange::Bybit);
        assert!(f.activity_repo.entries().is_empty());
        assert!(f.gateway.pushes().is_empty());
    }

    #[tokio::test]
    async fn test_remote_apply_neither_records_nor_pushes() {
        let f = fixture();

        let snapshot = f
            .service
            .apply_remote_exchange(Exchange::Hyperliquid)
            .await
            .unwrap();

        assert_eq!(snapshot.exchange, Exchange::Hyperliquid);
        assert!(f.activity_repo.entries().is_empty());
        assert!(f.gateway.pushes().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_account_type_is_corrected_and_pushed_as_corrected() {
        let f = fixture();
        f.service.switch_exchange(Exchange::Hyperliquid).await.unwrap();

        let snapshot = f.service.switch_account_type(AccountType::Real).await.unwrap();

        // "real" is invalid on hyperliquid; the correction is what sticks
        // and what the server hears about.
        assert_eq!(snapshot.account_type, AccountType::Testnet);
        assert!(f
            .gateway
            .pushes()
            .contains(&"account_type:testnet".to_string()));
    }

    #[tokio::test]
    async fn test_theme_and_language_changes_record_old_and_new() {
        let f = fixture();

        f.service.set_theme(Theme::Dark).await.unwrap();
        f.service.set_language("de").await.unwrap();

        let entries = f.activity_repo.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action_type, "theme_change");
        assert_eq!(entries[0].old_value.as_deref(), Some("system"));
        assert_eq!(entries[0].new_value.as_deref(), Some("dark"));
        assert_eq!(entries[1].action_type, "language_change");
        assert_eq!(entries[1].old_value.as_deref(), Some("en"));
        assert_eq!(entries[1].new_value.as_deref(), Some("de"));
    }
}
