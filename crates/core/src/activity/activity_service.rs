//! Activity log service: durable record of user actions, best-effort upload.

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::activity::{
    ActivityLogEntry, ActivityLogRepositoryTrait, ActivityUploaderTrait, NewActivity,
};
use crate::errors::Result;
use crate::events::Source;

/// Outcome of one flush pass over the unsynced queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FlushReport {
    /// Entries acknowledged this pass
    pub uploaded: usize,
    /// Entries still queued after the pass
    pub remaining: usize,
}

#[async_trait]
pub trait ActivityServiceTrait: Send + Sync {
    /// Record a local user action and attempt an immediate upload.
    ///
    /// The entry is appended before any network activity, so the local
    /// record survives an upload failure; the failure itself is swallowed
    /// here because the user's action already succeeded.
    async fn record(&self, activity: NewActivity) -> Result<ActivityLogEntry>;

    /// Mirror an action observed from another device's broadcast.
    ///
    /// Observed entries never enter the upload queue - the originating
    /// device owns uploading them.
    async fn record_observed(
        &self,
        source: Source,
        activity: NewActivity,
    ) -> Result<ActivityLogEntry>;

    /// Upload unsynced entries in creation order, halting on the first
    /// failure so entry N+1 is never applied server-side before entry N.
    async fn flush_pending(&self) -> Result<FlushReport>;
}

pub struct ActivityService {
    repository: Arc<dyn ActivityLogRepositoryTrait>,
    uploader: Arc<dyn ActivityUploaderTrait>,
    /// This device's platform identifier, stamped on local entries.
    source: Source,
}

impl ActivityService {
    pub fn new(
        repository: Arc<dyn ActivityLogRepositoryTrait>,
        uploader: Arc<dyn ActivityUploaderTrait>,
        source: Source,
    ) -> Self {
        ActivityService {
            repository,
            uploader,
            source,
        }
    }
}

#[async_trait]
impl ActivityServiceTrait for ActivityService {
    async fn record(&self, activity: NewActivity) -> Result<ActivityLogEntry> {
        let mut entry = ActivityLogEntry::new(self.source, activity);
        self.repository.append(&entry).await?;

        match self.uploader.upload(&entry).await {
            Ok(()) => {
                self.repository.mark_synced(&entry.id).await?;
                entry.synced = true;
            }
            Err(e) => {
                warn!(
                    "Activity upload failed, entry {} stays queued: {}",
                    entry.id, e
                );
            }
        }

        Ok(entry)
    }

    async fn record_observed(
        &self,
        source: Source,
        activity: NewActivity,
    ) -> Result<ActivityLogEntry> {
        let entry = ActivityLogEntry::observed(source, activity);
        self.repository.append(&entry).await?;
        Ok(entry)
    }

    async fn flush_pending(&self) -> Result<FlushReport> {
        let pending = self.repository.list_unsynced().await?;
        let total = pending.len();
        let mut uploaded = 0;

        for entry in pending {
            match self.uploader.upload(&entry).await {
                Ok(()) => {
                    self.repository.mark_synced(&entry.id).await?;
                    uploaded += 1;
                }
                Err(e) => {
                    debug!(
                        "Flush halted at entry {} ({} of {} uploaded): {}",
                        entry.id, uploaded, total, e
                    );
                    break;
                }
            }
        }

        Ok(FlushReport {
            uploaded,
            remaining: total - uploaded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActionCategory, MemoryActivityLogRepository};
    use crate::errors::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tradepulse_trading_api::ApiError;

    /// Uploader that fails the first `failures` attempts, then succeeds.
    /// Records the entry IDs of every attempt in order.
    #[derive(Default)]
    struct FlakyUploader {
        failures: AtomicUsize,
        attempts: Mutex<Vec<String>>,
    }

    impl FlakyUploader {
        fn failing(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                attempts: Mutex::default(),
            }
        }

        fn attempts(&self) -> Vec<String> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ActivityUploaderTrait for FlakyUploader {
        async fn upload(&self, entry: &ActivityLogEntry) -> Result<()> {
            self.attempts.lock().unwrap().push(entry.id.clone());
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(Error::Api(ApiError::api(503, "upstream unavailable")));
            }
            Ok(())
        }
    }

    fn activity(action_type: &str) -> NewActivity {
        NewActivity {
            action_type: action_type.to_string(),
            action_category: ActionCategory::Settings,
            entity_type: None,
            old_value: None,
            new_value: None,
        }
    }

    fn service(
        repository: Arc<MemoryActivityLogRepository>,
        uploader: Arc<FlakyUploader>,
    ) -> ActivityService {
        ActivityService::new(repository, uploader, Source::Android)
    }

    #[tokio::test]
    async fn test_record_marks_synced_on_upload_success() {
        let repository = Arc::new(MemoryActivityLogRepository::new());
        let uploader = Arc::new(FlakyUploader::failing(0));
        let service = service(repository.clone(), uploader);

        let entry = service.record(activity("theme_change")).await.unwrap();

        assert!(entry.synced);
        assert_eq!(entry.source, Source::Android);
        assert!(repository.entries()[0].synced);
    }

    #[tokio::test]
    async fn test_record_swallows_upload_failure_and_keeps_entry_queued() {
        let repository = Arc::new(MemoryActivityLogRepository::new());
        let uploader = Arc::new(FlakyUploader::failing(1));
        let service = service(repository.clone(), uploader);

        let entry = service.record(activity("theme_change")).await.unwrap();

        assert!(!entry.synced);
        let unsynced = repository.list_unsynced().await.unwrap();
        assert_eq!(unsynced.len(), 1);
        assert_eq!(unsynced[0].id, entry.id);
    }

    #[tokio::test]
    async fn test_flush_halts_on_first_failure_preserving_order() {
        let repository = Arc::new(MemoryActivityLogRepository::new());
        // record() attempts E1 once (fails); flush then attempts E1 again
        // (fails) and must never reach E2.
        let uploader = Arc::new(FlakyUploader::failing(3));
        let service = service(repository.clone(), uploader.clone());

        let e1 = service.record(activity("first")).await.unwrap();
        let e2 = service.record(activity("second")).await.unwrap();

        let report = service.flush_pending().await.unwrap();

        assert_eq!(report.uploaded, 0);
        assert_eq!(report.remaining, 2);
        let attempts = uploader.attempts();
        // record(e1), record(e2), flush(e1) - e2 never retried after e1 failed
        assert_eq!(attempts, vec![e1.id.clone(), e2.id.clone(), e1.id.clone()]);
    }

    #[tokio::test]
    async fn test_entry_syncs_on_fourth_attempt_without_duplicates() {
        let repository = Arc::new(MemoryActivityLogRepository::new());
        let uploader = Arc::new(FlakyUploader::failing(3));
        let service = service(repository.clone(), uploader.clone());

        // Created offline: the immediate upload fails (attempt 1).
        let entry = service.record(activity("exchange_switch")).await.unwrap();
        assert!(!entry.synced);

        // Two more flushes fail (attempts 2 and 3).
        assert_eq!(service.flush_pending().await.unwrap().uploaded, 0);
        assert_eq!(service.flush_pending().await.unwrap().uploaded, 0);

        // Reconnect: fourth attempt succeeds.
        let report = service.flush_pending().await.unwrap();
        assert_eq!(report, FlushReport { uploaded: 1, remaining: 0 });

        assert_eq!(uploader.attempts().len(), 4);
        let entries = repository.entries();
        assert_eq!(entries.len(), 1, "retries must not duplicate the entry");
        assert!(entries[0].synced);
    }

    #[tokio::test]
    async fn test_flush_uploads_queue_in_creation_order() {
        let repository = Arc::new(MemoryActivityLogRepository::new());
        let uploader = Arc::new(FlakyUploader::failing(2));
        let service = service(repository.clone(), uploader.clone());

        let e1 = service.record(activity("first")).await.unwrap();
        let e2 = service.record(activity("second")).await.unwrap();

        let report = service.flush_pending().await.unwrap();
        assert_eq!(report, FlushReport { uploaded: 2, remaining: 0 });

        // record(e1) fail, record(e2) fail, then flush: e1 before e2
        let attempts = uploader.attempts();
        assert_eq!(&attempts[2..], &[e1.id, e2.id]);
    }

    #[tokio::test]
    async fn test_observed_entries_never_enter_the_queue() {
        let repository = Arc::new(MemoryActivityLogRepository::new());
        let uploader = Arc::new(FlakyUploader::failing(0));
        let service = service(repository.clone(), uploader.clone());

        service
            .record_observed(Source::Webapp, activity("exchange_switch"))
            .await
            .unwrap();

        let report = service.flush_pending().await.unwrap();
        assert_eq!(report, FlushReport::default());
        assert!(uploader.attempts().is_empty());
    }
}
