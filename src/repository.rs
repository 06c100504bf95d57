//! Batch identifier fetcher for migration-ready event records
//!
//! Counting and pagination run as single store-side queries restricted by
//! the eligibility filter. Every query goes through a bounded retry loop:
//! a transient contention failure discards the active handle, acquires a
//! fresh one from the provider, and reissues the identical logical query.
//! Callers see either the full correct result or an explicit failure,
//! never a partial one.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::RepositoryConfig;
use crate::eligibility::EligibilityFilter;
use crate::error::{Operation, RepositoryError, RepositoryResult};
use crate::retry::RetryConfig;
use crate::store::{
    ErrorClass, ErrorClassifier, HandleProvider, MysqlErrorClassifier, RecordId, StoreHandle,
    StoreResult,
};

/// Repository over migration-eligible event records
///
/// One instance serves one caller at a time per call; several instances may
/// point at the same store. Ordering is guaranteed within a single call's
/// retry sequence only.
pub struct MigrationRepository {
    provider: Arc<dyn HandleProvider>,
    classifier: Arc<dyn ErrorClassifier>,
    filter: EligibilityFilter,
    retry: RetryConfig,
    handle: Mutex<Option<Arc<dyn StoreHandle>>>,
}

impl MigrationRepository {
    /// Repository with default configuration and the MySQL-style classifier.
    pub fn new(provider: Arc<dyn HandleProvider>) -> Self {
        Self::with_config(provider, RepositoryConfig::default())
    }

    pub fn with_config(provider: Arc<dyn HandleProvider>, config: RepositoryConfig) -> Self {
        Self {
            provider,
            classifier: Arc::new(MysqlErrorClassifier),
            filter: EligibilityFilter::for_migration(),
            retry: config.retry,
            handle: Mutex::new(None),
        }
    }

    /// Replace the failure classifier, e.g. for a non-MySQL backend.
    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the eligibility filter.
    pub fn with_filter(mut self, filter: EligibilityFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Total number of migration-eligible records, via a single aggregate
    /// query. Equals the length of [`get_ids_to_process`](Self::get_ids_to_process)
    /// with a limit at or above this total.
    pub async fn get_total_events(&self) -> RepositoryResult<u64> {
        self.run_with_retry(Operation::TotalEvents, |handle| async move {
            handle.count_matching(&self.filter).await
        })
        .await
    }

    /// Up to `limit` eligible record identifiers in ascending id order.
    ///
    /// Repeated calls with unchanged data return identical ordered results.
    /// A `limit` of zero fails fast before any query is issued.
    pub async fn get_ids_to_process(&self, limit: usize) -> RepositoryResult<Vec<RecordId>> {
        if limit == 0 {
            return Err(RepositoryError::InvalidLimit);
        }

        self.run_with_retry(Operation::IdsToProcess, |handle| async move {
            handle.select_matching_ids(&self.filter, limit).await
        })
        .await
    }

    /// Run one logical statement under the retry policy.
    ///
    /// The closure receives the active handle and must reissue cleanly when
    /// called again: nothing from a failed attempt is reused.
    async fn run_with_retry<T, F, Fut>(&self, operation: Operation, run: F) -> RepositoryResult<T>
    where
        F: Fn(Arc<dyn StoreHandle>) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let mut attempt: u32 = 1;

        loop {
            let handle = self
                .active_handle()
                .await
                .map_err(|err| RepositoryError::storage(operation, err))?;

            match run(handle).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    // A handle that reported any failure may not be reused.
                    self.discard_handle().await;

                    match self.classifier.classify(&err) {
                        ErrorClass::Fatal => {
                            return Err(RepositoryError::storage(operation, err));
                        }
                        ErrorClass::Transient => {
                            if !self.retry.allows_another_attempt(attempt) {
                                return Err(RepositoryError::contention_persisted(
                                    operation, attempt, err,
                                ));
                            }

                            let delay = self.retry.delay_for(attempt);
                            warn!(
                                operation = %operation,
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                error = %err,
                                "transient contention, replacing store handle and reissuing"
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                    }
                }
            }
        }
    }

    async fn active_handle(&self) -> StoreResult<Arc<dyn StoreHandle>> {
        let mut slot = self.handle.lock().await;
        if let Some(handle) = slot.as_ref() {
            return Ok(Arc::clone(handle));
        }

        debug!("acquiring fresh store handle");
        let handle = self.provider.fresh_handle().await?;
        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }

    async fn discard_handle(&self) {
        let mut slot = self.handle.lock().await;
        if slot.take().is_some() {
            debug!("discarded failed store handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::REQUIRED_ATTRIBUTES;
    use crate::store::{MemoryStore, RecordStatus, StoreError, MYSQL_ER_LOCK_DEADLOCK};
    use std::time::Duration;

    fn fast_retry() -> RepositoryConfig {
        RepositoryConfig {
            retry: RetryConfig {
                initial_delay: Duration::from_millis(1),
                jitter: false,
                ..Default::default()
            },
        }
    }

    fn repository(store: &MemoryStore) -> MigrationRepository {
        MigrationRepository::with_config(Arc::new(store.clone()), fast_retry())
    }

    async fn seed_complete(store: &MemoryStore) -> RecordId {
        let id = store.create_record(RecordStatus::Publish).await;
        for key in REQUIRED_ATTRIBUTES {
            store
                .add_attribute(id, key, "2019-01-01 10:00:00")
                .await
                .unwrap();
        }
        id
    }

    #[tokio::test]
    async fn zero_limit_fails_before_any_query() {
        let store = MemoryStore::new();
        let repo = repository(&store);

        let result = repo.get_ids_to_process(0).await;

        assert!(matches!(result, Err(RepositoryError::InvalidLimit)));
        assert_eq!(store.queries_executed(), 0);
        assert_eq!(store.handles_issued(), 0);
    }

    #[tokio::test]
    async fn one_deadlock_is_invisible_to_the_caller() {
        let store = MemoryStore::new();
        let expected = vec![seed_complete(&store).await, seed_complete(&store).await];
        store
            .fail_next_query(MYSQL_ER_LOCK_DEADLOCK, "Faux Deadlock - whoops!")
            .await;

        let repo = repository(&store);
        let ids = repo.get_ids_to_process(100).await.unwrap();

        assert_eq!(ids, expected);
        // Failed attempt's handle was replaced with a fresh one.
        assert_eq!(store.handles_issued(), 2);
    }

    #[tokio::test]
    async fn fatal_errors_are_never_retried() {
        let store = MemoryStore::new();
        seed_complete(&store).await;
        store
            .fail_next_query(1064, "You have an error in your SQL syntax")
            .await;

        let repo = repository(&store);
        let result = repo.get_total_events().await;

        assert!(matches!(
            result,
            Err(RepositoryError::Storage {
                operation: Operation::TotalEvents,
                source: StoreError::Driver { code: 1064, .. },
            })
        ));
        assert_eq!(store.handles_issued(), 1);
    }

    #[tokio::test]
    async fn persistent_contention_exhausts_the_budget() {
        let store = MemoryStore::new();
        seed_complete(&store).await;
        for _ in 0..3 {
            store
                .fail_next_query(MYSQL_ER_LOCK_DEADLOCK, "Deadlock found when trying to get lock")
                .await;
        }

        let repo = repository(&store);
        let result = repo.get_total_events().await;

        match result {
            Err(RepositoryError::ContentionPersisted { attempts, .. }) => {
                assert_eq!(attempts, 3)
            }
            other => panic!("expected ContentionPersisted, got {other:?}"),
        }
        assert_eq!(store.handles_issued(), 3);
    }

    #[tokio::test]
    async fn handle_is_reused_across_successful_calls() {
        let store = MemoryStore::new();
        seed_complete(&store).await;

        let repo = repository(&store);
        repo.get_total_events().await.unwrap();
        repo.get_ids_to_process(10).await.unwrap();

        assert_eq!(store.handles_issued(), 1);
    }

    #[tokio::test]
    async fn count_and_ids_agree_after_a_retry() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            seed_complete(&store).await;
        }
        store
            .fail_next_query(MYSQL_ER_LOCK_DEADLOCK, "Faux Deadlock - whoops!")
            .await;

        let repo = repository(&store);
        let total = repo.get_total_events().await.unwrap();
        let ids = repo.get_ids_to_process(100).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(ids.len() as u64, total);
    }
}
