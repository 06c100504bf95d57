//! # Eventshift
//!
//! Migration-readiness repository for temporal event records: scan a
//! loosely-structured attribute store, decide which records carry the
//! complete set of temporal attributes a schema migration needs, and hand
//! back stable, paginated identifier batches, retrying transparently when
//! the store reports transient contention (deadlocks, lock-wait timeouts).
//!
//! ## Modules
//!
//! - `config` - Repository configuration with environment overrides
//! - `eligibility` - Required attribute keys and the pushed-down filter
//! - `error` - Error taxonomy for repository calls
//! - `repository` - Batch identifier fetcher with bounded retry
//! - `retry` - Backoff policy for transient contention
//! - `store` - Record store abstraction and the in-memory backend
//!
//! ```no_run
//! use std::sync::Arc;
//! use eventshift::{MemoryStore, MigrationRepository};
//!
//! # async fn demo() -> Result<(), eventshift::RepositoryError> {
//! let store = MemoryStore::new();
//! let repo = MigrationRepository::new(Arc::new(store));
//!
//! let total = repo.get_total_events().await?;
//! let batch = repo.get_ids_to_process(100).await?;
//! assert!(batch.len() as u64 <= total);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod eligibility;
pub mod error;
pub mod repository;
pub mod retry;
pub mod store;

pub use config::RepositoryConfig;
pub use eligibility::{is_record_eligible, EligibilityFilter, REQUIRED_ATTRIBUTES};
pub use error::{Operation, RepositoryError, RepositoryResult};
pub use repository::MigrationRepository;
pub use retry::RetryConfig;
pub use store::{
    AttributeBag, ErrorClass, ErrorClassifier, EventRecord, HandleProvider, MemoryStore,
    MysqlErrorClassifier, RecordId, RecordStatus, StoreError, StoreHandle, StoreResult,
};
