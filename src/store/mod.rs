//! Record store abstraction
//!
//! The repository talks to the datastore through these seams: a query
//! handle ([`StoreHandle`]), a capability to replace it after failures
//! ([`HandleProvider`]), and an injected failure classifier
//! ([`ErrorClassifier`]). The in-memory backend backs the test suite.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{
    ErrorClass, ErrorClassifier, MysqlErrorClassifier, StoreError, StoreResult,
    MYSQL_ER_LOCK_DEADLOCK, MYSQL_ER_LOCK_WAIT_TIMEOUT,
};
pub use memory::MemoryStore;
pub use traits::{HandleProvider, StoreHandle};
pub use types::{AttributeBag, EventRecord, RecordId, RecordStatus};
