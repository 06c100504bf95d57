//! Core trait definitions for the record store abstraction

use async_trait::async_trait;
use std::sync::Arc;

use super::error::StoreResult;
use super::types::RecordId;
use crate::eligibility::EligibilityFilter;

/// A live query handle onto the record store
///
/// A handle wraps one underlying connection. Once any query on it fails,
/// the handle must be treated as unusable and replaced through the
/// [`HandleProvider`]; backends are free to reject further queries on a
/// failed handle.
#[async_trait]
pub trait StoreHandle: Send + Sync {
    /// Count records matching the filter, evaluated store-side as a single
    /// aggregate query.
    async fn count_matching(&self, filter: &EligibilityFilter) -> StoreResult<u64>;

    /// Select up to `limit` matching record identifiers in ascending id
    /// order, duplicate-free.
    async fn select_matching_ids(
        &self,
        filter: &EligibilityFilter,
        limit: usize,
    ) -> StoreResult<Vec<RecordId>>;

    /// All stored values for one attribute of one record, in insertion
    /// order. Multiple values per key are possible.
    async fn attribute_values(&self, id: RecordId, key: &str) -> StoreResult<Vec<String>>;
}

/// Capability to mint fresh store handles
///
/// This is the reset primitive the repository uses after a transient
/// contention failure: discard the failed handle, acquire a new one here,
/// reissue the query.
#[async_trait]
pub trait HandleProvider: Send + Sync {
    async fn fresh_handle(&self) -> StoreResult<Arc<dyn StoreHandle>>;
}
