//! In-memory store backend for tests and local development
//!
//! Records live in a `BTreeMap` keyed by id, so every scan is naturally in
//! ascending id order and repeated queries are deterministic. The backend
//! can be scripted to fail queries with driver errors, which is how the
//! reset-and-retry path of the repository is exercised without a real
//! database.

use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::error::{StoreError, StoreResult};
use super::traits::{HandleProvider, StoreHandle};
use super::types::{EventRecord, RecordId, RecordStatus};
use crate::eligibility::EligibilityFilter;

/// In-memory record store
///
/// Cloning shares the underlying state, so a clone can seed records while
/// a repository queries through handles minted from the same store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<StoreState>,
}

#[derive(Default)]
struct StoreState {
    records: RwLock<BTreeMap<RecordId, EventRecord>>,
    faults: Mutex<VecDeque<StoreError>>,
    next_id: AtomicU64,
    handles_issued: AtomicU64,
    queries_executed: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record with an empty attribute bag, returning its id.
    pub async fn create_record(&self, status: RecordStatus) -> RecordId {
        let id = RecordId(self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut records = self.state.records.write().await;
        records.insert(id, EventRecord::new(id, status));
        id
    }

    /// Append an attribute value to a record, keeping existing values.
    pub async fn add_attribute(
        &self,
        id: RecordId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> StoreResult<()> {
        let mut records = self.state.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("record {id}")))?;
        record.attributes.append(key, value);
        Ok(())
    }

    /// Script the next executed statement to fail with a driver error.
    ///
    /// Faults queue up: each executed statement consumes at most one, and
    /// the handle that hit it is poisoned until replaced.
    pub async fn fail_next_query(&self, code: u32, message: impl Into<String>) {
        self.push_fault(StoreError::driver(code, message)).await;
    }

    /// Script an arbitrary store error for the next executed statement.
    pub async fn push_fault(&self, error: StoreError) {
        self.state.faults.lock().await.push_back(error);
    }

    /// Handles minted so far, including replacements after failures.
    pub fn handles_issued(&self) -> u64 {
        self.state.handles_issued.load(Ordering::SeqCst)
    }

    /// Statements that executed successfully.
    pub fn queries_executed(&self) -> u64 {
        self.state.queries_executed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HandleProvider for MemoryStore {
    async fn fresh_handle(&self) -> StoreResult<Arc<dyn StoreHandle>> {
        self.state.handles_issued.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemoryHandle {
            state: Arc::clone(&self.state),
            poisoned: AtomicBool::new(false),
        }))
    }
}

/// One connection onto a [`MemoryStore`]
struct MemoryHandle {
    state: Arc<StoreState>,
    poisoned: AtomicBool,
}

impl MemoryHandle {
    /// Fault gate every statement passes through before touching data.
    async fn check_usable(&self) -> StoreResult<()> {
        if self.poisoned.load(Ordering::SeqCst) {
            return Err(StoreError::connection("handle reused after failure"));
        }
        if let Some(fault) = self.state.faults.lock().await.pop_front() {
            self.poisoned.store(true, Ordering::SeqCst);
            return Err(fault);
        }
        self.state.queries_executed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl StoreHandle for MemoryHandle {
    async fn count_matching(&self, filter: &EligibilityFilter) -> StoreResult<u64> {
        self.check_usable().await?;
        let records = self.state.records.read().await;
        Ok(records
            .values()
            .filter(|r| filter.matches(&r.attributes))
            .count() as u64)
    }

    async fn select_matching_ids(
        &self,
        filter: &EligibilityFilter,
        limit: usize,
    ) -> StoreResult<Vec<RecordId>> {
        self.check_usable().await?;
        let records = self.state.records.read().await;
        Ok(records
            .values()
            .filter(|r| filter.matches(&r.attributes))
            .map(|r| r.id)
            .take(limit)
            .collect())
    }

    async fn attribute_values(&self, id: RecordId, key: &str) -> StoreResult<Vec<String>> {
        self.check_usable().await?;
        let records = self.state.records.read().await;
        Ok(records
            .get(&id)
            .map(|r| r.attributes.values(key).to_vec())
            .unwrap_or_default())
    }
}
