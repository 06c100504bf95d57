//! Type definitions for the record store abstraction

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Record identifier
///
/// Identifier ordering is the ordering of every paginated result the
/// repository returns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Publication status of a record
///
/// Status never participates in eligibility decisions; it is carried so
/// callers and fixtures can exercise records across the whole lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Trash,
}

/// Multi-valued attribute bag attached to a record
///
/// A key may hold any number of stored values; duplicate writes append
/// rather than overwrite. Presence of a key means at least one stored
/// value, regardless of content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeBag {
    values: HashMap<String, Vec<String>>,
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under the given key, keeping any existing values.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// All stored values for a key, in insertion order.
    pub fn values(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the key holds at least one stored value.
    pub fn has_value(&self, key: &str) -> bool {
        !self.values(key).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An event record as seen by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: RecordId,
    pub status: RecordStatus,
    pub attributes: AttributeBag,
}

impl EventRecord {
    pub fn new(id: RecordId, status: RecordStatus) -> Self {
        Self {
            id,
            status,
            attributes: AttributeBag::new(),
        }
    }
}
