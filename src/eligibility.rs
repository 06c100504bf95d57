//! Eligibility rules for schema migration
//!
//! A record is ready to migrate when it carries a complete set of temporal
//! attributes. The rule is expressed as a filter value the store evaluates
//! natively, so counting and paginating never load attribute bags into
//! application memory.

use serde::{Deserialize, Serialize};

use crate::store::{AttributeBag, RecordId, StoreHandle, StoreResult};

/// Local wall-clock start of the event
pub const START_DATE: &str = "_EventStartDate";
/// Local wall-clock end of the event
pub const END_DATE: &str = "_EventEndDate";
/// UTC start of the event
pub const START_DATE_UTC: &str = "_EventStartDateUTC";
/// UTC end of the event
pub const END_DATE_UTC: &str = "_EventEndDateUTC";
/// IANA timezone the local times are anchored to
pub const TIMEZONE: &str = "_EventTimezone";

/// The attributes a record must carry, each with at least one stored value,
/// to be eligible for migration.
pub const REQUIRED_ATTRIBUTES: [&str; 5] = [
    START_DATE,
    END_DATE,
    START_DATE_UTC,
    END_DATE_UTC,
    TIMEZONE,
];

/// Presence filter pushed down into store queries
///
/// Matches records that hold at least one stored value under every required
/// key. Value content is never inspected: an empty string counts, an absent
/// key disqualifies, duplicates change nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityFilter {
    required: Vec<String>,
}

impl EligibilityFilter {
    /// The migration-readiness filter over the five temporal attributes.
    pub fn for_migration() -> Self {
        Self {
            required: REQUIRED_ATTRIBUTES.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Filter over an explicit key set. Empty key sets match everything.
    pub fn requiring<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Keys the filter requires, in clause order.
    pub fn required_keys(&self) -> &[String] {
        &self.required
    }

    /// Native evaluation of the filter against one attribute bag.
    pub fn matches(&self, bag: &AttributeBag) -> bool {
        self.required.iter().all(|key| bag.has_value(key))
    }
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self::for_migration()
    }
}

/// Per-record eligibility check through the attribute read primitive.
///
/// The repository itself never calls this (it pushes the filter into the
/// store); it is the contract for callers that hold a single identifier.
pub async fn is_record_eligible(handle: &dyn StoreHandle, id: RecordId) -> StoreResult<bool> {
    for key in REQUIRED_ATTRIBUTES {
        if handle.attribute_values(id, key).await?.is_empty() {
            return Ok(false);
        }
    }
    Ok(true)
}
