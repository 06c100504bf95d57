//! Shared event fixtures used across the integration suites

use eventshift::{MemoryStore, RecordId, RecordStatus, REQUIRED_ATTRIBUTES};

/// Stored value for each required attribute in a well-formed event.
pub fn attribute_value(key: &str) -> &'static str {
    match key {
        "_EventStartDate" => "2019-01-01 10:00:00",
        "_EventEndDate" => "2019-01-01 11:00:00",
        "_EventStartDateUTC" => "2019-01-01 15:00:00",
        "_EventEndDateUTC" => "2019-01-01 16:00:00",
        "_EventTimezone" => "America/New_York",
        other => panic!("unexpected attribute key {other}"),
    }
}

/// An event carrying all five required attributes.
pub async fn complete_event(store: &MemoryStore, status: RecordStatus) -> RecordId {
    event_missing(store, &[], status).await
}

/// An event carrying every required attribute except the listed ones.
pub async fn event_missing(
    store: &MemoryStore,
    missing: &[&str],
    status: RecordStatus,
) -> RecordId {
    let id = store.create_record(status).await;
    for key in REQUIRED_ATTRIBUTES {
        if !missing.contains(&key) {
            store
                .add_attribute(id, key, attribute_value(key))
                .await
                .expect("record was just created");
        }
    }
    id
}

/// A complete event with every required attribute stored twice.
pub async fn event_with_duplicate_attributes(
    store: &MemoryStore,
    status: RecordStatus,
) -> RecordId {
    let id = complete_event(store, status).await;
    for key in REQUIRED_ATTRIBUTES {
        store
            .add_attribute(id, key, attribute_value(key))
            .await
            .expect("record was just created");
    }
    id
}
