//! Error taxonomy for repository calls
//!
//! Transient contention is absorbed inside the repository's retry loop and
//! never reaches callers unless the attempt budget runs out. Everything
//! else surfaces here, tagged with the logical operation that failed.

use std::fmt;
use thiserror::Error;

use crate::store::StoreError;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Logical repository operation, used as retry token and error context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    TotalEvents,
    IdsToProcess,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::TotalEvents => "get_total_events",
            Operation::IdsToProcess => "get_ids_to_process",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors surfaced by repository calls
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The store failed in a way retrying cannot fix
    #[error("{operation} failed: {source}")]
    Storage {
        operation: Operation,
        #[source]
        source: StoreError,
    },

    /// Contention outlived the retry budget
    #[error("{operation} still hitting contention after {attempts} attempts: {source}")]
    ContentionPersisted {
        operation: Operation,
        attempts: u32,
        #[source]
        source: StoreError,
    },

    /// Caller passed a limit of zero; checked before any query is issued
    #[error("limit must be a positive integer")]
    InvalidLimit,
}

impl RepositoryError {
    pub(crate) fn storage(operation: Operation, source: StoreError) -> Self {
        Self::Storage { operation, source }
    }

    pub(crate) fn contention_persisted(
        operation: Operation,
        attempts: u32,
        source: StoreError,
    ) -> Self {
        Self::ContentionPersisted {
            operation,
            attempts,
            source,
        }
    }

    /// The operation this error belongs to, when one was in flight.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Storage { operation, .. } | Self::ContentionPersisted { operation, .. } => {
                Some(*operation)
            }
            Self::InvalidLimit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_names_the_operation() {
        let err = RepositoryError::storage(
            Operation::TotalEvents,
            StoreError::driver(1064, "You have an error in your SQL syntax"),
        );

        assert!(err.to_string().contains("get_total_events"));
        assert_eq!(err.operation(), Some(Operation::TotalEvents));
    }

    #[test]
    fn contention_error_reports_the_attempt_count() {
        let err = RepositoryError::contention_persisted(
            Operation::IdsToProcess,
            3,
            StoreError::driver(1213, "Deadlock found when trying to get lock"),
        );

        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[test]
    fn invalid_limit_has_no_operation_context() {
        assert_eq!(RepositoryError::InvalidLimit.operation(), None);
    }
}
