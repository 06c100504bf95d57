//! Error types and transient-failure classification for the store layer

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a store backend
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The backend driver rejected or aborted a query with a numeric code
    #[error("driver error {code}: {message}")]
    Driver { code: u32, message: String },

    /// The connection behind the handle is gone or unusable
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend could not be reached at all
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The addressed record does not exist
    #[error("not found: {0}")]
    NotFound(String),
}

impl StoreError {
    /// Create a driver error with a backend error code
    pub fn driver(code: u32, message: impl Into<String>) -> Self {
        Self::Driver {
            code,
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Failure class as seen by the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Lock conflict class: the same query can succeed if reissued
    Transient,
    /// Everything else: propagate to the caller unmodified
    Fatal,
}

/// Maps backend errors onto a failure class
///
/// Classification is injected so the retry policy stays backend-agnostic;
/// each driver knows its own contention codes.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, error: &StoreError) -> ErrorClass;
}

/// MySQL deadlock (ER_LOCK_DEADLOCK)
pub const MYSQL_ER_LOCK_DEADLOCK: u32 = 1213;
/// MySQL lock wait timeout (ER_LOCK_WAIT_TIMEOUT)
pub const MYSQL_ER_LOCK_WAIT_TIMEOUT: u32 = 1205;

/// Classifier for MySQL-style numeric error codes
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlErrorClassifier;

impl ErrorClassifier for MysqlErrorClassifier {
    fn classify(&self, error: &StoreError) -> ErrorClass {
        match error {
            StoreError::Driver { code, .. }
                if *code == MYSQL_ER_LOCK_DEADLOCK || *code == MYSQL_ER_LOCK_WAIT_TIMEOUT =>
            {
                ErrorClass::Transient
            }
            _ => ErrorClass::Fatal,
        }
    }
}
