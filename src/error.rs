//! Error types for the bitacora ledger
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use std::time::Duration;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger error types
///
/// The taxonomy separates transport failures (`StoreUnavailable`, `Timeout`)
/// from integrity failures (`Referential`, `Duplicate`) and boundary
/// rejections (`Validation`). The ledger never retries internally; callers
/// own the retry policy and use [`Error::is_unavailable`] to pick retryable
/// failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Connectivity to the backing store failed
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Operation exceeded its deadline; the in-flight transaction was dropped
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Write violates referential integrity (e.g. unknown model_id)
    #[error("referential integrity violation: {0}")]
    Referential(String),

    /// Uniqueness policy rejected a duplicate registration
    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// Malformed input rejected at the ledger boundary
    #[error("validation failed: {0}")]
    Validation(String),
}

impl Error {
    /// True for transport-level failures where a retry by the caller may
    /// succeed (`StoreUnavailable` and `Timeout`).
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Timeout(_))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    Self::Referential(db.message().to_string())
                }
                sqlx::error::ErrorKind::UniqueViolation => {
                    Self::Duplicate(db.message().to_string())
                }
                sqlx::error::ErrorKind::CheckViolation
                | sqlx::error::ErrorKind::NotNullViolation => {
                    Self::Validation(db.message().to_string())
                }
                _ => Self::StoreUnavailable(db.message().to_string()),
            },
            _ => Self::StoreUnavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_unavailable() {
        assert!(Error::Timeout(Duration::from_secs(30)).is_unavailable());
        assert!(Error::StoreUnavailable("connection refused".to_string()).is_unavailable());
        assert!(!Error::Referential("unknown model_id 7".to_string()).is_unavailable());
        assert!(!Error::Validation("accuracy out of range".to_string()).is_unavailable());
    }

    #[test]
    fn test_pool_timeout_maps_to_store_unavailable() {
        let err: Error = sqlx::Error::PoolTimedOut.into();
        assert!(err.is_unavailable());
    }
}
