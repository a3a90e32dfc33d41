//! Tests for error types

use std::time::Duration;

use bitacora::Error;

#[test]
fn test_store_unavailable_error() {
    let error = Error::StoreUnavailable("connection refused".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("store unavailable"));
    assert!(error_str.contains("connection refused"));
    assert!(error.is_unavailable());
}

#[test]
fn test_timeout_error() {
    let error = Error::Timeout(Duration::from_millis(30_000));
    let error_str = format!("{error}");
    assert!(error_str.contains("timed out"));
    assert!(error.is_unavailable());
}

#[test]
fn test_referential_error() {
    let error = Error::Referential("unknown model_id 999".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("referential integrity violation"));
    assert!(error_str.contains("999"));
    assert!(!error.is_unavailable());
}

#[test]
fn test_duplicate_error() {
    let error = Error::Duplicate("feature \"url_length\" already registered".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("duplicate record"));
    assert!(!error.is_unavailable());
}

#[test]
fn test_validation_error() {
    let error = Error::Validation("accuracy must be a fraction in [0, 1], got 94".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("validation failed"));
    assert!(!error.is_unavailable());
}

#[test]
fn test_sqlx_pool_timeout_maps_to_transport_failure() {
    let error: Error = sqlx::Error::PoolTimedOut.into();
    assert!(error.is_unavailable());
}

#[test]
fn test_sqlx_row_not_found_maps_to_transport_failure() {
    // RowNotFound never leaks from the ledger API (absent rows are modeled
    // as Option or Referential), so the blanket mapping is transport-level.
    let error: Error = sqlx::Error::RowNotFound.into();
    assert!(error.is_unavailable());
}

#[test]
fn test_error_debug() {
    let error = Error::Referential("unknown feature_id 7".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("Referential"));
}
