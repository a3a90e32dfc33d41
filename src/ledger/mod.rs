//! Experiment Ledger Module
//!
//! Durable, queryable record of features, models, training outcomes, data
//! assets, and the audit trail: the single system-of-record for experiment
//! provenance. Collection, preprocessing, and training collaborators feed
//! typed records in; monitoring collaborators read projections out.
//!
//! ## Schema Overview
//!
//! ```text
//! ModelRecord (1) ──< TrainingResultRecord (N)
//! FeatureRecord, InventoryRecord            [registration entities]
//! AuditRecord                               [append-only, one per mutation]
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use bitacora::ledger::{Ledger, MemoryLedger, TrainingMetrics, TrainingStatus};
//!
//! # async fn example() -> bitacora::Result<()> {
//! let ledger = MemoryLedger::new();
//!
//! let model_id = ledger.register_model("PhishModelV1", "RandomForest", "v1.0").await?;
//! ledger
//!     .record_training_result(
//!         model_id,
//!         TrainingMetrics::new(0.94, 0.90, 0.93, 0.90),
//!         TrainingStatus::Completed,
//!     )
//!     .await?;
//!
//! let latest = ledger.latest_training_result(model_id).await?;
//! assert!(latest.is_some());
//! # Ok(())
//! # }
//! ```

mod audit_record;
mod feature_record;
mod inventory_record;
mod memory;
mod model_record;
mod postgres;
mod training_record;

pub use audit_record::{AuditOperation, AuditRecord};
pub use feature_record::{FeatureRecord, FeatureStatus, FeatureType};
pub use inventory_record::{AssetCategory, InventoryRecord};
pub use memory::MemoryLedger;
pub use model_record::ModelRecord;
pub use postgres::PgLedger;
pub use training_record::{
    MetricsSnapshot, TrainingMetrics, TrainingResultRecord, TrainingStatus,
};

use std::future::Future;

use crate::error::{Error, Result};

/// The experiment ledger operation set.
///
/// Implementations are synchronous-per-operation: each call completes within
/// one bounded round trip to the store, acquires whatever connection it
/// needs for exactly that call, and releases it on every exit path. No
/// implementation retries internally; retry/backoff belongs to the caller.
///
/// Concurrent callers are safe: every write (including its audit entry) is a
/// single transaction, and `bulk_insert` never exposes partially-committed
/// rows to readers.
pub trait Ledger: Send + Sync {
    /// Register a feature and return its surrogate id.
    ///
    /// Emits an INSERT audit entry atomically with the insert. Under
    /// [`LedgerPolicy::unique_feature_names`](crate::config::LedgerPolicy)
    /// a second registration of an existing name fails with
    /// [`Error::Duplicate`]; the default policy creates a new row per call.
    fn register_feature(
        &self,
        name: &str,
        feature_type: FeatureType,
        status: FeatureStatus,
    ) -> impl Future<Output = Result<i64>> + Send;

    /// Mark a feature deprecated, refreshing its `last_updated` stamp.
    ///
    /// Emits an UPDATE audit entry carrying before/after snapshots. Unknown
    /// ids fail with [`Error::Referential`].
    fn deprecate_feature(&self, feature_id: i64) -> impl Future<Output = Result<()>> + Send;

    /// Register a trained model version and return its surrogate id.
    ///
    /// No uniqueness across versions of the same name: distinct versions are
    /// distinct rows.
    fn register_model(
        &self,
        name: &str,
        algorithm: &str,
        version: &str,
    ) -> impl Future<Output = Result<i64>> + Send;

    /// Record an immutable training result for an existing model.
    ///
    /// Fails with [`Error::Referential`] (and inserts nothing) if the model
    /// is unknown, and with [`Error::Validation`] if any metric falls
    /// outside [0, 1].
    fn record_training_result(
        &self,
        model_id: i64,
        metrics: TrainingMetrics,
        status: TrainingStatus,
    ) -> impl Future<Output = Result<i64>> + Send;

    /// Register a data asset in the governance inventory.
    ///
    /// The asset name is the inventory key; re-registering an existing name
    /// fails with [`Error::Duplicate`].
    fn register_data_asset(
        &self,
        name: &str,
        category: AssetCategory,
        access_roles: &[String],
        description: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Refresh an asset's `last_accessed` stamp, with an UPDATE audit entry.
    ///
    /// Unknown names fail with [`Error::Referential`].
    fn log_data_access(&self, name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Append an audit entry supplied by a caller.
    ///
    /// At least one snapshot must be present and the table name non-empty,
    /// otherwise [`Error::Validation`]. Persistence failures always
    /// propagate: audit completeness is a correctness property, so this
    /// operation never fails silently.
    fn record_audit(
        &self,
        table_name: &str,
        operation: AuditOperation,
        old_data: Option<serde_json::Value>,
        new_data: Option<serde_json::Value>,
    ) -> impl Future<Output = Result<i64>> + Send;

    /// Read the most recent training result for a model.
    ///
    /// "Most recent" means maximum `recorded_at`, ties broken by the
    /// monotonic surrogate id. A model with zero results yields `Ok(None)`,
    /// never an error.
    fn latest_training_result(
        &self,
        model_id: i64,
    ) -> impl Future<Output = Result<Option<MetricsSnapshot>>> + Send;

    /// Insert an ordered batch of raw rows into one table, all or nothing.
    ///
    /// Rows are JSON objects mapping column names to scalar values. The
    /// whole batch runs in a single transaction: a malformed row (or any
    /// store failure) leaves zero rows behind. Returns the number of rows
    /// inserted.
    fn bulk_insert(
        &self,
        table_name: &str,
        rows: &[serde_json::Value],
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// SQL identifiers accepted for dynamic table/column names: ASCII letter or
/// underscore first, then letters, digits, underscores. Everything else is
/// rejected up front rather than quoted.
pub(crate) fn is_safe_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Boundary validation shared by both ledger backends: table name and every
/// row must be well-formed before a single row is written.
pub(crate) fn validate_bulk_input(table_name: &str, rows: &[serde_json::Value]) -> Result<()> {
    if table_name.is_empty() {
        return Err(Error::Validation("bulk_insert: empty table name".to_string()));
    }
    if !is_safe_identifier(table_name) {
        return Err(Error::Validation(format!(
            "bulk_insert: unsafe table name {table_name:?}"
        )));
    }
    for (index, row) in rows.iter().enumerate() {
        let object = row.as_object().ok_or_else(|| {
            Error::Validation(format!("bulk_insert: record {index} is not an object"))
        })?;
        if object.is_empty() {
            return Err(Error::Validation(format!(
                "bulk_insert: record {index} has no columns"
            )));
        }
        for column in object.keys() {
            if !is_safe_identifier(column) {
                return Err(Error::Validation(format!(
                    "bulk_insert: record {index} has unsafe column name {column:?}"
                )));
            }
        }
    }
    Ok(())
}

/// Validation shared by `record_audit` implementations.
pub(crate) fn validate_audit_input(
    table_name: &str,
    old_data: Option<&serde_json::Value>,
    new_data: Option<&serde_json::Value>,
) -> Result<()> {
    if table_name.is_empty() {
        return Err(Error::Validation("record_audit: empty table name".to_string()));
    }
    if old_data.is_none() && new_data.is_none() {
        return Err(Error::Validation(
            "record_audit: at least one of old_data/new_data must be present".to_string(),
        ));
    }
    Ok(())
}

/// Serialize a record into its JSONB audit snapshot.
pub(crate) fn snapshot<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|err| Error::Validation(format!("audit snapshot serialization failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_identifier() {
        assert!(is_safe_identifier("features_master"));
        assert!(is_safe_identifier("_staging"));
        assert!(is_safe_identifier("t2"));
        assert!(!is_safe_identifier(""));
        assert!(!is_safe_identifier("2fast"));
        assert!(!is_safe_identifier("raw;drop table models"));
        assert!(!is_safe_identifier("bad-name"));
    }

    #[test]
    fn test_validate_bulk_rejects_empty_table_name() {
        let rows = vec![serde_json::json!({"a": 1})];
        let err = validate_bulk_input("", &rows).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_validate_bulk_rejects_non_object_row() {
        let rows = vec![serde_json::json!({"a": 1}), serde_json::json!([1, 2])];
        let err = validate_bulk_input("raw_batches", &rows).unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_validate_audit_requires_a_snapshot() {
        assert!(validate_audit_input("models", None, None).is_err());
        let new_data = serde_json::json!({"model_name": "m"});
        assert!(validate_audit_input("models", None, Some(&new_data)).is_ok());
    }
}
