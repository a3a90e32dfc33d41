//! In-memory ledger implementation.
//!
//! The default backend for tests and short-lived pipeline runs - data is
//! lost on process restart. For durability, use [`PgLedger`](super::PgLedger).

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{
    snapshot, validate_audit_input, validate_bulk_input, AssetCategory, AuditOperation,
    AuditRecord, FeatureRecord, FeatureStatus, FeatureType, InventoryRecord, Ledger,
    MetricsSnapshot, ModelRecord, TrainingMetrics, TrainingResultRecord, TrainingStatus,
};
use crate::config::LedgerPolicy;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct LedgerState {
    features: BTreeMap<i64, FeatureRecord>,
    models: BTreeMap<i64, ModelRecord>,
    training_results: Vec<TrainingResultRecord>,
    inventory: BTreeMap<String, InventoryRecord>,
    audit_log: Vec<AuditRecord>,
    raw_tables: HashMap<String, Vec<serde_json::Value>>,
    next_feature_id: i64,
    next_model_id: i64,
    next_result_id: i64,
    next_audit_id: i64,
}

impl LedgerState {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn append_audit(
        &mut self,
        table_name: &str,
        operation: AuditOperation,
        old_data: Option<serde_json::Value>,
        new_data: Option<serde_json::Value>,
    ) -> i64 {
        let audit_id = Self::next_id(&mut self.next_audit_id);
        self.audit_log.push(AuditRecord::new(
            audit_id, table_name, operation, old_data, new_data,
        ));
        audit_id
    }
}

/// In-memory ledger guarded by a single mutex.
///
/// One lock (never held across an await) keeps every write plus its audit
/// entry atomic, and keeps `bulk_insert` all-or-nothing without a real
/// transaction layer underneath. Surrogate id counters only advance, so ids
/// are monotonic and never reused.
///
/// # Example
///
/// ```rust,no_run
/// use bitacora::ledger::{Ledger, MemoryLedger};
///
/// # async fn example() -> bitacora::Result<()> {
/// let ledger = MemoryLedger::new();
/// let model_id = ledger.register_model("PhishModelV1", "RandomForest", "v1.0").await?;
/// assert_eq!(model_id, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryLedger {
    policy: LedgerPolicy,
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    /// Create an empty ledger with the default (duplicate-tolerant) policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ledger with an explicit uniqueness policy.
    #[must_use]
    pub fn with_policy(policy: LedgerPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(LedgerState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        // A poisoned lock means a panicking writer; the state itself is
        // still consistent because every mutation completes before release.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of registered features.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.state().features.len()
    }

    /// Number of registered model versions.
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.state().models.len()
    }

    /// Number of recorded training results.
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.state().training_results.len()
    }

    /// Number of inventory entries.
    #[must_use]
    pub fn inventory_count(&self) -> usize {
        self.state().inventory.len()
    }

    /// Number of audit entries.
    #[must_use]
    pub fn audit_count(&self) -> usize {
        self.state().audit_log.len()
    }

    /// Number of raw rows held for `table_name` via `bulk_insert`.
    #[must_use]
    pub fn raw_row_count(&self, table_name: &str) -> usize {
        self.state()
            .raw_tables
            .get(table_name)
            .map_or(0, Vec::len)
    }

    /// Check the ledger holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let state = self.state();
        state.features.is_empty()
            && state.models.is_empty()
            && state.training_results.is_empty()
            && state.inventory.is_empty()
            && state.audit_log.is_empty()
            && state.raw_tables.is_empty()
    }

    /// Get a feature by id.
    #[must_use]
    pub fn get_feature(&self, feature_id: i64) -> Option<FeatureRecord> {
        self.state().features.get(&feature_id).cloned()
    }

    /// Get a model by id.
    #[must_use]
    pub fn get_model(&self, model_id: i64) -> Option<ModelRecord> {
        self.state().models.get(&model_id).cloned()
    }

    /// Get an inventory entry by name.
    #[must_use]
    pub fn get_data_asset(&self, name: &str) -> Option<InventoryRecord> {
        self.state().inventory.get(name).cloned()
    }

    /// Snapshot of the full audit trail, oldest first.
    #[must_use]
    pub fn audit_entries(&self) -> Vec<AuditRecord> {
        self.state().audit_log.clone()
    }
}

impl Ledger for MemoryLedger {
    async fn register_feature(
        &self,
        name: &str,
        feature_type: FeatureType,
        status: FeatureStatus,
    ) -> Result<i64> {
        let mut state = self.state();
        if self.policy.unique_feature_names
            && state
                .features
                .values()
                .any(|feature| feature.feature_name() == name)
        {
            return Err(Error::Duplicate(format!("feature {name:?} already registered")));
        }

        let feature_id = LedgerState::next_id(&mut state.next_feature_id);
        let record = FeatureRecord::new(feature_id, name, feature_type, status);
        let new_data = snapshot(&record)?;
        state.features.insert(feature_id, record);
        state.append_audit("features_master", AuditOperation::Insert, None, Some(new_data));
        Ok(feature_id)
    }

    async fn deprecate_feature(&self, feature_id: i64) -> Result<()> {
        let mut state = self.state();
        let record = state
            .features
            .get_mut(&feature_id)
            .ok_or_else(|| Error::Referential(format!("unknown feature_id {feature_id}")))?;

        let old_data = snapshot(record)?;
        record.deprecate();
        let new_data = snapshot(record)?;
        state.append_audit(
            "features_master",
            AuditOperation::Update,
            Some(old_data),
            Some(new_data),
        );
        Ok(())
    }

    async fn register_model(&self, name: &str, algorithm: &str, version: &str) -> Result<i64> {
        let mut state = self.state();
        let model_id = LedgerState::next_id(&mut state.next_model_id);
        let record = ModelRecord::new(model_id, name, algorithm, version);
        let new_data = snapshot(&record)?;
        state.models.insert(model_id, record);
        state.append_audit("models", AuditOperation::Insert, None, Some(new_data));
        Ok(model_id)
    }

    async fn record_training_result(
        &self,
        model_id: i64,
        metrics: TrainingMetrics,
        status: TrainingStatus,
    ) -> Result<i64> {
        metrics.validate()?;

        let mut state = self.state();
        if !state.models.contains_key(&model_id) {
            return Err(Error::Referential(format!("unknown model_id {model_id}")));
        }

        let result_id = LedgerState::next_id(&mut state.next_result_id);
        let record = TrainingResultRecord::new(result_id, model_id, metrics, status);
        let new_data = snapshot(&record)?;
        state.training_results.push(record);
        state.append_audit("training_results", AuditOperation::Insert, None, Some(new_data));
        Ok(result_id)
    }

    async fn register_data_asset(
        &self,
        name: &str,
        category: AssetCategory,
        access_roles: &[String],
        description: &str,
    ) -> Result<()> {
        let mut state = self.state();
        if state.inventory.contains_key(name) {
            return Err(Error::Duplicate(format!("data asset {name:?} already registered")));
        }

        let record = InventoryRecord::new(name, category, access_roles.to_vec(), description);
        let new_data = snapshot(&record)?;
        state.inventory.insert(name.to_string(), record);
        state.append_audit("data_inventory", AuditOperation::Insert, None, Some(new_data));
        Ok(())
    }

    async fn log_data_access(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        let record = state
            .inventory
            .get_mut(name)
            .ok_or_else(|| Error::Referential(format!("unknown data asset {name:?}")))?;

        let old_data = snapshot(record)?;
        record.touch();
        let new_data = snapshot(record)?;
        state.append_audit(
            "data_inventory",
            AuditOperation::Update,
            Some(old_data),
            Some(new_data),
        );
        Ok(())
    }

    async fn record_audit(
        &self,
        table_name: &str,
        operation: AuditOperation,
        old_data: Option<serde_json::Value>,
        new_data: Option<serde_json::Value>,
    ) -> Result<i64> {
        validate_audit_input(table_name, old_data.as_ref(), new_data.as_ref())?;
        let mut state = self.state();
        Ok(state.append_audit(table_name, operation, old_data, new_data))
    }

    async fn latest_training_result(&self, model_id: i64) -> Result<Option<MetricsSnapshot>> {
        let state = self.state();
        Ok(state
            .training_results
            .iter()
            .filter(|result| result.model_id() == model_id)
            .max_by_key(|result| (result.recorded_at(), result.result_id()))
            .map(|result| MetricsSnapshot {
                accuracy: result.metrics().accuracy,
                f1_score: result.metrics().f1_score,
            }))
    }

    async fn bulk_insert(&self, table_name: &str, rows: &[serde_json::Value]) -> Result<u64> {
        validate_bulk_input(table_name, rows)?;

        let mut state = self.state();
        state
            .raw_tables
            .entry(table_name.to_string())
            .or_default()
            .extend_from_slice(rows);

        let batch = serde_json::json!({
            "table_name": table_name,
            "row_count": rows.len(),
        });
        state.append_audit(table_name, AuditOperation::Insert, None, Some(batch));
        Ok(rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_ledger() {
        let ledger = MemoryLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.feature_count(), 0);
        assert_eq!(ledger.model_count(), 0);
        assert_eq!(ledger.result_count(), 0);
    }

    #[tokio::test]
    async fn test_ids_are_monotonic_per_entity() {
        let ledger = MemoryLedger::new();
        let first = ledger.register_model("m", "RandomForest", "v1").await.unwrap();
        let second = ledger.register_model("m", "RandomForest", "v2").await.unwrap();
        assert!(second > first);

        let f1 = ledger
            .register_feature("url_length", FeatureType::Numerical, FeatureStatus::Active)
            .await
            .unwrap();
        assert_eq!(f1, 1);
    }

    #[tokio::test]
    async fn test_latest_breaks_timestamp_ties_by_id() {
        let ledger = MemoryLedger::new();
        let model_id = ledger.register_model("m", "RandomForest", "v1").await.unwrap();

        // Back-to-back inserts can land on the same timestamp; the higher
        // result_id must win.
        for accuracy in [0.80, 0.85, 0.90] {
            ledger
                .record_training_result(
                    model_id,
                    TrainingMetrics::new(accuracy, 0.8, 0.8, 0.8),
                    TrainingStatus::Completed,
                )
                .await
                .unwrap();
        }

        let latest = ledger.latest_training_result(model_id).await.unwrap().unwrap();
        assert!((latest.accuracy - 0.90).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_every_write_leaves_an_audit_entry() {
        let ledger = MemoryLedger::new();
        ledger
            .register_feature("sender_domain", FeatureType::Categorical, FeatureStatus::Active)
            .await
            .unwrap();
        let model_id = ledger.register_model("m", "GradientBoosting", "v1").await.unwrap();
        ledger
            .record_training_result(
                model_id,
                TrainingMetrics::new(0.9, 0.9, 0.9, 0.9),
                TrainingStatus::Completed,
            )
            .await
            .unwrap();

        assert_eq!(ledger.audit_count(), 3);
        let tables: Vec<String> = ledger
            .audit_entries()
            .iter()
            .map(|entry| entry.table_name().to_string())
            .collect();
        assert_eq!(tables, vec!["features_master", "models", "training_results"]);
    }
}
