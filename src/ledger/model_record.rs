//! Model Record - one trained artifact version

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `models` table.
///
/// One record per trained artifact version; immutable after creation.
/// Distinct versions of the same model name are distinct rows; no
/// uniqueness is enforced across them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct ModelRecord {
    model_id: i64,
    model_name: String,
    algorithm: String,
    version: String,
    creation_date: DateTime<Utc>,
}

impl ModelRecord {
    /// Create a new model record stamped with the current time.
    ///
    /// # Arguments
    ///
    /// * `model_id` - Surrogate id assigned by the store
    /// * `model_name` - Human-readable model name
    /// * `algorithm` - Training algorithm (e.g. "RandomForest")
    /// * `version` - Artifact version string (e.g. "v1.0")
    #[must_use]
    pub fn new(
        model_id: i64,
        model_name: impl Into<String>,
        algorithm: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            model_id,
            model_name: model_name.into(),
            algorithm: algorithm.into(),
            version: version.into(),
            creation_date: Utc::now(),
        }
    }

    /// Get the surrogate id.
    #[must_use]
    pub const fn model_id(&self) -> i64 {
        self.model_id
    }

    /// Get the model name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Get the training algorithm.
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Get the artifact version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_record_new() {
        let record = ModelRecord::new(1, "PhishModelV1", "RandomForest", "v1.0");
        assert_eq!(record.model_id(), 1);
        assert_eq!(record.model_name(), "PhishModelV1");
        assert_eq!(record.algorithm(), "RandomForest");
        assert_eq!(record.version(), "v1.0");
        assert!(record.creation_date().timestamp() > 0);
    }

    #[test]
    fn test_model_record_serialization() {
        let record = ModelRecord::new(2, "PhishModelV1", "GradientBoosting", "v2.1");
        let json = serde_json::to_string(&record).expect("serialization failed");
        let deserialized: ModelRecord = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(record, deserialized);
    }
}
