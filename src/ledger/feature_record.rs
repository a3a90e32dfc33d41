//! Feature Record - registered input features for model training

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value domain of a registered feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum FeatureType {
    /// Continuous or discrete numeric values.
    Numerical,
    /// Values from a fixed label set.
    Categorical,
    /// Binary flags.
    Boolean,
    /// Free-form text (tokenized downstream).
    Text,
}

/// Lifecycle status of a feature.
///
/// Features are never physically deleted; deprecation flips the status and
/// leaves the row (and its audit trail) in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum FeatureStatus {
    /// Available for training runs.
    Active,
    /// Retired; kept for provenance only.
    Deprecated,
}

/// A row of the `features_master` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct FeatureRecord {
    feature_id: i64,
    feature_name: String,
    feature_type: FeatureType,
    status: FeatureStatus,
    last_updated: DateTime<Utc>,
}

impl FeatureRecord {
    /// Create a new feature record stamped with the current time.
    ///
    /// The surrogate id is assigned by the store that materializes the row.
    #[must_use]
    pub fn new(
        feature_id: i64,
        feature_name: impl Into<String>,
        feature_type: FeatureType,
        status: FeatureStatus,
    ) -> Self {
        Self {
            feature_id,
            feature_name: feature_name.into(),
            feature_type,
            status,
            last_updated: Utc::now(),
        }
    }

    /// Get the surrogate id.
    #[must_use]
    pub const fn feature_id(&self) -> i64 {
        self.feature_id
    }

    /// Get the feature name.
    #[must_use]
    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    /// Get the feature type.
    #[must_use]
    pub const fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    /// Get the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> FeatureStatus {
        self.status
    }

    /// Get the timestamp of the last mutation.
    #[must_use]
    pub const fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Flip the status to deprecated and refresh `last_updated`.
    pub fn deprecate(&mut self) {
        self.status = FeatureStatus::Deprecated;
        self.last_updated = Utc::now();
    }
}
