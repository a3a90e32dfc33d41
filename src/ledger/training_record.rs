//! Training Result Record - immutable outcome of one training run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Outcome status of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TrainingStatus {
    /// Run finished and produced the reported metrics.
    Completed,
    /// Run aborted; metrics reflect whatever was measured before failure.
    Failed,
}

/// Evaluation metrics for one training run.
///
/// All four scores are canonical 0–1 fractions. Percentage-style inputs
/// (e.g. 94.0) are rejected at the ledger boundary rather than silently
/// rescaled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrainingMetrics {
    /// Overall accuracy in [0, 1].
    pub accuracy: f64,
    /// F1 score in [0, 1].
    pub f1_score: f64,
    /// Precision in [0, 1].
    pub precision: f64,
    /// Recall in [0, 1].
    pub recall: f64,
}

impl TrainingMetrics {
    /// Create a metric set.
    #[must_use]
    pub const fn new(accuracy: f64, f1_score: f64, precision: f64, recall: f64) -> Self {
        Self {
            accuracy,
            f1_score,
            precision,
            recall,
        }
    }

    /// Check every score lies in [0, 1].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending score.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("accuracy", self.accuracy),
            ("f1_score", self.f1_score),
            ("precision", self.precision),
            ("recall", self.recall),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(Error::Validation(format!(
                    "{name} must be a fraction in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// A row of the `training_results` table.
///
/// Immutable once written; the "latest" result for a model is the row with
/// the maximum `recorded_at` (ties broken by the monotonic surrogate id).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct TrainingResultRecord {
    result_id: i64,
    model_id: i64,
    accuracy: f64,
    f1_score: f64,
    precision: f64,
    recall: f64,
    status: TrainingStatus,
    recorded_at: DateTime<Utc>,
}

impl TrainingResultRecord {
    /// Create a new result record stamped with the current time.
    #[must_use]
    pub fn new(result_id: i64, model_id: i64, metrics: TrainingMetrics, status: TrainingStatus) -> Self {
        Self {
            result_id,
            model_id,
            accuracy: metrics.accuracy,
            f1_score: metrics.f1_score,
            precision: metrics.precision,
            recall: metrics.recall,
            status,
            recorded_at: Utc::now(),
        }
    }

    /// Get the surrogate id.
    #[must_use]
    pub const fn result_id(&self) -> i64 {
        self.result_id
    }

    /// Get the parent model id.
    #[must_use]
    pub const fn model_id(&self) -> i64 {
        self.model_id
    }

    /// Get the metric set.
    #[must_use]
    pub const fn metrics(&self) -> TrainingMetrics {
        TrainingMetrics {
            accuracy: self.accuracy,
            f1_score: self.f1_score,
            precision: self.precision,
            recall: self.recall,
        }
    }

    /// Get the outcome status.
    #[must_use]
    pub const fn status(&self) -> TrainingStatus {
        self.status
    }

    /// Get the timestamp the store accepted this result.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Read projection returned by latest-result queries: the pair the
/// monitoring collaborators act on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricsSnapshot {
    /// Accuracy of the latest result.
    pub accuracy: f64,
    /// F1 score of the latest result.
    pub f1_score: f64,
}
