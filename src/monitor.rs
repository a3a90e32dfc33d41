//! Performance monitoring policy over the ledger.
//!
//! Reads the latest training result for a model and decides whether it has
//! degraded below an accuracy threshold. Alert transport (email, Slack,
//! dashboards) is a collaborator concern; this module only produces the
//! decision and logs a warning.

use tracing::warn;

use crate::error::{Error, Result};
use crate::ledger::Ledger;

/// Outcome of a monitoring check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Latest accuracy meets the threshold.
    Healthy {
        /// Accuracy of the latest result.
        accuracy: f64,
    },
    /// Latest accuracy fell below the threshold; collaborators should alert.
    Degraded {
        /// Accuracy of the latest result.
        accuracy: f64,
        /// Threshold it fell below.
        threshold: f64,
    },
    /// The model has no recorded training results yet.
    NoData,
}

/// Threshold policy applied to the latest recorded accuracy.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceMonitor {
    threshold: f64,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self { threshold: 0.9 }
    }
}

impl PerformanceMonitor {
    /// Create a monitor with an explicit accuracy threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the threshold is not a fraction in
    /// [0, 1].
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) || threshold.is_nan() {
            return Err(Error::Validation(format!(
                "threshold must be a fraction in [0, 1], got {threshold}"
            )));
        }
        Ok(Self { threshold })
    }

    /// Get the configured threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Check the latest training result for `model_id` against the threshold.
    ///
    /// # Errors
    ///
    /// Propagates any ledger error; a model with no results is `NoData`,
    /// not an error.
    pub async fn check<L: Ledger>(&self, ledger: &L, model_id: i64) -> Result<Verdict> {
        let Some(latest) = ledger.latest_training_result(model_id).await? else {
            return Ok(Verdict::NoData);
        };

        if latest.accuracy < self.threshold {
            warn!(
                model_id,
                accuracy = latest.accuracy,
                threshold = self.threshold,
                "model accuracy below threshold"
            );
            return Ok(Verdict::Degraded {
                accuracy: latest.accuracy,
                threshold: self.threshold,
            });
        }

        Ok(Verdict::Healthy {
            accuracy: latest.accuracy,
        })
    }
}
