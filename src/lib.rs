//! # Bitacora: Experiment Ledger for ML Pipelines
//!
//! Bitacora is the durable system-of-record for ML experiment provenance:
//! registered features, trained model versions, training outcomes,
//! governed data assets, and an append-only audit trail, persisted in
//! PostgreSQL. It was extracted from a phishing-detection pipeline whose
//! stages (collection, preprocessing, training, monitoring) each kept their
//! own ad-hoc records; the ledger replaces those with one typed boundary.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: integrity failures stop the line: referential and
//!   validation errors surface immediately, never silently absorbed
//! - **Genchi Genbutsu**: no cache in front of the store; reads return
//!   currently-committed data
//! - **Poka-Yoke**: every write and its audit entry share one transaction,
//!   so a row can never exist without its trail
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bitacora::ledger::{Ledger, MemoryLedger, TrainingMetrics, TrainingStatus};
//! use bitacora::monitor::PerformanceMonitor;
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
//! let verdict = PerformanceMonitor::default().check(&ledger, model_id).await?;
//! println!("{verdict:?}");
//! # Ok(())
//! # }
//! ```
//!
//! For durability, swap [`ledger::MemoryLedger`] for
//! [`ledger::PgLedger`] built from a [`config::StoreConfig`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod monitor;

pub use error::{Error, Result};
