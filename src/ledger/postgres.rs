//! PostgreSQL ledger implementation.
//!
//! Connections come from a bounded pool and are scoped to one operation:
//! acquired at entry, released on every exit path. Each write and its audit
//! entry share a transaction, so readers never observe a row without its
//! trail. Every operation runs under the configured deadline; on expiry the
//! in-flight transaction is dropped (and rolled back by the pool) and the
//! caller gets [`Error::Timeout`].

use std::future::Future;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder, Row, Transaction};
use tracing::debug;

use super::{
    snapshot, validate_audit_input, validate_bulk_input, AssetCategory, AuditOperation,
    FeatureRecord, FeatureStatus, FeatureType, InventoryRecord, Ledger, MetricsSnapshot,
    ModelRecord, TrainingMetrics, TrainingResultRecord, TrainingStatus,
};
use crate::config::{LedgerPolicy, StoreConfig};
use crate::error::{Error, Result};

const FEATURE_COLUMNS: &str = "feature_id, feature_name, feature_type, status, last_updated";
const INVENTORY_COLUMNS: &str = "data_name, category, access_roles, description, last_accessed";

/// PostgreSQL-backed ledger.
///
/// # Example
///
/// ```rust,no_run
/// use bitacora::config::StoreConfig;
/// use bitacora::ledger::{Ledger, PgLedger};
///
/// # async fn example() -> bitacora::Result<()> {
/// let config = StoreConfig::from_env()?;
/// let ledger = PgLedger::connect(&config).await?;
/// ledger.migrate().await?;
///
/// let model_id = ledger.register_model("PhishModelV1", "RandomForest", "v1.0").await?;
/// # Ok(())
/// # }
/// ```
pub struct PgLedger {
    pool: PgPool,
    policy: LedgerPolicy,
    op_timeout: Duration,
}

impl PgLedger {
    /// Connect with the default (duplicate-tolerant) uniqueness policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the store cannot be reached.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        Self::connect_with_policy(config, LedgerPolicy::default()).await
    }

    /// Connect with an explicit uniqueness policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the store cannot be reached.
    pub async fn connect_with_policy(config: &StoreConfig, policy: LedgerPolicy) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.op_timeout)
            .connect(&config.connection_url())
            .await?;

        debug!(
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            "connected to ledger store"
        );

        Ok(Self {
            pool,
            policy,
            op_timeout: config.op_timeout,
        })
    }

    /// Run pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if migrations cannot be applied.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|err| Error::StoreUnavailable(format!("migration failed: {err}")))
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn with_deadline<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(op, timeout = ?self.op_timeout, "ledger operation timed out");
                Err(Error::Timeout(self.op_timeout))
            }
        }
    }

    async fn audit_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        table_name: &str,
        operation: AuditOperation,
        old_data: Option<serde_json::Value>,
        new_data: Option<serde_json::Value>,
    ) -> Result<i64> {
        let row = sqlx::query(
            "INSERT INTO audit_log (table_name, operation_type, old_data, new_data) \
             VALUES ($1, $2, $3, $4) RETURNING audit_id",
        )
        .bind(table_name)
        .bind(operation)
        .bind(old_data)
        .bind(new_data)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.try_get("audit_id")?)
    }
}

impl Ledger for PgLedger {
    async fn register_feature(
        &self,
        name: &str,
        feature_type: FeatureType,
        status: FeatureStatus,
    ) -> Result<i64> {
        self.with_deadline("register_feature", async {
            let mut tx = self.pool.begin().await?;

            if self.policy.unique_feature_names {
                let exists: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM features_master WHERE feature_name = $1)",
                )
                .bind(name)
                .fetch_one(&mut *tx)
                .await?;
                if exists {
                    return Err(Error::Duplicate(format!("feature {name:?} already registered")));
                }
            }

            let record: FeatureRecord = sqlx::query_as(&format!(
                "INSERT INTO features_master (feature_name, feature_type, status) \
                 VALUES ($1, $2, $3) RETURNING {FEATURE_COLUMNS}"
            ))
            .bind(name)
            .bind(feature_type)
            .bind(status)
            .fetch_one(&mut *tx)
            .await?;

            let new_data = snapshot(&record)?;
            Self::audit_in_tx(
                &mut tx,
                "features_master",
                AuditOperation::Insert,
                None,
                Some(new_data),
            )
            .await?;
            tx.commit().await?;

            debug!(feature_id = record.feature_id(), name, "registered feature");
            Ok(record.feature_id())
        })
        .await
    }

    async fn deprecate_feature(&self, feature_id: i64) -> Result<()> {
        self.with_deadline("deprecate_feature", async {
            let mut tx = self.pool.begin().await?;

            let old: FeatureRecord = sqlx::query_as(&format!(
                "SELECT {FEATURE_COLUMNS} FROM features_master WHERE feature_id = $1 FOR UPDATE"
            ))
            .bind(feature_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::Referential(format!("unknown feature_id {feature_id}")))?;

            let updated: FeatureRecord = sqlx::query_as(&format!(
                "UPDATE features_master SET status = 'deprecated', last_updated = NOW() \
                 WHERE feature_id = $1 RETURNING {FEATURE_COLUMNS}"
            ))
            .bind(feature_id)
            .fetch_one(&mut *tx)
            .await?;

            let old_data = snapshot(&old)?;
            let new_data = snapshot(&updated)?;
            Self::audit_in_tx(
                &mut tx,
                "features_master",
                AuditOperation::Update,
                Some(old_data),
                Some(new_data),
            )
            .await?;
            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn register_model(&self, name: &str, algorithm: &str, version: &str) -> Result<i64> {
        self.with_deadline("register_model", async {
            let mut tx = self.pool.begin().await?;

            let record: ModelRecord = sqlx::query_as(
                "INSERT INTO models (model_name, algorithm, version) VALUES ($1, $2, $3) \
                 RETURNING model_id, model_name, algorithm, version, creation_date",
            )
            .bind(name)
            .bind(algorithm)
            .bind(version)
            .fetch_one(&mut *tx)
            .await?;

            let new_data = snapshot(&record)?;
            Self::audit_in_tx(&mut tx, "models", AuditOperation::Insert, None, Some(new_data))
                .await?;
            tx.commit().await?;

            debug!(model_id = record.model_id(), name, version, "registered model");
            Ok(record.model_id())
        })
        .await
    }

    async fn record_training_result(
        &self,
        model_id: i64,
        metrics: TrainingMetrics,
        status: TrainingStatus,
    ) -> Result<i64> {
        metrics.validate()?;

        self.with_deadline("record_training_result", async move {
            let mut tx = self.pool.begin().await?;

            // The FK constraint turns an unknown model_id into a
            // Referential error before anything is committed.
            let record: TrainingResultRecord = sqlx::query_as(
                "INSERT INTO training_results \
                 (model_id, accuracy, f1_score, precision, recall, status) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING result_id, model_id, accuracy, f1_score, precision, recall, \
                           status, recorded_at",
            )
            .bind(model_id)
            .bind(metrics.accuracy)
            .bind(metrics.f1_score)
            .bind(metrics.precision)
            .bind(metrics.recall)
            .bind(status)
            .fetch_one(&mut *tx)
            .await?;

            let new_data = snapshot(&record)?;
            Self::audit_in_tx(
                &mut tx,
                "training_results",
                AuditOperation::Insert,
                None,
                Some(new_data),
            )
            .await?;
            tx.commit().await?;
            Ok(record.result_id())
        })
        .await
    }

    async fn register_data_asset(
        &self,
        name: &str,
        category: AssetCategory,
        access_roles: &[String],
        description: &str,
    ) -> Result<()> {
        self.with_deadline("register_data_asset", async {
            let mut tx = self.pool.begin().await?;

            // data_name is the primary key; a duplicate surfaces as a
            // unique violation and maps to Error::Duplicate.
            let record: InventoryRecord = sqlx::query_as(&format!(
                "INSERT INTO data_inventory (data_name, category, access_roles, description) \
                 VALUES ($1, $2, $3, $4) RETURNING {INVENTORY_COLUMNS}"
            ))
            .bind(name)
            .bind(category)
            .bind(access_roles.join(","))
            .bind(description)
            .fetch_one(&mut *tx)
            .await?;

            let new_data = snapshot(&record)?;
            Self::audit_in_tx(
                &mut tx,
                "data_inventory",
                AuditOperation::Insert,
                None,
                Some(new_data),
            )
            .await?;
            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn log_data_access(&self, name: &str) -> Result<()> {
        self.with_deadline("log_data_access", async {
            let mut tx = self.pool.begin().await?;

            let old: InventoryRecord = sqlx::query_as(&format!(
                "SELECT {INVENTORY_COLUMNS} FROM data_inventory WHERE data_name = $1 FOR UPDATE"
            ))
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::Referential(format!("unknown data asset {name:?}")))?;

            let updated: InventoryRecord = sqlx::query_as(&format!(
                "UPDATE data_inventory SET last_accessed = NOW() \
                 WHERE data_name = $1 RETURNING {INVENTORY_COLUMNS}"
            ))
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            let old_data = snapshot(&old)?;
            let new_data = snapshot(&updated)?;
            Self::audit_in_tx(
                &mut tx,
                "data_inventory",
                AuditOperation::Update,
                Some(old_data),
                Some(new_data),
            )
            .await?;
            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn record_audit(
        &self,
        table_name: &str,
        operation: AuditOperation,
        old_data: Option<serde_json::Value>,
        new_data: Option<serde_json::Value>,
    ) -> Result<i64> {
        validate_audit_input(table_name, old_data.as_ref(), new_data.as_ref())?;

        self.with_deadline("record_audit", async move {
            let mut tx = self.pool.begin().await?;
            let audit_id =
                Self::audit_in_tx(&mut tx, table_name, operation, old_data, new_data).await?;
            tx.commit().await?;
            Ok(audit_id)
        })
        .await
    }

    async fn latest_training_result(&self, model_id: i64) -> Result<Option<MetricsSnapshot>> {
        self.with_deadline("latest_training_result", async move {
            let row = sqlx::query(
                "SELECT accuracy, f1_score FROM training_results WHERE model_id = $1 \
                 ORDER BY recorded_at DESC, result_id DESC LIMIT 1",
            )
            .bind(model_id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(|row| {
                Ok(MetricsSnapshot {
                    accuracy: row.try_get("accuracy")?,
                    f1_score: row.try_get("f1_score")?,
                })
            })
            .transpose()
        })
        .await
    }

    async fn bulk_insert(&self, table_name: &str, rows: &[serde_json::Value]) -> Result<u64> {
        validate_bulk_input(table_name, rows)?;

        self.with_deadline("bulk_insert", async {
            let mut tx = self.pool.begin().await?;

            for row in rows {
                let Some(object) = row.as_object() else {
                    return Err(Error::Validation("bulk_insert: record is not an object".to_string()));
                };

                let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ");
                builder.push(table_name);
                builder.push(" (");
                {
                    let mut columns = builder.separated(", ");
                    for column in object.keys() {
                        columns.push(column.as_str());
                    }
                }
                builder.push(") VALUES (");
                {
                    let mut values = builder.separated(", ");
                    for value in object.values() {
                        match value {
                            serde_json::Value::Null => {
                                values.push("NULL");
                            }
                            serde_json::Value::Bool(flag) => {
                                values.push_bind(*flag);
                            }
                            serde_json::Value::Number(number) => {
                                if let Some(int) = number.as_i64() {
                                    values.push_bind(int);
                                } else {
                                    values.push_bind(number.as_f64().unwrap_or(f64::NAN));
                                }
                            }
                            serde_json::Value::String(text) => {
                                values.push_bind(text.clone());
                            }
                            nested => {
                                values.push_bind(nested.clone());
                            }
                        }
                    }
                }
                builder.push(")");
                builder.build().execute(&mut *tx).await?;
            }

            let batch = serde_json::json!({
                "table_name": table_name,
                "row_count": rows.len(),
            });
            Self::audit_in_tx(&mut tx, table_name, AuditOperation::Insert, None, Some(batch))
                .await?;
            tx.commit().await?;

            debug!(table_name, rows = rows.len(), "bulk insert committed");
            Ok(rows.len() as u64)
        })
        .await
    }
}
