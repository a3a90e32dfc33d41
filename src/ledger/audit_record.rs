//! Audit Log Record - append-only before/after snapshots of every mutation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of mutation an audit entry describes.
///
/// Stored uppercase to match the SQL verb (`INSERT`/`UPDATE`/`DELETE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum AuditOperation {
    /// A row was created; `new_data` holds the inserted row.
    Insert,
    /// A row was mutated; both snapshots are populated.
    Update,
    /// A row was removed; `old_data` holds the removed row.
    Delete,
}

/// A row of the `audit_log` table.
///
/// Append-only. At least one of `old_data`/`new_data` is populated: the
/// store enforces it with a CHECK constraint and the ledger rejects
/// violations before they reach the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct AuditRecord {
    audit_id: i64,
    table_name: String,
    operation_type: AuditOperation,
    old_data: Option<serde_json::Value>,
    new_data: Option<serde_json::Value>,
    logged_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Create a new audit record stamped with the current time.
    #[must_use]
    pub fn new(
        audit_id: i64,
        table_name: impl Into<String>,
        operation_type: AuditOperation,
        old_data: Option<serde_json::Value>,
        new_data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            audit_id,
            table_name: table_name.into(),
            operation_type,
            old_data,
            new_data,
            logged_at: Utc::now(),
        }
    }

    /// Get the surrogate id.
    #[must_use]
    pub const fn audit_id(&self) -> i64 {
        self.audit_id
    }

    /// Get the audited table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Get the mutation kind.
    #[must_use]
    pub const fn operation_type(&self) -> AuditOperation {
        self.operation_type
    }

    /// Get the before-snapshot, if any.
    #[must_use]
    pub const fn old_data(&self) -> Option<&serde_json::Value> {
        self.old_data.as_ref()
    }

    /// Get the after-snapshot, if any.
    #[must_use]
    pub const fn new_data(&self) -> Option<&serde_json::Value> {
        self.new_data.as_ref()
    }

    /// Get the timestamp the entry was logged.
    #[must_use]
    pub const fn logged_at(&self) -> DateTime<Utc> {
        self.logged_at
    }
}
