//! Data Inventory Record - governance view of collected data assets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

/// Governance category of a data asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AssetCategory {
    /// Unprocessed captures straight from a collector.
    Raw,
    /// Cleaned and normalized batches.
    Processed,
    /// Engineered feature matrices.
    Features,
    /// Model outputs kept for review.
    Predictions,
}

/// A row of the `data_inventory` table.
///
/// The asset name is the key: registration inserts, access logging mutates
/// `last_accessed` in place. Access roles are a set of role names, persisted
/// as a comma-delimited string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryRecord {
    data_name: String,
    category: AssetCategory,
    access_roles: Vec<String>,
    description: String,
    last_accessed: DateTime<Utc>,
}

impl InventoryRecord {
    /// Create a new inventory record stamped with the current time.
    #[must_use]
    pub fn new(
        data_name: impl Into<String>,
        category: AssetCategory,
        access_roles: Vec<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            data_name: data_name.into(),
            category,
            access_roles,
            description: description.into(),
            last_accessed: Utc::now(),
        }
    }

    /// Get the asset name (the inventory key).
    #[must_use]
    pub fn data_name(&self) -> &str {
        &self.data_name
    }

    /// Get the governance category.
    #[must_use]
    pub const fn category(&self) -> AssetCategory {
        self.category
    }

    /// Get the roles allowed to access this asset.
    #[must_use]
    pub fn access_roles(&self) -> &[String] {
        &self.access_roles
    }

    /// Get the free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the timestamp of the most recent registration or access.
    #[must_use]
    pub const fn last_accessed(&self) -> DateTime<Utc> {
        self.last_accessed
    }

    /// Refresh `last_accessed` to now.
    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }

    /// Render the role set in its stored comma-delimited form.
    #[must_use]
    pub fn roles_delimited(&self) -> String {
        self.access_roles.join(",")
    }
}

// Hand-written row mapping: the role set round-trips through its delimited
// storage form.
impl<'r> sqlx::FromRow<'r, PgRow> for InventoryRecord {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        let roles: String = row.try_get("access_roles")?;
        Ok(Self {
            data_name: row.try_get("data_name")?,
            category: row.try_get("category")?,
            access_roles: split_roles(&roles),
            description: row.try_get("description")?,
            last_accessed: row.try_get("last_accessed")?,
        })
    }
}

pub(crate) fn split_roles(delimited: &str) -> Vec<String> {
    delimited
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(ToString::to_string)
        .collect()
}
