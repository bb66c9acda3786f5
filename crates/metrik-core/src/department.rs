//! Department — the owning envelope for KPIs.
//!
//! Department names are unique; creating a duplicate is a conflict, never an
//! overwrite. Deleting a department cascades to its KPIs and their data
//! points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted department row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
  pub id:          i64,
  pub name:        String,
  pub description: String,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:  DateTime<Utc>,
}

/// Input to [`KpiStore::insert_department`](crate::store::KpiStore::insert_department).
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
  pub name:        String,
  #[serde(default)]
  pub description: String,
}
