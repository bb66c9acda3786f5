//! Data points — one timestamped measurement against a KPI.
//!
//! A data point optionally carries its own target value. Its performance
//! status is never stored; every read and export path recomputes it from
//! (value, target, owning KPI's target_type), so changing a KPI's
//! directionality reclassifies all historical points immediately.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted measurement row, owned by exactly one KPI and cascade-deleted
/// with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
  pub id:         i64,
  pub kpi_id:     i64,
  pub value:      f64,
  /// Absent means no classification is possible ⇒ `NoTargetSet`.
  pub target:     Option<f64>,
  pub timestamp:  DateTime<Utc>,
  /// Free-form period label; `"daily"` unless the caller says otherwise.
  pub period:     String,
  pub notes:      String,
  pub created_by: String,
}

/// A fully validated and normalized measurement, ready for insertion.
/// Produced only by [`ingest::normalize`](crate::ingest::normalize).
#[derive(Debug, Clone)]
pub struct NewDataPoint {
  pub kpi_id:     i64,
  pub value:      f64,
  pub target:     Option<f64>,
  pub timestamp:  DateTime<Utc>,
  pub period:     String,
  pub notes:      String,
  pub created_by: String,
}
