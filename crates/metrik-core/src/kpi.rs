//! KPI definitions and target directionality.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Target directionality ───────────────────────────────────────────────────

/// Whether higher, lower, or exact-equal values are considered good for a
/// KPI. Fixed per KPI: all of a KPI's data points are classified with the
/// KPI's directionality, never their own.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
  #[default]
  HigherBetter,
  LowerBetter,
  Exact,
}

impl TargetType {
  /// The string stored in the `target_type` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::HigherBetter => "higher_better",
      Self::LowerBetter => "lower_better",
      Self::Exact => "exact",
    }
  }

  /// Decode from a stored string. Any unrecognised directionality is
  /// treated as exact-match rather than rejected, so rows written by older
  /// versions still classify.
  pub fn from_str_lossy(s: &str) -> Self {
    match s {
      "higher_better" => Self::HigherBetter,
      "lower_better" => Self::LowerBetter,
      _ => Self::Exact,
    }
  }
}

// ─── Kpi ─────────────────────────────────────────────────────────────────────

/// A persisted KPI definition, owned by exactly one department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kpi {
  pub id:            i64,
  pub name:          String,
  pub description:   String,
  /// Measurement unit label, e.g. `"$"`, `"%"`, `"days"`.
  pub unit:          String,
  pub target_type:   TargetType,
  pub department_id: i64,
  pub is_active:     bool,
  pub created_at:    DateTime<Utc>,
}

// ─── NewKpi ──────────────────────────────────────────────────────────────────

/// Input to [`KpiStore::insert_kpi`](crate::store::KpiStore::insert_kpi).
/// `department_id` must reference an existing department.
#[derive(Debug, Clone, Deserialize)]
pub struct NewKpi {
  pub name:          String,
  #[serde(default)]
  pub description:   String,
  #[serde(default)]
  pub unit:          String,
  #[serde(default)]
  pub target_type:   TargetType,
  pub department_id: i64,
  #[serde(default = "default_true")]
  pub is_active:     bool,
}

fn default_true() -> bool { true }
