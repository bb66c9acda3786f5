//! The classification engine.
//!
//! [`classify`] is a pure function of (value, target, target_type). The
//! result is computed at read time and never persisted, which keeps every
//! read and export path consistent with the KPI's current configuration.

use serde::{Deserialize, Serialize};

use crate::{datapoint::DataPoint, kpi::TargetType};

// ─── Performance status ──────────────────────────────────────────────────────

/// The derived classification of a data point relative to its target.
///
/// The `AboveTarget`/`BelowTarget` labels are directional good/bad, not
/// literal comparisons: a value that beats a lower-is-better target is
/// `AboveTarget` even though it is numerically below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceStatus {
  AboveTarget,
  BelowTarget,
  OnTarget,
  OffTarget,
  NoTargetSet,
}

impl PerformanceStatus {
  /// Human-readable label used by the export rows and the BI sink.
  pub fn label(self) -> &'static str {
    match self {
      Self::AboveTarget => "Above Target",
      Self::BelowTarget => "Below Target",
      Self::OnTarget => "On Target",
      Self::OffTarget => "Off Target",
      Self::NoTargetSet => "No Target Set",
    }
  }
}

impl std::fmt::Display for PerformanceStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.label())
  }
}

/// Classify a measurement against its target.
///
/// An absent target short-circuits to `NoTargetSet` regardless of
/// directionality. Target comparisons are inclusive: hitting the target
/// exactly counts as meeting it.
pub fn classify(
  value: f64,
  target: Option<f64>,
  target_type: TargetType,
) -> PerformanceStatus {
  let Some(target) = target else {
    return PerformanceStatus::NoTargetSet;
  };

  match target_type {
    TargetType::HigherBetter => {
      if value >= target {
        PerformanceStatus::AboveTarget
      } else {
        PerformanceStatus::BelowTarget
      }
    }
    TargetType::LowerBetter => {
      if value <= target {
        PerformanceStatus::AboveTarget
      } else {
        PerformanceStatus::BelowTarget
      }
    }
    TargetType::Exact => {
      if value == target {
        PerformanceStatus::OnTarget
      } else {
        PerformanceStatus::OffTarget
      }
    }
  }
}

// ─── Classified read model ───────────────────────────────────────────────────

/// A data point bundled with its freshly computed status.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedDataPoint {
  pub point:  DataPoint,
  pub status: PerformanceStatus,
}

impl ClassifiedDataPoint {
  pub fn new(point: DataPoint, target_type: TargetType) -> Self {
    let status = classify(point.value, point.target, target_type);
    Self { point, status }
  }
}

// ─── Secondary export classification ─────────────────────────────────────────

/// Categorical tier derived from the achievement rate. Lower bounds are
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTier {
  Excellent,
  Good,
  Fair,
  Poor,
}

impl PerformanceTier {
  pub fn from_rate(rate: f64) -> Self {
    if rate >= 100.0 {
      Self::Excellent
    } else if rate >= 90.0 {
      Self::Good
    } else if rate >= 75.0 {
      Self::Fair
    } else {
      Self::Poor
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Excellent => "Excellent",
      Self::Good => "Good",
      Self::Fair => "Fair",
      Self::Poor => "Poor",
    }
  }
}

/// Percentage of target achieved. A non-positive target would divide by
/// zero (or flip the sign), so it yields 0 instead.
pub fn achievement_rate(value: f64, target: f64) -> f64 {
  if target > 0.0 { value / target * 100.0 } else { 0.0 }
}

/// Signed distance from target.
pub fn variance(value: f64, target: f64) -> f64 { value - target }

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn higher_better_above_iff_value_meets_target() {
    let t = TargetType::HigherBetter;
    assert_eq!(
      classify(85.0, Some(80.0), t),
      PerformanceStatus::AboveTarget
    );
    assert_eq!(
      classify(80.0, Some(80.0), t),
      PerformanceStatus::AboveTarget
    );
    assert_eq!(
      classify(79.9, Some(80.0), t),
      PerformanceStatus::BelowTarget
    );
  }

  #[test]
  fn lower_better_above_iff_value_at_or_under_target() {
    let t = TargetType::LowerBetter;
    assert_eq!(classify(2.5, Some(3.0), t), PerformanceStatus::AboveTarget);
    assert_eq!(classify(3.0, Some(3.0), t), PerformanceStatus::AboveTarget);
    assert_eq!(classify(3.5, Some(3.0), t), PerformanceStatus::BelowTarget);
  }

  #[test]
  fn exact_on_target_iff_equal() {
    let t = TargetType::Exact;
    assert_eq!(classify(5.0, Some(5.0), t), PerformanceStatus::OnTarget);
    assert_eq!(classify(5.1, Some(5.0), t), PerformanceStatus::OffTarget);
  }

  #[test]
  fn absent_target_is_no_target_set_for_any_value() {
    for v in [-1.0, 0.0, 1.0, f64::MAX] {
      for t in [
        TargetType::HigherBetter,
        TargetType::LowerBetter,
        TargetType::Exact,
      ] {
        assert_eq!(classify(v, None, t), PerformanceStatus::NoTargetSet);
      }
    }
  }

  #[test]
  fn zero_target_is_a_real_target() {
    // Zero is a valid target; only an absent target means NoTargetSet.
    assert_eq!(
      classify(1.0, Some(0.0), TargetType::HigherBetter),
      PerformanceStatus::AboveTarget
    );
    assert_eq!(
      classify(-1.0, Some(0.0), TargetType::HigherBetter),
      PerformanceStatus::BelowTarget
    );
  }

  #[test]
  fn achievement_rate_guards_non_positive_target() {
    assert_eq!(achievement_rate(50.0, 0.0), 0.0);
    assert_eq!(achievement_rate(50.0, -10.0), 0.0);
    assert_eq!(achievement_rate(50.0, 100.0), 50.0);
  }

  #[test]
  fn tier_boundaries_are_inclusive_on_lower_bound() {
    assert_eq!(PerformanceTier::from_rate(100.0), PerformanceTier::Excellent);
    assert_eq!(PerformanceTier::from_rate(99.9), PerformanceTier::Good);
    assert_eq!(PerformanceTier::from_rate(90.0), PerformanceTier::Good);
    assert_eq!(PerformanceTier::from_rate(89.9), PerformanceTier::Fair);
    assert_eq!(PerformanceTier::from_rate(75.0), PerformanceTier::Fair);
    assert_eq!(PerformanceTier::from_rate(74.9), PerformanceTier::Poor);
  }
}
