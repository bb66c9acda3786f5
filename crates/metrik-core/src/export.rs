//! Flat denormalized export rows for BI consumers.
//!
//! The export layer (CSV download, JSON export, the Power BI push sink) does
//! no computation of its own: it consumes [`ExportRow`]s built here. Column
//! names are the wire format external dashboards already bind to — do not
//! rename them.

use chrono::Datelike;
use serde::Serialize;

use crate::{
  classify::{achievement_rate, classify, variance, PerformanceTier},
  datapoint::DataPoint,
  kpi::TargetType,
};

// ─── Joined read model ───────────────────────────────────────────────────────

/// One data point joined with its KPI and department metadata, as read from
/// the store. Plain data; the derived columns live in [`ExportRow`].
#[derive(Debug, Clone)]
pub struct JoinedRow {
  pub point:                  DataPoint,
  pub kpi_name:               String,
  pub kpi_description:        String,
  pub kpi_unit:               String,
  pub target_type:            TargetType,
  pub department_id:          i64,
  pub department_name:        String,
  pub department_description: String,
}

// ─── Export row ──────────────────────────────────────────────────────────────

/// A fully denormalized, classified record ready for CSV/JSON export.
///
/// Status is recomputed from the KPI's current directionality; the secondary
/// classification columns (variance, achievement rate, tier) are present
/// only for records that carry a target.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
  #[serde(rename = "Data_ID")]
  pub data_id:                i64,
  #[serde(rename = "KPI_ID")]
  pub kpi_id:                 i64,
  #[serde(rename = "KPI_Name")]
  pub kpi_name:               String,
  #[serde(rename = "KPI_Description")]
  pub kpi_description:        String,
  #[serde(rename = "KPI_Unit")]
  pub kpi_unit:               String,
  #[serde(rename = "KPI_Target_Type")]
  pub kpi_target_type:        String,
  #[serde(rename = "Department_ID")]
  pub department_id:          i64,
  #[serde(rename = "Department_Name")]
  pub department_name:        String,
  #[serde(rename = "Department_Description")]
  pub department_description: String,
  #[serde(rename = "Actual_Value")]
  pub actual_value:           f64,
  #[serde(rename = "Target_Value")]
  pub target_value:           Option<f64>,
  #[serde(rename = "Variance")]
  pub variance:               Option<f64>,
  /// Percent of target achieved, rounded to two decimals; 0 when the target
  /// is non-positive.
  #[serde(rename = "Achievement_Rate")]
  pub achievement_rate:       Option<f64>,
  #[serde(rename = "Status")]
  pub status:                 String,
  #[serde(rename = "Performance_Category")]
  pub performance_category:   Option<String>,
  #[serde(rename = "Period")]
  pub period:                 String,
  #[serde(rename = "Date")]
  pub date:                   String,
  #[serde(rename = "DateTime")]
  pub datetime:               String,
  #[serde(rename = "Year")]
  pub year:                   i32,
  #[serde(rename = "Month")]
  pub month:                  u32,
  #[serde(rename = "Month_Name")]
  pub month_name:             String,
  #[serde(rename = "Quarter")]
  pub quarter:                String,
  #[serde(rename = "Week")]
  pub week:                   u32,
  #[serde(rename = "Day")]
  pub day:                    u32,
  #[serde(rename = "Weekday")]
  pub weekday:                String,
  #[serde(rename = "Notes")]
  pub notes:                  String,
  #[serde(rename = "Created_By")]
  pub created_by:             String,
}

fn round2(x: f64) -> f64 { (x * 100.0).round() / 100.0 }

impl ExportRow {
  pub fn from_joined(row: &JoinedRow) -> Self {
    let point = &row.point;
    let status = classify(point.value, point.target, row.target_type);

    let variance = point.target.map(|t| variance(point.value, t));
    let rate = point.target.map(|t| round2(achievement_rate(point.value, t)));
    let category =
      rate.map(|r| PerformanceTier::from_rate(r).label().to_owned());

    let ts = point.timestamp;

    Self {
      data_id: point.id,
      kpi_id: point.kpi_id,
      kpi_name: row.kpi_name.clone(),
      kpi_description: row.kpi_description.clone(),
      kpi_unit: row.kpi_unit.clone(),
      kpi_target_type: row.target_type.as_str().to_owned(),
      department_id: row.department_id,
      department_name: row.department_name.clone(),
      department_description: row.department_description.clone(),
      actual_value: point.value,
      target_value: point.target,
      variance,
      achievement_rate: rate,
      status: status.label().to_owned(),
      performance_category: category,
      period: point.period.clone(),
      date: ts.format("%Y-%m-%d").to_string(),
      datetime: ts.format("%Y-%m-%d %H:%M:%S").to_string(),
      year: ts.year(),
      month: ts.month(),
      month_name: ts.format("%B").to_string(),
      quarter: format!("Q{}", ts.month0() / 3 + 1),
      week: ts.iso_week().week(),
      day: ts.day(),
      weekday: ts.format("%A").to_string(),
      notes: point.notes.clone(),
      created_by: point.created_by.clone(),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;

  fn joined(value: f64, target: Option<f64>, tt: TargetType) -> JoinedRow {
    JoinedRow {
      point:                  DataPoint {
        id: 1,
        kpi_id: 2,
        value,
        target,
        timestamp: Utc.with_ymd_and_hms(2024, 5, 15, 9, 30, 0).unwrap(),
        period: "daily".into(),
        notes: "".into(),
        created_by: "api_user".into(),
      },
      kpi_name:               "Conversion Rate".into(),
      kpi_description:        "".into(),
      kpi_unit:               "%".into(),
      target_type:            tt,
      department_id:          3,
      department_name:        "Sales".into(),
      department_description: "".into(),
    }
  }

  #[test]
  fn secondary_columns_present_only_with_target() {
    let row =
      ExportRow::from_joined(&joined(80.0, None, TargetType::HigherBetter));
    assert_eq!(row.status, "No Target Set");
    assert_eq!(row.variance, None);
    assert_eq!(row.achievement_rate, None);
    assert_eq!(row.performance_category, None);
  }

  #[test]
  fn rate_variance_and_tier_computed() {
    let row = ExportRow::from_joined(&joined(
      76.0,
      Some(80.0),
      TargetType::HigherBetter,
    ));
    assert_eq!(row.status, "Below Target");
    assert_eq!(row.variance, Some(-4.0));
    assert_eq!(row.achievement_rate, Some(95.0));
    assert_eq!(row.performance_category, Some("Good".into()));
  }

  #[test]
  fn export_status_respects_directionality() {
    // A lower-is-better beat must export as Above Target.
    let row =
      ExportRow::from_joined(&joined(2.5, Some(3.0), TargetType::LowerBetter));
    assert_eq!(row.status, "Above Target");
  }

  #[test]
  fn zero_target_exports_zero_rate_not_a_crash() {
    let row = ExportRow::from_joined(&joined(
      50.0,
      Some(0.0),
      TargetType::HigherBetter,
    ));
    assert_eq!(row.achievement_rate, Some(0.0));
    assert_eq!(row.performance_category, Some("Poor".into()));
    assert_eq!(row.variance, Some(50.0));
  }

  #[test]
  fn calendar_breakdown_columns() {
    let row = ExportRow::from_joined(&joined(
      1.0,
      Some(1.0),
      TargetType::HigherBetter,
    ));
    assert_eq!(row.date, "2024-05-15");
    assert_eq!(row.datetime, "2024-05-15 09:30:00");
    assert_eq!(row.year, 2024);
    assert_eq!(row.month, 5);
    assert_eq!(row.month_name, "May");
    assert_eq!(row.quarter, "Q2");
    assert_eq!(row.week, 20);
    assert_eq!(row.day, 15);
    assert_eq!(row.weekday, "Wednesday");
  }
}
