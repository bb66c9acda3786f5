//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings (which sort correctly as
//! text). Target directionality is stored as its snake_case discriminant.

use chrono::{DateTime, Utc};
use metrik_core::{
  datapoint::DataPoint,
  department::Department,
  export::JoinedRow,
  kpi::{Kpi, TargetType},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `departments` row.
pub struct RawDepartment {
  pub id:          i64,
  pub name:        String,
  pub description: String,
  pub created_at:  String,
}

impl RawDepartment {
  pub fn into_department(self) -> Result<Department> {
    Ok(Department {
      id:          self.id,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `kpis` row.
pub struct RawKpi {
  pub id:            i64,
  pub name:          String,
  pub description:   String,
  pub unit:          String,
  pub target_type:   String,
  pub department_id: i64,
  pub is_active:     bool,
  pub created_at:    String,
}

impl RawKpi {
  pub fn into_kpi(self) -> Result<Kpi> {
    Ok(Kpi {
      id:            self.id,
      name:          self.name,
      description:   self.description,
      unit:          self.unit,
      target_type:   TargetType::from_str_lossy(&self.target_type),
      department_id: self.department_id,
      is_active:     self.is_active,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `kpi_data` row.
pub struct RawPoint {
  pub id:         i64,
  pub kpi_id:     i64,
  pub value:      f64,
  pub target:     Option<f64>,
  pub timestamp:  String,
  pub period:     String,
  pub notes:      String,
  pub created_by: String,
}

impl RawPoint {
  pub fn into_point(self) -> Result<DataPoint> {
    Ok(DataPoint {
      id:         self.id,
      kpi_id:     self.kpi_id,
      value:      self.value,
      target:     self.target,
      timestamp:  decode_dt(&self.timestamp)?,
      period:     self.period,
      notes:      self.notes,
      created_by: self.created_by,
    })
  }
}

/// Raw values from a `kpi_data` row joined with its KPI and department.
pub struct RawJoined {
  pub point:                  RawPoint,
  pub kpi_name:               String,
  pub kpi_description:        String,
  pub kpi_unit:               String,
  pub target_type:            String,
  pub department_id:          i64,
  pub department_name:        String,
  pub department_description: String,
}

impl RawJoined {
  pub fn into_joined(self) -> Result<JoinedRow> {
    Ok(JoinedRow {
      point:                  self.point.into_point()?,
      kpi_name:               self.kpi_name,
      kpi_description:        self.kpi_description,
      kpi_unit:               self.kpi_unit,
      target_type:            TargetType::from_str_lossy(&self.target_type),
      department_id:          self.department_id,
      department_name:        self.department_name,
      department_description: self.department_description,
    })
  }
}
