//! The `KpiStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `metrik-store-sqlite`).
//! Higher layers (`metrik-api`, the ingest coordinators) depend on this
//! abstraction, not on any concrete backend.
//!
//! Concurrency: the core takes no locks. Pre-checks (department name
//! uniqueness, KPI existence) exist to produce friendly errors; the
//! backend's own UNIQUE / FOREIGN KEY enforcement is the final arbiter when
//! requests race.

use std::future::Future;

use serde::Serialize;

use crate::{
  datapoint::{DataPoint, NewDataPoint},
  department::{Department, NewDepartment},
  export::JoinedRow,
  kpi::{Kpi, NewKpi},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`KpiStore::list_data_points`].
#[derive(Debug, Clone)]
pub struct DataPointQuery {
  pub kpi_id: i64,
  /// Restrict to a period label, e.g. `"daily"`.
  pub period: Option<String>,
  pub limit:  usize,
}

impl DataPointQuery {
  pub fn new(kpi_id: i64) -> Self {
    Self { kpi_id, period: None, limit: 100 }
  }
}

/// Dashboard totals.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreCounts {
  pub departments: u64,
  pub kpis:        u64,
  pub data_points: u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a metrik storage backend.
///
/// All methods are atomic from the caller's point of view: one call, one
/// transaction. `insert_data_points` commits a whole bulk batch or none of
/// it.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait KpiStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Departments ───────────────────────────────────────────────────────

  /// Persist a new department. A duplicate name is an error, not an
  /// overwrite.
  fn insert_department(
    &self,
    input: NewDepartment,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  /// Retrieve a department by id. Returns `None` if not found.
  fn find_department(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  /// Case-sensitive name lookup, used for the duplicate pre-check.
  fn find_department_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + 'a;

  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  /// Delete a department, cascading to its KPIs and their data points.
  /// Returns `false` if the department did not exist.
  fn delete_department(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── KPIs ──────────────────────────────────────────────────────────────

  /// Persist a new KPI. `department_id` must reference an existing
  /// department.
  fn insert_kpi(
    &self,
    input: NewKpi,
  ) -> impl Future<Output = Result<Kpi, Self::Error>> + Send + '_;

  /// Retrieve a KPI by id. Returns `None` if not found.
  fn find_kpi(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Kpi>, Self::Error>> + Send + '_;

  fn list_kpis(
    &self,
    department_id: Option<i64>,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<Kpi>, Self::Error>> + Send + '_;

  // ── Data points ───────────────────────────────────────────────────────

  /// Persist one normalized data point. `id` is assigned by the store.
  fn insert_data_point(
    &self,
    input: NewDataPoint,
  ) -> impl Future<Output = Result<DataPoint, Self::Error>> + Send + '_;

  /// Persist a bulk batch in a single transaction, preserving input order.
  /// All rows commit or none do.
  fn insert_data_points(
    &self,
    inputs: Vec<NewDataPoint>,
  ) -> impl Future<Output = Result<Vec<DataPoint>, Self::Error>> + Send + '_;

  /// Data points for one KPI, newest first.
  fn list_data_points<'a>(
    &'a self,
    query: &'a DataPointQuery,
  ) -> impl Future<Output = Result<Vec<DataPoint>, Self::Error>> + Send + 'a;

  // ── Read models ───────────────────────────────────────────────────────

  fn counts(
    &self,
  ) -> impl Future<Output = Result<StoreCounts, Self::Error>> + Send + '_;

  /// Denormalized data-point × KPI × department rows, newest first.
  /// Feeds the dashboard, the export endpoints, and the BI sink.
  fn joined_rows(
    &self,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<JoinedRow>, Self::Error>> + Send + '_;
}
