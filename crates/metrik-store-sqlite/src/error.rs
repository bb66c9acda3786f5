//! Error type for `metrik-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Department name uniqueness violated, either by the friendly pre-check
  /// or by the UNIQUE constraint when requests race.
  #[error("department {0:?} already exists")]
  DuplicateDepartment(String),

  #[error("department with id {0} not found")]
  DepartmentNotFound(i64),

  #[error("KPI with id {0} not found")]
  KpiNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Whether a backend error is a SQLite constraint violation (UNIQUE or
/// FOREIGN KEY), so callers can re-map races that slipped past a pre-check.
pub(crate) fn is_constraint_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}
