//! [`SqliteStore`] — the SQLite implementation of [`KpiStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use metrik_core::{
  datapoint::{DataPoint, NewDataPoint},
  department::{Department, NewDepartment},
  export::JoinedRow,
  kpi::{Kpi, NewKpi},
  store::{DataPointQuery, KpiStore, StoreCounts},
};

use crate::{
  encode::{encode_dt, RawDepartment, RawJoined, RawKpi, RawPoint},
  error::is_constraint_violation,
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A metrik store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

const KPI_COLUMNS: &str =
  "id, name, description, unit, target_type, department_id, is_active, \
   created_at";

const POINT_COLUMNS: &str =
  "id, kpi_id, value, target, timestamp, period, notes, created_by";

fn kpi_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawKpi> {
  Ok(RawKpi {
    id:            row.get(0)?,
    name:          row.get(1)?,
    description:   row.get(2)?,
    unit:          row.get(3)?,
    target_type:   row.get(4)?,
    department_id: row.get(5)?,
    is_active:     row.get(6)?,
    created_at:    row.get(7)?,
  })
}

fn point_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPoint> {
  Ok(RawPoint {
    id:         row.get(0)?,
    kpi_id:     row.get(1)?,
    value:      row.get(2)?,
    target:     row.get(3)?,
    timestamp:  row.get(4)?,
    period:     row.get(5)?,
    notes:      row.get(6)?,
    created_by: row.get(7)?,
  })
}

fn department_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawDepartment> {
  Ok(RawDepartment {
    id:          row.get(0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
    created_at:  row.get(3)?,
  })
}

// ─── KpiStore impl ───────────────────────────────────────────────────────────

impl KpiStore for SqliteStore {
  type Error = Error;

  // ── Departments ───────────────────────────────────────────────────────────

  async fn insert_department(
    &self,
    input: NewDepartment,
  ) -> Result<Department> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let name = input.name.clone();
    let description = input.description.clone();

    // The SELECT is only the friendly pre-check; the UNIQUE constraint is
    // what actually guarantees uniqueness when requests race.
    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM departments WHERE name = ?1",
            rusqlite::params![name],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          return Ok(None);
        }

        conn.execute(
          "INSERT INTO departments (name, description, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![name, description, at_str],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await
      .map_err(|e| {
        if is_constraint_violation(&e) {
          Error::DuplicateDepartment(input.name.clone())
        } else {
          Error::Database(e)
        }
      })?;

    let id = id.ok_or_else(|| Error::DuplicateDepartment(input.name.clone()))?;

    Ok(Department {
      id,
      name: input.name,
      description: input.description,
      created_at,
    })
  }

  async fn find_department(&self, id: i64) -> Result<Option<Department>> {
    let raw: Option<RawDepartment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name, description, created_at
               FROM departments WHERE id = ?1",
              rusqlite::params![id],
              department_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDepartment::into_department).transpose()
  }

  async fn find_department_by_name(
    &self,
    name: &str,
  ) -> Result<Option<Department>> {
    let name = name.to_owned();
    let raw: Option<RawDepartment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name, description, created_at
               FROM departments WHERE name = ?1",
              rusqlite::params![name],
              department_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDepartment::into_department).transpose()
  }

  async fn list_departments(&self) -> Result<Vec<Department>> {
    let raws: Vec<RawDepartment> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, description, created_at
           FROM departments ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], department_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDepartment::into_department).collect()
  }

  async fn delete_department(&self, id: i64) -> Result<bool> {
    // ON DELETE CASCADE removes the department's KPIs and their data points
    // in the same statement.
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM departments WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── KPIs ──────────────────────────────────────────────────────────────────

  async fn insert_kpi(&self, input: NewKpi) -> Result<Kpi> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let department_id = input.department_id;
    let name = input.name.clone();
    let description = input.description.clone();
    let unit = input.unit.clone();
    let target_type = input.target_type;
    let is_active = input.is_active;

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let dept_exists: bool = conn
          .query_row(
            "SELECT 1 FROM departments WHERE id = ?1",
            rusqlite::params![department_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !dept_exists {
          return Ok(None);
        }

        conn.execute(
          "INSERT INTO kpis (
             name, description, unit, target_type, department_id,
             is_active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            name,
            description,
            unit,
            target_type.as_str(),
            department_id,
            is_active,
            at_str,
          ],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await
      .map_err(|e| {
        if is_constraint_violation(&e) {
          Error::DepartmentNotFound(department_id)
        } else {
          Error::Database(e)
        }
      })?;

    let id = id.ok_or(Error::DepartmentNotFound(department_id))?;

    Ok(Kpi {
      id,
      name: input.name,
      description: input.description,
      unit: input.unit,
      target_type: input.target_type,
      department_id: input.department_id,
      is_active: input.is_active,
      created_at,
    })
  }

  async fn find_kpi(&self, id: i64) -> Result<Option<Kpi>> {
    let raw: Option<RawKpi> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {KPI_COLUMNS} FROM kpis WHERE id = ?1"),
              rusqlite::params![id],
              kpi_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawKpi::into_kpi).transpose()
  }

  async fn list_kpis(
    &self,
    department_id: Option<i64>,
    active_only: bool,
  ) -> Result<Vec<Kpi>> {
    let raws: Vec<RawKpi> = self
      .conn
      .call(move |conn| {
        let mut conds: Vec<&'static str> = vec![];
        if department_id.is_some() {
          conds.push("department_id = ?1");
        }
        if active_only {
          conds.push("is_active = 1");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {KPI_COLUMNS} FROM kpis {where_clause} ORDER BY id"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = if let Some(dept) = department_id {
          stmt
            .query_map(rusqlite::params![dept], kpi_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          stmt
            .query_map([], kpi_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawKpi::into_kpi).collect()
  }

  // ── Data points ───────────────────────────────────────────────────────────

  async fn insert_data_point(&self, input: NewDataPoint) -> Result<DataPoint> {
    let kpi_id = input.kpi_id;
    let ts_str = encode_dt(input.timestamp);
    let value = input.value;
    let target = input.target;
    let period = input.period.clone();
    let notes = input.notes.clone();
    let created_by = input.created_by.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kpi_data (
             kpi_id, value, target, timestamp, period, notes, created_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            kpi_id, value, target, ts_str, period, notes, created_by,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| {
        if is_constraint_violation(&e) {
          Error::KpiNotFound(kpi_id)
        } else {
          Error::Database(e)
        }
      })?;

    Ok(DataPoint {
      id,
      kpi_id: input.kpi_id,
      value: input.value,
      target: input.target,
      timestamp: input.timestamp,
      period: input.period,
      notes: input.notes,
      created_by: input.created_by,
    })
  }

  async fn insert_data_points(
    &self,
    inputs: Vec<NewDataPoint>,
  ) -> Result<Vec<DataPoint>> {
    // One transaction for the whole batch: a failure on any row rolls back
    // every row.
    let points = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut points = Vec::with_capacity(inputs.len());
        {
          let mut stmt = tx.prepare(
            "INSERT INTO kpi_data (
               kpi_id, value, target, timestamp, period, notes, created_by
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;

          for input in inputs {
            stmt.execute(rusqlite::params![
              input.kpi_id,
              input.value,
              input.target,
              encode_dt(input.timestamp),
              input.period,
              input.notes,
              input.created_by,
            ])?;
            points.push(DataPoint {
              id:         tx.last_insert_rowid(),
              kpi_id:     input.kpi_id,
              value:      input.value,
              target:     input.target,
              timestamp:  input.timestamp,
              period:     input.period,
              notes:      input.notes,
              created_by: input.created_by,
            });
          }
        }
        tx.commit()?;
        Ok(points)
      })
      .await?;

    Ok(points)
  }

  async fn list_data_points(
    &self,
    query: &DataPointQuery,
  ) -> Result<Vec<DataPoint>> {
    let kpi_id = query.kpi_id;
    let period = query.period.clone();
    let limit = query.limit as i64;

    let raws: Vec<RawPoint> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(period) = period {
          let mut stmt = conn.prepare(&format!(
            "SELECT {POINT_COLUMNS} FROM kpi_data
             WHERE kpi_id = ?1 AND period = ?2
             ORDER BY timestamp DESC LIMIT ?3"
          ))?;
          stmt
            .query_map(rusqlite::params![kpi_id, period, limit], point_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {POINT_COLUMNS} FROM kpi_data
             WHERE kpi_id = ?1
             ORDER BY timestamp DESC LIMIT ?2"
          ))?;
          stmt
            .query_map(rusqlite::params![kpi_id, limit], point_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPoint::into_point).collect()
  }

  // ── Read models ───────────────────────────────────────────────────────────

  async fn counts(&self) -> Result<StoreCounts> {
    let (departments, kpis, data_points) = self
      .conn
      .call(|conn| {
        let departments: i64 =
          conn.query_row("SELECT COUNT(*) FROM departments", [], |r| r.get(0))?;
        let kpis: i64 =
          conn.query_row("SELECT COUNT(*) FROM kpis", [], |r| r.get(0))?;
        let data_points: i64 =
          conn.query_row("SELECT COUNT(*) FROM kpi_data", [], |r| r.get(0))?;
        Ok((departments, kpis, data_points))
      })
      .await?;

    Ok(StoreCounts {
      departments: departments as u64,
      kpis:        kpis as u64,
      data_points: data_points as u64,
    })
  }

  async fn joined_rows(&self, limit: Option<usize>) -> Result<Vec<JoinedRow>> {
    // SQLite treats LIMIT -1 as "no limit".
    let limit = limit.map(|l| l as i64).unwrap_or(-1);

    let raws: Vec<RawJoined> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             d.id, d.kpi_id, d.value, d.target, d.timestamp,
             d.period, d.notes, d.created_by,
             k.name, k.description, k.unit, k.target_type,
             dep.id, dep.name, dep.description
           FROM kpi_data d
           JOIN kpis k        ON k.id = d.kpi_id
           JOIN departments dep ON dep.id = k.department_id
           ORDER BY d.timestamp DESC
           LIMIT ?1",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(RawJoined {
              point:                  RawPoint {
                id:         row.get(0)?,
                kpi_id:     row.get(1)?,
                value:      row.get(2)?,
                target:     row.get(3)?,
                timestamp:  row.get(4)?,
                period:     row.get(5)?,
                notes:      row.get(6)?,
                created_by: row.get(7)?,
              },
              kpi_name:               row.get(8)?,
              kpi_description:        row.get(9)?,
              kpi_unit:               row.get(10)?,
              target_type:            row.get(11)?,
              department_id:          row.get(12)?,
              department_name:        row.get(13)?,
              department_description: row.get(14)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawJoined::into_joined).collect()
  }
}
