//! SQL schema for the metrik SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `foreign_keys = ON` is what makes department deletion cascade through
/// KPIs to their data points, and what makes the FK constraints the final
/// arbiter when a KPI is deleted concurrently with an ingest.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS departments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS kpis (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    description   TEXT NOT NULL DEFAULT '',
    unit          TEXT NOT NULL DEFAULT '',
    target_type   TEXT NOT NULL DEFAULT 'higher_better',
    department_id INTEGER NOT NULL
                  REFERENCES departments(id) ON DELETE CASCADE,
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL
);

-- Performance status is never stored here; it is recomputed on every read
-- from (value, target, owning KPI's target_type).
CREATE TABLE IF NOT EXISTS kpi_data (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    kpi_id     INTEGER NOT NULL REFERENCES kpis(id) ON DELETE CASCADE,
    value      REAL NOT NULL,
    target     REAL,            -- NULL means no target set
    timestamp  TEXT NOT NULL,   -- ISO 8601 UTC
    period     TEXT NOT NULL DEFAULT 'daily',
    notes      TEXT NOT NULL DEFAULT '',
    created_by TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS kpis_department_idx    ON kpis(department_id);
CREATE INDEX IF NOT EXISTS kpi_data_kpi_idx       ON kpi_data(kpi_id);
CREATE INDEX IF NOT EXISTS kpi_data_timestamp_idx ON kpi_data(timestamp);

PRAGMA user_version = 1;
";
