//! Validation, normalization, and the ingest coordinators.
//!
//! Raw candidate records arrive as loosely-typed field maps (JSON numbers or
//! numeric strings). [`normalize`] is the pure check-and-coerce step that
//! turns one into a [`NewDataPoint`] or a classified validation failure; it
//! never touches the store. [`ingest_one`] and [`ingest_bulk`] resolve KPI
//! existence against the store and persist what survives.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  classify::ClassifiedDataPoint,
  datapoint::NewDataPoint,
  error::{Error, Result},
  kpi::{Kpi, TargetType},
  store::KpiStore,
};

// ─── Entry channels ──────────────────────────────────────────────────────────

/// Where a record entered the system. Each channel carries its own
/// `created_by` attribution default; none of them requires the caller to
/// supply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryChannel {
  /// Programmatic single-item API.
  Api,
  /// Programmatic bulk API.
  BulkApi,
  /// Interactive form submission.
  Form,
  /// Seeded sample data.
  Seed,
}

impl EntryChannel {
  pub fn default_created_by(self) -> &'static str {
    match self {
      Self::Api => "api_user",
      Self::BulkApi => "bulk_api",
      Self::Form => "admin",
      Self::Seed => "system",
    }
  }
}

// ─── Raw candidate record ────────────────────────────────────────────────────

/// A raw, untyped candidate record as submitted by a caller.
///
/// Every field is optional at this stage; [`normalize`] decides what is
/// required. Numeric fields are carried as [`serde_json::Value`] so both
/// JSON numbers and numeric strings (`"82.5"`) coerce.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDataPoint {
  pub kpi_id:     Option<serde_json::Value>,
  pub value:      Option<serde_json::Value>,
  pub target:     Option<serde_json::Value>,
  /// ISO-8601 datetime string; absent means "now".
  pub timestamp:  Option<String>,
  pub period:     Option<String>,
  pub notes:      Option<String>,
  pub created_by: Option<String>,
}

// ─── Coercion helpers ────────────────────────────────────────────────────────

/// JSON null and blank strings count as "not provided". A numeric zero does
/// NOT: zero is a valid target value.
fn is_absent(v: &serde_json::Value) -> bool {
  match v {
    serde_json::Value::Null => true,
    serde_json::Value::String(s) => s.trim().is_empty(),
    _ => false,
  }
}

fn coerce_f64(v: &serde_json::Value) -> Option<f64> {
  match v {
    serde_json::Value::Number(n) => n.as_f64(),
    serde_json::Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

fn coerce_id(v: &serde_json::Value) -> Option<i64> {
  match v {
    serde_json::Value::Number(n) => n.as_i64(),
    serde_json::Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

/// Parse an ISO-8601 timestamp. Accepts RFC 3339, a naive datetime, or a
/// bare date (interpreted as midnight UTC) — the forms callers actually
/// send.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(naive.and_utc());
  }
  if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
  }
  None
}

// ─── Normalization ───────────────────────────────────────────────────────────

/// Validate and normalize one raw record.
///
/// `kpi_id_hint` carries the caller's addressing context for single-item
/// submission (the KPI is named in the URL); bulk items are self-describing
/// and must carry their own `kpi_id`.
///
/// Pure: never consults or mutates the store. KPI existence is the
/// coordinators' job.
pub fn normalize(
  raw: &RawDataPoint,
  kpi_id_hint: Option<i64>,
  channel: EntryChannel,
  now: DateTime<Utc>,
) -> Result<NewDataPoint> {
  let kpi_id = match kpi_id_hint {
    Some(id) => id,
    None => {
      let v = raw
        .kpi_id
        .as_ref()
        .filter(|v| !is_absent(v))
        .ok_or(Error::MissingField("kpi_id"))?;
      coerce_id(v).ok_or_else(|| Error::InvalidFormat {
        field:  "kpi_id",
        reason: format!("{v} is not an integer"),
      })?
    }
  };

  let value_raw = raw
    .value
    .as_ref()
    .filter(|v| !is_absent(v))
    .ok_or(Error::MissingField("value"))?;
  let value = coerce_f64(value_raw).ok_or_else(|| Error::InvalidFormat {
    field:  "value",
    reason: format!("{value_raw} is not a number"),
  })?;

  let target = match &raw.target {
    None => None,
    Some(v) if is_absent(v) => None,
    Some(v) => Some(coerce_f64(v).ok_or_else(|| Error::InvalidFormat {
      field:  "target",
      reason: format!("{v} is not a number"),
    })?),
  };

  let timestamp = match raw
    .timestamp
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
  {
    Some(s) => parse_timestamp(s).ok_or_else(|| Error::InvalidFormat {
      field:  "timestamp",
      reason: format!("{s:?} is not an ISO-8601 datetime"),
    })?,
    None => now,
  };

  Ok(NewDataPoint {
    kpi_id,
    value,
    target,
    timestamp,
    period: raw.period.clone().unwrap_or_else(|| "daily".to_owned()),
    notes: raw.notes.clone().unwrap_or_default(),
    created_by: raw
      .created_by
      .clone()
      .unwrap_or_else(|| channel.default_created_by().to_owned()),
  })
}

// ─── Single-item ingest ──────────────────────────────────────────────────────

/// Validate, persist, and classify one record addressed to `kpi_id`.
///
/// Unlike the bulk path, every failure here is a request-level failure.
pub async fn ingest_one<S>(
  store: &S,
  kpi_id: i64,
  raw: &RawDataPoint,
  channel: EntryChannel,
) -> Result<ClassifiedDataPoint>
where
  S: KpiStore,
{
  let kpi = store
    .find_kpi(kpi_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound { entity: "KPI", id: kpi_id })?;

  let input = normalize(raw, Some(kpi_id), channel, Utc::now())?;
  let point = store.insert_data_point(input).await.map_err(Error::store)?;

  Ok(ClassifiedDataPoint::new(point, kpi.target_type))
}

// ─── Bulk ingest coordinator ─────────────────────────────────────────────────

/// One failed item in a bulk submission, by input position.
#[derive(Debug, Clone, Serialize)]
pub struct BulkItemError {
  pub index:   usize,
  pub message: String,
}

/// The aggregate outcome of a bulk submission.
///
/// A batch with at least one accepted item is a (partial) success; callers
/// must still inspect `errors` to detect partial failure. A batch with zero
/// accepted items persisted nothing and is reported as failed.
#[derive(Debug, Serialize)]
pub struct BulkReport {
  /// Accepted items in input order, classified.
  pub accepted:      Vec<ClassifiedDataPoint>,
  pub created_count: usize,
  pub errors:        Vec<BulkItemError>,
}

impl BulkReport {
  pub fn all_failed(&self) -> bool { self.created_count == 0 }
}

/// Process an ordered sequence of raw candidate records.
///
/// Items are validated strictly in input order. A validation failure or an
/// unknown KPI reference is isolated to its item — it appends an indexed
/// error and the batch continues. Everything that survives is committed in
/// a single store transaction, and only if at least one item survived.
pub async fn ingest_bulk<S>(
  store: &S,
  items: &[RawDataPoint],
  channel: EntryChannel,
) -> Result<BulkReport>
where
  S: KpiStore,
{
  let now = Utc::now();

  // Per-batch KPI lookup cache; existence resolves once, at validation.
  let mut kpi_cache: HashMap<i64, Option<Kpi>> = HashMap::new();

  let mut candidates: Vec<(NewDataPoint, TargetType)> = Vec::new();
  let mut errors: Vec<BulkItemError> = Vec::new();

  for (index, raw) in items.iter().enumerate() {
    let input = match normalize(raw, None, channel, now) {
      Ok(input) => input,
      Err(e) => {
        errors.push(BulkItemError { index, message: e.to_string() });
        continue;
      }
    };

    let kpi = match kpi_cache.get(&input.kpi_id) {
      Some(cached) => cached.clone(),
      None => {
        let fetched =
          store.find_kpi(input.kpi_id).await.map_err(Error::store)?;
        kpi_cache.insert(input.kpi_id, fetched.clone());
        fetched
      }
    };

    let Some(kpi) = kpi else {
      errors.push(BulkItemError {
        index,
        message: Error::NotFound { entity: "KPI", id: input.kpi_id }
          .to_string(),
      });
      continue;
    };

    candidates.push((input, kpi.target_type));
  }

  // Commit only when something was accepted; an all-invalid batch writes
  // nothing.
  let accepted = if candidates.is_empty() {
    Vec::new()
  } else {
    let (inputs, types): (Vec<_>, Vec<_>) = candidates.into_iter().unzip();
    let points =
      store.insert_data_points(inputs).await.map_err(Error::store)?;
    points
      .into_iter()
      .zip(types)
      .map(|(point, target_type)| ClassifiedDataPoint::new(point, target_type))
      .collect()
  };

  Ok(BulkReport {
    created_count: accepted.len(),
    accepted,
    errors,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
