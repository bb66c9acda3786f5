//! Handlers for data-point submission and listing.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/kpis/:id/data` | Newest first; `?period`, `?limit` (default 100) |
//! | `POST` | `/kpis/:id/data` | One record; the URL supplies the KPI |
//! | `POST` | `/data/bulk` | Ordered array of records, failures isolated per item |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use metrik_core::{
  classify::ClassifiedDataPoint,
  ingest::{self, EntryChannel, RawDataPoint},
  store::{DataPointQuery, KpiStore},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub period: Option<String>,
  pub limit:  Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub kpi:   metrik_core::kpi::Kpi,
  pub count: usize,
  pub data:  Vec<ClassifiedDataPoint>,
}

/// `GET /kpis/:id/data[?period=...][&limit=...]` — classified, newest first.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError>
where
  S: KpiStore,
{
  let kpi = store
    .find_kpi(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("KPI {id} not found")))?;

  let mut query = DataPointQuery::new(id);
  query.period = params.period;
  if let Some(limit) = params.limit {
    query.limit = limit;
  }

  let points = store.list_data_points(&query).await.map_err(ApiError::store)?;
  let data: Vec<_> = points
    .into_iter()
    .map(|p| ClassifiedDataPoint::new(p, kpi.target_type))
    .collect();

  Ok(Json(ListResponse { count: data.len(), data, kpi }))
}

// ─── Single-item submission ───────────────────────────────────────────────────

/// `POST /kpis/:id/data` — 201 + the stored point with its computed status.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(raw): Json<RawDataPoint>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KpiStore,
{
  let classified =
    ingest::ingest_one(store.as_ref(), id, &raw, EntryChannel::Api).await?;
  Ok((StatusCode::CREATED, Json(classified)))
}

// ─── Bulk submission ──────────────────────────────────────────────────────────

/// `POST /data/bulk` — ordered array in, [`BulkReport`] out.
///
/// A batch with at least one accepted item answers 201 (partial failures are
/// listed in `errors`); an all-invalid batch persists nothing and answers
/// 400.
///
/// [`BulkReport`]: metrik_core::ingest::BulkReport
pub async fn bulk<S>(
  State(store): State<Arc<S>>,
  Json(items): Json<Vec<RawDataPoint>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KpiStore,
{
  let report =
    ingest::ingest_bulk(store.as_ref(), &items, EntryChannel::BulkApi).await?;

  let status = if report.all_failed() {
    StatusCode::BAD_REQUEST
  } else {
    StatusCode::CREATED
  };
  Ok((status, Json(report)))
}
