//! Export endpoints: the denormalized rows as JSON, and the same rows as a
//! CSV download.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use metrik_core::{export::ExportRow, store::KpiStore};

use crate::error::ApiError;

/// `GET /export/rows` — every record, denormalized and classified, newest
/// first. This is the feed BI sinks poll.
pub async fn rows<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<ExportRow>>, ApiError>
where
  S: KpiStore,
{
  let rows = store.joined_rows(None).await.map_err(ApiError::store)?;
  Ok(Json(rows.iter().map(ExportRow::from_joined).collect()))
}

/// `GET /export/csv` — the same rows as an attachment download.
pub async fn csv<S>(
  State(store): State<Arc<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KpiStore,
{
  let rows = store.joined_rows(None).await.map_err(ApiError::store)?;

  let mut writer = csv::Writer::from_writer(Vec::new());
  for row in &rows {
    writer
      .serialize(ExportRow::from_joined(row))
      .map_err(ApiError::store)?;
  }
  let body = writer
    .into_inner()
    .map_err(|e| ApiError::store(e.into_error()))?;

  Ok((
    StatusCode::OK,
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
      (
        header::CONTENT_DISPOSITION,
        "attachment; filename=\"kpi_data.csv\"",
      ),
    ],
    body,
  ))
}
