//! `GET /dashboard` — store totals plus the most recent activity.

use std::sync::Arc;

use axum::{Json, extract::State};
use metrik_core::{
  classify::classify,
  store::{KpiStore, StoreCounts},
};
use serde::Serialize;

use crate::error::ApiError;

const RECENT_LIMIT: usize = 20;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
  pub summary: StoreCounts,
  pub recent:  Vec<RecentEntry>,
}

/// One line of the recent-activity feed. Status is recomputed here like
/// everywhere else; nothing on the dashboard is persisted state.
#[derive(Debug, Serialize)]
pub struct RecentEntry {
  pub data_id:    i64,
  pub kpi_id:     i64,
  pub kpi_name:   String,
  pub department: String,
  pub value:      f64,
  pub target:     Option<f64>,
  pub status:     String,
  pub timestamp:  chrono::DateTime<chrono::Utc>,
}

pub async fn handler<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<DashboardResponse>, ApiError>
where
  S: KpiStore,
{
  let summary = store.counts().await.map_err(ApiError::store)?;
  let rows = store
    .joined_rows(Some(RECENT_LIMIT))
    .await
    .map_err(ApiError::store)?;

  let recent = rows
    .into_iter()
    .map(|row| RecentEntry {
      data_id:    row.point.id,
      kpi_id:     row.point.kpi_id,
      kpi_name:   row.kpi_name,
      department: row.department_name,
      value:      row.point.value,
      target:     row.point.target,
      status:     classify(row.point.value, row.point.target, row.target_type)
        .label()
        .to_owned(),
      timestamp:  row.point.timestamp,
    })
    .collect();

  Ok(Json(DashboardResponse { summary, recent }))
}
