//! Handlers for `/kpis` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/kpis` | Optional `?department_id`; `?active_only` defaults true |
//! | `POST` | `/kpis` | Body: [`CreateBody`]; 404 if the department is unknown |
//! | `GET`  | `/kpis/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use metrik_core::{
  kpi::{Kpi, NewKpi, TargetType},
  store::KpiStore,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub department_id: Option<i64>,
  /// If `false`, retired KPIs are included. Default `true`.
  pub active_only:   Option<bool>,
}

/// `GET /kpis[?department_id=...][&active_only=false]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Kpi>>, ApiError>
where
  S: KpiStore,
{
  let kpis = store
    .list_kpis(params.department_id, params.active_only.unwrap_or(true))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(kpis))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /kpis`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:          Option<String>,
  #[serde(default)]
  pub description:   String,
  #[serde(default)]
  pub unit:          String,
  #[serde(default)]
  pub target_type:   TargetType,
  pub department_id: Option<i64>,
  #[serde(default = "default_true")]
  pub is_active:     bool,
}

fn default_true() -> bool { true }

/// `POST /kpis` — returns 201 + the stored [`Kpi`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KpiStore,
{
  let name = body
    .name
    .filter(|n| !n.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("missing required field: name".into()))?;
  let department_id = body.department_id.ok_or_else(|| {
    ApiError::BadRequest("missing required field: department_id".into())
  })?;

  store
    .find_department(department_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("department {department_id} not found"))
    })?;

  let kpi = store
    .insert_kpi(NewKpi {
      name,
      description: body.description,
      unit: body.unit,
      target_type: body.target_type,
      department_id,
      is_active: body.is_active,
    })
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(kpi)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /kpis/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Kpi>, ApiError>
where
  S: KpiStore,
{
  let kpi = store
    .find_kpi(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("KPI {id} not found")))?;
  Ok(Json(kpi))
}
