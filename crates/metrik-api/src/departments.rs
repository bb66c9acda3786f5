//! Handlers for `/departments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/departments` | All departments |
//! | `POST` | `/departments` | Body: [`CreateBody`]; 409 on duplicate name |
//! | `GET`  | `/departments/:id` | 404 if not found |
//! | `DELETE` | `/departments/:id` | Cascades to KPIs and data points |
//! | `GET`  | `/departments/:id/kpis` | All of the department's KPIs |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use metrik_core::{
  department::{Department, NewDepartment},
  kpi::Kpi,
  store::KpiStore,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /departments`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Department>>, ApiError>
where
  S: KpiStore,
{
  let departments = store.list_departments().await.map_err(ApiError::store)?;
  Ok(Json(departments))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /departments`. `name` is checked by the
/// handler so a missing field answers 400 with the taxonomy message rather
/// than a deserialisation rejection.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        Option<String>,
  #[serde(default)]
  pub description: String,
}

/// `POST /departments` — returns 201 + the stored [`Department`].
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

  // Friendly duplicate pre-check; the store's UNIQUE constraint remains the
  // final arbiter if two creations race.
  if store
    .find_department_by_name(&name)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict(format!(
      "department {name:?} already exists"
    )));
  }

  let department = store
    .insert_department(NewDepartment { name, description: body.description })
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(department)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /departments/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Department>, ApiError>
where
  S: KpiStore,
{
  let department = store
    .find_department(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("department {id} not found")))?;
  Ok(Json(department))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /departments/:id` — removes the department, its KPIs, and their
/// data points.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: KpiStore,
{
  let deleted = store.delete_department(id).await.map_err(ApiError::store)?;
  if deleted {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("department {id} not found")))
  }
}

// ─── KPIs of a department ─────────────────────────────────────────────────────

/// `GET /departments/:id/kpis` — all KPIs (active or not) of one department.
pub async fn kpis_for<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<Kpi>>, ApiError>
where
  S: KpiStore,
{
  store
    .find_department(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("department {id} not found")))?;

  let kpis = store
    .list_kpis(Some(id), false)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(kpis))
}
