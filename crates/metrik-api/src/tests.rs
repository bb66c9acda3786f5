use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use metrik_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::*;

async fn router() -> Router<()> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store))
}

async fn send(
  app: &Router<()>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> axum::response::Response {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  app
    .clone()
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
  let bytes =
    axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

/// POST a department and return its id.
async fn seed_department(app: &Router<()>, name: &str) -> i64 {
  let resp =
    send(app, "POST", "/departments", Some(json!({ "name": name }))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  json_body(resp).await["id"].as_i64().unwrap()
}

/// POST a KPI and return its id.
async fn seed_kpi(
  app: &Router<()>,
  department_id: i64,
  name: &str,
  target_type: &str,
) -> i64 {
  let resp = send(
    app,
    "POST",
    "/kpis",
    Some(json!({
      "name":          name,
      "unit":          "%",
      "target_type":   target_type,
      "department_id": department_id,
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  json_body(resp).await["id"].as_i64().unwrap()
}

// ── Departments ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_department() {
  let app = router().await;
  let id = seed_department(&app, "Sales").await;

  let resp = send(&app, "GET", &format!("/departments/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body["name"], "Sales");
}

#[tokio::test]
async fn duplicate_department_name_returns_409() {
  let app = router().await;
  seed_department(&app, "Sales").await;

  let resp =
    send(&app, "POST", "/departments", Some(json!({ "name": "Sales" }))).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn department_without_name_returns_400() {
  let app = router().await;
  for body in [json!({}), json!({ "name": "" }), json!({ "name": "  " })] {
    let resp = send(&app, "POST", "/departments", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}

#[tokio::test]
async fn unknown_department_returns_404() {
  let app = router().await;
  let resp = send(&app, "GET", "/departments/99", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_department_cascades() {
  let app = router().await;
  let dept = seed_department(&app, "Ops").await;
  let kpi = seed_kpi(&app, dept, "Uptime", "higher_better").await;
  let resp = send(
    &app,
    "POST",
    &format!("/kpis/{kpi}/data"),
    Some(json!({ "value": 99.9 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = send(&app, "DELETE", &format!("/departments/{dept}"), None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = send(&app, "GET", &format!("/kpis/{kpi}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = send(&app, "DELETE", &format!("/departments/{dept}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── KPIs ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn kpi_for_unknown_department_returns_404() {
  let app = router().await;
  let resp = send(
    &app,
    "POST",
    "/kpis",
    Some(json!({ "name": "Revenue", "department_id": 42 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn kpi_without_department_id_returns_400() {
  let app = router().await;
  let resp =
    send(&app, "POST", "/kpis", Some(json!({ "name": "Revenue" }))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn kpi_listing_defaults_to_active_only() {
  let app = router().await;
  let dept = seed_department(&app, "Sales").await;
  seed_kpi(&app, dept, "Revenue", "higher_better").await;
  let resp = send(
    &app,
    "POST",
    "/kpis",
    Some(json!({
      "name":          "Legacy Metric",
      "department_id": dept,
      "is_active":     false,
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let body = json_body(send(&app, "GET", "/kpis", None).await).await;
  assert_eq!(body.as_array().unwrap().len(), 1);

  let body =
    json_body(send(&app, "GET", "/kpis?active_only=false", None).await).await;
  assert_eq!(body.as_array().unwrap().len(), 2);

  // The department drill-down shows everything.
  let body = json_body(
    send(&app, "GET", &format!("/departments/{dept}/kpis"), None).await,
  )
  .await;
  assert_eq!(body.as_array().unwrap().len(), 2);
}

// ── Data points ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_data_point_returns_classified_201() {
  let app = router().await;
  let dept = seed_department(&app, "Support").await;
  let kpi = seed_kpi(&app, dept, "Response Time", "lower_better").await;

  let resp = send(
    &app,
    "POST",
    &format!("/kpis/{kpi}/data"),
    Some(json!({ "value": 2.5, "target": 3.0 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body = json_body(resp).await;
  assert_eq!(body["status"], "above_target");
  assert_eq!(body["point"]["value"], 2.5);
  assert_eq!(body["point"]["created_by"], "api_user");
}

#[tokio::test]
async fn submit_to_unknown_kpi_returns_404() {
  let app = router().await;
  let resp =
    send(&app, "POST", "/kpis/77/data", Some(json!({ "value": 1.0 }))).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_value_returns_400() {
  let app = router().await;
  let dept = seed_department(&app, "Sales").await;
  let kpi = seed_kpi(&app, dept, "Revenue", "higher_better").await;

  let resp = send(
    &app,
    "POST",
    &format!("/kpis/{kpi}/data"),
    Some(json!({ "value": "lots" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_data_points_is_classified_and_counted() {
  let app = router().await;
  let dept = seed_department(&app, "Sales").await;
  let kpi = seed_kpi(&app, dept, "Conversion", "higher_better").await;

  for (value, ts) in
    [(82.0, "2024-05-01T00:00:00Z"), (78.0, "2024-05-02T00:00:00Z")]
  {
    let resp = send(
      &app,
      "POST",
      &format!("/kpis/{kpi}/data"),
      Some(json!({ "value": value, "target": 80.0, "timestamp": ts })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  let body =
    json_body(send(&app, "GET", &format!("/kpis/{kpi}/data"), None).await)
      .await;
  assert_eq!(body["count"], 2);
  // Newest first.
  assert_eq!(body["data"][0]["point"]["value"], 78.0);
  assert_eq!(body["data"][0]["status"], "below_target");
  assert_eq!(body["data"][1]["status"], "above_target");
}

// ── Bulk ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bulk_isolates_failures_per_item() {
  let app = router().await;
  let dept = seed_department(&app, "Sales").await;
  let kpi = seed_kpi(&app, dept, "Revenue", "higher_better").await;

  let resp = send(
    &app,
    "POST",
    "/data/bulk",
    Some(json!([
      { "kpi_id": kpi, "value": 120.0, "target": 100.0 },
      { "kpi_id": kpi, "value": "oops" },
      { "kpi_id": 999, "value": 5.0 },
      { "kpi_id": kpi.to_string(), "value": "95.5", "target": "100" },
    ])),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body = json_body(resp).await;
  assert_eq!(body["created_count"], 2);
  assert_eq!(body["accepted"][0]["point"]["value"], 120.0);
  assert_eq!(body["accepted"][1]["point"]["value"], 95.5);
  assert_eq!(body["errors"][0]["index"], 1);
  assert_eq!(body["errors"][1]["index"], 2);
}

#[tokio::test]
async fn all_invalid_bulk_returns_400_and_persists_nothing() {
  let app = router().await;
  let dept = seed_department(&app, "Sales").await;
  let kpi = seed_kpi(&app, dept, "Revenue", "higher_better").await;

  let resp = send(
    &app,
    "POST",
    "/data/bulk",
    Some(json!([{ "kpi_id": kpi }, { "value": 5.0 }])),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body = json_body(resp).await;
  assert_eq!(body["created_count"], 0);
  assert_eq!(body["errors"].as_array().unwrap().len(), 2);

  let body =
    json_body(send(&app, "GET", &format!("/kpis/{kpi}/data"), None).await)
      .await;
  assert_eq!(body["count"], 0);
}

// ── Dashboard & export ────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_reports_counts_and_recent() {
  let app = router().await;
  let dept = seed_department(&app, "Sales").await;
  let kpi = seed_kpi(&app, dept, "Revenue", "higher_better").await;
  send(
    &app,
    "POST",
    &format!("/kpis/{kpi}/data"),
    Some(json!({ "value": 120.0, "target": 100.0 })),
  )
  .await;

  let body = json_body(send(&app, "GET", "/dashboard", None).await).await;
  assert_eq!(body["summary"]["departments"], 1);
  assert_eq!(body["summary"]["kpis"], 1);
  assert_eq!(body["summary"]["data_points"], 1);
  assert_eq!(body["recent"][0]["kpi_name"], "Revenue");
  assert_eq!(body["recent"][0]["status"], "Above Target");
}

#[tokio::test]
async fn export_rows_carry_derived_columns() {
  let app = router().await;
  let dept = seed_department(&app, "Sales").await;
  let kpi = seed_kpi(&app, dept, "Conversion", "higher_better").await;
  send(
    &app,
    "POST",
    &format!("/kpis/{kpi}/data"),
    Some(json!({ "value": 76.0, "target": 80.0 })),
  )
  .await;

  let body = json_body(send(&app, "GET", "/export/rows", None).await).await;
  let row = &body[0];
  assert_eq!(row["KPI_Name"], "Conversion");
  assert_eq!(row["Department_Name"], "Sales");
  assert_eq!(row["Status"], "Below Target");
  assert_eq!(row["Variance"], -4.0);
  assert_eq!(row["Achievement_Rate"], 95.0);
  assert_eq!(row["Performance_Category"], "Good");
}

#[tokio::test]
async fn export_csv_is_a_download_with_header_row() {
  let app = router().await;
  let dept = seed_department(&app, "Sales").await;
  let kpi = seed_kpi(&app, dept, "Revenue", "higher_better").await;
  send(
    &app,
    "POST",
    &format!("/kpis/{kpi}/data"),
    Some(json!({ "value": 120.0, "target": 100.0 })),
  )
  .await;

  let resp = send(&app, "GET", "/export/csv", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(
    resp.headers().get(header::CONTENT_TYPE).unwrap(),
    "text/csv; charset=utf-8"
  );
  assert!(
    resp
      .headers()
      .get(header::CONTENT_DISPOSITION)
      .unwrap()
      .to_str()
      .unwrap()
      .contains("kpi_data.csv")
  );

  let bytes =
    axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let text = std::str::from_utf8(&bytes).unwrap();
  let header_row = text.lines().next().unwrap();
  assert!(header_row.starts_with("Data_ID,KPI_ID,KPI_Name"));
  assert!(header_row.contains("Achievement_Rate"));
  assert_eq!(text.lines().count(), 2);
}
