//! JSON REST API for metrik.
//!
//! Exposes an axum [`Router`] backed by any [`metrik_core::store::KpiStore`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", metrik_api::api_router(store.clone()))
//! ```

pub mod dashboard;
pub mod datapoints;
pub mod departments;
pub mod error;
pub mod export;
pub mod kpis;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use metrik_core::store::KpiStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: KpiStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Departments
    .route(
      "/departments",
      get(departments::list::<S>).post(departments::create::<S>),
    )
    .route(
      "/departments/{id}",
      get(departments::get_one::<S>).delete(departments::delete_one::<S>),
    )
    .route("/departments/{id}/kpis", get(departments::kpis_for::<S>))
    // KPIs
    .route("/kpis", get(kpis::list::<S>).post(kpis::create::<S>))
    .route("/kpis/{id}", get(kpis::get_one::<S>))
    // Data points
    .route(
      "/kpis/{id}/data",
      get(datapoints::list::<S>).post(datapoints::create::<S>),
    )
    .route("/data/bulk", post(datapoints::bulk::<S>))
    // Read models
    .route("/dashboard", get(dashboard::handler::<S>))
    .route("/export/rows", get(export::rows::<S>))
    .route("/export/csv", get(export::csv::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
