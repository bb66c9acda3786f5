//! Domain types, the classification engine, the ingest pipeline, and the
//! [`store::KpiStore`] trait.
//!
//! Deliberately free of HTTP and database dependencies; every other crate in
//! the workspace depends on this one.

pub mod classify;
pub mod datapoint;
pub mod department;
pub mod error;
pub mod export;
pub mod ingest;
pub mod kpi;
pub mod store;

pub use error::{Error, Result};
