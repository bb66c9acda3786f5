//! Error types for `metrik-core`.
//!
//! The variants mirror the status classes the HTTP layer answers with:
//! `MissingField` and `InvalidFormat` are bad requests, `NotFound` and
//! `Conflict` map to their namesake statuses, and `Store` is a server error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("invalid {field}: {reason}")]
  InvalidFormat {
    field:  &'static str,
    reason: String,
  },

  #[error("{entity} with id {id} not found")]
  NotFound { entity: &'static str, id: i64 },

  #[error("{0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error from a [`KpiStore`](crate::store::KpiStore) impl.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
