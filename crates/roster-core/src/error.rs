//! Error types for `roster-core`.

use thiserror::Error;

use crate::{record::EntityKind, validate::Violation};

#[derive(Debug, Error)]
pub enum Error {
  /// A field or cross-field rule failed; nothing was persisted.
  #[error("validation failed: {0}")]
  Validation(#[from] Violation),

  #[error("{entity} {id} not found")]
  NotFound { entity: EntityKind, id: i64 },

  /// A uniqueness constraint was violated at the store.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("credential error: {0}")]
  Credentials(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(entity: EntityKind, id: i64) -> Self {
    Self::NotFound { entity, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
