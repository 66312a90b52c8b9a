//! Error type for `roster-store-sqlite`.

use roster_core::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A unique column (username, email, cpf) already holds this value.
  #[error("unique constraint violated: {0}")]
  Conflict(String),

  /// The row being updated, or a referenced row, does not exist.
  #[error("{entity} {id} not found")]
  NotFound { entity: EntityKind, id: i64 },

  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// Wrap a lookup miss so it can cross a `Connection::call` boundary.
  pub(crate) fn missing(entity: EntityKind, id: i64) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Other(Box::new(Self::NotFound { entity, id }))
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, message))
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
      {
        Self::Conflict(message.unwrap_or_else(|| failure.to_string()))
      }
      tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Self>() {
        Ok(ours) => *ours,
        Err(other) => Self::Database(tokio_rusqlite::Error::Other(other)),
      },
      other => Self::Database(other),
    }
  }
}

impl From<Error> for roster_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::NotFound { entity, id } => Self::NotFound { entity, id },
      Error::Conflict(message) => Self::Conflict(message),
      other => Self::Store(Box::new(other)),
    }
  }
}
