//! [`SqliteStore`]: the SQLite implementation of the core storage traits.
//!
//! The per-record `Repository` impls live in `people`, `users`, and
//! `addresses`; `ReferenceStore` lives in `references`.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _, functions::FunctionFlags};

use roster_core::EntityKind;

use crate::{Error, Result, schema::SCHEMA};

/// Name of the Unicode-aware lowercase SQL function registered on every
/// connection.
pub(crate) const FOLD: &str = "fold_case";

/// Register [`FOLD`]. NULL stays NULL.
fn register_fold(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
  )
}

/// A record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_fold(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Delete a row by identity, failing if nothing matched.
  pub(crate) async fn delete_row(
    &self,
    table: &'static str,
    entity: EntityKind,
    id: i64,
  ) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?))
      .await?;
    if removed == 0 {
      return Err(Error::NotFound { entity, id });
    }
    Ok(())
  }
}

// ─── Shared row helpers ──────────────────────────────────────────────────────

/// Fail with `NotFound` for `entity` unless `table` has a row with `id`.
pub(crate) fn ensure_exists(
  conn: &rusqlite::Connection,
  table: &str,
  entity: EntityKind,
  id: i64,
) -> tokio_rusqlite::Result<()> {
  let found = conn
    .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id], |_| Ok(()))
    .optional()?;
  match found {
    Some(()) => Ok(()),
    None => Err(Error::missing(entity, id)),
  }
}

/// Check an optional link to a referenced row and return its identity.
pub(crate) fn link(
  conn: &rusqlite::Connection,
  table: &str,
  entity: EntityKind,
  id: Option<i64>,
) -> tokio_rusqlite::Result<Option<i64>> {
  if let Some(id) = id {
    ensure_exists(conn, table, entity, id)?;
  }
  Ok(id)
}
