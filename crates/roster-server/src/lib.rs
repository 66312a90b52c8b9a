//! HTTP server wiring for Roster.
//!
//! Loads [`ServerConfig`] and mounts the JSON API under `/api/v1` with
//! request tracing. The binary in `main.rs` is a thin shell around this.

use std::{path::Path, sync::Arc};

use axum::Router;
use roster_core::audit::Actor;
use roster_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Prefix of environment variables that override the config file,
/// e.g. `ROSTER_PORT=9000`.
pub const ENV_PREFIX: &str = "ROSTER";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `roster.toml` and the
/// environment. Every field has a default so an empty file is valid.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  /// SQLite database file. `~/` is expanded against `$HOME`.
  pub store_path:    String,
  /// Identity stamped on writes that carry no `x-actor` header.
  pub default_actor: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          "127.0.0.1".to_string(),
      port:          8080,
      store_path:    "roster.db".to_string(),
      default_actor: "system".to_string(),
    }
  }
}

impl ServerConfig {
  /// Layer `path` (optional) under `ROSTER_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router over `store`.
pub fn app(store: Arc<SqliteStore>, config: &ServerConfig) -> Router {
  let actor = Actor::new(config.default_actor.as_str());
  Router::new()
    .nest("/api/v1", roster_api::api_router(store, actor))
    .layer(TraceLayer::new_for_http())
}
