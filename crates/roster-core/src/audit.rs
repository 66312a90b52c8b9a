//! Creation and modification metadata stamped on every write.
//!
//! The acting identity and the clock are always passed in by the caller;
//! nothing here reads process-global state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The identity recorded in `created_by` / `updated_by`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
  pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Actor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Which half of the audit metadata a call to [`Audit::stamp`] wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
  Created,
  Updated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Audit {
  pub created_at: Option<DateTime<Utc>>,
  pub created_by: Option<String>,
  pub updated_at: Option<DateTime<Utc>>,
  pub updated_by: Option<String>,
}

impl Audit {
  /// Record a write by `actor` at `now`.
  ///
  /// The first stamp (no `created_by` yet) fills the creation pair only;
  /// every later stamp fills the modification pair only. Not idempotent:
  /// call exactly once per write.
  pub fn stamp(&mut self, actor: &Actor, now: DateTime<Utc>) -> Stamp {
    if self.created_by.is_none() {
      self.created_at = Some(now);
      self.created_by = Some(actor.as_str().to_owned());
      Stamp::Created
    } else {
      self.updated_at = Some(now);
      self.updated_by = Some(actor.as_str().to_owned());
      Stamp::Updated
    }
  }
}
