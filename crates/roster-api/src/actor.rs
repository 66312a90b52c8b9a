//! Shared handler state and the acting-identity extractor.

use std::{convert::Infallible, sync::Arc};

use axum::{extract::FromRequestParts, http::request::Parts};
use roster_core::audit::Actor;

/// Header naming the identity recorded in audit fields.
pub const ACTOR_HEADER: &str = "x-actor";

/// State threaded through every API handler.
pub struct ApiState<S> {
  pub store:         Arc<S>,
  /// Used when a request carries no usable [`ACTOR_HEADER`].
  pub default_actor: Actor,
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), default_actor: self.default_actor.clone() }
  }
}

/// The identity performing a write.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<ApiState<S>> for CurrentActor
where
  S: Send + Sync + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let actor = parts
      .headers
      .get(ACTOR_HEADER)
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(Actor::new)
      .unwrap_or_else(|| state.default_actor.clone());
    Ok(CurrentActor(actor))
  }
}
