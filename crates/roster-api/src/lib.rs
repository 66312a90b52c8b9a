//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any store implementing the
//! [`roster_core::store`] traits. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", roster_api::api_router(store.clone(), Actor::new("system")))
//! ```

pub mod actor;
pub mod error;
pub mod records;
pub mod references;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::{
  Record,
  address::Address,
  audit::Actor,
  person::Person,
  store::{ReferenceStore, Repository},
  user::User,
};

pub use actor::{ACTOR_HEADER, ApiState, CurrentActor};
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// Writes without an [`ACTOR_HEADER`] are stamped as `default_actor`. The
/// returned `Router<()>` can be nested into any parent router regardless of
/// its own state type.
pub fn api_router<S>(store: Arc<S>, default_actor: Actor) -> Router<()>
where
  S: Repository<Person> + Repository<User> + Repository<Address> + ReferenceStore + 'static,
{
  Router::new()
    .merge(record_routes::<Person, S>("/people"))
    .merge(record_routes::<User, S>("/users"))
    .merge(record_routes::<Address, S>("/addresses"))
    // Reference data
    .route("/addresses/street-types", get(references::street_types))
    .route(
      "/countries",
      get(references::countries::<S>).post(references::create_country::<S>),
    )
    .route("/countries/{id}/states", get(references::states::<S>))
    .route("/states", post(references::create_state::<S>))
    .route("/states/{id}/cities", get(references::cities::<S>))
    .route("/cities", post(references::create_city::<S>))
    .route("/roles", get(references::roles::<S>))
    .with_state(ApiState { store, default_actor })
}

/// The routes every record collection exposes under `base`.
fn record_routes<R, S>(base: &str) -> Router<ApiState<S>>
where
  R: Record,
  S: Repository<R> + 'static,
{
  Router::new()
    .route(&format!("{base}/all"), get(records::list::<R, S>))
    .route(&format!("{base}/fetch"), post(records::fetch::<R, S>))
    .route(&format!("{base}/fetch/{{name}}"), get(records::fetch_by_name::<R, S>))
    .route(base, post(records::create::<R, S>))
    .route(
      &format!("{base}/{{id}}"),
      get(records::get_one::<R, S>)
        .put(records::update::<R, S>)
        .delete(records::remove::<R, S>),
    )
}
