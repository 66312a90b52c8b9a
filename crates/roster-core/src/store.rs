//! Storage traits.
//!
//! Backends (e.g. `roster-store-sqlite`) implement [`Repository`] once per
//! record type and [`ReferenceStore`] once. The [`service`](crate::service)
//! layer and the HTTP layer depend on these abstractions only.
//!
//! All methods return `Send` futures so stores can be shared across tasks in
//! a multi-threaded runtime.

use std::future::Future;

use crate::{
  filter::QueryPlan,
  page::RawPage,
  record::Record,
  reference::{City, Country, Role, State},
};

/// Persistence for one record type.
pub trait Repository<R: Record>: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Load a record with its owned and referenced sub-records resolved.
  /// Returns `None` if no record has this identity.
  fn find_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<R>, Self::Error>> + Send + '_;

  /// Every record, in the store's natural order for the type.
  fn find_all(&self) -> impl Future<Output = Result<Vec<R>, Self::Error>> + Send + '_;

  /// Run a compiled search. `total` counts every match, not just this page.
  fn find_by_plan<'a>(
    &'a self,
    plan: &'a QueryPlan,
  ) -> impl Future<Output = Result<RawPage<R>, Self::Error>> + Send + 'a;

  /// Insert (no identity) or update in place (identity set) and return the
  /// record as stored, with any assigned identities filled in.
  ///
  /// Owned sub-records are written in the same transaction. Referenced
  /// records are linked by identity only.
  fn save(&self, record: R) -> impl Future<Output = Result<R, Self::Error>> + Send + '_;

  /// Remove a record and its owned sub-records.
  fn delete(&self, id: i64) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Read and create access to the geographic reference data and roles.
pub trait ReferenceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  fn list_countries(&self)
  -> impl Future<Output = Result<Vec<Country>, Self::Error>> + Send + '_;

  /// States of one country, by name.
  fn list_states(
    &self,
    country_id: i64,
  ) -> impl Future<Output = Result<Vec<State>, Self::Error>> + Send + '_;

  /// Cities of one state, by name.
  fn list_cities(
    &self,
    state_id: i64,
  ) -> impl Future<Output = Result<Vec<City>, Self::Error>> + Send + '_;

  fn list_roles(&self) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + '_;

  fn add_country(
    &self,
    country: Country,
  ) -> impl Future<Output = Result<Country, Self::Error>> + Send + '_;

  /// The state's country must exist.
  fn add_state(&self, state: State)
  -> impl Future<Output = Result<State, Self::Error>> + Send + '_;

  /// The city's state must exist.
  fn add_city(&self, city: City) -> impl Future<Output = Result<City, Self::Error>> + Send + '_;
}
