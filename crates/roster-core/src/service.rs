//! Write and read paths shared by every record type.
//!
//! Each function takes the store, the acting identity, and the clock as
//! arguments. Validation always runs before the store is touched, so a
//! rejected write never reaches persistence.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
  Error, Result,
  audit::Actor,
  filter::{self, PageParams},
  page::Page,
  record::{EntityKind, Record},
  reference::{City, Country, State},
  store::{ReferenceStore, Repository},
};

fn store_error<E: Into<Error>>(e: E) -> Error { e.into() }

/// Validate, stamp, and insert a new record. Any identity or audit state the
/// caller supplied is discarded first.
pub async fn create<R, S>(store: &S, mut record: R, actor: &Actor, now: DateTime<Utc>) -> Result<R>
where
  R: Record,
  S: Repository<R>,
{
  record.reset();
  record.validate(now.date_naive())?;
  record.seal()?;
  record.stamp(actor, now);

  let saved = store.save(record).await.map_err(store_error)?;
  info!(kind = %R::KIND, id = ?saved.id(), "record created");
  Ok(saved)
}

/// Replace the record stored under `id`.
///
/// The stored version must exist. Its creation audit, and any other state
/// the record type marks as immutable, are carried over before validation.
pub async fn update<R, S>(
  store: &S,
  id: i64,
  mut record: R,
  actor: &Actor,
  now: DateTime<Utc>,
) -> Result<R>
where
  R: Record,
  S: Repository<R>,
{
  let stored = find::<R, S>(store, id).await?;

  record.set_id(Some(id));
  record.inherit(&stored);
  record.validate(now.date_naive())?;
  record.seal()?;
  record.stamp(actor, now);

  let saved = store.save(record).await.map_err(store_error)?;
  info!(kind = %R::KIND, id, "record updated");
  Ok(saved)
}

/// Remove the record stored under `id`, with its owned sub-records.
pub async fn delete<R, S>(store: &S, id: i64) -> Result<()>
where
  R: Record,
  S: Repository<R>,
{
  find::<R, S>(store, id).await?;
  store.delete(id).await.map_err(store_error)?;
  info!(kind = %R::KIND, id, "record deleted");
  Ok(())
}

pub async fn find<R, S>(store: &S, id: i64) -> Result<R>
where
  R: Record,
  S: Repository<R>,
{
  store
    .find_by_id(id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| Error::not_found(R::KIND, id))
}

pub async fn list<R, S>(store: &S) -> Result<Vec<R::Projection>>
where
  R: Record,
  S: Repository<R>,
{
  let records = store.find_all().await.map_err(store_error)?;
  Ok(records.iter().map(R::Projection::from).collect())
}

/// Compile `filter` and `page`, run the plan, and project the page.
pub async fn search<R, S>(
  store: &S,
  filter: &R::Filter,
  page: &PageParams,
) -> Result<Page<R::Projection>>
where
  R: Record,
  S: Repository<R>,
{
  let plan = filter::compile(filter, page)?;
  debug!(
    kind = %R::KIND,
    predicates = plan.predicates.len(),
    page = plan.page.index,
    size = plan.page.size,
    sort = plan.sort.column,
    "searching"
  );
  let raw = store.find_by_plan(&plan).await.map_err(store_error)?;
  Ok(Page::assemble(raw, plan.page))
}

// ─── Reference data ──────────────────────────────────────────────────────────

pub async fn create_country<S: ReferenceStore>(store: &S, mut country: Country) -> Result<Country> {
  country.id = None;
  country.validate()?;
  let saved = store.add_country(country).await.map_err(store_error)?;
  info!(kind = %EntityKind::Country, id = ?saved.id, "record created");
  Ok(saved)
}

/// The state's country link, if any, must name an existing country.
pub async fn create_state<S: ReferenceStore>(store: &S, mut state: State) -> Result<State> {
  state.id = None;
  state.validate()?;
  let saved = store.add_state(state).await.map_err(store_error)?;
  info!(kind = %EntityKind::State, id = ?saved.id, "record created");
  Ok(saved)
}

/// The city's state link, if any, must name an existing state.
pub async fn create_city<S: ReferenceStore>(store: &S, mut city: City) -> Result<City> {
  city.id = None;
  city.validate()?;
  let saved = store.add_city(city).await.map_err(store_error)?;
  info!(kind = %EntityKind::City, id = ?saved.id, "record created");
  Ok(saved)
}
