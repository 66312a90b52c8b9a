//! Countries, states, cities, and roles.

use rusqlite::{Connection, OptionalExtension as _};

use roster_core::{
  EntityKind,
  reference::{City, Country, Role, State},
  store::ReferenceStore,
};

use crate::{
  Error, Result,
  store::{SqliteStore, ensure_exists, link},
};

// ─── Loaders ─────────────────────────────────────────────────────────────────
//
// Each loader resolves its parent chain, stopping at the first missing link.

pub(crate) fn load_country(conn: &Connection, id: i64) -> rusqlite::Result<Option<Country>> {
  conn
    .query_row("SELECT id, name FROM countries WHERE id = ?1", [id], |row| {
      Ok(Country { id: Some(row.get(0)?), name: row.get(1)? })
    })
    .optional()
}

pub(crate) fn load_state(conn: &Connection, id: i64) -> rusqlite::Result<Option<State>> {
  let row: Option<(String, Option<i64>)> = conn
    .query_row("SELECT name, country_id FROM states WHERE id = ?1", [id], |row| {
      Ok((row.get(0)?, row.get(1)?))
    })
    .optional()?;
  let Some((name, country_id)) = row else {
    return Ok(None);
  };
  let country = match country_id {
    Some(country_id) => load_country(conn, country_id)?,
    None => None,
  };
  Ok(Some(State { id: Some(id), name, country }))
}

pub(crate) fn load_city(conn: &Connection, id: i64) -> rusqlite::Result<Option<City>> {
  let row: Option<(String, Option<i64>)> = conn
    .query_row("SELECT name, state_id FROM cities WHERE id = ?1", [id], |row| {
      Ok((row.get(0)?, row.get(1)?))
    })
    .optional()?;
  let Some((name, state_id)) = row else {
    return Ok(None);
  };
  let state = match state_id {
    Some(state_id) => load_state(conn, state_id)?,
    None => None,
  };
  Ok(Some(City { id: Some(id), name, state }))
}

pub(crate) fn load_roles(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Role>> {
  let mut stmt = conn.prepare(
    "SELECT r.id, r.name
     FROM roles r
     JOIN user_roles ur ON ur.role_id = r.id
     WHERE ur.user_id = ?1
     ORDER BY r.id",
  )?;
  stmt
    .query_map([user_id], |row| Ok(Role { id: Some(row.get(0)?), name: row.get(1)? }))?
    .collect()
}

// ─── ReferenceStore impl ─────────────────────────────────────────────────────

impl ReferenceStore for SqliteStore {
  type Error = Error;

  async fn list_countries(&self) -> Result<Vec<Country>> {
    let countries = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM countries ORDER BY name, id")?;
        let rows = stmt
          .query_map([], |row| Ok(Country { id: Some(row.get(0)?), name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(countries)
  }

  async fn list_states(&self, country_id: i64) -> Result<Vec<State>> {
    let states = self
      .conn
      .call(move |conn| {
        let country = load_country(conn, country_id)?
          .ok_or_else(|| Error::missing(EntityKind::Country, country_id))?;
        let mut stmt =
          conn.prepare("SELECT id, name FROM states WHERE country_id = ?1 ORDER BY name, id")?;
        let rows = stmt
          .query_map([country_id], |row| {
            Ok(State {
              id:      Some(row.get(0)?),
              name:    row.get(1)?,
              country: Some(country.clone()),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(states)
  }

  async fn list_cities(&self, state_id: i64) -> Result<Vec<City>> {
    let cities = self
      .conn
      .call(move |conn| {
        let state = load_state(conn, state_id)?
          .ok_or_else(|| Error::missing(EntityKind::State, state_id))?;
        let mut stmt =
          conn.prepare("SELECT id, name FROM cities WHERE state_id = ?1 ORDER BY name, id")?;
        let rows = stmt
          .query_map([state_id], |row| {
            Ok(City {
              id:    Some(row.get(0)?),
              name:  row.get(1)?,
              state: Some(state.clone()),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(cities)
  }

  async fn list_roles(&self) -> Result<Vec<Role>> {
    let roles = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM roles ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| Ok(Role { id: Some(row.get(0)?), name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(roles)
  }

  async fn add_country(&self, country: Country) -> Result<Country> {
    let stored = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO countries (name) VALUES (?1)",
          rusqlite::params![country.name],
        )?;
        Ok(Country { id: Some(conn.last_insert_rowid()), name: country.name })
      })
      .await?;
    Ok(stored)
  }

  async fn add_state(&self, state: State) -> Result<State> {
    let country_id = state.country.as_ref().and_then(|c| c.id);
    let name = state.name;

    let stored = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let country_id = link(&tx, "countries", EntityKind::Country, country_id)?;
        tx.execute(
          "INSERT INTO states (name, country_id) VALUES (?1, ?2)",
          rusqlite::params![name, country_id],
        )?;
        let id = tx.last_insert_rowid();
        let stored = load_state(&tx, id)?;
        tx.commit()?;
        Ok(stored)
      })
      .await?;

    stored.ok_or_else(|| Error::Decode("inserted state vanished".into()))
  }

  async fn add_city(&self, city: City) -> Result<City> {
    let state_id = city.state.as_ref().and_then(|s| s.id);
    let name = city.name;

    let stored = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let state_id = link(&tx, "states", EntityKind::State, state_id)?;
        tx.execute(
          "INSERT INTO cities (name, state_id) VALUES (?1, ?2)",
          rusqlite::params![name, state_id],
        )?;
        let id = tx.last_insert_rowid();
        let stored = load_city(&tx, id)?;
        tx.commit()?;
        Ok(stored)
      })
      .await?;

    stored.ok_or_else(|| Error::Decode("inserted city vanished".into()))
  }
}

/// Confirm the referenced rows exist before an owner links to them.
pub(crate) fn check_city(conn: &Connection, id: Option<i64>) -> tokio_rusqlite::Result<Option<i64>> {
  link(conn, "cities", EntityKind::City, id)
}

pub(crate) fn check_roles(conn: &Connection, roles: &[Role]) -> tokio_rusqlite::Result<Vec<i64>> {
  roles
    .iter()
    .filter_map(|r| r.id)
    .map(|id| ensure_exists(conn, "roles", EntityKind::Role, id).map(|()| id))
    .collect()
}
