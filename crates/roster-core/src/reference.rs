//! Referenced records: countries, states, cities, and roles.
//!
//! These are linked to by persons, users, and addresses but never owned by
//! them. An owner's write only records the link; the referenced row itself is
//! never touched. Each level of the geographic chain (city → state → country)
//! is optional so a projection can stop at the first missing link.

use serde::{Deserialize, Serialize};

use crate::{
  limits,
  record::EntityKind,
  validate::{Rules, Violation},
};

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Country {
  pub id:   Option<i64>,
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
  pub id:      Option<i64>,
  pub name:    String,
  pub country: Option<Country>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct City {
  pub id:    Option<i64>,
  pub name:  String,
  pub state: Option<State>,
}

/// A named permission group. Roles exist as data only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Role {
  pub id:   Option<i64>,
  pub name: String,
}

fn validate_name(entity: EntityKind, name: &str) -> Result<(), Violation> {
  let rules = Rules::new(entity);
  rules.required(&limits::reference::NAME, Some(name))?;
  rules.max_len(&limits::reference::NAME, Some(name))
}

impl Country {
  pub fn validate(&self) -> Result<(), Violation> {
    validate_name(EntityKind::Country, &self.name)
  }
}

impl State {
  pub fn validate(&self) -> Result<(), Violation> {
    validate_name(EntityKind::State, &self.name)
  }
}

impl City {
  pub fn validate(&self) -> Result<(), Violation> {
    validate_name(EntityKind::City, &self.name)
  }
}

// ─── Projections ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryDto {
  pub id:   Option<i64>,
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateDto {
  pub id:      Option<i64>,
  pub name:    String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub country: Option<CountryDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityDto {
  pub id:    Option<i64>,
  pub name:  String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub state: Option<StateDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleDto {
  pub id:   Option<i64>,
  pub name: String,
}

impl From<&Country> for CountryDto {
  fn from(c: &Country) -> Self {
    Self { id: c.id, name: c.name.clone() }
  }
}

impl From<CountryDto> for Country {
  fn from(d: CountryDto) -> Self {
    Self { id: d.id, name: d.name }
  }
}

impl From<&State> for StateDto {
  fn from(s: &State) -> Self {
    Self {
      id:      s.id,
      name:    s.name.clone(),
      country: s.country.as_ref().map(CountryDto::from),
    }
  }
}

impl From<StateDto> for State {
  fn from(d: StateDto) -> Self {
    Self {
      id:      d.id,
      name:    d.name,
      country: d.country.map(Country::from),
    }
  }
}

impl From<&City> for CityDto {
  fn from(c: &City) -> Self {
    Self {
      id:    c.id,
      name:  c.name.clone(),
      state: c.state.as_ref().map(StateDto::from),
    }
  }
}

impl From<CityDto> for City {
  fn from(d: CityDto) -> Self {
    Self {
      id:    d.id,
      name:  d.name,
      state: d.state.map(State::from),
    }
  }
}

impl From<&Role> for RoleDto {
  fn from(r: &Role) -> Self {
    Self { id: r.id, name: r.name.clone() }
  }
}

impl From<RoleDto> for Role {
  fn from(d: RoleDto) -> Self {
    Self { id: d.id, name: d.name }
  }
}
