//! People: the primary record type.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::{
  address::{Address, AddressDto},
  audit::{Actor, Audit},
  cpf,
  filter::{Filter, Predicate, Predicates, RangeKind},
  limits::person as fields,
  record::{EntityKind, Record},
  reference::{City, CityDto, Country, CountryDto},
  validate::{Rules, Violation},
};

/// Stored as a single letter.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
  EnumIter,
)]
pub enum Sex {
  #[serde(rename = "M")]
  #[strum(serialize = "M")]
  Male,
  #[serde(rename = "F")]
  #[strum(serialize = "F")]
  Female,
  #[serde(rename = "O")]
  #[strum(serialize = "O")]
  Other,
  #[serde(rename = "N")]
  #[strum(serialize = "N")]
  NotInformed,
}

impl Sex {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
  pub id:            Option<i64>,
  pub first_name:    String,
  pub last_name:     String,
  pub nick_name:     Option<String>,
  pub birthdate:     Option<NaiveDate>,
  /// One of the [`Sex`] codes; checked on validation.
  pub sex:           Option<String>,
  pub email:         Option<String>,
  /// Digits only once validated.
  pub cpf:           Option<String>,
  pub birth_city:    Option<City>,
  pub birth_country: Option<Country>,
  /// Owned: written, replaced, and deleted along with the person.
  pub address:       Option<Address>,
  pub description:   Option<String>,
  pub audit:         Audit,
}

impl Person {
  pub fn full_name(&self) -> String {
    match (self.first_name.trim(), self.last_name.trim()) {
      ("", last) => last.to_owned(),
      (first, "") => first.to_owned(),
      (first, last) => format!("{first} {last}"),
    }
  }
}

impl Record for Person {
  const KIND: EntityKind = EntityKind::Person;

  type Filter = PersonFilter;
  type Projection = PersonDto;

  fn id(&self) -> Option<i64> { self.id }

  fn set_id(&mut self, id: Option<i64>) { self.id = id; }

  fn audit(&self) -> &Audit { &self.audit }

  fn audit_mut(&mut self) -> &mut Audit { &mut self.audit }

  fn validate(&mut self, today: NaiveDate) -> Result<(), Violation> {
    let rules = Rules::new(EntityKind::Person);
    rules.required(&fields::FIRST_NAME, Some(&self.first_name))?;
    rules.required(&fields::LAST_NAME, Some(&self.last_name))?;
    rules.max_len(&fields::FIRST_NAME, Some(&self.first_name))?;
    rules.max_len(&fields::LAST_NAME, Some(&self.last_name))?;
    rules.max_len(&fields::DESCRIPTION, self.description.as_deref())?;
    rules.max_len(&fields::NICK_NAME, self.nick_name.as_deref())?;
    rules.max_len(&fields::EMAIL, self.email.as_deref())?;
    rules.member::<Sex>(&fields::SEX, self.sex.as_deref())?;
    rules.national_id(&fields::CPF, &mut self.cpf)?;
    rules.not_after("birthdate", self.birthdate, today)?;
    match self.address.as_mut() {
      Some(address) => address.validate(today),
      None => Ok(()),
    }
  }

  fn reset(&mut self) {
    self.id = None;
    self.audit = Audit::default();
    if let Some(address) = self.address.as_mut() {
      address.reset();
    }
  }

  fn inherit(&mut self, stored: &Self) {
    self.audit = stored.audit.clone();
    if let Some(address) = self.address.as_mut() {
      match stored.address.as_ref() {
        Some(previous) => {
          address.id = previous.id;
          address.audit = previous.audit.clone();
        }
        None => address.reset(),
      }
    }
  }

  fn stamp(&mut self, actor: &Actor, now: DateTime<Utc>) {
    self.audit.stamp(actor, now);
    if let Some(address) = self.address.as_mut() {
      address.stamp(actor, now);
    }
  }
}

// ─── Projection ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonDto {
  pub id:            Option<i64>,
  pub first_name:    String,
  pub last_name:     String,
  /// Derived; ignored on input.
  pub full_name:     Option<String>,
  pub nick_name:     Option<String>,
  pub birthdate:     Option<NaiveDate>,
  pub sex:           Option<String>,
  pub email:         Option<String>,
  pub cpf:           Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub birth_city:    Option<CityDto>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub birth_country: Option<CountryDto>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address:       Option<AddressDto>,
  pub description:   Option<String>,
  #[serde(flatten)]
  pub audit:         Audit,
}

impl From<&Person> for PersonDto {
  fn from(p: &Person) -> Self {
    Self {
      id:            p.id,
      first_name:    p.first_name.clone(),
      last_name:     p.last_name.clone(),
      full_name:     Some(p.full_name()),
      nick_name:     p.nick_name.clone(),
      birthdate:     p.birthdate,
      sex:           p.sex.clone(),
      email:         p.email.clone(),
      cpf:           p.cpf.clone(),
      birth_city:    p.birth_city.as_ref().map(CityDto::from),
      birth_country: p.birth_country.as_ref().map(CountryDto::from),
      address:       p.address.as_ref().map(AddressDto::from),
      description:   p.description.clone(),
      audit:         p.audit.clone(),
    }
  }
}

impl From<PersonDto> for Person {
  fn from(d: PersonDto) -> Self {
    Self {
      id:            d.id,
      first_name:    d.first_name,
      last_name:     d.last_name,
      nick_name:     d.nick_name,
      birthdate:     d.birthdate,
      sex:           d.sex,
      email:         d.email,
      cpf:           d.cpf,
      birth_city:    d.birth_city.map(City::from),
      birth_country: d.birth_country.map(Country::from),
      address:       d.address.map(Address::from),
      description:   d.description,
      audit:         d.audit,
    }
  }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonFilter {
  pub id:               Option<i64>,
  /// Matches either first or last name.
  pub name:             Option<String>,
  pub nick_name:        Option<String>,
  pub email:            Option<String>,
  /// Substring over digits; punctuation is ignored.
  pub cpf:              Option<String>,
  /// One of the [`Sex`] codes; anything else is rejected.
  pub sex:              Option<String>,
  pub description:      Option<String>,
  pub birth_city_id:    Option<i64>,
  pub birth_country_id: Option<i64>,
  /// Birthdate range; both ends must be set.
  pub start_date:       Option<NaiveDate>,
  pub end_date:         Option<NaiveDate>,
}

impl Filter for PersonFilter {
  const ENTITY: EntityKind = EntityKind::Person;
  const SORTABLE: &'static [&'static str] = &[
    "id",
    "first_name",
    "last_name",
    "nick_name",
    "email",
    "birthdate",
    "created_at",
    "updated_at",
  ];

  fn predicates(&self) -> Vec<Predicate> {
    let cpf = self.cpf.as_deref().map(cpf::digits_only);
    Predicates::new()
      .equals_int("id", self.id)
      .contains(&["first_name", "last_name"], self.name.as_deref())
      .contains(&["nick_name"], self.nick_name.as_deref())
      .contains(&["email"], self.email.as_deref())
      .contains(&["cpf"], cpf.as_deref())
      .equals_text("sex", self.sex.as_deref().map(str::trim))
      .contains(&["description"], self.description.as_deref())
      .equals_int("birth_city_id", self.birth_city_id)
      .equals_int("birth_country_id", self.birth_country_id)
      .between("birthdate", RangeKind::Date, self.start_date, self.end_date)
      .build()
  }

  fn by_name(name: &str) -> Self { Self { name: Some(name.to_owned()), ..Self::default() } }

  fn check(&self) -> Result<(), Violation> {
    Rules::new(Self::ENTITY).member::<Sex>(&fields::SEX, self.sex.as_deref())
  }
}
