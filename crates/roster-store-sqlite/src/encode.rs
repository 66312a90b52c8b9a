//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with millisecond precision and a
//! `Z` suffix so SQLite's `date()` can read them. Dates are `YYYY-MM-DD`.
//! Enumerations are stored as their lowercase / single-letter codes.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use roster_core::{
  address::{Address, StreetType},
  audit::Audit,
  person::Person,
  reference::{City, Country, Role},
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_ts(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_ts(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── StreetType ──────────────────────────────────────────────────────────────

pub fn decode_street_type(s: &str) -> Result<StreetType> {
  StreetType::from_str(s).map_err(|_| Error::Decode(format!("unknown street type: {s:?}")))
}

// ─── Audit ───────────────────────────────────────────────────────────────────

/// The four audit columns, in table order.
#[derive(Debug, Clone, Default)]
pub struct RawAudit {
  pub created_at: Option<String>,
  pub created_by: Option<String>,
  pub updated_at: Option<String>,
  pub updated_by: Option<String>,
}

impl RawAudit {
  pub fn encode(audit: &Audit) -> Self {
    Self {
      created_at: audit.created_at.map(encode_ts),
      created_by: audit.created_by.clone(),
      updated_at: audit.updated_at.map(encode_ts),
      updated_by: audit.updated_by.clone(),
    }
  }

  pub fn into_audit(self) -> Result<Audit> {
    Ok(Audit {
      created_at: self.created_at.as_deref().map(decode_ts).transpose()?,
      created_by: self.created_by,
      updated_at: self.updated_at.as_deref().map(decode_ts).transpose()?,
      updated_by: self.updated_by,
    })
  }
}

// ─── Raw rows ────────────────────────────────────────────────────────────────
//
// Rows are read into these inside `Connection::call` and decoded outside it.
// Referenced records carry no encoded columns and are built directly.

#[derive(Debug, Clone)]
pub struct RawAddress {
  pub id:                i64,
  pub street_type:       Option<String>,
  pub name:              String,
  pub number:            Option<String>,
  pub cep:               Option<String>,
  pub zip_code:          Option<String>,
  pub neighborhood:      Option<String>,
  pub coordination:      Option<String>,
  pub referential_point: Option<String>,
  pub city:              Option<City>,
  pub audit:             RawAudit,
}

impl RawAddress {
  pub fn into_address(self) -> Result<Address> {
    Ok(Address {
      id:                Some(self.id),
      street_type:       self
        .street_type
        .as_deref()
        .map(decode_street_type)
        .transpose()?
        .map(|t| t.as_str().to_owned()),
      name:              self.name,
      number:            self.number,
      cep:               self.cep,
      zip_code:          self.zip_code,
      neighborhood:      self.neighborhood,
      coordination:      self.coordination,
      referential_point: self.referential_point,
      city:              self.city,
      audit:             self.audit.into_audit()?,
    })
  }
}

#[derive(Debug, Clone)]
pub struct RawPerson {
  pub id:            i64,
  pub first_name:    String,
  pub last_name:     String,
  pub nick_name:     Option<String>,
  pub birthdate:     Option<String>,
  pub sex:           Option<String>,
  pub email:         Option<String>,
  pub cpf:           Option<String>,
  pub birth_city:    Option<City>,
  pub birth_country: Option<Country>,
  pub address:       Option<RawAddress>,
  pub description:   Option<String>,
  pub audit:         RawAudit,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:            Some(self.id),
      first_name:    self.first_name,
      last_name:     self.last_name,
      nick_name:     self.nick_name,
      birthdate:     self.birthdate.as_deref().map(decode_date).transpose()?,
      sex:           self.sex,
      email:         self.email,
      cpf:           self.cpf,
      birth_city:    self.birth_city,
      birth_country: self.birth_country,
      address:       self.address.map(RawAddress::into_address).transpose()?,
      description:   self.description,
      audit:         self.audit.into_audit()?,
    })
  }
}

#[derive(Debug, Clone)]
pub struct RawUser {
  pub id:            i64,
  pub name:          Option<String>,
  pub username:      String,
  pub password_hash: String,
  pub email:         Option<String>,
  pub cpf:           Option<String>,
  pub birthdate:     Option<String>,
  pub sex:           Option<String>,
  pub address:       Option<RawAddress>,
  pub roles:         Vec<Role>,
  pub audit:         RawAudit,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            Some(self.id),
      name:          self.name,
      username:      self.username,
      password_hash: self.password_hash,
      new_password:  None,
      email:         self.email,
      cpf:           self.cpf,
      birthdate:     self.birthdate.as_deref().map(decode_date).transpose()?,
      sex:           self.sex,
      address:       self.address.map(RawAddress::into_address).transpose()?,
      roles:         self.roles,
      audit:         self.audit.into_audit()?,
    })
  }
}
