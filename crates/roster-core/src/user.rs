//! Users: a person-like record with credentials and roles.
//!
//! A user's password only ever travels inward. The plain value arrives on
//! [`User::new_password`], is hashed by [`Record::seal`], and is stored as an
//! argon2 PHC string. Projections never carry either form.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  address::{Address, AddressDto},
  audit::{Actor, Audit},
  cpf, credentials,
  filter::{Filter, Predicate, Predicates, RangeKind},
  limits::user as fields,
  person::Sex,
  record::{EntityKind, Record},
  reference::{Role, RoleDto},
  validate::{Rule, Rules, Violation, is_blank},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
  pub id:            Option<i64>,
  pub name:          Option<String>,
  pub username:      String,
  /// Argon2 PHC string. Empty until the first seal.
  pub password_hash: String,
  /// Plain password supplied on this write, if any.
  pub new_password:  Option<String>,
  pub email:         Option<String>,
  pub cpf:           Option<String>,
  pub birthdate:     Option<NaiveDate>,
  pub sex:           Option<String>,
  pub address:       Option<Address>,
  /// Referenced; only the links are written.
  pub roles:         Vec<Role>,
  pub audit:         Audit,
}

impl Record for User {
  const KIND: EntityKind = EntityKind::User;

  type Filter = UserFilter;
  type Projection = UserDto;

  fn id(&self) -> Option<i64> { self.id }

  fn set_id(&mut self, id: Option<i64>) { self.id = id; }

  fn audit(&self) -> &Audit { &self.audit }

  fn audit_mut(&mut self) -> &mut Audit { &mut self.audit }

  fn validate(&mut self, today: NaiveDate) -> Result<(), Violation> {
    let rules = Rules::new(EntityKind::User);
    rules.max_len(&fields::NAME, self.name.as_deref())?;
    rules.required(&fields::USERNAME, Some(&self.username))?;
    rules.max_len(&fields::USERNAME, Some(&self.username))?;

    // An inherited hash satisfies the requirement on update.
    if is_blank(self.new_password.as_deref()) {
      if self.password_hash.is_empty() {
        return Err(Violation::new(EntityKind::User, fields::PASSWORD.name, Rule::Required));
      }
      self.new_password = None;
    }
    rules.max_len(&fields::PASSWORD, self.new_password.as_deref())?;

    rules.member::<Sex>(&fields::SEX, self.sex.as_deref())?;
    rules.max_len(&fields::EMAIL, self.email.as_deref())?;
    rules.national_id(&fields::CPF, &mut self.cpf)?;
    match self.address.as_mut() {
      Some(address) => address.validate(today),
      None => Ok(()),
    }
  }

  fn reset(&mut self) {
    self.id = None;
    self.audit = Audit::default();
    self.password_hash.clear();
    if let Some(address) = self.address.as_mut() {
      address.reset();
    }
  }

  fn inherit(&mut self, stored: &Self) {
    self.audit = stored.audit.clone();
    self.password_hash = stored.password_hash.clone();
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

  fn seal(&mut self) -> crate::Result<()> {
    if let Some(password) = self.new_password.take() {
      self.password_hash = credentials::hash_password(&password)?;
    }
    Ok(())
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
pub struct UserDto {
  pub id:        Option<i64>,
  pub name:      Option<String>,
  pub username:  String,
  /// Accepted on input, never emitted.
  #[serde(skip_serializing)]
  pub password:  Option<String>,
  pub email:     Option<String>,
  pub cpf:       Option<String>,
  pub birthdate: Option<NaiveDate>,
  pub sex:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address:   Option<AddressDto>,
  pub roles:     Vec<RoleDto>,
  #[serde(flatten)]
  pub audit:     Audit,
}

impl From<&User> for UserDto {
  fn from(u: &User) -> Self {
    Self {
      id:        u.id,
      name:      u.name.clone(),
      username:  u.username.clone(),
      password:  None,
      email:     u.email.clone(),
      cpf:       u.cpf.clone(),
      birthdate: u.birthdate,
      sex:       u.sex.clone(),
      address:   u.address.as_ref().map(AddressDto::from),
      roles:     u.roles.iter().map(RoleDto::from).collect(),
      audit:     u.audit.clone(),
    }
  }
}

impl From<UserDto> for User {
  fn from(d: UserDto) -> Self {
    Self {
      id:            d.id,
      name:          d.name,
      username:      d.username,
      password_hash: String::new(),
      new_password:  d.password.filter(|p| !p.trim().is_empty()),
      email:         d.email,
      cpf:           d.cpf,
      birthdate:     d.birthdate,
      sex:           d.sex,
      address:       d.address.map(Address::from),
      roles:         d.roles.into_iter().map(Role::from).collect(),
      audit:         d.audit,
    }
  }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFilter {
  pub id:         Option<i64>,
  pub name:       Option<String>,
  pub username:   Option<String>,
  pub email:      Option<String>,
  pub cpf:        Option<String>,
  /// One of the [`Sex`] codes; anything else is rejected.
  pub sex:        Option<String>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
}

impl Filter for UserFilter {
  const ENTITY: EntityKind = EntityKind::User;
  const SORTABLE: &'static [&'static str] =
    &["id", "name", "username", "email", "birthdate", "created_at", "updated_at"];

  fn predicates(&self) -> Vec<Predicate> {
    let cpf = self.cpf.as_deref().map(cpf::digits_only);
    Predicates::new()
      .equals_int("id", self.id)
      .contains(&["name"], self.name.as_deref())
      .contains(&["username"], self.username.as_deref())
      .contains(&["email"], self.email.as_deref())
      .contains(&["cpf"], cpf.as_deref())
      .equals_text("sex", self.sex.as_deref().map(str::trim))
      .between("birthdate", RangeKind::Date, self.start_date, self.end_date)
      .build()
  }

  fn by_name(name: &str) -> Self { Self { name: Some(name.to_owned()), ..Self::default() } }

  fn check(&self) -> Result<(), Violation> {
    Rules::new(Self::ENTITY).member::<Sex>(&fields::SEX, self.sex.as_deref())
  }
}
