//! The [`Record`] trait shared by every audited, store-persisted entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{Display, IntoStaticStr};

use crate::{
  audit::{Actor, Audit},
  filter::Filter,
  validate::Violation,
};

/// Every entity kind the service knows about.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  Person,
  User,
  Address,
  Country,
  State,
  City,
  Role,
}

impl EntityKind {
  /// Prefix used in violation message keys.
  pub fn key_prefix(self) -> &'static str {
    match self {
      Self::Person => "PERSON",
      Self::User => "USER",
      Self::Address => "ADDRESS",
      Self::Country => "COUNTRY",
      Self::State => "STATE",
      Self::City => "CITY",
      Self::Role => "ROLE",
    }
  }
}

/// A record with a store-assigned identity, audit metadata, a validation
/// routine, an outward projection, and a search filter.
pub trait Record: Clone + Send + Sync + 'static {
  const KIND: EntityKind;

  /// The external read/write shape of the record.
  type Projection: for<'a> From<&'a Self>
    + Into<Self>
    + Serialize
    + DeserializeOwned
    + Send
    + 'static;

  /// The sparse search object accepted for this record type.
  type Filter: Filter + DeserializeOwned + Default + Send + Sync + 'static;

  fn id(&self) -> Option<i64>;

  fn set_id(&mut self, id: Option<i64>);

  fn audit(&self) -> &Audit;

  fn audit_mut(&mut self) -> &mut Audit;

  /// Run this record's rules in declared order, stopping at the first
  /// failure. Normalises fields (e.g. the national ID) in place on success.
  fn validate(&mut self, today: NaiveDate) -> Result<(), Violation>;

  /// Drop identity and audit state a client supplied on create.
  fn reset(&mut self) {
    self.set_id(None);
    *self.audit_mut() = Audit::default();
  }

  /// Carry over the state a client may not change from the stored version.
  fn inherit(&mut self, stored: &Self) {
    *self.audit_mut() = stored.audit().clone();
  }

  /// Derive stored-only state just before persistence.
  fn seal(&mut self) -> crate::Result<()> { Ok(()) }

  /// Stamp this record and any owned sub-record.
  fn stamp(&mut self, actor: &Actor, now: DateTime<Utc>) {
    self.audit_mut().stamp(actor, now);
  }
}
