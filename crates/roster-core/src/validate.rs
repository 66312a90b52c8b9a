//! Field-level and cross-field validation rules.
//!
//! Each record type runs its checks in a fixed order through a [`Rules`]
//! value and stops at the first failure. A [`Violation`] names the rule and
//! its bound rather than carrying free text, so callers can localise it.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;

use crate::{cpf::Cpf, limits::FieldSpec, record::EntityKind};

// ─── Violation ───────────────────────────────────────────────────────────────

/// The kind of rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
  /// The field is absent or blank.
  Required,
  /// The field exceeds its declared maximum length.
  MaxLength(usize),
  /// The value is not one of the enumerated members.
  OneOf,
  /// The national ID failed its check-digit test.
  Checksum,
  /// The date lies after the reference day.
  NotInFuture,
}

impl Rule {
  fn suffix(self) -> &'static str {
    match self {
      Self::Required => "NOT_INFORMED",
      Self::MaxLength(_) => "OUT_OF_BOUND",
      Self::OneOf | Self::Checksum | Self::NotInFuture => "INVALID",
    }
  }

  pub fn bound(self) -> Option<usize> {
    match self {
      Self::MaxLength(max) => Some(max),
      _ => None,
    }
  }
}

/// The first rule a record failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
  pub entity: EntityKind,
  pub field:  &'static str,
  pub rule:   Rule,
}

impl Violation {
  pub fn new(entity: EntityKind, field: &'static str, rule: Rule) -> Self {
    Self { entity, field, rule }
  }

  /// Stable message key, e.g. `PERSON_FIRST_NAME_OUT_OF_BOUND`.
  pub fn key(&self) -> String {
    format!(
      "{}_{}_{}",
      self.entity.key_prefix(),
      self.field.to_ascii_uppercase(),
      self.rule.suffix()
    )
  }

  pub fn bound(&self) -> Option<usize> { self.rule.bound() }
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.bound() {
      Some(max) => write!(f, "{} (max {max})", self.key()),
      None => f.write_str(&self.key()),
    }
  }
}

impl std::error::Error for Violation {}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// `true` when the value is absent, empty, or whitespace only.
pub fn is_blank(value: Option<&str>) -> bool {
  value.is_none_or(|v| v.trim().is_empty())
}

/// Fail-fast rule evaluation for one record type.
#[derive(Debug, Clone, Copy)]
pub struct Rules {
  entity: EntityKind,
}

impl Rules {
  pub const fn new(entity: EntityKind) -> Self { Self { entity } }

  fn fail(&self, field: &'static str, rule: Rule) -> Result<(), Violation> {
    Err(Violation::new(self.entity, field, rule))
  }

  /// The field must be present and not blank.
  pub fn required(&self, spec: &FieldSpec, value: Option<&str>) -> Result<(), Violation> {
    if is_blank(value) {
      return self.fail(spec.name, Rule::Required);
    }
    Ok(())
  }

  /// A present value must not exceed the declared maximum length.
  pub fn max_len(&self, spec: &FieldSpec, value: Option<&str>) -> Result<(), Violation> {
    match value {
      Some(v) if v.chars().count() > spec.max_len => {
        self.fail(spec.name, Rule::MaxLength(spec.max_len))
      }
      _ => Ok(()),
    }
  }

  /// A non-blank value must parse as one of the members of `T`.
  pub fn member<T: FromStr>(
    &self,
    spec: &FieldSpec,
    value: Option<&str>,
  ) -> Result<(), Violation> {
    match value {
      Some(v) if !v.trim().is_empty() && T::from_str(v).is_err() => {
        self.fail(spec.name, Rule::OneOf)
      }
      _ => Ok(()),
    }
  }

  /// A present date must not be after `today`.
  pub fn not_after(
    &self,
    field: &'static str,
    value: Option<NaiveDate>,
    today: NaiveDate,
  ) -> Result<(), Violation> {
    match value {
      Some(date) if date > today => self.fail(field, Rule::NotInFuture),
      _ => Ok(()),
    }
  }

  /// Validate a national ID in place.
  ///
  /// A blank value is cleared to `None`. Anything else must pass the
  /// checksum and is replaced by its digits-only form.
  pub fn national_id(
    &self,
    spec: &FieldSpec,
    value: &mut Option<String>,
  ) -> Result<(), Violation> {
    if is_blank(value.as_deref()) {
      *value = None;
      return Ok(());
    }
    let raw = value.as_deref().unwrap_or_default();
    match Cpf::parse(raw) {
      Ok(cpf) => {
        *value = Some(cpf.into_string());
        Ok(())
      }
      Err(_) => self.fail(spec.name, Rule::Checksum),
    }
  }
}
