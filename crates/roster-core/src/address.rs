//! Addresses, owned by a person or user or managed on their own.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::{
  audit::Audit,
  filter::{Filter, Predicate, Predicates, RangeKind},
  limits::address as fields,
  record::{EntityKind, Record},
  reference::{City, CityDto},
  validate::{Rules, Violation, is_blank},
};

/// The kind of public place a street name belongs to.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StreetType {
  Rua,
  Avenida,
  Travessa,
  Alameda,
  Praca,
  Rodovia,
  Estrada,
}

impl StreetType {
  /// Human-readable prefix used in formatted addresses.
  pub fn description(self) -> &'static str {
    match self {
      Self::Rua => "Rua",
      Self::Avenida => "Avenida",
      Self::Travessa => "Travessa",
      Self::Alameda => "Alameda",
      Self::Praca => "Praça",
      Self::Rodovia => "Rodovia",
      Self::Estrada => "Estrada",
    }
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
  pub id:                Option<i64>,
  /// A [`StreetType`] code; checked on validation.
  pub street_type:       Option<String>,
  pub name:              String,
  pub number:            Option<String>,
  pub cep:               Option<String>,
  pub zip_code:          Option<String>,
  pub neighborhood:      Option<String>,
  pub coordination:      Option<String>,
  pub referential_point: Option<String>,
  /// Referenced; never written through an address.
  pub city:              Option<City>,
  pub audit:             Audit,
}

impl Address {
  /// Compose a display string, most specific segment first:
  /// `Rua Augusta, 1500. São Paulo - São Paulo - Brasil`.
  ///
  /// The locality part walks city → state → country and stops at the first
  /// missing link. Every other segment is included only when present.
  pub fn formatted(&self) -> String {
    let mut out = String::new();
    if let Some(city) = &self.city {
      out.push_str(&city.name);
      if let Some(state) = &city.state {
        out.push_str(" - ");
        out.push_str(&state.name);
        if let Some(country) = &state.country {
          out.push_str(" - ");
          out.push_str(&country.name);
        }
      }
    }

    if let Some(number) = self.number.as_deref().filter(|n| !n.trim().is_empty()) {
      out = prepend(number, ". ", out);
    }
    if !self.name.trim().is_empty() {
      out = prepend(&self.name, ", ", out);
    }
    let kind = self.street_type.as_deref().and_then(|s| s.parse::<StreetType>().ok());
    if let Some(kind) = kind {
      out = prepend(kind.description(), " ", out);
    }
    out
  }
}

fn prepend(head: &str, sep: &str, tail: String) -> String {
  if tail.is_empty() { head.to_owned() } else { format!("{head}{sep}{tail}") }
}

impl Record for Address {
  const KIND: EntityKind = EntityKind::Address;

  type Filter = AddressFilter;
  type Projection = AddressDto;

  fn id(&self) -> Option<i64> { self.id }

  fn set_id(&mut self, id: Option<i64>) { self.id = id; }

  fn audit(&self) -> &Audit { &self.audit }

  fn audit_mut(&mut self) -> &mut Audit { &mut self.audit }

  fn validate(&mut self, _today: NaiveDate) -> Result<(), Violation> {
    let rules = Rules::new(EntityKind::Address);
    rules.required(&fields::NAME, Some(&self.name))?;
    rules.max_len(&fields::NAME, Some(&self.name))?;
    if is_blank(self.street_type.as_deref()) {
      self.street_type = None;
    }
    rules.member::<StreetType>(&fields::STREET_TYPE, self.street_type.as_deref())?;
    rules.max_len(&fields::NUMBER, self.number.as_deref())?;
    rules.max_len(&fields::CEP, self.cep.as_deref())?;
    rules.max_len(&fields::ZIP_CODE, self.zip_code.as_deref())?;
    rules.max_len(&fields::NEIGHBORHOOD, self.neighborhood.as_deref())?;
    rules.max_len(&fields::COORDINATION, self.coordination.as_deref())?;
    rules.max_len(&fields::REFERENTIAL_POINT, self.referential_point.as_deref())
  }
}

// ─── Projection ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressDto {
  pub id:                Option<i64>,
  pub street_type:       Option<String>,
  pub name:              String,
  pub number:            Option<String>,
  pub cep:               Option<String>,
  pub zip_code:          Option<String>,
  pub neighborhood:      Option<String>,
  pub coordination:      Option<String>,
  pub referential_point: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub city:              Option<CityDto>,
  /// Derived on projection; ignored when converting back.
  pub fmt_address:       Option<String>,
  #[serde(flatten)]
  pub audit:             Audit,
}

impl From<&Address> for AddressDto {
  fn from(a: &Address) -> Self {
    Self {
      id:                a.id,
      street_type:       a.street_type.clone(),
      name:              a.name.clone(),
      number:            a.number.clone(),
      cep:               a.cep.clone(),
      zip_code:          a.zip_code.clone(),
      neighborhood:      a.neighborhood.clone(),
      coordination:      a.coordination.clone(),
      referential_point: a.referential_point.clone(),
      city:              a.city.as_ref().map(CityDto::from),
      fmt_address:       Some(a.formatted()),
      audit:             a.audit.clone(),
    }
  }
}

impl From<AddressDto> for Address {
  fn from(d: AddressDto) -> Self {
    Self {
      id:                d.id,
      street_type:       d.street_type,
      name:              d.name,
      number:            d.number,
      cep:               d.cep,
      zip_code:          d.zip_code,
      neighborhood:      d.neighborhood,
      coordination:      d.coordination,
      referential_point: d.referential_point,
      city:              d.city.map(City::from),
      audit:             d.audit,
    }
  }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressFilter {
  pub id:           Option<i64>,
  pub name:         Option<String>,
  pub neighborhood: Option<String>,
  pub zip_code:     Option<String>,
  pub cep:          Option<String>,
  /// A [`StreetType`] code; anything else is rejected.
  pub street_type:  Option<String>,
  pub city_id:      Option<i64>,
  /// Range over `created_at`; both ends must be set.
  pub start_date:   Option<NaiveDate>,
  pub end_date:     Option<NaiveDate>,
}

impl Filter for AddressFilter {
  const ENTITY: EntityKind = EntityKind::Address;
  const SORTABLE: &'static [&'static str] =
    &["id", "name", "neighborhood", "zip_code", "cep", "created_at", "updated_at"];

  fn predicates(&self) -> Vec<Predicate> {
    Predicates::new()
      .equals_int("id", self.id)
      .contains(&["name"], self.name.as_deref())
      .contains(&["neighborhood"], self.neighborhood.as_deref())
      .contains(&["zip_code"], self.zip_code.as_deref())
      .contains(&["cep"], self.cep.as_deref())
      .equals_text("street_type", self.street_type.as_deref().map(str::trim))
      .equals_int("city_id", self.city_id)
      .between("created_at", RangeKind::Timestamp, self.start_date, self.end_date)
      .build()
  }

  fn by_name(name: &str) -> Self { Self { name: Some(name.to_owned()), ..Self::default() } }

  fn check(&self) -> Result<(), Violation> {
    Rules::new(Self::ENTITY)
      .member::<StreetType>(&fields::STREET_TYPE, self.street_type.as_deref())
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;
  use crate::reference::{Country, State};

  fn sao_paulo() -> City {
    City {
      id:    Some(10),
      name:  "São Paulo".into(),
      state: Some(State {
        id:      Some(20),
        name:    "SP".into(),
        country: Some(Country { id: Some(30), name: "Brasil".into() }),
      }),
    }
  }

  fn augusta() -> Address {
    Address {
      street_type: Some("rua".into()),
      name: "Augusta".into(),
      number: Some("1500".into()),
      city: Some(sao_paulo()),
      ..Default::default()
    }
  }

  #[test]
  fn formats_full_chain() {
    assert_eq!(augusta().formatted(), "Rua Augusta, 1500. São Paulo - SP - Brasil");
  }

  #[test]
  fn formatting_stops_at_city_without_state() {
    let mut address = augusta();
    if let Some(city) = address.city.as_mut() {
      city.state = None;
    }
    assert_eq!(address.formatted(), "Rua Augusta, 1500. São Paulo");
  }

  #[test]
  fn formatting_stops_at_state_without_country() {
    let mut address = augusta();
    if let Some(state) = address.city.as_mut().and_then(|c| c.state.as_mut()) {
      state.country = None;
    }
    assert_eq!(address.formatted(), "Rua Augusta, 1500. São Paulo - SP");
  }

  #[test]
  fn formatting_without_city_has_no_dangling_separator() {
    let address = Address { city: None, number: None, ..augusta() };
    assert_eq!(address.formatted(), "Rua Augusta");
  }

  #[test]
  fn projection_adds_fmt_address_and_back_conversion_drops_it() {
    let address = augusta();
    let dto = AddressDto::from(&address);
    assert_eq!(
      dto.fmt_address.as_deref(),
      Some("Rua Augusta, 1500. São Paulo - SP - Brasil")
    );
    let state = dto.city.as_ref().and_then(|c| c.state.as_ref());
    assert_eq!(state.map(|s| s.name.as_str()), Some("SP"));

    let back = Address::from(dto);
    assert_eq!(back, address);
  }

  #[test]
  fn validation_order_and_bounds() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let mut blank = Address::default();
    assert_eq!(blank.validate(today).unwrap_err().key(), "ADDRESS_NAME_NOT_INFORMED");

    let mut long_number = Address { number: Some("1234567890".into()), ..augusta() };
    let err = long_number.validate(today).unwrap_err();
    assert_eq!(err.key(), "ADDRESS_NUMBER_OUT_OF_BOUND");
    assert_eq!(err.bound(), Some(9));

    assert!(augusta().validate(today).is_ok());
  }

  #[test]
  fn unknown_street_type_is_rejected() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let mut boulevard = Address { street_type: Some("boulevard".into()), ..augusta() };
    let err = boulevard.validate(today).unwrap_err();
    assert_eq!(err.key(), "ADDRESS_STREET_TYPE_INVALID");

    let mut blank = Address { street_type: Some("  ".into()), ..augusta() };
    assert!(blank.validate(today).is_ok());
    assert_eq!(blank.street_type, None);
  }

  #[test]
  fn filter_rejects_unknown_street_type() {
    let filter = AddressFilter { street_type: Some("boulevard".into()), ..Default::default() };
    assert_eq!(filter.check().unwrap_err().key(), "ADDRESS_STREET_TYPE_INVALID");

    let filter = AddressFilter { street_type: Some("avenida".into()), ..Default::default() };
    assert!(filter.check().is_ok());
  }

  #[test]
  fn street_types_round_trip_through_strings() {
    for kind in StreetType::iter() {
      assert_eq!(StreetType::from_str(kind.as_str()).unwrap(), kind);
    }
    assert_eq!(StreetType::Praca.description(), "Praça");
  }
}
