//! Compilation of sparse filter objects into query plans.
//!
//! A filter is a struct where every field is optional. [`compile`] turns it,
//! together with the caller's paging and sorting parameters, into a
//! [`QueryPlan`]: a conjunction of predicates, a 0-based page, and a sort spec
//! whose column is always drawn from the entity's allow-list.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  record::EntityKind,
  validate::{Rule, Violation},
};

pub const DEFAULT_ROWS_PER_PAGE: u32 = 10;
pub const MAX_ROWS_PER_PAGE: u32 = 100;
pub const DEFAULT_SORT_COLUMN: &str = "id";

// ─── Caller parameters ───────────────────────────────────────────────────────

/// Paging and sorting as sent by a caller. `current_page` is 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageParams {
  pub current_page:  u32,
  pub rows_per_page: u32,
  pub sort_column:   Option<String>,
  /// `"asc"` or `"desc"`; anything else sorts ascending.
  pub sort:          Option<String>,
}

// ─── Query plan ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  #[default]
  Asc,
  Desc,
}

impl Direction {
  pub fn parse(raw: Option<&str>) -> Self {
    match raw {
      Some(s) if s.trim().eq_ignore_ascii_case("desc") => Self::Desc,
      _ => Self::Asc,
    }
  }

  pub fn as_sql(self) -> &'static str {
    match self {
      Self::Asc => "ASC",
      Self::Desc => "DESC",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
  /// Always one of the entity's sortable columns.
  pub column:    &'static str,
  pub direction: Direction,
}

/// A normalised, 0-based page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub index: u32,
  pub size:  u32,
}

impl PageRequest {
  pub fn offset(&self) -> u64 { u64::from(self.index) * u64::from(self.size) }
}

/// How a ranged column stores its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
  /// `YYYY-MM-DD`.
  Date,
  /// RFC 3339; compared on its date part.
  Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
  Integer(i64),
  Text(String),
}

/// One conjunct of a query plan. Column names are static identifiers chosen
/// by the filter implementation, never caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
  /// Case-insensitive substring match against any of `columns`.
  Contains {
    columns: &'static [&'static str],
    needle:  String,
  },
  /// Exact match.
  Equals { column: &'static str, value: Value },
  /// Inclusive range.
  Between {
    column: &'static str,
    kind:   RangeKind,
    start:  NaiveDate,
    end:    NaiveDate,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
  pub predicates: Vec<Predicate>,
  pub page:       PageRequest,
  pub sort:       Sort,
}

// ─── Filter trait ────────────────────────────────────────────────────────────

/// A sparse search object for one entity type.
pub trait Filter {
  const ENTITY: EntityKind;

  /// Columns a caller may sort by. Must include [`DEFAULT_SORT_COLUMN`].
  const SORTABLE: &'static [&'static str];

  /// The predicates for every field that is set.
  fn predicates(&self) -> Vec<Predicate>;

  /// A filter on the entity's name field alone.
  fn by_name(name: &str) -> Self
  where
    Self: Sized;

  /// Reject set fields whose value can never match, such as an unknown
  /// enumerated code.
  fn check(&self) -> Result<(), Violation> { Ok(()) }
}

/// Accumulates predicates, skipping unset and empty fields.
#[derive(Debug, Default)]
pub struct Predicates(Vec<Predicate>);

impl Predicates {
  pub fn new() -> Self { Self::default() }

  pub fn contains(
    mut self,
    columns: &'static [&'static str],
    value: Option<&str>,
  ) -> Self {
    if let Some(needle) = value.filter(|v| !v.is_empty()) {
      self.0.push(Predicate::Contains { columns, needle: needle.to_owned() });
    }
    self
  }

  pub fn equals_text(mut self, column: &'static str, value: Option<&str>) -> Self {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
      self.0.push(Predicate::Equals { column, value: Value::Text(v.to_owned()) });
    }
    self
  }

  pub fn equals_int(mut self, column: &'static str, value: Option<i64>) -> Self {
    if let Some(v) = value {
      self.0.push(Predicate::Equals { column, value: Value::Integer(v) });
    }
    self
  }

  /// Only activates when both ends are present.
  pub fn between(
    mut self,
    column: &'static str,
    kind: RangeKind,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
  ) -> Self {
    if let (Some(start), Some(end)) = (start, end) {
      self.0.push(Predicate::Between { column, kind, start, end });
    }
    self
  }

  pub fn build(self) -> Vec<Predicate> { self.0 }
}

// ─── Compilation ─────────────────────────────────────────────────────────────

/// Compile `filter` and `page` into a plan for the record store.
///
/// The filter's own [`Filter::check`] runs first. Page 0 and page 1 both
/// map to index 0. An empty sort column falls back to
/// [`DEFAULT_SORT_COLUMN`]; a column outside `F::SORTABLE` is rejected.
pub fn compile<F: Filter>(filter: &F, page: &PageParams) -> Result<QueryPlan, Violation> {
  filter.check()?;

  let column = match page.sort_column.as_deref().map(str::trim) {
    None | Some("") => DEFAULT_SORT_COLUMN,
    Some(requested) => F::SORTABLE
      .iter()
      .copied()
      .find(|c| *c == requested)
      .ok_or_else(|| Violation::new(F::ENTITY, "sort_column", Rule::OneOf))?,
  };

  let size = match page.rows_per_page {
    0 => DEFAULT_ROWS_PER_PAGE,
    n => n.min(MAX_ROWS_PER_PAGE),
  };

  Ok(QueryPlan {
    predicates: filter.predicates(),
    page:       PageRequest { index: page.current_page.saturating_sub(1), size },
    sort:       Sort { column, direction: Direction::parse(page.sort.as_deref()) },
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::person::PersonFilter;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn empty_filter_page_zero() {
    let plan = compile(&PersonFilter::default(), &PageParams::default()).unwrap();
    assert!(plan.predicates.is_empty());
    assert_eq!(plan.page.index, 0);
    assert_eq!(plan.page.size, DEFAULT_ROWS_PER_PAGE);
    assert_eq!(plan.sort, Sort { column: "id", direction: Direction::Asc });
  }

  #[test]
  fn pages_zero_and_one_are_the_same_page() {
    let at = |current_page| {
      compile(
        &PersonFilter::default(),
        &PageParams { current_page, rows_per_page: 20, ..Default::default() },
      )
      .unwrap()
      .page
    };
    assert_eq!(at(0), at(1));
    assert_eq!(at(3), PageRequest { index: 2, size: 20 });
    assert_eq!(at(3).offset(), 40);
  }

  #[test]
  fn rows_per_page_is_clamped() {
    let plan = compile(
      &PersonFilter::default(),
      &PageParams { rows_per_page: 5_000, ..Default::default() },
    )
    .unwrap();
    assert_eq!(plan.page.size, MAX_ROWS_PER_PAGE);
  }

  #[test]
  fn half_open_date_range_is_dropped() {
    let filter = PersonFilter {
      start_date: Some(date(1990, 1, 1)),
      ..Default::default()
    };
    let plan = compile(&filter, &PageParams::default()).unwrap();
    assert!(plan.predicates.is_empty());

    let filter = PersonFilter {
      end_date: Some(date(1990, 1, 1)),
      ..Default::default()
    };
    let plan = compile(&filter, &PageParams::default()).unwrap();
    assert!(plan.predicates.is_empty());
  }

  #[test]
  fn full_date_range_is_inclusive_between() {
    let filter = PersonFilter {
      start_date: Some(date(1990, 1, 1)),
      end_date: Some(date(1999, 12, 31)),
      ..Default::default()
    };
    let plan = compile(&filter, &PageParams::default()).unwrap();
    assert_eq!(plan.predicates, vec![Predicate::Between {
      column: "birthdate",
      kind:   RangeKind::Date,
      start:  date(1990, 1, 1),
      end:    date(1999, 12, 31),
    }]);
  }

  #[test]
  fn empty_strings_are_treated_as_unset() {
    let filter = PersonFilter {
      name: Some(String::new()),
      email: Some(String::new()),
      ..Default::default()
    };
    let plan = compile(&filter, &PageParams::default()).unwrap();
    assert!(plan.predicates.is_empty());
  }

  #[test]
  fn predicates_follow_field_kinds() {
    let filter = PersonFilter {
      id: Some(7),
      name: Some("sil".into()),
      sex: Some("F".into()),
      ..Default::default()
    };
    let plan = compile(&filter, &PageParams::default()).unwrap();
    assert_eq!(plan.predicates, vec![
      Predicate::Equals { column: "id", value: Value::Integer(7) },
      Predicate::Contains {
        columns: &["first_name", "last_name"],
        needle:  "sil".into(),
      },
      Predicate::Equals { column: "sex", value: Value::Text("F".into()) },
    ]);
  }

  #[test]
  fn unknown_enumerated_code_fails_before_predicates() {
    let filter = PersonFilter { sex: Some("X".into()), ..Default::default() };
    let err = compile(&filter, &PageParams::default()).unwrap_err();
    assert_eq!(err.key(), "PERSON_SEX_INVALID");
  }

  #[test]
  fn description_filter_is_a_substring_match() {
    let filter = PersonFilter { description: Some("vip".into()), ..Default::default() };
    let plan = compile(&filter, &PageParams::default()).unwrap();
    assert_eq!(plan.predicates, vec![Predicate::Contains {
      columns: &["description"],
      needle:  "vip".into(),
    }]);
  }

  #[test]
  fn sort_column_must_be_allow_listed() {
    let page = PageParams {
      sort_column: Some("first_name".into()),
      sort: Some("DESC".into()),
      ..Default::default()
    };
    let plan = compile(&PersonFilter::default(), &page).unwrap();
    assert_eq!(plan.sort, Sort { column: "first_name", direction: Direction::Desc });

    let page = PageParams {
      sort_column: Some("first_name; DROP TABLE people".into()),
      ..Default::default()
    };
    let err = compile(&PersonFilter::default(), &page).unwrap_err();
    assert_eq!(err.key(), "PERSON_SORT_COLUMN_INVALID");
  }

  #[test]
  fn blank_sort_column_uses_default() {
    let page = PageParams { sort_column: Some("  ".into()), ..Default::default() };
    let plan = compile(&PersonFilter::default(), &page).unwrap();
    assert_eq!(plan.sort.column, DEFAULT_SORT_COLUMN);
  }
}
