//! Translation of a [`QueryPlan`] into parameterised SQL.
//!
//! Only values are bound as parameters. Column names come from the plan,
//! whose predicates and sort column are static identifiers chosen by the
//! record's filter, so they are interpolated directly. Substring matches
//! compare both sides through the connection's Unicode case fold, since
//! SQLite's own `LOWER` only folds ASCII.

use roster_core::filter::{Predicate, QueryPlan, RangeKind, Value};
use rusqlite::{Connection, types::Value as SqlValue};

use crate::{encode::encode_date, store::FOLD};

/// A compiled search over one table, selecting identities only.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
  /// `SELECT id ... LIMIT ? OFFSET ?`; binds `params` then limit and offset.
  pub page_sql:  String,
  /// `SELECT COUNT(*) ...`; binds `params`.
  pub count_sql: String,
  pub params:    Vec<SqlValue>,
  pub limit:     i64,
  pub offset:    i64,
}

/// Escape `%`, `_`, and the escape character itself for a `LIKE` pattern.
pub fn escape_like(needle: &str) -> String {
  let mut out = String::with_capacity(needle.len() + 2);
  for c in needle.chars() {
    if matches!(c, '\\' | '%' | '_') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

pub fn compile(table: &str, plan: &QueryPlan) -> Select {
  let mut conds: Vec<String> = Vec::with_capacity(plan.predicates.len());
  let mut params: Vec<SqlValue> = Vec::new();

  for predicate in &plan.predicates {
    match predicate {
      Predicate::Contains { columns, needle } => {
        let pattern = format!("%{}%", escape_like(needle));
        let any: Vec<String> = columns
          .iter()
          .map(|c| {
            params.push(SqlValue::Text(pattern.clone()));
            format!(r"{FOLD}({c}) LIKE {FOLD}(?) ESCAPE '\'")
          })
          .collect();
        conds.push(format!("({})", any.join(" OR ")));
      }
      Predicate::Equals { column, value } => {
        conds.push(format!("{column} = ?"));
        params.push(match value {
          Value::Integer(i) => SqlValue::Integer(*i),
          Value::Text(s) => SqlValue::Text(s.clone()),
        });
      }
      Predicate::Between { column, kind, start, end } => {
        conds.push(match kind {
          RangeKind::Date => format!("{column} BETWEEN ? AND ?"),
          RangeKind::Timestamp => format!("date({column}) BETWEEN ? AND ?"),
        });
        params.push(SqlValue::Text(encode_date(*start)));
        params.push(SqlValue::Text(encode_date(*end)));
      }
    }
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!(" WHERE {}", conds.join(" AND "))
  };

  let direction = plan.sort.direction.as_sql();
  let order = match plan.sort.column {
    "id" => format!("id {direction}"),
    column => format!("{column} {direction}, id {direction}"),
  };

  Select {
    page_sql: format!(
      "SELECT id FROM {table}{where_clause} ORDER BY {order} LIMIT ? OFFSET ?"
    ),
    count_sql: format!("SELECT COUNT(*) FROM {table}{where_clause}"),
    params,
    limit: i64::from(plan.page.size),
    offset: i64::try_from(plan.page.offset()).unwrap_or(i64::MAX),
  }
}

/// Run `select`, returning one page of identities and the total match count.
pub fn run(conn: &Connection, select: &Select) -> rusqlite::Result<(Vec<i64>, u64)> {
  let total: i64 = conn.query_row(
    &select.count_sql,
    rusqlite::params_from_iter(select.params.iter()),
    |row| row.get(0),
  )?;

  let mut paged = select.params.clone();
  paged.push(SqlValue::Integer(select.limit));
  paged.push(SqlValue::Integer(select.offset));

  let mut stmt = conn.prepare(&select.page_sql)?;
  let ids = stmt
    .query_map(rusqlite::params_from_iter(paged.iter()), |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<i64>>>()?;

  Ok((ids, u64::try_from(total).unwrap_or_default()))
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use roster_core::filter::{Direction, PageRequest, Sort};

  use super::*;

  fn plan(predicates: Vec<Predicate>, sort: Sort) -> QueryPlan {
    QueryPlan { predicates, page: PageRequest { index: 2, size: 10 }, sort }
  }

  #[test]
  fn like_metacharacters_are_escaped() {
    assert_eq!(escape_like("50%_off"), r"50\%\_off");
    assert_eq!(escape_like(r"a\b"), r"a\\b");
  }

  #[test]
  fn empty_plan_orders_by_id_only() {
    let select = compile("people", &plan(vec![], Sort {
      column:    "id",
      direction: Direction::Desc,
    }));
    assert_eq!(
      select.page_sql,
      "SELECT id FROM people ORDER BY id DESC LIMIT ? OFFSET ?"
    );
    assert_eq!(select.count_sql, "SELECT COUNT(*) FROM people");
    assert!(select.params.is_empty());
    assert_eq!((select.limit, select.offset), (10, 20));
  }

  #[test]
  fn predicates_become_a_conjunction() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let select = compile(
      "addresses",
      &plan(
        vec![
          Predicate::Contains { columns: &["name", "neighborhood"], needle: "sé".into() },
          Predicate::Equals { column: "city_id", value: Value::Integer(4) },
          Predicate::Between {
            column: "created_at",
            kind: RangeKind::Timestamp,
            start,
            end,
          },
        ],
        Sort { column: "name", direction: Direction::Asc },
      ),
    );

    assert_eq!(
      select.count_sql,
      concat!(
        r"SELECT COUNT(*) FROM addresses WHERE ",
        r"(fold_case(name) LIKE fold_case(?) ESCAPE '\' OR fold_case(neighborhood) LIKE fold_case(?) ESCAPE '\')",
        r" AND city_id = ? AND date(created_at) BETWEEN ? AND ?",
      )
    );
    assert!(select.page_sql.ends_with("ORDER BY name ASC, id ASC LIMIT ? OFFSET ?"));
    assert_eq!(select.params, vec![
      SqlValue::Text("%sé%".into()),
      SqlValue::Text("%sé%".into()),
      SqlValue::Integer(4),
      SqlValue::Text("2024-01-01".into()),
      SqlValue::Text("2024-01-31".into()),
    ]);
  }
}
