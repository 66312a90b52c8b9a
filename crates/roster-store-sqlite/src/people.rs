//! `Repository<Person>` for [`SqliteStore`].

use rusqlite::{Connection, OptionalExtension as _, ToSql};

use roster_core::{
  EntityKind, filter::QueryPlan, page::RawPage, person::Person, store::Repository,
};

use crate::{
  Error, Result,
  addresses::{drop_orphan, load_address, upsert_address},
  encode::{RawAudit, RawPerson, encode_date},
  query,
  references::{check_city, load_city, load_country},
  store::{SqliteStore, link},
};

fn load_person(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawPerson>> {
  let row = conn
    .query_row(
      "SELECT id, first_name, last_name, nick_name, birthdate, sex, email, cpf,
              birth_city_id, birth_country_id, address_id, description,
              created_at, created_by, updated_at, updated_by
       FROM people WHERE id = ?1",
      [id],
      |row| {
        let raw = RawPerson {
          id:            row.get(0)?,
          first_name:    row.get(1)?,
          last_name:     row.get(2)?,
          nick_name:     row.get(3)?,
          birthdate:     row.get(4)?,
          sex:           row.get(5)?,
          email:         row.get(6)?,
          cpf:           row.get(7)?,
          birth_city:    None,
          birth_country: None,
          address:       None,
          description:   row.get(11)?,
          audit:         RawAudit {
            created_at: row.get(12)?,
            created_by: row.get(13)?,
            updated_at: row.get(14)?,
            updated_by: row.get(15)?,
          },
        };
        let links: (Option<i64>, Option<i64>, Option<i64>) =
          (row.get(8)?, row.get(9)?, row.get(10)?);
        Ok((raw, links))
      },
    )
    .optional()?;

  let Some((mut raw, (city_id, country_id, address_id))) = row else {
    return Ok(None);
  };
  if let Some(city_id) = city_id {
    raw.birth_city = load_city(conn, city_id)?;
  }
  if let Some(country_id) = country_id {
    raw.birth_country = load_country(conn, country_id)?;
  }
  if let Some(address_id) = address_id {
    raw.address = load_address(conn, address_id)?;
  }
  Ok(Some(raw))
}

fn load_many(conn: &Connection, ids: &[i64]) -> rusqlite::Result<Vec<RawPerson>> {
  let mut out = Vec::with_capacity(ids.len());
  for id in ids {
    if let Some(raw) = load_person(conn, *id)? {
      out.push(raw);
    }
  }
  Ok(out)
}

fn current_address(conn: &Connection, id: i64) -> tokio_rusqlite::Result<Option<i64>> {
  conn
    .query_row("SELECT address_id FROM people WHERE id = ?1", [id], |row| row.get(0))
    .optional()?
    .ok_or_else(|| Error::missing(EntityKind::Person, id))
}

fn write_person(conn: &Connection, person: &Person) -> tokio_rusqlite::Result<i64> {
  let birth_city_id = check_city(conn, person.birth_city.as_ref().and_then(|c| c.id))?;
  let birth_country_id = link(
    conn,
    "countries",
    EntityKind::Country,
    person.birth_country.as_ref().and_then(|c| c.id),
  )?;

  let previous_address = match person.id {
    Some(id) => current_address(conn, id)?,
    None => None,
  };
  let address_id = person
    .address
    .as_ref()
    .map(|a| upsert_address(conn, a))
    .transpose()?;

  let birthdate = person.birthdate.map(encode_date);
  let audit = RawAudit::encode(&person.audit);
  let mut values: Vec<&dyn ToSql> = vec![
    &person.first_name,
    &person.last_name,
    &person.nick_name,
    &birthdate,
    &person.sex,
    &person.email,
    &person.cpf,
    &birth_city_id,
    &birth_country_id,
    &address_id,
    &person.description,
    &audit.created_at,
    &audit.created_by,
    &audit.updated_at,
    &audit.updated_by,
  ];

  let id = match &person.id {
    Some(id) => {
      values.push(id);
      conn.execute(
        "UPDATE people SET
           first_name = ?1, last_name = ?2, nick_name = ?3, birthdate = ?4, sex = ?5,
           email = ?6, cpf = ?7, birth_city_id = ?8, birth_country_id = ?9,
           address_id = ?10, description = ?11,
           created_at = ?12, created_by = ?13, updated_at = ?14, updated_by = ?15
         WHERE id = ?16",
        values.as_slice(),
      )?;
      *id
    }
    None => {
      conn.execute(
        "INSERT INTO people (
           first_name, last_name, nick_name, birthdate, sex, email, cpf,
           birth_city_id, birth_country_id, address_id, description,
           created_at, created_by, updated_at, updated_by
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        values.as_slice(),
      )?;
      conn.last_insert_rowid()
    }
  };

  drop_orphan(conn, previous_address, address_id)?;
  Ok(id)
}

fn decode_all(raws: Vec<RawPerson>) -> Result<Vec<Person>> {
  raws.into_iter().map(RawPerson::into_person).collect()
}

impl Repository<Person> for SqliteStore {
  type Error = Error;

  async fn find_by_id(&self, id: i64) -> Result<Option<Person>> {
    let raw = self.conn.call(move |conn| Ok(load_person(conn, id)?)).await?;
    raw.map(RawPerson::into_person).transpose()
  }

  async fn find_all(&self) -> Result<Vec<Person>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id FROM people ORDER BY first_name, id")?;
        let ids = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(load_many(conn, &ids)?)
      })
      .await?;
    decode_all(raws)
  }

  async fn find_by_plan<'a>(&'a self, plan: &'a QueryPlan) -> Result<RawPage<Person>> {
    let select = query::compile("people", plan);
    let (raws, total) = self
      .conn
      .call(move |conn| {
        let (ids, total) = query::run(conn, &select)?;
        Ok((load_many(conn, &ids)?, total))
      })
      .await?;
    Ok(RawPage { content: decode_all(raws)?, total })
  }

  async fn save(&self, person: Person) -> Result<Person> {
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id = write_person(&tx, &person)?;
        let raw = load_person(&tx, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;
    raw
      .ok_or_else(|| Error::Decode("saved person vanished".into()))?
      .into_person()
  }

  async fn delete(&self, id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let address_id = current_address(&tx, id)?;
        tx.execute("DELETE FROM people WHERE id = ?1", [id])?;
        drop_orphan(&tx, address_id, None)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
