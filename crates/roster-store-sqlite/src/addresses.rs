//! Address rows, standalone and as owned sub-records.

use rusqlite::{Connection, OptionalExtension as _};

use roster_core::{
  EntityKind, address::Address, filter::QueryPlan, page::RawPage, store::Repository,
};

use crate::{
  Error, Result,
  encode::{RawAddress, RawAudit},
  query,
  references::{check_city, load_city},
  store::SqliteStore,
};

// ─── Row helpers ─────────────────────────────────────────────────────────────

pub(crate) fn load_address(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawAddress>> {
  let raw = conn
    .query_row(
      "SELECT id, street_type, name, number, cep, zip_code, neighborhood,
              coordination, referential_point, city_id,
              created_at, created_by, updated_at, updated_by
       FROM addresses WHERE id = ?1",
      [id],
      |row| {
        Ok((
          RawAddress {
            id:                row.get(0)?,
            street_type:       row.get(1)?,
            name:              row.get(2)?,
            number:            row.get(3)?,
            cep:               row.get(4)?,
            zip_code:          row.get(5)?,
            neighborhood:      row.get(6)?,
            coordination:      row.get(7)?,
            referential_point: row.get(8)?,
            city:              None,
            audit:             RawAudit {
              created_at: row.get(10)?,
              created_by: row.get(11)?,
              updated_at: row.get(12)?,
              updated_by: row.get(13)?,
            },
          },
          row.get::<_, Option<i64>>(9)?,
        ))
      },
    )
    .optional()?;

  let Some((mut raw, city_id)) = raw else {
    return Ok(None);
  };
  if let Some(city_id) = city_id {
    raw.city = load_city(conn, city_id)?;
  }
  Ok(Some(raw))
}

/// Insert `address`, or update it in place when it has an identity, and
/// return its identity. The linked city must exist.
pub(crate) fn upsert_address(conn: &Connection, address: &Address) -> tokio_rusqlite::Result<i64> {
  let city_id = check_city(conn, address.city.as_ref().and_then(|c| c.id))?;
  let street_type = address.street_type.as_deref();
  let audit = RawAudit::encode(&address.audit);

  match address.id {
    Some(id) => {
      let updated = conn.execute(
        "UPDATE addresses SET
           street_type = ?2, name = ?3, number = ?4, cep = ?5, zip_code = ?6,
           neighborhood = ?7, coordination = ?8, referential_point = ?9, city_id = ?10,
           created_at = ?11, created_by = ?12, updated_at = ?13, updated_by = ?14
         WHERE id = ?1",
        rusqlite::params![
          id,
          street_type,
          address.name,
          address.number,
          address.cep,
          address.zip_code,
          address.neighborhood,
          address.coordination,
          address.referential_point,
          city_id,
          audit.created_at,
          audit.created_by,
          audit.updated_at,
          audit.updated_by,
        ],
      )?;
      if updated == 0 {
        return Err(Error::missing(EntityKind::Address, id));
      }
      Ok(id)
    }
    None => {
      conn.execute(
        "INSERT INTO addresses (
           street_type, name, number, cep, zip_code, neighborhood,
           coordination, referential_point, city_id,
           created_at, created_by, updated_at, updated_by
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        rusqlite::params![
          street_type,
          address.name,
          address.number,
          address.cep,
          address.zip_code,
          address.neighborhood,
          address.coordination,
          address.referential_point,
          city_id,
          audit.created_at,
          audit.created_by,
          audit.updated_at,
          audit.updated_by,
        ],
      )?;
      Ok(conn.last_insert_rowid())
    }
  }
}

/// Remove an owner's previous address once it no longer points at it.
pub(crate) fn drop_orphan(
  conn: &Connection,
  previous: Option<i64>,
  current: Option<i64>,
) -> rusqlite::Result<()> {
  if let Some(previous) = previous.filter(|p| Some(*p) != current) {
    conn.execute("DELETE FROM addresses WHERE id = ?1", [previous])?;
  }
  Ok(())
}

fn load_many(conn: &Connection, ids: &[i64]) -> rusqlite::Result<Vec<RawAddress>> {
  let mut out = Vec::with_capacity(ids.len());
  for id in ids {
    if let Some(raw) = load_address(conn, *id)? {
      out.push(raw);
    }
  }
  Ok(out)
}

fn decode_all(raws: Vec<RawAddress>) -> Result<Vec<Address>> {
  raws.into_iter().map(RawAddress::into_address).collect()
}

// ─── Repository impl ─────────────────────────────────────────────────────────

impl Repository<Address> for SqliteStore {
  type Error = Error;

  async fn find_by_id(&self, id: i64) -> Result<Option<Address>> {
    let raw = self.conn.call(move |conn| Ok(load_address(conn, id)?)).await?;
    raw.map(RawAddress::into_address).transpose()
  }

  async fn find_all(&self) -> Result<Vec<Address>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id FROM addresses ORDER BY name, id")?;
        let ids = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(load_many(conn, &ids)?)
      })
      .await?;
    decode_all(raws)
  }

  async fn find_by_plan<'a>(&'a self, plan: &'a QueryPlan) -> Result<RawPage<Address>> {
    let select = query::compile("addresses", plan);
    let (raws, total) = self
      .conn
      .call(move |conn| {
        let (ids, total) = query::run(conn, &select)?;
        Ok((load_many(conn, &ids)?, total))
      })
      .await?;
    Ok(RawPage { content: decode_all(raws)?, total })
  }

  async fn save(&self, address: Address) -> Result<Address> {
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id = upsert_address(&tx, &address)?;
        let raw = load_address(&tx, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;
    raw
      .ok_or_else(|| Error::Decode("saved address vanished".into()))?
      .into_address()
  }

  async fn delete(&self, id: i64) -> Result<()> {
    self.delete_row("addresses", EntityKind::Address, id).await
  }
}
