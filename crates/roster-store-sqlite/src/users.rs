//! `Repository<User>` for [`SqliteStore`].

use rusqlite::{Connection, OptionalExtension as _, ToSql};

use roster_core::{EntityKind, filter::QueryPlan, page::RawPage, store::Repository, user::User};

use crate::{
  Error, Result,
  addresses::{drop_orphan, load_address, upsert_address},
  encode::{RawAudit, RawUser, encode_date},
  query,
  references::{check_roles, load_roles},
  store::SqliteStore,
};

fn load_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawUser>> {
  let row = conn
    .query_row(
      "SELECT id, name, username, password_hash, email, cpf, birthdate, sex, address_id,
              created_at, created_by, updated_at, updated_by
       FROM users WHERE id = ?1",
      [id],
      |row| {
        let raw = RawUser {
          id:            row.get(0)?,
          name:          row.get(1)?,
          username:      row.get(2)?,
          password_hash: row.get(3)?,
          email:         row.get(4)?,
          cpf:           row.get(5)?,
          birthdate:     row.get(6)?,
          sex:           row.get(7)?,
          address:       None,
          roles:         Vec::new(),
          audit:         RawAudit {
            created_at: row.get(9)?,
            created_by: row.get(10)?,
            updated_at: row.get(11)?,
            updated_by: row.get(12)?,
          },
        };
        Ok((raw, row.get::<_, Option<i64>>(8)?))
      },
    )
    .optional()?;

  let Some((mut raw, address_id)) = row else {
    return Ok(None);
  };
  if let Some(address_id) = address_id {
    raw.address = load_address(conn, address_id)?;
  }
  raw.roles = load_roles(conn, id)?;
  Ok(Some(raw))
}

fn load_many(conn: &Connection, ids: &[i64]) -> rusqlite::Result<Vec<RawUser>> {
  let mut out = Vec::with_capacity(ids.len());
  for id in ids {
    if let Some(raw) = load_user(conn, *id)? {
      out.push(raw);
    }
  }
  Ok(out)
}

fn current_address(conn: &Connection, id: i64) -> tokio_rusqlite::Result<Option<i64>> {
  conn
    .query_row("SELECT address_id FROM users WHERE id = ?1", [id], |row| row.get(0))
    .optional()?
    .ok_or_else(|| Error::missing(EntityKind::User, id))
}

fn write_user(conn: &Connection, user: &User) -> tokio_rusqlite::Result<i64> {
  let role_ids = check_roles(conn, &user.roles)?;
  let previous_address = match user.id {
    Some(id) => current_address(conn, id)?,
    None => None,
  };
  let address_id = user
    .address
    .as_ref()
    .map(|a| upsert_address(conn, a))
    .transpose()?;

  let birthdate = user.birthdate.map(encode_date);
  let audit = RawAudit::encode(&user.audit);
  let mut values: Vec<&dyn ToSql> = vec![
    &user.name,
    &user.username,
    &user.password_hash,
    &user.email,
    &user.cpf,
    &birthdate,
    &user.sex,
    &address_id,
    &audit.created_at,
    &audit.created_by,
    &audit.updated_at,
    &audit.updated_by,
  ];

  let id = match &user.id {
    Some(id) => {
      values.push(id);
      conn.execute(
        "UPDATE users SET
           name = ?1, username = ?2, password_hash = ?3, email = ?4, cpf = ?5,
           birthdate = ?6, sex = ?7, address_id = ?8,
           created_at = ?9, created_by = ?10, updated_at = ?11, updated_by = ?12
         WHERE id = ?13",
        values.as_slice(),
      )?;
      *id
    }
    None => {
      conn.execute(
        "INSERT INTO users (
           name, username, password_hash, email, cpf, birthdate, sex, address_id,
           created_at, created_by, updated_at, updated_by
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        values.as_slice(),
      )?;
      conn.last_insert_rowid()
    }
  };

  // Role links are replaced wholesale; the roles themselves are never written.
  conn.execute("DELETE FROM user_roles WHERE user_id = ?1", [id])?;
  for role_id in role_ids {
    conn.execute(
      "INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?1, ?2)",
      [id, role_id],
    )?;
  }

  drop_orphan(conn, previous_address, address_id)?;
  Ok(id)
}

fn decode_all(raws: Vec<RawUser>) -> Result<Vec<User>> {
  raws.into_iter().map(RawUser::into_user).collect()
}

impl Repository<User> for SqliteStore {
  type Error = Error;

  async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
    let raw = self.conn.call(move |conn| Ok(load_user(conn, id)?)).await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn find_all(&self) -> Result<Vec<User>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id FROM users ORDER BY username, id")?;
        let ids = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(load_many(conn, &ids)?)
      })
      .await?;
    decode_all(raws)
  }

  async fn find_by_plan<'a>(&'a self, plan: &'a QueryPlan) -> Result<RawPage<User>> {
    let select = query::compile("users", plan);
    let (raws, total) = self
      .conn
      .call(move |conn| {
        let (ids, total) = query::run(conn, &select)?;
        Ok((load_many(conn, &ids)?, total))
      })
      .await?;
    Ok(RawPage { content: decode_all(raws)?, total })
  }

  async fn save(&self, user: User) -> Result<User> {
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id = write_user(&tx, &user)?;
        let raw = load_user(&tx, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;
    raw
      .ok_or_else(|| Error::Decode("saved user vanished".into()))?
      .into_user()
  }

  async fn delete(&self, id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let address_id = current_address(&tx, id)?;
        tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
        drop_orphan(&tx, address_id, None)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
