//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS` / `OR IGNORE`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS countries (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS states (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    country_id  INTEGER REFERENCES countries(id)
);

CREATE TABLE IF NOT EXISTS cities (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL,
    state_id  INTEGER REFERENCES states(id)
);

-- Owned by at most one person or user; removed with its owner.
CREATE TABLE IF NOT EXISTS addresses (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    street_type        TEXT,
    name               TEXT NOT NULL,
    number             TEXT,
    cep                TEXT,
    zip_code           TEXT,
    neighborhood       TEXT,
    coordination       TEXT,
    referential_point  TEXT,
    city_id            INTEGER REFERENCES cities(id),
    created_at         TEXT,   -- RFC 3339 UTC
    created_by         TEXT,
    updated_at         TEXT,
    updated_by         TEXT
);

CREATE TABLE IF NOT EXISTS people (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name        TEXT NOT NULL,
    last_name         TEXT NOT NULL,
    nick_name         TEXT,
    birthdate         TEXT,   -- YYYY-MM-DD
    sex               TEXT,   -- 'M' | 'F' | 'O' | 'N'
    email             TEXT,
    cpf               TEXT UNIQUE,
    birth_city_id     INTEGER REFERENCES cities(id),
    birth_country_id  INTEGER REFERENCES countries(id),
    address_id        INTEGER REFERENCES addresses(id) ON DELETE SET NULL,
    description       TEXT,
    created_at        TEXT,
    created_by        TEXT,
    updated_at        TEXT,
    updated_by        TEXT
);

CREATE TABLE IF NOT EXISTS users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT,
    username       TEXT NOT NULL UNIQUE,
    password_hash  TEXT NOT NULL,   -- argon2 PHC string
    email          TEXT UNIQUE,
    cpf            TEXT UNIQUE,
    birthdate      TEXT,
    sex            TEXT,
    address_id     INTEGER REFERENCES addresses(id) ON DELETE SET NULL,
    created_at     TEXT,
    created_by     TEXT,
    updated_at     TEXT,
    updated_by     TEXT
);

CREATE TABLE IF NOT EXISTS roles (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS user_roles (
    user_id  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role_id  INTEGER NOT NULL REFERENCES roles(id),
    PRIMARY KEY (user_id, role_id)
);

INSERT OR IGNORE INTO roles (name) VALUES ('ADMIN'), ('USER');

CREATE INDEX IF NOT EXISTS states_country_idx  ON states(country_id);
CREATE INDEX IF NOT EXISTS cities_state_idx    ON cities(state_id);
CREATE INDEX IF NOT EXISTS people_name_idx     ON people(first_name, last_name);

PRAGMA user_version = 1;
";
