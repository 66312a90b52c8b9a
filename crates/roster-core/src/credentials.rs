//! Password hashing for user records.
//!
//! Plain passwords never reach the store; only argon2 PHC strings do.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use rand_core::OsRng;

use crate::{Error, Result};

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Credentials(e.to_string()))
}
