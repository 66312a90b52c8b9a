//! CPF, the Brazilian national identification number.
//!
//! Eleven digits, the last two of which are modulo-11 check digits over the
//! preceding ones. Input may carry the usual `000.000.000-00` punctuation;
//! the canonical stored form is digits only.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpfError {
  #[error("expected 11 digits, found {0}")]
  Length(usize),

  #[error("all digits are identical")]
  RepeatedDigits,

  #[error("check digit mismatch")]
  CheckDigit,
}

/// A CPF that passed both check digits. Always holds 11 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
  pub const LEN: usize = 11;

  /// Strip punctuation and verify the check digits.
  pub fn parse(raw: &str) -> Result<Self, CpfError> {
    let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != Self::LEN {
      return Err(CpfError::Length(digits.len()));
    }
    if digits.iter().all(|d| *d == digits[0]) {
      return Err(CpfError::RepeatedDigits);
    }
    if check_digit(&digits[..9]) != digits[9]
      || check_digit(&digits[..10]) != digits[10]
    {
      return Err(CpfError::CheckDigit);
    }

    Ok(Self(digits_only(raw)))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_string(self) -> String { self.0 }

  /// Render as `000.000.000-00`.
  pub fn formatted(&self) -> String {
    let d = &self.0;
    format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
  }
}

impl fmt::Display for Cpf {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Keep only the ASCII digits of `raw`.
pub fn digits_only(raw: &str) -> String {
  raw.chars().filter(char::is_ascii_digit).collect()
}

/// Weight the prefix from `len + 1` down to 2, then reduce modulo 11.
fn check_digit(prefix: &[u32]) -> u32 {
  let top = prefix.len() as u32 + 1;
  let sum: u32 = prefix
    .iter()
    .enumerate()
    .map(|(i, d)| d * (top - i as u32))
    .sum();
  match sum % 11 {
    r if r < 2 => 0,
    r => 11 - r,
  }
}
