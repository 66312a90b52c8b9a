//! Declared per-field bounds.
//!
//! Every text field a record stores has a maximum length and a requiredness
//! flag. The validators read these tables instead of hard-coding numbers.

pub const MAX_SIZE_NAME: usize = 100;
pub const MAX_SIZE_SHORT_TEXT: usize = 200;
pub const MAX_SIZE_LONG_TEXT: usize = 600;

pub const MAX_SIZE_ADDRESS_NUMBER: usize = 9;
pub const MAX_SIZE_ADDRESS_CEP: usize = 8;
pub const MAX_SIZE_ADDRESS_ZIPCODE: usize = 12;
pub const MAX_SIZE_ADDRESS_COORDINATION: usize = 20;

pub const MAX_SIZE_CPF: usize = 11;

/// Bound and requiredness of a single stored field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  pub name:     &'static str,
  pub max_len:  usize,
  pub required: bool,
}

impl FieldSpec {
  pub const fn required(name: &'static str, max_len: usize) -> Self {
    Self { name, max_len, required: true }
  }

  pub const fn optional(name: &'static str, max_len: usize) -> Self {
    Self { name, max_len, required: false }
  }
}

pub mod person {
  use super::*;

  pub const FIRST_NAME: FieldSpec = FieldSpec::required("first_name", MAX_SIZE_NAME);
  pub const LAST_NAME: FieldSpec = FieldSpec::required("last_name", MAX_SIZE_NAME);
  pub const NICK_NAME: FieldSpec = FieldSpec::optional("nick_name", MAX_SIZE_NAME);
  pub const EMAIL: FieldSpec = FieldSpec::optional("email", MAX_SIZE_NAME);
  pub const CPF: FieldSpec = FieldSpec::optional("cpf", MAX_SIZE_CPF);
  pub const SEX: FieldSpec = FieldSpec::optional("sex", 1);
  pub const DESCRIPTION: FieldSpec =
    FieldSpec::optional("description", MAX_SIZE_LONG_TEXT);
}

pub mod user {
  use super::*;

  pub const NAME: FieldSpec = FieldSpec::optional("name", MAX_SIZE_NAME);
  pub const USERNAME: FieldSpec = FieldSpec::required("username", MAX_SIZE_NAME);
  pub const PASSWORD: FieldSpec = FieldSpec::required("password", MAX_SIZE_NAME);
  pub const EMAIL: FieldSpec = FieldSpec::optional("email", MAX_SIZE_NAME);
  pub const CPF: FieldSpec = FieldSpec::optional("cpf", MAX_SIZE_CPF);
  pub const SEX: FieldSpec = FieldSpec::optional("sex", 1);
}

pub mod address {
  use super::*;

  pub const NAME: FieldSpec = FieldSpec::required("name", MAX_SIZE_NAME);
  pub const STREET_TYPE: FieldSpec = FieldSpec::optional("street_type", MAX_SIZE_NAME);
  pub const NUMBER: FieldSpec = FieldSpec::optional("number", MAX_SIZE_ADDRESS_NUMBER);
  pub const CEP: FieldSpec = FieldSpec::optional("cep", MAX_SIZE_ADDRESS_CEP);
  pub const ZIP_CODE: FieldSpec = FieldSpec::optional("zip_code", MAX_SIZE_ADDRESS_ZIPCODE);
  pub const NEIGHBORHOOD: FieldSpec = FieldSpec::optional("neighborhood", MAX_SIZE_NAME);
  pub const COORDINATION: FieldSpec =
    FieldSpec::optional("coordination", MAX_SIZE_ADDRESS_COORDINATION);
  pub const REFERENTIAL_POINT: FieldSpec =
    FieldSpec::optional("referential_point", MAX_SIZE_SHORT_TEXT);
}

/// Countries, states, and cities share a single `name` field.
pub mod reference {
  use super::*;

  pub const NAME: FieldSpec = FieldSpec::required("name", MAX_SIZE_NAME);
}
