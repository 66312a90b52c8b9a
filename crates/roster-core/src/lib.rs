//! Core types and rules for the Roster record service.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the record shapes, their validation, audit stamping, projection to and
//! from DTOs, and the compilation of sparse filters into query plans. Storage
//! backends implement the traits in [`store`]; the [`service`] functions tie
//! the pieces together for every write and read path.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod address;
pub mod audit;
pub mod cpf;
pub mod credentials;
pub mod error;
pub mod filter;
pub mod limits;
pub mod page;
pub mod person;
pub mod record;
pub mod reference;
pub mod service;
pub mod store;
pub mod user;
pub mod validate;

pub use error::{Error, Result};
pub use record::{EntityKind, Record};
