//! Core types and traits for linksync.
//!
//! This crate provides the foundational abstractions the link-sync layer is
//! built on:
//!
//! - `Model` trait and relationship metadata for ORM-style struct mapping
//! - `Value` / `Row` for dynamically typed column data
//! - `RawKey` → `LinkKey` primary key canonicalization
//! - `Connection` trait for executing link-table SQL
//! - `Outcome` re-export from asupersync for cancel-correct operations

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Cx, Outcome};

pub mod connection;
pub mod error;
pub mod identifiers;
pub mod key;
pub mod model;
pub mod relationship;
pub mod row;
pub mod value;

pub use connection::{Connection, Dialect};
pub use error::{
    ConfigError, ConnectionError, ConnectionErrorKind, Error, QueryError, QueryErrorKind, Result,
    TypeError,
};
pub use identifiers::{quote_ident, quote_ident_for, quote_ident_mysql};
pub use key::{LinkKey, RawKey};
pub use model::Model;
pub use relationship::{LinkTableInfo, RelationshipInfo, RelationshipKind, find_relationship};
pub use row::{FromValue, Row};
pub use value::Value;
