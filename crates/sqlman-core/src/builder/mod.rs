//! SQL fragment builder and statement generators.
//!
//! Two layers:
//!
//! - [`Fragment`] is a chainable buffer for hand-composed SQL: names,
//!   literals, operators and joins, each escaped on the way in.
//! - [`Generator`] renders complete statements ([`Select`], [`Insert`],
//!   [`Update`], [`Delete`], [`Upsert`]) from plain data.
//!
//! # Example
//!
//! ```rust
//! use sqlman_core::builder::{Generator, Select};
//!
//! let g = Generator::sqlite();
//! let select = Select::new()
//!     .columns(["id", "name"])
//!     .from("users")
//!     .where_sql(g.name("name").begins("A"))
//!     .limit(5);
//!
//! assert_eq!(
//!     g.select(&select).unwrap().as_str(),
//!     "SELECT \"id\",\"name\"\nFROM \"users\"\nWHERE \"name\" LIKE 'A'||'%'\nLIMIT 5"
//! );
//! ```

mod delete;
mod expr;
mod fragment;
mod generator;
mod insert;
mod select;
mod update;
mod upsert;
pub mod value;

pub use delete::Delete;
pub use expr::{Aliased, ConflictAction, Direction, Indexing, JoinKind, Nulls, OrderTerm};
pub use fragment::Fragment;
pub use generator::{Conditions, Generator};
pub use insert::{Insert, InsertSelect};
pub use select::Select;
pub use update::Update;
pub use upsert::Upsert;
pub use value::{
    escape_value, escape_value_with, escape_values, escape_values_with, quote_value, Datum,
    EscapeMode, SqlValue, ToSqlValue,
};
