//! # sqlman-core
//!
//! Injection-safe SQL text construction for SQLite-family databases.
//!
//! This crate provides:
//! - Canonical identifier quoting that leaves already quoted names alone
//! - Literal escaping for every SQLite storage class, with hex fallback for
//!   text the engine cannot hold as a string literal
//! - A chainable [`Fragment`](builder::Fragment) builder and statement
//!   generators for SELECT, INSERT, UPDATE, DELETE, UPSERT and DDL
//! - Declared-type affinity resolution and a live-vs-desired column diff
//!
//! Nothing here talks to a database. The output is SQL text with every
//! name and value already escaped; a driver crate executes it.
//!
//! ## Quoting and escaping
//!
//! ```rust
//! use sqlman_core::builder::quote_value;
//! use sqlman_core::quote::quote_name;
//!
//! assert_eq!(quote_name("main.users"), r#""main"."users""#);
//! assert_eq!(quote_name(r#""main"."users""#), r#""main"."users""#);
//! assert_eq!(quote_value("'; DROP TABLE users; --"), "'''; DROP TABLE users; --'");
//! assert_eq!(quote_value(None::<i64>), "NULL");
//! ```
//!
//! ## Statements
//!
//! ```rust
//! use sqlman_core::builder::{Generator, Update};
//!
//! let update = Update::table("users")
//!     .set("name", "Zoë")
//!     .where_eq("id", 7);
//! assert_eq!(
//!     Generator::sqlite().update(&update).unwrap().as_str(),
//!     "UPDATE \"users\" SET \"name\" = 'Zoë'\nWHERE \"id\" = 7"
//! );
//! ```

pub mod affinity;
pub mod builder;
pub mod dialect;
pub mod error;
pub mod migrations;
pub mod quote;

pub use affinity::{affinity, TypeAffinity};
pub use builder::{Datum, Fragment, Generator, SqlValue};
pub use error::{Error, Result};
