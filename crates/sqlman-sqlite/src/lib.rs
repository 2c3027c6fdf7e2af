//! # sqlman-sqlite
//!
//! Runs SQL built with `sqlman-core` against SQLite and reads the live
//! schema back.
//!
//! - [`Database`] wraps an sqlx pool and executes
//!   [`Fragment`](sqlman_core::Fragment)s, optionally binding values to
//!   `?` placeholders.
//! - [`Introspector`] runs the catalog queries (`PRAGMA table_info`,
//!   `sqlite_master` listings) and diffs a live table against a desired
//!   column set.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sqlman_core::builder::{Generator, Insert};
//! use sqlman_sqlite::{Database, Introspector};
//!
//! # async fn run() -> sqlman_sqlite::Result<()> {
//! let db = Database::connect("sqlite:app.db").await?;
//! let insert = Insert::new("users").value("name", "Ada");
//! db.execute(&Generator::sqlite().insert(&insert)?).await?;
//!
//! for column in Introspector::new(db).table_info("users").await? {
//!     println!("{} {}", column.name, column.declared_type);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod introspect;

pub use config::IntrospectorConfig;
pub use database::Database;
pub use error::{Error, Result};
pub use introspect::{DatabaseEntry, FunctionEntry, IndexEntry, Introspector};
pub use sqlman_core::dialect::SqliteDialect;
