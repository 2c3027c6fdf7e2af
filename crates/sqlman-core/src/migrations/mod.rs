//! Schema DDL, catalog queries and column diffing.
//!
//! - [`ColumnSpec`] and [`CreateTable`] describe desired tables; the
//!   [`Generator`](crate::builder::Generator) renders them as DDL.
//! - [`Catalog`] renders the metadata queries a driver runs to read the
//!   live schema back.
//! - [`diff_columns`] compares `PRAGMA table_info` rows with a desired
//!   column set.
//!
//! # Example
//!
//! ```rust
//! use sqlman_core::builder::Generator;
//! use sqlman_core::migrations::{ColumnSpec, CreateTable};
//!
//! let users = CreateTable::new("users")
//!     .column("id", ColumnSpec::new("INTEGER").primary_key(1).autoincrement())
//!     .column("email", ColumnSpec::new("TEXT").not_null().unique())
//!     .column("created_at", ColumnSpec::new("TEXT").default_expr("CURRENT_TIMESTAMP"))
//!     .strict();
//!
//! let sql = Generator::sqlite().create_table(&users).unwrap();
//! assert!(sql.as_str().starts_with("CREATE TABLE \"users\" (\n    \"id\" INTEGER PRIMARY KEY AUTOINCREMENT,"));
//! assert!(sql.as_str().ends_with(") STRICT"));
//! ```

mod catalog;
mod column;
mod diff;
mod table;

pub use catalog::{Catalog, DEFAULT_MASTER_TABLE};
pub use column::{validate_type_name, ColumnDefault, ColumnSpec, Generated, GeneratedKind};
pub use diff::{diff_columns, ChangeKind, ColumnChange, ColumnDiff, ColumnInfo};
pub use table::CreateTable;
