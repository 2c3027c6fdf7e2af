//! Metadata queries against the schema catalog.
//!
//! [`Catalog`] only renders SQL. Running it and decoding rows is the job
//! of a driver crate.

use crate::builder::Fragment;
use crate::dialect::{Dialect, SqliteDialect};

/// Master table queried when none is configured.
pub const DEFAULT_MASTER_TABLE: &str = "sqlite_master";

/// Renders catalog queries for one master table.
#[derive(Debug, Clone)]
pub struct Catalog<D: Dialect = SqliteDialect> {
    dialect: D,
    master_table: String,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::sqlite()
    }
}

impl Catalog {
    /// A catalog over `sqlite_master` with the SQLite dialect.
    #[must_use]
    pub fn sqlite() -> Self {
        Self::new(SqliteDialect)
    }
}

impl<D: Dialect> Catalog<D> {
    /// A catalog over `sqlite_master` with the given dialect.
    #[must_use]
    pub fn new(dialect: D) -> Self {
        Self {
            dialect,
            master_table: String::from(DEFAULT_MASTER_TABLE),
        }
    }

    /// Uses another master table, e.g. `sqlite_temp_master`.
    #[must_use]
    pub fn with_master_table(mut self, master_table: &str) -> Self {
        self.master_table = String::from(master_table);
        self
    }

    /// Returns the master table name.
    #[must_use]
    pub fn master_table(&self) -> &str {
        &self.master_table
    }

    fn fragment(&self) -> Fragment<D> {
        Fragment::with_dialect(self.dialect)
    }

    fn schema_prefix(&self, schema: Option<&str>) -> String {
        schema.map_or_else(String::new, |schema| {
            format!("{}.", self.dialect.quote_identifier(schema))
        })
    }

    fn master(&self, schema: Option<&str>) -> String {
        format!(
            "{}{}",
            self.schema_prefix(schema),
            self.dialect.quote_identifier(&self.master_table)
        )
    }

    fn names_of(&self, kind: &str, schema: Option<&str>) -> Fragment<D> {
        self.fragment()
            .raw("SELECT name FROM")
            .raw(self.master(schema))
            .raw("WHERE type =")
            .value(kind)
            .raw("ORDER BY name")
    }

    /// `PRAGMA "schema".table_info("table")`
    ///
    /// Rows: `cid`, `name`, `type`, `notnull`, `dflt_value`, `pk`.
    #[must_use]
    pub fn table_info(&self, table: &str, schema: Option<&str>) -> Fragment<D> {
        self.fragment().raw(format!(
            "PRAGMA {}table_info({})",
            self.schema_prefix(schema),
            self.dialect.quote_identifier(table)
        ))
    }

    /// Names of all tables.
    #[must_use]
    pub fn table_list(&self, schema: Option<&str>) -> Fragment<D> {
        self.names_of("table", schema)
    }

    /// Names of all views.
    #[must_use]
    pub fn view_list(&self, schema: Option<&str>) -> Fragment<D> {
        self.names_of("view", schema)
    }

    /// Index names with their table, optionally for one table only.
    #[must_use]
    pub fn index_list(&self, schema: Option<&str>, table: Option<&str>) -> Fragment<D> {
        let sql = self
            .fragment()
            .raw("SELECT name, tbl_name FROM")
            .raw(self.master(schema))
            .raw("WHERE type =")
            .value("index");
        let sql = match table {
            Some(table) => sql.raw("AND tbl_name =").value(table),
            None => sql,
        };
        sql.raw("ORDER BY name")
    }

    /// The `CREATE TABLE` text stored for a table.
    #[must_use]
    pub fn table_ddl(&self, table: &str, schema: Option<&str>) -> Fragment<D> {
        self.fragment()
            .raw("SELECT sql FROM")
            .raw(self.master(schema))
            .raw("WHERE type =")
            .value("table")
            .raw("AND name =")
            .value(table)
    }

    /// `PRAGMA database_list`
    #[must_use]
    pub fn database_list(&self) -> Fragment<D> {
        self.fragment().raw("PRAGMA database_list")
    }

    /// `PRAGMA function_list`
    #[must_use]
    pub fn function_list(&self) -> Fragment<D> {
        self.fragment().raw("PRAGMA function_list")
    }
}
