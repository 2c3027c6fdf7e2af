//! DELETE statements.
//!
//! A DELETE without a `WHERE` clause removes every row. The generator
//! refuses to render one unless [`Delete::all_rows`] was called.

use tracing::{debug, warn};

use super::expr::{Aliased, Indexing};
use super::fragment::Fragment;
use super::generator::{Conditions, Generator};
use super::value::Datum;
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// `DELETE FROM "table" [WHERE …] [RETURNING …]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delete {
    /// Target table.
    pub table: String,
    /// Table alias.
    pub alias: Option<String>,
    /// Index hint.
    pub indexing: Indexing,
    /// `WHERE` entries.
    pub filter: Conditions,
    /// Permits an empty `WHERE`.
    pub all_rows: bool,
    /// `RETURNING` list.
    pub returning: Vec<Aliased>,
}

impl Delete {
    /// Creates a DELETE from the given table.
    #[must_use]
    pub fn from(table: &str) -> Self {
        Self {
            table: String::from(table),
            ..Self::default()
        }
    }

    /// Sets the table alias.
    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(String::from(alias));
        self
    }

    /// Sets the index hint.
    #[must_use]
    pub fn indexing(mut self, indexing: Indexing) -> Self {
        self.indexing = indexing;
        self
    }

    /// Adds `"column" = value` (or `IS NULL`) to `WHERE`.
    #[must_use]
    pub fn where_eq(mut self, column: &str, value: impl Into<Datum>) -> Self {
        self.filter.push((String::from(column), value.into()));
        self
    }

    /// Adds a complete condition to `WHERE`.
    #[must_use]
    pub fn where_sql<D: Dialect>(mut self, condition: Fragment<D>) -> Self {
        self.filter.push((String::new(), condition.into()));
        self
    }

    /// Allows deleting every row.
    #[must_use]
    pub const fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }

    /// Adds a `RETURNING` item.
    #[must_use]
    pub fn returning(mut self, item: impl Into<Aliased>) -> Self {
        self.returning.push(item.into());
        self
    }
}

impl<D: Dialect> Generator<D> {
    /// Renders a DELETE statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingWhere`] without `WHERE` entries unless
    /// `all_rows` is set, and [`Error::Unsupported`] for RETURNING on a
    /// dialect without it.
    pub fn delete(&self, delete: &Delete) -> Result<Fragment<D>> {
        if delete.filter.is_empty() && !delete.all_rows {
            return Err(Error::MissingWhere(delete.table.clone()));
        }
        let target = self.qualified_name(&delete.table, delete.alias.as_deref(), &delete.indexing);
        let mut sql = format!("DELETE FROM {target}");
        if delete.filter.is_empty() {
            warn!(table = %delete.table, "Rendering DELETE of all rows");
        } else {
            sql.push_str("\nWHERE ");
            sql.push_str(self.conditions(&delete.filter).as_str());
        }
        self.push_returning(&mut sql, &delete.returning)?;
        debug!(sql = %sql, table = %delete.table, "Rendered DELETE");
        Ok(self.raw(sql))
    }
}
