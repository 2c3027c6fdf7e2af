//! INSERT statements.

use tracing::debug;

use super::expr::{Aliased, ConflictAction};
use super::fragment::Fragment;
use super::generator::{Conditions, Generator};
use super::select::Select;
use super::upsert::Upsert;
use super::value::Datum;
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// `INSERT [OR action] INTO "table"(cols) VALUES(vals) [upsert] [RETURNING …]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    /// Target table, possibly schema qualified.
    pub table: String,
    /// Column/value pairs of the inserted row.
    pub row: Conditions,
    /// `OR` conflict action.
    pub conflict: Option<ConflictAction>,
    /// `ON CONFLICT` clause.
    pub upsert: Option<Upsert>,
    /// `RETURNING` list.
    pub returning: Vec<Aliased>,
}

impl Insert {
    /// Creates an INSERT into the given table.
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            table: String::from(table),
            ..Self::default()
        }
    }

    /// Sets a column value.
    #[must_use]
    pub fn value(mut self, column: &str, value: impl Into<Datum>) -> Self {
        self.row.push((String::from(column), value.into()));
        self
    }

    /// Sets `OR <action>`.
    #[must_use]
    pub const fn or(mut self, action: ConflictAction) -> Self {
        self.conflict = Some(action);
        self
    }

    /// Sets the `ON CONFLICT` clause.
    #[must_use]
    pub fn on_conflict(mut self, upsert: Upsert) -> Self {
        self.upsert = Some(upsert);
        self
    }

    /// Adds a `RETURNING` item.
    #[must_use]
    pub fn returning(mut self, item: impl Into<Aliased>) -> Self {
        self.returning.push(item.into());
        self
    }
}

/// `INSERT [OR action] INTO "table" [(cols)] <select> [upsert] [RETURNING …]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertSelect {
    /// Target table.
    pub table: String,
    /// Explicit column list.
    pub columns: Vec<String>,
    /// Row source.
    pub select: Select,
    /// `OR` conflict action.
    pub conflict: Option<ConflictAction>,
    /// `ON CONFLICT` clause.
    pub upsert: Option<Upsert>,
    /// `RETURNING` list.
    pub returning: Vec<Aliased>,
}

impl InsertSelect {
    /// Creates an INSERT … SELECT.
    #[must_use]
    pub fn new(table: &str, select: Select) -> Self {
        Self {
            table: String::from(table),
            select,
            ..Self::default()
        }
    }

    /// Sets the column list.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets `OR <action>`.
    #[must_use]
    pub const fn or(mut self, action: ConflictAction) -> Self {
        self.conflict = Some(action);
        self
    }

    /// Sets the `ON CONFLICT` clause.
    #[must_use]
    pub fn on_conflict(mut self, upsert: Upsert) -> Self {
        self.upsert = Some(upsert);
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
    fn insert_head(&self, table: &str, conflict: Option<ConflictAction>) -> String {
        let mut sql = String::from("INSERT");
        if let Some(action) = conflict {
            sql.push(' ');
            sql.push_str(&action.to_string());
        }
        sql.push_str(" INTO ");
        sql.push_str(&self.dialect().quote_name(table));
        sql
    }

    pub(crate) fn push_returning(&self, sql: &mut String, returning: &[Aliased]) -> Result<()> {
        if returning.is_empty() {
            return Ok(());
        }
        if !self.dialect().supports_returning() {
            return Err(Error::Unsupported {
                feature: "RETURNING",
                dialect: self.dialect().name(),
            });
        }
        sql.push('\n');
        sql.push_str(self.returning(returning.iter().cloned()).as_str());
        Ok(())
    }

    fn push_upsert(&self, sql: &mut String, upsert: Option<&Upsert>) -> Result<()> {
        if let Some(upsert) = upsert {
            sql.push('\n');
            sql.push_str(self.upsert(upsert)?.as_str());
        }
        Ok(())
    }

    /// Renders an INSERT of a single row.
    ///
    /// ```rust
    /// use sqlman_core::builder::{ConflictAction, Generator, Insert};
    ///
    /// let insert = Insert::new("users")
    ///     .value("name", "O'Brien")
    ///     .value("age", 42)
    ///     .or(ConflictAction::Ignore);
    /// let sql = Generator::sqlite().insert(&insert).unwrap();
    /// assert_eq!(
    ///     sql.as_str(),
    ///     r#"INSERT OR IGNORE INTO "users"("name","age") VALUES('O''Brien',42)"#
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRow`] for a row without columns, and the
    /// errors of [`Generator::upsert`]. RETURNING on a dialect without
    /// support yields [`Error::Unsupported`].
    pub fn insert(&self, insert: &Insert) -> Result<Fragment<D>> {
        if insert.row.is_empty() {
            return Err(Error::EmptyRow(insert.table.clone()));
        }
        let mut sql = self.insert_head(&insert.table, insert.conflict);
        let columns = self.names(insert.row.iter().map(|(column, _)| column.as_str()), false);
        let values = self.values(insert.row.iter().map(|(_, value)| value.clone()));
        sql.push_str(&format!("({columns}) VALUES({values})"));
        self.push_upsert(&mut sql, insert.upsert.as_ref())?;
        self.push_returning(&mut sql, &insert.returning)?;
        debug!(sql = %sql, table = %insert.table, "Rendered INSERT");
        Ok(self.raw(sql))
    }

    /// `INSERT [OR action] INTO "table"\nDEFAULT VALUES`
    #[must_use]
    pub fn insert_default(&self, table: &str, conflict: Option<ConflictAction>) -> Fragment<D> {
        let mut sql = self.insert_head(table, conflict);
        sql.push_str("\nDEFAULT VALUES");
        self.raw(sql)
    }

    /// Renders an INSERT … SELECT.
    ///
    /// With an upsert clause and no `WHERE` in the select, `WHERE true` is
    /// added so SQLite does not read `ON` as a join constraint.
    ///
    /// # Errors
    ///
    /// The errors of [`Generator::select`] and [`Generator::upsert`], and
    /// [`Error::Unsupported`] for RETURNING on a dialect without it.
    pub fn insert_select(&self, insert: &InsertSelect) -> Result<Fragment<D>> {
        let mut sql = self.insert_head(&insert.table, insert.conflict);
        if !insert.columns.is_empty() {
            sql.push_str(&format!(
                " ({})",
                self.names(insert.columns.iter().map(String::as_str), false)
            ));
        }
        let select = if insert.upsert.is_some() && insert.select.filter.is_empty() {
            let mut select = insert.select.clone();
            select.filter.push((String::new(), Datum::raw("true")));
            self.select(&select)?
        } else {
            self.select(&insert.select)?
        };
        sql.push('\n');
        sql.push_str(select.as_str());
        self.push_upsert(&mut sql, insert.upsert.as_ref())?;
        self.push_returning(&mut sql, &insert.returning)?;
        debug!(sql = %sql, table = %insert.table, "Rendered INSERT SELECT");
        Ok(self.raw(sql))
    }
}
