//! UPDATE statements.

use tracing::debug;

use super::expr::{Aliased, ConflictAction, Indexing};
use super::fragment::Fragment;
use super::generator::{Conditions, Generator};
use super::value::Datum;
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// `UPDATE [OR action] "table" SET … [FROM …] [WHERE …] [RETURNING …]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    /// Target table.
    pub table: String,
    /// Table alias.
    pub alias: Option<String>,
    /// Index hint.
    pub indexing: Indexing,
    /// Assignments.
    pub set: Conditions,
    /// `FROM` items.
    pub from: Vec<Aliased>,
    /// `WHERE` entries.
    pub filter: Conditions,
    /// `OR` conflict action.
    pub conflict: Option<ConflictAction>,
    /// `RETURNING` list.
    pub returning: Vec<Aliased>,
}

impl Update {
    /// Creates an UPDATE of the given table.
    #[must_use]
    pub fn table(table: &str) -> Self {
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

    /// Adds `"column" = value`.
    ///
    /// A raw fragment value is taken as a complete assignment, see
    /// [`Conditions`](super::Conditions).
    #[must_use]
    pub fn set(mut self, column: &str, value: impl Into<Datum>) -> Self {
        self.set.push((String::from(column), value.into()));
        self
    }

    /// Adds a complete assignment.
    #[must_use]
    pub fn set_sql<D: Dialect>(mut self, assignment: Fragment<D>) -> Self {
        self.set.push((String::new(), assignment.into()));
        self
    }

    /// Adds a `FROM` item.
    #[must_use]
    pub fn from(mut self, table: impl Into<Aliased>) -> Self {
        self.from.push(table.into());
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

    /// Sets `OR <action>`.
    #[must_use]
    pub const fn or(mut self, action: ConflictAction) -> Self {
        self.conflict = Some(action);
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
    /// Renders an UPDATE statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySet`] without assignments, and
    /// [`Error::Unsupported`] for RETURNING on a dialect without it.
    pub fn update(&self, update: &Update) -> Result<Fragment<D>> {
        if update.set.is_empty() {
            return Err(Error::EmptySet(update.table.clone()));
        }
        let mut sql = String::from("UPDATE");
        if let Some(action) = update.conflict {
            sql.push(' ');
            sql.push_str(&action.to_string());
        }
        let target = self.qualified_name(&update.table, update.alias.as_deref(), &update.indexing);
        let set = self.set_clause(update.set.iter().map(|(k, v)| (k.as_str(), v.clone())));
        sql.push_str(&format!(" {target} SET {set}"));
        if !update.from.is_empty() {
            sql.push_str("\nFROM ");
            sql.push_str(self.names(update.from.iter().cloned(), true).as_str());
        }
        if !update.filter.is_empty() {
            sql.push_str("\nWHERE ");
            sql.push_str(self.conditions(&update.filter).as_str());
        }
        self.push_returning(&mut sql, &update.returning)?;
        debug!(sql = %sql, table = %update.table, "Rendered UPDATE");
        Ok(self.raw(sql))
    }
}
