//! UPSERT clause (`ON CONFLICT …`) for INSERT statements.

use super::expr::OrderTerm;
use super::fragment::Fragment;
use super::generator::{Conditions, Generator};
use super::value::Datum;
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// `ON CONFLICT [(target) [WHERE …]] DO UPDATE SET … [WHERE …]` or
/// `DO NOTHING` when `set` is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Upsert {
    /// Conflict target columns.
    pub target: Vec<OrderTerm>,
    /// Partial index condition for the conflict target.
    pub target_filter: Conditions,
    /// `DO UPDATE SET` assignments.
    pub set: Conditions,
    /// Condition limiting which conflicting rows are updated.
    pub set_filter: Conditions,
}

impl Upsert {
    /// `ON CONFLICT DO NOTHING`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a conflict target column.
    #[must_use]
    pub fn target(mut self, column: impl Into<OrderTerm>) -> Self {
        self.target.push(column.into());
        self
    }

    /// Adds `"column" = value` to the conflict target `WHERE`.
    #[must_use]
    pub fn target_where(mut self, column: &str, value: impl Into<Datum>) -> Self {
        self.target_filter.push((String::from(column), value.into()));
        self
    }

    /// Adds an assignment to `DO UPDATE SET`.
    #[must_use]
    pub fn set(mut self, column: &str, value: impl Into<Datum>) -> Self {
        self.set.push((String::from(column), value.into()));
        self
    }

    /// Adds a complete assignment to `DO UPDATE SET`.
    #[must_use]
    pub fn set_sql<D: Dialect>(mut self, assignment: Fragment<D>) -> Self {
        self.set.push((String::new(), assignment.into()));
        self
    }

    /// Adds `"column" = value` to the update `WHERE`.
    #[must_use]
    pub fn update_where(mut self, column: &str, value: impl Into<Datum>) -> Self {
        self.set_filter.push((String::from(column), value.into()));
        self
    }

    /// Adds a complete condition to the update `WHERE`.
    #[must_use]
    pub fn update_where_sql<D: Dialect>(mut self, condition: Fragment<D>) -> Self {
        self.set_filter.push((String::new(), condition.into()));
        self
    }
}

impl<D: Dialect> Generator<D> {
    /// Renders an upsert clause.
    ///
    /// ```rust
    /// use sqlman_core::builder::{Generator, Upsert};
    ///
    /// let g = Generator::sqlite();
    /// let upsert = Upsert::new()
    ///     .target("email")
    ///     .set("name", g.excluded("name"));
    /// assert_eq!(
    ///     g.upsert(&upsert).unwrap().as_str(),
    ///     r#"ON CONFLICT ("email") DO UPDATE SET "name" = "excluded"."name""#
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// - [`Error::Unsupported`] when the dialect has no upsert.
    /// - [`Error::ConflictWhereWithoutTarget`] when `target_filter` is set
    ///   without `target`.
    /// - [`Error::UpdateWhereWithoutSet`] when `set_filter` is set without
    ///   `set`.
    pub fn upsert(&self, upsert: &Upsert) -> Result<Fragment<D>> {
        if !self.dialect().supports_upsert() {
            return Err(Error::Unsupported {
                feature: "ON CONFLICT",
                dialect: self.dialect().name(),
            });
        }
        if upsert.target.is_empty() && !upsert.target_filter.is_empty() {
            return Err(Error::ConflictWhereWithoutTarget);
        }
        if upsert.set.is_empty() && !upsert.set_filter.is_empty() {
            return Err(Error::UpdateWhereWithoutSet);
        }
        let mut sql = String::from("ON CONFLICT");
        if !upsert.target.is_empty() {
            sql.push_str(&format!(
                " ({})",
                self.indexed_columns(upsert.target.iter().cloned())
            ));
            if !upsert.target_filter.is_empty() {
                sql.push_str("\nWHERE ");
                sql.push_str(self.conditions(&upsert.target_filter).as_str());
            }
        }
        if upsert.set.is_empty() {
            sql.push_str(" DO NOTHING");
        } else {
            sql.push_str(" DO UPDATE SET ");
            sql.push_str(
                self.set_clause(upsert.set.iter().map(|(k, v)| (k.as_str(), v.clone())))
                    .as_str(),
            );
            if !upsert.set_filter.is_empty() {
                sql.push_str("\nWHERE ");
                sql.push_str(self.conditions(&upsert.set_filter).as_str());
            }
        }
        Ok(self.raw(sql))
    }
}
