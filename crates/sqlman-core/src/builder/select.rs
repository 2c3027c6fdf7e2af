//! SELECT statements.

use tracing::debug;

use super::expr::{Aliased, OrderTerm};
use super::fragment::Fragment;
use super::generator::{Conditions, Generator};
use super::value::Datum;
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// A SELECT statement.
///
/// Clauses are emitted only when set. An empty column list selects `*`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    /// `DISTINCT`
    pub distinct: bool,
    /// Result columns.
    pub columns: Vec<Aliased>,
    /// `FROM` items; a converted [`Fragment`] may carry a join chain.
    pub from: Vec<Aliased>,
    /// `WHERE` entries, joined with `AND`.
    pub filter: Conditions,
    /// `GROUP BY` expressions.
    pub group_by: Vec<Aliased>,
    /// `HAVING` entries, joined with `AND`.
    pub having: Conditions,
    /// Trusted `WINDOW` definition text.
    pub window: Option<String>,
    /// `ORDER BY` terms.
    pub order_by: Vec<OrderTerm>,
    /// `LIMIT` expression.
    pub limit: Option<Datum>,
    /// `OFFSET` expression; requires `limit`.
    pub offset: Option<Datum>,
}

impl Select {
    /// Creates an empty SELECT (`SELECT *`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `DISTINCT`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a result column.
    #[must_use]
    pub fn column(mut self, column: impl Into<Aliased>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Adds result columns.
    #[must_use]
    pub fn columns<I, A>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Aliased>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
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

    /// Adds a `GROUP BY` expression.
    #[must_use]
    pub fn group_by(mut self, expr: impl Into<Aliased>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    /// Adds `"column" = value` to `HAVING`.
    #[must_use]
    pub fn having_eq(mut self, column: &str, value: impl Into<Datum>) -> Self {
        self.having.push((String::from(column), value.into()));
        self
    }

    /// Adds a complete condition to `HAVING`.
    #[must_use]
    pub fn having_sql<D: Dialect>(mut self, condition: Fragment<D>) -> Self {
        self.having.push((String::new(), condition.into()));
        self
    }

    /// Sets the trusted `WINDOW` definition text.
    #[must_use]
    pub fn window(mut self, definition: impl Into<String>) -> Self {
        self.window = Some(definition.into());
        self
    }

    /// Adds an ordering term.
    #[must_use]
    pub fn order_by(mut self, term: impl Into<OrderTerm>) -> Self {
        self.order_by.push(term.into());
        self
    }

    /// Sets `LIMIT`.
    #[must_use]
    pub fn limit(mut self, limit: impl Into<Datum>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Sets `OFFSET`.
    #[must_use]
    pub fn offset(mut self, offset: impl Into<Datum>) -> Self {
        self.offset = Some(offset.into());
        self
    }
}

impl<D: Dialect> Generator<D> {
    /// Renders a SELECT statement.
    ///
    /// ```rust
    /// use sqlman_core::builder::{Generator, OrderTerm, Select};
    ///
    /// let select = Select::new()
    ///     .columns(["id", "name"])
    ///     .from("users")
    ///     .where_eq("active", true)
    ///     .order_by(OrderTerm::new("name").desc())
    ///     .limit(10);
    /// let sql = Generator::sqlite().select(&select).unwrap();
    /// assert_eq!(
    ///     sql.as_str(),
    ///     "SELECT \"id\",\"name\"\nFROM \"users\"\nWHERE \"active\" = 1\nORDER BY \"name\" DESC\nLIMIT 10"
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::OffsetWithoutLimit`] when `offset` is set without
    /// `limit`.
    pub fn select(&self, select: &Select) -> Result<Fragment<D>> {
        if select.offset.is_some() && select.limit.is_none() {
            return Err(Error::OffsetWithoutLimit);
        }
        let mut sql = String::from("SELECT ");
        if select.distinct {
            sql.push_str("DISTINCT ");
        }
        if select.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(self.names(select.columns.iter().cloned(), true).as_str());
        }
        if !select.from.is_empty() {
            sql.push_str("\nFROM ");
            sql.push_str(self.names(select.from.iter().cloned(), true).as_str());
        }
        if !select.filter.is_empty() {
            sql.push_str("\nWHERE ");
            sql.push_str(self.conditions(&select.filter).as_str());
        }
        if !select.group_by.is_empty() {
            sql.push_str("\nGROUP BY ");
            sql.push_str(self.names(select.group_by.iter().cloned(), false).as_str());
        }
        if !select.having.is_empty() {
            sql.push_str("\nHAVING ");
            sql.push_str(self.conditions(&select.having).as_str());
        }
        if let Some(window) = &select.window {
            sql.push_str("\nWINDOW ");
            sql.push_str(window);
        }
        if !select.order_by.is_empty() {
            sql.push_str("\nORDER BY ");
            sql.push_str(self.order_by(select.order_by.iter().cloned()).as_str());
        }
        if let Some(limit) = &select.limit {
            sql.push_str("\nLIMIT ");
            sql.push_str(self.fragment().datum(limit).as_str());
            if let Some(offset) = &select.offset {
                sql.push_str("\nOFFSET ");
                sql.push_str(self.fragment().datum(offset).as_str());
            }
        }
        debug!(sql = %sql, "Rendered SELECT");
        Ok(self.raw(sql))
    }

    /// `VALUES (…),\n(…)`
    ///
    /// An empty row list yields an empty fragment.
    #[must_use]
    pub fn values_rows<R, I, V>(&self, rows: R) -> Fragment<D>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = V>,
        V: Into<Datum>,
    {
        let rows = rows
            .into_iter()
            .map(|row| format!("({})", self.values(row)))
            .collect::<Vec<_>>();
        if rows.is_empty() {
            return self.fragment();
        }
        self.raw(format!("VALUES {}", rows.join(",\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::expr::Nulls;
    use crate::builder::JoinKind;

    fn g() -> Generator {
        Generator::sqlite()
    }

    #[test]
    fn test_select_star() {
        let sql = g().select(&Select::new().from("t")).unwrap();
        assert_eq!(sql.as_str(), "SELECT *\nFROM \"t\"");
    }

    #[test]
    fn test_select_no_from() {
        let select = Select::new().column(g().fn_values("ABS", [-1]));
        let sql = g().select(&select).unwrap();
        assert_eq!(sql.as_str(), "SELECT ABS(-1)");
    }

    #[test]
    fn test_select_all_clauses() {
        let select = Select::new()
            .distinct()
            .column(("u.name", "n"))
            .column((g().fn_names("COUNT", ["o.id"]), "orders"))
            .from(
                g().name("users").alias("u")
                    .join_on(("orders", "o"), [("o.user_id", "u.id")], JoinKind::Left),
            )
            .where_eq("u.active", true)
            .group_by("u.name")
            .having_sql(g().fn_names("COUNT", ["o.id"]).gt(1))
            .order_by(OrderTerm::new("orders").desc().nulls(Nulls::Last))
            .limit(20)
            .offset(40);
        let sql = g().select(&select).unwrap();
        assert_eq!(
            sql.as_str(),
            "SELECT DISTINCT \"u\".\"name\" AS \"n\",COUNT(\"o\".\"id\") AS \"orders\"\n\
             FROM \"users\" AS \"u\" LEFT JOIN \"orders\" AS \"o\" ON \"o\".\"user_id\" = \"u\".\"id\"\n\
             WHERE \"u\".\"active\" = 1\n\
             GROUP BY \"u\".\"name\"\n\
             HAVING COUNT(\"o\".\"id\") > 1\n\
             ORDER BY \"orders\" DESC NULLS LAST\n\
             LIMIT 20\n\
             OFFSET 40"
        );
    }

    #[test]
    fn test_offset_without_limit_is_rejected() {
        let select = Select::new().from("t").offset(5);
        assert_eq!(g().select(&select), Err(Error::OffsetWithoutLimit));
    }

    #[test]
    fn test_window_is_verbatim() {
        let select = Select::new()
            .column(g().raw("row_number() OVER w"))
            .from("t")
            .window("w AS (ORDER BY \"x\")");
        let sql = g().select(&select).unwrap();
        assert_eq!(
            sql.as_str(),
            "SELECT row_number() OVER w\nFROM \"t\"\nWINDOW w AS (ORDER BY \"x\")"
        );
    }

    #[test]
    fn test_values_rows() {
        let sql = g().values_rows([vec![1, 2], vec![3, 4]]);
        assert_eq!(sql.as_str(), "VALUES (1,2),\n(3,4)");
        assert!(g().values_rows(Vec::<Vec<i32>>::new()).is_empty());
    }
}
