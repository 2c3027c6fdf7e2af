//! The fragment builder.
//!
//! A [`Fragment`] is an owned buffer of SQL text. Chain methods take the
//! fragment by value and hand it back, so a fragment is never aliased;
//! `clone()` copies the buffer and nothing else.
//!
//! Every method that appends data routes it through the identifier
//! quoter or the value escaper first. Only [`Fragment::raw`] (and the
//! keyword-only helpers built on it) appends text untouched.
//!
//! ```rust
//! use sqlman_core::builder::{Fragment, JoinKind};
//!
//! let sql = Fragment::new()
//!     .raw("SELECT")
//!     .names(["u.id", "o.total"], false)
//!     .raw("FROM")
//!     .name_as("users", "u")
//!     .join_on(("orders", "o"), [("o.user_id", "u.id")], JoinKind::Left)
//!     .raw("WHERE")
//!     .name("u.email")
//!     .ends("@example.com");
//!
//! assert_eq!(
//!     sql.as_str(),
//!     r#"SELECT "u"."id","o"."total" FROM "users" AS "u" LEFT JOIN "orders" AS "o" ON "o"."user_id" = "u"."id" WHERE "u"."email" LIKE '%'||'@example.com'"#
//! );
//! ```

use std::fmt;

use super::expr::{Aliased, JoinKind};
use super::value::{escape_value_with, Datum, EscapeMode};
use crate::dialect::{Dialect, SqliteDialect};

/// An owned piece of SQL text.
#[derive(Debug, Clone, Default)]
pub struct Fragment<D: Dialect = SqliteDialect> {
    dialect: D,
    sql: String,
}

impl Fragment<SqliteDialect> {
    /// Creates an empty SQLite fragment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: Dialect> Fragment<D> {
    /// Creates an empty fragment for the given dialect.
    #[must_use]
    pub const fn with_dialect(dialect: D) -> Self {
        Self {
            dialect,
            sql: String::new(),
        }
    }

    /// Returns the dialect this fragment escapes for.
    #[must_use]
    pub fn dialect(&self) -> D {
        self.dialect
    }

    /// Appends a token verbatim, separated by a space unless the buffer is
    /// empty. An empty token appends nothing.
    ///
    /// **Trusted input only.** Use this for keywords and for text that was
    /// already escaped.
    #[must_use]
    pub fn raw(mut self, token: impl AsRef<str>) -> Self {
        let token = token.as_ref();
        if token.is_empty() {
            return self;
        }
        if !self.sql.is_empty() {
            self.sql.push(' ');
        }
        self.sql.push_str(token);
        self
    }

    /// Appends another fragment.
    #[must_use]
    pub fn append(self, other: Self) -> Self {
        self.raw(other.sql)
    }

    fn tight(mut self, token: &str) -> Self {
        self.sql.push_str(token);
        self
    }

    fn escape(&self, datum: &Datum, mode: EscapeMode) -> String {
        escape_value_with(&self.dialect, datum, mode)
    }

    pub(crate) fn render_aliased(&self, item: &Aliased, with_alias: bool) -> String {
        let expr = self.escape(&item.expr, EscapeMode::Standard);
        match &item.alias {
            Some(alias) if with_alias => {
                format!("{expr} AS {}", self.dialect.quote_identifier(alias))
            }
            _ => expr,
        }
    }

    /// Appends a quoted, possibly dotted name.
    #[must_use]
    pub fn name(self, name: &str) -> Self {
        let quoted = self.dialect.quote_name(name);
        self.raw(quoted)
    }

    /// Appends `"name" AS "alias"`.
    #[must_use]
    pub fn name_as(self, name: &str, alias: &str) -> Self {
        self.name(name).alias(alias)
    }

    /// Appends `AS "alias"`.
    #[must_use]
    pub fn alias(self, alias: &str) -> Self {
        let quoted = self.dialect.quote_identifier(alias);
        self.raw("AS").raw(quoted)
    }

    /// Appends a comma separated list of names or expressions. Aliases are
    /// rendered only when `with_alias` is set. An empty list appends
    /// nothing.
    #[must_use]
    pub fn names<I, A>(self, list: I, with_alias: bool) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Aliased>,
    {
        let joined = list
            .into_iter()
            .map(|item| self.render_aliased(&item.into(), with_alias))
            .collect::<Vec<_>>()
            .join(",");
        self.raw(joined)
    }

    /// Appends an escaped datum.
    #[must_use]
    pub fn datum(self, datum: &Datum) -> Self {
        let escaped = self.escape(datum, EscapeMode::Standard);
        self.raw(escaped)
    }

    /// Appends an escaped literal.
    #[must_use]
    pub fn value(self, value: impl Into<Datum>) -> Self {
        self.value_with(value, EscapeMode::Standard)
    }

    /// Appends an escaped literal using the given mode.
    #[must_use]
    pub fn value_with(self, value: impl Into<Datum>, mode: EscapeMode) -> Self {
        let escaped = self.escape(&value.into(), mode);
        self.raw(escaped)
    }

    /// Appends a comma separated list of literals. An empty list appends
    /// nothing.
    #[must_use]
    pub fn values<I, V>(self, list: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Datum>,
    {
        self.values_with(list, EscapeMode::Standard)
    }

    /// Like [`Fragment::values`] with an explicit escape mode.
    #[must_use]
    pub fn values_with<I, V>(self, list: I, mode: EscapeMode) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Datum>,
    {
        let joined = list
            .into_iter()
            .map(|value| self.escape(&value.into(), mode))
            .collect::<Vec<_>>()
            .join(",");
        self.raw(joined)
    }

    /// Appends `,token` with no space.
    #[must_use]
    pub fn comma(self, token: impl AsRef<str>) -> Self {
        self.tight(",").tight(token.as_ref())
    }

    /// Appends `,` and an escaped literal.
    #[must_use]
    pub fn comma_value(self, value: impl Into<Datum>) -> Self {
        let escaped = self.escape(&value.into(), EscapeMode::Standard);
        self.comma(escaped)
    }

    /// Appends `,` and a quoted name.
    #[must_use]
    pub fn comma_name(self, name: &str) -> Self {
        let quoted = self.dialect.quote_name(name);
        self.comma(quoted)
    }

    /// Appends `||` and an escaped literal.
    #[must_use]
    pub fn concat(self, value: impl Into<Datum>) -> Self {
        let escaped = self.escape(&value.into(), EscapeMode::Standard);
        self.tight("||").tight(&escaped)
    }

    /// Wraps the whole buffer in parentheses.
    #[must_use]
    pub fn parenthesize(mut self) -> Self {
        self.sql = format!("({})", self.sql);
        self
    }

    /// Appends `(inner)`.
    #[must_use]
    pub fn group(self, inner: Self) -> Self {
        self.raw(format!("({})", inner.sql))
    }

    /// Prefixes the whole buffer with `NOT `. An empty buffer is left as is.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(mut self) -> Self {
        if !self.sql.is_empty() {
            self.sql.insert_str(0, "NOT ");
        }
        self
    }

    fn op(self, operator: &str, operand: &Datum) -> Self {
        self.raw(operator).datum(operand)
    }

    /// `= value`, or `IS NULL` for a null literal.
    #[must_use]
    pub fn eq(self, value: impl Into<Datum>) -> Self {
        let value = value.into();
        if value.is_null() {
            return self.op("IS", &value);
        }
        self.op("=", &value)
    }

    /// `<> value`, or `IS NOT NULL` for a null literal.
    #[must_use]
    pub fn ne(self, value: impl Into<Datum>) -> Self {
        let value = value.into();
        if value.is_null() {
            return self.op("IS NOT", &value);
        }
        self.op("<>", &value)
    }

    /// `IS value`
    #[must_use]
    pub fn is(self, value: impl Into<Datum>) -> Self {
        self.op("IS", &value.into())
    }

    /// `IS NOT value`
    #[must_use]
    pub fn is_not(self, value: impl Into<Datum>) -> Self {
        self.op("IS NOT", &value.into())
    }

    /// `> value`
    #[must_use]
    pub fn gt(self, value: impl Into<Datum>) -> Self {
        self.op(">", &value.into())
    }

    /// `< value`
    #[must_use]
    pub fn lt(self, value: impl Into<Datum>) -> Self {
        self.op("<", &value.into())
    }

    /// `>= value`
    #[must_use]
    pub fn ge(self, value: impl Into<Datum>) -> Self {
        self.op(">=", &value.into())
    }

    /// `<= value`
    #[must_use]
    pub fn le(self, value: impl Into<Datum>) -> Self {
        self.op("<=", &value.into())
    }

    /// `BETWEEN low AND high`
    #[must_use]
    pub fn between(self, low: impl Into<Datum>, high: impl Into<Datum>) -> Self {
        self.op("BETWEEN", &low.into()).op("AND", &high.into())
    }

    /// `NOT BETWEEN low AND high`
    #[must_use]
    pub fn not_between(self, low: impl Into<Datum>, high: impl Into<Datum>) -> Self {
        self.op("NOT BETWEEN", &low.into()).op("AND", &high.into())
    }

    /// `IN (v1,v2,…)`
    ///
    /// An empty list renders `IN ()`, which SQLite rejects. Check for it
    /// before calling.
    #[must_use]
    pub fn in_list<I, V>(self, list: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Datum>,
    {
        let inner = Self::with_dialect(self.dialect).values(list);
        self.raw("IN").group(inner)
    }

    /// `NOT IN (v1,v2,…)`
    #[must_use]
    pub fn not_in_list<I, V>(self, list: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Datum>,
    {
        let inner = Self::with_dialect(self.dialect).values(list);
        self.raw("NOT IN").group(inner)
    }

    /// `LIKE pattern`
    #[must_use]
    pub fn like(self, pattern: impl Into<Datum>) -> Self {
        self.op("LIKE", &pattern.into())
    }

    /// `NOT LIKE pattern`
    #[must_use]
    pub fn not_like(self, pattern: impl Into<Datum>) -> Self {
        self.op("NOT LIKE", &pattern.into())
    }

    fn pattern(&self, prefix: bool, value: Datum, suffix: bool) -> Datum {
        let mut pattern = Self::with_dialect(self.dialect);
        pattern = if prefix {
            pattern.value("%").concat(value)
        } else {
            pattern.datum(&value)
        };
        if suffix {
            pattern = pattern.concat("%");
        }
        Datum::from(pattern)
    }

    /// `LIKE value||'%'`
    #[must_use]
    pub fn begins(self, value: impl Into<Datum>) -> Self {
        let pattern = self.pattern(false, value.into(), true);
        self.like(pattern)
    }

    /// `NOT LIKE value||'%'`
    #[must_use]
    pub fn not_begins(self, value: impl Into<Datum>) -> Self {
        let pattern = self.pattern(false, value.into(), true);
        self.not_like(pattern)
    }

    /// `LIKE '%'||value`
    #[must_use]
    pub fn ends(self, value: impl Into<Datum>) -> Self {
        let pattern = self.pattern(true, value.into(), false);
        self.like(pattern)
    }

    /// `NOT LIKE '%'||value`
    #[must_use]
    pub fn not_ends(self, value: impl Into<Datum>) -> Self {
        let pattern = self.pattern(true, value.into(), false);
        self.not_like(pattern)
    }

    /// `LIKE '%'||value||'%'`
    #[must_use]
    pub fn contains(self, value: impl Into<Datum>) -> Self {
        let pattern = self.pattern(true, value.into(), true);
        self.like(pattern)
    }

    /// `NOT LIKE '%'||value||'%'`
    #[must_use]
    pub fn not_contains(self, value: impl Into<Datum>) -> Self {
        let pattern = self.pattern(true, value.into(), true);
        self.not_like(pattern)
    }

    fn join_head(self, natural: bool, table: impl Into<Aliased>, kind: JoinKind) -> Self {
        let table = self.render_aliased(&table.into(), true);
        let sql = if natural { self.raw("NATURAL") } else { self };
        sql.raw(kind.as_str()).raw("JOIN").raw(table)
    }

    /// `[kind] JOIN table`
    #[must_use]
    pub fn join(self, table: impl Into<Aliased>, kind: JoinKind) -> Self {
        self.join_head(false, table, kind)
    }

    /// `NATURAL [kind] JOIN table`
    #[must_use]
    pub fn natural_join(self, table: impl Into<Aliased>, kind: JoinKind) -> Self {
        self.join_head(true, table, kind)
    }

    /// `[kind] JOIN table ON "l1" = "r1" AND "l2" = "r2"`
    #[must_use]
    pub fn join_on<I, L, R>(self, table: impl Into<Aliased>, on: I, kind: JoinKind) -> Self
    where
        I: IntoIterator<Item = (L, R)>,
        L: AsRef<str>,
        R: AsRef<str>,
    {
        let mut condition = Self::with_dialect(self.dialect);
        for (i, (left, right)) in on.into_iter().enumerate() {
            if i > 0 {
                condition = condition.raw("AND");
            }
            condition = condition
                .name(left.as_ref())
                .eq(Datum::name(right.as_ref()));
        }
        self.join_on_condition(table, condition, kind)
    }

    /// `[kind] JOIN table ON condition`
    #[must_use]
    pub fn join_on_condition(self, table: impl Into<Aliased>, condition: Self, kind: JoinKind) -> Self {
        self.join_head(false, table, kind).raw("ON").append(condition)
    }

    /// `[kind] JOIN table USING ("c1","c2")`
    #[must_use]
    pub fn join_using<I, S>(self, table: impl Into<Aliased>, columns: I, kind: JoinKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Aliased>,
    {
        let using = Self::with_dialect(self.dialect).names(columns, false);
        self.join_head(false, table, kind).raw("USING").group(using)
    }

    /// `CROSS JOIN table`
    #[must_use]
    pub fn cross_join(self, table: impl Into<Aliased>) -> Self {
        let table = self.render_aliased(&table.into(), true);
        self.raw("CROSS JOIN").raw(table)
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.sql
    }

    /// Returns `true` when nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Consumes the fragment, returning the SQL text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.sql
    }
}

impl<D: Dialect> PartialEq for Fragment<D> {
    fn eq(&self, other: &Self) -> bool {
        self.sql == other.sql
    }
}

impl<D: Dialect> fmt::Display for Fragment<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl<D: Dialect> AsRef<str> for Fragment<D> {
    fn as_ref(&self) -> &str {
        &self.sql
    }
}

impl<D: Dialect> From<Fragment<D>> for Datum {
    fn from(fragment: Fragment<D>) -> Self {
        Self::Raw(fragment.sql)
    }
}

impl<D: Dialect> From<Fragment<D>> for String {
    fn from(fragment: Fragment<D>) -> Self {
        fragment.sql
    }
}
