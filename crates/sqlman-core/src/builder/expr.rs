//! Small plain-data pieces shared by the fragment builder and the
//! statement generators.

use std::fmt;

use super::fragment::Fragment;
use super::value::Datum;
use crate::dialect::Dialect;

/// An expression with an optional alias, as used in result columns and
/// `FROM` lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Aliased {
    /// The expression; usually [`Datum::Name`].
    pub expr: Datum,
    /// Alias rendered as `AS "alias"`.
    pub alias: Option<String>,
}

impl Aliased {
    /// A name with no alias.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            expr: Datum::name(name),
            alias: None,
        }
    }

    /// Sets the alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl From<&str> for Aliased {
    fn from(name: &str) -> Self {
        Self::name(name)
    }
}

impl From<String> for Aliased {
    fn from(name: String) -> Self {
        Self::name(name)
    }
}

impl From<(&str, &str)> for Aliased {
    fn from((name, alias): (&str, &str)) -> Self {
        Self::name(name).alias(alias)
    }
}

impl From<Datum> for Aliased {
    fn from(expr: Datum) -> Self {
        Self { expr, alias: None }
    }
}

impl<D: Dialect> From<Fragment<D>> for Aliased {
    fn from(fragment: Fragment<D>) -> Self {
        Self::from(Datum::from(fragment))
    }
}

impl<D: Dialect> From<(Fragment<D>, &str)> for Aliased {
    fn from((fragment, alias): (Fragment<D>, &str)) -> Self {
        Self::from(fragment).alias(alias)
    }
}

/// Join operator keyword placed before `JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// Plain `JOIN`.
    #[default]
    Plain,
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `LEFT OUTER JOIN`
    LeftOuter,
    /// `RIGHT JOIN`
    Right,
    /// `RIGHT OUTER JOIN`
    RightOuter,
    /// `FULL JOIN`
    Full,
    /// `FULL OUTER JOIN`
    FullOuter,
}

impl JoinKind {
    /// Returns the keyword, empty for [`JoinKind::Plain`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::LeftOuter => "LEFT OUTER",
            Self::Right => "RIGHT",
            Self::RightOuter => "RIGHT OUTER",
            Self::Full => "FULL",
            Self::FullOuter => "FULL OUTER",
        }
    }
}

/// `OR <action>` conflict resolution for INSERT and UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    /// `OR ABORT`
    Abort,
    /// `OR FAIL`
    Fail,
    /// `OR IGNORE`
    Ignore,
    /// `OR REPLACE`
    Replace,
    /// `OR ROLLBACK`
    Rollback,
}

impl ConflictAction {
    /// Returns the action keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Abort => "ABORT",
            Self::Fail => "FAIL",
            Self::Ignore => "IGNORE",
            Self::Replace => "REPLACE",
            Self::Rollback => "ROLLBACK",
        }
    }
}

impl fmt::Display for ConflictAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OR {}", self.as_str())
    }
}

/// Index hint for a qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Indexing {
    /// No hint.
    #[default]
    Any,
    /// `INDEXED BY "index"`
    By(String),
    /// `NOT INDEXED`
    NotIndexed,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

/// Placement of NULLs in an ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    /// `NULLS FIRST`
    First,
    /// `NULLS LAST`
    Last,
}

/// One `ORDER BY` term, also used as an indexed column in conflict
/// targets (where `nulls` is ignored).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    /// Sorted expression.
    pub expr: Datum,
    /// Optional `ASC` / `DESC`.
    pub direction: Option<Direction>,
    /// Optional `NULLS FIRST` / `NULLS LAST`.
    pub nulls: Option<Nulls>,
    /// Optional collation name.
    pub collate: Option<String>,
}

impl OrderTerm {
    /// Orders by a column name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::expr(Datum::name(name))
    }

    /// Orders by an arbitrary expression.
    #[must_use]
    pub const fn expr(expr: Datum) -> Self {
        Self {
            expr,
            direction: None,
            nulls: None,
            collate: None,
        }
    }

    /// `ASC`
    #[must_use]
    pub const fn asc(mut self) -> Self {
        self.direction = Some(Direction::Asc);
        self
    }

    /// `DESC`
    #[must_use]
    pub const fn desc(mut self) -> Self {
        self.direction = Some(Direction::Desc);
        self
    }

    /// `NULLS FIRST` / `NULLS LAST`
    #[must_use]
    pub const fn nulls(mut self, nulls: Nulls) -> Self {
        self.nulls = Some(nulls);
        self
    }

    /// `COLLATE "name"`
    #[must_use]
    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.collate = Some(collation.into());
        self
    }

    pub(crate) fn render<D: Dialect>(&self, dialect: D, with_nulls: bool) -> Fragment<D> {
        let mut sql = Fragment::with_dialect(dialect).datum(&self.expr);
        if let Some(collation) = &self.collate {
            sql = sql.raw("COLLATE").raw(dialect.quote_identifier(collation));
        }
        sql = match self.direction {
            Some(Direction::Asc) => sql.raw("ASC"),
            Some(Direction::Desc) => sql.raw("DESC"),
            None => sql,
        };
        match self.nulls {
            Some(Nulls::First) if with_nulls => sql.raw("NULLS FIRST"),
            Some(Nulls::Last) if with_nulls => sql.raw("NULLS LAST"),
            _ => sql,
        }
    }
}

impl From<&str> for OrderTerm {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for OrderTerm {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
