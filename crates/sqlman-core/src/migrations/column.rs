//! Column specifications and column definition rendering.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::affinity::{affinity, TypeAffinity};
use crate::builder::{Fragment, Generator, SqlValue, ToSqlValue};
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// A declared type: one or more words, optionally followed by one or two
/// signed numbers in parentheses (`VARCHAR(30)`, `DECIMAL(10, 2)`,
/// `UNSIGNED BIG INT`).
static TYPE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z_][A-Za-z0-9_]*(?:\s+[A-Za-z_][A-Za-z0-9_]*)*(?:\s*\(\s*[+-]?\d+(?:\.\d+)?\s*(?:,\s*[+-]?\d+(?:\.\d+)?\s*)?\))?$",
    )
    .expect("type name pattern is a valid regex")
});

/// Default of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDefault {
    /// A literal, rendered as `DEFAULT <escaped>`.
    Value(SqlValue),
    /// A trusted expression, rendered as `DEFAULT (<expr>)`.
    Expr(String),
}

/// Storage of a generated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedKind {
    /// `STORED`
    Stored,
    /// `VIRTUAL`
    Virtual,
}

/// A generated column expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generated {
    /// Trusted expression text.
    pub expr: String,
    /// Storage kind.
    pub kind: GeneratedKind,
}

/// Desired definition of a column.
///
/// Deserializes from JSON such as
/// `{"type": "INTEGER", "not_null": true, "primary_key": 1}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSpec {
    /// Declared type; empty for none.
    #[serde(rename = "type")]
    pub declared_type: String,
    /// `NOT NULL`
    pub not_null: bool,
    /// `UNIQUE`
    pub unique: bool,
    /// `DEFAULT …`
    pub default: Option<ColumnDefault>,
    /// `AS (…) STORED|VIRTUAL`
    pub generated: Option<Generated>,
    /// Position in the primary key, starting at 1.
    pub primary_key: Option<u32>,
    /// `AUTOINCREMENT`; only valid on a lone `INTEGER` primary key.
    pub autoincrement: bool,
    /// `COLLATE "name"`
    pub collate: Option<String>,
    /// Trusted `CHECK (…)` expression.
    pub check: Option<String>,
}

impl ColumnSpec {
    /// Creates a spec with the given declared type.
    #[must_use]
    pub fn new(declared_type: &str) -> Self {
        Self {
            declared_type: String::from(declared_type),
            ..Self::default()
        }
    }

    /// Sets `NOT NULL`.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Sets `UNIQUE`.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets a literal default.
    #[must_use]
    pub fn default_value(mut self, value: impl ToSqlValue) -> Self {
        self.default = Some(ColumnDefault::Value(value.to_sql_value()));
        self
    }

    /// Sets a default expression.
    #[must_use]
    pub fn default_expr(mut self, expr: &str) -> Self {
        self.default = Some(ColumnDefault::Expr(String::from(expr)));
        self
    }

    /// Makes the column generated.
    #[must_use]
    pub fn generated(mut self, expr: &str, kind: GeneratedKind) -> Self {
        self.generated = Some(Generated {
            expr: String::from(expr),
            kind,
        });
        self
    }

    /// Sets the primary key position.
    #[must_use]
    pub const fn primary_key(mut self, position: u32) -> Self {
        self.primary_key = Some(position);
        self
    }

    /// Sets `AUTOINCREMENT`.
    #[must_use]
    pub const fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collate(mut self, collation: &str) -> Self {
        self.collate = Some(String::from(collation));
        self
    }

    /// Sets a check expression.
    #[must_use]
    pub fn check(mut self, expr: &str) -> Self {
        self.check = Some(String::from(expr));
        self
    }

    /// Returns the affinity of the declared type.
    #[must_use]
    pub fn affinity(&self) -> TypeAffinity {
        affinity(&self.declared_type)
    }

    /// Returns `true` for an inline `PRIMARY KEY AUTOINCREMENT` column.
    #[must_use]
    pub(crate) const fn is_inline_primary_key(&self) -> bool {
        self.autoincrement && self.primary_key.is_some()
    }
}

impl From<&str> for ColumnSpec {
    fn from(declared_type: &str) -> Self {
        Self::new(declared_type)
    }
}

/// Validates a declared type.
///
/// # Errors
///
/// Returns [`Error::InvalidTypeName`] for anything but words with an
/// optional numeric size suffix.
pub fn validate_type_name(declared_type: &str) -> Result<()> {
    if declared_type.is_empty() || TYPE_NAME.is_match(declared_type) {
        Ok(())
    } else {
        Err(Error::InvalidTypeName(String::from(declared_type)))
    }
}

impl<D: Dialect> Generator<D> {
    /// Renders one column definition:
    /// name, type, `NOT NULL`, `UNIQUE`, `DEFAULT`, `COLLATE`, `CHECK`,
    /// `AS (…)`, then `PRIMARY KEY AUTOINCREMENT` for an autoincrement key.
    ///
    /// ```rust
    /// use sqlman_core::builder::Generator;
    /// use sqlman_core::migrations::ColumnSpec;
    ///
    /// let spec = ColumnSpec::new("TEXT").not_null().default_value("n/a");
    /// let sql = Generator::sqlite().column_def("note", &spec).unwrap();
    /// assert_eq!(sql.as_str(), r#""note" TEXT NOT NULL DEFAULT 'n/a'"#);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTypeName`] for an unsafe declared type.
    pub fn column_def(&self, name: &str, spec: &ColumnSpec) -> Result<Fragment<D>> {
        validate_type_name(&spec.declared_type)?;
        let mut sql = self
            .raw(self.dialect().quote_identifier(name))
            .raw(&spec.declared_type);
        if spec.not_null {
            sql = sql.raw("NOT NULL");
        }
        if spec.unique {
            sql = sql.raw("UNIQUE");
        }
        match &spec.default {
            Some(ColumnDefault::Value(value)) => sql = sql.raw("DEFAULT").value(value.clone()),
            Some(ColumnDefault::Expr(expr)) => sql = sql.raw("DEFAULT").raw(format!("({expr})")),
            None => {}
        }
        if let Some(collation) = &spec.collate {
            sql = sql
                .raw("COLLATE")
                .raw(self.dialect().quote_identifier(collation));
        }
        if let Some(check) = &spec.check {
            sql = sql.raw(format!("CHECK ({check})"));
        }
        if let Some(generated) = &spec.generated {
            let kind = match generated.kind {
                GeneratedKind::Stored => "STORED",
                GeneratedKind::Virtual => "VIRTUAL",
            };
            sql = sql.raw(format!("AS ({}) {kind}", generated.expr));
        }
        if spec.is_inline_primary_key() {
            sql = sql.raw("PRIMARY KEY AUTOINCREMENT");
        }
        Ok(sql)
    }
}
