//! Table DDL: CREATE, DROP and ALTER TABLE.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::column::{ColumnDefault, ColumnSpec, GeneratedKind};
use crate::builder::SqlValue;
use crate::builder::{Fragment, Generator, Select};
use crate::dialect::Dialect;
use crate::error::{Error, Result};

fn check_add_column(column: &str, spec: &ColumnSpec) -> Result<()> {
    let reason = if spec.primary_key.is_some() || spec.autoincrement {
        Some("primary key columns need a table rebuild")
    } else if spec.unique {
        Some("UNIQUE columns need a table rebuild or a unique index")
    } else if matches!(spec.default, Some(ColumnDefault::Expr(_))) {
        Some("the default must be a literal value")
    } else if matches!(&spec.generated, Some(generated) if generated.kind == GeneratedKind::Stored) {
        Some("STORED generated columns need a table rebuild")
    } else if spec.not_null
        && spec.generated.is_none()
        && matches!(spec.default, None | Some(ColumnDefault::Value(SqlValue::Null)))
    {
        Some("NOT NULL requires a non-null default")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(Error::InvalidAddColumn {
            column: String::from(column),
            reason,
        }),
        None => Ok(()),
    }
}

/// A CREATE TABLE statement.
///
/// Columns render in insertion order. Primary key columns without
/// `autoincrement` are collected into one trailing `PRIMARY KEY(…)`
/// constraint ordered by their position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateTable {
    /// Table name, possibly schema qualified.
    pub name: String,
    /// Column specs by name.
    pub columns: IndexMap<String, ColumnSpec>,
    /// Trusted table constraints, appended after the primary key.
    pub constraints: Vec<String>,
    /// `TEMP`
    pub temporary: bool,
    /// `IF NOT EXISTS`
    pub if_not_exists: bool,
    /// `WITHOUT ROWID`
    pub without_rowid: bool,
    /// `STRICT`
    pub strict: bool,
}

impl CreateTable {
    /// Creates an empty CREATE TABLE.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            ..Self::default()
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, name: &str, spec: impl Into<ColumnSpec>) -> Self {
        self.columns.insert(String::from(name), spec.into());
        self
    }

    /// Adds a trusted table constraint such as `UNIQUE ("a","b")`.
    #[must_use]
    pub fn constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    /// Sets `TEMP`.
    #[must_use]
    pub const fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    /// Sets `IF NOT EXISTS`.
    #[must_use]
    pub const fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Sets `WITHOUT ROWID`.
    #[must_use]
    pub const fn without_rowid(mut self) -> Self {
        self.without_rowid = true;
        self
    }

    /// Sets `STRICT`.
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Checks primary key and autoincrement rules, returning the
    /// constraint-level primary key columns in key order.
    fn primary_key_columns(&self) -> Result<Vec<&str>> {
        let mut positions: BTreeMap<u32, &str> = BTreeMap::new();
        let key_size = self
            .columns
            .values()
            .filter(|spec| spec.primary_key.is_some())
            .count();
        for (name, spec) in &self.columns {
            if spec.autoincrement {
                check_autoincrement(name, spec, key_size)?;
            }
            let Some(position) = spec.primary_key else {
                continue;
            };
            if position == 0 {
                return Err(Error::InvalidPrimaryKeyPosition(name.clone()));
            }
            if let Some(first) = positions.insert(position, name) {
                return Err(Error::DuplicatePrimaryKeyPosition {
                    position,
                    first: String::from(first),
                    second: name.clone(),
                });
            }
        }
        Ok(self
            .columns
            .iter()
            .filter(|(_, spec)| spec.is_inline_primary_key())
            .fold(positions, |mut positions, (_, spec)| {
                if let Some(position) = spec.primary_key {
                    positions.remove(&position);
                }
                positions
            })
            .into_values()
            .collect())
    }
}

fn check_autoincrement(name: &str, spec: &ColumnSpec, key_size: usize) -> Result<()> {
    let reason = if spec.primary_key.is_none() {
        "not a primary key column"
    } else if key_size > 1 {
        "part of a composite primary key"
    } else if !spec.declared_type.trim().eq_ignore_ascii_case("INTEGER") {
        "declared type is not INTEGER"
    } else {
        return Ok(());
    };
    Err(Error::InvalidAutoincrement {
        column: String::from(name),
        reason,
    })
}

impl<D: Dialect> Generator<D> {
    /// Renders a CREATE TABLE statement.
    ///
    /// ```rust
    /// use sqlman_core::builder::Generator;
    /// use sqlman_core::migrations::{ColumnSpec, CreateTable};
    ///
    /// let table = CreateTable::new("memberships")
    ///     .column("user_id", ColumnSpec::new("INTEGER").primary_key(2))
    ///     .column("group_id", ColumnSpec::new("INTEGER").primary_key(1))
    ///     .column("role", ColumnSpec::new("TEXT").not_null());
    /// let sql = Generator::sqlite().create_table(&table).unwrap();
    /// assert_eq!(
    ///     sql.as_str(),
    ///     "CREATE TABLE \"memberships\" (\n    \"user_id\" INTEGER,\n    \"group_id\" INTEGER,\n    \"role\" TEXT NOT NULL,\n    PRIMARY KEY(\"group_id\",\"user_id\")\n)"
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// - [`Error::NoColumns`] for a table without columns.
    /// - [`Error::InvalidPrimaryKeyPosition`] for position 0.
    /// - [`Error::DuplicatePrimaryKeyPosition`] when two columns share a
    ///   position.
    /// - [`Error::InvalidAutoincrement`] for autoincrement outside a lone
    ///   `INTEGER` primary key.
    /// - [`Error::InvalidTypeName`] for an unsafe declared type.
    /// - [`Error::Unsupported`] for table options on a dialect without them.
    pub fn create_table(&self, table: &CreateTable) -> Result<Fragment<D>> {
        if table.columns.is_empty() {
            return Err(Error::NoColumns(table.name.clone()));
        }
        if (table.without_rowid || table.strict) && !self.dialect().supports_table_options() {
            return Err(Error::Unsupported {
                feature: "table options",
                dialect: self.dialect().name(),
            });
        }
        let primary_key = table.primary_key_columns()?;

        let mut lines = Vec::with_capacity(table.columns.len() + table.constraints.len() + 1);
        for (name, spec) in &table.columns {
            lines.push(self.column_def(name, spec)?.into_string());
        }
        if !primary_key.is_empty() {
            lines.push(format!("PRIMARY KEY({})", self.names(primary_key, false)));
        }
        lines.extend(table.constraints.iter().cloned());

        let mut sql = String::from("CREATE ");
        if table.temporary {
            sql.push_str("TEMP ");
        }
        sql.push_str("TABLE ");
        if table.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&self.dialect().quote_name(&table.name));
        sql.push_str(" (\n    ");
        sql.push_str(&lines.join(",\n    "));
        sql.push_str("\n)");

        let options: Vec<&str> = [
            (table.without_rowid, "WITHOUT ROWID"),
            (table.strict, "STRICT"),
        ]
        .into_iter()
        .filter_map(|(set, option)| set.then_some(option))
        .collect();
        if !options.is_empty() {
            sql.push(' ');
            sql.push_str(&options.join(", "));
        }
        debug!(sql = %sql, table = %table.name, "Rendered CREATE TABLE");
        Ok(self.raw(sql))
    }

    /// `CREATE [TEMP] TABLE [IF NOT EXISTS] "name" AS <select>`
    ///
    /// # Errors
    ///
    /// The errors of [`Generator::select`].
    pub fn create_table_as(
        &self,
        name: &str,
        select: &Select,
        temporary: bool,
        if_not_exists: bool,
    ) -> Result<Fragment<D>> {
        let mut sql = self.raw("CREATE");
        if temporary {
            sql = sql.raw("TEMP");
        }
        sql = sql.raw("TABLE");
        if if_not_exists {
            sql = sql.raw("IF NOT EXISTS");
        }
        Ok(sql.name(name).raw("AS").append(self.select(select)?))
    }

    /// `DROP TABLE [IF EXISTS] "name"`
    #[must_use]
    pub fn drop_table(&self, name: &str, if_exists: bool) -> Fragment<D> {
        let sql = self.raw("DROP TABLE");
        let sql = if if_exists { sql.raw("IF EXISTS") } else { sql };
        sql.name(name)
    }

    /// `ALTER TABLE "name" RENAME TO "new_name"`
    #[must_use]
    pub fn rename_table(&self, name: &str, new_name: &str) -> Fragment<D> {
        self.raw("ALTER TABLE")
            .name(name)
            .raw("RENAME TO")
            .raw(self.dialect().quote_identifier(new_name))
    }

    /// `ALTER TABLE "table" RENAME COLUMN "column" TO "new_name"`
    #[must_use]
    pub fn rename_column(&self, table: &str, column: &str, new_name: &str) -> Fragment<D> {
        let dialect = self.dialect();
        self.raw("ALTER TABLE")
            .name(table)
            .raw("RENAME COLUMN")
            .raw(dialect.quote_identifier(column))
            .raw("TO")
            .raw(dialect.quote_identifier(new_name))
    }

    /// `ALTER TABLE "table" ADD COLUMN <column definition>`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAddColumn`] for a spec the engine cannot add to an
    /// existing table: a primary key or `UNIQUE` column, an expression
    /// default, a `STORED` generated column, or `NOT NULL` without a
    /// non-null default. Otherwise the errors of [`Generator::column_def`].
    pub fn add_column(&self, table: &str, column: &str, spec: &ColumnSpec) -> Result<Fragment<D>> {
        check_add_column(column, spec)?;
        Ok(self
            .raw("ALTER TABLE")
            .name(table)
            .raw("ADD COLUMN")
            .append(self.column_def(column, spec)?))
    }

    /// `ALTER TABLE "table" DROP COLUMN "column"`
    #[must_use]
    pub fn drop_column(&self, table: &str, column: &str) -> Fragment<D> {
        self.raw("ALTER TABLE")
            .name(table)
            .raw("DROP COLUMN")
            .raw(self.dialect().quote_identifier(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::migrations::column::GeneratedKind;

    fn g() -> Generator {
        Generator::sqlite()
    }

    #[test]
    fn test_composite_key_follows_position() {
        let table = CreateTable::new("t")
            .column("b", ColumnSpec::new("INTEGER").primary_key(2))
            .column("a", ColumnSpec::new("INTEGER").primary_key(1));
        let sql = g().create_table(&table).unwrap();
        assert!(sql.as_str().ends_with("PRIMARY KEY(\"a\",\"b\")\n)"));
    }

    #[test]
    fn test_autoincrement_is_inline_only() {
        let table = CreateTable::new("users")
            .column("id", ColumnSpec::new("INTEGER").primary_key(1).autoincrement())
            .column("email", ColumnSpec::new("TEXT").unique());
        assert_eq!(
            g().create_table(&table).unwrap().as_str(),
            "CREATE TABLE \"users\" (\n    \"id\" INTEGER PRIMARY KEY AUTOINCREMENT,\n    \"email\" TEXT UNIQUE\n)"
        );
    }

    #[test]
    fn test_options_and_constraints() {
        let table = CreateTable::new("main.kv")
            .column("k", ColumnSpec::new("TEXT").not_null().primary_key(1))
            .column("v", ColumnSpec::new("ANY"))
            .column("len", ColumnSpec::new("INT").generated("length(v)", GeneratedKind::Virtual))
            .constraint("CHECK (length(\"k\") > 0)")
            .temporary()
            .if_not_exists()
            .without_rowid()
            .strict();
        assert_eq!(
            g().create_table(&table).unwrap().as_str(),
            "CREATE TEMP TABLE IF NOT EXISTS \"main\".\"kv\" (\n    \
             \"k\" TEXT NOT NULL,\n    \
             \"v\" ANY,\n    \
             \"len\" INT AS (length(v)) VIRTUAL,\n    \
             PRIMARY KEY(\"k\"),\n    \
             CHECK (length(\"k\") > 0)\n\
             ) WITHOUT ROWID, STRICT"
        );
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            g().create_table(&CreateTable::new("t")),
            Err(Error::NoColumns(String::from("t")))
        );

        let dup = CreateTable::new("t")
            .column("a", ColumnSpec::new("INT").primary_key(1))
            .column("b", ColumnSpec::new("INT").primary_key(1));
        assert_eq!(
            g().create_table(&dup),
            Err(Error::DuplicatePrimaryKeyPosition {
                position: 1,
                first: String::from("a"),
                second: String::from("b"),
            })
        );

        let zero = CreateTable::new("t").column("a", ColumnSpec::new("INT").primary_key(0));
        assert_eq!(
            g().create_table(&zero),
            Err(Error::InvalidPrimaryKeyPosition(String::from("a")))
        );

        let not_pk = CreateTable::new("t").column("a", ColumnSpec::new("INTEGER").autoincrement());
        assert!(matches!(
            g().create_table(&not_pk),
            Err(Error::InvalidAutoincrement { .. })
        ));

        let composite = CreateTable::new("t")
            .column("a", ColumnSpec::new("INTEGER").primary_key(1).autoincrement())
            .column("b", ColumnSpec::new("INTEGER").primary_key(2));
        assert!(matches!(
            g().create_table(&composite),
            Err(Error::InvalidAutoincrement {
                reason: "part of a composite primary key",
                ..
            })
        ));

        let bigint = CreateTable::new("t")
            .column("a", ColumnSpec::new("BIGINT").primary_key(1).autoincrement());
        assert!(matches!(
            g().create_table(&bigint),
            Err(Error::InvalidAutoincrement {
                reason: "declared type is not INTEGER",
                ..
            })
        ));
    }

    #[test]
    fn test_table_options_unsupported() {
        let table = CreateTable::new("t").column("a", "INT").strict();
        assert!(matches!(
            Generator::new(GenericDialect).create_table(&table),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn test_create_table_as() {
        let select = Select::new().columns(["a"]).from("src");
        assert_eq!(
            g().create_table_as("copy", &select, true, true).unwrap().as_str(),
            "CREATE TEMP TABLE IF NOT EXISTS \"copy\" AS SELECT \"a\"\nFROM \"src\""
        );
    }

    #[test]
    fn test_alter_statements() {
        assert_eq!(g().drop_table("t", true).as_str(), "DROP TABLE IF EXISTS \"t\"");
        assert_eq!(g().drop_table("s.t", false).as_str(), "DROP TABLE \"s\".\"t\"");
        assert_eq!(
            g().rename_table("main.old", "new").as_str(),
            "ALTER TABLE \"main\".\"old\" RENAME TO \"new\""
        );
        assert_eq!(
            g().rename_column("t", "a", "b").as_str(),
            "ALTER TABLE \"t\" RENAME COLUMN \"a\" TO \"b\""
        );
        assert_eq!(
            g().add_column("t", "age", &ColumnSpec::new("INTEGER").default_value(0))
                .unwrap()
                .as_str(),
            "ALTER TABLE \"t\" ADD COLUMN \"age\" INTEGER DEFAULT 0"
        );
        assert_eq!(
            g().drop_column("t", "age").as_str(),
            "ALTER TABLE \"t\" DROP COLUMN \"age\""
        );
    }

    #[test]
    fn test_add_column_rejects_what_alter_cannot_apply() {
        let reason = |spec: ColumnSpec| match g().add_column("t", "c", &spec) {
            Err(Error::InvalidAddColumn { column, reason }) => {
                assert_eq!(column, "c");
                reason
            }
            other => panic!("expected InvalidAddColumn, got {other:?}"),
        };
        assert_eq!(
            reason(ColumnSpec::new("INTEGER").primary_key(1)),
            "primary key columns need a table rebuild"
        );
        assert_eq!(
            reason(ColumnSpec::new("TEXT").unique()),
            "UNIQUE columns need a table rebuild or a unique index"
        );
        assert_eq!(
            reason(ColumnSpec::new("TEXT").default_expr("CURRENT_TIMESTAMP")),
            "the default must be a literal value"
        );
        assert_eq!(
            reason(ColumnSpec::new("TEXT").not_null()),
            "NOT NULL requires a non-null default"
        );
        assert_eq!(
            reason(ColumnSpec::new("TEXT").not_null().default_value(None::<i64>)),
            "NOT NULL requires a non-null default"
        );

        assert_eq!(
            g().add_column("t", "c", &ColumnSpec::new("TEXT").not_null().default_value(""))
                .unwrap()
                .as_str(),
            "ALTER TABLE \"t\" ADD COLUMN \"c\" TEXT NOT NULL DEFAULT ''"
        );
    }
}
