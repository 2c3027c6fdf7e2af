//! Column diff between a live table and a desired column set.
//!
//! The comparison is approximate. It looks at what `PRAGMA table_info`
//! reports (declared type, not-null flag, primary key position and
//! default text) and nothing else, so `UNIQUE`, `CHECK`, collations and
//! generated columns never show up as changes. Default expressions are
//! compared as text; two spellings of the same expression differ.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::column::{ColumnDefault, ColumnSpec};
use crate::builder::{escape_value_with, Datum, EscapeMode, Fragment, Generator};
use crate::dialect::Dialect;
use crate::error::Result;

// ================================================================
// Public types
// ================================================================

/// One row of `PRAGMA table_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column index.
    pub cid: i64,
    /// Column name.
    pub name: String,
    /// Declared type as written, possibly empty.
    #[serde(rename = "type")]
    pub declared_type: String,
    /// `notnull`
    #[serde(alias = "notnull")]
    pub not_null: bool,
    /// Default value text (`dflt_value`), `None` for no default.
    #[serde(alias = "dflt_value")]
    pub default_value: Option<String>,
    /// Position in the primary key, 0 when not part of it.
    #[serde(alias = "pk")]
    pub primary_key: u32,
}

/// What differs between a live and a desired column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Declared type, compared case-insensitively.
    DeclaredType,
    /// `NOT NULL` flag.
    NotNull,
    /// Primary key position.
    PrimaryKey,
    /// Default literal or expression text.
    Default,
}

/// A column present on both sides with at least one mismatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnChange {
    /// The column as the database reports it.
    pub live: ColumnInfo,
    /// The column as requested.
    pub desired: ColumnSpec,
    /// Every mismatch found, in comparison order.
    pub reasons: Vec<ChangeKind>,
}

/// Result of [`diff_columns`].
///
/// A column name appears in at most one of the three maps. Unchanged
/// columns appear in none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDiff {
    /// Desired columns missing from the live table.
    pub add: IndexMap<String, ColumnSpec>,
    /// Live columns missing from the desired set.
    pub drop: IndexMap<String, ColumnInfo>,
    /// Columns on both sides that differ.
    pub change: IndexMap<String, ColumnChange>,
}

impl ColumnDiff {
    /// Returns `true` when the live table already matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.drop.is_empty() && self.change.is_empty()
    }

    /// Renders `ADD COLUMN` then `DROP COLUMN` statements.
    ///
    /// Changed columns are not rendered: SQLite cannot alter a column in
    /// place, and the table rebuild is left to the caller.
    ///
    /// # Errors
    ///
    /// The errors of [`Generator::add_column`].
    pub fn to_statements<D: Dialect>(
        &self,
        generator: &Generator<D>,
        table: &str,
    ) -> Result<Vec<Fragment<D>>> {
        let mut statements = Vec::with_capacity(self.add.len() + self.drop.len());
        for (name, spec) in &self.add {
            statements.push(generator.add_column(table, name, spec)?);
        }
        for name in self.drop.keys() {
            statements.push(generator.drop_column(table, name));
        }
        if !self.change.is_empty() {
            debug!(
                table = %table,
                columns = ?self.change.keys().collect::<Vec<_>>(),
                "Changed columns need a table rebuild"
            );
        }
        Ok(statements)
    }
}

// ================================================================
// Comparison
// ================================================================

fn normalize_type(declared_type: &str) -> String {
    declared_type
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

fn default_matches<D: Dialect>(dialect: &D, live: Option<&str>, desired: Option<&ColumnDefault>) -> bool {
    let live = live.unwrap_or("NULL");
    match desired {
        None => live.eq_ignore_ascii_case("NULL"),
        Some(ColumnDefault::Value(value)) => {
            live == escape_value_with(dialect, &Datum::Value(value.clone()), EscapeMode::Standard)
        }
        Some(ColumnDefault::Expr(expr)) => {
            live == expr
                || live
                    .strip_prefix('(')
                    .and_then(|rest| rest.strip_suffix(')'))
                    .is_some_and(|inner| inner == expr)
        }
    }
}

fn compare<D: Dialect>(dialect: &D, live: &ColumnInfo, desired: &ColumnSpec) -> Vec<ChangeKind> {
    let mut reasons = Vec::new();
    if normalize_type(&live.declared_type) != normalize_type(&desired.declared_type) {
        reasons.push(ChangeKind::DeclaredType);
    }
    if live.not_null != desired.not_null {
        reasons.push(ChangeKind::NotNull);
    }
    if live.primary_key != desired.primary_key.unwrap_or(0) {
        reasons.push(ChangeKind::PrimaryKey);
    }
    if !default_matches(dialect, live.default_value.as_deref(), desired.default.as_ref()) {
        reasons.push(ChangeKind::Default);
    }
    reasons
}

/// Compares live columns with a desired column set.
///
/// Names match ASCII case-insensitively, as SQLite resolves them. A live
/// column without a desired counterpart goes to `drop`, a desired column
/// without a live one goes to `add`, and a pair that differs goes to
/// `change` under the desired name. `drop` follows live column order,
/// `add` and `change` follow desired order.
///
/// ```rust
/// use indexmap::IndexMap;
/// use sqlman_core::dialect::SqliteDialect;
/// use sqlman_core::migrations::{diff_columns, ColumnInfo, ColumnSpec};
///
/// let live = vec![ColumnInfo {
///     cid: 0,
///     name: String::from("id"),
///     declared_type: String::from("integer"),
///     primary_key: 1,
///     ..ColumnInfo::default()
/// }];
/// let mut desired = IndexMap::new();
/// desired.insert(String::from("id"), ColumnSpec::new("INTEGER").primary_key(1));
///
/// assert!(diff_columns(&SqliteDialect, &live, &desired).is_empty());
/// ```
#[must_use]
pub fn diff_columns<D: Dialect>(
    dialect: &D,
    live: &[ColumnInfo],
    desired: &IndexMap<String, ColumnSpec>,
) -> ColumnDiff {
    let mut diff = ColumnDiff::default();
    let mut changed = IndexMap::new();
    let mut matched = vec![false; desired.len()];

    for column in live {
        let found = desired
            .iter()
            .enumerate()
            .find(|(_, (name, _))| name.eq_ignore_ascii_case(&column.name));
        let Some((index, (name, spec))) = found else {
            diff.drop.insert(column.name.clone(), column.clone());
            continue;
        };
        matched[index] = true;
        let reasons = compare(dialect, column, spec);
        if !reasons.is_empty() {
            changed.insert(
                index,
                (
                    name.clone(),
                    ColumnChange {
                        live: column.clone(),
                        desired: spec.clone(),
                        reasons,
                    },
                ),
            );
        }
    }

    for (index, (name, spec)) in desired.iter().enumerate() {
        if !matched[index] {
            diff.add.insert(name.clone(), spec.clone());
        }
    }
    changed.sort_keys();
    diff.change = changed.into_values().collect();

    debug!(
        add = diff.add.len(),
        drop = diff.drop.len(),
        change = diff.change.len(),
        "Computed column diff"
    );
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqliteDialect;

    fn info(cid: i64, name: &str, declared_type: &str) -> ColumnInfo {
        ColumnInfo {
            cid,
            name: String::from(name),
            declared_type: String::from(declared_type),
            ..ColumnInfo::default()
        }
    }

    fn desired(columns: Vec<(&str, ColumnSpec)>) -> IndexMap<String, ColumnSpec> {
        columns
            .into_iter()
            .map(|(name, spec)| (String::from(name), spec))
            .collect()
    }

    fn diff(live: &[ColumnInfo], desired: &IndexMap<String, ColumnSpec>) -> ColumnDiff {
        diff_columns(&SqliteDialect, live, desired)
    }

    #[test]
    fn test_add_drop_change() {
        let live = vec![
            ColumnInfo {
                primary_key: 1,
                ..info(0, "id", "int")
            },
            info(1, "name", "text"),
        ];
        let want = desired(vec![
            ("id", ColumnSpec::new("INT").primary_key(1)),
            ("name", ColumnSpec::new("TEXT").not_null()),
            ("age", ColumnSpec::new("INT")),
        ]);
        let diff = diff(&live, &want);
        assert_eq!(diff.add.keys().collect::<Vec<_>>(), ["age"]);
        assert!(diff.drop.is_empty());
        assert_eq!(diff.change.keys().collect::<Vec<_>>(), ["name"]);
        assert_eq!(diff.change["name"].reasons, [ChangeKind::NotNull]);
    }

    #[test]
    fn test_dropped_columns_keep_live_order() {
        let live = vec![info(0, "a", ""), info(1, "z", ""), info(2, "b", "")];
        let diff = diff(&live, &desired(vec![("a", ColumnSpec::default())]));
        assert_eq!(diff.drop.keys().collect::<Vec<_>>(), ["z", "b"]);
        assert!(diff.add.is_empty());
        assert!(diff.change.is_empty());
    }

    #[test]
    fn test_names_match_case_insensitively() {
        let live = vec![info(0, "Email", "TEXT")];
        let diff = diff(&live, &desired(vec![("email", ColumnSpec::new("text"))]));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_all_reasons_are_collected() {
        let live = vec![ColumnInfo {
            not_null: true,
            default_value: Some(String::from("'a'")),
            primary_key: 1,
            ..info(0, "c", "VARCHAR(10)")
        }];
        let diff = diff(&live, &desired(vec![("c", ColumnSpec::new("TEXT").default_value("b"))]));
        assert_eq!(
            diff.change["c"].reasons,
            [
                ChangeKind::DeclaredType,
                ChangeKind::NotNull,
                ChangeKind::PrimaryKey,
                ChangeKind::Default
            ]
        );
    }

    #[test]
    fn test_default_comparison() {
        let with_default = |text: Option<&str>| {
            vec![ColumnInfo {
                default_value: text.map(String::from),
                ..info(0, "c", "TEXT")
            }]
        };
        let literal = desired(vec![("c", ColumnSpec::new("TEXT").default_value("it's"))]);
        assert!(diff(&with_default(Some("'it''s'")), &literal).is_empty());

        let expr = desired(vec![("c", ColumnSpec::new("TEXT").default_expr("CURRENT_TIMESTAMP"))]);
        assert!(diff(&with_default(Some("CURRENT_TIMESTAMP")), &expr).is_empty());
        assert!(diff(&with_default(Some("(CURRENT_TIMESTAMP)")), &expr).is_empty());

        let none = desired(vec![("c", ColumnSpec::new("TEXT"))]);
        assert!(diff(&with_default(None), &none).is_empty());
        assert!(diff(&with_default(Some("NULL")), &none).is_empty());
        assert!(!diff(&with_default(Some("0")), &none).is_empty());
    }

    #[test]
    fn test_to_statements() {
        let live = vec![info(0, "id", "INTEGER"), info(1, "legacy", "TEXT")];
        let want = desired(vec![
            ("id", ColumnSpec::new("INTEGER")),
            ("age", ColumnSpec::new("INTEGER").default_value(0)),
        ]);
        let statements = diff(&live, &want)
            .to_statements(&Generator::sqlite(), "users")
            .unwrap();
        let sql: Vec<&str> = statements.iter().map(Fragment::as_str).collect();
        assert_eq!(
            sql,
            [
                "ALTER TABLE \"users\" ADD COLUMN \"age\" INTEGER DEFAULT 0",
                "ALTER TABLE \"users\" DROP COLUMN \"legacy\"",
            ]
        );
    }

    #[test]
    fn test_column_info_from_pragma_json() {
        let info: ColumnInfo = serde_json::from_str(
            r#"{"cid": 2, "name": "age", "type": "INT", "notnull": true, "dflt_value": "0", "pk": 0}"#,
        )
        .unwrap();
        assert_eq!(info.name, "age");
        assert!(info.not_null);
        assert_eq!(info.default_value.as_deref(), Some("0"));
    }
}
