//! Live schema introspection.
//!
//! [`Introspector`] runs the queries rendered by
//! [`Catalog`](sqlman_core::migrations::Catalog) and decodes the rows
//! into plain structs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlman_core::dialect::SqliteDialect;
use sqlman_core::migrations::{diff_columns, Catalog, ColumnDiff, ColumnInfo, ColumnSpec};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info};

use crate::config::IntrospectorConfig;
use crate::database::Database;
use crate::error::{Error, Result};

/// An index and the table it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Index name.
    pub name: String,
    /// Indexed table.
    pub table: String,
}

/// One row of `PRAGMA database_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseEntry {
    /// Sequence number.
    pub seq: i64,
    /// Schema name (`main`, `temp` or the attach name).
    pub name: String,
    /// Backing file; empty for in-memory databases.
    pub file: String,
}

/// One row of `PRAGMA function_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    /// Function name.
    pub name: String,
    /// Built in rather than application defined.
    pub builtin: bool,
    /// `s` scalar, `a` aggregate or `w` window.
    pub kind: String,
    /// Number of arguments, -1 for variadic.
    pub narg: i64,
}

fn column_info(row: &SqliteRow) -> Result<ColumnInfo> {
    let primary_key: i64 = row.try_get("pk")?;
    Ok(ColumnInfo {
        cid: row.try_get("cid")?,
        name: row.try_get("name")?,
        declared_type: row.try_get("type")?,
        not_null: row.try_get::<i64, _>("notnull")? != 0,
        default_value: row.try_get("dflt_value")?,
        primary_key: u32::try_from(primary_key).unwrap_or_default(),
    })
}

fn names(rows: &[SqliteRow]) -> Result<Vec<String>> {
    Ok(rows
        .iter()
        .map(|row| row.try_get("name"))
        .collect::<std::result::Result<_, _>>()?)
}

/// Reads schema information from a live database.
#[derive(Debug, Clone)]
pub struct Introspector {
    db: Database,
    catalog: Catalog<SqliteDialect>,
    schema: Option<String>,
}

impl Introspector {
    /// Creates an introspector over `sqlite_master` of the main schema.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self::with_config(db, &IntrospectorConfig::default())
    }

    /// Creates an introspector with the given configuration.
    #[must_use]
    pub fn with_config(db: Database, config: &IntrospectorConfig) -> Self {
        Self {
            db,
            catalog: Catalog::sqlite().with_master_table(&config.master_table),
            schema: config.schema.clone(),
        }
    }

    fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Columns of a table, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableNotFound`] when the table has no columns,
    /// which is how SQLite answers for a missing table, and
    /// [`Error::Database`] if the pragma fails.
    pub async fn table_info(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let rows = self
            .db
            .fetch_all(&self.catalog.table_info(table, self.schema()))
            .await?;
        if rows.is_empty() {
            return Err(Error::TableNotFound(String::from(table)));
        }
        let columns = rows.iter().map(column_info).collect::<Result<Vec<_>>>()?;
        debug!(table = %table, columns = columns.len(), "Read table info");
        Ok(columns)
    }

    /// Names of all tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the query fails or a row cannot be
    /// decoded.
    pub async fn table_list(&self) -> Result<Vec<String>> {
        let rows = self.db.fetch_all(&self.catalog.table_list(self.schema())).await?;
        names(&rows)
    }

    /// Names of all views.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the query fails or a row cannot be
    /// decoded.
    pub async fn view_list(&self) -> Result<Vec<String>> {
        let rows = self.db.fetch_all(&self.catalog.view_list(self.schema())).await?;
        names(&rows)
    }

    /// Indexes, optionally limited to one table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the query fails or a row cannot be
    /// decoded.
    pub async fn index_list(&self, table: Option<&str>) -> Result<Vec<IndexEntry>> {
        let rows = self
            .db
            .fetch_all(&self.catalog.index_list(self.schema(), table))
            .await?;
        rows.iter()
            .map(|row| {
                Ok(IndexEntry {
                    name: row.try_get("name")?,
                    table: row.try_get("tbl_name")?,
                })
            })
            .collect()
    }

    /// The `CREATE TABLE` text of a table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableNotFound`] when the master table has no entry
    /// for it, and [`Error::Database`] if the query fails.
    pub async fn table_ddl(&self, table: &str) -> Result<String> {
        let rows = self
            .db
            .fetch_all(&self.catalog.table_ddl(table, self.schema()))
            .await?;
        let Some(row) = rows.first() else {
            return Err(Error::TableNotFound(String::from(table)));
        };
        Ok(row.try_get("sql")?)
    }

    /// Attached databases.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the query fails or a row cannot be
    /// decoded.
    pub async fn database_list(&self) -> Result<Vec<DatabaseEntry>> {
        let rows = self.db.fetch_all(&self.catalog.database_list()).await?;
        rows.iter()
            .map(|row| {
                Ok(DatabaseEntry {
                    seq: row.try_get("seq")?,
                    name: row.try_get("name")?,
                    file: row.try_get::<Option<String>, _>("file")?.unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Registered SQL functions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the query fails or a row cannot be
    /// decoded.
    pub async fn function_list(&self) -> Result<Vec<FunctionEntry>> {
        let rows = self.db.fetch_all(&self.catalog.function_list()).await?;
        rows.iter()
            .map(|row| {
                Ok(FunctionEntry {
                    name: row.try_get("name")?,
                    builtin: row.try_get::<i64, _>("builtin")? != 0,
                    kind: row.try_get("type")?,
                    narg: row.try_get("narg")?,
                })
            })
            .collect()
    }

    /// Compares a live table with a desired column set.
    ///
    /// # Errors
    ///
    /// Same as [`Introspector::table_info`].
    pub async fn column_diff(
        &self,
        table: &str,
        desired: &IndexMap<String, ColumnSpec>,
    ) -> Result<ColumnDiff> {
        let live = self.table_info(table).await?;
        let diff = diff_columns(&SqliteDialect, &live, desired);
        info!(
            table = %table,
            add = diff.add.len(),
            drop = diff.drop.len(),
            change = diff.change.len(),
            "Diffed table columns"
        );
        Ok(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlman_core::builder::Generator;
    use sqlman_core::migrations::{ChangeKind, CreateTable};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_db() -> Database {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        Database::new(pool)
    }

    async fn create_users(db: &Database) {
        let table = CreateTable::new("users")
            .column("id", ColumnSpec::new("INTEGER").primary_key(1))
            .column("name", ColumnSpec::new("TEXT"))
            .column("score", ColumnSpec::new("REAL").not_null().default_value(0.5));
        db.execute(&Generator::sqlite().create_table(&table).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_table_info() {
        let db = create_test_db().await;
        create_users(&db).await;
        let columns = Introspector::new(db).table_info("users").await.unwrap();

        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].primary_key, 1);
        assert_eq!(columns[2].declared_type, "REAL");
        assert!(columns[2].not_null);
        assert_eq!(columns[2].default_value.as_deref(), Some("0.5"));
        assert_eq!(columns[1].default_value, None);
    }

    #[tokio::test]
    async fn test_missing_table() {
        let introspector = Introspector::new(create_test_db().await);
        let err = introspector.table_info("ghost").await.unwrap_err();
        assert!(matches!(err, Error::TableNotFound(name) if name == "ghost"));
        assert!(matches!(
            introspector.table_ddl("ghost").await,
            Err(Error::TableNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_lists() {
        let db = create_test_db().await;
        create_users(&db).await;
        let g = Generator::sqlite();
        db.execute(&g.raw("CREATE INDEX users_name ON users(name)"))
            .await
            .unwrap();
        db.execute(&g.raw("CREATE VIEW named AS SELECT name FROM users"))
            .await
            .unwrap();

        let introspector = Introspector::new(db);
        assert_eq!(introspector.table_list().await.unwrap(), ["users"]);
        assert_eq!(introspector.view_list().await.unwrap(), ["named"]);
        assert_eq!(
            introspector.index_list(Some("users")).await.unwrap(),
            [IndexEntry {
                name: String::from("users_name"),
                table: String::from("users"),
            }]
        );
        assert!(introspector
            .table_ddl("users")
            .await
            .unwrap()
            .starts_with("CREATE TABLE \"users\""));
        let databases = introspector.database_list().await.unwrap();
        assert_eq!(databases[0].name, "main");
    }

    #[tokio::test]
    async fn test_column_diff() {
        let db = create_test_db().await;
        create_users(&db).await;

        let mut desired = IndexMap::new();
        desired.insert(String::from("id"), ColumnSpec::new("INTEGER").primary_key(1));
        desired.insert(String::from("name"), ColumnSpec::new("TEXT").not_null());
        desired.insert(
            String::from("score"),
            ColumnSpec::new("REAL").not_null().default_value(0.5),
        );
        desired.insert(String::from("age"), ColumnSpec::new("INTEGER"));

        let diff = Introspector::new(db).column_diff("users", &desired).await.unwrap();
        assert_eq!(diff.add.keys().collect::<Vec<_>>(), ["age"]);
        assert!(diff.drop.is_empty());
        assert_eq!(diff.change["name"].reasons, [ChangeKind::NotNull]);
    }
}
