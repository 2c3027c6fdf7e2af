//! Statement execution over a SQLite connection pool.
//!
//! [`Database`] is the only place SQL text produced by `sqlman-core`
//! meets the engine. Fragments are run as-is; extra values can be bound
//! to `?` placeholders with [`Database::execute_with`].

use std::path::Path;

use sqlman_core::dialect::Dialect;
use sqlman_core::{Fragment, SqlValue};
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::query::Query;
use sqlx::Sqlite;
use tracing::{debug, info};

use crate::error::Result;

/// A pooled SQLite database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(None::<i64>),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(n) => query.bind(*n),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Blob(bytes) => query.bind(bytes.clone()),
    }
}

impl Database {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to a database URL such as `sqlite:app.db` or `:memory:`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`](crate::Error::Database) if the URL is invalid or the database
    /// cannot be opened.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        info!(url = %url, "Connected to database");
        Ok(Self { pool })
    }

    /// Opens a database file, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`](crate::Error::Database) if the file cannot be created or opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        info!(path = %path.display(), "Opened database");
        Ok(Self { pool })
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`](crate::Error::Database) with the engine's error if the statement
    /// fails.
    pub async fn execute<D: Dialect>(&self, sql: &Fragment<D>) -> Result<u64> {
        self.execute_with(sql, &[]).await
    }

    /// Runs a statement with values bound to its `?` placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`](crate::Error::Database) if the statement fails or the number of
    /// values does not match the placeholders.
    pub async fn execute_with<D: Dialect>(
        &self,
        sql: &Fragment<D>,
        params: &[SqlValue],
    ) -> Result<u64> {
        debug!(sql = %sql, params = params.len(), "Executing statement");
        let query = params
            .iter()
            .fold(sqlx::query(sql.as_str()), bind_value);
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Runs a query and returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`](crate::Error::Database) if the query fails.
    pub async fn fetch_all<D: Dialect>(&self, sql: &Fragment<D>) -> Result<Vec<SqliteRow>> {
        self.fetch_all_with(sql, &[]).await
    }

    /// Runs a query with bound values and returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`](crate::Error::Database) if the query fails.
    pub async fn fetch_all_with<D: Dialect>(
        &self,
        sql: &Fragment<D>,
        params: &[SqlValue],
    ) -> Result<Vec<SqliteRow>> {
        debug!(sql = %sql, params = params.len(), "Fetching rows");
        let query = params
            .iter()
            .fold(sqlx::query(sql.as_str()), bind_value);
        Ok(query.fetch_all(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlman_core::builder::{Generator, Insert, Select};
    use sqlman_core::migrations::{ColumnSpec, CreateTable};
    use sqlx::Row;

    async fn create_test_db() -> Database {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        Database::new(pool)
    }

    async fn create_notes(db: &Database) {
        let table = CreateTable::new("notes")
            .column("id", ColumnSpec::new("INTEGER").primary_key(1).autoincrement())
            .column("body", ColumnSpec::new("TEXT"))
            .column("data", ColumnSpec::new("BLOB"));
        let sql = Generator::sqlite().create_table(&table).unwrap();
        db.execute(&sql).await.unwrap();
    }

    #[tokio::test]
    async fn test_escaped_values_round_trip() {
        let db = create_test_db().await;
        create_notes(&db).await;
        let g = Generator::sqlite();

        let tricky = "it's \"quoted\"; DROP TABLE notes; --";
        let insert = Insert::new("notes").value("body", tricky).value("data", vec![0_u8, 255]);
        assert_eq!(db.execute(&g.insert(&insert).unwrap()).await.unwrap(), 1);

        let rows = db
            .fetch_all(&g.select(&Select::new().columns(["body", "data"]).from("notes")).unwrap())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<String, _>("body"), tricky);
        assert_eq!(rows[0].get::<Vec<u8>, _>("data"), vec![0_u8, 255]);
    }

    #[tokio::test]
    async fn test_nul_byte_text_is_stored() {
        let db = create_test_db().await;
        create_notes(&db).await;
        let g = Generator::sqlite();

        let insert = Insert::new("notes").value("body", "a\0b");
        db.execute(&g.insert(&insert).unwrap()).await.unwrap();

        let rows = db
            .fetch_all(&g.raw("SELECT length(body) AS n FROM notes"))
            .await
            .unwrap();
        assert_eq!(rows[0].get::<i64, _>("n"), 3);
    }

    #[tokio::test]
    async fn test_execute_with_params() {
        let db = create_test_db().await;
        create_notes(&db).await;
        let g = Generator::sqlite();

        let sql = g.raw("INSERT INTO notes (body, data) VALUES (?, ?)");
        let affected = db
            .execute_with(&sql, &[SqlValue::Text(String::from("hi")), SqlValue::Null])
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let rows = db
            .fetch_all_with(
                &g.raw("SELECT body FROM notes WHERE body = ?"),
                &[SqlValue::Text(String::from("hi"))],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_engine_error_is_surfaced() {
        let db = create_test_db().await;
        let err = db
            .execute(&Generator::sqlite().raw("SELECT * FROM missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Database(_)));
    }
}
