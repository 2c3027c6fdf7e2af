//! Error types for execution and introspection.

/// Errors raised while talking to a SQLite database.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The engine rejected a statement or the connection failed.
    ///
    /// The native SQLite result code is available through
    /// [`sqlx::Error::as_database_error`].
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A statement could not be generated.
    #[error("SQL generation error: {0}")]
    Build(#[from] sqlman_core::Error),

    /// The catalog has no table by that name.
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;
