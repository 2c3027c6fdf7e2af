//! Error types for statement generation.
//!
//! Escaping never fails. Everything here is a caller-contract violation
//! detected while assembling a complete statement, reported instead of
//! emitting SQL the engine would reject (or silently misinterpret).

/// Errors raised by the statement generators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// `CREATE TABLE` without any column.
    #[error("Table '{0}' must declare at least one column")]
    NoColumns(String),

    /// Two columns claim the same primary key position.
    #[error("Primary key position {position} is used by both '{first}' and '{second}'")]
    DuplicatePrimaryKeyPosition {
        /// The contested ordinal.
        position: u32,
        /// Column that claimed the position first.
        first: String,
        /// Column that claimed it again.
        second: String,
    },

    /// Primary key positions start at 1.
    #[error("Primary key position of column '{0}' must be 1 or greater")]
    InvalidPrimaryKeyPosition(String),

    /// AUTOINCREMENT outside a single-column INTEGER primary key.
    #[error("Column '{column}' cannot be AUTOINCREMENT: {reason}")]
    InvalidAutoincrement {
        /// Offending column.
        column: String,
        /// Which rule was broken.
        reason: &'static str,
    },

    /// A column spec that `ALTER TABLE ... ADD COLUMN` cannot apply.
    #[error("Column '{column}' cannot be added to an existing table: {reason}")]
    InvalidAddColumn {
        /// Offending column.
        column: String,
        /// Which rule was broken.
        reason: &'static str,
    },

    /// A declared column type that is not a plain type name.
    #[error("Invalid declared type '{0}'")]
    InvalidTypeName(String),

    /// Rejected by the strict identifier quoter.
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier {
        /// The rejected name.
        name: String,
        /// Which rule was broken.
        reason: &'static str,
    },

    /// `OFFSET` given without `LIMIT`.
    #[error("OFFSET requires a LIMIT")]
    OffsetWithoutLimit,

    /// `INSERT` with an empty row.
    #[error("INSERT into '{0}' has no columns; use insert_default for DEFAULT VALUES")]
    EmptyRow(String),

    /// `UPDATE` with an empty `SET` list.
    #[error("UPDATE of '{0}' has no assignments")]
    EmptySet(String),

    /// `DELETE` without `WHERE` that was not explicitly requested.
    #[error("DELETE from '{0}' has no WHERE clause; call all_rows() to delete every row")]
    MissingWhere(String),

    /// Upsert conflict `WHERE` without conflict target columns.
    #[error("ON CONFLICT ... WHERE requires conflict target columns")]
    ConflictWhereWithoutTarget,

    /// Upsert update `WHERE` without an update `SET` list.
    #[error("DO UPDATE ... WHERE requires an update SET list")]
    UpdateWhereWithoutSet,

    /// The dialect cannot express the requested clause.
    #[error("{feature} is not supported by the {dialect} dialect")]
    Unsupported {
        /// The clause that was requested.
        feature: &'static str,
        /// The dialect name.
        dialect: &'static str,
    },
}

/// Result type for statement generation.
pub type Result<T> = std::result::Result<T, Error>;
