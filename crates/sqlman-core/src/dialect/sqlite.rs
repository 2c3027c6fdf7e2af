//! SQLite dialect.

use super::Dialect;

/// SQLite dialect.
///
/// SQLite accepts `"…"`, `` `…` ``, `[…]` and even `'…'` around
/// identifiers on input, but double quotes are the standard form and
/// the only one this dialect emits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn supports_returning(&self) -> bool {
        true // SQLite 3.35.0+
    }

    fn supports_upsert(&self) -> bool {
        true // SQLite 3.24.0+
    }

    fn supports_table_options(&self) -> bool {
        true // WITHOUT ROWID 3.8.2+, STRICT 3.37.0+
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_dialect() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.name(), "sqlite");
        assert_eq!(dialect.identifier_quote(), '"');
        assert!(dialect.supports_returning());
        assert!(dialect.supports_upsert());
        assert!(dialect.supports_table_options());
    }

    #[test]
    fn test_sqlite_hex_literal_is_lowercase() {
        assert_eq!(SqliteDialect.hex_literal(b"a\0b"), "x'610062'");
        assert_eq!(SqliteDialect.hex_literal(&[]), "x''");
    }
}
