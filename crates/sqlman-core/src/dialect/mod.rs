//! SQL Dialect support.
//!
//! Every escaping rule that differs between SQLite-family engines lives
//! behind the [`Dialect`] trait: the identifier quote character, string
//! and hex literal syntax, and which optional clauses (UPSERT,
//! RETURNING, table options) the engine understands. The rest of the
//! crate is written once against this trait.

mod generic;
mod sqlite;

pub use generic::GenericDialect;
pub use sqlite::SqliteDialect;

use std::fmt;

/// Trait for SQL dialect-specific behavior.
///
/// Dialects are small `Copy` values; builders carry one by value so a
/// finished fragment always knows how it was escaped.
pub trait Dialect: Copy + Default + fmt::Debug + Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes a single identifier part, doubling embedded quote characters.
    ///
    /// The input is never split on `.`; use [`Dialect::quote_name`] for
    /// qualified names.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(quote);
        for c in name.chars() {
            if c == quote {
                out.push(quote);
            }
            out.push(c);
        }
        out.push(quote);
        out
    }

    /// Normalizes a possibly quoted, possibly dotted name into this
    /// dialect's canonical quoting. See [`crate::quote`].
    fn quote_name(&self, name: &str) -> String {
        crate::quote::quote_name_with(self, name)
    }

    /// Renders a string literal.
    ///
    /// The text must not contain NUL bytes; callers route those through
    /// [`Dialect::hex_literal`] or strip them first.
    fn quote_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('\'');
        for c in text.chars() {
            if c == '\'' {
                out.push('\'');
            }
            out.push(c);
        }
        out.push('\'');
        out
    }

    /// Renders a blob literal.
    fn hex_literal(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len() * 2 + 3);
        out.push_str("x'");
        for byte in bytes {
            out.push_str(&format!("{byte:02x}"));
        }
        out.push('\'');
        out
    }

    /// Returns whether the dialect supports RETURNING clause.
    fn supports_returning(&self) -> bool {
        false
    }

    /// Returns whether the dialect supports UPSERT (ON CONFLICT).
    fn supports_upsert(&self) -> bool {
        false
    }

    /// Returns whether `CREATE TABLE` accepts `WITHOUT ROWID` / `STRICT`.
    fn supports_table_options(&self) -> bool {
        false
    }
}
