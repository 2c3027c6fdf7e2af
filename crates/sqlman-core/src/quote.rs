//! Identifier quoting.
//!
//! Names arrive in every form SQLite itself accepts: bare, `"double"`,
//! `` `backtick` ``, `[bracket]` or `'single'` quoted, and dotted into
//! `schema.table.column` paths. [`quote_name`] splits such a name on the
//! dots that sit outside quoted segments and re-emits every segment in
//! the dialect's canonical quote style.
//!
//! The grammar, one segment at a time:
//!
//! ```text
//! segment := '"' ( [^"] | '""' )* '"'
//!          | '`' ( [^`] | '``' )+ '`'
//!          | "'" ( [^'] | "''" )+ "'"
//!          | '[' [^\]]+ ']'
//!          | [^"`'[.] [^.]*
//! name    := '*' | segment ( '.' name )?
//! ```
//!
//! Anything that does not fit is quoted whole as a literal name.
//!
//! **Security caveat**: this is a normalizer, not a validator. Any input
//! yields a well-formed quoted identifier, but the identifier may name
//! something the caller did not intend. Names sourced from untrusted
//! input should go through [`quote_name_strict`] instead.

use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::{Dialect, SqliteDialect};
use crate::error::{Error, Result};

static NAME_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)^("(?:[^"]|"")*"|`(?:[^`]|``)+`|'(?:[^']|'')+'|\[[^\]]+\]|[^"`'\[.][^.]*)(?:\.(.*))?$"#,
    )
    .expect("identifier grammar is a valid regex")
});

static BARE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("bare identifier pattern is a valid regex")
});

/// One segment of a dotted name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// The `*` wildcard.
    Star,
    /// A quoted segment: unescaped content is `inner` with `doubled`
    /// collapsed to a single character.
    Quoted { inner: &'a str, doubled: Option<&'static str> },
    /// A bare segment.
    Bare(&'a str),
    /// Trailing input that matched no segment pattern.
    Literal(&'a str),
}

impl<'a> Segment<'a> {
    fn parse(part: &'a str) -> Self {
        let inner = || &part[1..part.len() - 1];
        match part.as_bytes()[0] {
            b'"' => Self::Quoted { inner: inner(), doubled: Some("\"\"") },
            b'`' => Self::Quoted { inner: inner(), doubled: Some("``") },
            b'\'' => Self::Quoted { inner: inner(), doubled: Some("''") },
            b'[' => Self::Quoted { inner: inner(), doubled: None },
            _ => Self::Bare(part),
        }
    }

    fn unescaped(&self) -> String {
        match *self {
            Self::Star => String::from("*"),
            Self::Quoted { inner, doubled: Some(pair) } => inner.replace(pair, &pair[..1]),
            Self::Quoted { inner, doubled: None } | Self::Bare(inner) | Self::Literal(inner) => {
                String::from(inner)
            }
        }
    }

    fn render<D: Dialect>(&self, dialect: &D) -> String {
        match self {
            Self::Star => String::from("*"),
            _ => dialect.quote_identifier(&self.unescaped()),
        }
    }
}

fn segments(raw: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = raw;
    loop {
        if rest == "*" {
            out.push(Segment::Star);
            break;
        }
        let Some(caps) = NAME_PART.captures(rest) else {
            out.push(Segment::Literal(rest));
            break;
        };
        let Some(part) = caps.get(1) else {
            out.push(Segment::Literal(rest));
            break;
        };
        out.push(Segment::parse(part.as_str()));
        match caps.get(2) {
            Some(tail) => rest = tail.as_str(),
            None => break,
        }
    }
    out
}

/// Quotes a name in the SQLite dialect.
///
/// ```rust
/// use sqlman_core::quote::quote_name;
///
/// assert_eq!(quote_name("main.users"), r#""main"."users""#);
/// assert_eq!(quote_name("[weird name].`col`"), r#""weird name"."col""#);
/// assert_eq!(quote_name("t.*"), r#""t".*"#);
/// ```
#[must_use]
pub fn quote_name(raw: &str) -> String {
    quote_name_with(&SqliteDialect, raw)
}

/// Quotes a name using the given dialect's canonical quote style.
#[must_use]
pub fn quote_name_with<D: Dialect>(dialect: &D, raw: &str) -> String {
    segments(raw)
        .iter()
        .map(|segment| segment.render(dialect))
        .collect::<Vec<_>>()
        .join(".")
}

/// Quotes a name in the SQLite dialect, rejecting suspicious input.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] when the name is empty, holds a
/// control character, has an empty or unparseable segment, or has a bare
/// segment that is not `[A-Za-z_][A-Za-z0-9_$]*`.
pub fn quote_name_strict(raw: &str) -> Result<String> {
    quote_name_strict_with(&SqliteDialect, raw)
}

/// Strict variant of [`quote_name_with`].
///
/// # Errors
///
/// See [`quote_name_strict`].
pub fn quote_name_strict_with<D: Dialect>(dialect: &D, raw: &str) -> Result<String> {
    let reject = |reason: &'static str| Error::InvalidIdentifier {
        name: String::from(raw),
        reason,
    };
    if raw.is_empty() {
        return Err(reject("empty name"));
    }
    if raw.chars().any(char::is_control) {
        return Err(reject("contains a control character"));
    }
    let parts = segments(raw);
    for segment in &parts {
        match segment {
            Segment::Star => {}
            Segment::Literal(_) | Segment::Quoted { inner: "", .. } => {
                return Err(reject("malformed quoting or empty segment"));
            }
            Segment::Bare(name) if !BARE_IDENTIFIER.is_match(name) => {
                return Err(reject("bare segment is not a plain identifier"));
            }
            Segment::Bare(_) | Segment::Quoted { .. } => {}
        }
    }
    Ok(parts
        .iter()
        .map(|segment| segment.render(dialect))
        .collect::<Vec<_>>()
        .join("."))
}
