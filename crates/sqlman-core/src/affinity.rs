//! Column type affinity.
//!
//! SQLite does not enforce declared column types. Instead every column
//! gets one of five storage preferences, derived from the declared type
//! text by a fixed set of substring rules (see "Determination Of Column
//! Affinity" in the SQLite documentation).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage-class preference of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeAffinity {
    /// `INTEGER`
    Integer,
    /// `REAL`
    Real,
    /// `TEXT`
    Text,
    /// `BLOB`
    Blob,
    /// `NUMERIC`
    Numeric,
}

/// Substring rules, checked in order. The first match wins.
const RULES: [(&str, TypeAffinity); 8] = [
    ("INT", TypeAffinity::Integer),
    ("CHAR", TypeAffinity::Text),
    ("CLOB", TypeAffinity::Text),
    ("TEXT", TypeAffinity::Text),
    ("BLOB", TypeAffinity::Blob),
    ("REAL", TypeAffinity::Real),
    ("FLOA", TypeAffinity::Real),
    ("DOUB", TypeAffinity::Real),
];

impl TypeAffinity {
    /// All affinities.
    pub const ALL: [Self; 5] = [
        Self::Integer,
        Self::Real,
        Self::Text,
        Self::Blob,
        Self::Numeric,
    ];

    /// Returns the affinity name in upper case.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Numeric => "NUMERIC",
        }
    }
}

impl fmt::Display for TypeAffinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown affinity name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown type affinity '{0}'")]
pub struct ParseAffinityError(String);

impl FromStr for TypeAffinity {
    type Err = ParseAffinityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|affinity| affinity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseAffinityError(String::from(s)))
    }
}

/// Resolves the affinity of a declared column type.
///
/// Total: every input maps to exactly one affinity.
///
/// ```rust
/// use sqlman_core::affinity::{affinity, TypeAffinity};
///
/// assert_eq!(affinity("VARCHAR(30)"), TypeAffinity::Text);
/// assert_eq!(affinity("FLOATING POINT"), TypeAffinity::Integer);
/// assert_eq!(affinity(""), TypeAffinity::Blob);
/// ```
#[must_use]
pub fn affinity(declared_type: &str) -> TypeAffinity {
    let declared = declared_type.trim();
    if declared.is_empty() {
        return TypeAffinity::Blob;
    }
    if let Ok(exact) = declared.parse::<TypeAffinity>() {
        return exact;
    }
    let upper = declared.to_ascii_uppercase();
    RULES
        .iter()
        .find(|(needle, _)| upper.contains(needle))
        .map_or(TypeAffinity::Numeric, |&(_, affinity)| affinity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_blob() {
        assert_eq!(affinity(""), TypeAffinity::Blob);
        assert_eq!(affinity("   "), TypeAffinity::Blob);
    }

    #[test]
    fn test_exact_names() {
        for a in TypeAffinity::ALL {
            assert_eq!(affinity(a.as_str()), a);
            assert_eq!(affinity(&a.as_str().to_lowercase()), a);
        }
    }

    #[test]
    fn test_documented_examples() {
        let cases = [
            ("INT", TypeAffinity::Integer),
            ("TINYINT", TypeAffinity::Integer),
            ("UNSIGNED BIG INT", TypeAffinity::Integer),
            ("INT8", TypeAffinity::Integer),
            ("CHARACTER(20)", TypeAffinity::Text),
            ("VARCHAR(255)", TypeAffinity::Text),
            ("NATIVE CHARACTER(70)", TypeAffinity::Text),
            ("NVARCHAR(100)", TypeAffinity::Text),
            ("CLOB", TypeAffinity::Text),
            ("DOUBLE PRECISION", TypeAffinity::Real),
            ("FLOAT", TypeAffinity::Real),
            ("DECIMAL(10,5)", TypeAffinity::Numeric),
            ("BOOLEAN", TypeAffinity::Numeric),
            ("DATE", TypeAffinity::Numeric),
            ("DATETIME", TypeAffinity::Numeric),
        ];
        for (declared, expected) in cases {
            assert_eq!(affinity(declared), expected, "{declared}");
        }
    }

    #[test]
    fn test_rule_order() {
        // INT is checked before FLOA.
        assert_eq!(affinity("FLOATING POINT"), TypeAffinity::Integer);
        // INT is checked before CHAR.
        assert_eq!(affinity("CHARINT"), TypeAffinity::Integer);
        // "STRING" contains none of the substrings.
        assert_eq!(affinity("STRING"), TypeAffinity::Numeric);
    }

    #[test]
    fn test_from_str_and_display() {
        assert_eq!("real".parse::<TypeAffinity>(), Ok(TypeAffinity::Real));
        assert!("varchar".parse::<TypeAffinity>().is_err());
        assert_eq!(TypeAffinity::Numeric.to_string(), "NUMERIC");
    }

    #[test]
    fn test_serde_uses_upper_case() {
        let json = serde_json::to_string(&TypeAffinity::Integer).unwrap();
        assert_eq!(json, "\"INTEGER\"");
        let back: TypeAffinity = serde_json::from_str("\"BLOB\"").unwrap();
        assert_eq!(back, TypeAffinity::Blob);
    }
}
