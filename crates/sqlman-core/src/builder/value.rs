//! SQL values and literal escaping.
//!
//! Every piece of data that ends up in a [`Fragment`](super::Fragment)
//! passes through [`escape_value_with`]. The function is total: any
//! [`Datum`] renders to valid SQL text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dialect::{Dialect, SqliteDialect};

/// A SQL scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value, rendered as `1` / `0`.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value, always rendered as a hex literal.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Stringifies a value of any other type into [`SqlValue::Text`].
    #[must_use]
    pub fn display(value: impl fmt::Display) -> Self {
        Self::Text(value.to_string())
    }

    /// Returns `true` for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! int_to_sql_value {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )*
    };
}

int_to_sql_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

/// A piece of data headed for a fragment.
///
/// The variant decides how it is escaped. Plain Rust values convert into
/// [`Datum::Value`]; names must be asked for with [`Datum::name`].
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    /// Escaped as a literal.
    Value(SqlValue),
    /// Escaped as one or more (possibly dotted) identifiers, joined by `,`.
    Name(Vec<String>),
    /// Inserted verbatim.
    Raw(String),
}

impl Datum {
    /// A literal value.
    #[must_use]
    pub fn value(value: impl ToSqlValue) -> Self {
        Self::Value(value.to_sql_value())
    }

    /// A single identifier.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(vec![name.into()])
    }

    /// A comma separated identifier list.
    #[must_use]
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Name(names.into_iter().map(Into::into).collect())
    }

    /// Verbatim SQL.
    ///
    /// **Trusted input only.** The text is not escaped in any way; never
    /// pass anything derived from user input here. Prefer converting a
    /// built [`Fragment`](super::Fragment) instead.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Returns `true` for a `NULL` literal.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Value(SqlValue::Null))
    }
}

impl From<SqlValue> for Datum {
    fn from(value: SqlValue) -> Self {
        Self::Value(value)
    }
}

macro_rules! value_into_datum {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Datum {
                fn from(value: $ty) -> Self {
                    Self::Value(value.to_sql_value())
                }
            }

            impl From<Option<$ty>> for Datum {
                fn from(value: Option<$ty>) -> Self {
                    Self::Value(value.to_sql_value())
                }
            }
        )*
    };
}

value_into_datum!(bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, String, &str, &String, Vec<u8>, &[u8]);

/// How text values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeMode {
    /// Quoted string, or a hex blob literal when the text holds a NUL byte.
    #[default]
    Standard,
    /// Quoted string with NUL bytes removed.
    TextOnly,
    /// Hex blob literal, always.
    HexOnly,
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        return String::from("NULL");
    }
    if f.is_infinite() {
        return String::from(if f.is_sign_positive() { "9e999" } else { "-9e999" });
    }
    let mut text = f.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

fn escape_scalar<D: Dialect>(dialect: &D, value: &SqlValue, mode: EscapeMode) -> String {
    match value {
        SqlValue::Null => String::from("NULL"),
        SqlValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
        SqlValue::Int(n) => n.to_string(),
        SqlValue::Float(f) => format_float(*f),
        SqlValue::Text(s) => match mode {
            EscapeMode::HexOnly => dialect.hex_literal(s.as_bytes()),
            EscapeMode::Standard if s.contains('\0') => dialect.hex_literal(s.as_bytes()),
            EscapeMode::Standard => dialect.quote_text(s),
            EscapeMode::TextOnly => dialect.quote_text(&s.replace('\0', "")),
        },
        SqlValue::Blob(bytes) => dialect.hex_literal(bytes),
    }
}

/// Escapes a datum for the given dialect.
#[must_use]
pub fn escape_value_with<D: Dialect>(dialect: &D, datum: &Datum, mode: EscapeMode) -> String {
    match datum {
        Datum::Value(value) => escape_scalar(dialect, value, mode),
        Datum::Name(names) => names
            .iter()
            .map(|name| dialect.quote_name(name))
            .collect::<Vec<_>>()
            .join(","),
        Datum::Raw(sql) => sql.clone(),
    }
}

/// Escapes a datum for SQLite.
///
/// ```rust
/// use sqlman_core::builder::{escape_value, Datum, EscapeMode};
///
/// assert_eq!(escape_value(&Datum::from("it's"), EscapeMode::Standard), "'it''s'");
/// assert_eq!(escape_value(&Datum::from("a\0b"), EscapeMode::Standard), "x'610062'");
/// assert_eq!(escape_value(&Datum::from(None::<i32>), EscapeMode::Standard), "NULL");
/// ```
#[must_use]
pub fn escape_value(datum: &Datum, mode: EscapeMode) -> String {
    escape_value_with(&SqliteDialect, datum, mode)
}

/// Escapes a list for the given dialect, joined by `,`.
///
/// An empty list yields an empty string.
#[must_use]
pub fn escape_values_with<'a, D, I>(dialect: &D, data: I, mode: EscapeMode) -> String
where
    D: Dialect,
    I: IntoIterator<Item = &'a Datum>,
{
    data.into_iter()
        .map(|datum| escape_value_with(dialect, datum, mode))
        .collect::<Vec<_>>()
        .join(",")
}

/// Escapes a list for SQLite, joined by `,`.
#[must_use]
pub fn escape_values<'a, I>(data: I, mode: EscapeMode) -> String
where
    I: IntoIterator<Item = &'a Datum>,
{
    escape_values_with(&SqliteDialect, data, mode)
}

/// Escapes a plain value for SQLite in [`EscapeMode::Standard`].
#[must_use]
pub fn quote_value(value: impl ToSqlValue) -> String {
    escape_scalar(&SqliteDialect, &value.to_sql_value(), EscapeMode::Standard)
}
