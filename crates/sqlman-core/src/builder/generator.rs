//! Clause and expression helpers shared by the statement generators.

use super::expr::{Aliased, Indexing, OrderTerm};
use super::fragment::Fragment;
use super::value::{escape_value_with, Datum, EscapeMode};
use crate::affinity::TypeAffinity;
use crate::dialect::{Dialect, SqliteDialect};

/// Ordered `column => value` entries for `WHERE`, `HAVING` and `SET`.
///
/// An entry whose key is empty, or whose value is a [`Datum::Raw`]
/// (for instance a converted [`Fragment`]), is spliced in on its own as a
/// complete condition or assignment and its key is ignored. Use
/// [`Datum::Name`] or a plain value to compare against a column.
pub type Conditions = Vec<(String, Datum)>;

fn is_standalone(key: &str, value: &Datum) -> bool {
    key.is_empty() || matches!(value, Datum::Raw(_))
}

/// Renders statements and clauses for one dialect.
///
/// Generators never execute anything; every method returns SQL text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Generator<D: Dialect = SqliteDialect> {
    dialect: D,
}

impl Generator<SqliteDialect> {
    /// Creates a SQLite generator.
    #[must_use]
    pub const fn sqlite() -> Self {
        Self {
            dialect: SqliteDialect,
        }
    }
}


impl<D: Dialect> Generator<D> {
    /// Creates a generator for the given dialect.
    #[must_use]
    pub const fn new(dialect: D) -> Self {
        Self { dialect }
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> D {
        self.dialect
    }

    /// An empty fragment.
    #[must_use]
    pub fn fragment(&self) -> Fragment<D> {
        Fragment::with_dialect(self.dialect)
    }

    /// A fragment holding trusted SQL text.
    #[must_use]
    pub fn raw(&self, sql: impl AsRef<str>) -> Fragment<D> {
        self.fragment().raw(sql)
    }

    /// A quoted name.
    #[must_use]
    pub fn name(&self, name: &str) -> Fragment<D> {
        self.fragment().name(name)
    }

    /// A comma separated name list.
    #[must_use]
    pub fn names<I, A>(&self, list: I, with_alias: bool) -> Fragment<D>
    where
        I: IntoIterator<Item = A>,
        A: Into<Aliased>,
    {
        self.fragment().names(list, with_alias)
    }

    /// An escaped literal.
    #[must_use]
    pub fn value(&self, value: impl Into<Datum>) -> Fragment<D> {
        self.fragment().value(value)
    }

    /// An escaped literal with NUL bytes stripped from text.
    #[must_use]
    pub fn value_text(&self, value: impl Into<Datum>) -> Fragment<D> {
        self.fragment().value_with(value, EscapeMode::TextOnly)
    }

    /// An escaped literal with text always rendered as hex.
    #[must_use]
    pub fn value_hex(&self, value: impl Into<Datum>) -> Fragment<D> {
        self.fragment().value_with(value, EscapeMode::HexOnly)
    }

    /// A comma separated literal list.
    #[must_use]
    pub fn values<I, V>(&self, list: I) -> Fragment<D>
    where
        I: IntoIterator<Item = V>,
        V: Into<Datum>,
    {
        self.fragment().values(list)
    }

    /// A comma separated literal list with an explicit escape mode.
    #[must_use]
    pub fn values_with<I, V>(&self, list: I, mode: EscapeMode) -> Fragment<D>
    where
        I: IntoIterator<Item = V>,
        V: Into<Datum>,
    {
        self.fragment().values_with(list, mode)
    }

    /// `"schema"."table" [AS "alias"] [INDEXED BY "index" | NOT INDEXED]`
    #[must_use]
    pub fn qualified_name(&self, name: &str, alias: Option<&str>, indexing: &Indexing) -> Fragment<D> {
        let mut sql = self.name(name);
        if let Some(alias) = alias {
            sql = sql.alias(alias);
        }
        match indexing {
            Indexing::Any => sql,
            Indexing::By(index) => sql.raw("INDEXED BY").name(index),
            Indexing::NotIndexed => sql.raw("NOT INDEXED"),
        }
    }

    fn condition(&self, key: &str, value: &Datum, grouped: bool) -> String {
        if is_standalone(key, value) {
            let condition = escape_value_with(&self.dialect, value, EscapeMode::Standard);
            return if grouped {
                format!("({condition})")
            } else {
                condition
            };
        }
        self.name(key).eq(value.clone()).into_string()
    }

    fn join_conditions<I, K, V>(&self, pairs: I, separator: &str) -> Fragment<D>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Datum>,
    {
        let pairs: Vec<(K, Datum)> = pairs
            .into_iter()
            .map(|(key, value)| (key, value.into()))
            .collect();
        let grouped = pairs.len() > 1;
        let joined = pairs
            .iter()
            .map(|(key, value)| self.condition(key.as_ref(), value, grouped))
            .collect::<Vec<_>>()
            .join(separator);
        self.raw(joined)
    }

    /// `"a" = 1 AND "b" IS NULL AND (<raw condition>)`
    ///
    /// Standalone conditions are parenthesized when joined with other
    /// entries, so an `OR` inside one cannot leak into the list.
    ///
    /// ```rust
    /// use sqlman_core::builder::{Datum, Generator};
    ///
    /// let g = Generator::sqlite();
    /// let age = g.name("age").ge(18);
    /// let sql = g.where_and([
    ///     ("status", Datum::from("active")),
    ///     ("deleted_at", Datum::from(None::<i64>)),
    ///     ("", Datum::from(age)),
    /// ]);
    /// assert_eq!(
    ///     sql.as_str(),
    ///     r#""status" = 'active' AND "deleted_at" IS NULL AND ("age" >= 18)"#
    /// );
    /// ```
    #[must_use]
    pub fn where_and<I, K, V>(&self, pairs: I) -> Fragment<D>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Datum>,
    {
        self.join_conditions(pairs, " AND ")
    }

    /// Like [`Generator::where_and`], joined with `OR`.
    #[must_use]
    pub fn where_or<I, K, V>(&self, pairs: I) -> Fragment<D>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Datum>,
    {
        self.join_conditions(pairs, " OR ")
    }

    pub(crate) fn conditions(&self, conditions: &Conditions) -> Fragment<D> {
        self.where_and(conditions.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }

    /// `"a" = 1,"b" = NULL,<raw assignment>`
    #[must_use]
    pub fn set_clause<I, K, V>(&self, pairs: I) -> Fragment<D>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Datum>,
    {
        let joined = pairs
            .into_iter()
            .map(|(key, value)| {
                let (key, value) = (key.as_ref(), value.into());
                if is_standalone(key, &value) {
                    escape_value_with(&self.dialect, &value, EscapeMode::Standard)
                } else {
                    self.name(key).raw("=").datum(&value).into_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        self.raw(joined)
    }

    /// `"l1" = "r1" AND "l2" = "r2"`, both sides names.
    #[must_use]
    pub fn on_clause<I, L, R>(&self, pairs: I) -> Fragment<D>
    where
        I: IntoIterator<Item = (L, R)>,
        L: AsRef<str>,
        R: AsRef<str>,
    {
        self.join_conditions(
            pairs
                .into_iter()
                .map(|(l, r)| (String::from(l.as_ref()), Datum::name(r.as_ref()))),
            " AND ",
        )
    }

    /// Comma separated ordering terms.
    #[must_use]
    pub fn order_by<I, T>(&self, terms: I) -> Fragment<D>
    where
        I: IntoIterator<Item = T>,
        T: Into<OrderTerm>,
    {
        let joined = terms
            .into_iter()
            .map(|term| term.into().render(self.dialect, true).into_string())
            .collect::<Vec<_>>()
            .join(",");
        self.raw(joined)
    }

    /// Comma separated indexed columns (ordering terms without `NULLS`).
    #[must_use]
    pub fn indexed_columns<I, T>(&self, terms: I) -> Fragment<D>
    where
        I: IntoIterator<Item = T>,
        T: Into<OrderTerm>,
    {
        let joined = terms
            .into_iter()
            .map(|term| term.into().render(self.dialect, false).into_string())
            .collect::<Vec<_>>()
            .join(",");
        self.raw(joined)
    }

    /// `RETURNING a,b AS "x"`; empty when the list is empty.
    #[must_use]
    pub fn returning<I, A>(&self, list: I) -> Fragment<D>
    where
        I: IntoIterator<Item = A>,
        A: Into<Aliased>,
    {
        let names = self.names(list, true);
        if names.is_empty() {
            return names;
        }
        self.raw("RETURNING").append(names)
    }

    /// `v1||v2||…`
    #[must_use]
    pub fn concat<I, V>(&self, values: I) -> Fragment<D>
    where
        I: IntoIterator<Item = V>,
        V: Into<Datum>,
    {
        let mut values = values.into_iter();
        let Some(first) = values.next() else {
            return self.fragment();
        };
        values.fold(self.value(first), |sql, value| sql.concat(value))
    }

    /// `func(v1,v2,…)` with every argument escaped as a literal.
    ///
    /// The function name is emitted verbatim.
    #[must_use]
    pub fn fn_values<I, V>(&self, func: &str, args: I) -> Fragment<D>
    where
        I: IntoIterator<Item = V>,
        V: Into<Datum>,
    {
        self.raw(format!("{func}({})", self.values(args)))
    }

    /// `func("a","b",…)` with every argument quoted as a name.
    ///
    /// The function name is emitted verbatim.
    #[must_use]
    pub fn fn_names<I, A>(&self, func: &str, args: I) -> Fragment<D>
    where
        I: IntoIterator<Item = A>,
        A: Into<Aliased>,
    {
        self.raw(format!("{func}({})", self.names(args, false)))
    }

    /// `CAST(value AS AFFINITY)`
    #[must_use]
    pub fn cast(&self, value: impl Into<Datum>, affinity: TypeAffinity) -> Fragment<D> {
        let inner = self.value(value).raw("AS").raw(affinity.as_str());
        self.raw("CAST").group(inner)
    }

    /// `WHEN when THEN then`
    #[must_use]
    pub fn when(&self, when: impl Into<Datum>, then: impl Into<Datum>) -> Fragment<D> {
        self.raw("WHEN").value(when).raw("THEN").value(then)
    }

    /// A sequence of `WHEN … THEN …` pairs.
    #[must_use]
    pub fn when_list<I, W, T>(&self, pairs: I) -> Fragment<D>
    where
        I: IntoIterator<Item = (W, T)>,
        W: Into<Datum>,
        T: Into<Datum>,
    {
        pairs
            .into_iter()
            .fold(self.fragment(), |sql, (when, then)| sql.append(self.when(when, then)))
    }

    /// `CASE [base] <whens> [ELSE value] END`
    ///
    /// ```rust
    /// use sqlman_core::builder::{Datum, Generator};
    ///
    /// let g = Generator::sqlite();
    /// let sql = g.case(
    ///     Some(Datum::name("level")),
    ///     g.when_list([(1, "low"), (2, "high")]),
    ///     Some(Datum::from("unknown")),
    /// );
    /// assert_eq!(
    ///     sql.as_str(),
    ///     r#"CASE "level" WHEN 1 THEN 'low' WHEN 2 THEN 'high' ELSE 'unknown' END"#
    /// );
    /// ```
    #[must_use]
    pub fn case(&self, base: Option<Datum>, whens: Fragment<D>, otherwise: Option<Datum>) -> Fragment<D> {
        let mut sql = self.raw("CASE");
        if let Some(base) = base {
            sql = sql.datum(&base);
        }
        sql = sql.append(whens);
        if let Some(otherwise) = otherwise {
            sql = sql.raw("ELSE").datum(&otherwise);
        }
        sql.raw("END")
    }

    /// The `excluded."column"` pseudo-row name used in upsert updates.
    #[must_use]
    pub fn excluded(&self, column: &str) -> Datum {
        Datum::name(format!("excluded.{}", self.dialect.quote_identifier(column)))
    }

    /// `VACUUM ["schema"] [INTO 'file']`
    #[must_use]
    pub fn vacuum(&self, schema: Option<&str>, into: Option<&str>) -> Fragment<D> {
        let mut sql = self.raw("VACUUM");
        if let Some(schema) = schema {
            sql = sql.raw(self.dialect.quote_identifier(schema));
        }
        if let Some(file) = into {
            sql = sql.raw("INTO").value(file);
        }
        sql
    }

    /// `ATTACH DATABASE 'file' AS "name"`
    #[must_use]
    pub fn attach_database(&self, file: &str, name: &str) -> Fragment<D> {
        self.raw("ATTACH DATABASE").value(file).alias(name)
    }

    /// `DETACH DATABASE "name"`
    #[must_use]
    pub fn detach_database(&self, name: &str) -> Fragment<D> {
        self.raw("DETACH DATABASE")
            .raw(self.dialect.quote_identifier(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::expr::Nulls;
    use crate::builder::value::SqlValue;

    fn g() -> Generator {
        Generator::sqlite()
    }

    #[test]
    fn test_where_and_or() {
        let sql = g().where_and([("a", Datum::from(1)), ("b", Datum::from(SqlValue::Null))]);
        assert_eq!(sql.as_str(), "\"a\" = 1 AND \"b\" IS NULL");
        let sql = g().where_or([("a", 1), ("b", 2)]);
        assert_eq!(sql.as_str(), "\"a\" = 1 OR \"b\" = 2");
        assert!(g().where_and(Vec::<(&str, i32)>::new()).is_empty());
    }

    #[test]
    fn test_raw_value_is_standalone_condition() {
        let cond = g().name("x").gt(5);
        let sql = g().where_and([
            ("x", Datum::from(cond)),
            ("y", Datum::from(1)),
            ("", Datum::raw("\"z\" IS NOT NULL")),
        ]);
        assert_eq!(sql.as_str(), "(\"x\" > 5) AND \"y\" = 1 AND (\"z\" IS NOT NULL)");
        assert_eq!(g().where_and([("x", Datum::from(g().name("x").gt(5)))]).as_str(), "\"x\" > 5");
    }

    #[test]
    fn test_raw_value_is_standalone_assignment() {
        let sql = g().set_clause([("n", Datum::raw("\"n\" = \"n\" + 1")), ("m", Datum::from(2))]);
        assert_eq!(sql.as_str(), "\"n\" = \"n\" + 1,\"m\" = 2");
    }

    #[test]
    fn test_set_clause() {
        let sql = g().set_clause([
            ("a", Datum::from(1)),
            ("b", Datum::from(SqlValue::Null)),
            ("c", Datum::name("d")),
            ("", Datum::raw("\"e\" = \"e\" + 1")),
        ]);
        assert_eq!(sql.as_str(), "\"a\" = 1,\"b\" = NULL,\"c\" = \"d\",\"e\" = \"e\" + 1");
    }

    #[test]
    fn test_on_clause() {
        let sql = g().on_clause([("a.id", "b.a_id"), ("a.k", "b.k")]);
        assert_eq!(
            sql.as_str(),
            "\"a\".\"id\" = \"b\".\"a_id\" AND \"a\".\"k\" = \"b\".\"k\""
        );
    }

    #[test]
    fn test_qualified_name() {
        let by = Indexing::By(String::from("idx_a"));
        assert_eq!(
            g().qualified_name("main.t", Some("x"), &by).as_str(),
            "\"main\".\"t\" AS \"x\" INDEXED BY \"idx_a\""
        );
        assert_eq!(
            g().qualified_name("t", None, &Indexing::NotIndexed).as_str(),
            "\"t\" NOT INDEXED"
        );
    }

    #[test]
    fn test_order_by_and_indexed_columns() {
        let terms = [
            OrderTerm::new("a").desc().nulls(Nulls::First),
            OrderTerm::new("b"),
        ];
        assert_eq!(
            g().order_by(terms.clone()).as_str(),
            "\"a\" DESC NULLS FIRST,\"b\""
        );
        assert_eq!(g().indexed_columns(terms).as_str(), "\"a\" DESC,\"b\"");
    }

    #[test]
    fn test_returning() {
        assert_eq!(
            g().returning(["id", "name"]).as_str(),
            "RETURNING \"id\",\"name\""
        );
        assert!(g().returning(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn test_functions_and_cast() {
        assert_eq!(g().fn_values("ABS", [-3]).as_str(), "ABS(-3)");
        assert_eq!(g().fn_values("CHANGES", Vec::<i32>::new()).as_str(), "CHANGES()");
        assert_eq!(
            g().fn_names("COALESCE", ["a", "t.b"]).as_str(),
            "COALESCE(\"a\",\"t\".\"b\")"
        );
        assert_eq!(
            g().cast("12", TypeAffinity::Integer).as_str(),
            "CAST ('12' AS INTEGER)"
        );
        assert_eq!(
            g().concat([Datum::name("first"), Datum::from(" "), Datum::name("last")]).as_str(),
            "\"first\"||' '||\"last\""
        );
    }

    #[test]
    fn test_case_without_base() {
        let whens = g()
            .when(Datum::from(g().name("n").lt(0)), "negative")
            .append(g().when(Datum::from(g().name("n").eq(0)), "zero"));
        let sql = g().case(None, whens, None);
        assert_eq!(
            sql.as_str(),
            "CASE WHEN \"n\" < 0 THEN 'negative' WHEN \"n\" = 0 THEN 'zero' END"
        );
    }

    #[test]
    fn test_excluded() {
        let sql = g().set_clause([("hits", g().excluded("hits"))]);
        assert_eq!(sql.as_str(), "\"hits\" = \"excluded\".\"hits\"");
    }

    #[test]
    fn test_maintenance() {
        assert_eq!(g().vacuum(None, None).as_str(), "VACUUM");
        assert_eq!(
            g().vacuum(Some("main"), Some("/tmp/b.db")).as_str(),
            "VACUUM \"main\" INTO '/tmp/b.db'"
        );
        assert_eq!(
            g().attach_database("other.db", "aux").as_str(),
            "ATTACH DATABASE 'other.db' AS \"aux\""
        );
        assert_eq!(g().detach_database("aux").as_str(), "DETACH DATABASE \"aux\"");
    }
}
