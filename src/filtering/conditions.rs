//! Filter Compiler.
//!
//! A [`FilterRequest`] compiles to a backend-neutral [`Predicate`] tree. The tree
//! renders to a Sea-ORM [`Condition`] for SQL sources and can also be evaluated
//! directly against JSON rows, which is what the in-memory source does. Both
//! paths follow SQL semantics for NULL: a comparison against a missing value is
//! never true, including the negated forms.

use sea_orm::{
    Condition, DatabaseBackend,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};

use super::operators::{MatchMode, RangeOperator};
use super::request::{ColumnFilter, FilterRequest};
use crate::schema::TableSchema;
use crate::value::{FilterValue, Row};

/// Composable boolean condition over one table's rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row
    True,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    /// `column <op> value`
    Compare {
        column: String,
        operator: RangeOperator,
        value: FilterValue,
    },
    /// `column IN (values)` or, negated, `column NOT IN (values)`
    Membership {
        column: String,
        values: Vec<FilterValue>,
        negated: bool,
    },
    /// String match under `mode`
    Text {
        column: String,
        mode: MatchMode,
        value: String,
    },
}

impl Predicate {
    /// Conjunction that drops `True` members and flattens nested `And`s.
    #[must_use]
    pub fn all(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Self::True => {}
                Self::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::True,
            1 => flat.remove(0),
            _ => Self::And(flat),
        }
    }

    /// Disjunction of alternatives. A single alternative is returned as-is.
    #[must_use]
    pub fn any(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut parts: Vec<Predicate> = parts.into_iter().collect();
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Self::Or(parts)
        }
    }

    #[must_use]
    pub fn eq(column: impl Into<String>, value: FilterValue) -> Self {
        Self::Membership {
            column: column.into(),
            values: vec![value],
            negated: false,
        }
    }

    #[must_use]
    pub fn is_in(column: impl Into<String>, values: Vec<FilterValue>) -> Self {
        Self::Membership {
            column: column.into(),
            values,
            negated: false,
        }
    }

    /// A predicate no row satisfies.
    #[must_use]
    pub fn none(column: impl Into<String>) -> Self {
        Self::is_in(column, Vec::new())
    }

    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }

    /// Render as a Sea-ORM condition.
    ///
    /// Substring matching is rendered per backend so that it stays case-sensitive
    /// (`LIKE` is case-insensitive on `SQLite`).
    #[must_use]
    pub fn to_condition(&self, backend: DatabaseBackend) -> Condition {
        match self {
            Self::True => Condition::all(),
            Self::And(parts) => parts
                .iter()
                .fold(Condition::all(), |cond, part| cond.add(part.to_condition(backend))),
            Self::Or(parts) => parts
                .iter()
                .fold(Condition::any(), |cond, part| cond.add(part.to_condition(backend))),
            leaf => Condition::all().add(leaf.to_expr(backend)),
        }
    }

    fn to_expr(&self, backend: DatabaseBackend) -> SimpleExpr {
        match self {
            Self::Compare {
                column,
                operator,
                value,
            } => {
                let col = Expr::col(Alias::new(column));
                let value = sea_orm::Value::from(value.clone());
                match operator {
                    RangeOperator::GreaterThan => col.gt(value),
                    RangeOperator::GreaterThanOrEqualTo => col.gte(value),
                    RangeOperator::LessThan => col.lt(value),
                    RangeOperator::LessThanOrEqualTo => col.lte(value),
                }
            }
            Self::Membership {
                column,
                values,
                negated,
            } => {
                let col = Expr::col(Alias::new(column));
                match (values.as_slice(), negated) {
                    ([single], false) => col.eq(sea_orm::Value::from(single.clone())),
                    ([single], true) => col.ne(sea_orm::Value::from(single.clone())),
                    (_, false) => col.is_in(values.iter().cloned().map(sea_orm::Value::from)),
                    (_, true) => col.is_not_in(values.iter().cloned().map(sea_orm::Value::from)),
                }
            }
            Self::Text {
                column,
                mode,
                value,
            } => text_expr(column, *mode, value, backend),
            Self::True | Self::And(_) | Self::Or(_) => {
                // Composite nodes are handled by `to_condition`.
                SimpleExpr::Value(true.into())
            }
        }
    }

    /// Evaluate against one stored row of `table`.
    #[must_use]
    pub fn matches(&self, row: &Row, table: &TableSchema) -> bool {
        match self {
            Self::True => true,
            Self::And(parts) => parts.iter().all(|part| part.matches(row, table)),
            Self::Or(parts) => parts.iter().any(|part| part.matches(row, table)),
            Self::Compare {
                column,
                operator,
                value,
            } => stored(row, table, column).is_some_and(|stored| match operator {
                RangeOperator::GreaterThan => stored > *value,
                RangeOperator::GreaterThanOrEqualTo => stored >= *value,
                RangeOperator::LessThan => stored < *value,
                RangeOperator::LessThanOrEqualTo => stored <= *value,
            }),
            Self::Membership {
                column,
                values,
                negated,
            } => stored(row, table, column)
                .is_some_and(|stored| values.iter().any(|value| *value == stored) != *negated),
            Self::Text {
                column,
                mode,
                value,
            } => stored(row, table, column)
                .as_ref()
                .and_then(FilterValue::as_text)
                .is_some_and(|stored| mode.matches(stored, value)),
        }
    }
}

fn stored(row: &Row, table: &TableSchema, column: &str) -> Option<FilterValue> {
    let logical_type = table.column(column)?.logical_type;
    FilterValue::from_json(logical_type, row.get(column)?)
}

fn text_expr(column: &str, mode: MatchMode, value: &str, backend: DatabaseBackend) -> SimpleExpr {
    match mode {
        MatchMode::CaseSensitive => Expr::col(Alias::new(column)).eq(value),
        MatchMode::CaseInsensitive => {
            Expr::expr(Func::lower(Expr::col(Alias::new(column))))
                .eq(Func::lower(Expr::val(value)))
        }
        MatchMode::Contains => {
            let position = match backend {
                DatabaseBackend::Postgres => Func::cust(Alias::new("strpos")),
                _ => Func::cust(Alias::new("instr")),
            };
            Expr::expr(position.arg(Expr::col(Alias::new(column))).arg(value)).gt(0)
        }
    }
}

fn compile_column(filter: &ColumnFilter) -> Predicate {
    let column = filter.column.as_str();
    let mut parts = Vec::new();

    if let Some(range) = &filter.range {
        for bound in [&range.from, &range.to].into_iter().flatten() {
            parts.push(Predicate::Compare {
                column: column.to_string(),
                operator: bound.operator,
                value: bound.value.clone(),
            });
        }
    }

    if let Some(list) = &filter.list {
        parts.push(Predicate::Membership {
            column: column.to_string(),
            values: list.values.clone(),
            negated: list.operator.is_negated(),
        });
    }

    if let Some(string) = &filter.string {
        parts.push(Predicate::any(string.values.iter().map(|value| {
            Predicate::Text {
                column: column.to_string(),
                mode: string.mode,
                value: value.clone(),
            }
        })));
    }

    Predicate::all(parts)
}

/// Compile every active column constraint into one conjunction.
///
/// An unfiltered request yields [`Predicate::True`].
#[must_use]
pub fn compile_filters(request: &FilterRequest) -> Predicate {
    Predicate::all(request.columns.iter().map(compile_column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrudConfig;
    use crate::filtering::decode::decode_request;
    use crate::filtering::params::QueryParams;
    use crate::schema::{Column, LogicalType};
    use sea_orm::sea_query::{Query, QueryStatementWriter, SqliteQueryBuilder};
    use serde_json::json;

    fn table() -> TableSchema {
        TableSchema::new("account")
            .with_column(Column::new("id", LogicalType::Integer))
            .with_column(Column::new("name", LogicalType::String))
            .with_column(Column::new("score", LogicalType::Float).nullable())
            .with_primary_key(["id"])
    }

    fn compile(query: &str) -> Predicate {
        let request =
            decode_request(&QueryParams::parse(query), &table(), &CrudConfig::default()).unwrap();
        compile_filters(&request)
    }

    fn row(value: serde_json::Value) -> Row {
        value.as_object().unwrap().clone()
    }

    fn sql(predicate: &Predicate) -> String {
        Query::select()
            .column(Alias::new("id"))
            .from(Alias::new("account"))
            .cond_where(predicate.to_condition(DatabaseBackend::Sqlite))
            .to_string(SqliteQueryBuilder)
    }

    #[test]
    fn test_empty_request_matches_all() {
        let predicate = compile("");
        assert!(predicate.is_true());
        assert!(predicate.matches(&row(json!({"id": 1, "name": "x"})), &table()));
    }

    #[test]
    fn test_range_bounds_are_conjunctive() {
        let predicate = compile("id____from=1&id____to=3&id____to_____comparison_operator=Less_than");
        let t = table();
        assert!(!predicate.matches(&row(json!({"id": 0})), &t));
        assert!(predicate.matches(&row(json!({"id": 1})), &t));
        assert!(predicate.matches(&row(json!({"id": 2})), &t));
        assert!(!predicate.matches(&row(json!({"id": 3})), &t));
    }

    #[test]
    fn test_columns_combine_with_and() {
        let predicate = compile("id____list=1&id____list=2&name____str=b");
        let t = table();
        assert!(predicate.matches(&row(json!({"id": 2, "name": "b"})), &t));
        assert!(!predicate.matches(&row(json!({"id": 2, "name": "a"})), &t));
        assert!(!predicate.matches(&row(json!({"id": 3, "name": "b"})), &t));
    }

    #[test]
    fn test_string_values_are_alternatives() {
        let predicate = compile("name____str=a&name____str=b");
        let t = table();
        assert!(predicate.matches(&row(json!({"name": "a"})), &t));
        assert!(predicate.matches(&row(json!({"name": "b"})), &t));
        assert!(!predicate.matches(&row(json!({"name": "c"})), &t));
    }

    #[test]
    fn test_contains_versus_case_sensitive() {
        let t = table();
        let contains = compile("name____str=string&name____str_____matching_pattern=contains");
        let exact = compile("name____str=string&name____str_____matching_pattern=case_sensitive");
        for name in ["string1", "string2"] {
            let candidate = row(json!({"name": name}));
            assert!(contains.matches(&candidate, &t));
            assert!(!exact.matches(&candidate, &t));
        }
    }

    #[test]
    fn test_null_never_matches() {
        let t = table();
        let candidate = row(json!({"id": 1, "score": null}));
        assert!(!compile("score____from=0").matches(&candidate, &t));
        assert!(!compile("score____list=1.5&score____list_____comparison_operator=Not_equal")
            .matches(&candidate, &t));
        assert!(compile("score____list=1.5&score____list_____comparison_operator=Not_equal")
            .matches(&row(json!({"score": 2.0})), &t));
    }

    #[test]
    fn test_not_in() {
        let predicate = compile("id____list=1&id____list=2&id____list_____comparison_operator=Not_in");
        let t = table();
        assert!(!predicate.matches(&row(json!({"id": 1})), &t));
        assert!(predicate.matches(&row(json!({"id": 3})), &t));
    }

    #[test]
    fn test_none_matches_nothing() {
        assert!(!Predicate::none("id").matches(&row(json!({"id": 1})), &table()));
    }

    #[test]
    fn test_all_flattens() {
        let p = Predicate::all([
            Predicate::True,
            Predicate::all([Predicate::eq("id", FilterValue::Integer(1)), Predicate::none("id")]),
        ]);
        assert!(matches!(p, Predicate::And(ref parts) if parts.len() == 2));
        assert!(Predicate::all([]).is_true());
    }

    #[test]
    fn test_sql_rendering() {
        let range = sql(&compile("id____from=1&id____to=5"));
        assert!(range.contains(r#""id" >= 1"#), "{range}");
        assert!(range.contains(r#""id" <= 5"#), "{range}");

        let list = sql(&compile("id____list=1&id____list=2"));
        assert!(list.contains(r#""id" IN (1, 2)"#), "{list}");

        let not_equal = sql(&compile("id____list=1&id____list_____comparison_operator=Not_equal"));
        assert!(not_equal.contains(r#""id" <> 1"#), "{not_equal}");

        let contains = sql(&compile("name____str=str&name____str_____matching_pattern=contains"));
        assert!(contains.contains("instr"), "{contains}");
        assert!(contains.contains("'str'"), "{contains}");

        let folded = sql(&compile(
            "name____str=Caf%C3%89&name____str_____matching_pattern=case_insensitive",
        ));
        assert!(folded.contains(r#"LOWER("name") = LOWER('CafÉ')"#), "{folded}");

        let unfiltered = compile("");
        assert!(unfiltered.is_true());
        assert!(sql(&unfiltered).ends_with("WHERE TRUE"), "{}", sql(&unfiltered));
    }
}
