//! `RowSource` over a Sea-ORM connection.
//!
//! Tables are addressed by name through `sea_query`, so no entity types are
//! needed: the [`TableSchema`] supplies the column list and the logical type used
//! to read each value back.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, QueryResult,
    sea_query::{Alias, Expr, Query, SelectStatement},
};
use serde_json::Value;
use uuid::Uuid;

use super::RowSource;
use crate::errors::ApiError;
use crate::planner::{CountQuery, SelectQuery};
use crate::schema::{Column, LogicalType, TableSchema};
use crate::value::{FilterValue, Row};

const COUNT_ALIAS: &str = "count";
const UNBOUNDED_LIMIT: u64 = i64::MAX.unsigned_abs();

/// `SELECT <columns> FROM <table> WHERE ... ORDER BY ... LIMIT ... OFFSET ...`
#[must_use]
pub fn select_statement(
    table: &TableSchema,
    query: &SelectQuery,
    backend: DatabaseBackend,
) -> SelectStatement {
    let mut select = Query::select();
    select
        .columns(table.columns.iter().map(|column| Alias::new(&column.name)))
        .from(Alias::new(&table.name));
    if !query.predicate.is_true() {
        select.cond_where(query.predicate.to_condition(backend));
    }

    for key in &query.order_by {
        select.order_by(Alias::new(&key.column), key.direction.into());
    }
    // OFFSET needs a LIMIT on SQLite and MySQL
    match query.pagination.limit {
        Some(limit) => {
            select.limit(limit);
        }
        None if query.pagination.offset > 0 => {
            select.limit(UNBOUNDED_LIMIT);
        }
        None => {}
    }
    if query.pagination.offset > 0 {
        select.offset(query.pagination.offset);
    }
    select
}

/// `SELECT COUNT(*) AS count FROM <table> WHERE ...`
#[must_use]
pub fn count_statement(
    table: &TableSchema,
    query: &CountQuery,
    backend: DatabaseBackend,
) -> SelectStatement {
    let mut count = Query::select();
    count
        .expr_as(Expr::cust("COUNT(*)"), Alias::new(COUNT_ALIAS))
        .from(Alias::new(&table.name));
    if !query.predicate.is_true() {
        count.cond_where(query.predicate.to_condition(backend));
    }
    count
}

fn read_column(result: &QueryResult, column: &Column) -> Result<Value, DbErr> {
    let name = column.name.as_str();
    let value = match column.logical_type {
        LogicalType::Integer => result.try_get::<Option<i64>>("", name)?.map(FilterValue::Integer),
        LogicalType::Float => result.try_get::<Option<f64>>("", name)?.map(FilterValue::Float),
        LogicalType::String => result.try_get::<Option<String>>("", name)?.map(FilterValue::Text),
        LogicalType::Boolean => result.try_get::<Option<bool>>("", name)?.map(FilterValue::Boolean),
        LogicalType::Date => result.try_get::<Option<NaiveDate>>("", name)?.map(FilterValue::Date),
        LogicalType::DateTime => result
            .try_get::<Option<NaiveDateTime>>("", name)?
            .map(FilterValue::DateTime),
        LogicalType::Uuid => result.try_get::<Option<Uuid>>("", name)?.map(FilterValue::Uuid),
    };
    Ok(value.map_or(Value::Null, |value| value.to_json()))
}

fn decode_row(table: &TableSchema, result: &QueryResult) -> Result<Row, DbErr> {
    let mut row = Row::new();
    for column in &table.columns {
        row.insert(column.name.clone(), read_column(result, column)?);
    }
    Ok(row)
}

#[async_trait]
impl RowSource for DatabaseConnection {
    async fn count(&self, table: &TableSchema, query: &CountQuery) -> Result<u64, ApiError> {
        let backend = self.get_database_backend();
        let statement = backend.build(&count_statement(table, query, backend));
        let total = match self.query_one(statement).await? {
            Some(result) => result.try_get::<i64>("", COUNT_ALIAS)?,
            None => 0,
        };
        u64::try_from(total).map_err(|e| {
            ApiError::internal("Failed to count rows", Some(format!("{}: {e}", table.name)))
        })
    }

    async fn select(&self, table: &TableSchema, query: &SelectQuery) -> Result<Vec<Row>, ApiError> {
        let backend = self.get_database_backend();
        let statement = backend.build(&select_statement(table, query, backend));
        let results = self.query_all(statement).await?;
        let rows = results
            .iter()
            .map(|result| decode_row(table, result))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(table = %table.name, rows = rows.len(), "Selected rows");
        Ok(rows)
    }
}
