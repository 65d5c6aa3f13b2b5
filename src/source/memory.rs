//! In-process `RowSource` holding plain JSON rows per table.
//!
//! Rows are filtered with [`Predicate::matches`], so the same predicate tree that
//! renders to SQL decides membership here. Ordering puts NULLs first when
//! ascending, which is what SQLite and MySQL do.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;

use super::RowSource;
use crate::errors::ApiError;
use crate::filtering::{SortDirection, SortKey};
use crate::planner::{CountQuery, SelectQuery};
use crate::schema::TableSchema;
use crate::value::{FilterValue, Row};

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<Row>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rows(mut self, table: impl Into<String>, rows: impl IntoIterator<Item = Row>) -> Self {
        self.tables.entry(table.into()).or_default().extend(rows);
        self
    }

    fn rows(&self, table: &TableSchema) -> &[Row] {
        self.tables.get(&table.name).map(Vec::as_slice).unwrap_or_default()
    }
}

fn compare_column(table: &TableSchema, key: &SortKey, a: &Row, b: &Row) -> Ordering {
    let Some(column) = table.column(&key.column) else {
        return Ordering::Equal;
    };
    let read = |row: &Row| {
        row.get(&key.column)
            .and_then(|value| FilterValue::from_json(column.logical_type, value))
    };
    let ordering = match (read(a), read(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    };
    match key.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Keep only the schema's columns, in schema order.
fn project(table: &TableSchema, row: &Row) -> Row {
    table
        .columns
        .iter()
        .map(|column| {
            let value = row.get(&column.name).cloned().unwrap_or_default();
            (column.name.clone(), value)
        })
        .collect()
}

#[async_trait]
impl RowSource for MemorySource {
    async fn count(&self, table: &TableSchema, query: &CountQuery) -> Result<u64, ApiError> {
        let matched = self
            .rows(table)
            .iter()
            .filter(|row| query.predicate.matches(row, table))
            .count();
        u64::try_from(matched)
            .map_err(|e| ApiError::internal("Failed to count rows", Some(e.to_string())))
    }

    async fn select(&self, table: &TableSchema, query: &SelectQuery) -> Result<Vec<Row>, ApiError> {
        let mut matched: Vec<&Row> = self
            .rows(table)
            .iter()
            .filter(|row| query.predicate.matches(row, table))
            .collect();

        // Vec::sort_by is stable, so rows tied on every key keep physical order
        if !query.order_by.is_empty() {
            matched.sort_by(|a, b| {
                query
                    .order_by
                    .iter()
                    .map(|key| compare_column(table, key, a, b))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
        }

        Ok(query
            .pagination
            .window(matched)
            .into_iter()
            .map(|row| project(table, row))
            .collect())
    }
}
