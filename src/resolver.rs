//! Relationship expansion.
//!
//! For each requested relationship the distinct local key values of the page are
//! collected and one `target_col IN (keys)` select fetches every child row. The
//! selects for different relationships run concurrently. Child rows are then
//! grouped by their linking value and attached to every parent row sharing it.

use std::collections::{BTreeMap, HashMap, HashSet};

use futures_util::future::try_join_all;

use crate::errors::ApiError;
use crate::planner::SelectQuery;
use crate::response::ResultRow;
use crate::schema::{Relationship, SchemaRegistry, TableSchema};
use crate::source::RowSource;
use crate::value::{FilterValue, Row};

/// Key used to match local values with target values, independent of JSON formatting.
fn join_key(table: &TableSchema, column: &str, row: &Row) -> Option<(String, FilterValue)> {
    let logical_type = table.column(column)?.logical_type;
    let value = FilterValue::from_json(logical_type, row.get(column)?)?;
    Some((value.to_json().to_string(), value))
}

/// Distinct non-null values of `column` across `rows`, in first-seen order.
fn distinct_keys(table: &TableSchema, column: &str, rows: &[Row]) -> Vec<FilterValue> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|row| join_key(table, column, row))
        .filter(|(key, _)| seen.insert(key.clone()))
        .map(|(_, value)| value)
        .collect()
}

async fn fetch_related(
    source: &dyn RowSource,
    table: &TableSchema,
    target: &TableSchema,
    relationship: &Relationship,
    rows: &[Row],
) -> Result<HashMap<String, Vec<Row>>, ApiError> {
    let keys = distinct_keys(table, &relationship.local_column, rows);
    if keys.is_empty() {
        return Ok(HashMap::new());
    }

    let query = SelectQuery::related(target, relationship, keys);
    let children = source.select(target, &query).await?;
    tracing::debug!(
        relationship = %relationship.name,
        target = %target.name,
        children = children.len(),
        "Fetched related rows"
    );

    let mut groups: HashMap<String, Vec<Row>> = HashMap::new();
    for child in children {
        if let Some((key, _)) = join_key(target, &relationship.target_column, &child) {
            groups.entry(key).or_default().push(child);
        }
    }
    Ok(groups)
}

/// Attach related rows to each page row.
///
/// Every requested relationship name is present on every row, with an empty list
/// when nothing links to it. Names that were not requested get no key, so with
/// an empty `relationships` every row carries an empty map.
///
/// # Errors
/// - `ApiError::Relationship` if a target table is missing from `registry`.
/// - Any error returned by `source`.
pub async fn expand_relationships(
    source: &dyn RowSource,
    registry: &SchemaRegistry,
    table: &TableSchema,
    rows: Vec<Row>,
    relationships: &[Relationship],
) -> Result<Vec<ResultRow>, ApiError> {
    if relationships.is_empty() {
        return Ok(rows.into_iter().map(ResultRow::new).collect());
    }

    let targets = relationships
        .iter()
        .map(|relationship| {
            registry
                .table(&relationship.target_table)
                .ok_or_else(|| ApiError::relationship(&relationship.name, &table.name))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let groups = try_join_all(
        relationships
            .iter()
            .zip(&targets)
            .map(|(relationship, target)| fetch_related(source, table, target, relationship, &rows)),
    )
    .await?;

    Ok(rows
        .into_iter()
        .map(|columns| {
            let related: BTreeMap<String, Vec<Row>> = relationships
                .iter()
                .zip(&groups)
                .map(|(relationship, group)| {
                    let children = join_key(table, &relationship.local_column, &columns)
                        .and_then(|(key, _)| group.get(&key).cloned())
                        .unwrap_or_default();
                    (relationship.name.clone(), children)
                })
                .collect();
            ResultRow {
                columns,
                relationship: related,
            }
        })
        .collect())
}
