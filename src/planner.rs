//! Query Planner.
//!
//! A [`QueryPlan`] holds everything needed to answer one list request:
//!
//! - the **count query**: predicate only, so `total` never depends on sort or pagination;
//! - the **page query**: predicate, resolved sort keys and the `limit`/`offset` window;
//! - one [`Relationship`] per requested expansion, already checked against the schema.
//!
//! All checks happen here, before any data-store call.

use crate::errors::ApiError;
use crate::filtering::{
    FilterRequest, Pagination, Predicate, SortKey, compile_filters, resolve_sort_keys,
};
use crate::schema::{Relationship, SchemaRegistry, TableSchema};
use crate::value::FilterValue;

/// Predicate-only query returning a single integer.
#[derive(Debug, Clone, PartialEq)]
pub struct CountQuery {
    pub predicate: Predicate,
}

/// Row-returning query against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub predicate: Predicate,
    /// Empty means physical order
    pub order_by: Vec<SortKey>,
    pub pagination: Pagination,
}

impl SelectQuery {
    /// Unconditional expansion query: every `target` row whose linked column is
    /// one of `keys`, ordered by the target's primary key and never paginated.
    #[must_use]
    pub fn related(target: &TableSchema, relationship: &Relationship, keys: Vec<FilterValue>) -> Self {
        Self {
            predicate: Predicate::is_in(&relationship.target_column, keys),
            order_by: target.primary_key.iter().map(SortKey::asc).collect(),
            pagination: Pagination::unbounded(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub table: String,
    pub count: CountQuery,
    pub page: SelectQuery,
    pub relationships: Vec<Relationship>,
}

impl QueryPlan {
    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.count.predicate
    }
}

/// Check each requested name against the table's declarations and the registry.
///
/// # Errors
/// Returns `ApiError::Relationship` for the first name that is not declared on
/// `table` or whose target table is not registered.
pub fn resolve_relationships(
    table: &TableSchema,
    registry: &SchemaRegistry,
    names: &[String],
) -> Result<Vec<Relationship>, ApiError> {
    names
        .iter()
        .map(|name| {
            table
                .relationship(name)
                .filter(|rel| registry.table(&rel.target_table).is_some())
                .cloned()
                .ok_or_else(|| ApiError::relationship(name, &table.name))
        })
        .collect()
}

/// Plan a list request. `scope` is ANDed with the compiled filters; pass
/// [`Predicate::True`] for a plain collection listing.
///
/// # Errors
/// - `ApiError::QueryPlan` for unknown sort columns.
/// - `ApiError::Relationship` for undeclared relationships.
pub fn plan_query(
    table: &TableSchema,
    registry: &SchemaRegistry,
    request: &FilterRequest,
    scope: Predicate,
) -> Result<QueryPlan, ApiError> {
    let order_by = resolve_sort_keys(table, &request.order_by)?;
    let relationships = resolve_relationships(table, registry, &request.relationships)?;
    let predicate = Predicate::all([compile_filters(request), scope]);

    tracing::debug!(
        table = %table.name,
        predicate = ?predicate,
        limit = ?request.pagination.limit,
        offset = request.pagination.offset,
        "Planned query"
    );

    Ok(QueryPlan {
        table: table.name.clone(),
        count: CountQuery {
            predicate: predicate.clone(),
        },
        page: SelectQuery {
            predicate,
            order_by,
            pagination: request.pagination,
        },
        relationships,
    })
}
