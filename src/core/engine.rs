use std::sync::Arc;

use futures_util::future::try_join;

use crate::config::CrudConfig;
use crate::errors::ApiError;
use crate::filtering::{FilterRequest, Pagination, Predicate, QueryParams, decode_request};
use crate::planner::{QueryPlan, SelectQuery, plan_query};
use crate::resolver::expand_relationships;
use crate::response::{ListResponse, ResultRow};
use crate::schema::{Column, SchemaRegistry, TableSchema};
use crate::source::RowSource;
use crate::value::FilterValue;

/// Answers list, single-row and nested requests for every table in a registry.
///
/// All state is read-only; each call builds its request, plan and response
/// from scratch, so one engine can serve any number of concurrent requests.
#[derive(Clone)]
pub struct CrudEngine {
    registry: Arc<SchemaRegistry>,
    source: Arc<dyn RowSource>,
    config: CrudConfig,
}

impl std::fmt::Debug for CrudEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudEngine")
            .field("tables", &self.registry.tables().map(|t| &t.name).collect::<Vec<_>>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CrudEngine {
    /// # Errors
    /// Returns `ApiError::Internal` if the registry fails [`SchemaRegistry::validate`].
    pub fn new(registry: SchemaRegistry, source: impl RowSource + 'static) -> Result<Self, ApiError> {
        registry.validate()?;
        Ok(Self {
            registry: Arc::new(registry),
            source: Arc::new(source),
            config: CrudConfig::default(),
        })
    }

    #[must_use]
    pub fn with_config(mut self, config: CrudConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &CrudConfig {
        &self.config
    }

    /// `GET /{table}`: filtered, sorted, paginated rows with the pre-pagination total.
    ///
    /// # Errors
    /// - `ApiError::NotFound` for an unregistered table.
    /// - `ApiError::Decode`, `ApiError::QueryPlan` or `ApiError::Relationship` for
    ///   bad parameters, before any data-store call.
    /// - `ApiError::Database` if the data store fails.
    pub async fn list(&self, table: &str, params: &QueryParams) -> Result<ListResponse, ApiError> {
        let table = self.registry.require(table)?;
        self.list_scoped(table, params, Predicate::True).await
    }

    /// List `table` with `scope` ANDed onto the query-string filters.
    ///
    /// # Errors
    /// Same as [`list`](Self::list).
    pub async fn list_scoped(
        &self,
        table: &TableSchema,
        params: &QueryParams,
        scope: Predicate,
    ) -> Result<ListResponse, ApiError> {
        let request = decode_request(params, table, &self.config)?;
        let plan = plan_query(table, &self.registry, &request, scope)?;
        self.execute(table, &plan).await
    }

    async fn execute(&self, table: &TableSchema, plan: &QueryPlan) -> Result<ListResponse, ApiError> {
        let page = async {
            if plan.page.pagination.is_empty_page() {
                Ok(Vec::new())
            } else {
                self.source.select(table, &plan.page).await
            }
        };
        let (total, rows) = try_join(self.source.count(table, &plan.count), page).await?;

        let result = expand_relationships(
            self.source.as_ref(),
            &self.registry,
            table,
            rows,
            &plan.relationships,
        )
        .await?;

        tracing::debug!(
            table = %table.name,
            total,
            returned = result.len(),
            relationships = ?plan.relationships.iter().map(|r| &r.name).collect::<Vec<_>>(),
            "Listed rows"
        );
        Ok(ListResponse::assemble(total, result))
    }

    /// `GET /{table}/{id}`: one row by primary key, with the same filter and
    /// relationship parameters as a listing.
    ///
    /// # Errors
    /// - `ApiError::QueryPlan` if the table has a composite primary key.
    /// - `ApiError::Decode` if `id` does not parse as the key's type.
    /// - `ApiError::NotFound` if no row matches.
    pub async fn get_one(
        &self,
        table: &str,
        id: &str,
        params: &QueryParams,
    ) -> Result<ResultRow, ApiError> {
        let table = self.registry.require(table)?;
        let (key, value) = parse_primary_key(table, id)?;

        let mut request: FilterRequest = decode_request(params, table, &self.config)?;
        request.pagination = Pagination::unbounded();
        request.order_by.clear();

        let plan = plan_query(table, &self.registry, &request, Predicate::eq(&key.name, value))?;
        let query = SelectQuery {
            pagination: Pagination::new(Some(1), 0),
            ..plan.page
        };
        let rows = self.source.select(table, &query).await?;

        expand_relationships(
            self.source.as_ref(),
            &self.registry,
            table,
            rows,
            &plan.relationships,
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found(&table.name, Some(id.to_string())))
    }

    /// `GET /{parent}/{id}/{child}`: `child` rows linked to one `parent` row,
    /// filtered like a flat listing of `child`.
    ///
    /// # Errors
    /// - `ApiError::Relationship` if `child` declares no unique link to `parent`.
    /// - `ApiError::QueryPlan` if `parent` has a composite primary key.
    /// - Everything [`list`](Self::list) returns.
    pub async fn list_nested(
        &self,
        parent: &str,
        parent_id: &str,
        child: &str,
        params: &QueryParams,
    ) -> Result<ListResponse, ApiError> {
        let parent_table = self.registry.require(parent)?;
        let child_table = self.registry.require(child)?;
        let relationship = child_table
            .relationship_to(&parent_table.name)
            .ok_or_else(|| ApiError::relationship(&parent_table.name, &child_table.name))?;
        let (key, value) = parse_primary_key(parent_table, parent_id)?;

        let scope = if relationship.target_column == key.name {
            Predicate::eq(&relationship.local_column, value)
        } else {
            // Link goes through a non-key column: read it from the parent row
            let query = SelectQuery {
                predicate: Predicate::eq(&key.name, value),
                order_by: Vec::new(),
                pagination: Pagination::new(Some(1), 0),
            };
            let linked = self
                .source
                .select(parent_table, &query)
                .await?
                .into_iter()
                .next()
                .and_then(|row| {
                    let column = parent_table.column(&relationship.target_column)?;
                    FilterValue::from_json(column.logical_type, row.get(&column.name)?)
                });
            match linked {
                Some(linked) => Predicate::eq(&relationship.local_column, linked),
                None => Predicate::none(&relationship.local_column),
            }
        };

        tracing::debug!(
            parent = %parent_table.name,
            child = %child_table.name,
            scope = ?scope,
            "Nested listing"
        );
        self.list_scoped(child_table, params, scope).await
    }
}

fn parse_primary_key<'t>(table: &'t TableSchema, id: &str) -> Result<(&'t Column, FilterValue), ApiError> {
    let key = table.single_primary_key().ok_or_else(|| {
        ApiError::query_plan(format!(
            "'{}' has a composite primary key and cannot be addressed by a single ID",
            table.name
        ))
    })?;
    let value = FilterValue::parse(key.logical_type, id).map_err(|e| ApiError::decode(&key.name, e))?;
    Ok((key, value))
}
