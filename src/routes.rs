//! Axum glue over [`CrudEngine`].
//!
//! ```rust,ignore
//! let engine = CrudEngine::new(registry, db)?;
//! let app = Router::new().nest("/api", crud_router(engine));
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::HeaderMap,
    routing::get,
};

use crate::core::CrudEngine;
use crate::errors::ApiError;
use crate::filtering::{QueryParams, total_count_headers};
use crate::response::{ListResponse, ResultRow};

fn query_params(raw: Option<String>) -> QueryParams {
    raw.as_deref().map(QueryParams::parse).unwrap_or_default()
}

fn with_count_header(
    engine: &CrudEngine,
    response: ListResponse,
) -> Result<(HeaderMap, Json<ListResponse>), ApiError> {
    let headers = total_count_headers(&engine.config().total_count_header, response.returned())?;
    Ok((headers, Json(response)))
}

pub async fn list_handler(
    State(engine): State<Arc<CrudEngine>>,
    Path(table): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<(HeaderMap, Json<ListResponse>), ApiError> {
    let response = engine.list(&table, &query_params(query)).await?;
    with_count_header(&engine, response)
}

pub async fn get_one_handler(
    State(engine): State<Arc<CrudEngine>>,
    Path((table, id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Result<Json<ResultRow>, ApiError> {
    let row = engine.get_one(&table, &id, &query_params(query)).await?;
    Ok(Json(row))
}

pub async fn nested_list_handler(
    State(engine): State<Arc<CrudEngine>>,
    Path((parent, id, child)): Path<(String, String, String)>,
    RawQuery(query): RawQuery,
) -> Result<(HeaderMap, Json<ListResponse>), ApiError> {
    let response = engine
        .list_nested(&parent, &id, &child, &query_params(query))
        .await?;
    with_count_header(&engine, response)
}

/// `GET /{table}`, `GET /{table}/{id}` and `GET /{table}/{id}/{child}` for every
/// registered table.
pub fn crud_router(engine: CrudEngine) -> Router {
    Router::new()
        .route("/{table}", get(list_handler))
        .route("/{table}/{id}", get(get_one_handler))
        .route("/{table}/{id}/{child}", get(nested_list_handler))
        .with_state(Arc::new(engine))
}
