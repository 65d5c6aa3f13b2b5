//! # Data Sources
//!
//! The engine reaches the data store only through [`RowSource`]: a count of
//! predicate matches and a row-returning select. Relationship expansion is just
//! another select whose predicate is `target_col IN (keys)`, so any layer that
//! can answer those two calls can back the engine.
//!
//! Implementations:
//! - Sea-ORM's `DatabaseConnection` (SQL built with `sea_query`)
//! - [`MemorySource`], in-process tables used for tests and benchmarks

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::planner::{CountQuery, SelectQuery};
use crate::schema::TableSchema;
use crate::value::Row;

pub mod database;
pub mod memory;

pub use database::{count_statement, select_statement};
pub use memory::MemorySource;

#[async_trait]
pub trait RowSource: Send + Sync {
    /// Number of rows in `table` matching the query's predicate.
    async fn count(&self, table: &TableSchema, query: &CountQuery) -> Result<u64, ApiError>;

    /// Rows of `table` matching the predicate, ordered and windowed as requested.
    /// Each row carries exactly the schema's columns, in schema order.
    async fn select(&self, table: &TableSchema, query: &SelectQuery) -> Result<Vec<Row>, ApiError>;
}
