//! # quickcrud
//!
//! Query translation and relationship expansion for generated CRUD list endpoints.
//!
//! A flat query string such as
//!
//! ```text
//! GET /account?name____str=string&name____str_____matching_pattern=contains
//!             &order_by_columns=id:DESC&limit=10&relationship=blog_post
//! ```
//!
//! is decoded against an explicit [`TableSchema`], compiled into a predicate,
//! planned as a count query plus a page query, executed through a [`RowSource`]
//! and returned as
//!
//! ```json
//! {"total": 3, "result": [{"id": 2, "name": "string2", "relationship": {"blog_post": [...]}}]}
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quickcrud::{Column, CrudEngine, LogicalType, SchemaRegistry, TableSchema, crud_router};
//!
//! let registry = SchemaRegistry::new()
//!     .with_table(
//!         TableSchema::new("account")
//!             .with_column(Column::new("id", LogicalType::Integer))
//!             .with_column(Column::new("name", LogicalType::String))
//!             .with_primary_key(["id"]),
//!     )
//!     .with_table(
//!         TableSchema::new("blog_post")
//!             .with_column(Column::new("id", LogicalType::Integer))
//!             .with_column(Column::new("account_id", LogicalType::Integer))
//!             .with_primary_key(["id"]),
//!     )
//!     .link("account", "id", "blog_post", "account_id");
//!
//! let db = sea_orm::Database::connect("sqlite::memory:").await?;
//! let app = crud_router(CrudEngine::new(registry, db)?);
//! ```

pub mod config;
pub mod core;
pub mod errors;
pub mod filtering;
pub mod planner;
pub mod resolver;
pub mod response;
pub mod routes;
pub mod schema;
pub mod source;
pub mod value;

pub use config::CrudConfig;
pub use crate::core::CrudEngine;
pub use errors::ApiError;
pub use filtering::{Predicate, QueryParams};
pub use response::{ListResponse, ResultRow};
pub use routes::crud_router;
pub use schema::{Column, LogicalType, Relationship, SchemaRegistry, TableSchema};
pub use source::{MemorySource, RowSource};
pub use value::{FilterValue, Row};
