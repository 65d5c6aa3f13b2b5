//! # Filtering, Sorting & Pagination
//!
//! Translation of a flat query string into a [`FilterRequest`] and then into a
//! composable [`Predicate`].
//!
//! ## Query Parameter Examples
//!
//! ### Per-column filters
//! ```rust,ignore
//! // Range, inclusive by default
//! GET /account?id____from=1&id____to=10
//!
//! // Range with explicit operators
//! GET /account?id____from=1&id____from_____comparison_operator=Greater_than
//!
//! // List membership (In, Not_in, Equal, Not_equal)
//! GET /blog_post?account_id____list=1&account_id____list=2
//! GET /blog_post?account_id____list=1&account_id____list_____comparison_operator=Not_in
//!
//! // String matching (case_sensitive, case_insensitive, contains)
//! GET /account?name____str=string&name____str_____matching_pattern=contains
//! ```
//!
//! ### Global parameters
//! ```rust,ignore
//! GET /account?limit=10&offset=20
//! GET /account?order_by_columns=name:DESC&order_by_columns=id
//! GET /account?relationship=blog_post
//! ```
//!
//! Column filters combine with AND, both across columns and within one column.
//! The only alternatives are repeated `____str` values.

pub mod conditions;
pub mod decode;
pub mod operators;
pub mod pagination;
pub mod params;
pub mod request;
pub mod sort;

pub use conditions::{Predicate, compile_filters};
pub use decode::decode_request;
pub use operators::{ListOperator, MatchMode, RangeOperator};
pub use pagination::{Pagination, parse_pagination, total_count_headers};
pub use params::QueryParams;
pub use request::{ColumnFilter, FilterRequest, ListFilter, RangeBound, RangeFilter, StringFilter};
pub use sort::{SortDirection, SortKey, parse_order_by, parse_sort_entry, resolve_sort_keys};
