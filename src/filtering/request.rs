//! Decoded Filter Request.

use super::operators::{ListOperator, MatchMode, RangeOperator};
use super::pagination::Pagination;
use super::sort::SortKey;
use crate::value::FilterValue;

#[derive(Debug, Clone, PartialEq)]
pub struct RangeBound {
    pub operator: RangeOperator,
    pub value: FilterValue,
}

/// `____from` / `____to`. Either side may be open.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangeFilter {
    pub from: Option<RangeBound>,
    pub to: Option<RangeBound>,
}

impl RangeFilter {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// `____list` with its operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    pub operator: ListOperator,
    pub values: Vec<FilterValue>,
}

/// `____str` values (alternatives) under one matching mode.
#[derive(Debug, Clone, PartialEq)]
pub struct StringFilter {
    pub mode: MatchMode,
    pub values: Vec<String>,
}

/// Every active constraint on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub range: Option<RangeFilter>,
    pub list: Option<ListFilter>,
    pub string: Option<StringFilter>,
}

impl ColumnFilter {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.range.as_ref().is_some_and(|range| !range.is_open())
            || self.list.is_some()
            || self.string.is_some()
    }
}

/// All per-column constraints plus pagination, ordering and requested
/// relationships for one incoming query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterRequest {
    /// Active column filters, in schema column order
    pub columns: Vec<ColumnFilter>,
    pub pagination: Pagination,
    /// Sort keys as requested, not yet checked against the schema
    pub order_by: Vec<SortKey>,
    /// Requested relationship names, de-duplicated, in request order
    pub relationships: Vec<String>,
}

impl FilterRequest {
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnFilter> {
        self.columns.iter().find(|filter| filter.column == name)
    }

    /// No column constraints at all.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.columns.is_empty()
    }
}
