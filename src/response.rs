use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Row;

/// Key of the relationship object in every output row; no column may use it.
pub const RELATIONSHIP_KEY: &str = "relationship";

/// One output row: the table's columns plus a `relationship` object keyed by
/// relationship name. Only requested relationships have a key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(flatten)]
    pub columns: Row,
    #[serde(default)]
    pub relationship: BTreeMap<String, Vec<Row>>,
}

impl ResultRow {
    #[must_use]
    pub fn new(columns: Row) -> Self {
        Self {
            columns,
            relationship: BTreeMap::new(),
        }
    }

    /// Rows attached under `name`, if that relationship was requested.
    #[must_use]
    pub fn related(&self, name: &str) -> Option<&[Row]> {
        self.relationship.get(name).map(Vec::as_slice)
    }
}

/// `{"total": ..., "result": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    /// Rows matching the predicate, before `limit`/`offset`
    pub total: u64,
    pub result: Vec<ResultRow>,
}

impl ListResponse {
    #[must_use]
    pub fn assemble(total: u64, result: Vec<ResultRow>) -> Self {
        Self { total, result }
    }

    /// Rows in this page, as reported by the total-count header.
    #[must_use]
    pub fn returned(&self) -> usize {
        self.result.len()
    }
}
