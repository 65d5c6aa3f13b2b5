use sea_orm::sea_query::Order;

use crate::errors::ApiError;
use crate::schema::TableSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// One `order_by_columns` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Parse `column`, `column:ASC` or `column:DESC`. The direction literal is case-sensitive.
///
/// # Errors
/// Returns `ApiError::QueryPlan` for an empty column or an unknown direction.
pub fn parse_sort_entry(entry: &str) -> Result<SortKey, ApiError> {
    let (column, direction) = match entry.rsplit_once(':') {
        Some((column, "ASC")) => (column, SortDirection::Asc),
        Some((column, "DESC")) => (column, SortDirection::Desc),
        Some((_, other)) => {
            return Err(ApiError::query_plan(format!(
                "Invalid sort direction '{other}' in '{entry}', expected ASC or DESC"
            )));
        }
        None => (entry, SortDirection::Asc),
    };

    let column = column.trim();
    if column.is_empty() {
        return Err(ApiError::query_plan(format!(
            "Missing column name in sort entry '{entry}'"
        )));
    }

    Ok(SortKey {
        column: column.to_string(),
        direction,
    })
}

/// Parse every entry, rejecting a column that is listed twice.
///
/// # Errors
/// Returns `ApiError::QueryPlan` for malformed or duplicated entries.
pub fn parse_order_by(entries: &[&str]) -> Result<Vec<SortKey>, ApiError> {
    let mut keys: Vec<SortKey> = Vec::with_capacity(entries.len());
    for entry in entries {
        let key = parse_sort_entry(entry)?;
        if keys.iter().any(|existing| existing.column == key.column) {
            return Err(ApiError::query_plan(format!(
                "Sort column '{}' is listed more than once",
                key.column
            )));
        }
        keys.push(key);
    }
    Ok(keys)
}

/// Check every sort column against the table, then append the primary-key
/// columns not already present as an ascending tiebreak.
///
/// No keys means physical order, so nothing is appended in that case.
///
/// # Errors
/// Returns `ApiError::QueryPlan` naming the first unknown column.
pub fn resolve_sort_keys(table: &TableSchema, keys: &[SortKey]) -> Result<Vec<SortKey>, ApiError> {
    if let Some(unknown) = keys.iter().find(|key| table.column(&key.column).is_none()) {
        return Err(ApiError::query_plan(format!(
            "Unknown sort column '{}' for '{}'",
            unknown.column, table.name
        )));
    }

    let mut resolved = keys.to_vec();
    if !resolved.is_empty() {
        for pk in &table.primary_key {
            if !resolved.iter().any(|key| &key.column == pk) {
                resolved.push(SortKey::asc(pk));
            }
        }
    }
    Ok(resolved)
}
