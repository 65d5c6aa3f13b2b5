//! Parameter Decoder: query-string bag to [`FilterRequest`].
//!
//! For a column `C` the recognised keys are:
//!
//! | key | meaning |
//! |-----|---------|
//! | `C____from`, `C____to` | range bounds |
//! | `C____from_____comparison_operator`, `C____to_____comparison_operator` | bound operators |
//! | `C____list`, `C____list_____comparison_operator` | list membership |
//! | `C____str`, `C____str_____matching_pattern` | string match |
//!
//! plus the global `limit`, `offset`, `order_by_columns` and `relationship`.
//! Keys that match none of these are ignored.

use super::operators::{ListOperator, MatchMode, RangeOperator};
use super::params::QueryParams;
use super::pagination::parse_pagination;
use super::request::{ColumnFilter, FilterRequest, ListFilter, RangeBound, RangeFilter, StringFilter};
use super::sort::parse_order_by;
use crate::config::CrudConfig;
use crate::errors::ApiError;
use crate::schema::{Column, TableSchema};
use crate::value::FilterValue;

pub const FROM_SUFFIX: &str = "____from";
pub const TO_SUFFIX: &str = "____to";
pub const FROM_OPERATOR_SUFFIX: &str = "____from_____comparison_operator";
pub const TO_OPERATOR_SUFFIX: &str = "____to_____comparison_operator";
pub const LIST_SUFFIX: &str = "____list";
pub const LIST_OPERATOR_SUFFIX: &str = "____list_____comparison_operator";
pub const STR_SUFFIX: &str = "____str";
pub const STR_MODE_SUFFIX: &str = "____str_____matching_pattern";

pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";
pub const ORDER_BY_PARAM: &str = "order_by_columns";
pub const RELATIONSHIP_PARAM: &str = "relationship";

const RANGE_SUFFIXES: [&str; 4] = [FROM_SUFFIX, TO_SUFFIX, FROM_OPERATOR_SUFFIX, TO_OPERATOR_SUFFIX];
const STR_SUFFIXES: [&str; 2] = [STR_SUFFIX, STR_MODE_SUFFIX];

fn key(column: &Column, suffix: &str) -> String {
    format!("{}{suffix}", column.name)
}

fn coerce(column: &Column, parameter: &str, raw: &str) -> Result<FilterValue, ApiError> {
    FilterValue::parse(column.logical_type, raw).map_err(|msg| ApiError::decode(parameter, msg))
}

/// Reject filter families the column type does not support, naming the first offending key.
fn check_supported(
    params: &QueryParams,
    column: &Column,
    suffixes: &[&str],
    supported: bool,
    family: &str,
) -> Result<(), ApiError> {
    if supported {
        return Ok(());
    }
    match suffixes
        .iter()
        .map(|suffix| key(column, suffix))
        .find(|k| params.contains(k))
    {
        Some(parameter) => Err(ApiError::decode(
            parameter,
            format!(
                "{family} filtering is not supported on column '{}'",
                column.name
            ),
        )),
        None => Ok(()),
    }
}

fn decode_bound(
    params: &QueryParams,
    column: &Column,
    value_suffix: &str,
    operator_suffix: &str,
    default: RangeOperator,
) -> Result<Option<RangeBound>, ApiError> {
    let operator_key = key(column, operator_suffix);
    let operator = match params.single(&operator_key)? {
        Some(literal) => RangeOperator::parse(literal).ok_or_else(|| {
            ApiError::decode(&operator_key, format!("unknown comparison operator '{literal}'"))
        })?,
        None => default,
    };

    let value_key = key(column, value_suffix);
    let Some(raw) = params.single(&value_key)? else {
        return Ok(None);
    };
    let value = coerce(column, &value_key, raw)?;
    Ok(Some(RangeBound { operator, value }))
}

fn decode_range(params: &QueryParams, column: &Column) -> Result<Option<RangeFilter>, ApiError> {
    check_supported(
        params,
        column,
        &RANGE_SUFFIXES,
        column.logical_type.supports_range(),
        "Range",
    )?;
    let range = RangeFilter {
        from: decode_bound(
            params,
            column,
            FROM_SUFFIX,
            FROM_OPERATOR_SUFFIX,
            RangeOperator::FROM_DEFAULT,
        )?,
        to: decode_bound(
            params,
            column,
            TO_SUFFIX,
            TO_OPERATOR_SUFFIX,
            RangeOperator::TO_DEFAULT,
        )?,
    };
    Ok((!range.is_open()).then_some(range))
}

fn decode_list(params: &QueryParams, column: &Column) -> Result<Option<ListFilter>, ApiError> {
    let operator_key = key(column, LIST_OPERATOR_SUFFIX);
    let operator = match params.single(&operator_key)? {
        Some(literal) => ListOperator::parse(literal).ok_or_else(|| {
            ApiError::decode(&operator_key, format!("unknown comparison operator '{literal}'"))
        })?,
        None => ListOperator::default(),
    };

    let list_key = key(column, LIST_SUFFIX);
    let raw_values = params.get_all(&list_key);
    if raw_values.is_empty() {
        return Ok(None);
    }
    if operator.is_scalar() && raw_values.len() > 1 {
        return Err(ApiError::decode(
            &list_key,
            format!("'{}' compares against a single value", operator.literal()),
        ));
    }
    let values = raw_values
        .into_iter()
        .map(|raw| coerce(column, &list_key, raw))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(ListFilter { operator, values }))
}

fn decode_string(params: &QueryParams, column: &Column) -> Result<Option<StringFilter>, ApiError> {
    check_supported(
        params,
        column,
        &STR_SUFFIXES,
        column.logical_type.supports_string_match(),
        "String",
    )?;
    let mode_key = key(column, STR_MODE_SUFFIX);
    let mode = match params.single(&mode_key)? {
        Some(literal) => MatchMode::parse(literal).ok_or_else(|| {
            ApiError::decode(&mode_key, format!("unknown matching pattern '{literal}'"))
        })?,
        None => MatchMode::default(),
    };

    let values: Vec<String> = params
        .get_all(&key(column, STR_SUFFIX))
        .into_iter()
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(StringFilter { mode, values }))
}

fn decode_column(params: &QueryParams, column: &Column) -> Result<Option<ColumnFilter>, ApiError> {
    let filter = ColumnFilter {
        column: column.name.clone(),
        range: decode_range(params, column)?,
        list: decode_list(params, column)?,
        string: decode_string(params, column)?,
    };
    Ok(filter.is_active().then_some(filter))
}

/// Decode one request's parameters against `table`.
///
/// Decoding is pure; sort columns and relationship names are only parsed here
/// and are checked against the schema by the planner.
///
/// # Errors
/// - `ApiError::Decode` for values that do not coerce to the column type,
///   unknown operator/mode literals, repeated single-valued keys, or filter
///   families the column type does not support.
/// - `ApiError::QueryPlan` for malformed `limit`, `offset` or sort entries.
pub fn decode_request(
    params: &QueryParams,
    table: &TableSchema,
    config: &CrudConfig,
) -> Result<FilterRequest, ApiError> {
    let mut columns = Vec::new();
    for column in &table.columns {
        if let Some(filter) = decode_column(params, column)? {
            columns.push(filter);
        }
    }

    let pagination = parse_pagination(
        params.single(LIMIT_PARAM)?,
        params.single(OFFSET_PARAM)?,
        config,
    )?;
    let order_by = parse_order_by(&params.get_split(ORDER_BY_PARAM))?;

    let mut relationships: Vec<String> = Vec::new();
    for name in params.get_split(RELATIONSHIP_PARAM) {
        if !relationships.iter().any(|existing| existing == name) {
            relationships.push(name.to_string());
        }
    }

    tracing::debug!(
        table = %table.name,
        filtered_columns = columns.len(),
        sort_keys = order_by.len(),
        relationships = ?relationships,
        "Decoded filter request"
    );

    Ok(FilterRequest {
        columns,
        pagination,
        order_by,
        relationships,
    })
}
