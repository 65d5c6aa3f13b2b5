//! Typed values used in predicates, plus the JSON row representation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::schema::LogicalType;

/// One result row: column name to JSON value, in schema column order.
pub type Row = serde_json::Map<String, Value>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A value coerced to a column's logical type.
#[derive(Debug, Clone)]
pub enum FilterValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl FilterValue {
    /// Coerce query-string text to `logical_type`.
    ///
    /// # Errors
    /// Returns a message naming the expected type when `raw` does not parse.
    pub fn parse(logical_type: LogicalType, raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        let parsed = match logical_type {
            LogicalType::Integer => trimmed.parse().ok().map(Self::Integer),
            LogicalType::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Self::Float),
            LogicalType::String => Some(Self::Text(raw.to_string())),
            LogicalType::Boolean => parse_bool(trimmed).map(Self::Boolean),
            LogicalType::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .ok()
                .map(Self::Date),
            LogicalType::DateTime => parse_datetime(trimmed).map(Self::DateTime),
            LogicalType::Uuid => Uuid::parse_str(trimmed).ok().map(Self::Uuid),
        };
        parsed.ok_or_else(|| format!("expected {}, got '{raw}'", logical_type.describe()))
    }

    /// Read a stored JSON value as `logical_type`. `None` for null or mismatched values.
    #[must_use]
    pub fn from_json(logical_type: LogicalType, value: &Value) -> Option<Self> {
        match (logical_type, value) {
            (_, Value::Null) => None,
            (LogicalType::Integer, Value::Number(n)) => n.as_i64().map(Self::Integer),
            (LogicalType::Float, Value::Number(n)) => n.as_f64().map(Self::Float),
            (LogicalType::Boolean, Value::Bool(b)) => Some(Self::Boolean(*b)),
            (LogicalType::Boolean, Value::Number(n)) => n.as_i64().map(|i| Self::Boolean(i != 0)),
            (LogicalType::String, Value::String(s)) => Some(Self::Text(s.clone())),
            (LogicalType::Date, Value::String(s)) => {
                NaiveDate::parse_from_str(s, DATE_FORMAT).ok().map(Self::Date)
            }
            (LogicalType::DateTime, Value::String(s)) => parse_datetime(s).map(Self::DateTime),
            (LogicalType::Uuid, Value::String(s)) => Uuid::parse_str(s).ok().map(Self::Uuid),
            _ => None,
        }
    }

    /// JSON form used in result rows.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
            Self::DateTime(dt) => Value::String(dt.format(DATETIME_FORMATS[0]).to_string()),
            Self::Uuid(u) => Value::String(u.to_string()),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for FilterValue {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for FilterValue {
    #[allow(clippy::cast_precision_loss)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Boolean(a), Self::Boolean(b)) => a.partial_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.partial_cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.partial_cmp(b),
            (Self::Uuid(a), Self::Uuid(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<FilterValue> for sea_orm::Value {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Integer(i) => i.into(),
            FilterValue::Float(f) => f.into(),
            FilterValue::Text(s) => s.into(),
            FilterValue::Boolean(b) => b.into(),
            FilterValue::Date(d) => d.into(),
            FilterValue::DateTime(dt) => dt.into(),
            FilterValue::Uuid(u) => u.into(),
        }
    }
}
