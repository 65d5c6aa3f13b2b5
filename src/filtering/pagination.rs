use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::CrudConfig;
use crate::errors::ApiError;

/// `limit`/`offset` window. `limit: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: u64,
}

impl Pagination {
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            limit: None,
            offset: 0,
        }
    }

    #[must_use]
    pub const fn new(limit: Option<u64>, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// `limit=0`: the page query is skipped entirely.
    #[must_use]
    pub const fn is_empty_page(&self) -> bool {
        matches!(self.limit, Some(0))
    }

    /// Apply the window to an already ordered sequence.
    pub fn window<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = self
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        items.into_iter().skip(offset).take(limit).collect()
    }
}

fn parse_non_negative(name: &str, raw: &str) -> Result<u64, ApiError> {
    raw.trim().parse::<u64>().map_err(|_| {
        ApiError::query_plan(format!(
            "'{name}' must be a non-negative integer, got '{raw}'"
        ))
    })
}

/// Decode `limit` and `offset`, applying the configured default and cap.
///
/// # Errors
/// Returns `ApiError::QueryPlan` for values that are not non-negative integers
/// or a `limit` above `max_limit`.
pub fn parse_pagination(
    limit: Option<&str>,
    offset: Option<&str>,
    config: &CrudConfig,
) -> Result<Pagination, ApiError> {
    let limit = match limit {
        Some(raw) => {
            let limit = parse_non_negative("limit", raw)?;
            if let Some(max) = config.max_limit
                && limit > max
            {
                return Err(ApiError::query_plan(format!(
                    "'limit' must not exceed {max}, got {limit}"
                )));
            }
            Some(limit)
        }
        None => match (config.default_limit, config.max_limit) {
            (Some(default), Some(max)) => Some(default.min(max)),
            (default, max) => default.or(max),
        },
    };
    let offset = offset
        .map(|raw| parse_non_negative("offset", raw))
        .transpose()?
        .unwrap_or(0);

    Ok(Pagination { limit, offset })
}

/// Build the header that mirrors how many rows this page returned.
///
/// # Errors
/// Returns `ApiError::Internal` if the configured header name is not a valid HTTP header.
pub fn total_count_headers(header: &str, returned: usize) -> Result<HeaderMap, ApiError> {
    let name = HeaderName::from_bytes(header.as_bytes()).map_err(|e| {
        ApiError::internal("Invalid response header configuration", Some(e.to_string()))
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(name, HeaderValue::from(returned));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_means_unbounded_from_zero() {
        let page = parse_pagination(None, None, &CrudConfig::default()).unwrap();
        assert_eq!(page, Pagination::unbounded());
    }

    #[test]
    fn test_limit_zero_is_empty_page() {
        let page = parse_pagination(Some("0"), Some("5"), &CrudConfig::default()).unwrap();
        assert!(page.is_empty_page());
        assert_eq!(page.offset, 5);
    }

    #[test]
    fn test_invalid_values_are_plan_errors() {
        for (limit, offset) in [(Some("-1"), None), (Some("ten"), None), (None, Some("1.5"))] {
            let err = parse_pagination(limit, offset, &CrudConfig::default()).unwrap_err();
            assert!(matches!(err, ApiError::QueryPlan { .. }), "{limit:?} {offset:?}");
        }
    }

    #[test]
    fn test_config_default_and_cap() {
        let config = CrudConfig::default().with_default_limit(50).with_max_limit(20);
        assert_eq!(parse_pagination(None, None, &config).unwrap().limit, Some(20));
        assert_eq!(parse_pagination(Some("10"), None, &config).unwrap().limit, Some(10));
        assert!(parse_pagination(Some("21"), None, &config).is_err());
    }

    #[test]
    fn test_window_tiles() {
        let items: Vec<u32> = (0..7).collect();
        let mut tiled = Vec::new();
        for offset in (0..9).step_by(3) {
            tiled.extend(Pagination::new(Some(3), offset).window(items.iter().copied()));
        }
        assert_eq!(tiled, items);
        assert!(Pagination::new(Some(3), 100).window(items.iter()).is_empty());
        assert!(Pagination::new(Some(0), 0).window(items.iter()).is_empty());
    }

    #[test]
    fn test_total_count_header() {
        let headers = total_count_headers("x-total-count", 2).unwrap();
        assert_eq!(headers.get("x-total-count").unwrap(), "2");
        assert!(total_count_headers("bad header", 2).is_err());
    }
}
