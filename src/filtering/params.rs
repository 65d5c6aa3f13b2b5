//! Raw query-string parameter bag.

use crate::errors::ApiError;

/// Ordered list of decoded `key=value` pairs from one request.
///
/// Keys may repeat (`id____list=1&id____list=2`), so this is not a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string (without the `?`).
    #[must_use]
    pub fn parse(query: &str) -> Self {
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// Builder-style append, mostly for tests
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Every value supplied for `key`, in request order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// The value of a parameter that may appear at most once.
    ///
    /// # Errors
    /// Returns `ApiError::Decode` if `key` is repeated.
    pub fn single(&self, key: &str) -> Result<Option<&str>, ApiError> {
        match self.get_all(key).as_slice() {
            [] => Ok(None),
            [value] => Ok(Some(*value)),
            _ => Err(ApiError::decode(key, "expected a single value")),
        }
    }

    /// Values of a repeatable parameter, with comma-separated entries split out
    /// and blanks dropped.
    #[must_use]
    pub fn get_split(&self, key: &str) -> Vec<&str> {
        self.get_all(key)
            .into_iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect()
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<(String, String)>> for QueryParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}
