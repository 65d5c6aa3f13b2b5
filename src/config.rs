//! Engine configuration.
//!
//! ```rust,ignore
//! let config = CrudConfig::default()
//!     .with_default_limit(50)
//!     .with_max_limit(500);
//! let engine = CrudEngine::new(registry, db)?.with_config(config);
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_TOTAL_COUNT_HEADER: &str = "x-total-count";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudConfig {
    /// Applied when the request has no `limit`. `None` means unbounded.
    pub default_limit: Option<u64>,
    /// Largest accepted `limit`. `None` means no cap.
    pub max_limit: Option<u64>,
    /// Response header mirroring the number of rows returned in `result`.
    pub total_count_header: String,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            default_limit: None,
            max_limit: None,
            total_count_header: DEFAULT_TOTAL_COUNT_HEADER.to_string(),
        }
    }
}

impl CrudConfig {
    #[must_use]
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_max_limit(mut self, limit: u64) -> Self {
        self.max_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_total_count_header(mut self, header: impl Into<String>) -> Self {
        self.total_count_header = header.into();
        self
    }
}
