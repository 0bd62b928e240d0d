//! Page object configuration.
//!
//! Everything has a default; a YAML document may override any subset:
//!
//! ```yaml
//! retry_timeout_ms: 2000
//! poll_interval_ms: 25
//! table:
//!   row_tag: tr
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::assertion::RetryConfig;
use crate::locator::{SearchOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use crate::result::PageResult;

/// Tag names a table is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    /// Header cell tag
    pub header_tag: String,
    /// Row tag
    pub row_tag: String,
    /// Data cell tag
    pub cell_tag: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            header_tag: "th".to_string(),
            row_tag: "tr".to_string(),
            cell_tag: "td".to_string(),
        }
    }
}

/// Session-wide settings shared by every component of a page object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Default retry timeout for element resolution (ms)
    pub retry_timeout_ms: u64,
    /// Polling interval while retrying (ms)
    pub poll_interval_ms: u64,
    /// Require exactly one element for single-element lookups
    pub strict: bool,
    /// Default table layout
    pub table: TableLayout,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            retry_timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            strict: true,
            table: TableLayout::default(),
        }
    }
}

impl PageConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> PageResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Set the retry timeout
    #[must_use]
    pub const fn with_retry_timeout(mut self, timeout: Duration) -> Self {
        self.retry_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set strict single-element matching
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the table layout
    #[must_use]
    pub fn with_table_layout(mut self, layout: TableLayout) -> Self {
        self.table = layout;
        self
    }

    /// Retry timeout as Duration
    #[must_use]
    pub const fn retry_timeout(&self) -> Duration {
        Duration::from_millis(self.retry_timeout_ms)
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Retry settings for polling verifications
    #[must_use]
    pub const fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.retry_timeout()).with_poll_interval(self.poll_interval())
    }

    /// Search options used when a caller does not specify any
    #[must_use]
    pub const fn search_options(&self) -> SearchOptions {
        SearchOptions {
            safely: false,
            timeout: self.retry_timeout(),
            poll_interval: self.poll_interval(),
            strict: self.strict,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PageConfig::default();
        assert_eq!(config.retry_timeout(), Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert!(config.strict);
        assert_eq!(config.table.row_tag, "tr");
    }

    #[test]
    fn test_builder() {
        let config = PageConfig::new()
            .with_retry_timeout(Duration::ZERO)
            .with_strict(false);
        let options = config.search_options();
        assert_eq!(options.timeout, Duration::ZERO);
        assert!(!options.strict);
        assert!(!options.safely);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = PageConfig::from_yaml_str("retry_timeout_ms: 250\ntable:\n  cell_tag: div\n")
            .unwrap();
        assert_eq!(config.retry_timeout_ms, 250);
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.table.cell_tag, "div");
        assert_eq!(config.table.header_tag, "th");
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = PageConfig::from_yaml_str("retry_timeout_ms: [").unwrap_err();
        assert!(matches!(err, crate::result::PageError::Config(_)));
    }
}
