//! Result and error types for pagewright.

use thiserror::Error;

/// Result type for pagewright operations
pub type PageResult<T> = Result<T, PageError>;

/// Errors that can occur while driving page objects
#[derive(Debug, Error)]
pub enum PageError {
    /// A required element did not resolve
    #[error("Unable to locate {kind}: '{name}'")]
    NotFound {
        /// Logical element kind (e.g. "table row")
        kind: String,
        /// Logical element name or lookup description
        name: String,
    },

    /// More than one element matched where exactly one was required
    #[error("Expected a single {kind} matching '{name}', found {count}")]
    Ambiguous {
        /// Logical element kind
        kind: String,
        /// Logical element name or lookup description
        name: String,
        /// Number of elements that matched
        count: usize,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Driver-level failure (stale element, unsupported selector, ...)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// A parent or owner back-reference outlived its target
    #[error("Component '{name}' is detached from its page object")]
    Detached {
        /// Name of the component whose link was dropped
        name: String,
    },

    /// Configuration parse error
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PageError {
    /// Create a not-found error for the given kind and name
    #[must_use]
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Whether this error reports a missing element
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error reports an ambiguous match
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous { .. })
    }

    /// Whether this error came from an assertion
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}
