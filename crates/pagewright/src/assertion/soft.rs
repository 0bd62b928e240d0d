//! Soft assertions
//!
//! Records verification failures and lets the page keep going.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};

use super::Asserter;
use crate::result::{PageError, PageResult};

/// A single assertion failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Message describing the failure
    pub message: String,
    /// Index of this assertion in the sequence
    pub index: usize,
}

impl AssertionFailure {
    /// Create a new assertion failure
    #[must_use]
    pub fn new(message: impl Into<String>, index: usize) -> Self {
        Self {
            message: message.into(),
            index,
        }
    }
}

/// How a soft asserter reacts to a failed check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssertionMode {
    /// Keep recording after a failure (default)
    #[default]
    Collect,
    /// Return an error on the first failure
    FailFast,
}

/// Asserter that records failures instead of aborting the action.
///
/// ```ignore
/// let soft = Rc::new(SoftAsserter::new());
/// let page = PageObject::builder("Staff", driver).asserter(soft.clone()).build()?;
/// table.row_exists("Alice", &[("Role", "Manager")])?;
/// assert_eq!(soft.failure_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SoftAsserter {
    failures: RefCell<Vec<AssertionFailure>>,
    mode: AssertionMode,
    assertion_count: Cell<usize>,
}

impl SoftAsserter {
    /// Create a new soft asserter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asserter using the given mode
    #[must_use]
    pub fn with_mode(mode: AssertionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Recorded failures, in order
    #[must_use]
    pub fn failures(&self) -> Vec<AssertionFailure> {
        self.failures.borrow().clone()
    }

    /// Number of failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.borrow().len()
    }

    /// Number of assertions evaluated
    #[must_use]
    pub fn assertion_count(&self) -> usize {
        self.assertion_count.get()
    }

    /// Whether every assertion so far passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.borrow().is_empty()
    }

    /// Forget all recorded failures
    pub fn clear(&self) {
        self.failures.borrow_mut().clear();
        self.assertion_count.set(0);
    }

    /// Turn collected failures into a single error
    pub fn verify(&self) -> PageResult<()> {
        let failures = self.failures.borrow();
        if failures.is_empty() {
            return Ok(());
        }
        let message = failures
            .iter()
            .map(|f| format!("[{}] {}", f.index, f.message))
            .collect::<Vec<_>>()
            .join("\n");
        Err(PageError::AssertionFailed {
            message: format!("{} soft assertion(s) failed:\n{message}", failures.len()),
        })
    }
}

impl Asserter for SoftAsserter {
    fn is_true(&self, condition: bool, message: &str) -> PageResult<()> {
        let index = self.assertion_count.get();
        self.assertion_count.set(index + 1);
        if condition {
            return Ok(());
        }
        tracing::warn!(index, message, "soft assertion failed");
        self.failures
            .borrow_mut()
            .push(AssertionFailure::new(message, index));
        match self.mode {
            AssertionMode::Collect => Ok(()),
            AssertionMode::FailFast => Err(PageError::AssertionFailed {
                message: message.to_string(),
            }),
        }
    }
}
