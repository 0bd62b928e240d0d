//! Assertions for page verification.
//!
//! Components never panic on a failed check; they report through an
//! [`Asserter`], so a test can choose between aborting on the first failure
//! ([`StrictAsserter`]) or collecting failures ([`SoftAsserter`]).

mod retry;
mod soft;

pub use retry::{poll_until, RetryConfig, RetryOutcome};
pub use soft::{AssertionFailure, AssertionMode, SoftAsserter};

use std::fmt::Debug;

use crate::result::{PageError, PageResult};

/// Assertion collaborator used by verifications and table checks
pub trait Asserter: Debug {
    /// Assert a condition is true
    fn is_true(&self, condition: bool, message: &str) -> PageResult<()>;

    /// Report an unconditional failure
    fn fail(&self, message: &str) -> PageResult<()> {
        self.is_true(false, message)
    }
}

impl dyn Asserter + '_ {
    /// Assert a value is present, handing it back for further use.
    ///
    /// A soft asserter lets the `None` through after recording it.
    pub fn not_null<T>(&self, value: Option<T>, message: &str) -> PageResult<Option<T>> {
        self.is_true(value.is_some(), message)?;
        Ok(value)
    }
}

/// Asserter that turns every failure into [`PageError::AssertionFailed`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictAsserter;

impl Asserter for StrictAsserter {
    fn is_true(&self, condition: bool, message: &str) -> PageResult<()> {
        if condition {
            Ok(())
        } else {
            Err(PageError::AssertionFailed {
                message: message.to_string(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_asserter() {
        let asserter = StrictAsserter;
        assert!(asserter.is_true(true, "ok").is_ok());
        let err = asserter.fail("nope").unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: nope");
    }

    #[test]
    fn test_not_null_strict() {
        let asserter: &dyn Asserter = &StrictAsserter;
        assert_eq!(asserter.not_null(Some(3), "missing").unwrap(), Some(3));
        assert!(asserter.not_null(None::<u8>, "missing").is_err());
    }

    #[test]
    fn test_not_null_soft_passes_none_through() {
        let soft = SoftAsserter::new();
        let asserter: &dyn Asserter = &soft;
        assert_eq!(asserter.not_null(None::<u8>, "missing").unwrap(), None);
        assert_eq!(soft.failure_count(), 1);
    }
}
