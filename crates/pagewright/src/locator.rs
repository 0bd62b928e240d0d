//! Locator abstraction for element resolution.
//!
//! # Resolution modes
//!
//! - **Immediate**: one attempt, fail with `NotFound` if nothing matches
//! - **Safe**: return `None` instead of failing when nothing matches
//! - **With retry**: poll the driver until the timeout before giving up
//!
//! Safe and retry combine freely. Strict lookups reject multiple matches with
//! `Ambiguous`; non-strict lookups take the first match in document order.
//!
//! A [`ScopeLocator`] is either fixed to an element that was already resolved,
//! or dynamic: a resolver evaluated on every access, so a component never
//! holds on to an element across page changes.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::assertion::{poll_until, RetryConfig};
use crate::driver::{Driver, ElementHandle};
use crate::result::{PageError, PageResult};
use crate::selector::By;

/// Default timeout for with-retry resolution (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for with-retry resolution (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for a single resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Return `None` instead of failing when absent
    pub safely: bool,
    /// How long to keep polling (zero = immediate)
    pub timeout: Duration,
    /// Interval between polls
    pub poll_interval: Duration,
    /// Reject multiple matches
    pub strict: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            safely: false,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            strict: true,
        }
    }
}

impl SearchOptions {
    /// Single attempt, failing when absent
    #[must_use]
    pub fn immediately() -> Self {
        Self::default().with_timeout(Duration::ZERO)
    }

    /// Default retry, yielding `None` when absent
    #[must_use]
    pub fn safely() -> Self {
        Self::default().and_safely()
    }

    /// Retry for up to `timeout`
    #[must_use]
    pub fn with_retry(timeout: Duration) -> Self {
        Self::default().with_timeout(timeout)
    }

    /// Also yield `None` instead of failing
    #[must_use]
    pub const fn and_safely(mut self) -> Self {
        self.safely = true;
        self
    }

    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set strict matching
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether this resolution polls
    #[must_use]
    pub fn is_retrying(&self) -> bool {
        !self.timeout.is_zero()
    }

    /// Polling settings for this resolution
    #[must_use]
    pub const fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.timeout).with_poll_interval(self.poll_interval)
    }
}

/// Outcome of resolving a locator, as a state machine:
/// `Unresolved -> Located | Missing | Ambiguous | Failed`.
///
/// Handles start `Unresolved`; the transition happens only on access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResolutionState {
    /// Not accessed yet
    #[default]
    Unresolved,
    /// Exactly one element found
    Located(ElementHandle),
    /// Safe resolution found nothing
    Missing,
    /// More than one element where one was required
    Ambiguous(usize),
    /// Immediate resolution found nothing
    Failed,
}

impl ResolutionState {
    /// Map a resolution result onto the state machine.
    ///
    /// Errors other than not-found and ambiguous are handed back.
    pub fn from_result(result: PageResult<Option<ElementHandle>>) -> PageResult<Self> {
        match result {
            Ok(Some(element)) => Ok(Self::Located(element)),
            Ok(None) => Ok(Self::Missing),
            Err(PageError::Ambiguous { count, .. }) => Ok(Self::Ambiguous(count)),
            Err(PageError::NotFound { .. }) => Ok(Self::Failed),
            Err(other) => Err(other),
        }
    }

    /// The located element, if any
    #[must_use]
    pub const fn element(&self) -> Option<&ElementHandle> {
        match self {
            Self::Located(element) => Some(element),
            _ => None,
        }
    }
}

/// Resolver evaluated on every access of a dynamic locator
pub type Resolver = Rc<dyn Fn(&SearchOptions) -> PageResult<Option<ElementHandle>>>;

/// Where a component's element comes from
#[derive(Clone)]
pub enum ScopeLocator {
    /// The page itself; children search the whole document
    Document,
    /// An element resolved earlier
    Fixed(ElementHandle),
    /// A resolver run lazily on each access
    Dynamic(Resolver),
}

impl fmt::Debug for ScopeLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => f.write_str("Document"),
            Self::Fixed(element) => f.debug_tuple("Fixed").field(element).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl ScopeLocator {
    /// Locator bound to an already-resolved element
    #[must_use]
    pub const fn fixed(element: ElementHandle) -> Self {
        Self::Fixed(element)
    }

    /// Locator resolved lazily by `resolver`
    #[must_use]
    pub fn dynamic<F>(resolver: F) -> Self
    where
        F: Fn(&SearchOptions) -> PageResult<Option<ElementHandle>> + 'static,
    {
        Self::Dynamic(Rc::new(resolver))
    }

    /// Locator that never resolves: `None` when safe, `NotFound` otherwise.
    ///
    /// The failure is deferred to access time so safe callers can check
    /// existence without a pre-flight lookup.
    #[must_use]
    pub fn missing(kind: impl Into<String>, name: impl Into<String>) -> Self {
        let kind = kind.into();
        let name = name.into();
        Self::dynamic(move |options| {
            if options.safely {
                Ok(None)
            } else {
                Err(PageError::not_found(kind.clone(), name.clone()))
            }
        })
    }

    /// Resolve to a single element
    pub fn get_element(&self, options: &SearchOptions) -> PageResult<Option<ElementHandle>> {
        match self {
            Self::Document => Ok(None),
            Self::Fixed(element) => Ok(Some(element.clone())),
            Self::Dynamic(resolver) => resolver(options),
        }
    }

    /// Resolve to every element this locator represents
    pub fn get_elements(&self, options: &SearchOptions) -> PageResult<Vec<ElementHandle>> {
        Ok(self.get_element(options)?.into_iter().collect())
    }

    /// Whether this locator stands for the whole document
    #[must_use]
    pub const fn is_document(&self) -> bool {
        matches!(self, Self::Document)
    }
}

/// Find every element matching `by` under `within`.
///
/// With a non-zero timeout, polls until at least one element appears;
/// an empty result after the timeout is not an error.
pub fn find_all(
    driver: &dyn Driver,
    within: Option<&ElementHandle>,
    by: &By,
    options: &SearchOptions,
) -> PageResult<Vec<ElementHandle>> {
    let options = by.options_over(options);
    let outcome = poll_until(&options.retry_config(), || {
        let elements = driver.find_elements(within, by.selector())?;
        Ok((!elements.is_empty()).then_some(elements))
    })?;
    Ok(outcome.value.unwrap_or_default())
}

/// Find the single element matching `by` under `within`.
pub fn find_one(
    driver: &dyn Driver,
    within: Option<&ElementHandle>,
    by: &By,
    options: &SearchOptions,
) -> PageResult<Option<ElementHandle>> {
    let options = by.options_over(options);
    let mut elements = find_all(driver, within, by, &options)?;
    match elements.len() {
        0 if options.safely => Ok(None),
        0 => Err(PageError::not_found(by.kind_name(), by.name())),
        1 => Ok(elements.pop()),
        count if options.strict => Err(PageError::Ambiguous {
            kind: by.kind_name(),
            name: by.name(),
            count,
        }),
        _ => Ok(Some(elements.swap_remove(0))),
    }
}
