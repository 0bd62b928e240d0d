//! Pagewright: typed page objects for browser UI tests
//!
//! A page object is a tree of controls (buttons, inputs, headings, tables)
//! resolved lazily through a [`Driver`]. Cross-cutting behaviors such as
//! clicking a parent menu, pressing keys after input, taking screenshots or
//! verifying headings are attached as triggers and run at lifecycle events.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  PageObject ── Component tree ── Control (Button, Table<R>, …)  │
//! │        │              │                    │                    │
//! │        │        trigger::fire        ScopeLocator (fixed/lazy)  │
//! │        │              │                    │                    │
//! │   Session: Driver · Logger · Asserter · PageConfig              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use std::time::Duration;
//! use pagewright::prelude::*;
//!
//! let driver = Rc::new(MockDriver::with_document([MockElement::table(
//!     &["Name", "Role"],
//!     &[["Alice", "Engineer"], ["Bob", "Manager"]],
//! )]));
//! let soft = Rc::new(SoftAsserter::new());
//! let page = PageObject::builder("Staff", driver)
//!     .asserter(soft.clone())
//!     .config(PageConfig::default().with_retry_timeout(Duration::ZERO))
//!     .build()?;
//!
//! let employees: Table = page.control("Employees", By::tag("table")).build()?;
//! employees.verify_columns(&["Name", "Role"])?;
//! employees.row_exists("Alice", &[("Role", "Engineer")])?;
//! assert!(soft.all_passed());
//! # Ok::<(), pagewright::PageError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod assertion;
mod config;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod component;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod controls;
mod driver;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod locator;
mod log;
mod naming;
mod result;
mod selector;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn
)]
mod table;

/// In-memory DOM driver for tests and examples
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod mock;

/// Lifecycle triggers and their dispatcher
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod trigger;

pub use assertion::{
    poll_until, Asserter, AssertionFailure, AssertionMode, RetryConfig, RetryOutcome,
    SoftAsserter, StrictAsserter,
};
pub use component::{
    Component, Control, ControlBuilder, PageObject, PageObjectBuilder, Session, WeakComponent,
};
pub use config::{PageConfig, TableLayout};
pub use controls::{Button, Heading, HeadingLevel, Link, Text, TextInput};
pub use driver::{Driver, ElementHandle};
pub use locator::{
    find_all, find_one, ResolutionState, Resolver, ScopeLocator, SearchOptions,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};
pub use log::{init_tracing, LogEntry, LogFormat, Logger, RecordingLogger, TracingLogger};
pub use naming::{humanize, humanize_list, ordinalize, pluralize, singularize, title_case};
pub use result::{PageError, PageResult};
pub use selector::{
    normalize_space, row_element_name, xpath_literal, By, Condition, Selector, TermMatch,
};
pub use table::{Table, TableRow, TableSettings};
pub use trigger::{
    ClickParent, PressKeys, Screenshot, Trigger, TriggerContext, TriggerDeclaration,
    TriggerEvents, TriggerPriority, TriggerScope, VerifyHeading,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::mock::{DriverAction, MockDriver, MockElement};
    pub use super::{
        Asserter, Button, By, ClickParent, Component, Condition, Control, Driver, ElementHandle,
        Heading, HeadingLevel, Link, Logger, PageConfig, PageError, PageObject, PageResult,
        PressKeys, RecordingLogger, ResolutionState, Screenshot, SearchOptions, Selector,
        SoftAsserter, StrictAsserter, Table, TableRow, TableSettings, TermMatch, Text, TextInput,
        TracingLogger, Trigger, TriggerContext, TriggerDeclaration, TriggerEvents,
        TriggerPriority, TriggerScope, VerifyHeading,
    };
}
