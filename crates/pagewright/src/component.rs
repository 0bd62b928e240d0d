//! Component tree: page objects and the controls they contain.
//!
//! # Structure
//!
//! ```text
//! PageObject ("Staff")                 owner of every node below
//!   ├── Table "Employees"              declared control, owned by its parent
//!   │     └── TableRow (transient)     held by the caller only
//!   └── Button "Add"
//! ```
//!
//! Parents own their declared children; children point back to their parent
//! and owner through weak links used only for navigation. Transient
//! components (rows, cells, verification helpers) are not registered with
//! their parent and go away when the caller drops them.
//!
//! A component never caches its element. Every access resolves the locator
//! again, so components stay valid across page changes.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use crate::assertion::{poll_until, Asserter, StrictAsserter};
use crate::config::PageConfig;
use crate::driver::{Driver, ElementHandle};
use crate::locator::{self, ResolutionState, ScopeLocator, SearchOptions};
use crate::log::{Logger, TracingLogger};
use crate::naming::humanize_list;
use crate::result::{PageError, PageResult};
use crate::selector::{By, TermMatch};
use crate::trigger::{self, TriggerDeclaration, TriggerEvents};

/// Collaborators shared by every component of one page object
#[derive(Debug)]
pub struct Session {
    /// Browser driver
    pub driver: Rc<dyn Driver>,
    /// Logger
    pub log: Rc<dyn Logger>,
    /// Assertion collaborator
    pub asserter: Rc<dyn Asserter>,
    /// Settings
    pub config: PageConfig,
}

struct Node {
    name: String,
    kind: String,
    session: Rc<Session>,
    owner: Weak<Node>,
    parent: Option<Weak<Node>>,
    locator: ScopeLocator,
    triggers: Vec<TriggerDeclaration>,
    children: RefCell<Vec<Rc<Node>>>,
}

/// Handle to a node of the component tree
#[derive(Clone)]
pub struct Component {
    node: Rc<Node>,
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.node.name)
            .field("kind", &self.node.kind)
            .field("locator", &self.node.locator)
            .finish_non_exhaustive()
    }
}

impl Component {
    fn root(name: String, session: Rc<Session>, triggers: Vec<TriggerDeclaration>) -> Self {
        let node = Rc::new_cyclic(|me| Node {
            name,
            kind: "page".to_string(),
            session,
            owner: me.clone(),
            parent: None,
            locator: ScopeLocator::Document,
            triggers,
            children: RefCell::default(),
        });
        Self { node }
    }

    fn child(
        &self,
        name: String,
        kind: String,
        locator: ScopeLocator,
        triggers: Vec<TriggerDeclaration>,
    ) -> Self {
        Self {
            node: Rc::new(Node {
                name,
                kind,
                session: Rc::clone(&self.node.session),
                owner: self.node.owner.clone(),
                parent: Some(Rc::downgrade(&self.node)),
                locator,
                triggers,
                children: RefCell::default(),
            }),
        }
    }

    fn detached(&self) -> PageError {
        PageError::Detached {
            name: self.node.name.clone(),
        }
    }

    /// Non-owning handle to this component
    #[must_use]
    pub fn downgrade(&self) -> WeakComponent {
        WeakComponent {
            node: Rc::downgrade(&self.node),
            name: self.node.name.clone(),
        }
    }

    /// Human-readable name used in messages
    #[must_use]
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Kind used in messages ("button", "table", ...)
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.node.kind
    }

    /// "'Save' button"
    #[must_use]
    pub fn describe(&self) -> String {
        format!("'{}' {}", self.node.name, self.node.kind)
    }

    /// Whether this is the root of a page object
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.node.parent.is_none()
    }

    /// Root page object
    pub fn owner(&self) -> PageResult<Self> {
        self.node
            .owner
            .upgrade()
            .map(|node| Self { node })
            .ok_or_else(|| self.detached())
    }

    /// Parent component; `None` for a page or when the parent was dropped
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.node
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|node| Self { node })
    }

    /// Parent component, failing with `Detached` when there is none
    pub fn require_parent(&self) -> PageResult<Self> {
        self.parent().ok_or_else(|| self.detached())
    }

    /// Ancestors from the parent up to the page
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(component) = current {
            current = component.parent();
            ancestors.push(component);
        }
        ancestors
    }

    /// Declared children, in declaration order
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.node
            .children
            .borrow()
            .iter()
            .map(|node| Self {
                node: Rc::clone(node),
            })
            .collect()
    }

    /// Browser driver
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        &*self.node.session.driver
    }

    /// Shared handle to the browser driver
    #[must_use]
    pub fn driver_handle(&self) -> Rc<dyn Driver> {
        Rc::clone(&self.node.session.driver)
    }

    /// Logger
    #[must_use]
    pub fn log(&self) -> &dyn Logger {
        &*self.node.session.log
    }

    /// Shared handle to the logger
    #[must_use]
    pub fn log_handle(&self) -> Rc<dyn Logger> {
        Rc::clone(&self.node.session.log)
    }

    /// Assertion collaborator
    #[must_use]
    pub fn asserter(&self) -> &dyn Asserter {
        &*self.node.session.asserter
    }

    /// Session settings
    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.node.session.config
    }

    /// Trigger declarations, fixed at construction
    #[must_use]
    pub fn triggers(&self) -> &[TriggerDeclaration] {
        &self.node.triggers
    }

    /// Where this component's element comes from
    #[must_use]
    pub fn locator(&self) -> &ScopeLocator {
        &self.node.locator
    }

    /// Default search options of the session
    #[must_use]
    pub fn search_options(&self) -> SearchOptions {
        self.config().search_options()
    }

    /// Resolve the element with explicit options
    pub fn scope_with(&self, options: &SearchOptions) -> PageResult<Option<ElementHandle>> {
        self.node.locator.get_element(options)
    }

    /// Resolve the element, failing with `NotFound` when absent
    pub fn scope(&self) -> PageResult<ElementHandle> {
        let options = self.search_options();
        self.scope_with(&options)?
            .ok_or_else(|| PageError::not_found(self.node.kind.clone(), self.node.name.clone()))
    }

    /// Where resolution stands for the given options
    pub fn resolution_state(&self, options: &SearchOptions) -> PageResult<ResolutionState> {
        ResolutionState::from_result(self.scope_with(options))
    }

    /// Whether the element is present, waiting up to the retry timeout
    pub fn exists(&self) -> PageResult<bool> {
        if self.node.locator.is_document() {
            return Ok(true);
        }
        Ok(self
            .scope_with(&self.search_options().and_safely())?
            .is_some())
    }

    /// Whether the element is absent, waiting up to the retry timeout for it to go
    pub fn is_missing(&self) -> PageResult<bool> {
        if self.node.locator.is_document() {
            return Ok(false);
        }
        let attempt = SearchOptions::immediately()
            .and_safely()
            .with_strict(self.config().strict);
        let outcome = poll_until(&self.config().retry_config(), || {
            Ok(self.scope_with(&attempt)?.is_none().then_some(()))
        })?;
        Ok(outcome.is_success())
    }

    fn within<T>(
        &self,
        options: &SearchOptions,
        absent: T,
        search: impl FnOnce(Option<&ElementHandle>) -> PageResult<T>,
    ) -> PageResult<T> {
        if self.node.locator.is_document() {
            return search(None);
        }
        match self.scope_with(options)? {
            Some(element) => search(Some(&element)),
            None => Ok(absent),
        }
    }

    /// Resolve `by` inside this component with `options`
    pub fn resolve_within(
        &self,
        by: &By,
        options: &SearchOptions,
    ) -> PageResult<Option<ElementHandle>> {
        let lookup = by.options_over(options);
        self.within(&lookup.with_strict(options.strict), None, |context| {
            locator::find_one(self.driver(), context, by, &lookup)
        })
    }

    /// Find the single element matching `by` inside this component
    pub fn find_one(&self, by: &By) -> PageResult<Option<ElementHandle>> {
        self.resolve_within(by, &self.search_options())
    }

    /// Find every element matching `by` inside this component
    pub fn find_all(&self, by: &By) -> PageResult<Vec<ElementHandle>> {
        self.find_all_with(by, &self.search_options())
    }

    /// Find every element matching `by` inside this component with `options`
    pub fn find_all_with(
        &self,
        by: &By,
        options: &SearchOptions,
    ) -> PageResult<Vec<ElementHandle>> {
        let lookup = by.options_over(options);
        self.within(&lookup.with_strict(options.strict), Vec::new(), |context| {
            locator::find_all(self.driver(), context, by, &lookup)
        })
    }

    /// Visible text
    pub fn text(&self) -> PageResult<String> {
        trigger::fire(self, TriggerEvents::BEFORE_ACCESS)?;
        let element = self.scope()?;
        let text = self.driver().text(&element)?;
        trigger::fire(self, TriggerEvents::AFTER_ACCESS)?;
        Ok(text)
    }

    /// Attribute value
    pub fn attribute(&self, name: &str) -> PageResult<Option<String>> {
        let element = self.scope()?;
        self.driver().attribute(&element, name)
    }

    /// Click the element
    pub fn click(&self) -> PageResult<()> {
        self.log().info(&format!("Click {}", self.describe()));
        trigger::fire(self, TriggerEvents::BEFORE_CLICK)?;
        let element = self.scope()?;
        self.driver().click(&element)?;
        trigger::fire(self, TriggerEvents::AFTER_CLICK)
    }

    /// Replace the element's value with `value`
    pub fn set(&self, value: &str) -> PageResult<()> {
        self.log()
            .info(&format!("Set \"{value}\" to {}", self.describe()));
        trigger::fire(self, TriggerEvents::BEFORE_SET)?;
        let element = self.scope()?;
        self.driver().clear(&element)?;
        self.driver().send_keys(Some(&element), value)?;
        trigger::fire(self, TriggerEvents::AFTER_SET)
    }

    /// Run `body` inside a log section; the section is closed even on error
    pub fn in_section<T, F>(&self, section: &str, body: F) -> PageResult<T>
    where
        F: FnOnce() -> PageResult<T>,
    {
        self.log().start_section(section);
        let result = body();
        self.log().end_section();
        result
    }

    /// Assert the element exists, retrying up to the timeout
    pub fn verify_exists(&self) -> PageResult<()> {
        let description = self.describe();
        self.in_section(&format!("Verify {description} exists"), || {
            let found = self.exists()?;
            self.asserter()
                .is_true(found, &format!("Expected {description} to exist"))
        })
    }

    /// Assert the element's text matches any of `values`, retrying up to the timeout
    pub fn verify_text_matches_any<S: AsRef<str>>(
        &self,
        term_match: TermMatch,
        values: &[S],
    ) -> PageResult<()> {
        let description = self.describe();
        let expected = humanize_list(values);
        let phrase = term_match.describe();
        self.in_section(
            &format!("Verify {description} is {phrase} {expected}"),
            || {
                let attempt = SearchOptions::immediately()
                    .and_safely()
                    .with_strict(self.config().strict);
                let mut actual: Option<String> = None;
                let outcome = poll_until(&self.config().retry_config(), || {
                    let Some(element) = self.scope_with(&attempt)? else {
                        return Ok(None);
                    };
                    let text = self.driver().text(&element)?;
                    let matched = term_match.matches_any(&text, values);
                    actual = Some(text);
                    Ok(matched.then_some(()))
                })?;
                let message = match actual {
                    Some(actual) => format!(
                        "Expected {description} to be {phrase} {expected}, but was '{actual}'"
                    ),
                    None => format!("Expected {description} to exist"),
                };
                self.asserter().is_true(outcome.is_success(), &message)
            },
        )
    }

    /// Declare a child control located by `by`
    pub fn control<C: Control>(&self, name: impl Into<String>, by: By) -> ControlBuilder<'_, C> {
        ControlBuilder::new(self, name.into(), Source::By(by))
    }

    /// Declare a child control bound to an explicit locator
    pub fn control_at<C: Control>(
        &self,
        name: impl Into<String>,
        locator: ScopeLocator,
    ) -> ControlBuilder<'_, C> {
        ControlBuilder::new(self, name.into(), Source::Locator(locator))
    }
}

/// Weak link to a component, used by lazily evaluated locators
#[derive(Debug, Clone)]
pub struct WeakComponent {
    node: Weak<Node>,
    name: String,
}

impl WeakComponent {
    /// The component, or `Detached` if it was dropped
    pub fn upgrade(&self) -> PageResult<Component> {
        self.node
            .upgrade()
            .map(|node| Component { node })
            .ok_or_else(|| PageError::Detached {
                name: self.name.clone(),
            })
    }
}

/// A typed wrapper around a [`Component`].
///
/// Each control type registers its kind and default triggers here; the
/// builder attaches them when an instance is created.
pub trait Control: Sized {
    /// Kind used in messages
    const KIND: &'static str;

    /// Triggers every instance of this type carries
    fn default_triggers() -> Vec<TriggerDeclaration> {
        Vec::new()
    }

    /// Wrap a component
    fn from_component(component: Component) -> Self;

    /// The wrapped component
    fn component(&self) -> &Component;
}

#[derive(Debug)]
enum Source {
    By(By),
    Locator(ScopeLocator),
}

/// Builder for child controls
#[derive(Debug)]
#[must_use]
pub struct ControlBuilder<'a, C> {
    parent: &'a Component,
    name: String,
    source: Source,
    kind: Option<String>,
    triggers: Vec<TriggerDeclaration>,
    register: bool,
    _control: PhantomData<fn() -> C>,
}

impl<'a, C: Control> ControlBuilder<'a, C> {
    fn new(parent: &'a Component, name: String, source: Source) -> Self {
        let register = matches!(source, Source::By(_));
        Self {
            parent,
            name,
            source,
            kind: None,
            triggers: Vec::new(),
            register,
            _control: PhantomData,
        }
    }

    /// Add an instance trigger; instance triggers precede the type's defaults
    pub fn with_trigger(mut self, trigger: impl Into<TriggerDeclaration>) -> Self {
        self.triggers.push(trigger.into());
        self
    }

    /// Override the kind used in messages
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Do not register the control with its parent
    pub fn transient(mut self) -> Self {
        self.register = false;
        self
    }

    /// Create the control and fire its `INIT` triggers
    pub fn build(self) -> PageResult<C> {
        let kind = self.kind.unwrap_or_else(|| C::KIND.to_string());
        let locator = match self.source {
            Source::Locator(locator) => locator,
            Source::By(by) => {
                let by = by.named(self.name.clone()).kind(kind.clone());
                let parent = self.parent.downgrade();
                ScopeLocator::dynamic(move |options| parent.upgrade()?.resolve_within(&by, options))
            }
        };
        let mut triggers = self.triggers;
        triggers.extend(C::default_triggers());

        let component = self.parent.child(self.name, kind, locator, triggers);
        if self.register {
            self.parent
                .node
                .children
                .borrow_mut()
                .push(Rc::clone(&component.node));
        }
        trigger::fire(&component, TriggerEvents::INIT)?;
        Ok(C::from_component(component))
    }
}

/// Root of a component tree
#[derive(Debug, Clone)]
pub struct PageObject {
    component: Component,
}

impl PageObject {
    /// Start building a page object named `name`
    pub fn builder(name: impl Into<String>, driver: Rc<dyn Driver>) -> PageObjectBuilder {
        PageObjectBuilder {
            name: name.into(),
            driver,
            log: None,
            asserter: None,
            config: PageConfig::default(),
            triggers: Vec::new(),
        }
    }

    /// Page name
    #[must_use]
    pub fn name(&self) -> &str {
        self.component.name()
    }

    /// Root component
    #[must_use]
    pub const fn component(&self) -> &Component {
        &self.component
    }

    /// Declare a control on the page
    pub fn control<C: Control>(&self, name: impl Into<String>, by: By) -> ControlBuilder<'_, C> {
        self.component.control(name, by)
    }
}

/// Builder for [`PageObject`]
#[derive(Debug)]
#[must_use]
pub struct PageObjectBuilder {
    name: String,
    driver: Rc<dyn Driver>,
    log: Option<Rc<dyn Logger>>,
    asserter: Option<Rc<dyn Asserter>>,
    config: PageConfig,
    triggers: Vec<TriggerDeclaration>,
}

impl PageObjectBuilder {
    /// Use `log` instead of a [`TracingLogger`]
    pub fn logger(mut self, log: Rc<dyn Logger>) -> Self {
        self.log = Some(log);
        self
    }

    /// Use `asserter` instead of a [`StrictAsserter`]
    pub fn asserter(mut self, asserter: Rc<dyn Asserter>) -> Self {
        self.asserter = Some(asserter);
        self
    }

    /// Session settings
    pub fn config(mut self, config: PageConfig) -> Self {
        self.config = config;
        self
    }

    /// Declare a page-level trigger
    pub fn trigger(mut self, trigger: impl Into<TriggerDeclaration>) -> Self {
        self.triggers.push(trigger.into());
        self
    }

    /// Create the page object and fire `INIT` then `PAGE_OBJECT_INIT`
    pub fn build(self) -> PageResult<PageObject> {
        let session = Rc::new(Session {
            driver: self.driver,
            log: self
                .log
                .unwrap_or_else(|| Rc::new(TracingLogger::new())),
            asserter: self
                .asserter
                .unwrap_or_else(|| Rc::new(StrictAsserter)),
            config: self.config,
        });
        let component = Component::root(self.name, session, self.triggers);
        tracing::debug!(page = %component.name(), "initializing page object");
        trigger::fire(&component, TriggerEvents::INIT)?;
        trigger::fire(&component, TriggerEvents::PAGE_OBJECT_INIT)?;
        Ok(PageObject { component })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::assertion::SoftAsserter;
    use crate::controls::{Button, Text};
    use crate::log::RecordingLogger;
    use crate::mock::{MockDriver, MockElement};
    use std::time::Duration;

    fn page_on(driver: Rc<MockDriver>) -> PageObject {
        PageObject::builder("Profile", driver)
            .logger(Rc::new(RecordingLogger::new()))
            .config(PageConfig::default().with_retry_timeout(Duration::ZERO))
            .build()
            .unwrap()
    }

    mod tree_tests {
        use super::*;

        #[test]
        fn test_links() {
            let driver = Rc::new(MockDriver::with_document([MockElement::new("form")
                .child(MockElement::new("button").with_text("Save"))]));
            let page = page_on(driver);
            let form: Text = page.control("Form", By::tag("form")).build().unwrap();
            let save: Button = form
                .component()
                .control("Save", By::tag("button"))
                .build()
                .unwrap();

            let save = save.component();
            assert_eq!(save.parent().unwrap().name(), "Form");
            assert_eq!(save.owner().unwrap().name(), "Profile");
            let names: Vec<String> = save
                .ancestors()
                .iter()
                .map(|a| a.name().to_string())
                .collect();
            assert_eq!(names, vec!["Form", "Profile"]);
            assert!(page.component().is_page());
            assert_eq!(page.component().owner().unwrap().name(), "Profile");
        }

        #[test]
        fn test_declared_children_are_owned() {
            let driver = Rc::new(MockDriver::new());
            let page = page_on(driver);
            {
                let _: Button = page.control("Save", By::tag("button")).build().unwrap();
                let _: Button = page
                    .control("Cancel", By::tag("button"))
                    .transient()
                    .build()
                    .unwrap();
            }
            let children = page.component().children();
            assert_eq!(children.len(), 1);
            assert_eq!(children[0].describe(), "'Save' button");
        }

        #[test]
        fn test_dropped_page_detaches_children() {
            let driver = Rc::new(MockDriver::with_document([MockElement::new("button")]));
            let button: Button = {
                let page = page_on(driver);
                page.control("Go", By::tag("button")).build().unwrap()
            };
            assert!(matches!(
                button.component().owner(),
                Err(PageError::Detached { .. })
            ));
            assert!(button.click().is_err());
        }
    }

    mod resolution_tests {
        use super::*;

        #[test]
        fn test_lookup_is_lazy_and_fresh() {
            let driver = Rc::new(MockDriver::new());
            let page = page_on(driver.clone());
            let queries = driver.query_count();
            let status: Text = page.control("Status", By::tag("p")).build().unwrap();
            assert_eq!(driver.query_count(), queries);

            assert!(!status.component().exists().unwrap());
            let p = driver.mount(MockElement::new("p").with_text("Ready"));
            assert_eq!(status.value().unwrap(), "Ready");

            driver.remove(&p).unwrap();
            assert!(status.component().is_missing().unwrap());
        }

        #[test]
        fn test_missing_parent_in_safe_mode() {
            let driver = Rc::new(MockDriver::new());
            let page = page_on(driver);
            let form: Text = page.control("Form", By::tag("form")).build().unwrap();
            let save: Button = form
                .component()
                .control("Save", By::tag("button"))
                .build()
                .unwrap();

            let state = save
                .component()
                .resolution_state(&SearchOptions::immediately().and_safely())
                .unwrap();
            assert_eq!(state, ResolutionState::Missing);

            let err = save.component().scope().unwrap_err();
            assert_eq!(err.to_string(), "Unable to locate text: 'Form'");
        }

        #[test]
        fn test_not_found_names_component() {
            let driver = Rc::new(MockDriver::new());
            let page = page_on(driver);
            let save: Button = page.control("Save", By::tag("button")).build().unwrap();
            let err = save.click().unwrap_err();
            assert_eq!(err.to_string(), "Unable to locate button: 'Save'");
        }
    }

    mod verification_tests {
        use super::*;

        fn soft_page(driver: Rc<MockDriver>) -> (PageObject, Rc<SoftAsserter>, Rc<RecordingLogger>) {
            let asserter = Rc::new(SoftAsserter::new());
            let log = Rc::new(RecordingLogger::new());
            let page = PageObject::builder("Home", driver)
                .logger(log.clone())
                .asserter(asserter.clone())
                .config(PageConfig::default().with_retry_timeout(Duration::ZERO))
                .build()
                .unwrap();
            (page, asserter, log)
        }

        #[test]
        fn test_verify_text_reports_actual() {
            let driver = Rc::new(MockDriver::with_document([MockElement::new("h1").with_text("Hello")]));
            let (page, asserter, log) = soft_page(driver);
            let title: Text = page.control("Title", By::tag("h1")).build().unwrap();

            title
                .component()
                .verify_text_matches_any(TermMatch::Equals, &["Welcome", "Hi"])
                .unwrap();

            let failures = asserter.failures();
            assert_eq!(failures.len(), 1);
            assert_eq!(
                failures[0].message,
                "Expected 'Title' text to be equal to 'Welcome', 'Hi', but was 'Hello'"
            );
            assert!(log.is_balanced());
        }

        #[test]
        fn test_verify_exists_strict_asserter_still_closes_section() {
            let driver = Rc::new(MockDriver::new());
            let log = Rc::new(RecordingLogger::new());
            let page = PageObject::builder("Home", driver)
                .logger(log.clone())
                .config(PageConfig::default().with_retry_timeout(Duration::ZERO))
                .build()
                .unwrap();
            let banner: Text = page.control("Banner", By::tag("div")).build().unwrap();

            let err = banner.component().verify_exists().unwrap_err();
            assert!(err.is_assertion());
            assert!(log.is_balanced());
            assert_eq!(log.sections(), vec!["Verify 'Banner' text exists".to_string()]);
        }
    }
}
