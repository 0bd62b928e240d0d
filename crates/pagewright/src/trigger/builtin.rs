//! Built-in triggers.

use super::{Trigger, TriggerContext, TriggerEvents};
use crate::component::Control;
use crate::controls::{Heading, HeadingLevel};
use crate::naming::{ordinalize, title_case};
use crate::result::PageResult;
use crate::selector::{By, Condition, Selector, TermMatch};

/// Clicks the parent component
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickParent;

impl ClickParent {
    /// Create the trigger
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Trigger for ClickParent {
    fn default_events(&self) -> TriggerEvents {
        TriggerEvents::BEFORE_ANY_ACTION
    }

    fn execute(&self, context: &TriggerContext<'_>) -> PageResult<()> {
        context.component.require_parent()?.click()
    }
}

/// Sends keys to the focused element
#[derive(Debug, Clone, Default)]
pub struct PressKeys {
    keys: String,
}

impl PressKeys {
    /// Press `keys`
    #[must_use]
    pub fn new(keys: impl Into<String>) -> Self {
        Self { keys: keys.into() }
    }

    /// Keys to press
    #[must_use]
    pub fn keys(&self) -> &str {
        &self.keys
    }
}

impl Trigger for PressKeys {
    fn default_events(&self) -> TriggerEvents {
        TriggerEvents::AFTER_SET
    }

    fn execute(&self, context: &TriggerContext<'_>) -> PageResult<()> {
        if self.keys.is_empty() {
            return Ok(());
        }
        context.log.info(&format!("Press \"{}\"", self.keys.escape_debug()));
        context.driver.send_keys(None, &self.keys)
    }
}

/// Captures a screenshot
#[derive(Debug, Clone, Default)]
pub struct Screenshot {
    title: Option<String>,
}

impl Screenshot {
    /// Untitled screenshot
    #[must_use]
    pub const fn new() -> Self {
        Self { title: None }
    }

    /// Screenshot with a title
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

impl Trigger for Screenshot {
    fn default_events(&self) -> TriggerEvents {
        TriggerEvents::BEFORE_CLICK
    }

    fn execute(&self, context: &TriggerContext<'_>) -> PageResult<()> {
        context.log.screenshot(self.title.as_deref());
        Ok(())
    }
}

/// Verifies that a heading is present.
///
/// Three forms:
/// - values: a heading whose text matches any value must exist
/// - index: the n-th heading of the level must match any value
/// - neither: a heading equal to the page name in title case must exist
#[derive(Debug, Clone)]
pub struct VerifyHeading {
    level: HeadingLevel,
    term_match: TermMatch,
    values: Vec<String>,
    index: Option<usize>,
}

impl VerifyHeading {
    /// Verify a heading of `level` named after the page
    #[must_use]
    pub const fn new(level: HeadingLevel) -> Self {
        Self {
            level,
            term_match: TermMatch::Equals,
            values: Vec::new(),
            index: None,
        }
    }

    /// Expect text matching any of `values`
    #[must_use]
    pub fn with_values<S: AsRef<str>>(mut self, term_match: TermMatch, values: &[S]) -> Self {
        self.term_match = term_match;
        self.values = values.iter().map(|v| v.as_ref().to_string()).collect();
        self
    }

    /// Check the heading at zero-based `index` instead of searching by text
    #[must_use]
    pub const fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    fn expected_values(&self, context: &TriggerContext<'_>) -> Vec<String> {
        if self.values.is_empty() {
            vec![title_case(context.owner.name())]
        } else {
            self.values.clone()
        }
    }
}

impl Trigger for VerifyHeading {
    fn default_events(&self) -> TriggerEvents {
        TriggerEvents::PAGE_OBJECT_INIT
    }

    fn execute(&self, context: &TriggerContext<'_>) -> PageResult<()> {
        let values = self.expected_values(context);
        let tag = self.level.tag();
        match self.index {
            Some(index) => {
                let heading: Heading = context
                    .owner
                    .control(ordinalize(index + 1), By::from_selector(Selector::path(tag).nth(index)))
                    .transient()
                    .build()?;
                heading
                    .component()
                    .verify_text_matches_any(self.term_match, &values)
            }
            None => {
                let condition = Condition::any_text(self.term_match, &values);
                let heading: Heading = context
                    .owner
                    .control(
                        self.term_match.format_component_name(&values),
                        By::from_selector(Selector::path(tag).with_condition(condition)),
                    )
                    .transient()
                    .build()?;
                heading.component().verify_exists()
            }
        }
    }
}
