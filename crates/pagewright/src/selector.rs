//! Structured element selectors.
//!
//! Selectors are data, not strings: a [`Driver`](crate::Driver) can evaluate
//! them directly or render them with [`Selector::to_xpath`]. Lookups are
//! wrapped in [`By`], which adds the logical name and kind used in messages
//! and the per-lookup search option overrides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::locator::SearchOptions;
use crate::naming::humanize_list;

/// How element text is compared with an expected value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TermMatch {
    /// Whitespace-normalized text equals the value
    #[default]
    Equals,
    /// Text contains the value
    Contains,
    /// Normalized text starts with the value
    StartsWith,
    /// Normalized text ends with the value
    EndsWith,
}

impl TermMatch {
    /// Compare `actual` text against `expected`
    #[must_use]
    pub fn matches(self, actual: &str, expected: &str) -> bool {
        let normalized = normalize_space(actual);
        match self {
            Self::Equals => normalized == expected,
            Self::Contains => actual.contains(expected) || normalized.contains(expected),
            Self::StartsWith => normalized.starts_with(expected),
            Self::EndsWith => normalized.ends_with(expected),
        }
    }

    /// Whether `actual` matches any of `expected`
    #[must_use]
    pub fn matches_any<S: AsRef<str>>(self, actual: &str, expected: &[S]) -> bool {
        expected.iter().any(|e| self.matches(actual, e.as_ref()))
    }

    /// XPath predicate testing the context node's text
    #[must_use]
    pub fn xpath_condition(self, value: &str) -> String {
        let literal = xpath_literal(value);
        match self {
            Self::Equals => format!("normalize-space(.) = {literal}"),
            Self::Contains => format!("contains(., {literal})"),
            Self::StartsWith => format!("starts-with(normalize-space(.), {literal})"),
            Self::EndsWith => format!(
                "substring(normalize-space(.), string-length(normalize-space(.)) - string-length({literal}) + 1) = {literal}"
            ),
        }
    }

    /// Phrase used in messages ("containing")
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Equals => "equal to",
            Self::Contains => "containing",
            Self::StartsWith => "starting with",
            Self::EndsWith => "ending with",
        }
    }

    /// Component name for an element located by these values
    #[must_use]
    pub fn format_component_name<S: AsRef<str>>(self, values: &[S]) -> String {
        let joined = values
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join("/");
        match self {
            Self::Equals => joined,
            other => format!("{} '{joined}'", other.describe()),
        }
    }
}

/// Collapse runs of whitespace and trim, like XPath `normalize-space`
#[must_use]
pub fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Quote a value as an XPath string literal
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let parts = value
            .split('\'')
            .map(|part| format!("'{part}'"))
            .collect::<Vec<_>>()
            .join(", \"'\", ");
        format!("concat({parts})")
    }
}

/// Predicate applied to a candidate element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Element text matches a value
    Text {
        /// Comparison mode
        term_match: TermMatch,
        /// Expected value
        value: String,
    },
    /// Element has a direct child with the tag (optionally matching)
    HasChild {
        /// Child tag name
        tag: String,
        /// Child predicate
        condition: Option<Box<Condition>>,
    },
    /// Every condition holds
    All(Vec<Condition>),
    /// At least one condition holds
    Any(Vec<Condition>),
}

impl Condition {
    /// Text matches `value` with `term_match`
    #[must_use]
    pub fn text(term_match: TermMatch, value: impl Into<String>) -> Self {
        Self::Text {
            term_match,
            value: value.into(),
        }
    }

    /// Text contains `value`
    #[must_use]
    pub fn contains(value: impl Into<String>) -> Self {
        Self::text(TermMatch::Contains, value)
    }

    /// Normalized text equals `value`
    #[must_use]
    pub fn equals(value: impl Into<String>) -> Self {
        Self::text(TermMatch::Equals, value)
    }

    /// Has any direct child with `tag`
    #[must_use]
    pub fn has_child(tag: impl Into<String>) -> Self {
        Self::HasChild {
            tag: tag.into(),
            condition: None,
        }
    }

    /// Has a direct child with `tag` satisfying `condition`
    #[must_use]
    pub fn has_child_where(tag: impl Into<String>, condition: Condition) -> Self {
        Self::HasChild {
            tag: tag.into(),
            condition: Some(Box::new(condition)),
        }
    }

    /// Text matches any of `values`
    #[must_use]
    pub fn any_text<S: AsRef<str>>(term_match: TermMatch, values: &[S]) -> Self {
        Self::Any(
            values
                .iter()
                .map(|v| Self::text(term_match, v.as_ref()))
                .collect(),
        )
    }

    /// Render as an XPath predicate body
    #[must_use]
    pub fn to_xpath(&self) -> String {
        match self {
            Self::Text { term_match, value } => term_match.xpath_condition(value),
            Self::HasChild { tag, condition } => match condition {
                Some(inner) => format!("{tag}[{}]", inner.to_xpath()),
                None => tag.clone(),
            },
            Self::All(conditions) => join_xpath(conditions, " and ", "true()"),
            Self::Any(conditions) => join_xpath(conditions, " or ", "false()"),
        }
    }
}

fn join_xpath(conditions: &[Condition], separator: &str, empty: &str) -> String {
    match conditions {
        [] => empty.to_string(),
        [single] => single.to_xpath(),
        many => many
            .iter()
            .map(|c| format!("({})", c.to_xpath()))
            .collect::<Vec<_>>()
            .join(separator),
    }
}

/// What to search for, relative to a search context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Descendants with a tag name, optionally filtered and indexed
    Path {
        /// Tag name (`*` for any)
        tag: String,
        /// Filter predicate
        condition: Option<Condition>,
        /// Zero-based index among the matches
        nth: Option<usize>,
    },
    /// Descendant links whose text contains the value
    PartialLinkText(String),
    /// Raw XPath, passed through untouched
    XPath(String),
}

impl Selector {
    /// Descendants with `tag`
    #[must_use]
    pub fn path(tag: impl Into<String>) -> Self {
        Self::Path {
            tag: tag.into(),
            condition: None,
            nth: None,
        }
    }

    /// Add a filter predicate to a path selector
    #[must_use]
    pub fn with_condition(self, condition: Condition) -> Self {
        match self {
            Self::Path { tag, nth, .. } => Self::Path {
                tag,
                condition: Some(condition),
                nth,
            },
            other => other,
        }
    }

    /// Pick the `index`-th match of a path selector
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        match self {
            Self::Path { tag, condition, .. } => Self::Path {
                tag,
                condition,
                nth: Some(index),
            },
            other => other,
        }
    }

    /// Render as an XPath expression relative to the search context
    #[must_use]
    pub fn to_xpath(&self) -> String {
        match self {
            Self::Path {
                tag,
                condition,
                nth,
            } => {
                let base = match condition {
                    Some(c) => format!(".//{tag}[{}]", c.to_xpath()),
                    None => format!(".//{tag}"),
                };
                match nth {
                    Some(index) => format!("({base})[{}]", index + 1),
                    None => base,
                }
            }
            Self::PartialLinkText(text) => {
                format!(".//a[{}]", TermMatch::Contains.xpath_condition(text))
            }
            Self::XPath(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpath())
    }
}

/// A named lookup: selector plus message metadata and option overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct By {
    selector: Selector,
    name: Option<String>,
    kind: Option<String>,
    safely: Option<bool>,
    timeout: Option<Duration>,
    strict: Option<bool>,
}

impl By {
    /// Wrap a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            name: None,
            kind: None,
            safely: None,
            timeout: None,
            strict: None,
        }
    }

    /// Descendants with `tag`
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::from_selector(Selector::path(tag))
    }

    /// Descendants with `tag` whose text matches `value`
    #[must_use]
    pub fn content(tag: impl Into<String>, term_match: TermMatch, value: impl Into<String>) -> Self {
        Self::from_selector(Selector::path(tag).with_condition(Condition::text(term_match, value)))
    }

    /// Links whose text contains `text`
    #[must_use]
    pub fn partial_link_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::from_selector(Selector::PartialLinkText(text.clone()))
            .named(text)
            .kind("link")
    }

    /// Raw XPath
    #[must_use]
    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::from_selector(Selector::XPath(xpath.into()))
    }

    /// Set the logical element name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the logical element kind
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Mark as a table row lookup
    #[must_use]
    pub fn table_row(self) -> Self {
        self.kind("table row")
    }

    /// Mark as a table column lookup
    #[must_use]
    pub fn table_column(self) -> Self {
        self.kind("table column")
    }

    /// Return nothing instead of failing when absent
    #[must_use]
    pub const fn safely(mut self) -> Self {
        self.safely = Some(true);
        self
    }

    /// Do not retry
    #[must_use]
    pub const fn immediately(mut self) -> Self {
        self.timeout = Some(Duration::ZERO);
        self
    }

    /// Retry for up to `timeout`
    #[must_use]
    pub const fn within(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Require a single match (`true`) or take the first (`false`)
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Pin every option to `options`
    #[must_use]
    pub const fn with(mut self, options: &SearchOptions) -> Self {
        self.safely = Some(options.safely);
        self.timeout = Some(options.timeout);
        self.strict = Some(options.strict);
        self
    }

    /// Apply this lookup's overrides on top of `base`
    #[must_use]
    pub fn options_over(&self, base: &SearchOptions) -> SearchOptions {
        SearchOptions {
            safely: self.safely.unwrap_or(base.safely),
            timeout: self.timeout.unwrap_or(base.timeout),
            poll_interval: base.poll_interval,
            strict: self.strict.unwrap_or(base.strict),
        }
    }

    /// The selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Logical name (falls back to the selector's own description)
    #[must_use]
    pub fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| match &self.selector {
            Selector::Path {
                condition: Some(Condition::Text { value, .. }),
                ..
            } => value.clone(),
            Selector::Path { tag, nth, .. } => match nth {
                Some(index) => format!("{tag} #{}", index + 1),
                None => tag.clone(),
            },
            Selector::PartialLinkText(text) => text.clone(),
            Selector::XPath(_) => "element".to_string(),
        })
    }

    /// Logical kind ("element" when unset)
    #[must_use]
    pub fn kind_name(&self) -> String {
        self.kind.clone().unwrap_or_else(|| "element".to_string())
    }

    /// "'Alice' table row"
    #[must_use]
    pub fn describe(&self) -> String {
        format!("'{}' {}", self.name(), self.kind_name())
    }
}

impl From<Selector> for By {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}

/// Row name for a value filter: "row containing: 'a', 'b'"
#[must_use]
pub fn row_element_name<S: AsRef<str>>(values: &[S]) -> Option<String> {
    (!values.is_empty()).then(|| format!("row containing: {}", humanize_list(values)))
}
