//! Built-in controls.

use serde::{Deserialize, Serialize};

use crate::component::{Component, Control};
use crate::result::PageResult;
use crate::selector::{By, Selector, TermMatch};

macro_rules! control {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            component: Component,
        }

        impl Control for $name {
            const KIND: &'static str = $kind;

            fn from_component(component: Component) -> Self {
                Self { component }
            }

            fn component(&self) -> &Component {
                &self.component
            }
        }
    };
}

control!(
    /// Clickable button
    Button,
    "button"
);

control!(
    /// Hyperlink
    Link,
    "link"
);

control!(
    /// Editable text field
    TextInput,
    "text input"
);

control!(
    /// Read-only text content
    Text,
    "text"
);

control!(
    /// Heading of any level
    Heading,
    "heading"
);

impl Button {
    /// Click the button
    pub fn click(&self) -> PageResult<()> {
        self.component.click()
    }
}

impl Link {
    /// Follow the link
    pub fn click(&self) -> PageResult<()> {
        self.component.click()
    }

    /// `href` attribute
    pub fn href(&self) -> PageResult<Option<String>> {
        self.component.attribute("href")
    }
}

impl TextInput {
    /// Replace the field's value
    pub fn set(&self, value: &str) -> PageResult<()> {
        self.component.set(value)
    }

    /// Current value
    pub fn value(&self) -> PageResult<String> {
        Ok(self.component.attribute("value")?.unwrap_or_default())
    }
}

impl Text {
    /// Visible text
    pub fn value(&self) -> PageResult<String> {
        self.component.text()
    }
}

impl Heading {
    /// Visible text
    pub fn value(&self) -> PageResult<String> {
        self.component.text()
    }
}

/// Heading level, `H1` to `H6`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// `<h1>`
    H1,
    /// `<h2>`
    H2,
    /// `<h3>`
    H3,
    /// `<h4>`
    H4,
    /// `<h5>`
    H5,
    /// `<h6>`
    H6,
}

impl HeadingLevel {
    /// Numeric level, 1 to 6
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
            Self::H4 => 4,
            Self::H5 => 5,
            Self::H6 => 6,
        }
    }

    /// Level from its number
    #[must_use]
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::H1),
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            4 => Some(Self::H4),
            5 => Some(Self::H5),
            6 => Some(Self::H6),
            _ => None,
        }
    }

    /// Tag name
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
        }
    }

    /// Headings of this level whose text matches `value`
    #[must_use]
    pub fn by_content(self, term_match: TermMatch, value: impl Into<String>) -> By {
        By::content(self.tag(), term_match, value)
    }

    /// The heading of this level at zero-based `index`
    #[must_use]
    pub fn by_index(self, index: usize) -> By {
        By::from_selector(Selector::path(self.tag()).nth(index))
    }
}
