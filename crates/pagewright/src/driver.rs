//! Browser driver seam
//!
//! Components never talk to a browser directly. Every query and action goes
//! through [`Driver`], so a WebDriver bridge, a CDP client or the in-memory
//! [`MockDriver`](crate::mock::MockDriver) can sit underneath the same page
//! objects.
//!
//! The trait is synchronous: page objects run on the test thread and the
//! retry layer polls by sleeping between attempts.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

use crate::result::PageResult;
use crate::selector::Selector;

/// Opaque reference to a node owned by a driver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned node id
    pub id: String,
    /// Element tag name
    pub tag_name: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
        }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{}>", self.tag_name, self.id)
    }
}

/// Browser automation backend used by components
pub trait Driver: Debug {
    /// Find elements matching `selector`, searching under `within` or the
    /// whole document. Results are in document order.
    fn find_elements(
        &self,
        within: Option<&ElementHandle>,
        selector: &Selector,
    ) -> PageResult<Vec<ElementHandle>>;

    /// Click an element
    fn click(&self, element: &ElementHandle) -> PageResult<()>;

    /// Clear an editable element
    fn clear(&self, element: &ElementHandle) -> PageResult<()>;

    /// Send keystrokes to an element, or to the focused element when `None`
    fn send_keys(&self, element: Option<&ElementHandle>, keys: &str) -> PageResult<()>;

    /// Visible text of an element
    fn text(&self, element: &ElementHandle) -> PageResult<String>;

    /// Attribute value, `None` if unset
    fn attribute(&self, element: &ElementHandle, name: &str) -> PageResult<Option<String>>;
}
