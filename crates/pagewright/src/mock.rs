//! In-memory DOM driver for tests.
//!
//! [`MockDriver`] keeps a small element tree, evaluates structured
//! [`Selector`]s against it and records every action, so page objects can be
//! exercised without a browser. The tree can change between queries
//! ([`MockDriver::mount`], [`MockDriver::remove`], [`MockDriver::mount_after`])
//! to simulate pages that render late.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::driver::{Driver, ElementHandle};
use crate::result::{PageError, PageResult};
use crate::selector::{normalize_space, Condition, Selector, TermMatch};

const ROOT: usize = 0;

/// Element description used to build the mock document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockElement {
    tag: String,
    text: String,
    attributes: BTreeMap<String, String>,
    children: Vec<MockElement>,
}

impl MockElement {
    /// Element with the given tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the element's own text (rendered before its children)
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append one child
    #[must_use]
    pub fn child(mut self, child: MockElement) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = MockElement>) -> Self {
        self.children.extend(children);
        self
    }

    /// `<table>` with one header row and one row per entry of `rows`
    #[must_use]
    pub fn table<H, R, C>(headers: &[H], rows: &[R]) -> Self
    where
        H: AsRef<str>,
        R: AsRef<[C]>,
        C: AsRef<str>,
    {
        let header = Self::new("tr").children(
            headers
                .iter()
                .map(|h| Self::new("th").with_text(h.as_ref())),
        );
        let body = rows.iter().map(|row| {
            Self::new("tr").children(
                row.as_ref()
                    .iter()
                    .map(|cell| Self::new("td").with_text(cell.as_ref())),
            )
        });
        Self::new("table").child(header).children(body)
    }
}

/// An action the driver performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverAction {
    /// Element clicked
    Click(ElementHandle),
    /// Element cleared
    Clear(ElementHandle),
    /// Keys sent to an element or to the focused element
    SendKeys {
        /// Target element (`None` for the focused element)
        target: Option<ElementHandle>,
        /// Keys sent
        keys: String,
    },
}

#[derive(Debug)]
struct Node {
    tag: String,
    text: String,
    attributes: BTreeMap<String, String>,
    children: Vec<usize>,
    parent: Option<usize>,
    attached: bool,
}

/// Driver backed by an in-memory element tree
#[derive(Debug)]
pub struct MockDriver {
    nodes: RefCell<Vec<Node>>,
    pending: RefCell<Vec<(usize, MockElement)>>,
    history: RefCell<Vec<DriverAction>>,
    queries: Cell<usize>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Driver with an empty document
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(vec![Node {
                tag: "body".to_string(),
                text: String::new(),
                attributes: BTreeMap::new(),
                children: Vec::new(),
                parent: None,
                attached: true,
            }]),
            pending: RefCell::new(Vec::new()),
            history: RefCell::new(Vec::new()),
            queries: Cell::new(0),
        }
    }

    /// Driver whose document holds `elements`
    #[must_use]
    pub fn with_document(elements: impl IntoIterator<Item = MockElement>) -> Self {
        let driver = Self::new();
        for element in elements {
            driver.insert(ROOT, element);
        }
        driver
    }

    /// Append `element` to the document body
    pub fn mount(&self, element: MockElement) -> ElementHandle {
        let index = self.insert(ROOT, element);
        self.handle(index)
    }

    /// Mount `element` once the driver has served `queries` lookups
    pub fn mount_after(&self, queries: usize, element: MockElement) {
        self.pending.borrow_mut().push((queries, element));
    }

    /// Append `element` under `parent`
    pub fn append(&self, parent: &ElementHandle, element: MockElement) -> PageResult<ElementHandle> {
        let parent = self.index_of(parent)?;
        let index = self.insert(parent, element);
        Ok(self.handle(index))
    }

    /// Detach an element and its subtree; later access fails as stale
    pub fn remove(&self, element: &ElementHandle) -> PageResult<()> {
        let index = self.index_of(element)?;
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[index].parent {
            nodes[parent].children.retain(|&child| child != index);
        }
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            nodes[current].attached = false;
            stack.extend(nodes[current].children.iter().copied());
        }
        Ok(())
    }

    /// Replace an element's own text
    pub fn set_text(&self, element: &ElementHandle, text: impl Into<String>) -> PageResult<()> {
        let index = self.index_of(element)?;
        self.nodes.borrow_mut()[index].text = text.into();
        Ok(())
    }

    /// Every action performed so far
    #[must_use]
    pub fn history(&self) -> Vec<DriverAction> {
        self.history.borrow().clone()
    }

    /// Elements clicked so far, in order
    #[must_use]
    pub fn clicks(&self) -> Vec<ElementHandle> {
        self.history
            .borrow()
            .iter()
            .filter_map(|action| match action {
                DriverAction::Click(element) => Some(element.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `find_elements` calls served
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    fn insert(&self, parent: usize, element: MockElement) -> usize {
        let MockElement {
            tag,
            text,
            attributes,
            children,
        } = element;
        let index = {
            let mut nodes = self.nodes.borrow_mut();
            let index = nodes.len();
            nodes.push(Node {
                tag,
                text,
                attributes,
                children: Vec::new(),
                parent: Some(parent),
                attached: true,
            });
            nodes[parent].children.push(index);
            index
        };
        for child in children {
            self.insert(index, child);
        }
        index
    }

    fn handle(&self, index: usize) -> ElementHandle {
        ElementHandle::new(format!("mock-{index}"), self.nodes.borrow()[index].tag.clone())
    }

    fn index_of(&self, element: &ElementHandle) -> PageResult<usize> {
        let stale = || PageError::driver(format!("stale element reference: {element}"));
        let index = element
            .id
            .strip_prefix("mock-")
            .and_then(|raw| raw.parse::<usize>().ok())
            .ok_or_else(stale)?;
        match self.nodes.borrow().get(index) {
            Some(node) if node.attached => Ok(index),
            _ => Err(stale()),
        }
    }

    fn release_pending(&self) {
        let served = self.queries.get();
        let ready: Vec<MockElement> = {
            let mut pending = self.pending.borrow_mut();
            let (ready, waiting): (Vec<_>, Vec<_>) = pending.drain(..).partition(|(after, _)| *after <= served);
            *pending = waiting;
            ready.into_iter().map(|(_, element)| element).collect()
        };
        for element in ready {
            self.insert(ROOT, element);
        }
    }

    fn string_value(nodes: &[Node], index: usize) -> String {
        let node = &nodes[index];
        let mut parts = Vec::new();
        if !node.text.is_empty() {
            parts.push(node.text.clone());
        }
        for &child in &node.children {
            let value = Self::string_value(nodes, child);
            if !value.is_empty() {
                parts.push(value);
            }
        }
        parts.join(" ")
    }

    fn descendants(nodes: &[Node], index: usize, out: &mut Vec<usize>) {
        for &child in &nodes[index].children {
            out.push(child);
            Self::descendants(nodes, child, out);
        }
    }

    fn tag_matches(node: &Node, tag: &str) -> bool {
        tag == "*" || node.tag.eq_ignore_ascii_case(tag)
    }

    fn satisfies(nodes: &[Node], index: usize, condition: &Condition) -> bool {
        match condition {
            Condition::Text { term_match, value } => {
                term_match.matches(&Self::string_value(nodes, index), value)
            }
            Condition::HasChild { tag, condition } => {
                nodes[index].children.iter().any(|&child| {
                    Self::tag_matches(&nodes[child], tag)
                        && condition
                            .as_deref()
                            .map_or(true, |inner| Self::satisfies(nodes, child, inner))
                })
            }
            Condition::All(conditions) => conditions
                .iter()
                .all(|c| Self::satisfies(nodes, index, c)),
            Condition::Any(conditions) => conditions
                .iter()
                .any(|c| Self::satisfies(nodes, index, c)),
        }
    }

    fn record(&self, action: DriverAction) {
        self.history.borrow_mut().push(action);
    }
}

impl Driver for MockDriver {
    fn find_elements(
        &self,
        within: Option<&ElementHandle>,
        selector: &Selector,
    ) -> PageResult<Vec<ElementHandle>> {
        self.queries.set(self.queries.get() + 1);
        self.release_pending();

        let scope = match within {
            Some(element) => self.index_of(element)?,
            None => ROOT,
        };
        let matched: Vec<usize> = {
            let nodes = self.nodes.borrow();
            let mut candidates = Vec::new();
            Self::descendants(&nodes, scope, &mut candidates);
            match selector {
                Selector::Path {
                    tag,
                    condition,
                    nth,
                } => {
                    let found = candidates.into_iter().filter(|&i| {
                        Self::tag_matches(&nodes[i], tag)
                            && condition
                                .as_ref()
                                .map_or(true, |c| Self::satisfies(&nodes, i, c))
                    });
                    match nth {
                        Some(n) => found.skip(*n).take(1).collect(),
                        None => found.collect(),
                    }
                }
                Selector::PartialLinkText(text) => candidates
                    .into_iter()
                    .filter(|&i| {
                        Self::tag_matches(&nodes[i], "a")
                            && TermMatch::Contains.matches(&Self::string_value(&nodes, i), text)
                    })
                    .collect(),
                Selector::XPath(xpath) => {
                    return Err(PageError::driver(format!(
                        "mock driver cannot evaluate raw XPath: {xpath}"
                    )))
                }
            }
        };
        Ok(matched.into_iter().map(|i| self.handle(i)).collect())
    }

    fn click(&self, element: &ElementHandle) -> PageResult<()> {
        self.index_of(element)?;
        self.record(DriverAction::Click(element.clone()));
        Ok(())
    }

    fn clear(&self, element: &ElementHandle) -> PageResult<()> {
        let index = self.index_of(element)?;
        self.nodes.borrow_mut()[index]
            .attributes
            .insert("value".to_string(), String::new());
        self.record(DriverAction::Clear(element.clone()));
        Ok(())
    }

    fn send_keys(&self, element: Option<&ElementHandle>, keys: &str) -> PageResult<()> {
        if let Some(element) = element {
            let index = self.index_of(element)?;
            self.nodes.borrow_mut()[index]
                .attributes
                .entry("value".to_string())
                .or_default()
                .push_str(keys);
        }
        self.record(DriverAction::SendKeys {
            target: element.cloned(),
            keys: keys.to_string(),
        });
        Ok(())
    }

    fn text(&self, element: &ElementHandle) -> PageResult<String> {
        let index = self.index_of(element)?;
        Ok(normalize_space(&Self::string_value(&self.nodes.borrow(), index)))
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> PageResult<Option<String>> {
        let index = self.index_of(element)?;
        Ok(self.nodes.borrow()[index].attributes.get(name).cloned())
    }
}
