//! Table control with typed rows.
//!
//! Rows are created on demand and bound to one locator each:
//!
//! - [`Table::first_row`] and [`Table::row`] resolve lazily against the live
//!   table on every access
//! - [`Table::rows`] and [`Table::row_where`] enumerate the rows present now
//!   and bind each to its element
//!
//! A row that did not match anything is still returned; resolving it yields
//! `None` in safe mode and `NotFound` otherwise.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assertion::poll_until;
use crate::component::{Component, Control};
use crate::config::TableLayout;
use crate::controls::{Link, Text};
use crate::driver::ElementHandle;
use crate::locator::{ScopeLocator, SearchOptions};
use crate::naming::{humanize_list, ordinalize, pluralize, singularize};
use crate::result::{PageError, PageResult};
use crate::selector::{row_element_name, By, Condition, Selector, TermMatch};

/// Item kind names used in table messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Singular item kind ("employee"); derived from the table name when unset
    pub item_kind: Option<String>,
    /// Plural item kind ("employees"); derived from the item kind when unset
    pub item_kind_plural: Option<String>,
}

impl TableSettings {
    /// Explicit item kind; the plural is derived
    #[must_use]
    pub fn item_kind(kind: impl Into<String>) -> Self {
        Self {
            item_kind: Some(kind.into()),
            item_kind_plural: None,
        }
    }

    /// Set the plural item kind
    #[must_use]
    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.item_kind_plural = Some(plural.into());
        self
    }
}

/// Table whose rows are `R` controls
pub struct Table<R = TableRow> {
    component: Component,
    settings: TableSettings,
    _row: PhantomData<fn() -> R>,
}

impl<R> fmt::Debug for Table<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("component", &self.component)
            .field("settings", &self.settings)
            .finish()
    }
}

impl<R> Clone for Table<R> {
    fn clone(&self) -> Self {
        Self {
            component: self.component.clone(),
            settings: self.settings.clone(),
            _row: PhantomData,
        }
    }
}

impl<R: Control> Control for Table<R> {
    const KIND: &'static str = "table";

    fn from_component(component: Component) -> Self {
        Self {
            component,
            settings: TableSettings::default(),
            _row: PhantomData,
        }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl<R: Control + 'static> Table<R> {
    /// Replace the settings
    #[must_use]
    pub fn with_settings(mut self, settings: TableSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current settings
    #[must_use]
    pub const fn settings(&self) -> &TableSettings {
        &self.settings
    }

    /// Singular item kind
    #[must_use]
    pub fn item_kind(&self) -> String {
        self.settings
            .item_kind
            .clone()
            .unwrap_or_else(|| singularize(self.component.name()).to_lowercase())
    }

    /// Plural item kind
    #[must_use]
    pub fn item_kind_plural(&self) -> String {
        self.settings
            .item_kind_plural
            .clone()
            .unwrap_or_else(|| pluralize(&self.item_kind()))
    }

    fn layout(&self) -> &TableLayout {
        &self.component.config().table
    }

    fn data_row(&self) -> Selector {
        let layout = self.layout();
        Selector::path(layout.row_tag.as_str())
            .with_condition(Condition::has_child(layout.cell_tag.as_str()))
    }

    fn rows_containing(&self, name: &str) -> By {
        let layout = self.layout();
        By::from_selector(
            Selector::path(layout.row_tag.as_str()).with_condition(Condition::All(vec![
                Condition::has_child(layout.cell_tag.as_str()),
                Condition::contains(name),
            ])),
        )
        .named(name)
        .kind(self.item_kind())
    }

    fn create_row(&self, name: impl Into<String>, by: By) -> PageResult<R> {
        self.component
            .control::<R>(name, by)
            .kind(self.item_kind())
            .transient()
            .build()
    }

    fn bind_row(&self, name: impl Into<String>, locator: ScopeLocator) -> PageResult<R> {
        self.component
            .control_at::<R>(name, locator)
            .kind(self.item_kind())
            .build()
    }

    /// Assert that a header containing each of `names` exists, in any order
    pub fn verify_columns<S: AsRef<str>>(&self, names: &[S]) -> PageResult<()> {
        let description = self.component.describe();
        let section = format!("Verify {description} columns {}", humanize_list(names));
        self.component.in_section(&section, || {
            let header_tag = self.layout().header_tag.as_str();
            let mut missing = Vec::new();
            for name in names {
                let name = name.as_ref();
                let header = By::content(header_tag, TermMatch::Contains, name)
                    .table_column()
                    .strict(false)
                    .safely();
                if self.component.find_one(&header)?.is_none() {
                    missing.push(name);
                }
            }
            let message = format!(
                "Expected {description} to have columns {}, but missing {}",
                humanize_list(names),
                humanize_list(&missing)
            );
            self.component.asserter().is_true(missing.is_empty(), &message)
        })
    }

    /// Assert that exactly one row contains `name` and has each
    /// `(column, value)` pair, matching column headers exactly.
    ///
    /// A header that is missing or duplicated is an error; a wrong number of
    /// matching rows is an assertion failure.
    pub fn row_exists(&self, name: &str, columns: &[(&str, &str)]) -> PageResult<()> {
        let kind = self.item_kind();
        let criteria = if columns.is_empty() {
            String::new()
        } else {
            let pairs: Vec<String> = columns
                .iter()
                .map(|(column, value)| format!("{column}: '{value}'"))
                .collect();
            format!(" with {}", pairs.join(", "))
        };
        self.component
            .in_section(&format!("Verify '{name}' {kind} exists"), || {
                let expected = columns
                    .iter()
                    .map(|(column, value)| Ok((self.column_index(column)?, *value)))
                    .collect::<PageResult<Vec<_>>>()?;

                let mut count = 0;
                for row in self.find_items(name)? {
                    if self.row_matches(&row, &expected)? {
                        count += 1;
                    }
                }
                let message =
                    format!("Expected exactly one '{name}' {kind}{criteria}, found {count}");
                self.component.asserter().is_true(count == 1, &message)
            })
    }

    /// [`row_exists`](Self::row_exists) for a single column
    pub fn row_exists_with(&self, name: &str, column: &str, value: &str) -> PageResult<()> {
        self.row_exists(name, &[(column, value)])
    }

    fn row_matches(&self, row: &ElementHandle, expected: &[(usize, &str)]) -> PageResult<bool> {
        for (index, value) in expected {
            if !TermMatch::Equals.matches(&self.column_value(row, *index)?, value) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Zero-based index of the header whose text equals `name`
    pub fn column_index(&self, name: &str) -> PageResult<usize> {
        let headers = self
            .component
            .find_all(&By::tag(self.layout().header_tag.as_str()).table_column())?;
        let driver = self.component.driver();
        let mut matching = Vec::new();
        for (index, header) in headers.iter().enumerate() {
            if TermMatch::Equals.matches(&driver.text(header)?, name) {
                matching.push(index);
            }
        }
        match matching.as_slice() {
            [index] => Ok(*index),
            [] => Err(PageError::not_found("table column", name)),
            many => Err(PageError::Ambiguous {
                kind: "table column".to_string(),
                name: name.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Text of the cell at `index` in `row`
    pub fn column_value(&self, row: &ElementHandle, index: usize) -> PageResult<String> {
        let driver = self.component.driver();
        let cells = driver.find_elements(Some(row), &Selector::path(self.layout().cell_tag.as_str()))?;
        match cells.get(index) {
            Some(cell) => driver.text(cell),
            None => Err(PageError::not_found(
                "table cell",
                format!("{} cell", ordinalize(index + 1)),
            )),
        }
    }

    /// Row elements whose text contains `name`
    pub fn find_items(&self, name: &str) -> PageResult<Vec<ElementHandle>> {
        self.component.find_all(&self.rows_containing(name))
    }

    /// First row element containing `name`; a miss is reported to the asserter
    pub fn find_item(&self, name: &str) -> PageResult<Option<ElementHandle>> {
        let item = self.find_items(name)?.into_iter().next();
        let message = format!("Failed to find '{name}' {}", self.item_kind());
        self.component.asserter().not_null(item, &message)
    }

    /// Row containing `name`, resolved on access
    pub fn get_item(&self, name: &str) -> PageResult<R> {
        self.create_row(name, self.rows_containing(name).strict(false))
    }

    /// Click the link containing `link_text` in the row containing `name`
    pub fn click_item_link(&self, name: &str, link_text: &str) -> PageResult<()> {
        let item = self.get_item(name)?;
        let link: Link = item
            .component()
            .control(link_text, By::partial_link_text(link_text))
            .transient()
            .build()?;
        link.click()
    }

    /// Number of data rows
    pub fn rows_count(&self) -> PageResult<usize> {
        Ok(self
            .component
            .find_all(&By::from_selector(self.data_row()))?
            .len())
    }

    /// First data row
    pub fn first_row(&self) -> PageResult<R> {
        self.create_row("first row", By::from_selector(self.data_row()).strict(false))
    }

    /// Row whose cells together contain every value of `values`
    pub fn row<S: AsRef<str>>(&self, values: &[S]) -> PageResult<R> {
        let layout = self.layout();
        let cell = layout.cell_tag.as_str();
        let condition = if values.is_empty() {
            Condition::has_child(cell)
        } else {
            Condition::All(
                values
                    .iter()
                    .map(|v| Condition::has_child_where(cell, Condition::contains(v.as_ref())))
                    .collect(),
            )
        };
        let name = row_element_name(values).unwrap_or_else(|| "row".to_string());
        let by = By::from_selector(
            Selector::path(layout.row_tag.as_str()).with_condition(condition),
        );
        self.create_row(name, by)
    }

    /// Every data row present now, each bound to its element
    pub fn rows(&self) -> PageResult<Vec<R>> {
        self.rows_with(&self.component.search_options())
    }

    fn rows_with(&self, options: &SearchOptions) -> PageResult<Vec<R>> {
        let elements = self
            .component
            .find_all_with(&By::from_selector(self.data_row()), options)?;
        elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                self.bind_row(
                    format!("{} row", ordinalize(index + 1)),
                    ScopeLocator::fixed(element),
                )
            })
            .collect()
    }

    /// First row, in document order, for which `predicate` holds.
    ///
    /// When no row matches, the returned row searches again each time it is
    /// resolved: safe resolution yields `None`, immediate resolution fails
    /// with `NotFound`.
    pub fn row_where<P>(&self, predicate: P) -> PageResult<R>
    where
        P: Fn(&R) -> PageResult<bool> + 'static,
    {
        for row in self.rows()? {
            if predicate(&row)? {
                return Ok(row);
            }
        }

        let name = "row matching predicate";
        let kind = self.item_kind();
        let table = self.component.downgrade();
        let settings = self.settings.clone();
        let locator = ScopeLocator::dynamic(move |options| {
            let table = Self::from_component(table.upgrade()?).with_settings(settings.clone());
            let attempt = options.with_timeout(Duration::ZERO).and_safely();
            let outcome = poll_until(&options.retry_config(), || {
                for row in table.rows_with(&attempt)? {
                    if predicate(&row)? {
                        return row.component().scope_with(&attempt);
                    }
                }
                Ok(None)
            })?;
            match outcome.value {
                Some(element) => Ok(Some(element)),
                None if options.safely => Ok(None),
                None => Err(PageError::not_found(kind.clone(), name)),
            }
        });
        self.bind_row(name, locator)
    }
}

/// Default row control
#[derive(Debug, Clone)]
pub struct TableRow {
    component: Component,
}

impl Control for TableRow {
    const KIND: &'static str = "table row";

    fn from_component(component: Component) -> Self {
        Self { component }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl TableRow {
    /// Cell at zero-based `index`
    pub fn cell(&self, index: usize) -> PageResult<Text> {
        let tag = self.component.config().table.cell_tag.clone();
        self.component
            .control(
                format!("{} cell", ordinalize(index + 1)),
                By::from_selector(Selector::path(tag).nth(index)),
            )
            .kind("table cell")
            .transient()
            .build()
    }

    /// Text of every cell
    pub fn cells_text(&self) -> PageResult<Vec<String>> {
        let tag = self.component.config().table.cell_tag.clone();
        let driver = self.component.driver();
        self.component
            .find_all(&By::tag(tag))?
            .iter()
            .map(|cell| driver.text(cell))
            .collect()
    }

    /// Visible text of the whole row
    pub fn text(&self) -> PageResult<String> {
        self.component.text()
    }

    /// Click the row
    pub fn click(&self) -> PageResult<()> {
        self.component.click()
    }

    /// Whether the row resolves, without failing when it does not
    pub fn exists(&self) -> PageResult<bool> {
        self.component.exists()
    }
}
