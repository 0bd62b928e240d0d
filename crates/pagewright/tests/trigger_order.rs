//! Trigger ordering and propagation
//!
//! Triggers run highest priority first, keep declaration order among equal
//! priorities, inherit descendant-scoped triggers from ancestors, may fire
//! nested events, and stop at the first error.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use pagewright::prelude::*;
use pagewright::trigger::applicable;

type Journal = Rc<RefCell<Vec<String>>>;

fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

fn record(journal: &Journal, label: &str, on: TriggerEvents) -> TriggerDeclaration {
    let journal = Rc::clone(journal);
    let label = label.to_string();
    TriggerDeclaration::from_fn(on, move |_| {
        journal.borrow_mut().push(label.clone());
        Ok(())
    })
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}

fn document() -> Rc<MockDriver> {
    Rc::new(MockDriver::with_document([MockElement::new("form").children([
        MockElement::new("button").with_text("Save"),
        MockElement::new("button").with_text("Cancel"),
        MockElement::new("input"),
    ])]))
}

fn page(driver: &Rc<MockDriver>, name: &str) -> PageObject {
    PageObject::builder(name, driver.clone())
        .logger(Rc::new(RecordingLogger::new()))
        .config(PageConfig::default().with_retry_timeout(Duration::ZERO))
        .build()
        .unwrap()
}

fn button_by_text(text: &str) -> By {
    By::content("button", TermMatch::Equals, text)
}

// =============================================================================
// Priority
// =============================================================================

#[test]
fn test_priority_orders_execution() {
    let driver = document();
    let page = page(&driver, "Editor");
    let log = journal();
    let save: Button = page
        .control("Save", button_by_text("Save"))
        .with_trigger(
            record(&log, "low", TriggerEvents::BEFORE_CLICK).priority(TriggerPriority::Low),
        )
        .with_trigger(
            record(&log, "high", TriggerEvents::BEFORE_CLICK).priority(TriggerPriority::High),
        )
        .with_trigger(record(&log, "medium", TriggerEvents::BEFORE_CLICK))
        .build()
        .unwrap();

    save.click().unwrap();

    assert_eq!(entries(&log), vec!["high", "medium", "low"]);
}

#[test]
fn test_equal_priorities_keep_declaration_order() {
    let driver = document();
    let page = page(&driver, "Editor");
    let log = journal();
    let save: Button = page
        .control("Save", button_by_text("Save"))
        .with_trigger(record(&log, "a", TriggerEvents::BEFORE_CLICK))
        .with_trigger(record(&log, "b", TriggerEvents::BEFORE_CLICK))
        .with_trigger(
            record(&log, "c", TriggerEvents::BEFORE_CLICK).priority(TriggerPriority::Highest),
        )
        .with_trigger(record(&log, "d", TriggerEvents::BEFORE_CLICK))
        .build()
        .unwrap();

    save.click().unwrap();

    assert_eq!(entries(&log), vec!["c", "a", "b", "d"]);
}

#[test]
fn test_before_and_after_bracket_the_action() {
    let driver = document();
    let page = page(&driver, "Editor");
    let log = journal();
    let save: Button = page
        .control("Save", button_by_text("Save"))
        .with_trigger(record(&log, "after", TriggerEvents::AFTER_CLICK))
        .with_trigger(record(&log, "before", TriggerEvents::BEFORE_CLICK))
        .with_trigger(record(&log, "either", TriggerEvents::BEFORE_AND_AFTER_CLICK))
        .build()
        .unwrap();

    save.click().unwrap();

    assert_eq!(entries(&log), vec!["before", "either", "after", "either"]);
    assert_eq!(driver.clicks().len(), 1);
}

// =============================================================================
// Scope
// =============================================================================

#[test]
fn test_ancestor_triggers_apply_to_descendants() {
    let driver = document();
    let log = journal();
    let page = PageObject::builder("Editor", driver.clone())
        .logger(Rc::new(RecordingLogger::new()))
        .config(PageConfig::default().with_retry_timeout(Duration::ZERO))
        .trigger(
            record(&log, "page-wide", TriggerEvents::BEFORE_CLICK)
                .applies_to(TriggerScope::SelfAndDescendants),
        )
        .trigger(record(&log, "page-only", TriggerEvents::BEFORE_CLICK))
        .build()
        .unwrap();
    let form: Text = page.control("Form", By::tag("form")).build().unwrap();
    let save: Button = form
        .component()
        .control("Save", button_by_text("Save"))
        .with_trigger(record(&log, "own", TriggerEvents::BEFORE_CLICK))
        .build()
        .unwrap();

    save.click().unwrap();

    assert_eq!(entries(&log), vec!["own", "page-wide"]);
    let labels = applicable(save.component(), TriggerEvents::AFTER_CLICK);
    assert!(labels.is_empty());
}

#[test]
fn test_higher_priority_ancestor_trigger_runs_first() {
    let driver = document();
    let log = journal();
    let page = PageObject::builder("Editor", driver.clone())
        .logger(Rc::new(RecordingLogger::new()))
        .config(PageConfig::default().with_retry_timeout(Duration::ZERO))
        .trigger(
            record(&log, "audit", TriggerEvents::BEFORE_ANY_ACTION)
                .priority(TriggerPriority::Highest)
                .applies_to(TriggerScope::SelfAndDescendants),
        )
        .build()
        .unwrap();
    let query: TextInput = page
        .control("Query", By::tag("input"))
        .with_trigger(record(&log, "own", TriggerEvents::BEFORE_SET))
        .build()
        .unwrap();

    query.set("rust").unwrap();

    assert_eq!(entries(&log), vec!["audit", "own"]);
}

// =============================================================================
// Re-entrancy
// =============================================================================

#[test]
fn test_trigger_may_act_on_other_components() {
    let driver = document();
    let page = page(&driver, "Editor");
    let log = journal();
    let cancel: Button = page
        .control("Cancel", button_by_text("Cancel"))
        .with_trigger(record(&log, "cancel: before click", TriggerEvents::BEFORE_CLICK))
        .build()
        .unwrap();
    let nested = cancel.component().clone();
    let save: Button = page
        .control("Save", button_by_text("Save"))
        .with_trigger(
            TriggerDeclaration::from_fn(TriggerEvents::BEFORE_CLICK, move |_| nested.click())
                .priority(TriggerPriority::High),
        )
        .with_trigger(record(&log, "save: before click", TriggerEvents::BEFORE_CLICK))
        .build()
        .unwrap();

    save.click().unwrap();

    assert_eq!(
        entries(&log),
        vec!["cancel: before click", "save: before click"]
    );
    let clicked: Vec<String> = driver
        .clicks()
        .iter()
        .map(|element| driver.text(element).unwrap())
        .collect();
    assert_eq!(clicked, vec!["Cancel", "Save"]);
}

#[test]
fn test_click_parent_fires_parent_triggers() {
    let driver = document();
    let page = page(&driver, "Editor");
    let log = journal();
    let form: Button = page
        .control("Form", By::tag("form"))
        .with_trigger(record(&log, "form: before click", TriggerEvents::BEFORE_CLICK))
        .build()
        .unwrap();
    let save: Button = form
        .component()
        .control("Save", button_by_text("Save"))
        .with_trigger(ClickParent::new())
        .with_trigger(
            record(&log, "save: before click", TriggerEvents::BEFORE_CLICK)
                .priority(TriggerPriority::Low),
        )
        .build()
        .unwrap();

    save.click().unwrap();

    assert_eq!(
        entries(&log),
        vec!["form: before click", "save: before click"]
    );
    let tags: Vec<String> = driver
        .clicks()
        .into_iter()
        .map(|element| element.tag_name)
        .collect();
    assert_eq!(tags, vec!["form", "button"]);
}

// =============================================================================
// Failure propagation
// =============================================================================

#[test]
fn test_first_error_aborts_remaining_triggers() {
    let driver = document();
    let page = page(&driver, "Editor");
    let log = journal();
    let save: Button = page
        .control("Save", button_by_text("Save"))
        .with_trigger(
            TriggerDeclaration::from_fn(TriggerEvents::BEFORE_CLICK, |_| {
                Err(PageError::AssertionFailed {
                    message: "form is read-only".to_string(),
                })
            })
            .priority(TriggerPriority::High),
        )
        .with_trigger(record(&log, "never", TriggerEvents::BEFORE_CLICK))
        .with_trigger(record(&log, "never after", TriggerEvents::AFTER_CLICK))
        .build()
        .unwrap();

    let err = save.click().unwrap_err();

    assert!(matches!(
        err,
        PageError::AssertionFailed { ref message } if message == "form is read-only"
    ));
    assert!(entries(&log).is_empty());
    assert!(driver.clicks().is_empty());
}

#[test]
fn test_nested_error_propagates_unchanged() {
    let driver = document();
    let page = page(&driver, "Editor");
    let missing: Button = page
        .control("Delete", button_by_text("Delete"))
        .build()
        .unwrap();
    let nested = missing.component().clone();
    let save: Button = page
        .control("Save", button_by_text("Save"))
        .with_trigger(TriggerDeclaration::from_fn(
            TriggerEvents::BEFORE_CLICK,
            move |_| nested.click(),
        ))
        .build()
        .unwrap();

    let err = save.click().unwrap_err();

    assert_eq!(err.to_string(), "Unable to locate button: 'Delete'");
    assert!(driver.clicks().is_empty());
}

#[test]
fn test_init_failure_fails_the_build() {
    let driver = document();
    let result = PageObject::builder("Editor", driver)
        .logger(Rc::new(RecordingLogger::new()))
        .trigger(TriggerDeclaration::from_fn(
            TriggerEvents::PAGE_OBJECT_INIT,
            |_| Err(PageError::driver("browser closed")),
        ))
        .build();

    assert_eq!(result.unwrap_err().to_string(), "Driver error: browser closed");
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn test_context_exposes_event_component_and_owner() {
    let driver = document();
    let page = page(&driver, "Search Page");
    let seen = journal();
    let recorder = Rc::clone(&seen);
    let query: TextInput = page
        .control("Query", By::tag("input"))
        .with_trigger(TriggerDeclaration::from_fn(
            TriggerEvents::BEFORE_SET | TriggerEvents::AFTER_SET,
            move |context| {
                recorder.borrow_mut().push(format!(
                    "{} {} of {}",
                    context.event,
                    context.component.describe(),
                    context.owner.name()
                ));
                Ok(())
            },
        ))
        .build()
        .unwrap();

    query.set("pagewright").unwrap();

    assert_eq!(
        entries(&seen),
        vec![
            "BeforeSet 'Query' text input of Search Page",
            "AfterSet 'Query' text input of Search Page",
        ]
    );
}

#[test]
fn test_init_events_order_on_page_build() {
    let driver = document();
    let log = journal();
    PageObject::builder("Editor", driver)
        .logger(Rc::new(RecordingLogger::new()))
        .trigger(record(&log, "page object init", TriggerEvents::PAGE_OBJECT_INIT))
        .trigger(record(&log, "init", TriggerEvents::INIT))
        .build()
        .unwrap();

    assert_eq!(entries(&log), vec!["init", "page object init"]);
}
