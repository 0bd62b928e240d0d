//! Triggers: behaviors bound to component lifecycle events.
//!
//! A [`TriggerDeclaration`] pairs a [`Trigger`] with the events it reacts to,
//! a [`TriggerPriority`] and a [`TriggerScope`]. Declarations are fixed when a
//! component is built: each control type registers its defaults through
//! [`Control::default_triggers`](crate::Control::default_triggers), and
//! instances can add more through the control builder.
//!
//! ```text
//! click()
//!   ├─ fire(BEFORE_CLICK) ── own triggers + ancestors' descendant-scoped ones
//!   │                        sorted by priority (stable), run in order
//!   ├─ driver.click()
//!   └─ fire(AFTER_CLICK)
//! ```

mod builtin;
mod dispatch;

pub use builtin::{ClickParent, PressKeys, Screenshot, VerifyHeading};
pub use dispatch::{applicable, fire};

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::rc::Rc;

use crate::component::Component;
use crate::driver::Driver;
use crate::log::Logger;
use crate::result::PageResult;

/// Set of lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TriggerEvents(u16);

impl TriggerEvents {
    /// No events
    pub const NONE: Self = Self(0);
    /// Component initialized
    pub const INIT: Self = Self(1);
    /// Page object initialized
    pub const PAGE_OBJECT_INIT: Self = Self(1 << 1);
    /// Before reading a component's value
    pub const BEFORE_ACCESS: Self = Self(1 << 2);
    /// After reading a component's value
    pub const AFTER_ACCESS: Self = Self(1 << 3);
    /// Before a click
    pub const BEFORE_CLICK: Self = Self(1 << 4);
    /// After a click
    pub const AFTER_CLICK: Self = Self(1 << 5);
    /// Before setting a value
    pub const BEFORE_SET: Self = Self(1 << 6);
    /// After setting a value
    pub const AFTER_SET: Self = Self(1 << 7);

    /// Before any user action
    pub const BEFORE_ANY_ACTION: Self = Self(Self::BEFORE_CLICK.0 | Self::BEFORE_SET.0);
    /// After any user action
    pub const AFTER_ANY_ACTION: Self = Self(Self::AFTER_CLICK.0 | Self::AFTER_SET.0);
    /// Before and after a click
    pub const BEFORE_AND_AFTER_CLICK: Self = Self(Self::BEFORE_CLICK.0 | Self::AFTER_CLICK.0);

    const NAMES: [(Self, &'static str); 8] = [
        (Self::INIT, "Init"),
        (Self::PAGE_OBJECT_INIT, "PageObjectInit"),
        (Self::BEFORE_ACCESS, "BeforeAccess"),
        (Self::AFTER_ACCESS, "AfterAccess"),
        (Self::BEFORE_CLICK, "BeforeClick"),
        (Self::AFTER_CLICK, "AfterClick"),
        (Self::BEFORE_SET, "BeforeSet"),
        (Self::AFTER_SET, "AfterSet"),
    ];

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether the sets share any event
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether every event of `other` is in this set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the set is empty
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TriggerEvents {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TriggerEvents {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for TriggerEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(event, _)| self.contains(*event))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}

/// Execution priority; higher runs first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TriggerPriority {
    /// Runs last
    Lowest,
    /// Below default
    Low,
    /// Default
    #[default]
    Medium,
    /// Above default
    High,
    /// Runs first
    Highest,
}

/// Which components a declaration applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriggerScope {
    /// Only the declaring component
    #[default]
    SelfOnly,
    /// The declaring component and everything below it
    SelfAndDescendants,
}

/// Per-firing execution context
#[derive(Debug)]
pub struct TriggerContext<'a> {
    /// The event being fired
    pub event: TriggerEvents,
    /// Component the event fired on
    pub component: &'a Component,
    /// Root page object of the component
    pub owner: Component,
    /// Browser driver
    pub driver: Rc<dyn Driver>,
    /// Logger
    pub log: Rc<dyn Logger>,
}

impl<'a> TriggerContext<'a> {
    /// Build a context for `event` firing on `component`
    pub fn new(event: TriggerEvents, component: &'a Component) -> PageResult<Self> {
        Ok(Self {
            event,
            component,
            owner: component.owner()?,
            driver: component.driver_handle(),
            log: component.log_handle(),
        })
    }
}

/// Behavior executed when a declared event fires
pub trait Trigger: fmt::Debug {
    /// Events used when a declaration does not override them
    fn default_events(&self) -> TriggerEvents;

    /// Priority used when a declaration does not override it
    fn default_priority(&self) -> TriggerPriority {
        TriggerPriority::Medium
    }

    /// Run the behavior
    fn execute(&self, context: &TriggerContext<'_>) -> PageResult<()>;
}

/// A trigger bound to events, priority and scope
#[derive(Debug, Clone)]
pub struct TriggerDeclaration {
    /// Events the trigger reacts to
    pub on: TriggerEvents,
    /// Ordering among triggers of the same firing
    pub priority: TriggerPriority,
    /// Components the declaration applies to
    pub applies_to: TriggerScope,
    behavior: Rc<dyn Trigger>,
}

impl TriggerDeclaration {
    /// Declare `trigger` with its default events and priority
    #[must_use]
    pub fn new<T: Trigger + 'static>(trigger: T) -> Self {
        Self {
            on: trigger.default_events(),
            priority: trigger.default_priority(),
            applies_to: TriggerScope::SelfOnly,
            behavior: Rc::new(trigger),
        }
    }

    /// Declare a closure reacting to `on`
    #[must_use]
    pub fn from_fn<F>(on: TriggerEvents, f: F) -> Self
    where
        F: Fn(&TriggerContext<'_>) -> PageResult<()> + 'static,
    {
        Self::new(FnTrigger {
            on,
            f: Box::new(f),
        })
    }

    /// Override the events
    #[must_use]
    pub const fn on(mut self, events: TriggerEvents) -> Self {
        self.on = events;
        self
    }

    /// Override the priority
    #[must_use]
    pub const fn priority(mut self, priority: TriggerPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Override the applicability scope
    #[must_use]
    pub const fn applies_to(mut self, scope: TriggerScope) -> Self {
        self.applies_to = scope;
        self
    }

    /// Whether this declaration reacts to `event`
    #[must_use]
    pub const fn handles(&self, event: TriggerEvents) -> bool {
        self.on.intersects(event)
    }

    /// The behavior
    #[must_use]
    pub fn behavior(&self) -> &dyn Trigger {
        &*self.behavior
    }
}

impl<T: Trigger + 'static> From<T> for TriggerDeclaration {
    fn from(trigger: T) -> Self {
        Self::new(trigger)
    }
}

type TriggerFn = dyn Fn(&TriggerContext<'_>) -> PageResult<()>;

/// Trigger backed by a closure
pub struct FnTrigger {
    on: TriggerEvents,
    f: Box<TriggerFn>,
}

impl fmt::Debug for FnTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTrigger").field("on", &self.on).finish_non_exhaustive()
    }
}

impl Trigger for FnTrigger {
    fn default_events(&self) -> TriggerEvents {
        self.on
    }

    fn execute(&self, context: &TriggerContext<'_>) -> PageResult<()> {
        (self.f)(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod events_tests {
        use super::*;

        #[test]
        fn test_composites() {
            assert!(TriggerEvents::BEFORE_ANY_ACTION.intersects(TriggerEvents::BEFORE_CLICK));
            assert!(TriggerEvents::BEFORE_ANY_ACTION.intersects(TriggerEvents::BEFORE_SET));
            assert!(!TriggerEvents::BEFORE_ANY_ACTION.intersects(TriggerEvents::AFTER_CLICK));
            assert!(TriggerEvents::BEFORE_AND_AFTER_CLICK.contains(TriggerEvents::AFTER_CLICK));
            assert_eq!(
                TriggerEvents::AFTER_CLICK | TriggerEvents::AFTER_SET,
                TriggerEvents::AFTER_ANY_ACTION
            );
        }

        #[test]
        fn test_display() {
            assert_eq!(TriggerEvents::BEFORE_CLICK.to_string(), "BeforeClick");
            assert_eq!(
                TriggerEvents::BEFORE_ANY_ACTION.to_string(),
                "BeforeClick|BeforeSet"
            );
            assert_eq!(TriggerEvents::NONE.to_string(), "None");
        }

        #[test]
        fn test_bitor_assign() {
            let mut events = TriggerEvents::NONE;
            events |= TriggerEvents::INIT;
            assert!(events.contains(TriggerEvents::INIT));
            assert_eq!(events.bits(), 1);
        }
    }

    mod declaration_tests {
        use super::*;

        #[test]
        fn test_priority_order() {
            assert!(TriggerPriority::Highest > TriggerPriority::High);
            assert!(TriggerPriority::High > TriggerPriority::Medium);
            assert!(TriggerPriority::Low > TriggerPriority::Lowest);
            assert_eq!(TriggerPriority::default(), TriggerPriority::Medium);
        }

        #[test]
        fn test_defaults_from_trigger() {
            let declaration = TriggerDeclaration::new(Screenshot::new());
            assert_eq!(declaration.on, TriggerEvents::BEFORE_CLICK);
            assert_eq!(declaration.priority, TriggerPriority::Medium);
            assert_eq!(declaration.applies_to, TriggerScope::SelfOnly);
        }

        #[test]
        fn test_overrides() {
            let declaration: TriggerDeclaration = PressKeys::new("\n").into();
            let declaration = declaration
                .on(TriggerEvents::AFTER_CLICK)
                .priority(TriggerPriority::High)
                .applies_to(TriggerScope::SelfAndDescendants);
            assert!(declaration.handles(TriggerEvents::AFTER_CLICK));
            assert!(!declaration.handles(TriggerEvents::AFTER_SET));
            assert_eq!(declaration.priority, TriggerPriority::High);
        }
    }
}
