//! Trigger dispatch.

use super::{TriggerContext, TriggerDeclaration, TriggerEvents, TriggerScope};
use crate::component::Component;
use crate::result::PageResult;

/// Collect the declarations that react to `event` on `component`, in run order.
///
/// Own declarations come first, then descendant-scoped declarations of each
/// ancestor from the nearest up; a stable sort by priority keeps that order
/// among equal priorities.
#[must_use]
pub fn applicable(component: &Component, event: TriggerEvents) -> Vec<TriggerDeclaration> {
    let mut declarations: Vec<TriggerDeclaration> = component
        .triggers()
        .iter()
        .filter(|declaration| declaration.handles(event))
        .cloned()
        .collect();
    for ancestor in component.ancestors() {
        declarations.extend(
            ancestor
                .triggers()
                .iter()
                .filter(|declaration| {
                    declaration.applies_to == TriggerScope::SelfAndDescendants
                        && declaration.handles(event)
                })
                .cloned(),
        );
    }
    declarations.sort_by(|a, b| b.priority.cmp(&a.priority));
    declarations
}

/// Fire `event` on `component`.
///
/// Triggers run synchronously on the calling thread. A trigger may act on
/// components and fire further events; the first error aborts the firing and
/// is returned unchanged.
pub fn fire(component: &Component, event: TriggerEvents) -> PageResult<()> {
    let declarations = applicable(component, event);
    if declarations.is_empty() {
        return Ok(());
    }
    tracing::debug!(
        component = %component.describe(),
        event = %event,
        count = declarations.len(),
        "firing triggers"
    );
    for declaration in &declarations {
        let context = TriggerContext::new(event, component)?;
        declaration.behavior().execute(&context)?;
    }
    Ok(())
}
