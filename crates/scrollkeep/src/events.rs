//! Store/restore event dispatch
//!
//! Every store and restore is announced before it takes effect, through two
//! sinks: the container's own event listeners first (so generic listeners
//! observe intent before any handler side effect), then the matching handler
//! from the options table. Either sink may cancel the event, which vetoes
//! the underlying effect.

use scrollkeep_core::{Document, ElementId, Event, EventTarget, ScrollPosition};

use crate::settings::Settings;

/// Namespace prefix for scroll tracking notifications.
pub const EVENT_PREFIX: &str = "scroll-keep";

/// Fired on a container before its offset is committed.
pub const STORE_EVENT: &str = "scroll-keep:store";

/// Fired on a container before a stored offset is applied.
pub const RESTORE_EVENT: &str = "scroll-keep:restore";

/// The two cancelable notifications in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Store,
    Restore,
}

impl EventKind {
    /// The namespaced event name dispatched on the container.
    pub fn name(self) -> &'static str {
        match self {
            Self::Store => STORE_EVENT,
            Self::Restore => RESTORE_EVENT,
        }
    }
}

/// Announce a store or restore on `el` and report whether it may proceed.
///
/// Both sinks always run; the return value is `false` when either canceled
/// the event.
pub(crate) fn dispatch(
    doc: &Document,
    el: ElementId,
    kind: EventKind,
    position: ScrollPosition,
    settings: &Settings,
) -> bool {
    let event = Event::cancelable(kind.name(), position);

    doc.dispatch_event(EventTarget::Element(el), el, &event);

    if let Some(handler) = settings.events.get(kind) {
        handler(el, &event);
    }

    !event.default_prevented()
}
