//! Per-call configuration
//!
//! `Options` is the public builder handed to [`attach`](crate::ScrollKeeper::attach);
//! it lowers into the internal `Settings` carried through every store and
//! restore for the registration.

use std::sync::Arc;

use scrollkeep_core::{Document, ElementId, Event};

use crate::diag::Diag;
use crate::events::EventKind;

/// Handler invoked with the container and the dispatched event.
pub type EventHandler = Arc<dyn Fn(ElementId, &Event) + Send + Sync>;

/// Caller-supplied selector resolution, replacing the built-in resolver.
///
/// Returning `None` (or an empty string) means the element cannot be
/// tracked.
pub type SelectorResolver = Arc<dyn Fn(&Document, ElementId) -> Option<String> + Send + Sync>;

/// Handler table keyed by event kind.
#[derive(Clone, Default)]
pub struct Handlers {
    pub(crate) store: Option<EventHandler>,
    pub(crate) restore: Option<EventHandler>,
}

impl Handlers {
    pub(crate) fn get(&self, kind: EventKind) -> Option<&EventHandler> {
        match kind {
            EventKind::Store => self.store.as_ref(),
            EventKind::Restore => self.restore.as_ref(),
        }
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers")
            .field("store", &self.store.is_some())
            .field("restore", &self.restore.is_some())
            .finish()
    }
}

/// Options for one [`attach`](crate::ScrollKeeper::attach) call.
#[derive(Clone, Default)]
pub struct Options {
    debug: bool,
    events: Handlers,
    selector: Option<SelectorResolver>,
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("debug", &self.debug)
            .field("events", &self.events)
            .field("custom_selector", &self.selector.is_some())
            .finish()
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable diagnostic logging for this registration (default: off).
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Register a handler observing (and optionally vetoing) stores.
    pub fn on_store<F>(mut self, handler: F) -> Self
    where
        F: Fn(ElementId, &Event) + Send + Sync + 'static,
    {
        self.events.store = Some(Arc::new(handler));
        self
    }

    /// Register a handler observing (and optionally vetoing) restores.
    pub fn on_restore<F>(mut self, handler: F) -> Self
    where
        F: Fn(ElementId, &Event) + Send + Sync + 'static,
    {
        self.events.restore = Some(Arc::new(handler));
        self
    }

    /// Replace the built-in selector resolver.
    pub fn selector<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&Document, ElementId) -> Option<String> + Send + Sync + 'static,
    {
        self.selector = Some(Arc::new(resolver));
        self
    }

    pub(crate) fn into_settings(self) -> Settings {
        Settings {
            events: self.events,
            selector: self.selector,
            diag: Diag::new(self.debug),
        }
    }
}

/// Lowered options carried through every store/restore of a registration.
#[derive(Clone)]
pub(crate) struct Settings {
    pub(crate) events: Handlers,
    pub(crate) selector: Option<SelectorResolver>,
    pub(crate) diag: Diag,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("events", &self.events)
            .field("custom_selector", &self.selector.is_some())
            .field("diag", &self.diag)
            .finish()
    }
}
