//! Named cancelable events and listener storage
//!
//! Listeners attach to either a specific element or the document itself (the
//! window analog for root-level notifications). Dispatch snapshots the
//! matching callbacks before invoking them, so a listener may add or remove
//! listeners without deadlocking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

use crate::element::{ElementId, ScrollPosition};

/// Scroll notifications fired by [`Document::set_scroll`](crate::Document::set_scroll).
pub const SCROLL_EVENT: &str = "scroll";

/// Fired once by [`Document::emit_unload`](crate::Document::emit_unload) when
/// the document is about to go away.
pub const UNLOAD_EVENT: &str = "unload";

/// Callback invoked with the originating element and the event itself.
pub type ListenerCallback = Arc<dyn Fn(ElementId, &Event) + Send + Sync>;

/// Where a listener is attached and where an event is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The document itself (root scroll and lifecycle notifications).
    Document,
    /// A specific element.
    Element(ElementId),
}

/// A named notification with a scroll-position detail payload.
///
/// Cancelable events expose `prevent_default`; once any listener calls it,
/// the flag sticks for the rest of the dispatch.
#[derive(Debug)]
pub struct Event {
    name: String,
    position: ScrollPosition,
    cancelable: bool,
    canceled: AtomicBool,
}

impl Event {
    /// Create a cancelable event.
    pub fn cancelable(name: &str, position: ScrollPosition) -> Self {
        Self {
            name: name.to_string(),
            position,
            cancelable: true,
            canceled: AtomicBool::new(false),
        }
    }

    /// Create an event whose default cannot be prevented.
    pub fn non_cancelable(name: &str, position: ScrollPosition) -> Self {
        Self {
            cancelable: false,
            ..Self::cancelable(name, position)
        }
    }

    /// The event name, e.g. `"scroll"` or `"scroll-keep:store"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The scroll position carried by this event.
    pub fn position(&self) -> ScrollPosition {
        self.position
    }

    /// Mark the event as canceled. Ignored for non-cancelable events.
    pub fn prevent_default(&self) {
        if self.cancelable {
            self.canceled.store(true, Ordering::SeqCst);
        }
    }

    /// Whether any listener canceled the event.
    pub fn default_prevented(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

/// Handle for removing a previously added listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    by_key: FxHashMap<(EventTarget, String), Vec<(ListenerId, ListenerCallback)>>,
    index: FxHashMap<ListenerId, (EventTarget, String)>,
}

/// Listener registry shared by a document.
#[derive(Default)]
pub struct EventListeners {
    inner: RwLock<ListenerTable>,
}

impl std::fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .inner
            .read()
            .map(|table| table.index.len())
            .unwrap_or(0);
        f.debug_struct("EventListeners")
            .field("listeners", &count)
            .finish()
    }
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `name` events on `target`.
    pub fn add(&self, target: EventTarget, name: &str, callback: ListenerCallback) -> ListenerId {
        let mut table = self.inner.write().unwrap();
        table.next_id += 1;
        let id = ListenerId(table.next_id);
        let key = (target, name.to_string());
        table
            .by_key
            .entry(key.clone())
            .or_default()
            .push((id, callback));
        table.index.insert(id, key);
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut table = self.inner.write().unwrap();
        let Some(key) = table.index.remove(&id) else {
            return false;
        };
        if let Some(list) = table.by_key.get_mut(&key) {
            list.retain(|(lid, _)| *lid != id);
            if list.is_empty() {
                table.by_key.remove(&key);
            }
        }
        true
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.inner.read().map(|t| t.index.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every listener registered for `(target, name)`.
    ///
    /// Returns `false` when a listener prevented the event's default.
    pub fn dispatch(&self, target: EventTarget, origin: ElementId, event: &Event) -> bool {
        let callbacks: Vec<ListenerCallback> = {
            let table = self.inner.read().unwrap();
            table
                .by_key
                .get(&(target, event.name().to_string()))
                .map(|list| list.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };
        for callback in callbacks {
            callback(origin, event);
        }
        !event.default_prevented()
    }
}
