//! Container registry and public entry point
//!
//! [`ScrollKeeper`] owns everything the tracker knows about a document's
//! containers: the identity-keyed side table of selectors and listener
//! handles, the marker attribute, the debounced scroll listeners, and the
//! one-time unload hook. Registration is idempotent; repeating an attach is
//! the supported way to re-trigger restoration after content replacement.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use rustc_hash::FxHashMap;
use scrollkeep_core::{
    Debouncer, Document, ElementId, EventTarget, ListenerId, SCROLL_EVENT, UNLOAD_EVENT,
};

use crate::error::ScrollKeepError;
use crate::restore::{self, PendingRestore};
use crate::selector::resolve_selector;
use crate::settings::{Options, Settings};
use crate::store;
use crate::target::{resolve_target, Target};

/// Marker attribute set on every tracked container.
///
/// Doubles as the idempotency guard and a public hook for styling and tests.
pub const MARKER_ATTRIBUTE: &str = "data-scroll-keep";

/// Quiescence window between the last scroll event and the store.
pub const SCROLL_DEBOUNCE: Duration = Duration::from_millis(150);

/// Side-table entry for one tracked container.
pub(crate) struct ContainerEntry {
    pub(crate) selector: String,
    scroll_listener: ListenerId,
    debouncer: Arc<Debouncer>,
    pub(crate) pending_restore: Option<PendingRestore>,
}

/// Tracks scrollable containers of one document and keeps their offsets in
/// sync with the session-history entry.
pub struct ScrollKeeper {
    doc: Arc<Document>,
    containers: Mutex<FxHashMap<ElementId, ContainerEntry>>,
    unload_hooked: AtomicBool,
    // Handed to listener and timer closures so they never keep the keeper
    // alive on their own
    pub(crate) weak_self: Weak<ScrollKeeper>,
}

impl std::fmt::Debug for ScrollKeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollKeeper")
            .field("containers", &self.containers.lock().unwrap().len())
            .field("unload_hooked", &self.unload_hooked.load(Ordering::SeqCst))
            .finish()
    }
}

impl ScrollKeeper {
    /// Create a keeper for the given document.
    pub fn new(doc: Arc<Document>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            doc,
            containers: Mutex::new(FxHashMap::default()),
            unload_hooked: AtomicBool::new(false),
            weak_self: weak.clone(),
        })
    }

    /// The document this keeper tracks.
    pub fn document(&self) -> Arc<Document> {
        Arc::clone(&self.doc)
    }

    /// Track every container the target resolves to and restore each one.
    ///
    /// Returns one handle per tracked container; an empty resolution is a
    /// logged no-op. Containers whose selector cannot be resolved are
    /// skipped with a diagnostic while the rest proceed.
    pub fn attach(&self, target: impl Into<Target>, options: Options) -> Vec<AttachHandle> {
        let settings = options.into_settings();
        let target = target.into();

        let resolved = resolve_target(&self.doc, &target, &settings);
        if resolved.is_empty() {
            settings.diag.error("target resolved to no containers");
            return Vec::new();
        }

        self.ensure_unload_hook();

        let mut handles = Vec::new();
        for el in resolved {
            match self.register(el, &settings) {
                Ok(()) => handles.push(AttachHandle {
                    keeper: self.weak_self.clone(),
                    element: el,
                }),
                Err(err) => settings.diag.error(&format!("cannot track container: {err}")),
            }
        }
        handles
    }

    /// Register one container: mark it, resolve its selector, attach the
    /// debounced scroll listener, and restore. Re-registering an already
    /// tracked container only repeats the restore pass.
    fn register(&self, el: ElementId, settings: &Settings) -> Result<(), ScrollKeepError> {
        if self.doc.has_attribute(el, MARKER_ATTRIBUTE) {
            settings.diag.log("container already tracked, restoring again");
            restore::restore(self, el, settings);
            return Ok(());
        }

        let selector = resolve_selector(&self.doc, el, settings)?;

        self.doc.set_attribute(el, MARKER_ATTRIBUTE, "");

        // Root scroll is observed at the document level, container scroll on
        // the element itself
        let listen_target = if el == self.doc.root() {
            EventTarget::Document
        } else {
            EventTarget::Element(el)
        };

        let debouncer = Arc::new(Debouncer::new(
            Arc::clone(self.doc.timers()),
            SCROLL_DEBOUNCE,
        ));
        let scroll_listener = {
            let keeper = self.weak_self.clone();
            let debouncer = Arc::clone(&debouncer);
            let selector = selector.clone();
            let settings = settings.clone();
            self.doc.add_event_listener(
                listen_target,
                SCROLL_EVENT,
                Arc::new(move |_, _| {
                    let keeper = keeper.clone();
                    let selector = selector.clone();
                    let settings = settings.clone();
                    debouncer.call(Arc::new(move || {
                        if let Some(keeper) = keeper.upgrade() {
                            store::store(&keeper.doc, el, &selector, &settings);
                        }
                    }));
                }),
            )
        };

        self.containers.lock().unwrap().insert(
            el,
            ContainerEntry {
                selector,
                scroll_listener,
                debouncer,
                pending_restore: None,
            },
        );

        restore::restore(self, el, settings);
        Ok(())
    }

    /// Stop tracking a container: detach its listener, cancel any pending
    /// waits, clear the marker. No-op if it was never registered.
    pub fn detach(&self, el: ElementId) {
        let Some(entry) = self.containers.lock().unwrap().remove(&el) else {
            return;
        };
        self.doc.remove_event_listener(entry.scroll_listener);
        entry.debouncer.cancel();
        if let Some(pending) = entry.pending_restore {
            pending.cancel(&self.doc);
        }
        self.doc.remove_attribute(el, MARKER_ATTRIBUTE);
    }

    /// Whether the container is currently tracked.
    pub fn is_registered(&self, el: ElementId) -> bool {
        self.containers.lock().unwrap().contains_key(&el)
    }

    /// Sweep every tracked container's current offset into one history
    /// write, skipping offsets that are zero on both axes.
    ///
    /// Runs automatically on the document's unload notification; exposed for
    /// hosts that need to flush earlier.
    pub fn store_all(&self) {
        store::store_all(self);
    }

    /// Snapshot of tracked containers and their selectors.
    pub(crate) fn registered(&self) -> Vec<(ElementId, String)> {
        self.containers
            .lock()
            .unwrap()
            .iter()
            .map(|(el, entry)| (*el, entry.selector.clone()))
            .collect()
    }

    pub(crate) fn selector_of(&self, el: ElementId) -> Option<String> {
        self.containers
            .lock()
            .unwrap()
            .get(&el)
            .map(|entry| entry.selector.clone())
    }

    pub(crate) fn set_pending_restore(&self, el: ElementId, pending: PendingRestore) {
        match self.containers.lock().unwrap().get_mut(&el) {
            Some(entry) => entry.pending_restore = Some(pending),
            None => pending.cancel(&self.doc),
        }
    }

    pub(crate) fn take_pending_restore(&self, el: ElementId) -> Option<PendingRestore> {
        self.containers
            .lock()
            .unwrap()
            .get_mut(&el)
            .and_then(|entry| entry.pending_restore.take())
    }

    pub(crate) fn cancel_pending_restore(&self, el: ElementId) {
        if let Some(pending) = self.take_pending_restore(el) {
            pending.cancel(&self.doc);
        }
    }

    /// Install the unload sweep exactly once per keeper.
    fn ensure_unload_hook(&self) {
        if self.unload_hooked.swap(true, Ordering::SeqCst) {
            return;
        }
        let keeper = self.weak_self.clone();
        self.doc.add_event_listener(
            EventTarget::Document,
            UNLOAD_EVENT,
            Arc::new(move |_, _| {
                if let Some(keeper) = keeper.upgrade() {
                    keeper.store_all();
                }
            }),
        );
    }
}

/// Handle returned per tracked container.
#[derive(Clone)]
pub struct AttachHandle {
    keeper: Weak<ScrollKeeper>,
    element: ElementId,
}

impl std::fmt::Debug for AttachHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachHandle")
            .field("element", &self.element)
            .finish()
    }
}

impl AttachHandle {
    /// The tracked container.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Stop tracking the container. No-op once the keeper is gone.
    pub fn destroy(&self) {
        if let Some(keeper) = self.keeper.upgrade() {
            keeper.detach(self.element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::STORE_EVENT;
    use scrollkeep_core::{LayoutSize, ScrollPosition};
    use std::sync::atomic::AtomicU32;

    fn tracked_panel() -> (Arc<Document>, Arc<ScrollKeeper>, ElementId) {
        let doc = Document::new();
        let body = doc.append_element(doc.root(), "body");
        let panel = doc.append_element(body, "div");
        doc.set_id(panel, "panel");
        doc.set_layout_size(panel, LayoutSize::new(300.0, 400.0));
        let keeper = ScrollKeeper::new(Arc::clone(&doc));
        (doc, keeper, panel)
    }

    #[test]
    fn test_attach_marks_and_registers() {
        let (doc, keeper, panel) = tracked_panel();

        let handles = keeper.attach(panel, Options::new());
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].element(), panel);
        assert!(doc.has_attribute(panel, MARKER_ATTRIBUTE));
        assert!(keeper.is_registered(panel));
    }

    #[test]
    fn test_scroll_is_debounced_and_stored() {
        let (doc, keeper, panel) = tracked_panel();
        keeper.attach(panel, Options::new());

        doc.set_scroll(panel, ScrollPosition::new(80.0, 0.0));
        assert!(crate::state::read_scroll_state(doc.history()).is_empty());

        doc.advance(SCROLL_DEBOUNCE);
        let state = crate::state::read_scroll_state(doc.history());
        assert_eq!(state.get("#panel"), Some(&ScrollPosition::new(80.0, 0.0)));
    }

    #[test]
    fn test_reattach_does_not_double_listen() {
        let (doc, keeper, panel) = tracked_panel();
        let store_events = Arc::new(AtomicU32::new(0));

        let c = Arc::clone(&store_events);
        doc.add_event_listener(
            EventTarget::Element(panel),
            STORE_EVENT,
            Arc::new(move |_, _| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );

        keeper.attach(panel, Options::new());
        keeper.attach(panel, Options::new());

        doc.set_scroll(panel, ScrollPosition::new(60.0, 0.0));
        doc.advance(SCROLL_DEBOUNCE);

        // A second listener would have produced a second store event
        assert_eq!(store_events.load(Ordering::SeqCst), 1);
        assert_eq!(doc.history().revision(), 1);
    }

    #[test]
    fn test_reattach_repeats_restore() {
        let (doc, keeper, panel) = tracked_panel();
        keeper.attach(panel, Options::new());

        doc.set_scroll(panel, ScrollPosition::new(120.0, 0.0));
        doc.advance(SCROLL_DEBOUNCE);

        // Host replaces content and resets the offset without unregistering
        doc.set_scroll(panel, ScrollPosition::default());
        doc.advance(SCROLL_DEBOUNCE / 3);

        keeper.attach(panel, Options::new());
        assert_eq!(doc.scroll_position(panel), ScrollPosition::new(120.0, 0.0));
    }

    #[test]
    fn test_detach_stops_tracking() {
        let (doc, keeper, panel) = tracked_panel();
        let handles = keeper.attach(panel, Options::new());

        handles[0].destroy();
        assert!(!keeper.is_registered(panel));
        assert!(!doc.has_attribute(panel, MARKER_ATTRIBUTE));

        doc.set_scroll(panel, ScrollPosition::new(90.0, 0.0));
        doc.advance(SCROLL_DEBOUNCE);
        assert!(crate::state::read_scroll_state(doc.history()).is_empty());

        // Detaching twice is harmless
        handles[0].destroy();
    }

    #[test]
    fn test_unresolvable_container_is_skipped() {
        let doc = Document::new();
        let body = doc.append_element(doc.root(), "body");
        let twin_a = doc.append_element(body, "div");
        let twin_b = doc.append_element(body, "div");
        doc.set_id(twin_a, "twin");
        doc.set_id(twin_b, "twin");
        let ok = doc.append_element(body, "div");
        doc.set_id(ok, "ok");

        let keeper = ScrollKeeper::new(Arc::clone(&doc));
        let handles = keeper.attach(vec![twin_b, ok], Options::new());

        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].element(), ok);
        assert!(!keeper.is_registered(twin_b));
        assert!(!doc.has_attribute(twin_b, MARKER_ATTRIBUTE));
    }

    #[test]
    fn test_empty_target_is_noop() {
        let (doc, keeper, _) = tracked_panel();
        let handles = keeper.attach("#missing", Options::new());
        assert!(handles.is_empty());
        assert_eq!(doc.history().revision(), 0);
    }

    #[test]
    fn test_unload_hook_installed_once() {
        let (doc, keeper, panel) = tracked_panel();
        let extra = doc.append_element(doc.root(), "div");
        doc.set_id(extra, "extra");
        doc.set_layout_size(extra, LayoutSize::new(100.0, 100.0));

        keeper.attach(panel, Options::new());
        keeper.attach(extra, Options::new());

        doc.set_scroll(panel, ScrollPosition::new(10.0, 0.0));
        doc.set_scroll(extra, ScrollPosition::new(20.0, 0.0));

        let before = doc.history().revision();
        doc.emit_unload();
        // One sweep, one write, regardless of attach count
        assert_eq!(doc.history().revision(), before + 1);

        let state = crate::state::read_scroll_state(doc.history());
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_root_attach_listens_at_document_level() {
        let doc = Document::new();
        doc.set_layout_size(doc.root(), LayoutSize::new(1024.0, 768.0));
        let keeper = ScrollKeeper::new(Arc::clone(&doc));

        keeper.attach(Target::Root, Options::new());
        doc.set_scroll(doc.root(), ScrollPosition::new(200.0, 0.0));
        doc.advance(SCROLL_DEBOUNCE);

        let state = crate::state::read_scroll_state(doc.history());
        assert_eq!(
            state.get(crate::selector::ROOT_SELECTOR),
            Some(&ScrollPosition::new(200.0, 0.0))
        );
    }
}
