//! Document facade
//!
//! [`Document`] ties the element tree to listeners, layout observers, the
//! timer queue, and the session-history entry. It is the single host surface
//! the scroll tracker runs against: scrolls and layout changes enter here,
//! and virtual time is driven through [`advance`](Document::advance).

use std::sync::{Arc, RwLock};
use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::element::{ElementId, LayoutSize, ScrollPosition};
use crate::events::{Event, EventListeners, EventTarget, ListenerCallback, ListenerId};
use crate::events::{SCROLL_EVENT, UNLOAD_EVENT};
use crate::history::HistoryEntry;
use crate::query::{self, ComplexSelector, QueryError};
use crate::timer::TimerQueue;
use crate::tree::ElementTree;

/// Callback fired when an observed element's layout box changes.
pub type LayoutCallback = Arc<dyn Fn(LayoutSize) + Send + Sync>;

/// Handle for detaching a layout observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Default)]
struct ObserverTable {
    next_id: u64,
    by_element: FxHashMap<ElementId, Vec<(ObserverId, LayoutCallback)>>,
    index: FxHashMap<ObserverId, ElementId>,
}

/// A single-document host: element tree, events, observers, timers, history.
pub struct Document {
    tree: RwLock<ElementTree>,
    listeners: EventListeners,
    observers: RwLock<ObserverTable>,
    timers: Arc<TimerQueue>,
    history: Arc<HistoryEntry>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("tree", &self.tree)
            .field("listeners", &self.listeners)
            .field("history_revision", &self.history.revision())
            .finish()
    }
}

impl Document {
    /// Create a document with a fresh history entry.
    pub fn new() -> Arc<Self> {
        Self::with_history(Arc::new(HistoryEntry::new()))
    }

    /// Create a document attached to an existing history entry.
    ///
    /// Sharing the entry between documents models a reload or a
    /// same-document navigation that preserves history state.
    pub fn with_history(history: Arc<HistoryEntry>) -> Arc<Self> {
        Arc::new(Self {
            tree: RwLock::new(ElementTree::new()),
            listeners: EventListeners::new(),
            observers: RwLock::new(ObserverTable::default()),
            timers: Arc::new(TimerQueue::new()),
            history,
        })
    }

    /// The history entry this document writes scroll state into.
    pub fn history(&self) -> &Arc<HistoryEntry> {
        &self.history
    }

    /// The timer queue driving debounce and timeout waits.
    pub fn timers(&self) -> &Arc<TimerQueue> {
        &self.timers
    }

    /// Advance virtual time, firing due timers.
    pub fn advance(&self, dt: Duration) {
        self.timers.advance(dt);
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// The root element (the designated scrolling element).
    pub fn root(&self) -> ElementId {
        self.tree.read().unwrap().root()
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> ElementId {
        self.tree.write().unwrap().create_element(tag)
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append_element(&self, parent: ElementId, tag: &str) -> ElementId {
        let mut tree = self.tree.write().unwrap();
        let el = tree.create_element(tag);
        tree.append_child(parent, el);
        el
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> bool {
        self.tree.write().unwrap().append_child(parent, child)
    }

    /// Remove an element and its subtree.
    pub fn remove_element(&self, el: ElementId) {
        self.tree.write().unwrap().remove(el);
    }

    /// Whether the element is part of this document.
    pub fn contains(&self, el: ElementId) -> bool {
        self.tree.read().unwrap().contains(el)
    }

    /// The element's tag name.
    pub fn tag(&self, el: ElementId) -> Option<String> {
        self.tree.read().unwrap().get(el).map(|d| d.tag().to_string())
    }

    /// The element's parent.
    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.tree.read().unwrap().parent(el)
    }

    /// The element's children in document order.
    pub fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.tree.read().unwrap().children(el).to_vec()
    }

    /// Set the element's explicit identifier.
    pub fn set_id(&self, el: ElementId, id: &str) {
        if let Some(data) = self.tree.write().unwrap().get_mut(el) {
            data.id = Some(id.to_string());
        }
    }

    /// The element's explicit identifier, if any.
    pub fn id(&self, el: ElementId) -> Option<String> {
        self.tree
            .read()
            .unwrap()
            .get(el)
            .and_then(|d| d.id().map(str::to_string))
    }

    /// Add a class name to the element.
    pub fn add_class(&self, el: ElementId, class: &str) {
        if let Some(data) = self.tree.write().unwrap().get_mut(el) {
            if !data.classes.iter().any(|c| c == class) {
                data.classes.push(class.to_string());
            }
        }
    }

    /// The element's class names in declaration order.
    pub fn classes(&self, el: ElementId) -> Vec<String> {
        self.tree
            .read()
            .unwrap()
            .get(el)
            .map(|d| d.classes().to_vec())
            .unwrap_or_default()
    }

    /// 1-based position among the parent's children.
    pub fn child_position(&self, el: ElementId) -> usize {
        self.tree.read().unwrap().child_position(el)
    }

    /// Number of children the element's parent has.
    pub fn sibling_count(&self, el: ElementId) -> usize {
        self.tree.read().unwrap().sibling_count(el)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Set an attribute on the element.
    pub fn set_attribute(&self, el: ElementId, name: &str, value: &str) {
        match self.tree.write().unwrap().get_mut(el) {
            Some(data) => {
                data.attributes.insert(name.to_string(), value.to_string());
            }
            None => tracing::warn!("set_attribute on element not in document: {name}"),
        }
    }

    /// Remove an attribute from the element.
    pub fn remove_attribute(&self, el: ElementId, name: &str) {
        if let Some(data) = self.tree.write().unwrap().get_mut(el) {
            data.attributes.shift_remove(name);
        }
    }

    /// Read an attribute value.
    pub fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.tree
            .read()
            .unwrap()
            .get(el)
            .and_then(|d| d.attributes.get(name).cloned())
    }

    /// Whether the element carries the attribute.
    pub fn has_attribute(&self, el: ElementId, name: &str) -> bool {
        self.tree
            .read()
            .unwrap()
            .get(el)
            .is_some_and(|d| d.attributes.contains_key(name))
    }

    // =========================================================================
    // Scroll
    // =========================================================================

    /// The element's current scroll offset.
    pub fn scroll_position(&self, el: ElementId) -> ScrollPosition {
        self.tree
            .read()
            .unwrap()
            .get(el)
            .map(|d| d.scroll)
            .unwrap_or_default()
    }

    /// Set the element's scroll offset and fire a `scroll` notification.
    ///
    /// Root scroll is observed at the document level (the window analog);
    /// any other element receives the event itself.
    pub fn set_scroll(&self, el: ElementId, position: ScrollPosition) {
        let target = {
            let mut tree = self.tree.write().unwrap();
            let root = tree.root();
            match tree.get_mut(el) {
                Some(data) => {
                    data.scroll = position;
                    if el == root {
                        EventTarget::Document
                    } else {
                        EventTarget::Element(el)
                    }
                }
                None => {
                    tracing::warn!("set_scroll on element not in document");
                    return;
                }
            }
        };
        let event = Event::non_cancelable(SCROLL_EVENT, position);
        self.listeners.dispatch(target, el, &event);
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// The element's layout box.
    pub fn layout_size(&self, el: ElementId) -> LayoutSize {
        self.tree
            .read()
            .unwrap()
            .get(el)
            .map(|d| d.size)
            .unwrap_or_default()
    }

    /// Set the element's layout box and notify its observers.
    pub fn set_layout_size(&self, el: ElementId, size: LayoutSize) {
        {
            let mut tree = self.tree.write().unwrap();
            match tree.get_mut(el) {
                Some(data) => data.size = size,
                None => {
                    tracing::warn!("set_layout_size on element not in document");
                    return;
                }
            }
        }
        let callbacks: Vec<LayoutCallback> = {
            let observers = self.observers.read().unwrap();
            observers
                .by_element
                .get(&el)
                .map(|list| list.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };
        for callback in callbacks {
            callback(size);
        }
    }

    /// Observe future layout-box changes of the element.
    ///
    /// The callback does not fire for the element's current size; only
    /// subsequent [`set_layout_size`](Self::set_layout_size) calls reach it.
    pub fn observe_layout(&self, el: ElementId, callback: LayoutCallback) -> ObserverId {
        if !self.contains(el) {
            tracing::warn!("observe_layout on element not in document");
        }
        let mut observers = self.observers.write().unwrap();
        observers.next_id += 1;
        let id = ObserverId(observers.next_id);
        observers
            .by_element
            .entry(el)
            .or_default()
            .push((id, callback));
        observers.index.insert(id, el);
        id
    }

    /// Detach a layout observer. Returns `false` if it was already gone.
    pub fn unobserve_layout(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write().unwrap();
        let Some(el) = observers.index.remove(&id) else {
            return false;
        };
        if let Some(list) = observers.by_element.get_mut(&el) {
            list.retain(|(oid, _)| *oid != id);
            if list.is_empty() {
                observers.by_element.remove(&el);
            }
        }
        true
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register a listener for `name` events on `target`.
    pub fn add_event_listener(
        &self,
        target: EventTarget,
        name: &str,
        callback: ListenerCallback,
    ) -> ListenerId {
        self.listeners.add(target, name, callback)
    }

    /// Remove a previously registered listener.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Deliver an event to `target`'s listeners.
    ///
    /// Returns `false` when a listener prevented the event's default.
    pub fn dispatch_event(&self, target: EventTarget, origin: ElementId, event: &Event) -> bool {
        self.listeners.dispatch(target, origin, event)
    }

    /// Fire the document-level unload notification.
    pub fn emit_unload(&self) {
        let event = Event::non_cancelable(UNLOAD_EVENT, ScrollPosition::default());
        self.listeners
            .dispatch(EventTarget::Document, self.root(), &event);
    }

    // =========================================================================
    // Query
    // =========================================================================

    /// All elements matching the selector, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>, QueryError> {
        let selectors = query::parse_selector_list(selector)?;
        Ok(self.query_parsed(&selectors))
    }

    /// The first element matching the selector, if any.
    pub fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, QueryError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    fn query_parsed(&self, selectors: &[ComplexSelector]) -> Vec<ElementId> {
        query::query_all(&self.tree.read().unwrap(), selectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_scroll_event_routing() {
        let doc = Document::new();
        let root = doc.root();
        let panel = doc.append_element(root, "div");

        let root_scrolls = Arc::new(AtomicU32::new(0));
        let panel_scrolls = Arc::new(AtomicU32::new(0));

        let c = Arc::clone(&root_scrolls);
        doc.add_event_listener(
            EventTarget::Document,
            SCROLL_EVENT,
            Arc::new(move |_, _| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let c = Arc::clone(&panel_scrolls);
        doc.add_event_listener(
            EventTarget::Element(panel),
            SCROLL_EVENT,
            Arc::new(move |_, _| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );

        doc.set_scroll(root, ScrollPosition::new(100.0, 0.0));
        doc.set_scroll(panel, ScrollPosition::new(50.0, 0.0));

        assert_eq!(root_scrolls.load(Ordering::SeqCst), 1);
        assert_eq!(panel_scrolls.load(Ordering::SeqCst), 1);
        assert_eq!(doc.scroll_position(root), ScrollPosition::new(100.0, 0.0));
        assert_eq!(doc.scroll_position(panel), ScrollPosition::new(50.0, 0.0));
    }

    #[test]
    fn test_layout_observer_lifecycle() {
        let doc = Document::new();
        let panel = doc.append_element(doc.root(), "div");
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

        let s = Arc::clone(&seen);
        let id = doc.observe_layout(
            panel,
            Arc::new(move |size| s.lock().unwrap().push(size.height)),
        );

        // Observing does not fire for the current size
        assert!(seen.lock().unwrap().is_empty());

        doc.set_layout_size(panel, LayoutSize::new(100.0, 0.0));
        doc.set_layout_size(panel, LayoutSize::new(100.0, 240.0));
        assert_eq!(*seen.lock().unwrap(), vec![0.0, 240.0]);

        assert!(doc.unobserve_layout(id));
        assert!(!doc.unobserve_layout(id));
        doc.set_layout_size(panel, LayoutSize::new(100.0, 500.0));
        assert_eq!(*seen.lock().unwrap(), vec![0.0, 240.0]);
    }

    #[test]
    fn test_attributes() {
        let doc = Document::new();
        let panel = doc.append_element(doc.root(), "div");

        assert!(!doc.has_attribute(panel, "data-scroll-keep"));
        doc.set_attribute(panel, "data-scroll-keep", "");
        assert!(doc.has_attribute(panel, "data-scroll-keep"));
        assert_eq!(doc.attribute(panel, "data-scroll-keep"), Some(String::new()));
        doc.remove_attribute(panel, "data-scroll-keep");
        assert!(!doc.has_attribute(panel, "data-scroll-keep"));
    }

    #[test]
    fn test_query_through_document() {
        let doc = Document::new();
        let body = doc.append_element(doc.root(), "body");
        let panel = doc.append_element(body, "div");
        doc.set_id(panel, "sidebar");
        doc.add_class(panel, "nav");

        assert_eq!(doc.query_selector("#sidebar").unwrap(), Some(panel));
        assert_eq!(doc.query_selector_all("div.nav").unwrap(), vec![panel]);
        assert_eq!(doc.query_selector(":root").unwrap(), Some(doc.root()));
        assert!(doc.query_selector_all("???").is_err());
    }

    #[test]
    fn test_unload_notification() {
        let doc = Document::new();
        let count = Arc::new(AtomicU32::new(0));

        let c = Arc::clone(&count);
        doc.add_event_listener(
            EventTarget::Document,
            UNLOAD_EVENT,
            Arc::new(move |_, _| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );

        doc.emit_unload();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shared_history() {
        let first = Document::new();
        let entry = Arc::clone(first.history());

        let mut state = crate::history::StateObject::new();
        state.insert("k".into(), serde_json::json!(1));
        entry.replace_state(state);

        let second = Document::with_history(entry);
        assert_eq!(second.history().get("k"), Some(serde_json::json!(1)));
    }
}
