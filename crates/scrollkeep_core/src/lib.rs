//! Scrollkeep host primitives
//!
//! This crate provides the host surface the scroll tracker runs against:
//!
//! - **Element tree**: slotmap-keyed elements with tags, ids, classes,
//!   attributes, scroll offsets, and layout boxes
//! - **Events**: named cancelable notifications on elements or the document
//! - **Layout observers**: callbacks fired when an element's box changes
//! - **Virtual time**: a timer queue and debouncer driven by `advance`
//! - **History state**: the session-history entry's JSON state object
//! - **Query**: a compound-selector engine for locating elements
//!
//! Everything is single-threaded and cooperative; the host decides when
//! scrolls happen, when layout lands, and when time moves.
//!
//! # Example
//!
//! ```rust
//! use scrollkeep_core::{Document, LayoutSize, ScrollPosition};
//!
//! let doc = Document::new();
//! let body = doc.append_element(doc.root(), "body");
//! let panel = doc.append_element(body, "div");
//! doc.set_id(panel, "sidebar");
//! doc.set_layout_size(panel, LayoutSize::new(320.0, 600.0));
//! doc.set_scroll(panel, ScrollPosition::new(150.0, 0.0));
//!
//! assert_eq!(doc.query_selector("#sidebar").unwrap(), Some(panel));
//! ```

pub mod document;
pub mod element;
pub mod events;
pub mod history;
pub mod query;
pub mod timer;
pub mod tree;

pub use document::{Document, LayoutCallback, ObserverId};
pub use element::{ElementData, ElementId, LayoutSize, ScrollPosition};
pub use events::{
    Event, EventListeners, EventTarget, ListenerCallback, ListenerId, SCROLL_EVENT, UNLOAD_EVENT,
};
pub use history::{HistoryEntry, StateObject};
pub use query::{ComplexSelector, QueryError};
pub use timer::{Debouncer, TimerCallback, TimerId, TimerQueue};
pub use tree::ElementTree;
