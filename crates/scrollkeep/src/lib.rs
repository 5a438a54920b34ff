//! Scrollkeep
//!
//! Persists and restores the scroll offsets of tracked containers across
//! reloads and same-document navigations, using the session-history entry's
//! state object as the persistence medium.
//!
//! Each container is identified by a stable selector key (the root maps to
//! `":root"`, elements prefer `#id`, anything else gets a structural path).
//! Scrolling is debounced and committed under the reserved `"scrollkeep"`
//! key without touching caller-owned history state; registration restores
//! the stored offset, waiting for the container to gain layout extent when
//! necessary. Every store and restore is announced through cancelable
//! `scroll-keep:store` / `scroll-keep:restore` events that listeners or the
//! options handler table may veto.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use scrollkeep::{Options, ScrollKeeper, SCROLL_DEBOUNCE};
//! use scrollkeep_core::{Document, LayoutSize, ScrollPosition};
//!
//! let doc = Document::new();
//! let body = doc.append_element(doc.root(), "body");
//! let panel = doc.append_element(body, "div");
//! doc.set_id(panel, "sidebar");
//! doc.set_layout_size(panel, LayoutSize::new(320.0, 480.0));
//!
//! let keeper = ScrollKeeper::new(Arc::clone(&doc));
//! let handles = keeper.attach(panel, Options::new());
//! assert_eq!(handles.len(), 1);
//!
//! // Scrolling commits once the debounce window goes quiet
//! doc.set_scroll(panel, ScrollPosition::new(150.0, 0.0));
//! doc.advance(SCROLL_DEBOUNCE);
//!
//! // A reload shares the history entry; attaching restores the offset
//! let reloaded = Document::with_history(Arc::clone(doc.history()));
//! let body = reloaded.append_element(reloaded.root(), "body");
//! let panel = reloaded.append_element(body, "div");
//! reloaded.set_id(panel, "sidebar");
//! reloaded.set_layout_size(panel, LayoutSize::new(320.0, 480.0));
//!
//! let keeper = ScrollKeeper::new(Arc::clone(&reloaded));
//! keeper.attach(panel, Options::new());
//! assert_eq!(reloaded.scroll_position(panel), ScrollPosition::new(150.0, 0.0));
//! ```

mod diag;
mod error;
mod events;
mod keeper;
mod restore;
mod selector;
mod settings;
mod state;
mod store;
mod target;

pub use error::ScrollKeepError;
pub use events::{EventKind, EVENT_PREFIX, RESTORE_EVENT, STORE_EVENT};
pub use keeper::{AttachHandle, ScrollKeeper, MARKER_ATTRIBUTE, SCROLL_DEBOUNCE};
pub use restore::RESTORE_TIMEOUT;
pub use selector::ROOT_SELECTOR;
pub use settings::{EventHandler, Handlers, Options, SelectorResolver};
pub use state::{commit_scroll_state, read_scroll_state, ScrollState, STATE_KEY};
pub use target::Target;

// Host types callers interact with directly
pub use scrollkeep_core::{
    Document, ElementId, Event, EventTarget, LayoutSize, ScrollPosition,
};
