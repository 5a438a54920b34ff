//! Store engine
//!
//! Commits a container's current offset into the persisted state. Repeating
//! the same offset is a full no-op: no event, no write. The unload sweep is
//! the one exception to the event contract; the document is going away, so
//! it reads offsets directly and commits everything in a single write.

use scrollkeep_core::{Document, ElementId};

use crate::events::{dispatch, EventKind};
use crate::keeper::ScrollKeeper;
use crate::settings::Settings;
use crate::state::{commit_state_map, read_scroll_state, ScrollState};

/// Store the container's current offset under its selector key.
pub(crate) fn store(doc: &Document, el: ElementId, selector: &str, settings: &Settings) {
    let position = doc.scroll_position(el);
    let mut state = read_scroll_state(doc.history());

    // Identical offset: nothing to do, no event
    if state.get(selector) == Some(&position) {
        return;
    }

    if !dispatch(doc, el, EventKind::Store, position, settings) {
        settings.diag.log("store prevented");
        return;
    }

    state.insert(selector.to_string(), position);
    if commit_state_map(doc.history(), &state) {
        settings.diag.log(&format!(
            "stored `{selector}`: top={} left={}",
            position.top, position.left
        ));
    }
}

/// Best-effort sweep over every tracked container, committed in one write.
///
/// Bypasses debounce and the dispatch/veto path, and omits offsets that are
/// zero on both axes.
pub(crate) fn store_all(keeper: &ScrollKeeper) {
    let doc = keeper.document();
    let mut state = ScrollState::default();

    for (el, selector) in keeper.registered() {
        let position = doc.scroll_position(el);
        if position.is_zero() {
            continue;
        }
        state.insert(selector, position);
    }

    commit_state_map(doc.history(), &state);
}
