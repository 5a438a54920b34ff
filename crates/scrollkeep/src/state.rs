//! Persisted scroll state
//!
//! The scroll state is a flat `selector → position` mapping stored under the
//! reserved [`STATE_KEY`] of the history entry's state object. All other
//! keys of that object are caller-owned and survive every write verbatim.
//! Reads and writes validate the whole mapping; a malformed value reads as
//! empty and never reaches storage.

use rustc_hash::FxHashMap;
use scrollkeep_core::{HistoryEntry, ScrollPosition};
use serde_json::Value;

/// Reserved top-level key in the history entry's state object.
pub const STATE_KEY: &str = "scrollkeep";

/// Mapping from selector key to stored scroll position.
pub type ScrollState = FxHashMap<String, ScrollPosition>;

/// Read the scroll state from the history entry.
///
/// Absent or malformed state yields the empty mapping; this never fails.
pub fn read_scroll_state(history: &HistoryEntry) -> ScrollState {
    history
        .get(STATE_KEY)
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

/// Validate `state` and commit it under the reserved key.
///
/// The rest of the entry's state object is preserved through a shallow
/// merge. An invalid value discards the whole write and returns `false`.
pub fn commit_scroll_state(history: &HistoryEntry, state: &Value) -> bool {
    if serde_json::from_value::<ScrollState>(state.clone()).is_err() {
        tracing::error!(target: "scrollkeep", "invalid scroll state, write discarded");
        return false;
    }

    let mut full = history.state();
    full.insert(STATE_KEY.to_string(), state.clone());
    history.replace_state(full);
    true
}

/// Commit an already-typed mapping.
pub(crate) fn commit_state_map(history: &HistoryEntry, state: &ScrollState) -> bool {
    match serde_json::to_value(state) {
        Ok(value) => commit_scroll_state(history, &value),
        Err(_) => false,
    }
}
