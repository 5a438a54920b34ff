//! Session-history entry state
//!
//! Models the state object associated with the current history entry. The
//! whole object is replaced in place on every write; nothing here ever
//! creates a new entry. A revision counter makes writes observable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde_json::{Map, Value};

/// JSON object type stored on a history entry.
pub type StateObject = Map<String, Value>;

/// The state object of one session-history entry.
///
/// Shared between documents to model reloads and same-document navigations
/// that keep history state alive.
#[derive(Debug, Default)]
pub struct HistoryEntry {
    state: RwLock<StateObject>,
    revision: AtomicU64,
}

impl HistoryEntry {
    /// Create an entry with an empty state object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entry seeded with existing caller state.
    pub fn with_state(state: StateObject) -> Self {
        Self {
            state: RwLock::new(state),
            revision: AtomicU64::new(0),
        }
    }

    /// Snapshot of the full state object.
    pub fn state(&self) -> StateObject {
        self.state.read().unwrap().clone()
    }

    /// Snapshot of one top-level value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.state.read().unwrap().get(key).cloned()
    }

    /// Replace the entire state object in place.
    pub fn replace_state(&self, state: StateObject) {
        *self.state.write().unwrap() = state;
        self.revision.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of writes performed so far.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replace_and_read() {
        let entry = HistoryEntry::new();
        assert_eq!(entry.revision(), 0);
        assert_eq!(entry.get("anything"), None);

        let mut state = StateObject::new();
        state.insert("caller".into(), json!({"page": 3}));
        entry.replace_state(state);

        assert_eq!(entry.revision(), 1);
        assert_eq!(entry.get("caller"), Some(json!({"page": 3})));
    }

    #[test]
    fn test_seeded_state() {
        let mut state = StateObject::new();
        state.insert("x".into(), json!(1));
        let entry = HistoryEntry::with_state(state);

        assert_eq!(entry.get("x"), Some(json!(1)));
        assert_eq!(entry.revision(), 0);
    }
}
