//! Restore engine
//!
//! Applies a container's stored offset. A container that has no layout
//! extent yet cannot be scrolled meaningfully, so the apply defers until its
//! box gains height, racing a bounded timeout. The observer, the timeout,
//! unregistration, and a fresh restore all compete for one take-able pending
//! slot; whichever wins cancels the rest, so the apply happens at most once
//! and nothing dangles.

use std::sync::Arc;
use std::time::Duration;

use scrollkeep_core::{Document, ElementId, ObserverId, ScrollPosition, TimerId};

use crate::events::{dispatch, EventKind};
use crate::keeper::ScrollKeeper;
use crate::settings::Settings;
use crate::state::read_scroll_state;

/// Bounded wait for a container to gain layout extent before a restore is
/// abandoned.
pub const RESTORE_TIMEOUT: Duration = Duration::from_millis(100);

/// A deferred restore: layout observer racing a timeout.
pub(crate) struct PendingRestore {
    pub(crate) observer: ObserverId,
    pub(crate) timeout: TimerId,
}

impl PendingRestore {
    pub(crate) fn cancel(&self, doc: &Document) {
        doc.unobserve_layout(self.observer);
        doc.timers().cancel(self.timeout);
    }
}

/// Look up the container's stored offset and apply it, now or once layout
/// lands. Fire-and-forget; completion is observable through the restore
/// event and the container's offset.
pub(crate) fn restore(keeper: &ScrollKeeper, el: ElementId, settings: &Settings) {
    let doc = keeper.document();

    let Some(selector) = keeper.selector_of(el) else {
        settings.diag.error("no selector available for tracked container");
        return;
    };

    let Some(position) = read_scroll_state(doc.history()).get(&selector).copied() else {
        settings.diag.log(&format!("nothing stored for `{selector}`"));
        return;
    };

    // A fresh restore supersedes any wait still in flight
    keeper.cancel_pending_restore(el);

    if !doc.layout_size(el).is_empty() {
        apply(&doc, el, position, settings);
        return;
    }

    let observer = {
        let keeper = keeper.weak_self.clone();
        let settings = settings.clone();
        doc.observe_layout(
            el,
            Arc::new(move |size| {
                if size.height <= 0.0 {
                    return;
                }
                let Some(keeper) = keeper.upgrade() else {
                    return;
                };
                let Some(pending) = keeper.take_pending_restore(el) else {
                    return;
                };
                let doc = keeper.document();
                pending.cancel(&doc);
                apply(&doc, el, position, &settings);
            }),
        )
    };

    let timeout = {
        let keeper = keeper.weak_self.clone();
        let settings = settings.clone();
        let selector = selector.clone();
        doc.timers().schedule(
            RESTORE_TIMEOUT,
            Arc::new(move || {
                let Some(keeper) = keeper.upgrade() else {
                    return;
                };
                let Some(pending) = keeper.take_pending_restore(el) else {
                    return;
                };
                keeper.document().unobserve_layout(pending.observer);
                settings
                    .diag
                    .warn(&format!("restore timed out for `{selector}`"));
            }),
        )
    };

    keeper.set_pending_restore(el, PendingRestore { observer, timeout });
}

fn apply(doc: &Document, el: ElementId, position: ScrollPosition, settings: &Settings) {
    if dispatch(doc, el, EventKind::Restore, position, settings) {
        doc.set_scroll(el, position);
        settings.diag.log(&format!(
            "restored: top={} left={}",
            position.top, position.left
        ));
    } else {
        settings.diag.log("restore prevented");
    }
}
