//! Selector resolution for tracked containers
//!
//! A container's selector is its stable identity in the persisted state: it
//! must re-resolve to the same element after a reload. The root always maps
//! to [`ROOT_SELECTOR`]; other elements prefer their explicit id and fall
//! back to a structural path. A path that does not uniquely match the
//! element at resolution time is a failure, not a guess.

use scrollkeep_core::{Document, ElementId};

use crate::error::ScrollKeepError;
use crate::settings::Settings;

/// Reserved selector for the document's scrolling root.
pub const ROOT_SELECTOR: &str = ":root";

/// Resolve the stable selector key for `el`.
pub(crate) fn resolve_selector(
    doc: &Document,
    el: ElementId,
    settings: &Settings,
) -> Result<String, ScrollKeepError> {
    if !doc.contains(el) {
        return Err(ScrollKeepError::DetachedElement);
    }

    if let Some(resolver) = &settings.selector {
        return match resolver(doc, el) {
            Some(selector) if !selector.is_empty() => Ok(selector),
            _ => Err(ScrollKeepError::Selector(
                "custom resolver returned no selector".into(),
            )),
        };
    }

    if el == doc.root() {
        return Ok(ROOT_SELECTOR.to_string());
    }

    if doc.id(el).is_none() {
        settings
            .diag
            .log("for stable keys, give tracked containers an explicit id");
    }

    let selector = unique_selector_path(doc, el);
    match doc.query_selector_all(&selector) {
        Ok(matches) if matches.len() == 1 && matches[0] == el => Ok(selector),
        Ok(_) => Err(ScrollKeepError::Selector(format!(
            "`{selector}` does not uniquely match the element"
        ))),
        Err(err) => Err(ScrollKeepError::Query(err)),
    }
}

/// Build a selector path from tag names, ids, classes, and `:nth-child`.
fn unique_selector_path(doc: &Document, el: ElementId) -> String {
    if let Some(id) = doc.id(el) {
        return format!("#{id}");
    }

    let mut path = Vec::new();
    let mut current = Some(el);

    while let Some(node) = current {
        let Some(tag) = doc.tag(node) else {
            break;
        };
        let mut part = tag;

        // An id anchors the path; nothing above it can change the match
        if let Some(id) = doc.id(node) {
            part.push('#');
            part.push_str(&id);
            path.insert(0, part);
            break;
        }

        for class in doc.classes(node) {
            part.push('.');
            part.push_str(&class);
        }

        if doc.sibling_count(node) > 1 {
            part.push_str(&format!(":nth-child({})", doc.child_position(node)));
        }

        path.insert(0, part);
        current = doc.parent(node);
    }

    path.join(" > ")
}
