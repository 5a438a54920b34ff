//! Caller-supplied target resolution
//!
//! A target names zero or more containers to track: the scrolling root, a
//! concrete element, a selector string, or a collection. Resolution filters
//! out anything no longer in the document instead of failing the call.

use scrollkeep_core::{Document, ElementId};

use crate::settings::Settings;

/// What to track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The document's scrolling root element.
    Root,
    /// A single element.
    Element(ElementId),
    /// Every element matching a selector string.
    Selector(String),
    /// An explicit collection of elements.
    Elements(Vec<ElementId>),
}

impl From<ElementId> for Target {
    fn from(el: ElementId) -> Self {
        Self::Element(el)
    }
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<Vec<ElementId>> for Target {
    fn from(elements: Vec<ElementId>) -> Self {
        Self::Elements(elements)
    }
}

impl From<&[ElementId]> for Target {
    fn from(elements: &[ElementId]) -> Self {
        Self::Elements(elements.to_vec())
    }
}

/// Resolve a target to concrete containers, in document order where the
/// target implies one.
pub(crate) fn resolve_target(doc: &Document, target: &Target, settings: &Settings) -> Vec<ElementId> {
    match target {
        Target::Root => vec![doc.root()],
        Target::Element(el) => {
            if doc.contains(*el) {
                vec![*el]
            } else {
                settings.diag.warn("target element is not in the document");
                Vec::new()
            }
        }
        Target::Selector(selector) => match doc.query_selector_all(selector) {
            Ok(elements) => elements,
            Err(err) => {
                settings.diag.error(&format!("bad target selector: {err}"));
                Vec::new()
            }
        },
        Target::Elements(elements) => elements
            .iter()
            .copied()
            .filter(|el| {
                let present = doc.contains(*el);
                if !present {
                    settings.diag.warn("skipping element not in the document");
                }
                present
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Options;

    fn settings() -> Settings {
        Options::new().into_settings()
    }

    #[test]
    fn test_root_target() {
        let doc = Document::new();
        assert_eq!(
            resolve_target(&doc, &Target::Root, &settings()),
            vec![doc.root()]
        );
    }

    #[test]
    fn test_selector_target() {
        let doc = Document::new();
        let body = doc.append_element(doc.root(), "body");
        let a = doc.append_element(body, "div");
        let b = doc.append_element(body, "div");
        doc.add_class(a, "track");
        doc.add_class(b, "track");

        let resolved = resolve_target(&doc, &Target::from(".track"), &settings());
        assert_eq!(resolved, vec![a, b]);
    }

    #[test]
    fn test_bad_selector_is_empty() {
        let doc = Document::new();
        assert!(resolve_target(&doc, &Target::from("??"), &settings()).is_empty());
        assert!(resolve_target(&doc, &Target::from("#missing"), &settings()).is_empty());
    }

    #[test]
    fn test_collection_filters_removed_elements() {
        let doc = Document::new();
        let body = doc.append_element(doc.root(), "body");
        let keep = doc.append_element(body, "div");
        let gone = doc.append_element(body, "div");
        doc.remove_element(gone);

        let resolved = resolve_target(&doc, &Target::from(vec![keep, gone]), &settings());
        assert_eq!(resolved, vec![keep]);
    }
}
