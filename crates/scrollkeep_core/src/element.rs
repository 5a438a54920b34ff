//! Per-element data stored in the document tree

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Stable key identifying an element within a [`Document`](crate::Document).
    pub struct ElementId;
}

/// A scroll offset in pixels.
///
/// Equality is component-wise; two positions are equal only when both `top`
/// and `left` match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
    /// Vertical offset from the top edge of the content.
    pub top: f64,
    /// Horizontal offset from the left edge of the content.
    pub left: f64,
}

impl ScrollPosition {
    /// Create a position from explicit offsets.
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    /// Check whether both axes are exactly zero.
    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.left == 0.0
    }
}

/// Width and height of an element's layout box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutSize {
    pub width: f64,
    pub height: f64,
}

impl LayoutSize {
    /// Create a size from explicit dimensions.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Check whether the box has no extent on either axis.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

/// Data stored for one element node.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub(crate) tag: String,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attributes: IndexMap<String, String>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) scroll: ScrollPosition,
    pub(crate) size: LayoutSize,
}

impl ElementData {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attributes: IndexMap::new(),
            parent: None,
            children: Vec::new(),
            scroll: ScrollPosition::default(),
            size: LayoutSize::default(),
        }
    }

    /// Tag name, normalized to lowercase.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The explicit identifier attribute, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Class names in declaration order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_position_equality() {
        let a = ScrollPosition::new(10.0, 0.0);
        let b = ScrollPosition::new(10.0, 0.0);
        let c = ScrollPosition::new(10.0, 1.0);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_zero());
        assert!(ScrollPosition::default().is_zero());
    }

    #[test]
    fn test_scroll_position_serde() {
        let pos = ScrollPosition::new(200.0, 12.5);
        let value = serde_json::to_value(pos).unwrap();
        let back: ScrollPosition = serde_json::from_value(value).unwrap();
        assert_eq!(pos, back);

        // Integer offsets deserialize as floats
        let back: ScrollPosition =
            serde_json::from_value(serde_json::json!({"top": 200, "left": 0})).unwrap();
        assert_eq!(back, ScrollPosition::new(200.0, 0.0));

        // Extra fields are tolerated
        let back: ScrollPosition =
            serde_json::from_value(serde_json::json!({"top": 1.0, "left": 2.0, "zoom": 3}))
                .unwrap();
        assert_eq!(back, ScrollPosition::new(1.0, 2.0));

        // Non-numeric offsets are rejected
        assert!(
            serde_json::from_value::<ScrollPosition>(serde_json::json!({"top": "x", "left": 0}))
                .is_err()
        );
    }

    #[test]
    fn test_layout_size_empty() {
        assert!(LayoutSize::default().is_empty());
        assert!(!LayoutSize::new(0.0, 100.0).is_empty());
        assert!(!LayoutSize::new(100.0, 0.0).is_empty());
    }
}
