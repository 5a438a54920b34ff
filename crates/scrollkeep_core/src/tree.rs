//! Element tree storage
//!
//! Plain tree data structure behind [`Document`](crate::Document). All
//! methods take `&self`/`&mut self` directly; locking is the document's job.

use slotmap::SlotMap;

use crate::element::{ElementData, ElementId};

/// Slotmap-backed element tree with a fixed root node.
#[derive(Debug)]
pub struct ElementTree {
    nodes: SlotMap<ElementId, ElementData>,
    root: ElementId,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    /// Create a tree containing only the root element.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ElementData::new("html"));
        Self { nodes, root }
    }

    /// The root element (the designated scrolling element).
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Create a detached element with the given tag.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.nodes.insert(ElementData::new(tag))
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first. Appending the root or creating a cycle is
    /// rejected.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if child == self.root
            || !self.nodes.contains_key(parent)
            || !self.nodes.contains_key(child)
            || self.is_ancestor(child, parent)
        {
            return false;
        }
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        true
    }

    /// Remove an element and its entire subtree. Removing the root is a no-op.
    pub fn remove(&mut self, el: ElementId) {
        if el == self.root || !self.nodes.contains_key(el) {
            return;
        }
        self.detach(el);
        let mut stack = vec![el];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.remove(current) {
                stack.extend(data.children);
            }
        }
    }

    fn detach(&mut self, el: ElementId) {
        if let Some(parent) = self.nodes.get(el).and_then(|d| d.parent) {
            if let Some(data) = self.nodes.get_mut(parent) {
                data.children.retain(|c| *c != el);
            }
            self.nodes[el].parent = None;
        }
    }

    fn is_ancestor(&self, candidate: ElementId, of: ElementId) -> bool {
        let mut current = Some(of);
        while let Some(el) = current {
            if el == candidate {
                return true;
            }
            current = self.nodes.get(el).and_then(|d| d.parent);
        }
        false
    }

    /// Look up element data.
    pub fn get(&self, el: ElementId) -> Option<&ElementData> {
        self.nodes.get(el)
    }

    pub(crate) fn get_mut(&mut self, el: ElementId) -> Option<&mut ElementData> {
        self.nodes.get_mut(el)
    }

    /// Check whether the element is part of this tree.
    pub fn contains(&self, el: ElementId) -> bool {
        self.nodes.contains_key(el)
    }

    /// The element's parent, if attached.
    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.nodes.get(el).and_then(|d| d.parent)
    }

    /// The element's children in document order.
    pub fn children(&self, el: ElementId) -> &[ElementId] {
        self.nodes
            .get(el)
            .map(|d| d.children.as_slice())
            .unwrap_or(&[])
    }

    /// 1-based position among the parent's children. Detached elements and
    /// the root count as position 1.
    pub fn child_position(&self, el: ElementId) -> usize {
        match self.parent(el) {
            Some(parent) => self
                .children(parent)
                .iter()
                .position(|c| *c == el)
                .map(|i| i + 1)
                .unwrap_or(1),
            None => 1,
        }
    }

    /// Number of children the element's parent has (1 for detached elements).
    pub fn sibling_count(&self, el: ElementId) -> usize {
        match self.parent(el) {
            Some(parent) => self.children(parent).len(),
            None => 1,
        }
    }

    /// All elements reachable from the root, in document (pre-)order.
    pub fn document_order(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(el) = stack.pop() {
            out.push(el);
            if let Some(data) = self.nodes.get(el) {
                for child in data.children.iter().rev() {
                    stack.push(*child);
                }
            }
        }
        out
    }
}
