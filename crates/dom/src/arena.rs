//! Arena-based DOM tree storage
//!
//! "Bad programmers worry about the code. Good programmers worry about
//! data structures and their relationships."
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [#document][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```
//!
//! Detached nodes (freshly created, or removed from the tree) stay in the
//! arena with `parent_id == None`. Only nodes whose ancestor chain reaches
//! index 0 are *connected*.

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType, DOCUMENT_NODE_ID};
use ahash::AHashMap;

/// Arena allocator for DOM nodes
///
/// Design:
/// - Single Vec<DomNode> for sequential allocation
/// - HashMap for backend_node_id → NodeId lookup (CDP uses backend IDs)
/// - No Rc/Arc: use indices everywhere
#[derive(Debug, Clone)]
pub struct DomArena {
    nodes: Vec<DomNode>,

    /// Backend node ID → NodeId lookup (for CDP integration)
    backend_id_map: AHashMap<u32, NodeId>,
}

impl DomArena {
    /// Create an arena holding only the `#document` node
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(DomNode::document(DOCUMENT_NODE_ID));
        Self {
            nodes,
            backend_id_map: AHashMap::new(),
        }
    }

    /// Add a detached node to the arena, returns its ID
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        node.parent_id = None;
        if let Some(backend_id) = node.backend_node_id {
            self.backend_id_map.insert(backend_id, node_id);
        }
        self.nodes.push(node);
        node_id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.add_node(DomNode::element(0, tag))
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.add_node(DomNode::text(0, data))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.add_node(DomNode::comment(0, data))
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID, failing if it is not an element
    pub fn element(&self, node_id: NodeId) -> Result<&DomNode> {
        let node = self.get(node_id)?;
        if node.is_element() {
            Ok(node)
        } else {
            Err(DomError::NotAnElement(node_id))
        }
    }

    pub fn element_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        let node = self.get_mut(node_id)?;
        if node.is_element() {
            Ok(node)
        } else {
            Err(DomError::NotAnElement(node_id))
        }
    }

    /// Get node ID by backend node ID
    pub fn get_node_id_by_backend(&self, backend_id: u32) -> Option<NodeId> {
        self.backend_id_map.get(&backend_id).copied()
    }

    /// Total number of nodes (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The document node is always present
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Get children of a node
    pub fn children(&self, node_id: NodeId) -> Result<Vec<&DomNode>> {
        let node = self.get(node_id)?;
        node.children_ids
            .iter()
            .map(|&child_id| self.get(child_id))
            .collect()
    }

    /// Element children only, in order
    pub fn element_children(&self, node_id: NodeId) -> Result<impl Iterator<Item = NodeId> + '_> {
        let node = self.get(node_id)?;
        Ok(node
            .children_ids
            .iter()
            .copied()
            .filter(move |&id| self.nodes[id as usize].is_element()))
    }

    /// Parent index if it is an element (not the document)
    pub fn parent_element(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(node_id as usize)?.parent_id?;
        self.nodes[parent as usize].is_element().then_some(parent)
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id as usize).and_then(|n| n.parent_id);
        }
        false
    }

    /// Node is reachable from the document node
    pub fn is_connected(&self, node_id: NodeId) -> bool {
        self.is_inclusive_ancestor(DOCUMENT_NODE_ID, node_id)
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        let parent_type = self.get(parent)?.node_type;
        let child_type = self.get(child)?.node_type;

        if !matches!(parent_type, NodeType::Element | NodeType::Document) {
            return Err(DomError::HierarchyRequest(format!(
                "node {} cannot have children",
                parent
            )));
        }
        if child_type == NodeType::Document {
            return Err(DomError::HierarchyRequest(
                "document cannot be inserted".to_string(),
            ));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest(format!(
                "node {} is an ancestor of {}",
                child, parent
            )));
        }

        if let Some(reference) = reference {
            if self.get(reference)?.parent_id != Some(parent) {
                return Err(DomError::HierarchyRequest(format!(
                    "node {} is not a child of {}",
                    reference, parent
                )));
            }
        }
        // Inserting a node before itself means "before its next sibling"
        let reference = match reference {
            Some(r) if r == child => self.next_sibling(child),
            other => other,
        };

        self.detach(child)?;
        self.get_mut(child)?.parent_id = Some(parent);
        let siblings = &mut self.get_mut(parent)?.children_ids;
        match reference.and_then(|r| siblings.iter().position(|&id| id == r)) {
            Some(index) => siblings.insert(index, child),
            None => siblings.push(child),
        }
        Ok(())
    }

    /// Next sibling of any node type
    pub fn next_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(node_id as usize)?.parent_id?;
        let siblings = &self.nodes[parent as usize].children_ids;
        let index = siblings.iter().position(|&id| id == node_id)?;
        siblings.get(index + 1).copied()
    }

    /// Internal construction helper: push a fresh node as the last child of
    /// a known-valid parent
    pub(crate) fn push_child(&mut self, parent: NodeId, node: DomNode) -> NodeId {
        let node_id = self.add_node(node);
        self.nodes[node_id as usize].parent_id = Some(parent);
        self.nodes[parent as usize].children_ids.push(node_id);
        node_id
    }

    /// Unlink a node from its parent; the subtree stays intact
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        let Some(parent) = self.get(node_id)?.parent_id else {
            return Ok(());
        };
        self.get_mut(parent)?
            .children_ids
            .retain(|id| *id != node_id);
        self.get_mut(node_id)?.parent_id = None;
        Ok(())
    }

    /// Detach every child of a node
    pub fn remove_children(&mut self, node_id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.get_mut(node_id)?.children_ids);
        for child in children {
            self.get_mut(child)?.parent_id = None;
        }
        Ok(())
    }

    /// Descendants of `start` (excluding it) in tree order
    pub fn descendants(&self, start: NodeId) -> Descendants<'_> {
        let stack = match self.nodes.get(start as usize) {
            Some(node) => node.children_ids.iter().rev().copied().collect(),
            None => Vec::new(),
        };
        Descendants { arena: self, stack }
    }

    /// Element descendants of `start` in tree order
    pub fn descendant_elements(&self, start: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(start)
            .filter(move |&id| self.nodes[id as usize].is_element())
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator driven by an explicit stack
pub struct Descendants<'a> {
    arena: &'a DomArena,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node_id = self.stack.pop()?;
        if let Some(node) = self.arena.nodes.get(node_id as usize) {
            self.stack.extend(node.children_ids.iter().rev().copied());
        }
        Some(node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> (DomArena, NodeId, NodeId, NodeId) {
        let mut arena = DomArena::new();
        let root = arena.create_element("div");
        let child1 = arena.create_element("span");
        let child2 = arena.create_element("span");
        arena.append_child(DOCUMENT_NODE_ID, root).unwrap();
        arena.append_child(root, child1).unwrap();
        arena.append_child(root, child2).unwrap();
        (arena, root, child1, child2)
    }

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();
        let id = arena.create_element("div");
        assert_eq!(id, 1);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.node_name, "DIV");
        assert!(retrieved.parent_id.is_none());
        assert!(!arena.is_connected(id));
    }

    #[test]
    fn test_backend_lookup() {
        let mut arena = DomArena::new();
        let mut node = DomNode::element(0, "div");
        node.backend_node_id = Some(100);
        let id = arena.add_node(node);

        assert_eq!(arena.get_node_id_by_backend(100), Some(id));
        assert_eq!(arena.get_node_id_by_backend(101), None);
    }

    #[test]
    fn test_descendants_in_tree_order() {
        let (mut arena, root, child1, child2) = small_tree();
        let text = arena.create_text("hi");
        arena.append_child(child1, text).unwrap();

        let all: Vec<_> = arena.descendants(DOCUMENT_NODE_ID).collect();
        assert_eq!(all, vec![root, child1, text, child2]);

        let elements: Vec<_> = arena.descendant_elements(root).collect();
        assert_eq!(elements, vec![child1, child2]);
    }

    #[test]
    fn test_append_moves_node() {
        let (mut arena, root, child1, child2) = small_tree();
        arena.append_child(child2, child1).unwrap();

        let root_children: Vec<_> = arena.element_children(root).unwrap().collect();
        assert_eq!(root_children, vec![child2]);
        assert_eq!(arena.parent_element(child1), Some(child2));
    }

    #[test]
    fn test_insert_before() {
        let (mut arena, root, child1, child2) = small_tree();
        let first = arena.create_element("em");
        arena.insert_before(root, first, Some(child1)).unwrap();
        arena.insert_before(root, child2, Some(child2)).unwrap();

        let order: Vec<_> = arena.element_children(root).unwrap().collect();
        assert_eq!(order, vec![first, child1, child2]);
        assert_eq!(arena.next_sibling(first), Some(child1));
        assert_eq!(arena.next_sibling(child2), None);

        let stray = arena.create_element("i");
        assert!(arena.insert_before(root, stray, Some(stray)).is_err());
    }

    #[test]
    fn test_append_rejects_cycles() {
        let (mut arena, root, child1, _) = small_tree();
        assert!(matches!(
            arena.append_child(child1, root),
            Err(DomError::HierarchyRequest(_))
        ));
        let text = arena.create_text("x");
        assert!(arena.append_child(text, child1).is_err());
    }

    #[test]
    fn test_detach_and_connected() {
        let (mut arena, root, child1, _) = small_tree();
        assert!(arena.is_connected(child1));

        arena.detach(root).unwrap();
        assert!(!arena.is_connected(child1));
        assert!(arena.is_inclusive_ancestor(root, child1));

        arena.remove_children(root).unwrap();
        assert_eq!(arena.element_children(root).unwrap().count(), 0);
        assert!(arena.get(child1).unwrap().parent_id.is_none());
    }
}
