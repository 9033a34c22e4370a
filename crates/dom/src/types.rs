//! Core type definitions
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (most elements have few children/attributes)
//! 3. Element handles are plain `Copy` indices, identity is index equality

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Node identifier (index into arena)
pub type NodeId = u32;

/// The `#document` node always sits at index 0
pub const DOCUMENT_NODE_ID: NodeId = 0;

/// Node type values from the DOM standard (`Node.nodeType`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            2 => Some(NodeType::Attribute),
            3 => Some(NodeType::Text),
            4 => Some(NodeType::CdataSection),
            5 => Some(NodeType::EntityReference),
            6 => Some(NodeType::Entity),
            7 => Some(NodeType::ProcessingInstruction),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            10 => Some(NodeType::DocumentType),
            11 => Some(NodeType::DocumentFragment),
            12 => Some(NodeType::Notation),
            _ => None,
        }
    }
}

/// Opaque handle to an element node in a host document.
///
/// Two handles are the same element iff they compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementRef(NodeId);

impl ElementRef {
    pub fn new(node_id: NodeId) -> Self {
        Self(node_id)
    }

    pub fn id(self) -> NodeId {
        self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single `name="value"` pair, kept in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// The arena node
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
/// - Form control state that browsers keep outside attributes lives in
///   `dirty_value` / `dirty_checked`; on a `select`, `dirty_value` records
///   that script has set its value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    /// Set only for nodes imported from a CDP snapshot
    pub backend_node_id: Option<u32>,

    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    /// Uppercase tag name for elements, `#text`, `#comment`, `#document` otherwise
    pub node_name: String,
    /// Character data for text and comment nodes
    pub node_value: String,
    pub attributes: SmallVec<[Attribute; 4]>,

    pub dirty_value: Option<String>,
    pub dirty_checked: Option<bool>,
}

impl DomNode {
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: String) -> Self {
        Self {
            node_id,
            node_type,
            backend_node_id: None,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name,
            node_value: String::new(),
            attributes: SmallVec::new(),
            dirty_value: None,
            dirty_checked: None,
        }
    }

    pub fn document(node_id: NodeId) -> Self {
        Self::new(node_id, NodeType::Document, "#document".to_string())
    }

    /// Element with an HTML (case-insensitive) tag name
    pub fn element(node_id: NodeId, tag: &str) -> Self {
        Self::new(node_id, NodeType::Element, tag.to_ascii_uppercase())
    }

    pub fn text(node_id: NodeId, data: &str) -> Self {
        let mut node = Self::new(node_id, NodeType::Text, "#text".to_string());
        node.node_value = data.to_string();
        node
    }

    pub fn comment(node_id: NodeId, data: &str) -> Self {
        let mut node = Self::new(node_id, NodeType::Comment, "#comment".to_string());
        node.node_value = data.to_string();
        node
    }

    /// Get tag name for element nodes (uppercase, like `Element.tagName`)
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Lowercase tag name, as written in markup
    pub fn local_name(&self) -> Option<String> {
        self.tag_name().map(str::to_ascii_lowercase)
    }

    /// Case-insensitive tag comparison
    pub fn is_tag(&self, tag: &str) -> bool {
        self.is_element() && self.node_name.eq_ignore_ascii_case(tag)
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set attribute, keeping the original position if it already exists
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name,
                value: value.to_string(),
            }),
        }
    }

    /// Remove attribute, returns whether it was present
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| !a.name.eq_ignore_ascii_case(name));
        before != self.attributes.len()
    }
}

/// Elements that never have children or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are serialized without escaping
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
    "noscript",
];

/// Elements that reflect the `disabled` attribute as a property
pub const DISABLEABLE_ELEMENTS: &[&str] = &[
    "button", "input", "select", "textarea", "optgroup", "option", "fieldset",
];

/// Elements whose `value` property reflects the `value` attribute directly
pub const VALUE_ATTRIBUTE_ELEMENTS: &[&str] = &["button", "output", "data", "li", "param"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_keep_order_and_case_fold() {
        let mut node = DomNode::element(1, "div");
        node.set_attr("ID", "main");
        node.set_attr("class", "a");
        node.set_attr("id", "other");

        assert_eq!(node.attr("id"), Some("other"));
        assert_eq!(node.attributes[0].name, "id");
        assert_eq!(node.attributes[1].name, "class");

        assert!(node.remove_attr("Class"));
        assert!(!node.remove_attr("class"));
        assert_eq!(node.attributes.len(), 1);
    }

    #[test]
    fn test_tag_name_is_uppercase() {
        let node = DomNode::element(1, "section");
        assert_eq!(node.tag_name(), Some("SECTION"));
        assert_eq!(node.local_name().as_deref(), Some("section"));
        assert!(node.is_tag("Section"));
        assert_eq!(DomNode::text(2, "x").tag_name(), None);
    }
}
