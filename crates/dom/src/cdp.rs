//! CDP snapshot import
//!
//! Builds an arena from a Chrome DevTools Protocol `DOM.getDocument`
//! response, so a page captured from a live browser can be driven through
//! the same helpers as a parsed one.
//!
//! Input format:
//! ```json
//! {
//!   "root": {
//!     "nodeId": 1,
//!     "backendNodeId": 1,
//!     "nodeType": 9,
//!     "nodeName": "#document",
//!     "children": [...]
//!   }
//! }
//! ```

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::*;
use serde_json::Value;

/// Parse a CDP DOM tree response into a fresh arena
pub fn parse_cdp_dom_tree(cdp_response: &Value) -> Result<DomArena> {
    let root = cdp_response
        .get("root")
        .ok_or_else(|| DomError::CdpError("Missing 'root' in CDP response".to_string()))?;

    let mut arena = DomArena::new();
    let root_type = node_type_of(root)?;

    if root_type == NodeType::Document {
        arena.get_mut(DOCUMENT_NODE_ID)?.backend_node_id = backend_node_id_of(root)?;
        parse_children(&mut arena, root, DOCUMENT_NODE_ID)?;
    } else {
        parse_node(&mut arena, root, DOCUMENT_NODE_ID)?;
    }

    tracing::debug!("[CdpImport] Imported {} nodes", arena.len());
    Ok(arena)
}

/// `backendNodeId` if present; values outside `u32` are rejected
fn backend_node_id_of(cdp_node: &Value) -> Result<Option<u32>> {
    match cdp_node.get("backendNodeId") {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => raw
            .as_u64()
            .and_then(|id| u32::try_from(id).ok())
            .map(Some)
            .ok_or_else(|| DomError::CdpError(format!("Invalid backendNodeId {}", raw))),
    }
}

fn node_type_of(cdp_node: &Value) -> Result<NodeType> {
    let node_type_val = cdp_node["nodeType"]
        .as_u64()
        .ok_or_else(|| DomError::CdpError("Missing nodeType".to_string()))?;

    u8::try_from(node_type_val)
        .ok()
        .and_then(NodeType::from_u8)
        .ok_or_else(|| DomError::InvalidNodeType {
            expected: "valid NodeType".to_string(),
            actual: format!("{}", node_type_val),
        })
}

/// Recursively parse a CDP node and attach it under `parent_id`
fn parse_node(arena: &mut DomArena, cdp_node: &Value, parent_id: NodeId) -> Result<()> {
    if cdp_node["nodeId"].as_u64().is_none() {
        return Err(DomError::CdpError("Missing nodeId".to_string()));
    }
    let backend_node_id = backend_node_id_of(cdp_node)?
        .ok_or_else(|| DomError::CdpError("Missing backendNodeId".to_string()))?;

    let node_type = node_type_of(cdp_node)?;
    let node_name = cdp_node["nodeName"].as_str().unwrap_or("");
    let node_value = cdp_node["nodeValue"].as_str().unwrap_or("");

    let mut node = match node_type {
        NodeType::Element => DomNode::element(0, node_name),
        NodeType::Text | NodeType::CdataSection => DomNode::text(0, node_value),
        NodeType::Comment => DomNode::comment(0, node_value),
        other => {
            tracing::debug!("[CdpImport] Skipping {:?} node {}", other, backend_node_id);
            return Ok(());
        }
    };
    node.backend_node_id = Some(backend_node_id);

    // Attributes arrive flattened: [name0, value0, name1, value1, ...]
    if let Some(attrs) = cdp_node["attributes"].as_array() {
        for pair in attrs.chunks_exact(2) {
            if let (Some(key), Some(value)) = (pair[0].as_str(), pair[1].as_str()) {
                node.set_attr(key, value);
            }
        }
    }

    let current_node_id = arena.add_node(node);
    arena.append_child(parent_id, current_node_id)?;

    if cdp_node.get("contentDocument").is_some() || cdp_node.get("shadowRoots").is_some() {
        tracing::warn!(
            "[CdpImport] Skipping nested document/shadow roots of backend node {}",
            backend_node_id
        );
    }

    parse_children(arena, cdp_node, current_node_id)
}

fn parse_children(arena: &mut DomArena, cdp_node: &Value, parent_id: NodeId) -> Result<()> {
    if let Some(children) = cdp_node["children"].as_array() {
        for child in children {
            parse_node(arena, child, parent_id)?;
        }
    }
    Ok(())
}
