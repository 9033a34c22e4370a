//! HTML serializer - arena subtree back to markup
//!
//! Follows the HTML fragment serialization algorithm for the node kinds the
//! arena stores: elements, text and comments.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;

/// Markup of a node's children (`innerHTML`)
pub fn inner_html(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut output = String::with_capacity(256);
    let node = arena.get(node_id)?;
    let raw_text = is_raw_text_parent(node);
    for &child_id in &node.children_ids {
        serialize_node(arena, child_id, raw_text, &mut output)?;
    }
    Ok(output)
}

/// Markup of a node including itself (`outerHTML`)
pub fn outer_html(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut output = String::with_capacity(256);
    let raw_text = match arena.get(node_id)?.parent_id {
        Some(parent) => is_raw_text_parent(arena.get(parent)?),
        None => false,
    };
    serialize_node(arena, node_id, raw_text, &mut output)?;
    Ok(output)
}

fn is_raw_text_parent(node: &DomNode) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|tag| node.is_tag(tag))
}

fn serialize_node(
    arena: &DomArena,
    node_id: NodeId,
    parent_is_raw_text: bool,
    output: &mut String,
) -> Result<()> {
    let node = arena.get(node_id)?;

    match node.node_type {
        NodeType::Element => {
            let tag = node.local_name().unwrap_or_default();
            output.push('<');
            output.push_str(&tag);
            for attr in &node.attributes {
                output.push(' ');
                output.push_str(&attr.name);
                output.push_str("=\"");
                escape_into(&attr.value, true, output);
                output.push('"');
            }
            output.push('>');

            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return Ok(());
            }

            let raw_text = is_raw_text_parent(node);
            for &child_id in &node.children_ids {
                serialize_node(arena, child_id, raw_text, output)?;
            }

            output.push_str("</");
            output.push_str(&tag);
            output.push('>');
        }
        NodeType::Text => {
            if parent_is_raw_text {
                output.push_str(&node.node_value);
            } else {
                escape_into(&node.node_value, false, output);
            }
        }
        NodeType::Comment => {
            output.push_str("<!--");
            output.push_str(&node.node_value);
            output.push_str("-->");
        }
        NodeType::Document | NodeType::DocumentFragment => {
            for &child_id in &node.children_ids {
                serialize_node(arena, child_id, false, output)?;
            }
        }
        _ => {
            // Nothing else is ever stored in the arena
        }
    }

    Ok(())
}

fn escape_into(text: &str, attribute_mode: bool, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{A0}' => output.push_str("&nbsp;"),
            '"' if attribute_mode => output.push_str("&quot;"),
            '<' if !attribute_mode => output.push_str("&lt;"),
            '>' if !attribute_mode => output.push_str("&gt;"),
            c => output.push(c),
        }
    }
}
