//! HTML parsing into the arena
//!
//! html5ever (through `scraper`) does the tokenizing and tree building;
//! the result is copied node by node into a `DomArena`. Fragments are
//! parsed against a context element the way `innerHTML` is, so table and
//! select content keeps its structure.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{NodeId, DOCUMENT_NODE_ID};
use ahash::AHashMap;
use html5ever::tendril::TendrilSink;
use html5ever::{driver, LocalName, Namespace, QualName};
use scraper::{Html, HtmlTreeSink, Node};
use std::hash::Hash;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parse a full HTML document into a fresh arena
pub fn parse_document(html: &str) -> Result<DomArena> {
    let parsed = Html::parse_document(html);
    let root = parsed.tree.root();

    let mut arena = DomArena::new();
    let top_level = import(
        &mut arena,
        root.id(),
        root.descendants()
            .skip(1)
            .map(|n| (n.id(), n.parent().map(|p| p.id()), n.value())),
    )?;
    for node_id in top_level {
        arena.append_child(DOCUMENT_NODE_ID, node_id)?;
    }
    Ok(arena)
}

/// Parse a fragment as if assigned to the `innerHTML` of a `context` element.
/// Returns the detached top-level nodes in order.
pub fn parse_fragment(arena: &mut DomArena, html: &str, context: &str) -> Result<Vec<NodeId>> {
    let context = context.to_ascii_lowercase();
    let context_name = QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from(context.as_str()),
    );
    let parsed = driver::parse_fragment(
        HtmlTreeSink::new(Html::new_fragment()),
        Default::default(),
        context_name,
        Vec::new(),
    )
    .one(html);
    // html5ever wraps fragments in a synthetic <html> element
    let wrapper = *parsed.root_element();

    import(
        arena,
        wrapper.id(),
        wrapper
            .descendants()
            .skip(1)
            .map(|n| (n.id(), n.parent().map(|p| p.id()), n.value())),
    )
}

/// Copy pre-ordered `(key, parent_key, node)` triples into the arena.
///
/// Children of `root_key` come back detached; everything deeper is attached
/// to its copied parent. Doctypes and processing instructions are dropped
/// together with anything beneath them.
fn import<'a, K, I>(arena: &mut DomArena, root_key: K, nodes: I) -> Result<Vec<NodeId>>
where
    K: Hash + Eq + Copy,
    I: IntoIterator<Item = (K, Option<K>, &'a Node)>,
{
    let mut copied: AHashMap<K, NodeId> = AHashMap::new();
    let mut top_level = Vec::new();

    for (key, parent_key, node) in nodes {
        let Some(parent_key) = parent_key else {
            continue;
        };
        let parent = if parent_key == root_key {
            None
        } else {
            match copied.get(&parent_key) {
                Some(&id) => Some(id),
                None => continue,
            }
        };

        let node_id = match node {
            Node::Element(element) => {
                let id = arena.create_element(element.name());
                let created = arena.get_mut(id)?;
                for (name, value) in element.attrs() {
                    created.set_attr(name, value);
                }
                id
            }
            Node::Text(text) => arena.create_text(text),
            Node::Comment(comment) => arena.create_comment(comment),
            _ => continue,
        };
        copied.insert(key, node_id);

        match parent {
            Some(parent) => arena.append_child(parent, node_id)?,
            None => top_level.push(node_id),
        }
    }

    Ok(top_level)
}
