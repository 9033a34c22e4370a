//! In-memory host document
//!
//! `Document` implements every `HostDocument` primitive directly against a
//! `DomArena`: no caching, no indexes, each call walks the tree it needs.

use crate::arena::DomArena;
use crate::cdp;
use crate::error::{DomError, Result};
use crate::host::{AdjacentPosition, Elements, HostDocument};
use crate::parser;
use crate::selector::SelectorList;
use crate::serializer;
use crate::types::*;
use crate::utils::{self, class_tokens, collapse_whitespace};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Document {
    arena: DomArena,
}

impl Document {
    /// Empty HTML document: `<html><head></head><body></body></html>`
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Empty HTML document with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        let mut arena = DomArena::with_capacity(capacity);
        let html = arena.push_child(DOCUMENT_NODE_ID, DomNode::element(0, "html"));
        arena.push_child(html, DomNode::element(0, "head"));
        arena.push_child(html, DomNode::element(0, "body"));
        Self { arena }
    }

    /// Parse a complete HTML document
    pub fn parse_html(html: &str) -> Result<Self> {
        let arena = parser::parse_document(html)?;
        tracing::debug!("[Document] Parsed HTML into {} nodes", arena.len());
        Ok(Self { arena })
    }

    /// Import a CDP `DOM.getDocument` response
    pub fn from_cdp(cdp_response: &Value) -> Result<Self> {
        Ok(Self {
            arena: cdp::parse_cdp_dom_tree(cdp_response)?,
        })
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Resolve a CDP `backendNodeId` to an element
    pub fn element_by_backend_id(&self, backend_id: u32) -> Option<ElementRef> {
        let node_id = self.arena.get_node_id_by_backend(backend_id)?;
        self.arena
            .element(node_id)
            .ok()
            .map(|_| ElementRef::new(node_id))
    }

    /// The root element (`<html>`)
    pub fn document_element(&self) -> Option<ElementRef> {
        self.arena
            .element_children(DOCUMENT_NODE_ID)
            .ok()?
            .next()
            .map(ElementRef::new)
    }

    pub fn head(&self) -> Option<ElementRef> {
        self.root_child("head")
    }

    pub fn outer_html(&self, element: ElementRef) -> Result<String> {
        self.node(element)?;
        serializer::outer_html(&self.arena, element.id())
    }

    /// Uppercase tag name, like `Element.tagName`
    pub fn tag_name(&self, element: ElementRef) -> Result<String> {
        Ok(self.node(element)?.node_name.clone())
    }

    pub fn is_connected(&self, element: ElementRef) -> bool {
        self.arena.is_connected(element.id())
    }

    fn node(&self, element: ElementRef) -> Result<&DomNode> {
        self.arena.element(element.id())
    }

    fn node_mut(&mut self, element: ElementRef) -> Result<&mut DomNode> {
        self.arena.element_mut(element.id())
    }

    fn root_child(&self, tag: &str) -> Option<ElementRef> {
        let html = self.document_element()?;
        self.arena
            .element_children(html.id())
            .ok()?
            .find(|&id| self.arena.get(id).is_ok_and(|n| n.is_tag(tag)))
            .map(ElementRef::new)
    }

    fn elements<'a>(&'a self, ids: impl Iterator<Item = NodeId> + 'a) -> Elements<'a> {
        Box::new(ids.map(ElementRef::new))
    }

    fn form_control_error(node: &DomNode, expected: &str) -> DomError {
        DomError::InvalidNodeType {
            expected: expected.to_string(),
            actual: node.node_name.to_ascii_lowercase(),
        }
    }

    fn input_type(node: &DomNode) -> String {
        node.attr("type").unwrap_or("text").to_ascii_lowercase()
    }

    fn option_value(&self, option: NodeId) -> Result<String> {
        let node = self.arena.get(option)?;
        match node.attr("value") {
            Some(value) => Ok(value.to_string()),
            None => Ok(collapse_whitespace(&self.raw_text(option))),
        }
    }

    /// Tag name that markup inserted under `node_id` is parsed against
    fn fragment_context(&self, node_id: NodeId) -> Result<String> {
        Ok(self
            .arena
            .get(node_id)?
            .local_name()
            .unwrap_or_else(|| "body".to_string()))
    }

    fn select_options(&self, select: NodeId) -> Vec<NodeId> {
        self.arena
            .descendant_elements(select)
            .filter(|&id| self.arena.get(id).is_ok_and(|n| n.is_tag("option")))
            .collect()
    }

    fn raw_text(&self, node_id: NodeId) -> String {
        self.arena
            .descendants(node_id)
            .filter_map(|id| self.arena.get(id).ok())
            .filter(|n| n.is_text())
            .map(|n| n.node_value.as_str())
            .collect()
    }

    fn write_classes(&mut self, element: ElementRef, classes: &[String]) -> Result<()> {
        let node = self.node_mut(element)?;
        if classes.is_empty() && !node.has_attr("class") {
            return Ok(());
        }
        node.set_attr("class", &classes.join(" "));
        Ok(())
    }

    /// Radios sharing `name` with `radio` in the same form (or tree)
    fn radio_group(&self, radio: NodeId, name: &str) -> Vec<NodeId> {
        let form_of = |id: NodeId| {
            let mut cursor = self.arena.parent_element(id);
            while let Some(ancestor) = cursor {
                if self.arena.get(ancestor).is_ok_and(|n| n.is_tag("form")) {
                    return Some(ancestor);
                }
                cursor = self.arena.parent_element(ancestor);
            }
            None
        };

        let owner = form_of(radio);
        let search_root = owner.unwrap_or_else(|| {
            let mut top = radio;
            while let Some(parent) = self.arena.get(top).ok().and_then(|n| n.parent_id) {
                top = parent;
            }
            top
        });

        self.arena
            .descendant_elements(search_root)
            .filter(|&id| id != radio)
            .filter(|&id| {
                self.arena.get(id).is_ok_and(|n| {
                    n.is_tag("input")
                        && Self::input_type(n) == "radio"
                        && n.attr("name") == Some(name)
                })
            })
            .filter(|&id| form_of(id) == owner)
            .collect()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDocument for Document {
    fn get_element_by_id(&self, id: &str) -> Option<ElementRef> {
        if id.is_empty() {
            return None;
        }
        self.arena
            .descendant_elements(DOCUMENT_NODE_ID)
            .find(|&node_id| {
                self.arena
                    .get(node_id)
                    .is_ok_and(|n| n.attr("id") == Some(id))
            })
            .map(ElementRef::new)
    }

    fn get_elements_by_class_name(&self, names: &str) -> Elements<'_> {
        let wanted = class_tokens(Some(names));
        if wanted.is_empty() {
            return Box::new(std::iter::empty());
        }
        self.elements(
            self.arena
                .descendant_elements(DOCUMENT_NODE_ID)
                .filter(move |&id| {
                    self.arena.get(id).is_ok_and(|n| {
                        let have = class_tokens(n.attr("class"));
                        wanted.iter().all(|w| have.contains(w))
                    })
                }),
        )
    }

    fn get_elements_by_tag_name(&self, name: &str) -> Elements<'_> {
        let name = name.to_string();
        self.elements(
            self.arena
                .descendant_elements(DOCUMENT_NODE_ID)
                .filter(move |&id| {
                    name == "*" || self.arena.get(id).is_ok_and(|n| n.is_tag(&name))
                }),
        )
    }

    fn query_selector(
        &self,
        scope: Option<ElementRef>,
        selector: &str,
    ) -> Result<Option<ElementRef>> {
        let list = SelectorList::parse(selector)?;
        let root = match scope {
            Some(element) => self.node(element)?.node_id,
            None => DOCUMENT_NODE_ID,
        };
        let found = list.query_all(&self.arena, root).next();
        Ok(found.map(ElementRef::new))
    }

    fn query_selector_all(
        &self,
        scope: Option<ElementRef>,
        selector: &str,
    ) -> Result<Elements<'_>> {
        let list = SelectorList::parse(selector)?;
        let root = match scope {
            Some(element) => self.node(element)?.node_id,
            None => DOCUMENT_NODE_ID,
        };
        // Static result, like the platform's NodeList
        let matches: Vec<NodeId> = list.query_all(&self.arena, root).collect();
        Ok(self.elements(matches.into_iter()))
    }

    fn children(&self, element: ElementRef) -> Result<Elements<'_>> {
        self.node(element)?;
        Ok(self.elements(self.arena.element_children(element.id())?))
    }

    fn body(&self) -> Option<ElementRef> {
        self.root_child("body")
    }

    fn text_content(&self, element: ElementRef) -> Result<String> {
        self.node(element)?;
        Ok(self.raw_text(element.id()))
    }

    fn set_text_content(&mut self, element: ElementRef, text: &str) -> Result<()> {
        self.node(element)?;
        tracing::debug!("[Document] set_text_content on {}", element);
        self.arena.remove_children(element.id())?;
        if !text.is_empty() {
            let text_id = self.arena.create_text(text);
            self.arena.append_child(element.id(), text_id)?;
        }
        Ok(())
    }

    fn inner_html(&self, element: ElementRef) -> Result<String> {
        self.node(element)?;
        serializer::inner_html(&self.arena, element.id())
    }

    fn set_inner_html(&mut self, element: ElementRef, html: &str) -> Result<()> {
        self.node(element)?;
        tracing::debug!("[Document] set_inner_html on {} ({} bytes)", element, html.len());
        let context = self.fragment_context(element.id())?;
        let nodes = parser::parse_fragment(&mut self.arena, html, &context)?;
        self.arena.remove_children(element.id())?;
        for node_id in nodes {
            self.arena.append_child(element.id(), node_id)?;
        }
        Ok(())
    }

    fn insert_adjacent_html(
        &mut self,
        element: ElementRef,
        position: AdjacentPosition,
        html: &str,
    ) -> Result<()> {
        let target = self.node(element)?.node_id;
        let (parent, reference) = match position {
            AdjacentPosition::BeforeBegin | AdjacentPosition::AfterEnd => {
                let parent = self
                    .arena
                    .parent_element(target)
                    .ok_or_else(|| {
                        DomError::HierarchyRequest(format!(
                            "{} has no parent element to insert into",
                            element
                        ))
                    })?;
                let reference = if position == AdjacentPosition::BeforeBegin {
                    Some(target)
                } else {
                    self.arena.next_sibling(target)
                };
                (parent, reference)
            }
            AdjacentPosition::AfterBegin => {
                (target, self.arena.get(target)?.children_ids.first().copied())
            }
            AdjacentPosition::BeforeEnd => (target, None),
        };

        tracing::debug!("[Document] insert_adjacent_html {:?} on {}", position, element);
        let context = self.fragment_context(parent)?;
        for node_id in parser::parse_fragment(&mut self.arena, html, &context)? {
            self.arena.insert_before(parent, node_id, reference)?;
        }
        Ok(())
    }

    fn get_attribute(&self, element: ElementRef, name: &str) -> Result<Option<String>> {
        Ok(self.node(element)?.attr(name).map(str::to_string))
    }

    fn set_attribute(&mut self, element: ElementRef, name: &str, value: &str) -> Result<()> {
        utils::validate_attribute_name(name)?;
        tracing::debug!("[Document] set_attribute {}={:?} on {}", name, value, element);
        self.node_mut(element)?.set_attr(name, value);
        Ok(())
    }

    fn remove_attribute(&mut self, element: ElementRef, name: &str) -> Result<()> {
        self.node_mut(element)?.remove_attr(name);
        Ok(())
    }

    fn class_contains(&self, element: ElementRef, class_name: &str) -> Result<bool> {
        let node = self.node(element)?;
        Ok(class_tokens(node.attr("class"))
            .iter()
            .any(|c| c == class_name))
    }

    fn class_add(&mut self, element: ElementRef, class_name: &str) -> Result<()> {
        utils::validate_token(class_name)?;
        let mut classes = class_tokens(self.node(element)?.attr("class"));
        if !classes.iter().any(|c| c == class_name) {
            classes.push(class_name.to_string());
        }
        self.write_classes(element, &classes)
    }

    fn class_remove(&mut self, element: ElementRef, class_name: &str) -> Result<()> {
        utils::validate_token(class_name)?;
        let mut classes = class_tokens(self.node(element)?.attr("class"));
        classes.retain(|c| c != class_name);
        self.write_classes(element, &classes)
    }

    fn class_toggle(&mut self, element: ElementRef, class_name: &str) -> Result<bool> {
        utils::validate_token(class_name)?;
        if self.class_contains(element, class_name)? {
            self.class_remove(element, class_name)?;
            Ok(false)
        } else {
            self.class_add(element, class_name)?;
            Ok(true)
        }
    }

    fn style_property(&self, element: ElementRef, property: &str) -> Result<String> {
        let property = property.to_ascii_lowercase();
        let decls = utils::parse_style_declarations(self.node(element)?.attr("style"));
        Ok(decls
            .into_iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value)
            .unwrap_or_default())
    }

    fn set_style_property(
        &mut self,
        element: ElementRef,
        property: &str,
        value: &str,
    ) -> Result<()> {
        let property = property.to_ascii_lowercase();
        let value = value.trim();
        let node = self.node_mut(element)?;
        let mut decls = utils::parse_style_declarations(node.attr("style"));

        if value.is_empty() {
            decls.retain(|(name, _)| *name != property);
        } else {
            match decls.iter_mut().find(|(name, _)| *name == property) {
                Some(existing) => existing.1 = value.to_string(),
                None => decls.push((property, value.to_string())),
            }
        }

        node.set_attr("style", &utils::serialize_style_declarations(&decls));
        Ok(())
    }

    fn value(&self, element: ElementRef) -> Result<String> {
        let node = self.node(element)?;

        if node.is_tag("input") {
            let kind = Self::input_type(node);
            if kind == "checkbox" || kind == "radio" {
                return Ok(node.attr("value").unwrap_or("on").to_string());
            }
            return Ok(match &node.dirty_value {
                Some(value) => value.clone(),
                None => node.attr("value").unwrap_or("").to_string(),
            });
        }
        if node.is_tag("textarea") {
            return Ok(match &node.dirty_value {
                Some(value) => value.clone(),
                None => self.raw_text(element.id()),
            });
        }
        if node.is_tag("select") {
            let options = self.select_options(element.id());
            let selected = options
                .iter()
                .rev()
                .find(|&&id| self.arena.get(id).is_ok_and(|n| n.has_attr("selected")));
            // Once script has set the value, an unmatched value leaves nothing selected
            let chosen = match selected {
                Some(option) => Some(option),
                None if node.dirty_value.is_none() => options.first(),
                None => None,
            };
            return match chosen {
                Some(&option) => self.option_value(option),
                None => Ok(String::new()),
            };
        }
        if node.is_tag("option") {
            return self.option_value(element.id());
        }
        if VALUE_ATTRIBUTE_ELEMENTS.iter().any(|tag| node.is_tag(tag)) {
            return Ok(node.attr("value").unwrap_or("").to_string());
        }

        Err(Self::form_control_error(node, "form control"))
    }

    fn set_value(&mut self, element: ElementRef, value: &str) -> Result<()> {
        tracing::debug!("[Document] set_value {:?} on {}", value, element);
        let node = self.node(element)?;

        if node.is_tag("select") {
            let options = self.select_options(element.id());
            let mut matched = false;
            for option in options {
                let select_this = !matched && self.option_value(option)? == value;
                matched |= select_this;
                let option_node = self.arena.get_mut(option)?;
                if select_this {
                    option_node.set_attr("selected", "");
                } else {
                    option_node.remove_attr("selected");
                }
            }
            self.node_mut(element)?.dirty_value = Some(value.to_string());
            return Ok(());
        }

        let node = self.node_mut(element)?;
        if node.is_tag("input") {
            let kind = Self::input_type(node);
            if kind == "checkbox" || kind == "radio" {
                node.set_attr("value", value);
            } else {
                node.dirty_value = Some(value.to_string());
            }
            Ok(())
        } else if node.is_tag("textarea") {
            node.dirty_value = Some(value.to_string());
            Ok(())
        } else if node.is_tag("option") || VALUE_ATTRIBUTE_ELEMENTS.iter().any(|t| node.is_tag(t))
        {
            node.set_attr("value", value);
            Ok(())
        } else {
            Err(Self::form_control_error(node, "form control"))
        }
    }

    fn checked(&self, element: ElementRef) -> Result<bool> {
        let node = self.node(element)?;
        if !node.is_tag("input") {
            return Err(Self::form_control_error(node, "input"));
        }
        Ok(node
            .dirty_checked
            .unwrap_or_else(|| node.has_attr("checked")))
    }

    fn set_checked(&mut self, element: ElementRef, checked: bool) -> Result<()> {
        let node = self.node(element)?;
        if !node.is_tag("input") {
            return Err(Self::form_control_error(node, "input"));
        }

        let group_name = match node.attr("name") {
            Some(name) if checked && !name.is_empty() && Self::input_type(node) == "radio" => {
                Some(name.to_string())
            }
            _ => None,
        };
        if let Some(name) = group_name {
            for other in self.radio_group(element.id(), &name) {
                self.arena.get_mut(other)?.dirty_checked = Some(false);
            }
        }

        tracing::debug!("[Document] set_checked {} on {}", checked, element);
        self.node_mut(element)?.dirty_checked = Some(checked);
        Ok(())
    }

    fn disabled(&self, element: ElementRef) -> Result<bool> {
        let node = self.node(element)?;
        if !DISABLEABLE_ELEMENTS.iter().any(|tag| node.is_tag(tag)) {
            return Err(Self::form_control_error(node, "form control"));
        }
        Ok(node.has_attr("disabled"))
    }

    fn set_disabled(&mut self, element: ElementRef, disabled: bool) -> Result<()> {
        let node = self.node_mut(element)?;
        if !DISABLEABLE_ELEMENTS.iter().any(|tag| node.is_tag(tag)) {
            return Err(Self::form_control_error(node, "form control"));
        }
        if disabled {
            node.set_attr("disabled", "");
        } else {
            node.remove_attr("disabled");
        }
        Ok(())
    }

    fn create_element(&mut self, tag_name: &str) -> Result<ElementRef> {
        utils::validate_element_name(tag_name)?;
        let node_id = self.arena.create_element(tag_name);
        tracing::debug!("[Document] Created <{}> as node {}", tag_name, node_id);
        Ok(ElementRef::new(node_id))
    }

    fn append_child(&mut self, parent: ElementRef, child: ElementRef) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        self.arena.append_child(parent.id(), child.id())
    }

    fn remove(&mut self, element: ElementRef) -> Result<()> {
        self.node(element)?;
        self.arena.detach(element.id())
    }

    fn title(&self) -> String {
        self.get_elements_by_tag_name("title")
            .next()
            .map(|title| collapse_whitespace(&self.raw_text(title.id())))
            .unwrap_or_default()
    }

    fn set_title(&mut self, title: &str) {
        let existing = self.get_elements_by_tag_name("title").next();
        let target = match existing {
            Some(element) => Some(element),
            None => self.head().map(|head| {
                let title_id = self
                    .arena
                    .push_child(head.id(), DomNode::element(0, "title"));
                ElementRef::new(title_id)
            }),
        };

        match target {
            Some(element) => {
                if let Err(e) = self.set_text_content(element, title) {
                    tracing::warn!("[Document] Failed to set title: {}", e);
                }
            }
            None => tracing::debug!("[Document] No <head>, title left unset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(elements: Elements<'_>) -> Vec<ElementRef> {
        elements.collect()
    }

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>  Old
 title </title></head>
<body>
  <div id="app" class="card wide">
    <p class="note">first</p>
    <p class="note wide">second</p>
  </div>
  <form id="f">
    <input id="r1" type="radio" name="pick" checked>
    <input id="r2" type="radio" name="pick">
    <input id="name" value="initial">
    <input id="cb" type="checkbox">
    <textarea id="ta">raw text</textarea>
    <select id="sel"><option>One</option><option value="2" selected>Two</option></select>
  </form>
  <input id="r3" type="radio" name="pick" checked>
</body></html>"#;

    fn page() -> Document {
        Document::parse_html(PAGE).unwrap()
    }

    fn by_id(doc: &Document, id: &str) -> ElementRef {
        doc.get_element_by_id(id).unwrap()
    }

    #[test]
    fn test_new_document_skeleton() {
        let doc = Document::new();
        let html = doc.document_element().unwrap();
        assert_eq!(doc.tag_name(html).unwrap(), "HTML");
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
        assert_eq!(doc.title(), "");
    }

    #[test]
    fn test_lookup_by_id_class_and_tag() {
        let doc = page();
        let app = by_id(&doc, "app");
        assert_eq!(doc.tag_name(app).unwrap(), "DIV");
        assert!(doc.get_element_by_id("missing").is_none());
        assert!(doc.get_element_by_id("").is_none());

        assert_eq!(collect(doc.get_elements_by_class_name("note")).len(), 2);
        assert_eq!(collect(doc.get_elements_by_class_name(" wide  note ")).len(), 1);
        assert_eq!(collect(doc.get_elements_by_class_name("wide")).len(), 2);
        assert!(collect(doc.get_elements_by_class_name("  ")).is_empty());

        assert_eq!(collect(doc.get_elements_by_tag_name("P")).len(), 2);
        assert_eq!(collect(doc.get_elements_by_tag_name("input")).len(), 5);
        let all = collect(doc.get_elements_by_tag_name("*"));
        assert_eq!(all[0], doc.document_element().unwrap());
    }

    #[test]
    fn test_detached_elements_are_not_found() {
        let mut doc = page();
        let orphan = doc.create_element("span").unwrap();
        doc.set_attribute(orphan, "id", "orphan").unwrap();
        assert!(doc.get_element_by_id("orphan").is_none());

        let body = doc.body().unwrap();
        doc.append_child(body, orphan).unwrap();
        assert_eq!(doc.get_element_by_id("orphan"), Some(orphan));

        doc.remove(orphan).unwrap();
        assert!(doc.get_element_by_id("orphan").is_none());
        assert!(!doc.is_connected(orphan));
    }

    #[test]
    fn test_scoped_query() {
        let doc = page();
        let app = by_id(&doc, "app");
        let form = by_id(&doc, "f");

        let in_app: Vec<_> = doc.query_selector_all(Some(app), "p").unwrap().collect();
        assert_eq!(in_app.len(), 2);
        assert!(doc.query_selector(Some(form), "p").unwrap().is_none());
        // Ancestors outside the scope still take part in matching
        assert!(doc.query_selector(Some(app), "body p.wide").unwrap().is_some());
        assert!(matches!(
            doc.query_selector(None, "p["),
            Err(DomError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_text_and_inner_html() {
        let mut doc = page();
        let app = by_id(&doc, "app");

        doc.set_inner_html(app, "<b>bold</b> &amp; plain").unwrap();
        assert_eq!(doc.inner_html(app).unwrap(), "<b>bold</b> &amp; plain");
        assert_eq!(doc.text_content(app).unwrap(), "bold & plain");

        doc.set_text_content(app, "<i>not markup</i>").unwrap();
        assert_eq!(doc.inner_html(app).unwrap(), "&lt;i&gt;not markup&lt;/i&gt;");
        assert_eq!(doc.children(app).unwrap().count(), 0);

        doc.set_text_content(app, "").unwrap();
        assert_eq!(doc.arena().get(app.id()).unwrap().children_ids.len(), 0);
    }

    #[test]
    fn test_insert_adjacent_html_positions() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        doc.set_inner_html(body, "<p id=\"target\">x</p>").unwrap();
        let target = by_id(&doc, "target");

        doc.insert_adjacent_html(target, AdjacentPosition::BeforeBegin, "<a></a>")
            .unwrap();
        doc.insert_adjacent_html(target, AdjacentPosition::AfterBegin, "<b></b>")
            .unwrap();
        doc.insert_adjacent_html(target, AdjacentPosition::BeforeEnd, "<i></i><u></u>")
            .unwrap();
        doc.insert_adjacent_html(target, AdjacentPosition::AfterEnd, "<s></s>")
            .unwrap();

        assert_eq!(
            doc.inner_html(body).unwrap(),
            "<a></a><p id=\"target\"><b></b>x<i></i><u></u></p><s></s>"
        );

        let detached = doc.create_element("div").unwrap();
        assert!(doc
            .insert_adjacent_html(detached, AdjacentPosition::AfterEnd, "<b></b>")
            .is_err());
    }

    #[test]
    fn test_adjacent_html_parsed_against_insertion_parent() {
        let mut doc = Document::parse_html(
            r#"<table><tbody><tr id="row"><td id="cell">1</td></tr></tbody></table>"#,
        )
        .unwrap();
        let row = by_id(&doc, "row");
        let cell = by_id(&doc, "cell");

        doc.insert_adjacent_html(row, AdjacentPosition::AfterEnd, "<tr><td>2</td></tr>")
            .unwrap();
        doc.insert_adjacent_html(cell, AdjacentPosition::BeforeBegin, "<td>0</td>")
            .unwrap();

        let tbody = doc.query_selector(None, "tbody").unwrap().unwrap();
        assert_eq!(
            doc.inner_html(tbody).unwrap(),
            "<tr id=\"row\"><td>0</td><td id=\"cell\">1</td></tr><tr><td>2</td></tr>"
        );
    }

    #[test]
    fn test_class_list_semantics() {
        let mut doc = Document::new();
        let el = doc.create_element("div").unwrap();

        doc.class_remove(el, "ghost").unwrap();
        assert_eq!(doc.get_attribute(el, "class").unwrap(), None);

        doc.class_add(el, "a").unwrap();
        doc.class_add(el, "a").unwrap();
        doc.class_add(el, "b").unwrap();
        assert_eq!(doc.get_attribute(el, "class").unwrap().as_deref(), Some("a b"));

        assert!(!doc.class_toggle(el, "a").unwrap());
        doc.class_remove(el, "b").unwrap();
        assert_eq!(doc.get_attribute(el, "class").unwrap().as_deref(), Some(""));

        assert!(matches!(
            doc.class_add(el, ""),
            Err(DomError::InvalidToken { .. })
        ));
        assert!(doc.class_add(el, "two words").is_err());
    }

    #[test]
    fn test_inline_style() {
        let mut doc = Document::new();
        let el = doc.create_element("div").unwrap();
        doc.set_attribute(el, "style", "color: red").unwrap();

        assert_eq!(doc.style_property(el, "display").unwrap(), "");
        doc.set_style_property(el, "display", "none").unwrap();
        assert_eq!(doc.style_property(el, "DISPLAY").unwrap(), "none");
        assert_eq!(
            doc.get_attribute(el, "style").unwrap().as_deref(),
            Some("color: red; display: none;")
        );

        doc.set_style_property(el, "color", "").unwrap();
        assert_eq!(
            doc.get_attribute(el, "style").unwrap().as_deref(),
            Some("display: none;")
        );
    }

    #[test]
    fn test_form_values() {
        let mut doc = page();
        let name = by_id(&doc, "name");
        let ta = by_id(&doc, "ta");
        let sel = by_id(&doc, "sel");
        let cb = by_id(&doc, "cb");

        assert_eq!(doc.value(name).unwrap(), "initial");
        doc.set_value(name, "typed").unwrap();
        assert_eq!(doc.value(name).unwrap(), "typed");
        assert_eq!(doc.get_attribute(name, "value").unwrap().as_deref(), Some("initial"));

        assert_eq!(doc.value(ta).unwrap(), "raw text");
        doc.set_value(ta, "edited").unwrap();
        assert_eq!(doc.value(ta).unwrap(), "edited");

        assert_eq!(doc.value(sel).unwrap(), "2");
        doc.set_value(sel, "One").unwrap();
        assert_eq!(doc.value(sel).unwrap(), "One");
        doc.set_value(sel, "nope").unwrap();
        assert_eq!(doc.value(sel).unwrap(), "");
        assert!(doc.query_selector(Some(sel), "[selected]").unwrap().is_none());
        doc.set_value(sel, "2").unwrap();
        assert_eq!(doc.value(sel).unwrap(), "2");

        assert_eq!(doc.value(cb).unwrap(), "on");
        doc.set_value(cb, "yes").unwrap();
        assert_eq!(doc.get_attribute(cb, "value").unwrap().as_deref(), Some("yes"));

        let app = by_id(&doc, "app");
        assert!(matches!(
            doc.value(app),
            Err(DomError::InvalidNodeType { .. })
        ));
    }

    #[test]
    fn test_radio_group_scoped_to_form() {
        let mut doc = page();
        let r1 = by_id(&doc, "r1");
        let r2 = by_id(&doc, "r2");
        let r3 = by_id(&doc, "r3");

        assert!(doc.checked(r1).unwrap());
        doc.set_checked(r2, true).unwrap();
        assert!(doc.checked(r2).unwrap());
        assert!(!doc.checked(r1).unwrap());
        // r3 lives outside the form, so it is a different group
        assert!(doc.checked(r3).unwrap());
    }

    #[test]
    fn test_disabled_reflects_attribute() {
        let mut doc = page();
        let name = by_id(&doc, "name");
        assert!(!doc.disabled(name).unwrap());
        doc.set_disabled(name, true).unwrap();
        assert_eq!(doc.get_attribute(name, "disabled").unwrap().as_deref(), Some(""));
        assert!(doc.disabled(name).unwrap());
        doc.set_disabled(name, false).unwrap();
        assert!(!doc.disabled(name).unwrap());

        let app = by_id(&doc, "app");
        assert!(doc.disabled(app).is_err());
        assert!(doc.checked(app).is_err());
    }

    #[test]
    fn test_title() {
        let mut doc = page();
        assert_eq!(doc.title(), "Old title");
        doc.set_title("New");
        assert_eq!(doc.title(), "New");

        let mut fresh = Document::new();
        fresh.set_title("Made");
        assert_eq!(fresh.title(), "Made");
        let head = fresh.head().unwrap();
        assert_eq!(fresh.inner_html(head).unwrap(), "<title>Made</title>");
    }

    #[test]
    fn test_create_element_validates_name() {
        let mut doc = Document::new();
        let el = doc.create_element("SECTION").unwrap();
        assert_eq!(doc.outer_html(el).unwrap(), "<section></section>");
        assert!(matches!(
            doc.create_element("no good"),
            Err(DomError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn test_stale_reference() {
        let doc = Document::new();
        let bogus = ElementRef::new(999);
        assert!(matches!(
            doc.text_content(bogus),
            Err(DomError::NodeNotFound(999))
        ));
        assert!(matches!(
            doc.text_content(ElementRef::new(DOCUMENT_NODE_ID)),
            Err(DomError::NotAnElement(0))
        ));
    }

    #[test]
    fn test_from_cdp() {
        let cdp_json = serde_json::json!({
            "root": {
                "nodeId": 1, "backendNodeId": 10, "nodeType": 9, "nodeName": "#document",
                "children": [{
                    "nodeId": 2, "backendNodeId": 11, "nodeType": 1, "nodeName": "HTML",
                    "children": [{
                        "nodeId": 3, "backendNodeId": 12, "nodeType": 1, "nodeName": "BODY",
                        "attributes": ["id", "b"]
                    }]
                }]
            }
        });
        let doc = Document::from_cdp(&cdp_json).unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.element_by_backend_id(12), Some(body));
        assert_eq!(doc.get_element_by_id("b"), Some(body));
        assert_eq!(doc.element_by_backend_id(10), None);
    }
}
