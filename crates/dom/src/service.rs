//! DOM Service - shorthand element/document helpers
//!
//! Every method is one direct, uncached call into the injected host
//! document. Sequence-returning lookups copy the host's results into a
//! `Vec`, so later document mutations never change a result already handed
//! out. Accessors come in getter/setter pairs; setters hand back the value
//! read from the host afterwards, which is not always the input verbatim
//! (text is stringified, a `<select>` may not accept the value).

use crate::error::Result;
use crate::host::{AdjacentPosition, HostDocument};
use crate::types::ElementRef;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Inline `display` value that marks an element hidden
pub const HIDDEN_DISPLAY: &str = "none";

/// Configuration for DOM service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomServiceConfig {
    /// Inline `display` value written by `show`
    pub visible_display: String,
}

impl Default for DomServiceConfig {
    fn default() -> Self {
        Self {
            visible_display: "block".to_string(),
        }
    }
}

impl DomServiceConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Shorthand helpers bound to one host document
pub struct DomService<D: HostDocument> {
    config: DomServiceConfig,
    document: D,
}

impl<D: HostDocument> DomService<D> {
    /// Create new DOM service with default config
    pub fn new(document: D) -> Self {
        Self::with_config(document, DomServiceConfig::default())
    }

    /// Create DOM service with custom config
    pub fn with_config(document: D, config: DomServiceConfig) -> Self {
        Self { config, document }
    }

    pub fn config(&self) -> &DomServiceConfig {
        &self.config
    }

    /// The host document, for native calls the helpers do not cover
    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    // ---------------------------------------------------------------
    // Element locator
    // ---------------------------------------------------------------

    pub fn get_by_id(&self, id: &str) -> Option<ElementRef> {
        tracing::trace!("[DomService] get_by_id {:?}", id);
        self.document.get_element_by_id(id)
    }

    /// Snapshot of elements carrying every class in `names`
    pub fn get_by_class(&self, names: &str) -> Vec<ElementRef> {
        tracing::trace!("[DomService] get_by_class {:?}", names);
        self.document.get_elements_by_class_name(names).collect()
    }

    /// Snapshot of elements with the given tag name (`*` for all)
    pub fn get_by_tag(&self, name: &str) -> Vec<ElementRef> {
        tracing::trace!("[DomService] get_by_tag {:?}", name);
        self.document.get_elements_by_tag_name(name).collect()
    }

    /// First match below `scope`, or below the document when `scope` is `None`
    pub fn query_selector(
        &self,
        selector: &str,
        scope: Option<ElementRef>,
    ) -> Result<Option<ElementRef>> {
        tracing::trace!("[DomService] query_selector {:?} in {:?}", selector, scope);
        self.document.query_selector(scope, selector)
    }

    /// Snapshot of all matches below `scope` (document when `None`)
    pub fn query_selector_all(
        &self,
        selector: &str,
        scope: Option<ElementRef>,
    ) -> Result<Vec<ElementRef>> {
        tracing::trace!("[DomService] query_selector_all {:?} in {:?}", selector, scope);
        Ok(self.document.query_selector_all(scope, selector)?.collect())
    }

    /// The `index`-th element child, `None` when out of range
    pub fn child_at(&self, element: ElementRef, index: usize) -> Result<Option<ElementRef>> {
        Ok(self.document.children(element)?.nth(index))
    }

    // ---------------------------------------------------------------
    // Visibility
    // ---------------------------------------------------------------

    pub fn show(&mut self, element: ElementRef) -> Result<()> {
        tracing::debug!("[DomService] show {}", element);
        self.document
            .set_style_property(element, "display", &self.config.visible_display)
    }

    pub fn hide(&mut self, element: ElementRef) -> Result<()> {
        tracing::debug!("[DomService] hide {}", element);
        self.document
            .set_style_property(element, "display", HIDDEN_DISPLAY)
    }

    /// Anything but an inline `display: none` counts as visible
    pub fn visible(&self, element: ElementRef) -> Result<bool> {
        let display = self.document.style_property(element, "display")?;
        // CSS keywords are ASCII case-insensitive
        Ok(!display.eq_ignore_ascii_case(HIDDEN_DISPLAY))
    }

    pub fn set_visible(&mut self, element: ElementRef, visible: bool) -> Result<bool> {
        if visible {
            self.show(element)?;
        } else {
            self.hide(element)?;
        }
        self.visible(element)
    }

    // ---------------------------------------------------------------
    // Content & value accessors
    // ---------------------------------------------------------------

    pub fn text(&self, element: ElementRef) -> Result<String> {
        self.document.text_content(element)
    }

    /// Replace the element's content with `text` (stringified)
    pub fn set_text(&mut self, element: ElementRef, text: impl Display) -> Result<String> {
        self.document.set_text_content(element, &text.to_string())?;
        self.text(element)
    }

    pub fn value(&self, element: ElementRef) -> Result<String> {
        self.document.value(element)
    }

    pub fn set_value(&mut self, element: ElementRef, value: impl Display) -> Result<String> {
        self.document.set_value(element, &value.to_string())?;
        self.value(element)
    }

    pub fn inner_html(&self, element: ElementRef) -> Result<String> {
        self.document.inner_html(element)
    }

    pub fn set_inner_html(&mut self, element: ElementRef, html: &str) -> Result<String> {
        self.document.set_inner_html(element, html)?;
        self.inner_html(element)
    }

    /// Parse `html` and insert it after the element's last child
    pub fn append_html(&mut self, element: ElementRef, html: &str) -> Result<()> {
        self.document
            .insert_adjacent_html(element, AdjacentPosition::BeforeEnd, html)
    }

    /// Attribute value, `""` when the attribute is absent
    pub fn attribute(&self, element: ElementRef, name: &str) -> Result<String> {
        Ok(self
            .document
            .get_attribute(element, name)?
            .unwrap_or_default())
    }

    pub fn set_attribute(&mut self, element: ElementRef, name: &str, value: &str) -> Result<String> {
        self.document.set_attribute(element, name, value)?;
        self.attribute(element, name)
    }

    pub fn checked(&self, element: ElementRef) -> Result<bool> {
        self.document.checked(element)
    }

    pub fn set_checked(&mut self, element: ElementRef, checked: bool) -> Result<bool> {
        self.document.set_checked(element, checked)?;
        self.checked(element)
    }

    pub fn disabled(&self, element: ElementRef) -> Result<bool> {
        self.document.disabled(element)
    }

    pub fn set_disabled(&mut self, element: ElementRef, disabled: bool) -> Result<bool> {
        self.document.set_disabled(element, disabled)?;
        self.disabled(element)
    }

    // ---------------------------------------------------------------
    // Class list
    // ---------------------------------------------------------------

    pub fn add_class(&mut self, element: ElementRef, class_names: &[&str]) -> Result<()> {
        for class_name in class_names {
            self.document.class_add(element, class_name)?;
        }
        Ok(())
    }

    pub fn remove_class(&mut self, element: ElementRef, class_names: &[&str]) -> Result<()> {
        for class_name in class_names {
            self.document.class_remove(element, class_name)?;
        }
        Ok(())
    }

    /// Remove `old` then add `new`
    pub fn swap_class(&mut self, element: ElementRef, old: &str, new: &str) -> Result<()> {
        self.document.class_remove(element, old)?;
        self.document.class_add(element, new)
    }

    pub fn toggle_class(&mut self, element: ElementRef, class_name: &str) -> Result<()> {
        self.document.class_toggle(element, class_name)?;
        Ok(())
    }

    /// Add every class when `condition` holds, remove them all otherwise
    pub fn ensure_class(
        &mut self,
        element: ElementRef,
        condition: bool,
        class_names: &[&str],
    ) -> Result<()> {
        if condition {
            self.add_class(element, class_names)
        } else {
            self.remove_class(element, class_names)
        }
    }

    // ---------------------------------------------------------------
    // Construction & document
    // ---------------------------------------------------------------

    /// New element, not yet inserted anywhere
    pub fn create_element(&mut self, tag_name: &str) -> Result<ElementRef> {
        self.document.create_element(tag_name)
    }

    pub fn set_title(&mut self, title: &str) {
        tracing::debug!("[DomService] set_title {:?}", title);
        self.document.set_title(title);
    }
}
