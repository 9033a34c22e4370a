//! The host document boundary
//!
//! `HostDocument` is the set of native document/element primitives the
//! shorthand helpers are built on. Each method is one platform call; the
//! helpers never reach for a global document, they are handed one.

use crate::error::Result;
use crate::types::ElementRef;

/// Element sequence borrowed from the host.
///
/// Platform collections such as `getElementsByTagName` are live; the borrow
/// keeps the document frozen while this is alive, and callers that need to
/// keep the result collect it into a `Vec`.
pub type Elements<'a> = Box<dyn Iterator<Item = ElementRef> + 'a>;

/// Position argument of `insertAdjacentHTML`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjacentPosition {
    BeforeBegin,
    AfterBegin,
    BeforeEnd,
    AfterEnd,
}

pub trait HostDocument {
    // Lookup

    fn get_element_by_id(&self, id: &str) -> Option<ElementRef>;

    /// Elements carrying every class in the space separated `names`
    fn get_elements_by_class_name(&self, names: &str) -> Elements<'_>;

    fn get_elements_by_tag_name(&self, name: &str) -> Elements<'_>;

    /// First match among the descendants of `scope` (document when `None`)
    fn query_selector(&self, scope: Option<ElementRef>, selector: &str)
        -> Result<Option<ElementRef>>;

    fn query_selector_all(&self, scope: Option<ElementRef>, selector: &str)
        -> Result<Elements<'_>>;

    /// Element children, in order
    fn children(&self, element: ElementRef) -> Result<Elements<'_>>;

    fn body(&self) -> Option<ElementRef>;

    // Content

    fn text_content(&self, element: ElementRef) -> Result<String>;

    fn set_text_content(&mut self, element: ElementRef, text: &str) -> Result<()>;

    fn inner_html(&self, element: ElementRef) -> Result<String>;

    fn set_inner_html(&mut self, element: ElementRef, html: &str) -> Result<()>;

    fn insert_adjacent_html(
        &mut self,
        element: ElementRef,
        position: AdjacentPosition,
        html: &str,
    ) -> Result<()>;

    // Attributes, classes, inline style

    fn get_attribute(&self, element: ElementRef, name: &str) -> Result<Option<String>>;

    fn set_attribute(&mut self, element: ElementRef, name: &str, value: &str) -> Result<()>;

    fn remove_attribute(&mut self, element: ElementRef, name: &str) -> Result<()>;

    fn class_contains(&self, element: ElementRef, class_name: &str) -> Result<bool>;

    fn class_add(&mut self, element: ElementRef, class_name: &str) -> Result<()>;

    fn class_remove(&mut self, element: ElementRef, class_name: &str) -> Result<()>;

    /// Returns whether the class is present afterwards
    fn class_toggle(&mut self, element: ElementRef, class_name: &str) -> Result<bool>;

    /// Inline style property, `""` when unset
    fn style_property(&self, element: ElementRef, property: &str) -> Result<String>;

    /// An empty `value` removes the property
    fn set_style_property(&mut self, element: ElementRef, property: &str, value: &str)
        -> Result<()>;

    // Form controls

    fn value(&self, element: ElementRef) -> Result<String>;

    fn set_value(&mut self, element: ElementRef, value: &str) -> Result<()>;

    fn checked(&self, element: ElementRef) -> Result<bool>;

    fn set_checked(&mut self, element: ElementRef, checked: bool) -> Result<()>;

    fn disabled(&self, element: ElementRef) -> Result<bool>;

    fn set_disabled(&mut self, element: ElementRef, disabled: bool) -> Result<()>;

    // Tree and document

    /// New, unattached element
    fn create_element(&mut self, tag_name: &str) -> Result<ElementRef>;

    fn append_child(&mut self, parent: ElementRef, child: ElementRef) -> Result<()>;

    fn remove(&mut self, element: ElementRef) -> Result<()>;

    fn title(&self) -> String;

    fn set_title(&mut self, title: &str);
}
