//! Borrowed view of one element in a [`Document`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::document::{Document, NodeId};
use crate::error::DomError;
use crate::selector::{Matcher, Selector};

/// Address of a live element, handed back to the shell for mutations and clicks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementLocator {
    /// Shell-issued handle, when the snapshot carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// Structural CSS path from the document root.
    pub css_path: String,
}

#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub(crate) fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn tag(&self) -> &'a str {
        &self.doc.data(self.id).tag
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.doc.data(self.id).attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.doc.data(self.id).attributes.contains_key(name)
    }

    /// `data-{name}` attribute.
    pub fn data(&self, name: &str) -> Option<&'a str> {
        self.attr(&format!("data-{name}"))
    }

    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Direct text of this element.
    pub fn own_text(&self) -> &'a str {
        &self.doc.data(self.id).text
    }

    /// Text of this element and all descendants, in document order.
    pub fn text_content(&self) -> String {
        let data = self.doc.data(self.id);
        self.doc.nodes[self.id.0..data.subtree_end]
            .iter()
            .map(|n| n.text.as_str())
            .collect()
    }

    /// Rendered, i.e. neither this element nor an ancestor is hidden.
    pub fn is_visible(&self) -> bool {
        std::iter::once(*self)
            .chain(self.ancestors())
            .all(|e| e.doc.data(e.id).visible)
    }

    pub fn parent(&self) -> Option<ElementRef<'a>> {
        self.doc
            .data(self.id)
            .parent
            .map(|p| ElementRef::new(self.doc, p))
    }

    pub fn ancestors(&self) -> impl Iterator<Item = ElementRef<'a>> {
        std::iter::successors(self.parent(), |e| e.parent())
    }

    pub fn children(&self) -> impl Iterator<Item = ElementRef<'a>> {
        let doc = self.doc;
        doc.data(self.id)
            .children
            .iter()
            .map(move |&c| ElementRef::new(doc, c))
    }

    /// Descendants in document order, excluding this element.
    pub fn descendants(&self) -> impl Iterator<Item = ElementRef<'a>> {
        let doc = self.doc;
        let end = doc.data(self.id).subtree_end;
        (self.id.0 + 1..end).map(move |i| ElementRef::new(doc, NodeId(i)))
    }

    pub fn contains(&self, other: &ElementRef<'_>) -> bool {
        let end = self.doc.data(self.id).subtree_end;
        std::ptr::eq(self.doc, other.doc) && other.id.0 >= self.id.0 && other.id.0 < end
    }

    /// This element or its nearest ancestor matching `matcher`.
    pub fn closest(&self, matcher: &Matcher) -> Option<ElementRef<'a>> {
        std::iter::once(*self)
            .chain(self.ancestors())
            .find(|e| matcher.matches(e))
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.descendants().find(|e| selector.matches(e))
    }

    pub fn select_all(&self, selector: &Selector) -> Vec<ElementRef<'a>> {
        self.descendants().filter(|e| selector.matches(e)).collect()
    }

    pub fn select_first_of(&self, group: &[Selector]) -> Option<ElementRef<'a>> {
        self.descendants()
            .find(|e| group.iter().any(|s| s.matches(e)))
    }

    /// Decode a JSON-valued attribute such as `data-params`.
    pub fn json_attr<T: DeserializeOwned>(&self, name: &str) -> Result<T, DomError> {
        let raw = self.attr(name).ok_or_else(|| DomError::MalformedParams {
            element: self.describe(),
            message: format!("missing attribute '{name}'"),
        })?;
        serde_json::from_str(raw).map_err(|e| DomError::MalformedParams {
            element: self.describe(),
            message: e.to_string(),
        })
    }

    pub fn handle(&self) -> Option<&'a str> {
        self.doc.data(self.id).handle.as_deref()
    }

    pub fn locator(&self) -> ElementLocator {
        ElementLocator {
            handle: self.handle().map(str::to_string),
            css_path: self.css_path(),
        }
    }

    /// `tag#id` when the element has an id, else `tag:nth-child(n)`, joined by ` > `.
    pub fn css_path(&self) -> String {
        let mut segments: Vec<String> = std::iter::once(*self)
            .chain(self.ancestors())
            .map(|e| e.path_segment())
            .collect();
        segments.reverse();
        segments.join(" > ")
    }

    fn path_segment(&self) -> String {
        if let Some(id) = self.attr("id").filter(|id| !id.is_empty()) {
            return format!("{}#{}", self.tag(), id);
        }
        match self.parent() {
            Some(parent) => {
                let position = parent
                    .children()
                    .position(|c| c.id == self.id)
                    .unwrap_or(0);
                format!("{}:nth-child({})", self.tag(), position + 1)
            }
            None => self.tag().to_string(),
        }
    }

    fn describe(&self) -> String {
        match self.attr("id") {
            Some(id) => format!("{}#{}", self.tag(), id),
            None => self.tag().to_string(),
        }
    }
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for ElementRef<'_> {}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("tag", &self.tag())
            .field("attributes", &self.doc.data(self.id).attributes)
            .finish()
    }
}
