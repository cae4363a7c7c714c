//! Arena-backed document snapshot.

use std::collections::BTreeMap;

use tracing::trace;

use crate::element::ElementRef;
use crate::error::DomError;
use crate::node::DomNode;
use crate::selector::Selector;

/// Index of an element in its [`Document`]. Ordering is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub visible: bool,
    pub handle: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// One past the last descendant's index.
    pub subtree_end: usize,
}

/// Immutable page snapshot with nodes stored in pre-order.
#[derive(Debug, Clone)]
pub struct Document {
    url: String,
    pub(crate) nodes: Vec<NodeData>,
}

impl Document {
    pub fn from_root(url: impl Into<String>, root: DomNode) -> Self {
        let mut nodes = Vec::new();
        flatten(root, None, &mut nodes);
        trace!(nodes = nodes.len(), "Built document snapshot");
        Self {
            url: url.into(),
            nodes,
        }
    }

    /// Parse a snapshot serialized as a [`DomNode`] tree.
    pub fn from_json(url: impl Into<String>, json: &str) -> Result<Self, DomError> {
        let root: DomNode = serde_json::from_str(json)?;
        Ok(Self::from_root(url, root))
    }

    /// A document holding only an empty `<html>` element.
    pub fn empty(url: impl Into<String>) -> Self {
        Self::from_root(url, DomNode::element("html"))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> ElementRef<'_> {
        ElementRef::new(self, NodeId(0))
    }

    pub fn get(&self, id: NodeId) -> Option<ElementRef<'_>> {
        (id.0 < self.nodes.len()).then(|| ElementRef::new(self, id))
    }

    /// Every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        (0..self.nodes.len()).map(move |i| ElementRef::new(self, NodeId(i)))
    }

    /// Element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        self.elements().find(|e| e.attr("id") == Some(id))
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.elements().find(|e| selector.matches(e))
    }

    pub fn select_all(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        self.elements().filter(|e| selector.matches(e)).collect()
    }

    /// First element, in document order, matching any selector of the group.
    pub fn select_first_of(&self, group: &[Selector]) -> Option<ElementRef<'_>> {
        self.elements().find(|e| group.iter().any(|s| s.matches(e)))
    }

    /// Every element, in document order, matching any selector of the group.
    pub fn select_all_of(&self, group: &[Selector]) -> Vec<ElementRef<'_>> {
        self.elements()
            .filter(|e| group.iter().any(|s| s.matches(e)))
            .collect()
    }

    pub fn exists(&self, selector: &Selector) -> bool {
        self.select_first(selector).is_some()
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }
}

fn flatten(node: DomNode, parent: Option<NodeId>, nodes: &mut Vec<NodeData>) -> NodeId {
    let id = NodeId(nodes.len());
    nodes.push(NodeData {
        tag: node.tag.to_ascii_lowercase(),
        attributes: node.attributes,
        text: node.text,
        visible: node.visible,
        handle: node.handle,
        parent,
        children: Vec::with_capacity(node.children.len()),
        subtree_end: id.0 + 1,
    });

    for child in node.children {
        let child_id = flatten(child, Some(id), nodes);
        nodes[id.0].children.push(child_id);
    }
    nodes[id.0].subtree_end = nodes.len();
    id
}
