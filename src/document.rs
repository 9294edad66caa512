mod node;
mod parse;
mod serialize;

pub use node::{Attribute, ElementData, Node, NodeData, NodeId};

use crate::errors::SelectorError;
use crate::selector::{self, Selector};

/// Whether a document was loaded as a whole page or as body content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Document,
    Fragment,
}

/// An owned, mutable HTML tree.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. The root is
/// always a [`NodeData::Document`] node. In [`Shape::Fragment`] the root's
/// children are the fragment's top-level nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
    shape: Shape,
}

impl Document {
    pub fn new(shape: Shape) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            shape,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes[id.0].as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_element()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_text()
    }

    /// Replaces the content of a text node. Returns `false` for any other node kind.
    pub fn set_text(&mut self, id: NodeId, content: &str) -> bool {
        match &mut self.nodes[id.0].data {
            NodeData::Text(text) => {
                content.clone_into(text);
                true
            }
            _ => false,
        }
    }

    /// Appends a new node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// The parent of `id` when that parent is an element (not the document root).
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&parent| self.is_element(parent))
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
    }

    /// The nearest element before `id` under the same parent.
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (siblings, position) = self.sibling_slot(id)?;
        siblings[..position]
            .iter()
            .rev()
            .copied()
            .find(|&sibling| self.is_element(sibling))
    }

    /// The nearest element after `id` under the same parent.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (siblings, position) = self.sibling_slot(id)?;
        siblings[position + 1..]
            .iter()
            .copied()
            .find(|&sibling| self.is_element(sibling))
    }

    fn sibling_slot(&self, id: NodeId) -> Option<(&[NodeId], usize)> {
        let siblings = self.children(self.parent(id)?);
        let position = siblings.iter().position(|&sibling| sibling == id)?;
        Some((siblings, position))
    }

    /// Pre-order traversal of everything below `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            pending: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(self.root())
            .filter(|&id| self.is_element(id))
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|node| self.node(node).as_text())
            .collect()
    }

    /// Compiles `selector` and resolves it against the current tree.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(selector::resolve(self, &selector))
    }
}

pub struct Descendants<'a> {
    document: &'a Document,
    pending: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.pending.pop()?;
        self.pending
            .extend(self.document.children(next).iter().rev().copied());
        Some(next)
    }
}
