//! Arena-backed XML element tree.
//!
//! The trimmer only ever deletes elements, so the tree keeps the original
//! source bytes and records, for every element, the byte span it occupies.
//! Removing an element flags it (and its subtree) as dead; rendering copies
//! the source with the spans of dead elements cut out. Everything that
//! survives is reproduced byte for byte.
//!
//! ```text
//! Document
//! ├── source: Vec<u8>            (original bytes, never modified)
//! ├── elements: Vec<Element>     (pre-order, indexed by NodeId)
//! │     ├── tag / local_name
//! │     ├── attributes: IndexMap (source order, unescaped values)
//! │     ├── parent: Option<NodeId>
//! │     ├── children: Vec<NodeId>
//! │     └── span: Span           (bytes of the element in `source`)
//! └── root: NodeId
//! ```

mod reader;
mod render;

use std::path::Path;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::TrimError;

/// Index of an element in a [`Document`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Byte range of an element in the source document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    /// Offset of the opening `<`.
    pub start: usize,
    /// Offset one past the closing `>`.
    pub end: usize,
}

/// A single element record in the arena.
#[derive(Clone, Debug)]
pub struct Element {
    tag: SmolStr,
    local_name: SmolStr,
    attributes: IndexMap<SmolStr, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    span: Span,
    removed: bool,
}

impl Element {
    /// Qualified tag name as written, e.g. `edmx:DataServices`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Tag name without its namespace prefix, e.g. `DataServices`.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attributes in source order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// A parsed XML document that supports in-place element removal.
#[derive(Clone, Debug)]
pub struct Document {
    source: Vec<u8>,
    elements: Vec<Element>,
    root: NodeId,
}

impl Document {
    /// Parse a document from raw bytes.
    pub fn parse(source: impl Into<Vec<u8>>) -> Result<Self, TrimError> {
        reader::parse(source.into())
    }

    /// Load and parse a document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrimError> {
        let path = path.as_ref();
        let source = std::fs::read(path).map_err(|e| TrimError::io(path, e))?;
        let document = Self::parse(source)?;
        tracing::debug!(
            "Loaded {} ({} elements)",
            path.display(),
            document.elements.len()
        );
        Ok(document)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.elements[id.0]
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).attribute(name)
    }

    /// Read an attribute that must be present for the document to be valid.
    pub fn required_attribute(
        &self,
        id: NodeId,
        name: &'static str,
    ) -> Result<&str, TrimError> {
        let element = self.element(id);
        element
            .attribute(name)
            .ok_or_else(|| TrimError::missing_attribute(element.tag(), name))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).parent
    }

    pub fn is_removed(&self, id: NodeId) -> bool {
        self.element(id).removed
    }

    /// Live elements with the given local tag name, in document order.
    pub fn elements_by_tag<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| !e.removed && e.local_name == local_name)
            .map(|(index, _)| NodeId(index))
    }

    /// Live direct children of `parent` with the given local tag name.
    pub fn children_by_tag<'a>(
        &'a self,
        parent: NodeId,
        local_name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.element(parent)
            .children
            .iter()
            .copied()
            .filter(move |&child| {
                let e = self.element(child);
                !e.removed && e.local_name == local_name
            })
    }

    /// Number of live elements with the given local tag name.
    pub fn count(&self, local_name: &str) -> usize {
        self.elements_by_tag(local_name).count()
    }

    /// Remove an element together with its subtree.
    ///
    /// Returns `false` if the element was already removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if self.elements[id.0].removed {
            return false;
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let element = &mut self.elements[next.0];
            element.removed = true;
            stack.extend(element.children.iter().copied());
        }
        true
    }

    /// Total number of element records, live or removed.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
