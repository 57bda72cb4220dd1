//! Arena-backed SVG document tree.
//!
//! Nodes live in a `Vec` and are addressed by stable [`NodeId`]s. Mutations
//! go through [`Document`] methods, so removing a node is just detaching its
//! index from the parent's child list; the record itself stays inert.
//!
//! # Modules
//!
//! - [`parse`]: XML text -> `Document` (quick-xml)
//! - [`write`]: `Document` -> XML text
//! - [`style`]: inline `style` declarations

pub mod parse;
pub mod style;
pub mod write;

use indexmap::IndexMap;

pub use parse::XmlError;
pub use style::{Declaration, Style};

/// Stable handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

// ============================================================================
// Node kinds
// ============================================================================

/// An element with its attributes.
///
/// The inline style lives in the `style` attribute and is parsed on demand,
/// so untouched elements serialize exactly as they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    attrs: IndexMap<String, String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: IndexMap::new(),
        }
    }

    /// Tag name without namespace prefix (`svg:text` -> `text`).
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.local_name() == name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        self.attrs.shift_remove(key)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn attr_count(&self) -> usize {
        self.attrs.len()
    }

    /// Parsed inline style (empty if there is no `style` attribute).
    pub fn style(&self) -> Style {
        self.attr("style").map(Style::parse).unwrap_or_default()
    }

    /// Write back an inline style; an empty style removes the attribute.
    pub fn set_style(&mut self, style: &Style) {
        if style.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", style.to_string());
        }
    }

    /// Property from the inline style, falling back to the presentation
    /// attribute of the same name.
    pub fn style_or_attr(&self, prop: &str) -> Option<String> {
        self.style()
            .get(prop)
            .map(str::to_string)
            .or_else(|| self.attr(prop).map(str::to_string))
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// ============================================================================
// Document
// ============================================================================

/// A mutable SVG tree with a single root element.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Document {
    /// Create a document with a bare root element.
    pub fn new(root: Element) -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Element(root),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    /// Parse XML text; see [`parse::parse`].
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        parse::parse(text)
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.create(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeKind::Text(text.into()))
    }

    // ------------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------------

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn root_element(&self) -> &Element {
        self.element(self.root)
            .expect("document root is always an element")
    }

    pub fn root_element_mut(&mut self) -> &mut Element {
        let root = self.root;
        self.element_mut(root)
            .expect("document root is always an element")
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Direct children that are elements.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
    }

    /// Whether `id` is an element named `name`.
    pub fn is_element(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.is(name))
    }

    /// All attached nodes below `id` (excluding `id`), in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Descendant elements named `name`, in document order.
    pub fn find_all(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.is_element(*n, name))
            .collect()
    }

    /// Whether `id` has an ancestor element named `name`.
    pub fn has_ancestor(&self, id: NodeId, name: &str) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if self.is_element(p, name) {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Concatenated text of all descendant text and CDATA nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in std::iter::once(id).chain(self.descendants(id)) {
            if let NodeKind::Text(t) | NodeKind::CData(t) = self.kind(n) {
                out.push_str(t);
            }
        }
        out
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Detach `id` from its parent. No-op for detached nodes.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Append `child` (detaching it first) as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` at `index` in `parent`'s child list.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Put `new` in place of `old`; `old` ends up detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        let Some(parent) = self.parent(old) else {
            return;
        };
        self.detach(new);
        let children = &mut self.nodes[parent.0].children;
        if let Some(pos) = children.iter().position(|c| *c == old) {
            children[pos] = new;
        }
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
    }

    /// Replace `id` with its own children.
    pub fn unwrap(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for c in &children {
            self.nodes[c.0].parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent.0].children;
        if let Some(pos) = siblings.iter().position(|c| *c == id) {
            siblings.splice(pos..=pos, children);
        }
        self.nodes[id.0].parent = None;
    }

    /// Detach every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for c in children {
            self.nodes[c.0].parent = None;
        }
    }

    /// Serialize the tree as markup.
    pub fn to_xml(&self) -> String {
        write::write(self)
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_xml())
    }
}

// ============================================================================
// Tests
// ============================================================================
