//! In-memory tree for configuration documents.

use std::fmt;

use super::DocumentError;

/// Root element name every configuration document must carry.
pub const ROOT_NAME: &str = "configuration";

/// The kind of a node, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
    DocumentType,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Document => "document",
            NodeKind::Element => "element",
            NodeKind::Text => "text",
            NodeKind::CData => "cdata",
            NodeKind::Comment => "comment",
            NodeKind::ProcessingInstruction => "processing-instruction",
            NodeKind::DocumentType => "document-type",
        };
        f.write_str(name)
    }
}

/// A child of an element, or a top-level item around the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    /// Raw instruction content, target first (`target data`).
    ProcessingInstruction(String),
    DocumentType(String),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Element(_) => NodeKind::Element,
            Node::Text(_) => NodeKind::Text,
            Node::CData(_) => NodeKind::CData,
            Node::Comment(_) => NodeKind::Comment,
            Node::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
            Node::DocumentType(_) => NodeKind::DocumentType,
        }
    }

    /// Appends `element` as a child of this node and returns this node's
    /// element.
    ///
    /// Only element nodes hold children; every other kind fails with
    /// [`DocumentError::UnsupportedNodeKind`].
    pub fn add_element(&mut self, element: Element) -> Result<&mut Element, DocumentError> {
        match self {
            Node::Element(parent) => Ok(parent.add_element(element)),
            other => Err(DocumentError::UnsupportedNodeKind(other.kind())),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A named element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets an attribute at construction time.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Overwrites the attribute if present, otherwise appends it.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// First direct child element called `name`.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn element_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    /// Appends `element` and returns `self` for chaining.
    pub fn add_element(&mut self, element: Element) -> &mut Self {
        self.push(element)
    }

    pub fn push(&mut self, node: impl Into<Node>) -> &mut Self {
        self.children.push(node.into());
        self
    }
}

/// The `<?xml ...?>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("utf-8".to_string()),
            standalone: None,
        }
    }
}

/// A parsed configuration document.
///
/// The root element always exists; whether it is a *configuration* root is
/// checked by every operation that touches it (see [`ConfigDocument::root_mut`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    pub(crate) declaration: Option<Declaration>,
    pub(crate) prolog: Vec<Node>,
    pub(crate) root: Element,
    pub(crate) epilog: Vec<Node>,
}

impl ConfigDocument {
    pub(crate) fn with_root(root: Element) -> Self {
        Self {
            declaration: Some(Declaration::default()),
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::Document
    }

    pub fn declaration(&self) -> Option<&Declaration> {
        self.declaration.as_ref()
    }

    /// The root element, regardless of its name.
    pub fn root_element(&self) -> &Element {
        &self.root
    }

    /// The configuration root, or [`DocumentError::InvalidDocument`] when the
    /// root element has another name.
    pub fn root(&self) -> Result<&Element, DocumentError> {
        self.check_root()?;
        Ok(&self.root)
    }

    pub fn root_mut(&mut self) -> Result<&mut Element, DocumentError> {
        self.check_root()?;
        Ok(&mut self.root)
    }

    fn check_root(&self) -> Result<(), DocumentError> {
        if self.root.name == ROOT_NAME {
            Ok(())
        } else {
            Err(DocumentError::InvalidDocument {
                expected: ROOT_NAME,
                found: self.root.name.clone(),
            })
        }
    }

    /// Appends `element` under the configuration root and returns the root.
    pub fn add_element(&mut self, element: Element) -> Result<&mut Element, DocumentError> {
        Ok(self.root_mut()?.add_element(element))
    }
}
