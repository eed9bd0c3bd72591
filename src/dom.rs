//! Owned document tree
//!
//! The parser materializes the whole document into these nodes before any
//! output is produced. The tree is read-only once built.

/// Namespace that `xmlns` and `xmlns:*` declarations belong to
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Node classification used by the printer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Document,
    /// Any kind without a dedicated label
    Other(OtherKind),
}

/// The kinds folded into [`NodeKind::Other`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherKind {
    Attribute,
    CData,
    ProcessingInstruction,
    DocumentType,
    EntityReference,
    Unknown,
}

impl NodeKind {
    /// Label written at the start of the node's line
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Element => "Element: ",
            NodeKind::Text => "Text: ",
            NodeKind::Comment => "Comment: ",
            NodeKind::Document => "Document: ",
            NodeKind::Other(_) => "Other Node: ",
        }
    }
}

/// A node of the parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    pub namespace_uri: Option<String>,
    pub prefix: Option<String>,
    pub local_name: Option<String>,
    pub value: Option<String>,
    /// Only populated for elements
    pub attributes: Vec<Node>,
    pub children: Vec<Node>,
}

impl Node {
    fn bare(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace_uri: None,
            prefix: None,
            local_name: None,
            value: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn named(kind: NodeKind, qname: &str, namespace_uri: Option<&str>) -> Self {
        let (prefix, local) = split_qname(qname);
        Self {
            namespace_uri: namespace_uri.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local_name: Some(local.to_string()),
            ..Self::bare(kind, qname)
        }
    }

    fn from_parts(
        kind: NodeKind,
        local_name: &str,
        prefix: Option<&str>,
        namespace_uri: Option<&str>,
    ) -> Self {
        let name = match prefix {
            Some(prefix) => format!("{prefix}:{local_name}"),
            None => local_name.to_string(),
        };
        Self {
            namespace_uri: namespace_uri.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local_name: Some(local_name.to_string()),
            ..Self::bare(kind, name)
        }
    }

    pub fn document() -> Self {
        Self::bare(NodeKind::Document, "#document")
    }

    /// Element whose name is already split by a namespace-aware parser
    pub fn element_from_parts(
        local_name: &str,
        prefix: Option<&str>,
        namespace_uri: Option<&str>,
    ) -> Self {
        Self::from_parts(NodeKind::Element, local_name, prefix, namespace_uri)
    }

    /// Attribute whose name is already split by a namespace-aware parser
    pub fn attribute_from_parts(
        local_name: &str,
        prefix: Option<&str>,
        namespace_uri: Option<&str>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::from_parts(
                NodeKind::Other(OtherKind::Attribute),
                local_name,
                prefix,
                namespace_uri,
            )
        }
    }

    /// Element without a namespace; a prefix in `qname` is still split off
    pub fn element(qname: &str) -> Self {
        Self::named(NodeKind::Element, qname, None)
    }

    pub fn element_ns(qname: &str, namespace_uri: &str) -> Self {
        Self::named(NodeKind::Element, qname, Some(namespace_uri))
    }

    pub fn attribute(qname: &str, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::named(NodeKind::Other(OtherKind::Attribute), qname, None)
        }
    }

    pub fn attribute_ns(qname: &str, namespace_uri: &str, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::named(
                NodeKind::Other(OtherKind::Attribute),
                qname,
                Some(namespace_uri),
            )
        }
    }

    /// `xmlns` (default namespace) or `xmlns:prefix` declaration as an attribute
    pub fn namespace_declaration(prefix: Option<&str>, uri: impl Into<String>) -> Self {
        match prefix {
            Some(prefix) => Self::attribute_ns(&format!("xmlns:{prefix}"), XMLNS_NAMESPACE, uri),
            None => Self::attribute_ns("xmlns", XMLNS_NAMESPACE, uri),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::bare(NodeKind::Text, "#text")
        }
    }

    pub fn cdata(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::bare(NodeKind::Other(OtherKind::CData), "#cdata-section")
        }
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::bare(NodeKind::Comment, "#comment")
        }
    }

    pub fn processing_instruction(target: &str, data: impl Into<String>) -> Self {
        Self {
            value: Some(data.into()),
            ..Self::bare(NodeKind::Other(OtherKind::ProcessingInstruction), target)
        }
    }

    pub fn document_type(root_name: &str) -> Self {
        Self::bare(NodeKind::Other(OtherKind::DocumentType), root_name)
    }

    pub fn entity_reference(name: &str) -> Self {
        Self::bare(NodeKind::Other(OtherKind::EntityReference), name)
    }

    /// Node of a kind the tree model has no constructor for
    pub fn unknown(name: &str) -> Self {
        Self::bare(NodeKind::Other(OtherKind::Unknown), name)
    }

    pub fn with_attribute(mut self, attribute: Node) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Value of the attribute with the given namespace and local name
    pub fn attribute_ns_value(&self, namespace_uri: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| {
                attr.namespace_uri.as_deref() == Some(namespace_uri)
                    && attr.local_name.as_deref() == Some(local_name)
            })
            .and_then(|attr| attr.value.as_deref())
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|child| child.is_element())
    }
}

/// Split `prefix:local` at the first colon
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, qname),
    }
}

/// A fully parsed document together with the locator it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTree {
    root: Node,
    source_locator: String,
}

impl DocumentTree {
    pub fn new(root: Node, source_locator: impl Into<String>) -> Self {
        Self {
            root,
            source_locator: source_locator.into(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn source_locator(&self) -> &str {
        &self.source_locator
    }

    /// The single top-level element, if the document has one
    pub fn document_element(&self) -> Option<&Node> {
        self.root.element_children().next()
    }

    pub fn into_root(self) -> Node {
        self.root
    }
}
