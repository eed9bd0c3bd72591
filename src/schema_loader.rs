//! Schema location hints read from the document element.

use std::path::{Path, PathBuf};

use crate::dom::{DocumentTree, Node};

/// Namespace of `xsi:schemaLocation` and `xsi:noNamespaceSchemaLocation`
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// A schema location hint found on a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReference {
    /// Target namespace the hint is for; `None` for `noNamespaceSchemaLocation`
    pub namespace: Option<String>,
    /// Location exactly as written in the document
    pub url: String,
    pub source_type: SchemaSourceType,
}

/// Type of schema source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSourceType {
    Local(PathBuf),
    Remote(String),
}

impl SchemaReference {
    /// What to hand libxml2 when loading the schema
    pub fn location(&self) -> String {
        match &self.source_type {
            SchemaSourceType::Local(path) => path.display().to_string(),
            SchemaSourceType::Remote(url) => url.clone(),
        }
    }
}

/// Reads schema hints off the document element of a parsed document
pub struct SchemaExtractor;

impl SchemaExtractor {
    /// Every hint on the document element, `noNamespaceSchemaLocation` first
    pub fn extract(tree: &DocumentTree) -> Vec<SchemaReference> {
        let Some(element) = tree.document_element() else {
            return Vec::new();
        };
        let base = tree.source_locator();

        let mut references = Vec::new();

        if let Some(url) = element.attribute_ns_value(XSI_NAMESPACE, "noNamespaceSchemaLocation") {
            let url = url.trim();
            if !url.is_empty() {
                references.push(SchemaReference {
                    namespace: None,
                    url: url.to_string(),
                    source_type: Self::determine_source_type(url, base),
                });
            }
        }

        if let Some(pairs) = element.attribute_ns_value(XSI_NAMESPACE, "schemaLocation") {
            let tokens: Vec<&str> = pairs.split_whitespace().collect();
            // A dangling namespace without a location is ignored.
            for pair in tokens.chunks_exact(2) {
                references.push(SchemaReference {
                    namespace: Some(pair[0].to_string()),
                    url: pair[1].to_string(),
                    source_type: Self::determine_source_type(pair[1], base),
                });
            }
        }

        references
    }

    /// The hint to validate against
    ///
    /// An element without a namespace takes the `noNamespaceSchemaLocation`
    /// hint. A namespaced element takes the `schemaLocation` pair for its
    /// namespace. Otherwise the first hint wins.
    pub fn select(tree: &DocumentTree) -> Option<SchemaReference> {
        let references = Self::extract(tree);
        let namespace = tree
            .document_element()
            .and_then(|element: &Node| element.namespace_uri.clone());

        references
            .iter()
            .find(|reference| reference.namespace == namespace)
            .or_else(|| references.first())
            .cloned()
    }

    /// Resolve `url` relative to the document it was found in
    pub fn determine_source_type(url: &str, document_locator: &str) -> SchemaSourceType {
        if url.starts_with("http://") || url.starts_with("https://") {
            return SchemaSourceType::Remote(url.to_string());
        }

        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() {
            return SchemaSourceType::Local(path.to_path_buf());
        }

        let base_dir = Path::new(document_locator)
            .parent()
            .unwrap_or_else(|| Path::new(""));
        SchemaSourceType::Local(base_dir.join(path))
    }
}
