//! Tree Printer
//!
//! Writes one line per node in document order. Elements list their
//! attributes right after their own line, two levels deeper, before any of
//! their children.

use std::io::{self, Write};

use crate::dom::{Node, NodeKind};

/// One level of indentation
pub const INDENT_UNIT: &str = " ";

/// Stand-in for a value made only of whitespace
pub const WHITESPACE_TOKEN: &str = "[Whitespace]";

/// Extra depth of an element's attributes relative to the element itself
const ATTRIBUTE_DEPTH_OFFSET: usize = 2;

/// Depth-first, pre-order renderer of a node tree
pub struct TreePrinter<W: Write> {
    out: W,
}

impl<W: Write> TreePrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Render `root` and all of its descendants, starting at depth 0
    pub fn render(&mut self, root: &Node) -> io::Result<()> {
        self.visit(root, 0)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn visit(&mut self, node: &Node, depth: usize) -> io::Result<()> {
        self.write_line(node, depth)?;

        if node.kind == NodeKind::Element {
            for attribute in &node.attributes {
                self.write_line(attribute, depth + ATTRIBUTE_DEPTH_OFFSET)?;
            }
        }

        for child in &node.children {
            self.visit(child, depth + 1)?;
        }
        Ok(())
    }

    fn write_line(&mut self, node: &Node, depth: usize) -> io::Result<()> {
        self.out.write_all(format_node_line(node, depth).as_bytes())
    }
}

/// The full line for `node` at `depth`, newline included
pub fn format_node_line(node: &Node, depth: usize) -> String {
    let mut line = INDENT_UNIT.repeat(depth);
    line.push_str(node.kind.label());
    line.push_str(&format!(" nodeName=\"{}\"", node.name));

    if let Some(uri) = &node.namespace_uri {
        line.push_str(&format!(" uri=\"{}\"", uri));
    }
    if let Some(prefix) = &node.prefix {
        line.push_str(&format!(" prefix=\"{}\"", prefix));
    }
    if let Some(local_name) = &node.local_name {
        line.push_str(&format!(" localName=\"{}\"", local_name));
    }
    if let Some(value) = &node.value {
        line.push_str(" nodeValue=");
        if is_blank(value) {
            line.push_str(WHITESPACE_TOKEN);
        } else {
            // Embedded quotes are written as-is.
            line.push('"');
            line.push_str(value);
            line.push('"');
        }
    }

    line.push('\n');
    line
}

/// Render a whole tree into a string
pub fn render_to_string(root: &Node) -> String {
    let mut printer = TreePrinter::new(Vec::new());
    // Writing into a Vec cannot fail.
    let _ = printer.render(root);
    String::from_utf8_lossy(&printer.into_inner()).into_owned()
}

fn is_blank(value: &str) -> bool {
    value
        .trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r'))
        .is_empty()
}
