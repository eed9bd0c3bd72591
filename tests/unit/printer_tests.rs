use dom_echo::{Node, OtherKind, NodeKind, TreePrinter, format_node_line, render_to_string};

fn sample_tree() -> Node {
    Node::document().with_child(
        Node::element("root")
            .with_attribute(Node::attribute("a", "1"))
            .with_child(Node::element("child").with_child(Node::text("hello")))
            .with_child(Node::comment("note")),
    )
}

#[test]
fn test_sample_document_rendering() {
    let expected = "\
Document:  nodeName=\"#document\"
 Element:  nodeName=\"root\" localName=\"root\"
   Other Node:  nodeName=\"a\" localName=\"a\" nodeValue=\"1\"
  Element:  nodeName=\"child\" localName=\"child\"
   Text:  nodeName=\"#text\" nodeValue=\"hello\"
  Comment:  nodeName=\"#comment\" nodeValue=\"note\"
";
    assert_eq!(render_to_string(&sample_tree()), expected);
}

#[test]
fn test_indentation_matches_depth() {
    let rendered = render_to_string(&sample_tree());
    let depths: Vec<usize> = rendered
        .lines()
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .collect();

    assert_eq!(depths, vec![0, 1, 3, 2, 3, 2]);
}

#[test]
fn test_printer_writes_into_any_sink() {
    let mut printer = TreePrinter::new(Vec::new());
    printer.render(&Node::element("solo")).unwrap();

    assert_eq!(
        String::from_utf8(printer.into_inner()).unwrap(),
        "Element:  nodeName=\"solo\" localName=\"solo\"\n"
    );
}

#[test]
fn test_namespace_declarations_print_like_attributes() {
    let line = format_node_line(&Node::namespace_declaration(Some("x"), "urn:x"), 3);
    assert_eq!(
        line,
        "   Other Node:  nodeName=\"xmlns:x\" uri=\"http://www.w3.org/2000/xmlns/\" prefix=\"xmlns\" localName=\"x\" nodeValue=\"urn:x\"\n"
    );
}

#[test]
fn test_other_kinds_share_one_label() {
    let nodes = [
        Node::cdata("<raw>"),
        Node::processing_instruction("xml-stylesheet", "href=\"a.css\""),
        Node::document_type("root"),
        Node::entity_reference("ent"),
        Node::unknown("mystery"),
    ];

    for node in &nodes {
        assert!(matches!(node.kind, NodeKind::Other(_)));
        assert!(format_node_line(node, 0).starts_with("Other Node:  nodeName="));
    }
    assert_eq!(nodes[0].kind, NodeKind::Other(OtherKind::CData));
}
