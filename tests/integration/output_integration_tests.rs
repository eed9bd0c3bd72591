//! `app::run` against a parser double: what ends up on which stream

use std::io;

use dom_echo::app::run;
use dom_echo::{
    Config, DomEchoError, ErrorReporter, Node, Severity, ValidationMode, ValidationOccurrence,
    VerbosityLevel,
};

use crate::common::mocks::MockParser;
use crate::common::test_helpers::TestDocs;

fn tree() -> Node {
    Node::document().with_child(
        Node::element("doc")
            .with_attribute(Node::attribute("quote", "say \"hi\""))
            .with_child(Node::text("\n\t")),
    )
}

#[test]
fn test_parser_receives_locator_and_mode() {
    let docs = TestDocs::new();
    let file = docs.write("doc.xml", "<doc/>");
    let config = Config::new(&file, ValidationMode::Dtd);
    let parser = MockParser::returning(tree());

    run(
        &config,
        &parser,
        io::sink(),
        io::sink(),
        &ErrorReporter::new(VerbosityLevel::Quiet),
    )
    .unwrap();

    assert_eq!(
        parser.calls(),
        vec![(file.display().to_string(), ValidationMode::Dtd)]
    );
}

#[test]
fn test_occurrences_go_to_error_stream_only() {
    let docs = TestDocs::new();
    let file = docs.write("doc.xml", "<doc/>");
    let config = Config::new(&file, ValidationMode::None);
    let parser = MockParser::returning(tree())
        .with_occurrence(ValidationOccurrence::new(Severity::Warning, "doc.xml", 1, "w"))
        .with_occurrence(ValidationOccurrence::new(
            Severity::RecoverableError,
            "doc.xml",
            2,
            "e",
        ));
    let mut out = Vec::new();
    let mut err = Vec::new();

    let summary = run(
        &config,
        &parser,
        &mut out,
        &mut err,
        &ErrorReporter::new(VerbosityLevel::Verbose),
    )
    .unwrap();

    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(
        String::from_utf8(err).unwrap(),
        "Warning: URI=doc.xml Line=1: w\nError: URI=doc.xml Line=2: e\n"
    );
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "\
Document:  nodeName=\"#document\"
 Element:  nodeName=\"doc\" localName=\"doc\"
   Other Node:  nodeName=\"quote\" localName=\"quote\" nodeValue=\"say \"hi\"\"
  Text:  nodeName=\"#text\" nodeValue=[Whitespace]
"
    );
}

#[test]
fn test_failed_parse_prints_no_tree() {
    let docs = TestDocs::new();
    let file = docs.write("doc.xml", "<doc");
    let config = Config::new(&file, ValidationMode::None);
    let parser = MockParser::failing().with_occurrence(ValidationOccurrence::new(
        Severity::Fatal,
        "doc.xml",
        1,
        "unexpected end",
    ));
    let mut out = Vec::new();
    let mut err = Vec::new();

    let result = run(
        &config,
        &parser,
        &mut out,
        &mut err,
        &ErrorReporter::new(VerbosityLevel::Quiet),
    );

    assert!(matches!(result, Err(DomEchoError::Parse { .. })));
    assert!(out.is_empty());
    assert_eq!(
        String::from_utf8(err).unwrap(),
        "Fatal Error: URI=doc.xml Line=1: unexpected end\n"
    );
}
