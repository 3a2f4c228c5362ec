//! Event sequences for the basic constructs.

mod helpers;

use helpers::{parse, parse_chunked, Recorder};
use pretty_assertions::assert_eq;
use sax::{CaseTransform, Config, Parser};

#[test]
fn minimal_document_strict() {
    assert_eq!(
        parse(Config::strict(), "<x>y</x>"),
        [
            "opentagstart(x)",
            "opentag(x)",
            "text(\"y\")",
            "closetag(x)",
            "end",
        ]
    );
}

#[test]
fn attributes_uppercased() {
    let config = Config {
        case_transform: CaseTransform::Uppercase,
        ..Config::default()
    };
    assert_eq!(
        parse(config, "<span class=\"test\" hello=\"world\"></span>"),
        [
            "opentagstart(SPAN)",
            "attribute(CLASS=\"test\")",
            "attribute(HELLO=\"world\")",
            "opentag(SPAN)",
            "closetag(SPAN)",
            "end",
        ]
    );
}

#[test]
fn lowercase_is_idempotent() {
    let config = Config {
        case_transform: CaseTransform::Lowercase,
        ..Config::default()
    };
    let mixed = parse(config.clone(), "<DIV Class=\"a\"></dIv>");
    let lowered = parse(config, "<div class=\"a\"></div>");
    assert_eq!(mixed, lowered);
}

#[test]
fn flush_splits_text() {
    let mut parser = Parser::new(Recorder::default());
    parser.write("<T>flush").unwrap();
    parser.flush();
    parser.write("rest</T>").unwrap();
    parser.end().unwrap();
    assert_eq!(
        parser.into_handler().events,
        [
            "opentagstart(T)",
            "opentag(T)",
            "text(\"flush\")",
            "text(\"rest\")",
            "closetag(T)",
            "end",
        ]
    );
}

#[test]
fn without_flush_text_coalesces() {
    assert_eq!(
        parse_chunked(Config::default(), &["<T>flush", "rest</T>"]),
        [
            "opentagstart(T)",
            "opentag(T)",
            "text(\"flushrest\")",
            "closetag(T)",
            "end",
        ]
    );
}

#[test]
fn self_closing() {
    assert_eq!(
        parse(Config::strict(), "<a><b/></a>"),
        [
            "opentagstart(a)",
            "opentag(a)",
            "opentagstart(b)",
            "opentag(b/)",
            "closetag(b)",
            "closetag(a)",
            "end",
        ]
    );
}

#[test]
fn text_is_broken_by_markup() {
    assert_eq!(
        parse(Config::default(), "<r>a<!--c-->b</r>"),
        [
            "opentagstart(r)",
            "opentag(r)",
            "text(\"a\")",
            "comment(\"c\")",
            "text(\"b\")",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn trim_and_normalize() {
    let config = Config {
        trim: true,
        normalize: true,
        ..Config::default()
    };
    assert_eq!(
        parse(config.clone(), "<r>  a \t\n  b  </r>"),
        [
            "opentagstart(r)",
            "opentag(r)",
            "text(\"a b\")",
            "closetag(r)",
            "end",
        ]
    );
    // whitespace-only text is suppressed entirely
    assert_eq!(
        parse(config.clone(), "<r>   </r>"),
        ["opentagstart(r)", "opentag(r)", "closetag(r)", "end"]
    );
    // comments get the same treatment
    assert_eq!(
        parse(config, "<r><!--  a   comment  --></r>"),
        [
            "opentagstart(r)",
            "opentag(r)",
            "comment(\"a comment\")",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn trim_without_normalize() {
    let config = Config {
        trim: true,
        ..Config::default()
    };
    assert_eq!(
        parse(config, "<r>  a   b  </r>"),
        [
            "opentagstart(r)",
            "opentag(r)",
            "text(\"a   b\")",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn attribute_without_value() {
    assert_eq!(
        parse(Config::default(), "<r foo>x</r>"),
        [
            "opentagstart(r)",
            "attribute(foo=\"foo\")",
            "opentag(r)",
            "text(\"x\")",
            "closetag(r)",
            "end",
        ]
    );
    // a name followed by whitespace and another name commits empty-valued
    assert_eq!(
        parse(Config::default(), "<r foo bar=\"b\"/>"),
        [
            "opentagstart(r)",
            "attribute(foo=\"\")",
            "attribute(bar=\"b\")",
            "opentag(r/)",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn unquoted_attribute_values() {
    assert_eq!(
        parse(Config::default(), "<r a=1 b=two>"),
        [
            "opentagstart(r)",
            "attribute(a=\"1\")",
            "attribute(b=\"two\")",
            "opentag(r)",
            "end",
        ]
    );
}

#[test]
fn duplicate_attributes_are_dropped() {
    assert_eq!(
        parse(Config::default(), "<r a=\"1\" a=\"2\"/>"),
        [
            "opentagstart(r)",
            "attribute(a=\"1\")",
            "opentag(r/)",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn missing_whitespace_between_attributes() {
    // lenient mode recovers and keeps both attributes
    assert_eq!(
        parse(Config::default(), "<r a=\"1\"b=\"2\"/>"),
        [
            "opentagstart(r)",
            "attribute(a=\"1\")",
            "attribute(b=\"2\")",
            "opentag(r/)",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn unencoded_lt_becomes_text() {
    assert_eq!(
        parse(Config::default(), "<r>1 < 2</r>"),
        [
            "opentagstart(r)",
            "opentag(r)",
            "text(\"1 < 2\")",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn doctype() {
    assert_eq!(
        parse(Config::default(), "<!DOCTYPE html><r/>"),
        [
            "doctype(\" html\")",
            "opentagstart(r)",
            "opentag(r/)",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn doctype_with_internal_subset() {
    assert_eq!(
        parse(
            Config::default(),
            "<!DOCTYPE r [<!ENTITY x \"y\">]><r/>"
        ),
        [
            "doctype(\" r [<!ENTITY x \\\"y\\\">]\")",
            "opentagstart(r)",
            "opentag(r/)",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn comment_inside_internal_subset() {
    // the comment is emitted and parsing returns into the subset
    assert_eq!(
        parse(Config::default(), "<!DOCTYPE r [<!-- note -->]><r/>"),
        [
            "comment(\" note \")",
            "doctype(\" r []\")",
            "opentagstart(r)",
            "opentag(r/)",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn processing_instruction() {
    assert_eq!(
        parse(Config::strict(), "<?xml version=\"1.0\"?><r/>"),
        [
            "pi(xml \"version=\\\"1.0\\\"\")",
            "opentagstart(r)",
            "opentag(r/)",
            "closetag(r)",
            "end",
        ]
    );
    // a `?` inside the body does not terminate it
    assert_eq!(
        parse(Config::default(), "<?pi a?b?><r/>"),
        [
            "pi(pi \"a?b\")",
            "opentagstart(r)",
            "opentag(r/)",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn sgml_declaration() {
    assert_eq!(
        parse(Config::default(), "<!ELEMENT r EMPTY><r/>"),
        [
            "sgmldecl(\"ELEMENT r EMPTY\")",
            "opentagstart(r)",
            "opentag(r/)",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn script_content_is_raw() {
    let config = Config {
        allow_script: true,
        ..Config::default()
    };
    assert_eq!(
        parse(
            config,
            "<root><script>if (a < b) { x(); }</script></root>"
        ),
        [
            "opentagstart(root)",
            "opentag(root)",
            "opentagstart(script)",
            "opentag(script)",
            "text(\"if (a < b) { x(); }\")",
            "closetag(script)",
            "closetag(root)",
            "end",
        ]
    );
}

#[test]
fn script_swallows_foreign_close_tags() {
    let config = Config {
        allow_script: true,
        ..Config::default()
    };
    assert_eq!(
        parse(config, "<script>a</b>c</script>"),
        [
            "opentagstart(script)",
            "opentag(script)",
            "text(\"a</b>c\")",
            "closetag(script)",
            "end",
        ]
    );
}

#[test]
fn script_disabled_by_default() {
    // without allow_script the element nests like any other
    assert_eq!(
        parse(Config::default(), "<script>var x</script>"),
        [
            "opentagstart(script)",
            "opentag(script)",
            "text(\"var x\")",
            "closetag(script)",
            "end",
        ]
    );
}

#[test]
fn ready_fires_on_construction_and_reset() {
    let mut parser = Parser::new(Recorder::default());
    assert_eq!(parser.handler().ready, 1);
    parser.write("<r/>").unwrap();
    parser.reset();
    assert_eq!(parser.handler().ready, 2);
}
