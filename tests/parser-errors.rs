//! Diagnostics, recovery and the strict-mode latch.

mod helpers;

use helpers::{parse, Recorder};
use pretty_assertions::assert_eq;
use sax::{Config, Error, Parser, Position, SyntaxError};

#[test]
fn strict_errors_latch_until_resume() {
    let mut parser = Parser::with_config(Config::strict(), Recorder::default());
    // the diagnostic is reported and latched, but this write still succeeds
    parser.write("<r>&bogus;</r>").unwrap();
    assert_eq!(
        parser.latched_error().and_then(Error::syntax),
        Some(&SyntaxError::InvalidCharacterEntity)
    );

    // the next write re-raises
    let err = parser.write("<!-- more -->").unwrap_err();
    assert_eq!(err.syntax(), Some(&SyntaxError::InvalidCharacterEntity));

    parser.resume();
    parser.write("<!-- more -->").unwrap();
    parser.end().unwrap();
}

#[test]
fn lenient_mode_does_not_latch() {
    let mut parser = Parser::new(Recorder::default());
    parser.write("<r>&bogus;</r>").unwrap();
    assert_eq!(parser.latched_error(), None);
    parser.end().unwrap();
    assert!(parser
        .into_handler()
        .events
        .iter()
        .all(|event| !event.starts_with("error")));
}

#[test]
fn error_positions_are_codepoint_aligned() {
    let mut parser = Parser::with_config(Config::strict(), Recorder::default());
    parser.write("<r>\n&bogus;</r>").unwrap();
    assert_eq!(
        parser.latched_error().and_then(Error::position),
        Some(Position {
            offset: 11,
            line: 1,
            column: 7,
        })
    );
}

#[test]
fn unmatched_close_tag_becomes_text() {
    assert_eq!(
        parse(Config::default(), "<a>x</b></a>"),
        [
            "opentagstart(a)",
            "opentag(a)",
            "text(\"x</b>\")",
            "closetag(a)",
            "end",
        ]
    );
    assert_eq!(
        parse(Config::strict(), "<a>x</b></a>"),
        [
            "opentagstart(a)",
            "opentag(a)",
            "error(Unexpected close tag)",
            "error(Unmatched closing tag: b)",
            "text(\"x</b>\")",
            "closetag(a)",
            "end",
        ]
    );
}

#[test]
fn unexpected_close_pops_through() {
    // the close of `a` closes the still-open `b` on its way
    assert_eq!(
        parse(Config::default(), "<a><b></a>"),
        [
            "opentagstart(a)",
            "opentag(a)",
            "opentagstart(b)",
            "opentag(b)",
            "closetag(b)",
            "closetag(a)",
            "end",
        ]
    );
    assert_eq!(
        parse(Config::strict(), "<a><b></a>"),
        [
            "opentagstart(a)",
            "opentag(a)",
            "opentagstart(b)",
            "opentag(b)",
            "error(Unexpected close tag)",
            "closetag(b)",
            "closetag(a)",
            "end",
        ]
    );
}

#[test]
fn weird_empty_close_tag() {
    assert_eq!(
        parse(Config::default(), "<a></>x</a>"),
        [
            "opentagstart(a)",
            "opentag(a)",
            "text(\"</>x\")",
            "closetag(a)",
            "end",
        ]
    );
}

#[test]
fn close_tag_tolerates_trailing_whitespace() {
    assert_eq!(
        parse(Config::strict(), "<a></a  >"),
        ["opentagstart(a)", "opentag(a)", "closetag(a)", "end"]
    );
}

#[test]
fn non_whitespace_before_first_tag() {
    assert_eq!(
        parse(Config::strict(), "x<a/>"),
        [
            "error(Non-whitespace before first tag)",
            "text(\"x\")",
            "opentagstart(a)",
            "opentag(a/)",
            "closetag(a)",
            "end",
        ]
    );
}

#[test]
fn text_after_root() {
    assert_eq!(
        parse(Config::strict(), "<a/>!"),
        [
            "opentagstart(a)",
            "opentag(a/)",
            "closetag(a)",
            "error(Text data outside of root node)",
            "text(\"!\")",
            "end",
        ]
    );
}

#[test]
fn markup_after_closed_root_is_text_in_lenient_mode() {
    assert_eq!(
        parse(Config::default(), "<a/><b/>"),
        [
            "opentagstart(a)",
            "opentag(a/)",
            "closetag(a)",
            "text(\"<b/>\")",
            "end",
        ]
    );
}

#[test]
fn malformed_comment_recovers() {
    assert_eq!(
        parse(Config::strict(), "<!--a--b--><r/>"),
        [
            "comment(\"a\")",
            "error(Malformed comment)",
            "comment(\"--b\")",
            "opentagstart(r)",
            "opentag(r/)",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn unquoted_value_is_an_error_when_disabled() {
    assert_eq!(
        parse(Config::strict(), "<r a=1></r>"),
        [
            "opentagstart(r)",
            "error(Unquoted attribute value)",
            "attribute(a=\"1\")",
            "opentag(r)",
            "closetag(r)",
            "end",
        ]
    );
}

#[test]
fn unclosed_root_at_end() {
    assert_eq!(
        parse(Config::strict(), "<a><b>"),
        [
            "opentagstart(a)",
            "opentag(a)",
            "opentagstart(b)",
            "opentag(b)",
            "error(Unclosed root tag)",
            "end",
        ]
    );
}

#[test]
fn end_inside_a_construct() {
    // reported in lenient mode as well
    assert_eq!(
        parse(Config::default(), "<a"),
        ["error(Unexpected end)", "end"]
    );
    // the unclosed-root diagnostic stays strict-only, the truncation does not
    assert_eq!(
        parse(Config::default(), "<r><!--"),
        [
            "opentagstart(r)",
            "opentag(r)",
            "error(Unexpected end)",
            "end",
        ]
    );
}

#[test]
fn end_twice_is_a_structural_error() {
    let mut parser = Parser::new(Recorder::default());
    parser.write("<r/>").unwrap();
    parser.end().unwrap();
    assert_eq!(parser.end(), Err(Error::WriteAfterClose));
    assert_eq!(parser.write("x"), Err(Error::WriteAfterClose));
    // reset revives the instance
    parser.reset();
    parser.write("<s/>").unwrap();
    parser.end().unwrap();
}

#[test]
fn inappropriate_doctype() {
    assert_eq!(
        parse(Config::strict(), "<r/><!DOCTYPE r>"),
        [
            "opentagstart(r)",
            "opentag(r/)",
            "closetag(r)",
            "error(Inappropriately located doctype declaration)",
            "doctype(\" r\")",
            "end",
        ]
    );
}

#[test]
fn messages_carry_positions() {
    let mut parser = Parser::with_config(Config::strict(), Recorder::default());
    parser.write("<r>&#xD800;</r>").unwrap();
    let message = parser.latched_error().unwrap().to_string();
    assert_eq!(
        message,
        "Invalid character entity at line 0, column 11"
    );
}
