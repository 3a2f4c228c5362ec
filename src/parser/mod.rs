//! The push parser.
//!
//! [`Parser`] drives a finite automaton over the codepoints of the input,
//! one [`write`] at a time, and calls into the caller-supplied [`Handler`]
//! while it consumes. No document tree is ever built; state between writes
//! is exactly the machine state, the region buffers, the tag stack and the
//! namespace scopes, so the event sequence for chunked input equals the
//! sequence for the concatenated input.
//!
//! [`write`]: Parser::write

use std::collections::HashMap;
use std::mem::take;

use memchr::{memchr, memchr2, memchr_iter};

use crate::chars::{
    is_entity_char, is_entity_start_char, is_name_char, is_name_start_char, is_quote,
    is_whitespace,
};
use crate::config::{CaseTransform, Config};
use crate::entity::{self, is_xml_entity_value};
use crate::errors::{Error, Position, Result, SyntaxError};
use crate::events::{Attribute, Handler, NamespaceBinding, ProcessingInstruction, Tag};
use crate::namespace::{qualified_name, ScopeArena, ROOT_SCOPE, XMLNS_URI, XML_URI};

mod buffers;
mod state;

use buffers::Buffers;
use state::State;

/// Nesting bound for re-fed entity replacement text. Past the bound the
/// replacement is appended literally instead of being parsed again.
const ENTITY_DEPTH_LIMIT: usize = 32;

/// Checks whether `accumulated` plus the incoming codepoint spells
/// `keyword`, ASCII-case-insensitively. `keyword` must be ASCII.
fn matches_keyword(accumulated: &str, c: char, keyword: &str) -> bool {
    accumulated.len() + c.len_utf8() == keyword.len()
        && accumulated.eq_ignore_ascii_case(&keyword[..accumulated.len()])
        && keyword[accumulated.len()..]
            .chars()
            .next()
            .map_or(false, |k| c.eq_ignore_ascii_case(&k))
}

/// A streaming, evented XML/HTML-ish push parser.
///
/// Feed consecutive chunks with [`write`]/[`write_bytes`] and finish with
/// [`end`]; the parser calls the [`Handler`] synchronously as constructs
/// complete. One instance is a single-threaded mutable object; run
/// independent parsers for independent streams.
///
/// ```
/// use sax::{Handler, Parser};
///
/// #[derive(Default)]
/// struct Names(Vec<String>);
///
/// impl Handler for Names {
///     fn on_open_tag(&mut self, tag: &sax::Tag) {
///         self.0.push(tag.name.clone());
///     }
/// }
///
/// let mut parser = Parser::new(Names::default());
/// parser.write("<a><b/>")?;
/// parser.write("</a>")?;
/// parser.end()?;
/// assert_eq!(parser.handler().0, ["a", "b"]);
/// # Ok::<(), sax::Error>(())
/// ```
///
/// [`write`]: Parser::write
/// [`write_bytes`]: Parser::write_bytes
/// [`end`]: Parser::end
pub struct Parser<H: Handler> {
    handler: H,
    config: Config,
    state: State,
    buffers: Buffers,
    /// The active quote character inside quoted regions.
    quote: Option<char>,
    /// The element under construction, between `new_tag` and `open_tag`.
    tag: Option<Tag>,
    /// All currently opened elements which didn't have a matching close
    /// tag yet, root first.
    tags: Vec<Tag>,
    /// Attributes seen so far for the pending element, held back in
    /// namespaces mode until its `xmlns` bindings are known.
    deferred_attributes: Vec<(String, String)>,
    scopes: ScopeArena,
    /// Per-instance entity definitions; they win over the process registry.
    parser_entities: HashMap<String, String>,
    saw_root: bool,
    closed_root: bool,
    saw_doctype: bool,
    closed: bool,
    /// The latched diagnostic; re-raised by the next write until `resume`.
    error: Option<Error>,
    position: Position,
    /// Codepoints consumed since construction. Unlike [`Position`], which
    /// is gated on [`Config::track_position`], this always advances: the
    /// buffer overflow sweep must not depend on position tracking.
    consumed: u64,
    /// Offset just past the `<` that opened the current markup.
    start_tag_position: u64,
    /// Offset at which the next buffer overflow sweep runs.
    buffer_check_position: u64,
    /// Partial trailing UTF-8 sequence carried between `write_bytes` calls.
    utf8_carry: Vec<u8>,
    entity_depth: usize,
}

impl<H: Handler> Parser<H> {
    /// Creates a parser with the default (lenient) [`Config`] and emits
    /// [`Handler::on_ready`].
    pub fn new(handler: H) -> Self {
        Self::with_config(Config::default(), handler)
    }

    /// Creates a parser with the given options and emits
    /// [`Handler::on_ready`].
    pub fn with_config(config: Config, handler: H) -> Self {
        let buffer_check_position = config.max_buffer_length as u64;
        let mut parser = Self {
            handler,
            config,
            state: State::Begin,
            buffers: Buffers::default(),
            quote: None,
            tag: None,
            tags: Vec::new(),
            deferred_attributes: Vec::new(),
            scopes: ScopeArena::new(),
            parser_entities: HashMap::new(),
            saw_root: false,
            closed_root: false,
            saw_doctype: false,
            closed: false,
            error: None,
            position: Position::default(),
            consumed: 0,
            start_tag_position: 0,
            buffer_check_position,
            utf8_carry: Vec::new(),
            entity_depth: 0,
        };
        parser.handler.on_ready();
        parser
    }

    /// Shared access to the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutable access to the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consumes the parser and returns the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// The options this parser was constructed with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The current source position. All zeros unless
    /// [`Config::track_position`] is set.
    pub fn position(&self) -> Position {
        self.position
    }

    /// The currently latched diagnostic, if any.
    pub fn latched_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Clears the latched diagnostic so parsing may continue.
    pub fn resume(&mut self) -> &mut Self {
        self.error = None;
        self
    }

    /// Defines or overrides a named entity for this parser only, winning
    /// over the process-wide [`entity`] registry. Visible from the next
    /// `&name;` scan onward.
    pub fn define_entity(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parser_entities.insert(name.into(), value.into());
    }

    /// Feeds a chunk of text. Multiple writes concatenate semantically.
    ///
    /// # Errors
    ///
    /// Re-raises a latched diagnostic from an earlier write, and fails
    /// with [`Error::WriteAfterClose`] once [`end`] was called.
    /// Diagnostics raised *during* this write are delivered through
    /// [`Handler::on_error`] and latched, not returned.
    ///
    /// [`end`]: Parser::end
    pub fn write(&mut self, chunk: &str) -> Result<()> {
        self.check_writable()?;
        self.feed(chunk);
        if self.consumed >= self.buffer_check_position {
            self.check_buffers();
        }
        Ok(())
    }

    /// Feeds a chunk of UTF-8 bytes. A partial trailing sequence is
    /// retained and completed by the next call; invalid sequences are
    /// substituted with U+FFFD.
    ///
    /// # Errors
    ///
    /// Same contract as [`write`](Parser::write).
    pub fn write_bytes(&mut self, chunk: &[u8]) -> Result<()> {
        self.check_writable()?;
        let carried;
        let mut input: &[u8] = if self.utf8_carry.is_empty() {
            chunk
        } else {
            let mut bytes = take(&mut self.utf8_carry);
            bytes.extend_from_slice(chunk);
            carried = bytes;
            &carried
        };
        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    self.feed(valid);
                    break;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    self.feed(std::str::from_utf8(valid).unwrap());
                    match err.error_len() {
                        Some(invalid) => {
                            self.feed("\u{FFFD}");
                            input = &rest[invalid..];
                        }
                        None => {
                            // an incomplete sequence waits for the next chunk
                            self.utf8_carry.extend_from_slice(rest);
                            break;
                        }
                    }
                }
            }
        }
        if self.consumed >= self.buffer_check_position {
            self.check_buffers();
        }
        Ok(())
    }

    /// Forces emission of buffered text and CDATA without requiring more
    /// input and without advancing the machine.
    pub fn flush(&mut self) {
        self.close_text();
        if !self.buffers.cdata.is_empty() {
            let cdata = take(&mut self.buffers.cdata);
            self.handler.on_cdata(&cdata);
        }
        if !self.buffers.script.is_empty() {
            let script = take(&mut self.buffers.script);
            self.handler.on_text(&script);
        }
    }

    /// Asserts the input is complete: checks for an unclosed root element
    /// (strict) and a construct cut short, emits any final text and
    /// [`Handler::on_end`]. Further writes fail.
    ///
    /// # Errors
    ///
    /// Re-raises a latched diagnostic; returns any diagnostic raised by
    /// the completion checks themselves.
    pub fn end(&mut self) -> Result<()> {
        self.check_writable()?;
        if self.saw_root && !self.closed_root {
            self.strict_fail(SyntaxError::UnclosedRootTag);
        }
        if !matches!(
            self.state,
            State::Begin | State::BeginWhitespace | State::Text
        ) {
            self.fail(SyntaxError::UnexpectedEnd);
        }
        self.close_text();
        self.closed = true;
        self.handler.on_end();
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Returns the parser to its initial state, as if just constructed
    /// with the same options and handler, and re-emits
    /// [`Handler::on_ready`]. Per-parser entity definitions are dropped.
    pub fn reset(&mut self) {
        self.state = State::Begin;
        self.buffers.clear();
        self.quote = None;
        self.tag = None;
        self.tags.clear();
        self.deferred_attributes.clear();
        self.scopes.clear();
        self.parser_entities.clear();
        self.saw_root = false;
        self.closed_root = false;
        self.saw_doctype = false;
        self.closed = false;
        self.error = None;
        self.position = Position::default();
        self.consumed = 0;
        self.start_tag_position = 0;
        self.buffer_check_position = self.config.max_buffer_length as u64;
        self.utf8_carry.clear();
        self.entity_depth = 0;
        self.handler.on_ready();
    }

    fn check_writable(&mut self) -> Result<()> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if self.closed {
            let error = Error::WriteAfterClose;
            self.handler.on_error(&error);
            return Err(error);
        }
        Ok(())
    }

    /// Runs the machine over a decoded chunk. Also the entry point for
    /// re-fed entity replacement text.
    fn feed(&mut self, chunk: &str) {
        let bytes = chunk.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            // Bulk-copy runs that cannot change the state: character data
            // up to the next `<` or `&`, CDATA up to the next `]`.
            if self.state == State::Text && self.saw_root && !self.closed_root {
                let stop = memchr2(b'<', b'&', &bytes[i..]).unwrap_or(bytes.len() - i);
                if stop > 0 {
                    let run = &chunk[i..i + stop];
                    self.buffers.text_node.push_str(run);
                    self.advance(run);
                    i += stop;
                    continue;
                }
            } else if self.state == State::Cdata {
                let stop = memchr(b']', &bytes[i..]).unwrap_or(bytes.len() - i);
                if stop > 0 {
                    let run = &chunk[i..i + stop];
                    self.buffers.cdata.push_str(run);
                    self.advance(run);
                    i += stop;
                    continue;
                }
            }
            let c = match chunk[i..].chars().next() {
                Some(c) => c,
                None => break,
            };
            i += c.len_utf8();
            self.advance_char(c);
            self.step(c);
        }
    }

    fn advance_char(&mut self, c: char) {
        self.consumed += 1;
        if !self.config.track_position {
            return;
        }
        self.position.offset += 1;
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 0;
        } else {
            self.position.column += 1;
        }
    }

    /// Position bookkeeping for a bulk-copied run.
    fn advance(&mut self, run: &str) {
        let codepoints = run.chars().count() as u64;
        self.consumed += codepoints;
        if !self.config.track_position {
            return;
        }
        self.position.offset += codepoints;
        let mut newlines = 0;
        let mut last = None;
        for at in memchr_iter(b'\n', run.as_bytes()) {
            newlines += 1;
            last = Some(at);
        }
        match last {
            Some(at) => {
                self.position.line += newlines;
                self.position.column = run[at + 1..].chars().count() as u64;
            }
            None => self.position.column += codepoints,
        }
    }

    /// One transition of the automaton.
    fn step(&mut self, c: char) {
        match self.state {
            State::Begin => {
                self.state = State::BeginWhitespace;
                if c == '\u{FEFF}' {
                    return;
                }
                self.begin_whitespace(c);
            }
            State::BeginWhitespace => self.begin_whitespace(c),
            State::Text => {
                if c == '<' && !(self.saw_root && self.closed_root && !self.config.strict) {
                    self.state = State::OpenWaka;
                    self.start_tag_position = self.consumed;
                } else {
                    if !is_whitespace(c) && (!self.saw_root || self.closed_root) {
                        self.strict_fail(SyntaxError::TextOutsideRootNode);
                    }
                    if c == '&' {
                        self.state = State::TextEntity;
                    } else {
                        self.buffers.text_node.push(c);
                    }
                }
            }
            State::Script => {
                if c == '<' {
                    self.state = State::ScriptEnding;
                } else {
                    self.buffers.script.push(c);
                }
            }
            State::ScriptEnding => {
                if c == '/' {
                    self.state = State::CloseTag;
                    self.buffers.tag_name.clear();
                } else {
                    self.buffers.script.push('<');
                    self.buffers.script.push(c);
                    self.state = State::Script;
                }
            }
            State::OpenWaka => {
                if c == '!' {
                    self.state = State::SgmlDecl;
                    self.buffers.sgml_decl.clear();
                } else if is_whitespace(c) {
                    // wait for it...
                } else if is_name_start_char(c) {
                    self.state = State::OpenTag;
                    self.buffers.tag_name.clear();
                    self.buffers.tag_name.push(c);
                } else if c == '/' {
                    self.state = State::CloseTag;
                    self.buffers.tag_name.clear();
                } else if c == '?' {
                    self.state = State::ProcInst;
                    self.buffers.proc_inst_name.clear();
                    self.buffers.proc_inst_body.clear();
                } else {
                    self.strict_fail(SyntaxError::UnencodedLt);
                    // whitespace swallowed after the `<` is restored as padding
                    self.buffers.text_node.push('<');
                    let pad = self.consumed.saturating_sub(self.start_tag_position);
                    for _ in 1..pad {
                        self.buffers.text_node.push(' ');
                    }
                    self.buffers.text_node.push(c);
                    self.state = State::Text;
                }
            }
            State::SgmlDecl => {
                if matches_keyword(&self.buffers.sgml_decl, c, "[CDATA[") {
                    self.close_text();
                    self.handler.on_open_cdata();
                    self.state = State::Cdata;
                    self.buffers.sgml_decl.clear();
                    self.buffers.cdata.clear();
                } else if self.buffers.sgml_decl == "-" && c == '-' {
                    self.state = State::Comment;
                    self.buffers.comment.clear();
                    self.buffers.sgml_decl.clear();
                } else if !self.buffers.doctype.is_empty() && !self.buffers.sgml_decl.is_empty() {
                    // `<!` inside the internal subset of the doctype being
                    // built; the first accumulated codepoint is given the
                    // chance to start a comment above
                    self.state = State::DoctypeDtd;
                    self.buffers.doctype.push_str("<!");
                    let decl = take(&mut self.buffers.sgml_decl);
                    self.buffers.doctype.push_str(&decl);
                    self.buffers.doctype.push(c);
                } else if matches_keyword(&self.buffers.sgml_decl, c, "DOCTYPE") {
                    self.state = State::Doctype;
                    if self.saw_doctype || self.saw_root {
                        self.strict_fail(SyntaxError::InappropriateDoctype);
                    }
                    self.buffers.doctype.clear();
                    self.buffers.sgml_decl.clear();
                } else if c == '>' {
                    self.close_text();
                    let declaration = take(&mut self.buffers.sgml_decl);
                    self.handler.on_sgml_declaration(&declaration);
                    self.state = State::Text;
                } else {
                    if is_quote(c) {
                        self.state = State::SgmlDeclQuoted;
                        self.quote = Some(c);
                    }
                    self.buffers.sgml_decl.push(c);
                }
            }
            State::SgmlDeclQuoted => {
                if Some(c) == self.quote {
                    self.state = State::SgmlDecl;
                    self.quote = None;
                }
                self.buffers.sgml_decl.push(c);
            }
            State::Doctype => {
                if c == '>' {
                    self.state = State::Text;
                    self.close_text();
                    let doctype = take(&mut self.buffers.doctype);
                    self.handler.on_doctype(&doctype);
                    self.saw_doctype = true;
                } else {
                    self.buffers.doctype.push(c);
                    if c == '[' {
                        self.state = State::DoctypeDtd;
                    } else if is_quote(c) {
                        self.state = State::DoctypeQuoted;
                        self.quote = Some(c);
                    }
                }
            }
            State::DoctypeQuoted => {
                self.buffers.doctype.push(c);
                if Some(c) == self.quote {
                    self.quote = None;
                    self.state = State::Doctype;
                }
            }
            State::DoctypeDtd => {
                if c == ']' {
                    self.buffers.doctype.push(c);
                    self.state = State::Doctype;
                } else if c == '<' {
                    // markup inside the subset takes the regular route and
                    // comes back through the comment machinery
                    self.state = State::OpenWaka;
                    self.start_tag_position = self.consumed;
                } else if is_quote(c) {
                    self.buffers.doctype.push(c);
                    self.state = State::DoctypeDtdQuoted;
                    self.quote = Some(c);
                } else {
                    self.buffers.doctype.push(c);
                }
            }
            State::DoctypeDtdQuoted => {
                self.buffers.doctype.push(c);
                if Some(c) == self.quote {
                    self.state = State::DoctypeDtd;
                    self.quote = None;
                }
            }
            State::Comment => {
                if c == '-' {
                    self.state = State::CommentEnding;
                } else {
                    self.buffers.comment.push(c);
                }
            }
            State::CommentEnding => {
                if c == '-' {
                    self.state = State::CommentEnded;
                    let raw_comment = take(&mut self.buffers.comment);
                    let comment = self.text_opts(raw_comment);
                    if !comment.is_empty() {
                        self.close_text();
                        self.handler.on_comment(&comment);
                    }
                } else {
                    self.buffers.comment.push('-');
                    self.buffers.comment.push(c);
                    self.state = State::Comment;
                }
            }
            State::CommentEnded => {
                if c != '>' {
                    self.strict_fail(SyntaxError::MalformedComment);
                    // lenient mode embeds the `--` and keeps going
                    self.buffers.comment.push_str("--");
                    self.buffers.comment.push(c);
                    self.state = State::Comment;
                } else if !self.buffers.doctype.is_empty() {
                    self.state = State::DoctypeDtd;
                } else {
                    self.state = State::Text;
                }
            }
            State::Cdata => {
                if c == ']' {
                    self.state = State::CdataEnding;
                } else {
                    self.buffers.cdata.push(c);
                }
            }
            State::CdataEnding => {
                if c == ']' {
                    self.state = State::CdataEnding2;
                } else {
                    self.buffers.cdata.push(']');
                    self.buffers.cdata.push(c);
                    self.state = State::Cdata;
                }
            }
            State::CdataEnding2 => {
                if c == '>' {
                    if !self.buffers.cdata.is_empty() {
                        let cdata = take(&mut self.buffers.cdata);
                        self.close_text();
                        self.handler.on_cdata(&cdata);
                    }
                    self.close_text();
                    self.handler.on_close_cdata();
                    self.state = State::Text;
                } else if c == ']' {
                    // a longer `]` run keeps one and stays at the fence
                    self.buffers.cdata.push(']');
                } else {
                    self.buffers.cdata.push_str("]]");
                    self.buffers.cdata.push(c);
                    self.state = State::Cdata;
                }
            }
            State::ProcInst => {
                if c == '?' {
                    self.state = State::ProcInstEnding;
                } else if is_whitespace(c) {
                    self.state = State::ProcInstBody;
                } else {
                    self.buffers.proc_inst_name.push(c);
                }
            }
            State::ProcInstBody => {
                if self.buffers.proc_inst_body.is_empty() && is_whitespace(c) {
                    // leading whitespace of the body is skipped
                } else if c == '?' {
                    self.state = State::ProcInstEnding;
                } else {
                    self.buffers.proc_inst_body.push(c);
                }
            }
            State::ProcInstEnding => {
                if c == '>' {
                    self.close_text();
                    let instruction = ProcessingInstruction {
                        name: take(&mut self.buffers.proc_inst_name),
                        body: take(&mut self.buffers.proc_inst_body),
                    };
                    self.handler.on_processing_instruction(&instruction);
                    self.state = State::Text;
                } else {
                    self.buffers.proc_inst_body.push('?');
                    self.buffers.proc_inst_body.push(c);
                    self.state = State::ProcInstBody;
                }
            }
            State::OpenTag => {
                if is_name_char(c) {
                    self.buffers.tag_name.push(c);
                } else {
                    self.new_tag();
                    if c == '>' {
                        self.open_tag(false);
                    } else if c == '/' {
                        self.state = State::OpenTagSlash;
                    } else {
                        if !is_whitespace(c) {
                            self.strict_fail(SyntaxError::InvalidCharInTagName);
                        }
                        self.state = State::Attribute;
                    }
                }
            }
            State::OpenTagSlash => {
                if c == '>' {
                    self.open_tag(true);
                } else {
                    self.strict_fail(SyntaxError::UnexpectedSlashInTag);
                    self.state = State::Attribute;
                }
            }
            State::Attribute => {
                if is_whitespace(c) {
                } else if c == '>' {
                    self.open_tag(false);
                } else if c == '/' {
                    self.state = State::OpenTagSlash;
                } else if is_name_start_char(c) {
                    self.buffers.attribute_name.clear();
                    self.buffers.attribute_name.push(c);
                    self.buffers.attribute_value.clear();
                    self.state = State::AttributeName;
                } else {
                    self.strict_fail(SyntaxError::InvalidAttributeName);
                }
            }
            State::AttributeName => {
                if c == '=' {
                    self.state = State::AttributeValue;
                } else if c == '>' {
                    self.strict_fail(SyntaxError::AttributeWithoutValue);
                    self.buffers.attribute_value = self.buffers.attribute_name.clone();
                    self.process_attribute();
                    self.open_tag(false);
                } else if is_whitespace(c) {
                    self.state = State::AttributeNameSawWhite;
                } else if is_name_char(c) {
                    self.buffers.attribute_name.push(c);
                } else {
                    self.strict_fail(SyntaxError::InvalidAttributeName);
                }
            }
            State::AttributeNameSawWhite => {
                if c == '=' {
                    self.state = State::AttributeValue;
                } else if is_whitespace(c) {
                } else {
                    self.strict_fail(SyntaxError::AttributeWithoutValue);
                    // the pending name becomes an empty-valued attribute
                    self.buffers.attribute_value.clear();
                    self.process_attribute();
                    if c == '>' {
                        self.open_tag(false);
                    } else if is_name_start_char(c) {
                        self.buffers.attribute_name.clear();
                        self.buffers.attribute_name.push(c);
                        self.state = State::AttributeName;
                    } else {
                        self.strict_fail(SyntaxError::InvalidAttributeName);
                        self.state = State::Attribute;
                    }
                }
            }
            State::AttributeValue => {
                if is_whitespace(c) {
                } else if is_quote(c) {
                    self.quote = Some(c);
                    self.state = State::AttributeValueQuoted;
                } else {
                    if !self.config.unquoted_values() {
                        self.fail(SyntaxError::UnquotedAttributeValue);
                    }
                    self.state = State::AttributeValueUnquoted;
                    self.buffers.attribute_value.push(c);
                }
            }
            State::AttributeValueQuoted => {
                if Some(c) != self.quote {
                    if c == '&' {
                        self.state = State::AttributeValueEntityQ;
                    } else {
                        self.buffers.attribute_value.push(c);
                    }
                } else {
                    self.process_attribute();
                    self.quote = None;
                    self.state = State::AttributeValueClosed;
                }
            }
            State::AttributeValueClosed => {
                if is_whitespace(c) {
                    self.state = State::Attribute;
                } else if c == '>' {
                    self.open_tag(false);
                } else if c == '/' {
                    self.state = State::OpenTagSlash;
                } else if is_name_start_char(c) {
                    self.strict_fail(SyntaxError::NoWhitespaceBetweenAttributes);
                    self.buffers.attribute_name.clear();
                    self.buffers.attribute_name.push(c);
                    self.buffers.attribute_value.clear();
                    self.state = State::AttributeName;
                } else {
                    self.strict_fail(SyntaxError::InvalidAttributeName);
                }
            }
            State::AttributeValueUnquoted => {
                if c != '>' && !is_whitespace(c) {
                    if c == '&' {
                        self.state = State::AttributeValueEntityU;
                    } else {
                        self.buffers.attribute_value.push(c);
                    }
                } else {
                    self.process_attribute();
                    if c == '>' {
                        self.open_tag(false);
                    } else {
                        self.state = State::Attribute;
                    }
                }
            }
            State::CloseTag => {
                if self.buffers.tag_name.is_empty() {
                    if is_whitespace(c) {
                    } else if !is_name_start_char(c) {
                        if !self.buffers.script.is_empty() {
                            self.buffers.script.push_str("</");
                            self.buffers.script.push(c);
                            self.state = State::Script;
                        } else {
                            self.strict_fail(SyntaxError::InvalidTagNameInCloseTag);
                        }
                    } else {
                        self.buffers.tag_name.push(c);
                    }
                } else if c == '>' {
                    self.close_tag();
                } else if is_name_char(c) {
                    self.buffers.tag_name.push(c);
                } else if !self.buffers.script.is_empty() {
                    self.buffers.script.push_str("</");
                    let name = take(&mut self.buffers.tag_name);
                    self.buffers.script.push_str(&name);
                    self.buffers.script.push(c);
                    self.state = State::Script;
                } else {
                    if !is_whitespace(c) {
                        self.strict_fail(SyntaxError::InvalidCharsInCloseTag);
                    }
                    self.state = State::CloseTagSawWhite;
                }
            }
            State::CloseTagSawWhite => {
                if is_whitespace(c) {
                } else if c == '>' {
                    self.close_tag();
                } else {
                    self.strict_fail(SyntaxError::InvalidCharsInCloseTag);
                }
            }
            State::TextEntity | State::AttributeValueEntityQ | State::AttributeValueEntityU => {
                let (return_state, in_text) = match self.state {
                    State::TextEntity => (State::Text, true),
                    State::AttributeValueEntityQ => (State::AttributeValueQuoted, false),
                    _ => (State::AttributeValueUnquoted, false),
                };
                if c == ';' {
                    let name = take(&mut self.buffers.entity);
                    self.state = return_state;
                    match self.resolve_entity(&name) {
                        Some(value) => {
                            if self.config.unparsed_entities
                                && !is_xml_entity_value(&value)
                                && self.entity_depth < ENTITY_DEPTH_LIMIT
                            {
                                self.entity_depth += 1;
                                self.feed(&value);
                                self.entity_depth -= 1;
                            } else {
                                self.entity_sink(in_text).push_str(&value);
                            }
                        }
                        None => {
                            self.strict_fail(SyntaxError::InvalidCharacterEntity);
                            let sink = self.entity_sink(in_text);
                            sink.push('&');
                            sink.push_str(&name);
                            sink.push(';');
                        }
                    }
                } else if (self.buffers.entity.is_empty() && is_entity_start_char(c))
                    || (!self.buffers.entity.is_empty() && is_entity_char(c))
                {
                    self.buffers.entity.push(c);
                } else {
                    self.strict_fail(SyntaxError::InvalidCharInEntityName);
                    let name = take(&mut self.buffers.entity);
                    let sink = self.entity_sink(in_text);
                    sink.push('&');
                    sink.push_str(&name);
                    sink.push(c);
                    self.state = return_state;
                }
            }
        }
    }

    /// Handles codepoints before the first markup.
    fn begin_whitespace(&mut self, c: char) {
        if c == '<' {
            self.state = State::OpenWaka;
            self.start_tag_position = self.consumed;
        } else if !is_whitespace(c) {
            self.strict_fail(SyntaxError::NonWhitespaceBeforeFirstTag);
            self.buffers.text_node.clear();
            self.buffers.text_node.push(c);
            self.state = State::Text;
        }
    }

    /// The buffer entity replacement text lands in, by originating state.
    fn entity_sink(&mut self, in_text: bool) -> &mut String {
        if in_text {
            &mut self.buffers.text_node
        } else {
            &mut self.buffers.attribute_value
        }
    }

    /// Resolution order: per-parser definitions, process registry,
    /// built-in tables; then the lowercased name (lenient only); then a
    /// numeric character reference.
    fn resolve_entity(&self, name: &str) -> Option<String> {
        if let Some(value) = self.lookup_entity(name) {
            return Some(value);
        }
        if !self.config.strict {
            let lowered = name.to_lowercase();
            if lowered != name {
                if let Some(value) = self.lookup_entity(&lowered) {
                    return Some(value);
                }
            }
        }
        if name.starts_with('#') {
            return entity::parse_character_reference(name).map(|c| c.to_string());
        }
        None
    }

    fn lookup_entity(&self, name: &str) -> Option<String> {
        if let Some(value) = self.parser_entities.get(name) {
            return Some(value.clone());
        }
        if self.config.strict_entities {
            return entity::resolve_xml_entity(name).map(String::from);
        }
        if let Some(value) = entity::defined(name) {
            return Some(value);
        }
        entity::resolve_xml_entity(name)
            .or_else(|| entity::resolve_html_entity(name))
            .map(String::from)
    }

    /// Applies [`Config::case_transform`] to a committed name. Strict mode
    /// preserves case unconditionally.
    fn apply_case(&self, name: String) -> String {
        if self.config.strict {
            return name;
        }
        match self.config.case_transform {
            CaseTransform::Preserve => name,
            CaseTransform::Lowercase => name.to_lowercase(),
            CaseTransform::Uppercase => name.to_uppercase(),
        }
    }

    /// `trim` then `normalize`, per configuration.
    fn text_opts(&self, text: String) -> String {
        let mut text = text;
        if self.config.trim {
            text = text.trim_matches(is_whitespace).to_string();
        }
        if self.config.normalize {
            let mut normalized = String::with_capacity(text.len());
            let mut in_run = false;
            for c in text.chars() {
                if is_whitespace(c) {
                    if !in_run {
                        normalized.push(' ');
                    }
                    in_run = true;
                } else {
                    normalized.push(c);
                    in_run = false;
                }
            }
            text = normalized;
        }
        text
    }

    /// Emits the pending text region, if any survives `trim`/`normalize`.
    /// Every non-text event emission goes through here first.
    fn close_text(&mut self) {
        if self.buffers.text_node.is_empty() {
            return;
        }
        let raw_text = take(&mut self.buffers.text_node);
        let text = self.text_opts(raw_text);
        if !text.is_empty() {
            self.handler.on_text(&text);
        }
    }

    /// Reports a diagnostic and latches it.
    fn fail(&mut self, kind: SyntaxError) {
        let position = self.config.track_position.then_some(self.position);
        let error = Error::Syntax(kind, position);
        self.error = Some(error.clone());
        self.handler.on_error(&error);
    }

    /// Reports a diagnostic only in strict mode; lenient mode recovers
    /// silently.
    fn strict_fail(&mut self, kind: SyntaxError) {
        if self.config.strict {
            self.fail(kind);
        }
    }

    /// Commits the accumulated tag name into a pending element and emits
    /// [`Handler::on_open_tag_start`].
    fn new_tag(&mut self) {
        let raw_name = take(&mut self.buffers.tag_name);
        let name = self.apply_case(raw_name);
        self.buffers.tag_name = name.clone();
        let scope = self.tags.last().map_or(ROOT_SCOPE, |tag| tag.scope);
        let tag = Tag {
            name,
            attributes: Vec::new(),
            is_self_closing: false,
            prefix: String::new(),
            local_name: String::new(),
            uri: String::new(),
            scope,
        };
        self.deferred_attributes.clear();
        self.close_text();
        self.handler.on_open_tag_start(&tag);
        self.tag = Some(tag);
    }

    /// Commits the accumulated attribute name/value pair. Duplicates are
    /// dropped silently. With namespaces enabled the pair is deferred and
    /// `xmlns` bindings are recorded; otherwise the attribute event fires
    /// immediately.
    fn process_attribute(&mut self) {
        let raw_attr_name = take(&mut self.buffers.attribute_name);
        let name = self.apply_case(raw_attr_name);
        let value = take(&mut self.buffers.attribute_value);

        let duplicate = self
            .tag
            .as_ref()
            .map_or(false, |tag| tag.attributes.iter().any(|a| a.name == name))
            || self.deferred_attributes.iter().any(|(n, _)| *n == name);
        if duplicate {
            return;
        }

        if self.config.namespaces {
            let (prefix, local) = qualified_name(&name, true);
            let local = local.to_string();
            if prefix == "xmlns" {
                if local == "xml" && value != XML_URI {
                    self.strict_fail(SyntaxError::XmlPrefixBinding);
                } else if local == "xmlns" && value != XMLNS_URI {
                    self.strict_fail(SyntaxError::XmlnsPrefixBinding);
                } else {
                    let parent_scope = self.tags.last().map_or(ROOT_SCOPE, |tag| tag.scope);
                    if let Some(tag) = self.tag.as_mut() {
                        if tag.scope == parent_scope {
                            tag.scope = self.scopes.push_child(parent_scope);
                        }
                        let scope = tag.scope;
                        self.scopes.bind(scope, &local, &value);
                    }
                }
            }
            self.deferred_attributes.push((name, value));
        } else {
            let attribute = Attribute {
                name,
                value,
                prefix: String::new(),
                local_name: String::new(),
                uri: String::new(),
            };
            if let Some(tag) = self.tag.as_mut() {
                tag.attributes.push(attribute.clone());
            }
            self.close_text();
            self.handler.on_attribute(&attribute);
        }
    }

    /// Completes the pending element: resolves its namespace, emits the
    /// open-namespace events and the deferred attributes in document
    /// order, pushes the element and emits [`Handler::on_open_tag`].
    fn open_tag(&mut self, self_closing: bool) {
        let mut tag = match self.tag.take() {
            Some(tag) => tag,
            None => return,
        };

        if self.config.namespaces {
            let (prefix, local) = qualified_name(&tag.name, false);
            tag.prefix = prefix.to_string();
            tag.local_name = local.to_string();
            tag.uri = self
                .scopes
                .resolve(tag.scope, &tag.prefix)
                .unwrap_or("")
                .to_string();
            if !tag.prefix.is_empty() && tag.uri.is_empty() {
                self.strict_fail(SyntaxError::UnboundNamespacePrefix(tag.name.clone()));
                tag.uri = tag.prefix.clone();
            }

            let parent_scope = self.tags.last().map_or(ROOT_SCOPE, |t| t.scope);
            if tag.scope != parent_scope {
                let bindings: Vec<NamespaceBinding> = self
                    .scopes
                    .own_bindings(tag.scope)
                    .iter()
                    .map(|(prefix, uri)| NamespaceBinding {
                        prefix: prefix.clone(),
                        uri: uri.clone(),
                    })
                    .collect();
                for binding in &bindings {
                    self.close_text();
                    self.handler.on_open_namespace(binding);
                }
            }

            for (name, value) in take(&mut self.deferred_attributes) {
                let (prefix, local) = qualified_name(&name, true);
                let (prefix, local) = (prefix.to_string(), local.to_string());
                let uri = if prefix.is_empty() {
                    // unprefixed attributes never inherit the default namespace
                    String::new()
                } else {
                    self.scopes
                        .resolve(tag.scope, &prefix)
                        .unwrap_or("")
                        .to_string()
                };
                let mut attribute = Attribute {
                    name,
                    value,
                    prefix,
                    local_name: local,
                    uri,
                };
                if !attribute.prefix.is_empty()
                    && attribute.prefix != "xmlns"
                    && attribute.uri.is_empty()
                {
                    self.strict_fail(SyntaxError::UnboundNamespacePrefix(
                        attribute.prefix.clone(),
                    ));
                    attribute.uri = attribute.prefix.clone();
                }
                tag.attributes.push(attribute.clone());
                self.close_text();
                self.handler.on_attribute(&attribute);
            }
        }

        tag.is_self_closing = self_closing;
        self.saw_root = true;

        self.close_text();
        let raw_text = !self.config.strict
            && self.config.allow_script
            && tag.name.eq_ignore_ascii_case("script");
        self.handler.on_open_tag(&tag);
        self.tags.push(tag);

        if self_closing {
            self.close_tag();
        } else {
            if raw_text {
                self.state = State::Script;
                self.buffers.script.clear();
            } else {
                self.state = State::Text;
            }
            self.buffers.tag_name.clear();
        }
        self.buffers.attribute_name.clear();
        self.buffers.attribute_value.clear();
        self.deferred_attributes.clear();
    }

    /// Pops elements down to the one the accumulated closing name matches,
    /// emitting close-tag and close-namespace events. An unmatched name is
    /// restored into the text buffer.
    fn close_tag(&mut self) {
        if self.buffers.tag_name.is_empty() {
            self.strict_fail(SyntaxError::WeirdEmptyCloseTag);
            self.buffers.text_node.push_str("</>");
            self.state = State::Text;
            return;
        }

        if !self.buffers.script.is_empty() {
            if !self.buffers.tag_name.eq_ignore_ascii_case("script") {
                // not the end of the script element; swallow the tag as raw text
                self.buffers.script.push_str("</");
                let name = take(&mut self.buffers.tag_name);
                self.buffers.script.push_str(&name);
                self.buffers.script.push('>');
                self.state = State::Script;
                return;
            }
            // the raw body goes out as character data ahead of the close event
            let script = take(&mut self.buffers.script);
            self.buffers.text_node.push_str(&script);
        }

        // first make sure that the closing tag actually exists;
        // <a><b></c></b></a> would close everything otherwise
        let raw = take(&mut self.buffers.tag_name);
        let name = self.apply_case(raw.clone());
        let mut target = None;
        for depth in (0..self.tags.len()).rev() {
            if self.tags[depth].name == name {
                target = Some(depth);
                break;
            }
            self.strict_fail(SyntaxError::UnexpectedCloseTag);
        }

        let target = match target {
            Some(depth) => depth,
            None => {
                self.strict_fail(SyntaxError::UnmatchedCloseTag(raw.clone()));
                self.buffers.text_node.push_str("</");
                self.buffers.text_node.push_str(&raw);
                self.buffers.text_node.push('>');
                self.state = State::Text;
                return;
            }
        };

        while self.tags.len() > target {
            let tag = match self.tags.pop() {
                Some(tag) => tag,
                None => break,
            };
            self.close_text();
            self.handler.on_close_tag(&tag.name);

            if self.config.namespaces {
                let parent_scope = self.tags.last().map_or(ROOT_SCOPE, |t| t.scope);
                if tag.scope != parent_scope {
                    let bindings: Vec<NamespaceBinding> = self
                        .scopes
                        .own_bindings(tag.scope)
                        .iter()
                        .map(|(prefix, uri)| NamespaceBinding {
                            prefix: prefix.clone(),
                            uri: uri.clone(),
                        })
                        .collect();
                    for binding in &bindings {
                        self.handler.on_close_namespace(binding);
                    }
                }
            }
        }

        if target == 0 {
            self.closed_root = true;
        }
        self.buffers.attribute_name.clear();
        self.buffers.attribute_value.clear();
        self.deferred_attributes.clear();
        self.state = State::Text;
    }

    /// The overflow sweep: inspects every buffer once the absolute offset
    /// crossed the check position. Text, CDATA and script spill as partial
    /// events; any other oversized buffer is a diagnostic. The next check
    /// is scheduled at the earliest offset a buffer could overrun again.
    fn check_buffers(&mut self) {
        let max_allowed = self.config.max_buffer_length.max(10);
        let mut longest = 0;
        for (name, len) in self.buffers.lengths() {
            if len > max_allowed {
                match name {
                    "text_node" => self.close_text(),
                    "cdata" => {
                        let cdata = take(&mut self.buffers.cdata);
                        self.close_text();
                        self.handler.on_cdata(&cdata);
                    }
                    "script" => {
                        let script = take(&mut self.buffers.script);
                        self.handler.on_text(&script);
                    }
                    _ => self.fail(SyntaxError::BufferExceeded(name)),
                }
            }
            longest = longest.max(len);
        }
        let headroom = self.config.max_buffer_length.saturating_sub(longest);
        self.buffer_check_position = self.consumed + headroom as u64;
    }
}
