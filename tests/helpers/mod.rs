//! Utility types for integration tests.

#![allow(dead_code)]

use sax::{
    Attribute, Config, Error, Handler, NamespaceBinding, Parser, ProcessingInstruction, Tag,
};

/// Records every event as a compact display string so tests can assert on
/// whole sequences at once. `on_ready` is counted, not recorded, to keep
/// the expected vectors focused.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<String>,
    pub ready: usize,
}

impl Handler for Recorder {
    fn on_ready(&mut self) {
        self.ready += 1;
    }

    fn on_text(&mut self, text: &str) {
        self.events.push(format!("text({:?})", text));
    }

    fn on_open_tag_start(&mut self, tag: &Tag) {
        self.events.push(format!("opentagstart({})", tag.name));
    }

    fn on_attribute(&mut self, attribute: &Attribute) {
        if attribute.prefix.is_empty() && attribute.uri.is_empty() {
            self.events.push(format!(
                "attribute({}={:?})",
                attribute.name, attribute.value
            ));
        } else {
            self.events.push(format!(
                "attribute({}={:?} prefix={} local={} uri={})",
                attribute.name,
                attribute.value,
                attribute.prefix,
                attribute.local_name,
                attribute.uri
            ));
        }
    }

    fn on_open_tag(&mut self, tag: &Tag) {
        let close = if tag.is_self_closing { "/" } else { "" };
        if tag.uri.is_empty() {
            self.events
                .push(format!("opentag({}{})", tag.name, close));
        } else {
            self.events
                .push(format!("opentag({} uri={}{})", tag.name, tag.uri, close));
        }
    }

    fn on_close_tag(&mut self, name: &str) {
        self.events.push(format!("closetag({})", name));
    }

    fn on_open_cdata(&mut self) {
        self.events.push("opencdata".to_string());
    }

    fn on_cdata(&mut self, cdata: &str) {
        self.events.push(format!("cdata({:?})", cdata));
    }

    fn on_close_cdata(&mut self) {
        self.events.push("closecdata".to_string());
    }

    fn on_comment(&mut self, comment: &str) {
        self.events.push(format!("comment({:?})", comment));
    }

    fn on_doctype(&mut self, doctype: &str) {
        self.events.push(format!("doctype({:?})", doctype));
    }

    fn on_processing_instruction(&mut self, instruction: &ProcessingInstruction) {
        self.events.push(format!(
            "pi({} {:?})",
            instruction.name, instruction.body
        ));
    }

    fn on_sgml_declaration(&mut self, declaration: &str) {
        self.events.push(format!("sgmldecl({:?})", declaration));
    }

    fn on_open_namespace(&mut self, binding: &NamespaceBinding) {
        self.events
            .push(format!("opennamespace({}={})", binding.prefix, binding.uri));
    }

    fn on_close_namespace(&mut self, binding: &NamespaceBinding) {
        self.events
            .push(format!("closenamespace({}={})", binding.prefix, binding.uri));
    }

    fn on_error(&mut self, error: &Error) {
        // positions vary with chunking of the expectations, so only the
        // message goes into the sequence
        let message = match error.syntax() {
            Some(kind) => kind.to_string(),
            None => error.to_string(),
        };
        self.events.push(format!("error({})", message));
    }

    fn on_end(&mut self) {
        self.events.push("end".to_string());
    }
}

/// Parses the whole input in one `write` and returns the event sequence.
/// Latched diagnostics are cleared before `end` so the terminal event is
/// always observable.
pub fn parse(config: Config, input: &str) -> Vec<String> {
    parse_chunked(config, &[input])
}

/// Parses the input split into the given chunks. A diagnostic latched by
/// one chunk is cleared before the next so every chunk is processed.
pub fn parse_chunked(config: Config, chunks: &[&str]) -> Vec<String> {
    let mut parser = Parser::with_config(config, Recorder::default());
    for chunk in chunks {
        let _ = parser.resume().write(chunk);
    }
    let _ = parser.resume().end();
    parser.into_handler().events
}

/// Asserts that every split of `input` produces the same events as the
/// single-write parse: all two-chunk splits on codepoint boundaries, plus
/// one codepoint per write.
pub fn assert_chunk_invariant(config: &Config, input: &str) {
    let reference = parse(config.clone(), input);

    for (at, _) in input.char_indices() {
        let events = parse_chunked(config.clone(), &[&input[..at], &input[at..]]);
        assert_eq!(events, reference, "input {:?} split at byte {}", input, at);
    }

    let chars: Vec<String> = input.chars().map(String::from).collect();
    let chunks: Vec<&str> = chars.iter().map(String::as_str).collect();
    assert_eq!(
        parse_chunked(config.clone(), &chunks),
        reference,
        "input {:?} fed one codepoint at a time",
        input
    );
}
