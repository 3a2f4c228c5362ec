//! Event payloads and the handler surface of the push parser.
//!
//! The parser does not build a tree; it calls into a [`Handler`]
//! synchronously while consuming input. Every method has a default no-op
//! body, so an implementation only overrides the events it cares about.

use crate::errors::Error;

/// An attribute of an open element.
///
/// `prefix`, `local_name` and `uri` are only populated when
/// [`Config::namespaces`] is enabled; otherwise they are empty.
///
/// [`Config::namespaces`]: crate::Config::namespaces
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attribute {
    /// The qualified attribute name, after case transform.
    pub name: String,
    /// The attribute value with entities already resolved.
    pub value: String,
    /// Namespace prefix, empty for unprefixed attributes.
    pub prefix: String,
    /// Name without the prefix.
    pub local_name: String,
    /// Resolved namespace URI. Unprefixed attributes never inherit the
    /// default namespace, so theirs is empty.
    pub uri: String,
}

/// An element being opened, delivered by [`Handler::on_open_tag_start`]
/// (before any attribute) and [`Handler::on_open_tag`] (attributes
/// complete).
///
/// `prefix`, `local_name` and `uri` are only populated when
/// [`Config::namespaces`] is enabled.
///
/// [`Config::namespaces`]: crate::Config::namespaces
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tag {
    /// The qualified element name, after case transform.
    pub name: String,
    /// Attributes in document order, duplicates already dropped.
    pub attributes: Vec<Attribute>,
    /// Whether the element was written `<name/>`.
    pub is_self_closing: bool,
    /// Namespace prefix, empty for unprefixed elements.
    pub prefix: String,
    /// Name without the prefix.
    pub local_name: String,
    /// Resolved namespace URI; unprefixed elements resolve against the
    /// default namespace.
    pub uri: String,
    /// Namespace scope active inside this element.
    pub(crate) scope: usize,
}

impl Tag {
    /// Looks up an attribute by its qualified name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A `prefix → URI` namespace binding, delivered when the declaring
/// element opens and again when it closes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamespaceBinding {
    /// The bound prefix; empty for the default namespace.
    pub prefix: String,
    /// The namespace URI.
    pub uri: String,
}

/// A `<?name body?>` processing instruction.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProcessingInstruction {
    /// The target, up to the first whitespace.
    pub name: String,
    /// Everything after the target, leading whitespace skipped.
    pub body: String,
}

/// The set of callbacks invoked by [`Parser`] while it consumes input.
///
/// All methods default to no-ops. Handlers run synchronously inside
/// [`Parser::write`]/[`Parser::end`]/[`Parser::flush`]; no callback is
/// re-entered before the current one returns.
///
/// [`Parser`]: crate::Parser
/// [`Parser::write`]: crate::Parser::write
/// [`Parser::end`]: crate::Parser::end
/// [`Parser::flush`]: crate::Parser::flush
#[allow(unused_variables)]
pub trait Handler {
    /// The parser is (re-)initialized and ready for input.
    fn on_ready(&mut self) {}

    /// A contiguous run of character data. Exactly one event is delivered
    /// per text region, immediately before the next non-text event, unless
    /// [`Parser::flush`] or the buffer sweep splits it.
    ///
    /// [`Parser::flush`]: crate::Parser::flush
    fn on_text(&mut self, text: &str) {}

    /// An element name was committed; no attributes are parsed yet.
    fn on_open_tag_start(&mut self, tag: &Tag) {}

    /// An attribute was committed. In namespaces mode this fires between
    /// the [`Self::on_open_namespace`] events of the element and
    /// [`Self::on_open_tag`].
    fn on_attribute(&mut self, attribute: &Attribute) {}

    /// The open tag is complete and pushed on the element stack.
    fn on_open_tag(&mut self, tag: &Tag) {}

    /// An element was popped from the stack.
    fn on_close_tag(&mut self, name: &str) {}

    /// A `<![CDATA[` section begins.
    fn on_open_cdata(&mut self) {}

    /// CDATA content, delivered verbatim. Large sections may arrive in
    /// multiple events when the buffer sweep partitions them.
    fn on_cdata(&mut self, cdata: &str) {}

    /// The `]]>` terminator of a CDATA section.
    fn on_close_cdata(&mut self) {}

    /// A `<!-- -->` comment, with `trim`/`normalize` already applied.
    fn on_comment(&mut self, comment: &str) {}

    /// A `<!DOCTYPE >` declaration body, verbatim.
    fn on_doctype(&mut self, doctype: &str) {}

    /// A `<?name body?>` processing instruction.
    fn on_processing_instruction(&mut self, instruction: &ProcessingInstruction) {}

    /// A `<!…>` declaration that is neither comment, CDATA nor doctype.
    fn on_sgml_declaration(&mut self, declaration: &str) {}

    /// A namespace binding came into scope. Fires before any
    /// [`Self::on_attribute`] that refers to the prefix.
    fn on_open_namespace(&mut self, binding: &NamespaceBinding) {}

    /// A namespace binding went out of scope. Fires after the
    /// [`Self::on_close_tag`] that popped the declaring element.
    fn on_close_namespace(&mut self, binding: &NamespaceBinding) {}

    /// A diagnostic was raised. Buffered text is *not* flushed first.
    fn on_error(&mut self, error: &Error) {}

    /// The input is complete.
    fn on_end(&mut self) {}
}
