//! The states of the lexer.

/// An internal state of the machine. Used to preserve information about the
/// currently parsed construct between calls to [`Parser::write()`].
///
/// [`Parser::write()`]: super::Parser::write
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum State {
    /// Start of input; consumes an optional U+FEFF byte order mark.
    Begin,
    /// Leading whitespace before any markup was seen.
    BeginWhitespace,
    /// Character data between tags.
    Text,
    /// A `&` was seen inside character data; an entity name accumulates.
    TextEntity,
    /// A `<` was seen, but nothing else.
    OpenWaka,
    /// A `<!` was seen; the accumulator decides between comment, CDATA,
    /// doctype and a bare SGML declaration.
    SgmlDecl,
    /// Inside a quoted literal of a `<!…>` declaration.
    SgmlDeclQuoted,
    /// Inside the body of a `<!DOCTYPE …>` declaration.
    Doctype,
    /// Inside a quoted literal of a doctype body.
    DoctypeQuoted,
    /// Inside the `[…]` internal subset of a doctype.
    DoctypeDtd,
    /// Inside a quoted literal of the internal subset.
    DoctypeDtdQuoted,
    /// Inside a `<!-- … -->` comment.
    Comment,
    /// A single `-` was seen inside a comment.
    CommentEnding,
    /// `--` was seen inside a comment; only `>` may close it now.
    CommentEnded,
    /// Inside a `<![CDATA[ … ]]>` section.
    Cdata,
    /// A single `]` was seen inside CDATA.
    CdataEnding,
    /// `]]` was seen inside CDATA; `>` closes, further `]`s shift the run.
    CdataEnding2,
    /// A `<?` was seen; the instruction target accumulates.
    ProcInst,
    /// Whitespace ended the target; the instruction body accumulates.
    ProcInstBody,
    /// A `?` was seen inside a processing instruction.
    ProcInstEnding,
    /// A `<NAME` tag name accumulates.
    OpenTag,
    /// A `/` was seen inside an open tag; `<name/…`.
    OpenTagSlash,
    /// Inside an open tag, before an attribute name.
    Attribute,
    /// An attribute name accumulates.
    AttributeName,
    /// Whitespace after an attribute name, before a possible `=`.
    AttributeNameSawWhite,
    /// After `=`, before the value introducer.
    AttributeValue,
    /// Inside a quoted attribute value.
    AttributeValueQuoted,
    /// After the closing quote of an attribute value.
    AttributeValueClosed,
    /// Inside an unquoted attribute value, terminated by whitespace or `>`.
    AttributeValueUnquoted,
    /// A `&` was seen inside a quoted attribute value.
    AttributeValueEntityQ,
    /// A `&` was seen inside an unquoted attribute value.
    AttributeValueEntityU,
    /// A `</NAME` closing tag name accumulates.
    CloseTag,
    /// Whitespace after a closing tag name, before `>`.
    CloseTagSawWhite,
    /// Raw text content of a lenient `<script>` element.
    Script,
    /// A `<` was seen inside script content; `/` makes it a closing tag.
    ScriptEnding,
}
