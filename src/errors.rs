//! Error management module.
//!
//! The parser distinguishes *syntax diagnostics*, which are recoverable and
//! delivered through [`Handler::on_error`], from *structural failures*,
//! which indicate misuse of the parser object itself. In lenient mode the
//! machine recovers from every syntax diagnostic and continues; in strict
//! mode the diagnostic is additionally latched and re-raised by the next
//! [`Parser::write`] until [`Parser::resume`] clears it.
//!
//! [`Handler::on_error`]: crate::Handler::on_error
//! [`Parser::write`]: crate::Parser::write
//! [`Parser::resume`]: crate::Parser::resume

use std::fmt;

use crate::namespace::{XMLNS_URI, XML_URI};

/// A source location, tracked only when [`Config::track_position`] is set.
///
/// All fields are zero-based. `offset` counts codepoints, not bytes, so it
/// stays aligned for multi-byte characters.
///
/// [`Config::track_position`]: crate::Config::track_position
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Position {
    /// Absolute codepoint offset from the start of the stream.
    pub offset: u64,
    /// Line number, incremented on every `\n`.
    pub line: u64,
    /// Codepoint column, reset on every `\n`.
    pub column: u64,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A recoverable syntax diagnostic.
///
/// Lenient mode suppresses most of these entirely; strict mode reports and
/// latches them. [`SyntaxError::UnexpectedEnd`] and
/// [`SyntaxError::BufferExceeded`] are reported in both modes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyntaxError {
    /// Character data was found before the first element.
    NonWhitespaceBeforeFirstTag,
    /// A `<` that does not open markup appeared in character data.
    UnencodedLt,
    /// A codepoint outside of the Name class appeared in a tag name.
    InvalidCharInTagName,
    /// A codepoint that cannot start or continue an attribute name.
    InvalidAttributeName,
    /// A new attribute name started immediately after a quoted value.
    NoWhitespaceBetweenAttributes,
    /// An attribute value started without a quote.
    UnquotedAttributeValue,
    /// An attribute name was not followed by `=`.
    AttributeWithoutValue,
    /// A `/` inside an open tag that does not close it.
    UnexpectedSlashInTag,
    /// The empty closing tag `</>`.
    WeirdEmptyCloseTag,
    /// A codepoint that cannot start a name in a closing tag.
    InvalidTagNameInCloseTag,
    /// Trailing garbage between a closing tag name and `>`.
    InvalidCharsInCloseTag,
    /// A closing tag matched an element below the top of the stack.
    UnexpectedCloseTag,
    /// A closing tag matched no open element. Carries the requested name.
    UnmatchedCloseTag(String),
    /// The root element was still open when the input ended.
    UnclosedRootTag,
    /// The input ended in the middle of a construct.
    UnexpectedEnd,
    /// Non-whitespace character data outside of the root element.
    TextOutsideRootNode,
    /// `--` inside a comment not followed by `>`.
    MalformedComment,
    /// A second doctype, or a doctype after the root element.
    InappropriateDoctype,
    /// `xmlns:xml` bound to anything but the reserved URI.
    XmlPrefixBinding,
    /// `xmlns:xmlns` bound to anything but the reserved URI.
    XmlnsPrefixBinding,
    /// A prefixed name whose prefix has no in-scope binding.
    UnboundNamespacePrefix(String),
    /// A numeric character reference that does not denote a scalar value.
    InvalidCharacterEntity,
    /// A codepoint outside of the entity name class inside `&...;`.
    InvalidCharInEntityName,
    /// A bounded buffer crossed [`Config::max_buffer_length`].
    /// Carries the buffer name.
    ///
    /// [`Config::max_buffer_length`]: crate::Config::max_buffer_length
    BufferExceeded(&'static str),
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NonWhitespaceBeforeFirstTag => f.write_str("Non-whitespace before first tag"),
            Self::UnencodedLt => f.write_str("Unencoded <"),
            Self::InvalidCharInTagName => f.write_str("Invalid character in tag name"),
            Self::InvalidAttributeName => f.write_str("Invalid attribute name"),
            Self::NoWhitespaceBetweenAttributes => {
                f.write_str("No whitespace between attributes")
            }
            Self::UnquotedAttributeValue => f.write_str("Unquoted attribute value"),
            Self::AttributeWithoutValue => f.write_str("Attribute without value"),
            Self::UnexpectedSlashInTag => {
                f.write_str("Forward-slash in opening tag not followed by >")
            }
            Self::WeirdEmptyCloseTag => f.write_str("Weird empty close tag"),
            Self::InvalidTagNameInCloseTag => f.write_str("Invalid tagname in closing tag"),
            Self::InvalidCharsInCloseTag => f.write_str("Invalid characters in closing tag"),
            Self::UnexpectedCloseTag => f.write_str("Unexpected close tag"),
            Self::UnmatchedCloseTag(name) => write!(f, "Unmatched closing tag: {}", name),
            Self::UnclosedRootTag => f.write_str("Unclosed root tag"),
            Self::UnexpectedEnd => f.write_str("Unexpected end"),
            Self::TextOutsideRootNode => f.write_str("Text data outside of root node"),
            Self::MalformedComment => f.write_str("Malformed comment"),
            Self::InappropriateDoctype => {
                f.write_str("Inappropriately located doctype declaration")
            }
            Self::XmlPrefixBinding => write!(f, "xml: prefix must be bound to {}", XML_URI),
            Self::XmlnsPrefixBinding => write!(f, "xmlns: prefix must be bound to {}", XMLNS_URI),
            Self::UnboundNamespacePrefix(prefix) => {
                write!(f, "Unbound namespace prefix: {:?}", prefix)
            }
            Self::InvalidCharacterEntity => f.write_str("Invalid character entity"),
            Self::InvalidCharInEntityName => f.write_str("Invalid character in entity name"),
            Self::BufferExceeded(buffer) => write!(f, "Max buffer length exceeded: {}", buffer),
        }
    }
}

/// The error type used by this crate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A syntax diagnostic, with the position of the offending codepoint
    /// when position tracking is enabled.
    Syntax(SyntaxError, Option<Position>),
    /// [`Parser::write`] or [`Parser::end`] was called after the input was
    /// completed with [`Parser::end`].
    ///
    /// [`Parser::write`]: crate::Parser::write
    /// [`Parser::end`]: crate::Parser::end
    WriteAfterClose,
}

impl Error {
    /// The position of the offending codepoint, if it was tracked.
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Syntax(_, position) => *position,
            Self::WriteAfterClose => None,
        }
    }

    /// The syntax diagnostic carried by this error, if any.
    pub fn syntax(&self) -> Option<&SyntaxError> {
        match self {
            Self::Syntax(kind, _) => Some(kind),
            Self::WriteAfterClose => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Syntax(kind, Some(position)) => write!(f, "{} at {}", kind, position),
            Self::Syntax(kind, None) => write!(f, "{}", kind),
            Self::WriteAfterClose => f.write_str("Cannot write after close"),
        }
    }
}

impl std::error::Error for Error {}

/// A specialized `Result` type where the error is hard-wired to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages() {
        assert_eq!(SyntaxError::UnencodedLt.to_string(), "Unencoded <");
        assert_eq!(
            SyntaxError::UnmatchedCloseTag("div".to_string()).to_string(),
            "Unmatched closing tag: div"
        );
        assert_eq!(
            SyntaxError::BufferExceeded("comment").to_string(),
            "Max buffer length exceeded: comment"
        );
        assert_eq!(
            SyntaxError::XmlPrefixBinding.to_string(),
            "xml: prefix must be bound to http://www.w3.org/XML/1998/namespace"
        );
    }

    #[test]
    fn positioned() {
        let err = Error::Syntax(
            SyntaxError::UnexpectedEnd,
            Some(Position {
                offset: 12,
                line: 2,
                column: 4,
            }),
        );
        assert_eq!(err.to_string(), "Unexpected end at line 2, column 4");
        assert_eq!(err.position().unwrap().offset, 12);
    }
}
