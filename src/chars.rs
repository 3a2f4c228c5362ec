//! Codepoint classification for XML names and entity references.
//!
//! The classes follow the XML 1.0 `NameStartChar` / `NameChar` productions
//! restricted to the Basic Multilingual Plane. They are encoded as `match`
//! range tables because the lexer evaluates them for every codepoint of a
//! name; the compiler lowers these to jump/range tables.

/// A function to check whether the codepoint is a whitespace
/// (blank, new line, carriage return or tab).
#[inline]
pub(crate) const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\r' | '\n' | '\t')
}

/// Checks whether the codepoint is one of the two XML quote characters.
#[inline]
pub(crate) const fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'')
}

/// Checks whether the codepoint may start an XML Name
/// ([`NameStartChar`] without the astral ranges).
///
/// [`NameStartChar`]: https://www.w3.org/TR/xml/#NT-NameStartChar
#[inline]
pub(crate) const fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':'
        | 'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}')
}

/// Checks whether the codepoint may continue an XML Name
/// ([`NameChar`] without the astral ranges).
///
/// [`NameChar`]: https://www.w3.org/TR/xml/#NT-NameChar
#[inline]
pub(crate) const fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-'
            | '.'
            | '0'..='9'
            | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// Checks whether the codepoint may start an entity reference name.
/// `#` is allowed as the introducer of numeric character references.
#[inline]
pub(crate) const fn is_entity_start_char(c: char) -> bool {
    c == '#' || is_name_start_char(c)
}

/// Checks whether the codepoint may continue an entity reference name.
#[inline]
pub(crate) const fn is_entity_char(c: char) -> bool {
    c == '#' || is_name_char(c)
}
