//! Entity reference resolution.
//!
//! Three layers take part in resolving `&name;`:
//!
//! 1. a process-wide registry of application-defined entities
//!    ([`define`]), initialized once and modifiable during parsing;
//!    changes are visible to every live parser from its next `&name;`
//!    scan onward;
//! 2. the five XML predefined entities ([`resolve_xml_entity`]);
//! 3. the extended HTML named set ([`resolve_html_entity`]), used by
//!    parsers without [`Config::strict_entities`].
//!
//! Numeric character references (`&#…;`/`&#x…;`) are handled by the
//! parser directly and cannot be overridden.
//!
//! The registry is the only process-wide state in the crate. Parsers also
//! accept per-instance definitions through [`Parser::define_entity`],
//! which win over the registry.
//!
//! [`Config::strict_entities`]: crate::Config::strict_entities
//! [`Parser::define_entity`]: crate::Parser::define_entity

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

fn registry() -> &'static RwLock<HashMap<String, String>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Defines or overrides a named entity for the whole process.
///
/// The definition is visible to all live parsers except those constructed
/// with [`Config::strict_entities`], which resolve only the predefined
/// five. Values are replacement text; with
/// [`Config::unparsed_entities`] they are re-fed through the machine and
/// may contain markup.
///
/// ```
/// sax::entity::define("version", "0.1.0");
/// # sax::entity::reset();
/// ```
///
/// [`Config::strict_entities`]: crate::Config::strict_entities
/// [`Config::unparsed_entities`]: crate::Config::unparsed_entities
pub fn define(name: impl Into<String>, value: impl Into<String>) {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.into(), value.into());
}

/// Removes every definition made with [`define`].
pub fn reset() {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

/// Looks up a process-wide definition made with [`define`].
pub(crate) fn defined(name: &str) -> Option<String> {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// Resolves the five predefined XML entities. If the specified entity is
/// not a predefined XML entity, `None` is returned.
///
/// ```
/// # use sax::entity::resolve_xml_entity;
/// assert_eq!(resolve_xml_entity("lt"), Some("<"));
/// assert_eq!(resolve_xml_entity("gt"), Some(">"));
/// assert_eq!(resolve_xml_entity("amp"), Some("&"));
/// assert_eq!(resolve_xml_entity("apos"), Some("'"));
/// assert_eq!(resolve_xml_entity("quot"), Some("\""));
///
/// assert_eq!(resolve_xml_entity("foo"), None);
/// ```
pub const fn resolve_xml_entity(entity: &str) -> Option<&'static str> {
    // match over strings are not allowed in const functions
    let s = match entity.as_bytes() {
        b"lt" => "<",
        b"gt" => ">",
        b"amp" => "&",
        b"apos" => "'",
        b"quot" => "\"",
        _ => return None,
    };
    Some(s)
}

/// Checks whether `value` is the replacement text of one of the five
/// predefined XML entities. Such replacements are never re-fed through the
/// machine, so `&lt;` cannot smuggle markup in.
pub(crate) const fn is_xml_entity_value(value: &str) -> bool {
    matches!(value.as_bytes(), b"&" | b"<" | b">" | b"\"" | b"'")
}

/// Resolves the extended HTML named entity set (names terminated by `;`
/// only; the legacy semicolonless forms do not exist here).
///
/// The predefined XML five are not part of this table; resolve them with
/// [`resolve_xml_entity`] first.
#[rustfmt::skip]
pub fn resolve_html_entity(entity: &str) -> Option<&'static str> {
    let s = match entity {
        // Latin-1
        "nbsp" => "\u{A0}",   "iexcl" => "¡",     "cent" => "¢",      "pound" => "£",
        "curren" => "¤",      "yen" => "¥",       "brvbar" => "¦",    "sect" => "§",
        "uml" => "¨",         "copy" => "©",      "ordf" => "ª",      "laquo" => "«",
        "not" => "¬",         "shy" => "\u{AD}",  "reg" => "®",       "macr" => "¯",
        "deg" => "°",         "plusmn" => "±",    "sup2" => "²",      "sup3" => "³",
        "acute" => "´",       "micro" => "µ",     "para" => "¶",      "middot" => "·",
        "cedil" => "¸",       "sup1" => "¹",      "ordm" => "º",      "raquo" => "»",
        "frac14" => "¼",      "frac12" => "½",    "frac34" => "¾",    "iquest" => "¿",
        "Agrave" => "À",      "Aacute" => "Á",    "Acirc" => "Â",     "Atilde" => "Ã",
        "Auml" => "Ä",        "Aring" => "Å",     "AElig" => "Æ",     "Ccedil" => "Ç",
        "Egrave" => "È",      "Eacute" => "É",    "Ecirc" => "Ê",     "Euml" => "Ë",
        "Igrave" => "Ì",      "Iacute" => "Í",    "Icirc" => "Î",     "Iuml" => "Ï",
        "ETH" => "Ð",         "Ntilde" => "Ñ",    "Ograve" => "Ò",    "Oacute" => "Ó",
        "Ocirc" => "Ô",       "Otilde" => "Õ",    "Ouml" => "Ö",      "times" => "×",
        "Oslash" => "Ø",      "Ugrave" => "Ù",    "Uacute" => "Ú",    "Ucirc" => "Û",
        "Uuml" => "Ü",        "Yacute" => "Ý",    "THORN" => "Þ",     "szlig" => "ß",
        "agrave" => "à",      "aacute" => "á",    "acirc" => "â",     "atilde" => "ã",
        "auml" => "ä",        "aring" => "å",     "aelig" => "æ",     "ccedil" => "ç",
        "egrave" => "è",      "eacute" => "é",    "ecirc" => "ê",     "euml" => "ë",
        "igrave" => "ì",      "iacute" => "í",    "icirc" => "î",     "iuml" => "ï",
        "eth" => "ð",         "ntilde" => "ñ",    "ograve" => "ò",    "oacute" => "ó",
        "ocirc" => "ô",       "otilde" => "õ",    "ouml" => "ö",      "divide" => "÷",
        "oslash" => "ø",      "ugrave" => "ù",    "uacute" => "ú",    "ucirc" => "û",
        "uuml" => "ü",        "yacute" => "ý",    "thorn" => "þ",     "yuml" => "ÿ",
        // Latin Extended + spacing modifiers
        "OElig" => "Œ",       "oelig" => "œ",     "Scaron" => "Š",    "scaron" => "š",
        "Yuml" => "Ÿ",        "fnof" => "ƒ",      "circ" => "ˆ",      "tilde" => "˜",
        // Greek
        "Alpha" => "Α",       "Beta" => "Β",      "Gamma" => "Γ",     "Delta" => "Δ",
        "Epsilon" => "Ε",     "Zeta" => "Ζ",      "Eta" => "Η",       "Theta" => "Θ",
        "Iota" => "Ι",        "Kappa" => "Κ",     "Lambda" => "Λ",    "Mu" => "Μ",
        "Nu" => "Ν",          "Xi" => "Ξ",        "Omicron" => "Ο",   "Pi" => "Π",
        "Rho" => "Ρ",         "Sigma" => "Σ",     "Tau" => "Τ",       "Upsilon" => "Υ",
        "Phi" => "Φ",         "Chi" => "Χ",       "Psi" => "Ψ",       "Omega" => "Ω",
        "alpha" => "α",       "beta" => "β",      "gamma" => "γ",     "delta" => "δ",
        "epsilon" => "ε",     "zeta" => "ζ",      "eta" => "η",       "theta" => "θ",
        "iota" => "ι",        "kappa" => "κ",     "lambda" => "λ",    "mu" => "μ",
        "nu" => "ν",          "xi" => "ξ",        "omicron" => "ο",   "pi" => "π",
        "rho" => "ρ",         "sigmaf" => "ς",    "sigma" => "σ",     "tau" => "τ",
        "upsilon" => "υ",     "phi" => "φ",       "chi" => "χ",       "psi" => "ψ",
        "omega" => "ω",       "thetasym" => "ϑ",  "upsih" => "ϒ",     "piv" => "ϖ",
        // General punctuation
        "ensp" => "\u{2002}", "emsp" => "\u{2003}", "thinsp" => "\u{2009}",
        "zwnj" => "\u{200C}", "zwj" => "\u{200D}", "lrm" => "\u{200E}", "rlm" => "\u{200F}",
        "ndash" => "–",       "mdash" => "—",     "lsquo" => "‘",     "rsquo" => "’",
        "sbquo" => "‚",       "ldquo" => "“",     "rdquo" => "”",     "bdquo" => "„",
        "dagger" => "†",      "Dagger" => "‡",    "bull" => "•",      "hellip" => "…",
        "permil" => "‰",      "prime" => "′",     "Prime" => "″",     "lsaquo" => "‹",
        "rsaquo" => "›",      "oline" => "‾",     "frasl" => "⁄",     "euro" => "€",
        // Letterlike
        "image" => "ℑ",       "weierp" => "℘",    "real" => "ℜ",      "trade" => "™",
        "alefsym" => "ℵ",
        // Arrows
        "larr" => "←",        "uarr" => "↑",      "rarr" => "→",      "darr" => "↓",
        "harr" => "↔",        "crarr" => "↵",     "lArr" => "⇐",      "uArr" => "⇑",
        "rArr" => "⇒",        "dArr" => "⇓",      "hArr" => "⇔",
        // Mathematical operators
        "forall" => "∀",      "part" => "∂",      "exist" => "∃",     "empty" => "∅",
        "nabla" => "∇",       "isin" => "∈",      "notin" => "∉",     "ni" => "∋",
        "prod" => "∏",        "sum" => "∑",       "minus" => "−",     "lowast" => "∗",
        "radic" => "√",       "prop" => "∝",      "infin" => "∞",     "ang" => "∠",
        "and" => "∧",         "or" => "∨",        "cap" => "∩",       "cup" => "∪",
        "int" => "∫",         "there4" => "∴",    "sim" => "∼",       "cong" => "≅",
        "asymp" => "≈",       "ne" => "≠",        "equiv" => "≡",     "le" => "≤",
        "ge" => "≥",          "sub" => "⊂",       "sup" => "⊃",       "nsub" => "⊄",
        "sube" => "⊆",        "supe" => "⊇",      "oplus" => "⊕",     "otimes" => "⊗",
        "perp" => "⊥",        "sdot" => "⋅",
        // Technical and geometric
        "lceil" => "⌈",       "rceil" => "⌉",     "lfloor" => "⌊",    "rfloor" => "⌋",
        "lang" => "\u{2329}", "rang" => "\u{232A}", "loz" => "◊",
        "spades" => "♠",      "clubs" => "♣",     "hearts" => "♥",    "diams" => "♦",
        _ => return None,
    };
    Some(s)
}

/// Parses a numeric character reference, `reference` being the scanned
/// entity name including the leading `#`.
///
/// Leading zeros of the numeric portion are stripped; what remains must be
/// non-empty, consist only of digits of the radix, and denote a Unicode
/// scalar value. Surrogate code points and values above `0x10FFFF` are
/// rejected.
pub(crate) fn parse_character_reference(reference: &str) -> Option<char> {
    let digits = reference.strip_prefix('#')?;
    let (radix, digits) = match digits.strip_prefix(|c| c == 'x' || c == 'X') {
        Some(hex_digits) => (16, hex_digits),
        None => (10, digits),
    };
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return None;
    }
    let code = if radix == 16 {
        parse_hexadecimal(digits)
    } else {
        parse_decimal(digits)
    }?;
    std::char::from_u32(code)
}

fn parse_hexadecimal(digits: &str) -> Option<u32> {
    // maximum code is 0x10FFFF => 6 characters
    if digits.len() > 6 {
        return None;
    }
    let mut code = 0;
    for b in digits.bytes() {
        code <<= 4;
        code += match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return None,
        } as u32;
    }
    Some(code)
}

fn parse_decimal(digits: &str) -> Option<u32> {
    // maximum code is 0x10FFFF = 1114111 => 7 characters
    if digits.len() > 7 {
        return None;
    }
    let mut code = 0;
    for b in digits.bytes() {
        code *= 10;
        code += match b {
            b'0'..=b'9' => b - b'0',
            _ => return None,
        } as u32;
    }
    Some(code)
}
