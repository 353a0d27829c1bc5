//! Character reference decoding.
//!
//! Attribute values and element text arrive with their character references
//! intact (`&amp;`, `&#60;`, `&#x3C;`). Decoding follows the lenient behaviour
//! of a scraping client rather than the full tokenizer algorithm: a reference
//! is only replaced when it is terminated by `;` and resolves to a known
//! entity or a valid code point. Everything else is left untouched.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Named references understood by the decoder, keyed without `&` and `;`.
static NAMED_ENTITIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("amp", "&"),
        ("lt", "<"),
        ("gt", ">"),
        ("quot", "\""),
        ("apos", "'"),
        ("nbsp", "\u{00A0}"),
        ("shy", "\u{00AD}"),
        ("copy", "\u{00A9}"),
        ("reg", "\u{00AE}"),
        ("trade", "\u{2122}"),
        ("mdash", "\u{2014}"),
        ("ndash", "\u{2013}"),
        ("hellip", "\u{2026}"),
        ("bull", "\u{2022}"),
        ("middot", "\u{00B7}"),
        ("sect", "\u{00A7}"),
        ("para", "\u{00B6}"),
        ("lsquo", "\u{2018}"),
        ("rsquo", "\u{2019}"),
        ("ldquo", "\u{201C}"),
        ("rdquo", "\u{201D}"),
        ("laquo", "\u{00AB}"),
        ("raquo", "\u{00BB}"),
        ("iexcl", "\u{00A1}"),
        ("iquest", "\u{00BF}"),
        ("cent", "\u{00A2}"),
        ("pound", "\u{00A3}"),
        ("euro", "\u{20AC}"),
        ("yen", "\u{00A5}"),
        ("curren", "\u{00A4}"),
        ("times", "\u{00D7}"),
        ("divide", "\u{00F7}"),
        ("plusmn", "\u{00B1}"),
        ("minus", "\u{2212}"),
        ("ne", "\u{2260}"),
        ("le", "\u{2264}"),
        ("ge", "\u{2265}"),
        ("deg", "\u{00B0}"),
        ("micro", "\u{00B5}"),
        ("frac12", "\u{00BD}"),
        ("frac14", "\u{00BC}"),
        ("frac34", "\u{00BE}"),
        ("larr", "\u{2190}"),
        ("rarr", "\u{2192}"),
        ("uarr", "\u{2191}"),
        ("darr", "\u{2193}"),
        ("alpha", "\u{03B1}"),
        ("beta", "\u{03B2}"),
        ("gamma", "\u{03B3}"),
        ("delta", "\u{03B4}"),
        ("pi", "\u{03C0}"),
        ("sigma", "\u{03C3}"),
        ("omega", "\u{03C9}"),
        ("Agrave", "\u{00C0}"),
        ("Aacute", "\u{00C1}"),
        ("Acirc", "\u{00C2}"),
        ("Auml", "\u{00C4}"),
        ("Aring", "\u{00C5}"),
        ("agrave", "\u{00E0}"),
        ("aacute", "\u{00E1}"),
        ("acirc", "\u{00E2}"),
        ("auml", "\u{00E4}"),
        ("aring", "\u{00E5}"),
        ("Eacute", "\u{00C9}"),
        ("egrave", "\u{00E8}"),
        ("eacute", "\u{00E9}"),
        ("ecirc", "\u{00EA}"),
        ("iacute", "\u{00ED}"),
        ("Ouml", "\u{00D6}"),
        ("oacute", "\u{00F3}"),
        ("ouml", "\u{00F6}"),
        ("Uuml", "\u{00DC}"),
        ("uacute", "\u{00FA}"),
        ("uuml", "\u{00FC}"),
        ("szlig", "\u{00DF}"),
        ("ntilde", "\u{00F1}"),
        ("Ntilde", "\u{00D1}"),
        ("ccedil", "\u{00E7}"),
        ("Ccedil", "\u{00C7}"),
    ])
});

/// A terminated character reference: decimal, hexadecimal or named.
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([A-Za-z][A-Za-z0-9]*));")
        .expect("character reference pattern is valid")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Look up a named reference (without the leading `&` or trailing `;`).
#[must_use]
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES.get(name).copied()
}

fn code_point(digits: &str, radix: u32) -> Option<char> {
    u32::from_str_radix(digits, radix)
        .ok()
        .filter(|&value| value != 0)
        .and_then(char::from_u32)
}

fn replace_reference(caps: &Captures<'_>) -> String {
    let decoded = if let Some(decimal) = caps.get(1) {
        code_point(decimal.as_str(), 10).map(String::from)
    } else if let Some(hex) = caps.get(2) {
        code_point(hex.as_str(), 16).map(String::from)
    } else {
        caps.get(3)
            .and_then(|name| lookup_entity(name.as_str()))
            .map(String::from)
    };
    decoded.unwrap_or_else(|| caps[0].to_string())
}

/// Decode every terminated character reference in `text`.
///
/// Unknown names, out-of-range code points and unterminated references are
/// kept verbatim. Borrows when there is nothing to decode.
#[must_use]
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    REFERENCE.replace_all(text, replace_reference)
}

/// Reduce raw element content to the text a reader would see.
///
/// Leftover markup (tags outside the parser's interest set stay in the content
/// buffer) is removed, references are decoded and runs of whitespace collapse
/// to a single space.
#[must_use]
pub fn normalise_text(raw: &str) -> String {
    let stripped = TAG.replace_all(raw, "");
    let decoded = decode_entities(&stripped);
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}
