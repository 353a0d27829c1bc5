//! Integration tests for character reference decoding and text normalisation.

use std::borrow::Cow;

use trawl_common::entities::{decode_entities, lookup_entity, normalise_text};

#[test]
fn test_lookup_common_entities() {
    assert_eq!(lookup_entity("amp"), Some("&"));
    assert_eq!(lookup_entity("lt"), Some("<"));
    assert_eq!(lookup_entity("quot"), Some("\""));
    assert_eq!(lookup_entity("notarealentity"), None);
}

#[test]
fn test_decode_named() {
    assert_eq!(decode_entities("T &amp; Co"), "T & Co");
    assert_eq!(decode_entities("&lt;b&gt;"), "<b>");
    assert_eq!(decode_entities("&apos;quoted&quot;"), "'quoted\"");
}

#[test]
fn test_decode_numeric() {
    assert_eq!(decode_entities("&#65;&#x42;&#X43;"), "ABC");
    assert_eq!(decode_entities("&#8364;"), "\u{20AC}");
}

#[test]
fn test_unterminated_and_unknown_are_kept() {
    assert_eq!(decode_entities("fish &amp chips"), "fish &amp chips");
    assert_eq!(decode_entities("&bogus;"), "&bogus;");
    assert_eq!(decode_entities("&#0;"), "&#0;");
    assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
    assert_eq!(decode_entities("a & b"), "a & b");
}

#[test]
fn test_plain_text_is_borrowed() {
    assert!(matches!(decode_entities("nothing here"), Cow::Borrowed(_)));
}

#[test]
fn test_normalise_collapses_whitespace() {
    assert_eq!(normalise_text("  Hello \n\t  World  "), "Hello World");
}

#[test]
fn test_normalise_strips_leftover_tags() {
    assert_eq!(normalise_text("<b>Bold</b> and <i>italic</i>"), "Bold and italic");
}

#[test]
fn test_normalise_decodes_after_stripping() {
    // An escaped tag must survive as text.
    assert_eq!(normalise_text("&lt;b&gt; &amp; <b>x</b>"), "<b> & x");
}
