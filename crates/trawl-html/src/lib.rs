//! Markup parsing for trawl.
//!
//! # Scope
//!
//! This crate turns raw markup into a [`trawl_page::Page`]:
//! - **Lexer configuration** ([`HtmlLexer`]) - the mode table that teaches the
//!   generic tokenizer about tags, attribute values and the regions to skip
//!   (comments, scripts, styles)
//! - **SAX translation** ([`SaxTranslator`], [`SaxParser`]) - turns the token
//!   stream into start-element, end-element and content calls
//! - **Page building** ([`PageBuilder`]) - interprets those calls into links,
//!   images, forms with their widgets and labels, and frames
//!
//! # Not a tree builder
//!
//! Only the tags in the configured interest set are recognised. Everything
//! else passes through as text. Unclosed elements, stray end tags and
//! dangling labels are tolerated rather than repaired.

/// Page building from SAX events.
pub mod builder;
/// Parser configuration.
pub mod config;
/// The markup mode table.
pub mod lexer;
/// Token-to-event translation.
pub mod sax;

pub use builder::PageBuilder;
pub use config::{DEFAULT_TAGS, ParserConfig};
pub use lexer::{HtmlLexer, HtmlMode, MarkupTokens};
pub use sax::{SaxListener, SaxParser, SaxTranslator};
pub use trawl_lexer::{LexError, Rejection};
