//! Mode-stack lexer for the trawl page parser.
//!
//! # Scope
//!
//! This crate implements a small, generic lexing engine:
//! - **Pattern sets** - an ordered list of regular expressions compiled into a
//!   single alternation that reports which rule matched
//! - **Mode stack** - the nested parsing contexts (inside a tag, inside a
//!   quoted attribute value, ...)
//! - **Tokenizer** - the scan/dispatch loop that feeds matched and unmatched
//!   text to per-mode handlers and applies mode transitions
//!
//! Nothing here knows about markup. The HTML configuration lives in
//! `trawl-html`.

/// Errors raised while configuring or running the tokenizer.
pub mod error;
/// The stack of active lexer modes.
pub mod mode_stack;
/// Compounded alternation matcher.
pub mod pattern_set;
/// The scan/dispatch loop.
pub mod tokenizer;

pub use error::{LexError, Rejection};
pub use mode_stack::ModeStack;
pub use pattern_set::{PatternMatch, PatternSet};
pub use tokenizer::{Handler, LexerEvent, Tokenizer, Transition};
