//! Common utilities for the trawl page parser.
//!
//! This crate provides shared infrastructure used by the parsing crates:
//! - **Warning System** - deduplicated warnings routed through `tracing`
//! - **Entities** - character reference decoding and text normalisation

pub mod entities;
pub mod warning;

pub use entities::{decode_entities, normalise_text};
pub use warning::{clear_warnings, warn_once};
