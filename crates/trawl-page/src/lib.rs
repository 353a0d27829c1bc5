//! Page model for the trawl parser.
//!
//! A [`Page`] owns every element created while parsing one document in a
//! single arena. Links, images, forms, widgets and frames refer back into that
//! arena by [`ElementId`], so the model can be built incrementally without
//! shared ownership and queried afterwards without lifetimes leaking into the
//! caller.

mod element;
mod page;

pub use element::{AttributesMap, Element, ElementId, ElementKind};
pub use page::{Form, Frame, Image, Link, Page};
