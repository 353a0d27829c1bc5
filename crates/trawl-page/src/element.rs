use std::collections::BTreeMap;

use serde::Serialize;
use strum_macros::{Display, EnumString, IntoStaticStr};
use trawl_common::normalise_text;

/// Map of lower-cased attribute names to decoded values.
///
/// Ordered so that serialized pages are stable.
pub type AttributesMap = BTreeMap<String, String>;

/// A type-safe index into a [`Page`](crate::Page)'s element arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

/// The elements the page model gives meaning to.
///
/// Parsed from tag names in any case; anything else is [`ElementKind::Generic`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// `<a>`
    #[strum(serialize = "a")]
    #[serde(rename = "a")]
    Anchor,
    /// `<base>`
    Base,
    /// `<title>`
    Title,
    /// `<form>`
    Form,
    /// `<input>`
    Input,
    /// `<button>`
    Button,
    /// `<textarea>`
    TextArea,
    /// `<select>`
    Select,
    /// `<option>`
    #[strum(serialize = "option")]
    #[serde(rename = "option")]
    SelectOption,
    /// `<frameset>`
    Frameset,
    /// `<frame>`
    Frame,
    /// `<label>`
    Label,
    /// `<img>`
    #[strum(serialize = "img")]
    #[serde(rename = "img")]
    Image,
    /// Any other tag the parser was asked to watch.
    #[strum(disabled)]
    Generic,
}

impl ElementKind {
    /// Classify a tag name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(Self::Generic)
    }

    /// Whether the element stays open until its end tag.
    #[must_use]
    pub const fn expects_closing_tag(self) -> bool {
        !matches!(self, Self::Base | Self::Input | Self::Frame | Self::Image)
    }

    /// Whether the element is complete as soon as its start tag is read.
    #[must_use]
    pub const fn is_self_terminating(self) -> bool {
        !self.expects_closing_tag()
    }

    /// Whether text inside the element goes to it alone.
    #[must_use]
    pub const fn is_exclusive(self) -> bool {
        matches!(self, Self::Title)
    }

    /// Whether the element is a form control.
    #[must_use]
    pub const fn is_widget(self) -> bool {
        matches!(
            self,
            Self::Input | Self::Button | Self::TextArea | Self::Select
        )
    }
}

/// One element of the page.
///
/// `content` is the raw text seen while the element was open, including any
/// markup of tags the parser did not watch. Use [`Element::text`] for the
/// readable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    name: String,
    kind: ElementKind,
    attributes: AttributesMap,
    content: String,
    children: Vec<ElementId>,
    label: Option<String>,
}

impl Element {
    /// Create an element from its lower-case tag name and attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: AttributesMap) -> Self {
        let name = name.into();
        Self {
            kind: ElementKind::from_name(&name),
            name,
            attributes,
            content: String::new(),
            children: Vec::new(),
            label: None,
        }
    }

    /// The tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element's kind.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Look up an attribute by its lower-case name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes.
    #[must_use]
    pub const fn attributes(&self) -> &AttributesMap {
        &self.attributes
    }

    /// The `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Raw accumulated content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Content with markup removed, references decoded and whitespace
    /// collapsed.
    #[must_use]
    pub fn text(&self) -> String {
        normalise_text(&self.content)
    }

    /// Elements attached under this one (only `option`s inside a `select`
    /// in practice).
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Text of the label attached to this widget, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Append raw text.
    pub fn add_content(&mut self, text: &str) {
        self.content.push_str(text);
    }

    /// Attach a child element.
    pub fn add_child(&mut self, child: ElementId) {
        self.children.push(child);
    }

    /// Attach label text.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }
}
