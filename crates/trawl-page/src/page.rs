use serde::Serialize;
use trawl_common::{decode_entities, normalise_text};

use crate::element::{Element, ElementId, ElementKind};

/// A hyperlink found on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// The `<a>` element.
    pub element: ElementId,
    /// Its `href`, as written.
    pub href: String,
}

/// An image found on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    /// The `<img>` element.
    pub element: ElementId,
    /// Its `src`, as written.
    pub src: String,
}

/// A frame of the page's frameset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// The `<frame>` element.
    pub element: ElementId,
    /// Its `src`, as written.
    pub src: String,
}

/// A form and the widgets that appeared while it was open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Form {
    element: ElementId,
    name: Option<String>,
    id: Option<String>,
    action: Option<String>,
    method: String,
    widgets: Vec<ElementId>,
}

impl Form {
    /// Start a form for the `<form>` element stored at `id`.
    #[must_use]
    pub fn new(id: ElementId, element: &Element) -> Self {
        Self {
            element: id,
            name: element.attribute("name").map(str::to_string),
            id: element.id().map(str::to_string),
            action: element.attribute("action").map(str::to_string),
            method: element
                .attribute("method")
                .map_or_else(|| "get".to_string(), str::to_ascii_lowercase),
            widgets: Vec::new(),
        }
    }

    /// The `<form>` element.
    #[must_use]
    pub const fn element(&self) -> ElementId {
        self.element
    }

    /// The `name` attribute.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The `action` attribute, unresolved.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Lower-case submission method, `get` when absent.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Widgets in document order.
    #[must_use]
    pub fn widgets(&self) -> &[ElementId] {
        &self.widgets
    }

    /// Record a widget.
    pub fn add_widget(&mut self, widget: ElementId) {
        self.widgets.push(widget);
    }
}

/// The parsed model of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    url: Option<String>,
    title: Option<String>,
    base_url: Option<String>,
    links: Vec<Link>,
    images: Vec<Image>,
    forms: Vec<Form>,
    widgets: Vec<ElementId>,
    frameset: Option<ElementId>,
    frames: Vec<Frame>,
    elements: Vec<Element>,
}

impl Page {
    /// An empty page fetched from `url`.
    #[must_use]
    pub const fn new(url: Option<String>) -> Self {
        Self {
            url,
            title: None,
            base_url: None,
            links: Vec::new(),
            images: Vec::new(),
            forms: Vec::new(),
            widgets: Vec::new(),
            frameset: None,
            frames: Vec::new(),
            elements: Vec::new(),
        }
    }

    // Arena

    /// Store an element and return its id.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(element);
        id
    }

    /// Get an element by id.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    /// Get a mutable element by id.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)
    }

    /// Every element in creation order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Normalised text of an element, empty for unknown ids.
    #[must_use]
    pub fn text_of(&self, id: ElementId) -> String {
        self.element(id).map(Element::text).unwrap_or_default()
    }

    // Mutators used while building

    /// Record a link.
    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Record an image.
    pub fn add_image(&mut self, image: Image) {
        self.images.push(image);
    }

    /// Record a finalized widget.
    pub fn add_widget(&mut self, widget: ElementId) {
        self.widgets.push(widget);
    }

    /// Record a frame.
    pub fn add_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Set the `<base href>` value.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = Some(base_url.into());
    }

    /// Set the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Install the completed forms.
    pub fn set_forms(&mut self, forms: Vec<Form>) {
        self.forms = forms;
    }

    /// Mark the outermost frameset.
    pub const fn set_frameset(&mut self, frameset: ElementId) {
        self.frameset = Some(frameset);
    }

    // Accessors

    /// The URL the page was fetched from, if known.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// The title text.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The `<base href>` value.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Links in document order.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Images in document order.
    #[must_use]
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Completed forms, in the order they were closed.
    #[must_use]
    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    /// Every finalized widget, inside a form or not.
    #[must_use]
    pub fn widgets(&self) -> &[ElementId] {
        &self.widgets
    }

    /// The outermost frameset element.
    #[must_use]
    pub const fn frameset(&self) -> Option<ElementId> {
        self.frameset
    }

    /// Whether the page is a frameset page.
    #[must_use]
    pub const fn has_frames(&self) -> bool {
        self.frameset.is_some()
    }

    /// Frames in document order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    // Lookups

    /// Links whose text matches `text` after whitespace normalisation.
    #[must_use]
    pub fn links_with_text(&self, text: &str) -> Vec<&Link> {
        let wanted = normalise_text(text);
        self.links
            .iter()
            .filter(|link| self.text_of(link.element) == wanted)
            .collect()
    }

    /// The link whose `id` attribute is `id`.
    #[must_use]
    pub fn link_by_id(&self, id: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|link| self.attribute_of(link.element, "id") == Some(id))
    }

    /// The form whose `id` attribute is `id`.
    #[must_use]
    pub fn form_by_id(&self, id: &str) -> Option<&Form> {
        self.forms.iter().find(|form| form.id() == Some(id))
    }

    /// The first widget whose label text matches `text`.
    #[must_use]
    pub fn widget_by_label(&self, text: &str) -> Option<ElementId> {
        let wanted = normalise_text(text);
        self.widgets.iter().copied().find(|&widget| {
            self.element(widget)
                .and_then(Element::label)
                .is_some_and(|label| normalise_text(label) == wanted)
        })
    }

    /// The first widget whose `name` attribute is `name`.
    #[must_use]
    pub fn widget_by_name(&self, name: &str) -> Option<ElementId> {
        self.widgets
            .iter()
            .copied()
            .find(|&widget| self.attribute_of(widget, "name") == Some(name))
    }

    /// The `option` elements collected under a `select`.
    #[must_use]
    pub fn options_of(&self, select: ElementId) -> Vec<&Element> {
        self.element(select)
            .map(|element| {
                element
                    .children()
                    .iter()
                    .filter_map(|&child| self.element(child))
                    .filter(|child| child.kind() == ElementKind::SelectOption)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The value a widget would submit by default.
    ///
    /// Inputs and buttons use their `value` attribute, a textarea its decoded
    /// content, and a select its first `selected` option (else its first
    /// option).
    #[must_use]
    pub fn widget_value(&self, widget: ElementId) -> Option<String> {
        let element = self.element(widget)?;
        match element.kind() {
            ElementKind::Input | ElementKind::Button => {
                element.attribute("value").map(str::to_string)
            }
            ElementKind::TextArea => Some(decode_entities(element.content()).into_owned()),
            ElementKind::Select => {
                let options = self.options_of(widget);
                let chosen = options
                    .iter()
                    .find(|option| option.attribute("selected").is_some())
                    .or_else(|| options.first())?;
                Some(
                    chosen
                        .attribute("value")
                        .map_or_else(|| chosen.text(), str::to_string),
                )
            }
            _ => None,
        }
    }

    fn attribute_of(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }
}
