//! Page building from SAX events.
//!
//! The builder keeps every element it creates in the page's arena and tracks
//! the open ones by name. Text goes to every open element at once, except
//! while an exclusive element such as `<title>` is open, which then receives
//! it alone. Closing an element finalizes it: links, images, the base URL and
//! the title are recorded on the page and widgets are attached to every form
//! still open.
//!
//! Labels resolve in one of two ways. A widget finalized between `<label>`
//! and `</label>` takes the label's text directly; otherwise the label is
//! kept and matched against the forms by its `for` attribute at the end of
//! the document.

use std::collections::HashMap;
use std::mem;

use trawl_common::warn_once;
use trawl_lexer::{LexError, Rejection};
use trawl_page::{
    AttributesMap, Element, ElementId, ElementKind, Form, Frame, Image, Link, Page,
};

use crate::config::ParserConfig;
use crate::sax::{SaxListener, SaxParser};

/// A label that closed with no widget inside it.
#[derive(Debug, Clone)]
struct PendingLabel {
    text: String,
    target: Option<String>,
}

/// Builds a [`Page`] from [`SaxListener`] events.
#[derive(Debug)]
pub struct PageBuilder {
    page: Page,
    open: HashMap<String, Vec<ElementId>>,
    exclusive: Option<ElementId>,
    open_forms: Vec<Form>,
    complete_forms: Vec<Form>,
    label: Option<ElementId>,
    last_widget: Option<ElementId>,
    pending_labels: Vec<PendingLabel>,
    frameset: Option<ElementId>,
    frameset_depth: usize,
    frames: Vec<Frame>,
}

impl PageBuilder {
    /// A builder for a page fetched from `url`.
    #[must_use]
    pub fn new(url: Option<String>) -> Self {
        Self {
            page: Page::new(url),
            open: HashMap::new(),
            exclusive: None,
            open_forms: Vec::new(),
            complete_forms: Vec::new(),
            label: None,
            last_widget: None,
            pending_labels: Vec::new(),
            frameset: None,
            frameset_depth: 0,
            frames: Vec::new(),
        }
    }

    /// Parse `raw` with the default configuration.
    ///
    /// # Errors
    ///
    /// Fails on structural tokenizer failures; no partial page is returned.
    pub fn parse(raw: &str) -> Result<Page, LexError> {
        Self::parse_with_config(raw, &ParserConfig::default())
    }

    /// Parse `raw` with `config`.
    ///
    /// # Errors
    ///
    /// Fails on structural tokenizer failures; no partial page is returned.
    pub fn parse_with_config(raw: &str, config: &ParserConfig) -> Result<Page, LexError> {
        Self::parse_at(raw, None, config)
    }

    /// Parse `raw`, fetched from `url`, with `config`.
    ///
    /// # Errors
    ///
    /// Fails on structural tokenizer failures; no partial page is returned.
    pub fn parse_at(raw: &str, url: Option<&str>, config: &ParserConfig) -> Result<Page, LexError> {
        tracing::debug!(bytes = raw.len(), url, "parsing page");
        let mut parser = SaxParser::with_config(Self::new(url.map(str::to_string)), config);
        parser.parse(raw)?;
        let page = parser.into_listener().finish();
        tracing::debug!(
            links = page.links().len(),
            forms = page.forms().len(),
            frames = page.frames().len(),
            "page built"
        );
        Ok(page)
    }

    /// Close whatever is still open and hand over the page.
    #[must_use]
    pub fn finish(mut self) -> Page {
        while let Some(form) = self.open_forms.pop() {
            self.complete_forms.push(form);
        }
        for label in mem::take(&mut self.pending_labels) {
            self.resolve_pending(&label);
        }
        self.page.set_forms(mem::take(&mut self.complete_forms));
        if let Some(frameset) = self.frameset {
            self.page.set_frameset(frameset);
        }
        for frame in mem::take(&mut self.frames) {
            self.page.add_frame(frame);
        }
        self.page
    }

    fn open_element(&mut self, name: &str, id: ElementId) {
        self.open.entry(name.to_string()).or_default().push(id);
    }

    fn open_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.open.values().flatten().copied()
    }

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.page.element(id)
    }

    fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        self.element(id)
            .and_then(|element| element.attribute(name))
            .map(str::to_string)
    }

    fn is_loading_frames(&self) -> bool {
        self.frameset.is_some() && self.frameset_depth > 0
    }

    fn start_frameset(&mut self, id: ElementId) {
        if !self.is_loading_frames() {
            self.frameset = Some(id);
        }
        self.frameset_depth += 1;
    }

    fn end_frameset(&mut self) {
        if self.is_loading_frames() {
            self.frameset_depth -= 1;
        }
    }

    fn accept_frame(&mut self, id: ElementId) {
        if !self.is_loading_frames() {
            return;
        }
        match self.attribute(id, "src") {
            Some(src) if !src.is_empty() => self.frames.push(Frame { element: id, src }),
            _ => {}
        }
    }

    fn start_label(&mut self, id: ElementId) {
        self.label = Some(id);
        self.last_widget = None;
        self.open_element("label", id);
    }

    fn end_label(&mut self) {
        if let Some(open) = self.open.get_mut("label") {
            let _ = open.pop();
        }
        let Some(label) = self.label.take() else {
            return;
        };
        let text = self.page.text_of(label);
        if let Some(widget) = self.last_widget.take() {
            if let Some(element) = self.page.element_mut(widget) {
                element.set_label(text);
            }
        } else {
            self.pending_labels.push(PendingLabel {
                text,
                target: self.attribute(label, "for"),
            });
        }
    }

    fn end_form(&mut self) {
        if let Some(form) = self.open_forms.pop() {
            self.complete_forms.push(form);
        }
    }

    /// Record a complete element on the page.
    fn finalize(&mut self, id: ElementId) {
        let Some(element) = self.element(id) else {
            return;
        };
        match element.kind() {
            ElementKind::Anchor => {
                let href = element.attribute("href").unwrap_or_default().to_string();
                self.page.add_link(Link { element: id, href });
            }
            ElementKind::Image => {
                let src = element.attribute("src").unwrap_or_default().to_string();
                self.page.add_image(Image { element: id, src });
            }
            ElementKind::Base => {
                if let Some(href) = element.attribute("href") {
                    let href = href.to_string();
                    self.page.set_base_url(href);
                }
            }
            ElementKind::Title => {
                let title = element.text();
                self.page.set_title(title);
            }
            kind if kind.is_widget() => {
                for form in &mut self.open_forms {
                    form.add_widget(id);
                }
                self.page.add_widget(id);
                self.last_widget = Some(id);
            }
            _ => {}
        }
    }

    /// Attach an option to every element still open.
    fn distribute_option(&mut self, option: ElementId) {
        let parents: Vec<ElementId> = self.open_ids().collect();
        for parent in parents {
            if let Some(element) = self.page.element_mut(parent) {
                element.add_child(option);
            }
        }
    }

    fn resolve_pending(&mut self, label: &PendingLabel) {
        let Some(target) = label.target.as_deref() else {
            tracing::debug!(text = %label.text, "label without target left unattached");
            return;
        };
        let widget = self
            .find_widget(|element| element.id() == Some(target))
            .or_else(|| self.find_widget(|element| element.attribute("name") == Some(target)));
        match widget.and_then(|id| self.page.element_mut(id)) {
            Some(element) => element.set_label(label.text.clone()),
            None => warn_once("page", &format!("label for '{target}' matched no widget")),
        }
    }

    /// First widget matching `predicate`, searching completed forms in order
    /// and then widgets outside every form.
    fn find_widget(&self, predicate: impl Fn(&Element) -> bool) -> Option<ElementId> {
        let in_forms = self
            .complete_forms
            .iter()
            .flat_map(|form| form.widgets().iter().copied());
        let outside = self.page.widgets().iter().copied().filter(|id| {
            !self
                .complete_forms
                .iter()
                .any(|form| form.widgets().contains(id))
        });
        in_forms
            .chain(outside)
            .find(|&id| self.element(id).is_some_and(&predicate))
    }
}

impl SaxListener for PageBuilder {
    fn start_element(&mut self, name: &str, attributes: AttributesMap) -> Result<(), Rejection> {
        let id = self.page.add_element(Element::new(name, attributes));
        let kind = ElementKind::from_name(name);
        match kind {
            ElementKind::Label => self.start_label(id),
            ElementKind::Form => {
                if let Some(element) = self.element(id) {
                    let form = Form::new(id, element);
                    self.open_forms.push(form);
                }
            }
            ElementKind::Frameset => self.start_frameset(id),
            ElementKind::Frame => self.accept_frame(id),
            _ => {
                if kind.is_exclusive() && self.exclusive.is_none() {
                    self.exclusive = Some(id);
                }
                if kind.expects_closing_tag() {
                    self.open_element(name, id);
                } else {
                    self.finalize(id);
                }
            }
        }
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), Rejection> {
        match ElementKind::from_name(name) {
            ElementKind::Label => self.end_label(),
            ElementKind::Form => self.end_form(),
            ElementKind::Frameset => self.end_frameset(),
            kind => {
                let Some(id) = self.open.get_mut(name).and_then(Vec::pop) else {
                    tracing::trace!(name, "end tag with nothing open ignored");
                    return Ok(());
                };
                if self.exclusive == Some(id) {
                    self.exclusive = None;
                }
                if kind == ElementKind::SelectOption {
                    self.distribute_option(id);
                }
                self.finalize(id);
            }
        }
        Ok(())
    }

    fn add_content(&mut self, text: &str) -> Result<(), Rejection> {
        let targets: Vec<ElementId> = match self.exclusive {
            Some(id) => vec![id],
            None => self.open_ids().collect(),
        };
        for id in targets {
            if let Some(element) = self.page.element_mut(id) {
                element.add_content(text);
            }
        }
        Ok(())
    }
}
