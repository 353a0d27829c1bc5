use std::mem;

use trawl_common::decode_entities;
use trawl_lexer::{LexError, LexerEvent, Rejection};
use trawl_page::AttributesMap;

use crate::config::ParserConfig;
use crate::lexer::{HtmlLexer, MarkupTokens};

/// Receiver of the semantic events of a markup document.
pub trait SaxListener {
    /// A recognised start tag, with its name (lower-cased unless the parser
    /// is case sensitive) and decoded attributes.
    ///
    /// # Errors
    ///
    /// A rejection aborts the parse.
    fn start_element(&mut self, name: &str, attributes: AttributesMap) -> Result<(), Rejection>;

    /// A recognised end tag, named as in [`SaxListener::start_element`].
    ///
    /// # Errors
    ///
    /// A rejection aborts the parse.
    fn end_element(&mut self, name: &str) -> Result<(), Rejection>;

    /// Raw text between recognised tags. Character references are left
    /// intact.
    ///
    /// # Errors
    ///
    /// A rejection aborts the parse.
    fn add_content(&mut self, text: &str) -> Result<(), Rejection>;
}

/// Turns markup tokens into [`SaxListener`] calls.
///
/// Holds the start tag being read: its name, the attributes seen so far and
/// the attribute whose value is being read.
#[derive(Debug)]
pub struct SaxTranslator<L> {
    listener: L,
    tag: String,
    attributes: AttributesMap,
    current_attribute: Option<String>,
    case_sensitive: bool,
}

impl<L: SaxListener> SaxTranslator<L> {
    /// Wrap `listener`.
    #[must_use]
    pub const fn new(listener: L) -> Self {
        Self {
            listener,
            tag: String::new(),
            attributes: AttributesMap::new(),
            current_attribute: None,
            case_sensitive: false,
        }
    }

    /// Keep element names as written instead of lower-casing them.
    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// The wrapped listener.
    #[must_use]
    pub const fn listener(&self) -> &L {
        &self.listener
    }

    /// The wrapped listener, mutably.
    pub const fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Unwrap the listener.
    #[must_use]
    pub fn into_listener(self) -> L {
        self.listener
    }

    /// Forget any half-read start tag.
    pub fn reset(&mut self) {
        self.tag.clear();
        self.attributes.clear();
        self.current_attribute = None;
    }

    fn element_name(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        }
    }

    fn append_value(&mut self, text: &str) {
        let Some(name) = &self.current_attribute else {
            return;
        };
        if let Some(value) = self.attributes.get_mut(name) {
            value.push_str(&decode_entities(text));
        }
    }
}

impl<L: SaxListener> MarkupTokens for SaxTranslator<L> {
    fn text_token(&mut self, token: &str, event: LexerEvent) -> Result<(), Rejection> {
        if event == LexerEvent::Unmatched {
            self.listener.add_content(token)
        } else {
            Ok(())
        }
    }

    fn tag_token(&mut self, token: &str, event: LexerEvent) -> Result<(), Rejection> {
        match event {
            LexerEvent::Enter => {
                self.reset();
                self.tag = self.element_name(token.trim_start_matches('<'));
                Ok(())
            }
            LexerEvent::Exit => {
                let name = mem::take(&mut self.tag);
                let attributes = mem::take(&mut self.attributes);
                self.current_attribute = None;
                self.listener.start_element(&name, attributes)
            }
            LexerEvent::Unmatched | LexerEvent::Matched if token != "=" => {
                let name = decode_entities(token).to_ascii_lowercase();
                let _ = self.attributes.insert(name.clone(), String::new());
                self.current_attribute = Some(name);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn quoted_value_token(&mut self, token: &str, event: LexerEvent) -> Result<(), Rejection> {
        // Escaped quotes arrive as `Matched` and are dropped.
        if event == LexerEvent::Unmatched {
            self.append_value(token);
        }
        Ok(())
    }

    fn unquoted_value_token(&mut self, token: &str, _event: LexerEvent) -> Result<(), Rejection> {
        let value = token.strip_prefix('=').unwrap_or(token).trim_start();
        self.append_value(value);
        Ok(())
    }

    fn end_tag_token(&mut self, token: &str, _event: LexerEvent) -> Result<(), Rejection> {
        let name = self.element_name(
            token
                .strip_prefix("</")
                .and_then(|rest| rest.strip_suffix('>'))
                .unwrap_or(token)
                .trim(),
        );
        if name.is_empty() {
            return Err(Rejection::new(format!("end tag '{token}' has no name")));
        }
        self.listener.end_element(&name)
    }
}

/// Drives a [`SaxListener`] from the markup mode table.
pub struct SaxParser<L> {
    lexer: HtmlLexer<SaxTranslator<L>>,
    translator: SaxTranslator<L>,
}

impl<L: SaxListener> SaxParser<L> {
    /// Parser with the default configuration.
    #[must_use]
    pub fn new(listener: L) -> Self {
        Self::with_config(listener, &ParserConfig::default())
    }

    /// Parser with an explicit configuration.
    #[must_use]
    pub fn with_config(listener: L, config: &ParserConfig) -> Self {
        Self {
            lexer: HtmlLexer::new(config),
            translator: SaxTranslator::new(listener).with_case_sensitive(config.case_sensitive),
        }
    }

    /// Recognise one more tag.
    pub fn add_tag(&mut self, tag: &str) {
        self.lexer.add_tag(tag);
    }

    /// Replace the interest set.
    pub fn set_tags<'t>(&mut self, tags: impl IntoIterator<Item = &'t str>) {
        self.lexer.set_tags(tags);
    }

    /// Stop recognising any tag.
    pub fn clear_tags(&mut self) {
        self.lexer.clear_tags();
    }

    /// The interest set.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.lexer.tags()
    }

    /// Parse `raw`, feeding the listener.
    ///
    /// # Errors
    ///
    /// Propagates tokenizer failures and listener rejections. The listener
    /// keeps whatever it received before the failure.
    pub fn parse(&mut self, raw: &str) -> Result<(), LexError> {
        self.translator.reset();
        self.lexer.parse(raw, &mut self.translator)
    }

    /// The listener.
    #[must_use]
    pub const fn listener(&self) -> &L {
        self.translator.listener()
    }

    /// The listener, mutably.
    pub const fn listener_mut(&mut self) -> &mut L {
        self.translator.listener_mut()
    }

    /// Unwrap the listener.
    #[must_use]
    pub fn into_listener(self) -> L {
        self.translator.into_listener()
    }
}
