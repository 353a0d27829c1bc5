use strum_macros::Display;
use trawl_lexer::{LexError, LexerEvent, Rejection, Tokenizer};

use crate::config::ParserConfig;

/// Lexer modes of the markup mode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HtmlMode {
    /// Document text between recognised tags (start mode).
    Text,
    /// Inside a recognised start tag.
    Tag,
    /// Inside `<style>`.
    Style,
    /// Inside `<script>`.
    Script,
    /// Inside `<!-- -->`.
    Comment,
    /// Inside a `"`-quoted attribute value.
    DoubleQuoted,
    /// Inside a `'`-quoted attribute value.
    SingleQuoted,
    /// An `=value` attribute without quotes.
    Unquoted,
    /// A recognised end tag.
    EndTag,
    /// Whitespace between attributes.
    Whitespace,
}

/// Receives the tokens of the markup mode table, one method per group of
/// modes.
pub trait MarkupTokens {
    /// Tokens of [`HtmlMode::Text`].
    ///
    /// # Errors
    ///
    /// A rejection aborts the parse.
    fn text_token(&mut self, token: &str, event: LexerEvent) -> Result<(), Rejection>;

    /// Tokens of [`HtmlMode::Tag`]: the `<name` opener, attribute names and
    /// the `>` or `/>` terminator.
    ///
    /// # Errors
    ///
    /// A rejection aborts the parse.
    fn tag_token(&mut self, token: &str, event: LexerEvent) -> Result<(), Rejection>;

    /// Tokens of the quoted value modes.
    ///
    /// # Errors
    ///
    /// A rejection aborts the parse.
    fn quoted_value_token(&mut self, token: &str, event: LexerEvent) -> Result<(), Rejection>;

    /// The single `=value` token of [`HtmlMode::Unquoted`].
    ///
    /// # Errors
    ///
    /// A rejection aborts the parse.
    fn unquoted_value_token(&mut self, token: &str, event: LexerEvent)
    -> Result<(), Rejection>;

    /// The `</name>` token of [`HtmlMode::EndTag`].
    ///
    /// # Errors
    ///
    /// A rejection aborts the parse.
    fn end_tag_token(&mut self, token: &str, event: LexerEvent) -> Result<(), Rejection>;

    /// Tokens of the skipped regions and inter-attribute whitespace.
    ///
    /// # Errors
    ///
    /// The default accepts everything.
    fn skipped_token(&mut self, _token: &str, _event: LexerEvent) -> Result<(), Rejection> {
        Ok(())
    }
}

/// Regions whose content never reaches the text handler.
const SKIPPED: [(&str, &str, HtmlMode); 3] = [
    ("<style", "</style>", HtmlMode::Style),
    ("<script", "</script>", HtmlMode::Script),
    ("<!--", "-->", HtmlMode::Comment),
];

/// The markup mode table on top of a [`Tokenizer`].
///
/// Changing the interest set rebuilds the whole table, so rule order always
/// follows tag order.
pub struct HtmlLexer<L> {
    tokenizer: Tokenizer<HtmlMode, L>,
    tags: Vec<String>,
    case_sensitive: bool,
}

impl<L: MarkupTokens> HtmlLexer<L> {
    /// Build the mode table for `config`.
    #[must_use]
    pub fn new(config: &ParserConfig) -> Self {
        let mut lexer = Self {
            tokenizer: Tokenizer::new(HtmlMode::Text, L::text_token, config.case_sensitive),
            tags: Vec::new(),
            case_sensitive: config.case_sensitive,
        };
        lexer.set_tags(config.tags.iter().map(String::as_str));
        lexer
    }

    /// The interest set, in matching order.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether tag names match with exact case.
    #[must_use]
    pub const fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Recognise one more tag. Names already present are ignored.
    pub fn add_tag(&mut self, tag: &str) {
        if self.push_tag(tag) {
            self.rebuild();
        }
    }

    /// Replace the interest set.
    pub fn set_tags<'t>(&mut self, tags: impl IntoIterator<Item = &'t str>) {
        self.tags.clear();
        for tag in tags {
            let _ = self.push_tag(tag);
        }
        self.rebuild();
    }

    /// Stop recognising any tag. Skipped regions still apply.
    pub fn clear_tags(&mut self) {
        self.tags.clear();
        self.rebuild();
    }

    /// Tokenize `raw` into `sink`.
    ///
    /// # Errors
    ///
    /// Propagates tokenizer failures, including rejections raised by `sink`.
    pub fn parse(&mut self, raw: &str, sink: &mut L) -> Result<(), LexError> {
        self.tokenizer.parse(raw, sink)
    }

    fn push_tag(&mut self, tag: &str) -> bool {
        let tag = if self.case_sensitive {
            tag.trim().to_string()
        } else {
            tag.trim().to_ascii_lowercase()
        };
        if tag.is_empty() || self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    fn rebuild(&mut self) {
        let mut tokenizer = Tokenizer::new(HtmlMode::Text, L::text_token, self.case_sensitive);
        for (open, close, mode) in SKIPPED {
            tokenizer.add_entry_pattern(open, HtmlMode::Text, mode);
            tokenizer.add_exit_pattern(close, mode);
            tokenizer.map_handler(mode, L::skipped_token);
        }
        for tag in &self.tags {
            let name = regex::escape(tag);
            tokenizer.add_special_pattern(format!(r"</{name}\s*>"), HtmlMode::Text, HtmlMode::EndTag);
            tokenizer.add_entry_pattern(format!(r"<{name}\b"), HtmlMode::Text, HtmlMode::Tag);
        }
        tokenizer.map_handler(HtmlMode::EndTag, L::end_tag_token);

        tokenizer.add_special_pattern(r"\s+", HtmlMode::Tag, HtmlMode::Whitespace);
        tokenizer.add_entry_pattern(r#"=\s*""#, HtmlMode::Tag, HtmlMode::DoubleQuoted);
        tokenizer.add_entry_pattern(r"=\s*'", HtmlMode::Tag, HtmlMode::SingleQuoted);
        tokenizer.add_special_pattern(r"=\s*[^>\s]*", HtmlMode::Tag, HtmlMode::Unquoted);
        tokenizer.add_exit_pattern("/>", HtmlMode::Tag);
        tokenizer.add_exit_pattern(">", HtmlMode::Tag);
        tokenizer.map_handler(HtmlMode::Tag, L::tag_token);
        tokenizer.map_handler(HtmlMode::Whitespace, L::skipped_token);

        tokenizer.add_pattern(r#"\\""#, HtmlMode::DoubleQuoted);
        tokenizer.add_exit_pattern("\"", HtmlMode::DoubleQuoted);
        tokenizer.add_pattern(r"\\'", HtmlMode::SingleQuoted);
        tokenizer.add_exit_pattern("'", HtmlMode::SingleQuoted);
        tokenizer.map_handler(HtmlMode::DoubleQuoted, L::quoted_value_token);
        tokenizer.map_handler(HtmlMode::SingleQuoted, L::quoted_value_token);
        tokenizer.map_handler(HtmlMode::Unquoted, L::unquoted_value_token);

        tracing::debug!(tags = self.tags.len(), rules = tokenizer.rule_count(), "rebuilt markup lexer");
        self.tokenizer = tokenizer;
    }
}
