use serde::{Deserialize, Serialize};

/// Tags the page builder gives meaning to, in matching order.
pub const DEFAULT_TAGS: [&str; 13] = [
    "a", "base", "title", "form", "input", "button", "textarea", "select", "option", "frameset",
    "frame", "label", "img",
];

/// Settings for one parse.
///
/// Deserializes from JSON such as `{"tags": ["a", "img"], "case_sensitive": false}`;
/// omitted fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Tag names to recognise. Other markup is treated as text.
    pub tags: Vec<String>,
    /// Match tag names with exact case.
    pub case_sensitive: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            tags: DEFAULT_TAGS.iter().map(ToString::to_string).collect(),
            case_sensitive: false,
        }
    }
}

impl ParserConfig {
    /// Replace the interest set.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set case sensitivity.
    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}
