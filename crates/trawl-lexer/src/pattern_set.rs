use std::cell::OnceCell;

use regex::{Regex, RegexBuilder};

/// A successful match of a [`PatternSet`] against some subject text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'s, L> {
    /// Byte offset of the match within the subject.
    pub start: usize,
    /// The matched text.
    pub text: &'s str,
    /// Label of the rule that produced the match.
    pub label: L,
}

#[derive(Debug, Clone)]
struct Rule<L> {
    pattern: String,
    label: L,
}

/// An ordered list of regular expressions matched as one alternation.
///
/// The set finds the leftmost match across all rules. When several rules match
/// at that same offset the rule added first wins, which is ordered-alternation
/// semantics rather than longest-match. Each rule is wrapped in its own capture
/// group to identify it, so `(` and `)` inside a rule lose their grouping
/// meaning and are matched literally.
///
/// The compiled expression is cached until the next rule is added.
#[derive(Debug, Clone)]
pub struct PatternSet<L> {
    rules: Vec<Rule<L>>,
    case_sensitive: bool,
    compiled: OnceCell<Regex>,
}

impl<L: Clone> PatternSet<L> {
    /// Create an empty set.
    #[must_use]
    pub const fn new(case_sensitive: bool) -> Self {
        Self {
            rules: Vec::new(),
            case_sensitive,
            compiled: OnceCell::new(),
        }
    }

    /// Append a rule that reports `label` when it matches.
    pub fn add_rule(&mut self, pattern: impl Into<String>, label: L) {
        self.rules.push(Rule {
            pattern: pattern.into(),
            label,
        });
        self.compiled = OnceCell::new();
    }

    /// Append a rule carrying the default label.
    pub fn add_pattern(&mut self, pattern: impl Into<String>)
    where
        L: Default,
    {
        self.add_rule(pattern, L::default());
    }

    /// Number of rules in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rule has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether matching distinguishes letter case.
    #[must_use]
    pub const fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Find the leftmost match of any rule in `subject`.
    ///
    /// An empty set never matches.
    ///
    /// # Errors
    ///
    /// Returns the compilation error if the compounded expression is invalid.
    pub fn find<'s>(&self, subject: &'s str) -> Result<Option<PatternMatch<'s, L>>, regex::Error> {
        if self.rules.is_empty() {
            return Ok(None);
        }
        let Some(captures) = self.compiled()?.captures(subject) else {
            return Ok(None);
        };
        let Some(whole) = captures.get(0) else {
            return Ok(None);
        };
        let Some(group) = (1..captures.len()).find(|&i| captures.get(i).is_some()) else {
            return Ok(None);
        };
        Ok(Some(PatternMatch {
            start: whole.start(),
            text: whole.as_str(),
            label: self.rules[group - 1].label.clone(),
        }))
    }

    fn compiled(&self) -> Result<&Regex, regex::Error> {
        if let Some(regex) = self.compiled.get() {
            return Ok(regex);
        }
        let regex = RegexBuilder::new(&self.compound())
            .case_insensitive(!self.case_sensitive)
            .multi_line(true)
            .dot_matches_new_line(true)
            .build()?;
        Ok(self.compiled.get_or_init(|| regex))
    }

    fn compound(&self) -> String {
        self.rules
            .iter()
            .map(|rule| format!("({})", escape_groups(&rule.pattern)))
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Escape every unescaped `(` and `)` so the only groups left in the compound
/// expression are the per-rule ones.
fn escape_groups(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len() + 4);
    let mut after_backslash = false;
    for c in pattern.chars() {
        if !after_backslash && matches!(c, '(' | ')') {
            escaped.push('\\');
        }
        after_backslash = !after_backslash && c == '\\';
        escaped.push(c);
    }
    escaped
}
