//! Each mode owns a [`PatternSet`] whose labels are [`Transition`]s. On every
//! step the current mode's set is searched; text in front of the match is
//! dispatched as [`LexerEvent::Unmatched`] and the match itself as the event
//! implied by its transition. Tokens go to the handler mapped to the mode that
//! is current *after* any entry (for `Enter` and `Special`) and *before* any
//! exit (for `Exit`).

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use strum_macros::Display;

use crate::error::{LexError, Rejection};
use crate::mode_stack::ModeStack;
use crate::pattern_set::PatternSet;

/// What a dispatched token represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LexerEvent {
    /// Text between matches, or the tail of the input.
    Unmatched,
    /// A match of a plain rule.
    Matched,
    /// A match that pushed a new mode.
    Enter,
    /// A match that popped the current mode.
    Exit,
    /// A match handled in a one-shot mode that is popped straight away.
    Special,
}

/// The stack operation attached to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Transition<M> {
    /// Stay in the current mode.
    #[default]
    Continue,
    /// Push the given mode.
    Enter(M),
    /// Pop the current mode.
    Exit,
    /// Push the given mode for this token only.
    Special(M),
}

/// Receives the tokens of one mode.
pub type Handler<L> = fn(&mut L, &str, LexerEvent) -> Result<(), Rejection>;

/// A mode-stack tokenizer dispatching into a listener of type `L`.
pub struct Tokenizer<M, L> {
    patterns: HashMap<M, PatternSet<Transition<M>>>,
    handlers: HashMap<M, Handler<L>>,
    modes: ModeStack<M>,
    case_sensitive: bool,
}

impl<M, L> Tokenizer<M, L>
where
    M: Clone + Eq + Hash + fmt::Display,
{
    /// Create a tokenizer starting in `start`, whose tokens go to `handler`.
    #[must_use]
    pub fn new(start: M, handler: Handler<L>, case_sensitive: bool) -> Self {
        let handlers = HashMap::from([(start.clone(), handler)]);
        Self {
            patterns: HashMap::new(),
            handlers,
            modes: ModeStack::new(start),
            case_sensitive,
        }
    }

    fn patterns_for(&mut self, mode: M) -> &mut PatternSet<Transition<M>> {
        let case_sensitive = self.case_sensitive;
        self.patterns
            .entry(mode)
            .or_insert_with(|| PatternSet::new(case_sensitive))
    }

    /// Add a rule to `mode` that leaves the stack alone.
    pub fn add_pattern(&mut self, pattern: impl Into<String>, mode: M) {
        self.patterns_for(mode).add_pattern(pattern);
    }

    /// Add a rule to `mode` that pushes `new_mode`.
    pub fn add_entry_pattern(&mut self, pattern: impl Into<String>, mode: M, new_mode: M) {
        self.patterns_for(mode)
            .add_rule(pattern, Transition::Enter(new_mode));
    }

    /// Add a rule to `mode` that pops it.
    pub fn add_exit_pattern(&mut self, pattern: impl Into<String>, mode: M) {
        self.patterns_for(mode).add_rule(pattern, Transition::Exit);
    }

    /// Add a rule to `mode` whose match is handled in `special` alone.
    pub fn add_special_pattern(&mut self, pattern: impl Into<String>, mode: M, special: M) {
        self.patterns_for(mode)
            .add_rule(pattern, Transition::Special(special));
    }

    /// Route tokens produced while `mode` is current to `handler`.
    pub fn map_handler(&mut self, mode: M, handler: Handler<L>) {
        let _ = self.handlers.insert(mode, handler);
    }

    /// Total number of rules across all modes.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.patterns.values().map(PatternSet::len).sum()
    }

    /// The innermost mode (the start mode between runs).
    #[must_use]
    pub fn current_mode(&self) -> &M {
        self.modes.current()
    }

    /// Tokenize `raw`, dispatching every token to `listener`.
    ///
    /// The mode stack is reset to the start mode first, so a tokenizer can be
    /// reused. Dispatched tokens are never empty and, concatenated in order,
    /// reproduce `raw` exactly when the run succeeds.
    ///
    /// # Errors
    ///
    /// See [`LexError`]. The first error stops the run; tokens dispatched
    /// before it are not rolled back.
    pub fn parse(&mut self, raw: &str, listener: &mut L) -> Result<(), LexError> {
        self.modes.reset();
        if raw.is_empty() {
            return Ok(());
        }
        if self.rule_count() == 0 {
            return Err(LexError::NoRules);
        }
        tracing::debug!(bytes = raw.len(), rules = self.rule_count(), "tokenizing");

        let mut rest = raw;
        while !rest.is_empty() {
            let offset = raw.len() - rest.len();
            let mode = self.modes.current();
            let found = match self.patterns.get(mode) {
                Some(set) => set.find(rest).map_err(|source| LexError::InvalidPattern {
                    mode: mode.to_string(),
                    source,
                })?,
                None => None,
            };
            let Some(found) = found else {
                return self.invoke(listener, rest, LexerEvent::Unmatched, offset);
            };

            let consumed = found.start + found.text.len();
            if consumed == 0 {
                return Err(LexError::NoProgress {
                    mode: mode.to_string(),
                    offset,
                });
            }
            self.invoke(listener, &rest[..found.start], LexerEvent::Unmatched, offset)?;
            self.dispatch(listener, found.text, found.label, offset + found.start)?;
            rest = &rest[consumed..];
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        listener: &mut L,
        token: &str,
        transition: Transition<M>,
        offset: usize,
    ) -> Result<(), LexError> {
        match transition {
            Transition::Continue => self.invoke(listener, token, LexerEvent::Matched, offset),
            Transition::Enter(mode) => {
                self.modes.enter(mode);
                self.invoke(listener, token, LexerEvent::Enter, offset)
            }
            Transition::Exit => {
                self.invoke(listener, token, LexerEvent::Exit, offset)?;
                if self.modes.leave() {
                    Ok(())
                } else {
                    Err(LexError::UnbalancedExit {
                        mode: self.modes.current().to_string(),
                        offset,
                    })
                }
            }
            Transition::Special(mode) => {
                self.modes.enter(mode);
                let result = self.invoke(listener, token, LexerEvent::Special, offset);
                let _ = self.modes.leave();
                result
            }
        }
    }

    fn invoke(
        &self,
        listener: &mut L,
        token: &str,
        event: LexerEvent,
        offset: usize,
    ) -> Result<(), LexError> {
        if token.is_empty() {
            return Ok(());
        }
        let mode = self.modes.current();
        let Some(handler) = self.handlers.get(mode) else {
            return Err(LexError::UnmappedMode {
                mode: mode.to_string(),
            });
        };
        tracing::trace!(%mode, %event, offset, token, "dispatch");
        handler(listener, token, event).map_err(|source| LexError::Rejected {
            mode: mode.to_string(),
            event,
            offset,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sink(Vec<(LexerEvent, String)>);

    fn record(sink: &mut Sink, token: &str, event: LexerEvent) -> Result<(), Rejection> {
        sink.0.push((event, token.to_string()));
        Ok(())
    }

    #[test]
    fn test_mode_stack_is_reset_between_runs() {
        let mut tokenizer = Tokenizer::new("text", record as Handler<Sink>, true);
        tokenizer.add_entry_pattern("<", "text", "tag");
        tokenizer.map_handler("tag", record);
        let mut sink = Sink::default();
        tokenizer.parse("a<b", &mut sink).unwrap();
        assert_eq!(*tokenizer.current_mode(), "tag");
        tokenizer.parse("", &mut sink).unwrap();
        assert_eq!(*tokenizer.current_mode(), "text");
    }

    #[test]
    fn test_special_mode_is_popped() {
        let mut tokenizer = Tokenizer::new("text", record as Handler<Sink>, true);
        tokenizer.add_special_pattern("!", "text", "bang");
        tokenizer.map_handler("bang", record);
        let mut sink = Sink::default();
        tokenizer.parse("a!b", &mut sink).unwrap();
        assert_eq!(*tokenizer.current_mode(), "text");
        assert_eq!(
            sink.0,
            vec![
                (LexerEvent::Unmatched, "a".to_string()),
                (LexerEvent::Special, "!".to_string()),
                (LexerEvent::Unmatched, "b".to_string()),
            ]
        );
    }
}
