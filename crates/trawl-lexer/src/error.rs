use thiserror::Error;

use crate::tokenizer::LexerEvent;

/// A handler's refusal of a token. Aborts the parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Rejection {
    reason: String,
}

impl Rejection {
    /// Reject with a human-readable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Why the token was refused.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Errors that stop a tokenizer run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// The input is non-empty but no mode has a single rule.
    #[error("no patterns are configured in any mode")]
    NoRules,

    /// A rule did not compile into the mode's compound expression.
    #[error("invalid pattern in mode '{mode}'")]
    InvalidPattern {
        /// Mode whose pattern set failed to compile.
        mode: String,
        /// Compiler diagnostic.
        source: regex::Error,
    },

    /// A token arrived in a mode that has no handler.
    #[error("mode '{mode}' has no handler")]
    UnmappedMode {
        /// The unmapped mode.
        mode: String,
    },

    /// A rule matched the empty string at the start of the remaining input.
    #[error("zero-width match in mode '{mode}' at byte {offset}")]
    NoProgress {
        /// Mode that was active.
        mode: String,
        /// Byte offset into the input.
        offset: usize,
    },

    /// An exit rule fired while only the start mode was on the stack.
    #[error("exit from start mode '{mode}' at byte {offset}")]
    UnbalancedExit {
        /// The start mode.
        mode: String,
        /// Byte offset of the exit token.
        offset: usize,
    },

    /// A handler rejected a token.
    #[error("{event} token rejected in mode '{mode}' at byte {offset}")]
    Rejected {
        /// Mode whose handler refused the token.
        mode: String,
        /// Kind of token that was refused.
        event: LexerEvent,
        /// Byte offset of the token.
        offset: usize,
        /// The handler's reason.
        source: Rejection,
    },
}
