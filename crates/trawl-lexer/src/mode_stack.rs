/// The stack of active lexer modes.
///
/// The start mode sits at the bottom and can never be popped, so there is
/// always a current mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStack<M> {
    start: M,
    nested: Vec<M>,
}

impl<M> ModeStack<M> {
    /// Create a stack holding only `start`.
    #[must_use]
    pub const fn new(start: M) -> Self {
        Self {
            start,
            nested: Vec::new(),
        }
    }

    /// The innermost mode.
    #[must_use]
    pub fn current(&self) -> &M {
        self.nested.last().unwrap_or(&self.start)
    }

    /// Push `mode`, making it current.
    pub fn enter(&mut self, mode: M) {
        self.nested.push(mode);
    }

    /// Pop the current mode.
    ///
    /// Returns false, and leaves the stack untouched, when only the start
    /// mode remains.
    pub fn leave(&mut self) -> bool {
        self.nested.pop().is_some()
    }

    /// Number of modes on the stack, counting the start mode.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nested.len() + 1
    }

    /// Drop everything above the start mode.
    pub fn reset(&mut self) {
        self.nested.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_leave() {
        let mut stack = ModeStack::new("text");
        stack.enter("tag");
        stack.enter("dq");
        assert_eq!(stack.depth(), 3);
        assert_eq!(*stack.current(), "dq");
        assert!(stack.leave());
        assert_eq!(*stack.current(), "tag");
    }

    #[test]
    fn test_start_mode_cannot_be_left() {
        let mut stack = ModeStack::new("text");
        assert!(!stack.leave());
        assert_eq!(stack.depth(), 1);
        assert_eq!(*stack.current(), "text");
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut stack = ModeStack::new(0);
        stack.enter(1);
        stack.enter(2);
        stack.reset();
        assert_eq!(stack.depth(), 1);
        assert_eq!(*stack.current(), 0);
    }
}
