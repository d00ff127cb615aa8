//! Parse action trace used for diagnostics

/// The grammar element a parse action refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Major,
    Minor,
    Patch,
    /// The `.` between major and minor
    MajorDot,
    /// The `.` between minor and patch
    MinorDot,
    /// A numeric identifier written with leading zeros
    LeadingZero,
    /// A numeric component that does not fit in 64 bits
    NumberTooLarge,
    PrereleaseId,
    BuildId,
    /// A complete version
    Version,
    /// End of the input, or of a range component list
    EndOfInput,
    /// `*`, `M.*` or `M.m.*`
    Star,
    /// `z` or `Z`
    Empty,
    /// `^`
    Caret,
    /// The ` - ` of a hyphen range
    HyphenRange,
    /// A comparison operator such as `>=`
    Operator,
    /// `~` written without a relational operator
    PrereleaseModifier,
    /// Two bounds facing the same way
    ClosingBound,
    /// An exact version combined with another bound
    ExactBound,
    /// Two bounds that enclose no version
    RangeOrder,
    /// `||`
    OrSeparator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionStatus {
    Found,
    Expected,
}

/// One entry of the parse trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseAction {
    pub kind: ActionKind,
    pub status: ActionStatus,
    /// Byte offset into the parsed text
    pub offset: usize,
    /// Length in bytes of the text the action covers
    pub length: usize,
}

impl ParseAction {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn is_expected(&self) -> bool {
        self.status == ActionStatus::Expected
    }
}

/// Collector for parse actions
///
/// A silent context records nothing and never allocates.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    actions: Option<Vec<ParseAction>>,
}

impl ParseContext {
    /// A context that discards every action
    pub fn silent() -> Self {
        ParseContext { actions: None }
    }

    /// A context that keeps every action
    pub fn collecting() -> Self {
        ParseContext {
            actions: Some(Vec::new()),
        }
    }

    pub fn is_collecting(&self) -> bool {
        self.actions.is_some()
    }

    /// All recorded actions in the order they happened
    pub fn actions(&self) -> &[ParseAction] {
        self.actions.as_deref().unwrap_or(&[])
    }

    /// The run of `Expected` actions at the end of the trace
    ///
    /// The parser never backtracks over a successful production, so the
    /// actual failure is always described by this run, most specific first.
    pub fn trailing_expected(&self) -> &[ParseAction] {
        let actions = self.actions();
        let start = actions
            .iter()
            .rposition(|a| !a.is_expected())
            .map_or(0, |i| i + 1);
        &actions[start..]
    }

    pub fn clear(&mut self) {
        if let Some(actions) = self.actions.as_mut() {
            actions.clear();
        }
    }

    pub(crate) fn found(&mut self, kind: ActionKind, offset: usize, length: usize) {
        self.record(kind, ActionStatus::Found, offset, length);
    }

    pub(crate) fn expected(&mut self, kind: ActionKind, offset: usize, length: usize) {
        self.record(kind, ActionStatus::Expected, offset, length);
    }

    fn record(&mut self, kind: ActionKind, status: ActionStatus, offset: usize, length: usize) {
        if let Some(actions) = self.actions.as_mut() {
            actions.push(ParseAction {
                kind,
                status,
                offset,
                length,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_context_records_nothing() {
        let mut ctx = ParseContext::silent();
        ctx.found(ActionKind::Major, 0, 1);
        ctx.expected(ActionKind::MajorDot, 1, 0);
        assert!(!ctx.is_collecting());
        assert!(ctx.actions().is_empty());
        assert!(ctx.trailing_expected().is_empty());
    }

    #[test]
    fn test_trailing_expected_run() {
        let mut ctx = ParseContext::collecting();
        ctx.expected(ActionKind::Star, 0, 0);
        ctx.found(ActionKind::Major, 0, 1);
        ctx.expected(ActionKind::MajorDot, 1, 0);
        ctx.expected(ActionKind::Version, 0, 1);

        let run = ctx.trailing_expected();
        assert_eq!(run.len(), 2);
        assert_eq!(run[0].kind, ActionKind::MajorDot);
        assert_eq!(run[1].kind, ActionKind::Version);
        assert_eq!(ctx.actions().len(), 4);

        ctx.clear();
        assert!(ctx.actions().is_empty());
        assert!(ctx.is_collecting());
    }

    #[test]
    fn test_trailing_expected_without_found() {
        let mut ctx = ParseContext::collecting();
        ctx.expected(ActionKind::Major, 0, 0);
        ctx.expected(ActionKind::Version, 0, 0);
        assert_eq!(ctx.trailing_expected().len(), 2);
    }
}
