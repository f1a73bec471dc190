use std::fmt;

/// What went wrong in the input. User-input problems are collected here
/// and carried on the finished skeleton; they never abort the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A part-group stop with no matching open start.
    UnmatchedStop,
    /// A part-group start for a number that is already open.
    DuplicateStart,
    /// A part-group closed at the position it started, containing nothing.
    EmptyGroup,
    /// A group name/abbreviation/symbol/barline with no open group.
    StrayGroupAttribute,
    /// A `<score-part>` reusing an already declared ID.
    DuplicatePartId,
    /// A part-group still open when the part-list ended.
    UnclosedGroup,
    /// Two part-groups whose position intervals cross without nesting.
    OverlappingGroups,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::UnmatchedStop,
            12,
            "part-group 9 stop without matching start",
        );
        assert_eq!(
            diagnostic.to_string(),
            "line 12: part-group 9 stop without matching start"
        );
    }
}
