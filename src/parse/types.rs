//! Types produced by the segmenter and consumed by the eval layer.

/// Control operator written between two consecutive segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `&&`: run next only if previous succeeded
    And,
    /// `||`: run next only if previous failed
    Or,
    /// `;`: run next unconditionally
    Sequence,
    /// `|`: pipe stdout
    Pipe,
    /// `&`: run previous in the background
    Background,
}

impl Operator {
    /// The operator's shell syntax.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Sequence => ";",
            Operator::Pipe => "|",
            Operator::Background => "&",
        }
    }
}

/// One command within a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Trimmed command text, never empty.
    pub command: String,
    /// Operator preceding this segment; `None` for the first one.
    pub operator: Option<Operator>,
    /// Text contains `$(` or a backtick.
    pub has_substitution: bool,
    /// Text contains `<` or `>` anywhere, quoted or not.
    pub has_redirect: bool,
}

impl Segment {
    pub(crate) fn new(command: String, operator: Option<Operator>) -> Self {
        let has_substitution = command.contains("$(") || command.contains('`');
        let has_redirect = command.contains(['<', '>']);
        Self {
            command,
            operator,
            has_substitution,
            has_redirect,
        }
    }
}

/// A raw command string split into the segments it actually runs.
///
/// For `ls -la` there is one segment. For `a && b | c` there are three,
/// carrying `None`, `&&` and `|` respectively.
#[derive(Debug, Clone)]
pub struct ParsedCommand {
    pub original: String,
    pub segments: Vec<Segment>,
}

impl ParsedCommand {
    /// At most one segment and no command substitution anywhere.
    pub fn is_simple(&self) -> bool {
        self.segments.len() <= 1 && !self.segments.iter().any(|s| s.has_substitution)
    }

    /// Iterate over the segment texts in order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.command.as_str())
    }
}
