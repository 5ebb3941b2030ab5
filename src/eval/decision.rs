#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Ask,
    Deny,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Ask => "ask",
            Decision::Deny => "deny",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Ask => "ASK",
            Decision::Deny => "DENY",
        }
    }
}

/// How per-segment classifications of a chain reduce to one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Allow a chain only if every segment is allowed.
    #[default]
    Smart,
    /// Allow a chain if any segment is allowed.
    Yolo,
    /// Allow a chain only if no segment is unresolved.
    Paranoid,
}

impl Mode {
    /// Parse a configured mode. Anything but `smart` or `yolo` is paranoid.
    pub fn parse(value: &str) -> Self {
        match value {
            "smart" => Mode::Smart,
            "yolo" => Mode::Yolo,
            _ => Mode::Paranoid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Smart => "smart",
            Mode::Yolo => "yolo",
            Mode::Paranoid => "paranoid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub decision: Decision,
    pub reason: String,
    /// Raw text of the pattern that decided, if one did.
    pub matched_pattern: Option<String>,
    /// Segment texts examined, in order. Set for chains and substitutions.
    pub segments: Option<Vec<String>>,
}

impl MatchResult {
    pub fn new(decision: Decision, reason: impl Into<String>) -> Self {
        Self {
            decision,
            reason: reason.into(),
            matched_pattern: None,
            segments: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.matched_pattern = Some(pattern.into());
        self
    }

    pub fn with_segments(mut self, segments: Vec<String>) -> Self {
        self.segments = Some(segments);
        self
    }
}
