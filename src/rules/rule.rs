use super::pattern::{Pattern, PatternError};
use crate::eval::Decision;

/// What a matching rule decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Allow,
    Deny,
}

impl Outcome {
    pub fn decision(self) -> Decision {
        match self {
            Outcome::Allow => Decision::Allow,
            Outcome::Deny => Decision::Deny,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Allow => "allow",
            Outcome::Deny => "deny",
        }
    }
}

/// An ordered list of patterns sharing one outcome.
#[derive(Debug, Clone)]
pub struct Rule {
    patterns: Vec<Pattern>,
    outcome: Outcome,
}

impl Rule {
    pub fn new(outcome: Outcome, patterns: Vec<Pattern>) -> Self {
        Self { patterns, outcome }
    }

    /// Build a single-pattern rule from a configured pattern string.
    pub fn compile(outcome: Outcome, pattern: &str) -> Result<Self, PatternError> {
        Ok(Self::new(outcome, vec![Pattern::compile(pattern)?]))
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The first pattern matching `command`, if any.
    pub fn matches(&self, command: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.matches(command))
    }
}
