//! Allow/deny rules built from configured pattern strings.
//!
//! Rules are compiled once when the evaluator is built and never mutated,
//! so one set can be shared by any number of concurrent evaluations.

/// Glob and regex pattern compilation plus candidate normalization.
pub mod pattern;
/// A list of patterns bound to an allow or deny outcome.
pub mod rule;

pub use pattern::{Pattern, PatternError, PatternKind, normalize_candidate};
pub use rule::{Outcome, Rule};
