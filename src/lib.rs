//! cc-patterngate: a PreToolUse hook for Claude Code that approves Bash
//! commands against configured allow/deny patterns.
//!
//! A command string is split into the commands it actually runs (respecting
//! quotes, escapes and substitutions), every deny pattern is checked first,
//! and the per-segment results of a chain are combined according to the
//! configured [`Mode`](eval::Mode) into [`eval::Decision::Allow`],
//! [`eval::Decision::Ask`], or [`eval::Decision::Deny`].
//!
//! # Architecture
//!
//! - **[`parse`]** — Segmenter: quote-aware operator splitting, base-command extraction.
//! - **[`rules`]** — Pattern compiler: glob and `/regex/` patterns, allow/deny rules.
//! - **[`eval`]** — Policy evaluator: deny-first classification and chain reduction.
//! - **[`config`]** — Configuration loading: TOML file or embedded defaults.
//! - **[`hook`]** — PreToolUse request/response mapping.
//! - **[`diagnose`]** — Segmentation and decision explanation for debugging.
//! - **[`history`]** — Session history mining and config suggestion.
//! - **[`logging`]** — stderr logging and the decision log.

/// Configuration types and loading.
pub mod config;
/// Human-readable evaluation traces.
pub mod diagnose;
/// Policy evaluation: decisions, modes, chain reduction.
pub mod eval;
/// Session history analysis and config generation.
pub mod history;
/// PreToolUse hook input/output.
pub mod hook;
/// Logger setup and decision records.
pub mod logging;
/// Shell command segmentation and tokenizing.
pub mod parse;
/// Pattern compilation and allow/deny rules.
pub mod rules;

use eval::MatchResult;

/// Build an evaluator from the embedded default config and evaluate a command string.
///
/// Convenient for tests and one-off checks. The hook builds its evaluator
/// once from the resolved user configuration instead.
pub fn evaluate(command: &str) -> MatchResult {
    let config = config::Config::default_config();
    let evaluator = eval::PolicyEvaluator::from_config(&config)
        .expect("embedded default patterns must compile");
    evaluator.evaluate(command)
}
