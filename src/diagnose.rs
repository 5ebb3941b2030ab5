//! Human-readable explanation of how a command is segmented and decided.

use std::fmt::Write;

use crate::eval::PolicyEvaluator;
use crate::parse;

/// Render the segmentation of `command` and the evaluator's result.
pub fn explain(evaluator: &PolicyEvaluator, command: &str) -> String {
    let parsed = parse::segment(command);
    let result = evaluator.evaluate(command);

    let mut out = String::new();
    let _ = writeln!(out, "Command: {command}");
    let _ = writeln!(out, "Mode: {}", evaluator.mode().as_str());
    let _ = writeln!(out, "Is simple: {}", parsed.is_simple());
    let _ = writeln!(out, "Segments: {}", parsed.segments.len());
    for seg in &parsed.segments {
        let op = seg.operator.map_or("START", |o| o.as_str());
        let mut markers = vec![format!("base: {}", parse::base_command(&seg.command))];
        if seg.has_substitution {
            markers.push("subst".into());
        }
        if seg.has_redirect {
            markers.push("redirect".into());
        }
        let _ = writeln!(out, "  [{op}] {}  ({})", seg.command, markers.join(", "));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Decision: {}", result.decision.label());
    let _ = writeln!(out, "Reason: {}", result.reason);
    if let Some(pattern) = &result.matched_pattern {
        let _ = writeln!(out, "Matched pattern: {pattern}");
    }
    out
}
