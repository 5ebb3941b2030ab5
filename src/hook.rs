//! PreToolUse hook protocol.
//!
//! Reads one tool invocation as JSON and, for Bash calls, answers with an
//! explicit allow or deny. An ASK result produces no output at all so the
//! normal permission prompt takes over.

use serde::{Deserialize, Serialize};

use crate::eval::{Decision, MatchResult, PolicyEvaluator};
use crate::logging;

/// Tool name whose invocations run shell commands.
pub const SHELL_TOOL: &str = "Bash";

#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub hook_event_name: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: Option<ToolInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToolInput {
    pub command: Option<String>,
}

impl HookInput {
    /// The shell command, when this is a non-empty Bash invocation.
    pub fn shell_command(&self) -> Option<&str> {
        if self.tool_name.as_deref() != Some(SHELL_TOOL) {
            return None;
        }
        self.tool_input
            .as_ref()?
            .command
            .as_deref()
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: &'static str,
    pub permission_decision: &'static str,
    pub permission_decision_reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    pub hook_specific_output: HookSpecificOutput,
    pub suppress_output: bool,
}

impl HookOutput {
    /// Map a result to hook output. ASK has no explicit answer.
    pub fn from_result(result: &MatchResult) -> Option<Self> {
        let decision = match result.decision {
            Decision::Allow | Decision::Deny => result.decision.as_str(),
            Decision::Ask => return None,
        };
        Some(Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: "PreToolUse",
                permission_decision: decision,
                permission_decision_reason: result.reason.clone(),
            },
            suppress_output: true,
        })
    }
}

/// Decide one hook invocation. `None` means defer to the normal prompt.
pub fn respond(evaluator: &PolicyEvaluator, input: &HookInput) -> Option<HookOutput> {
    let command = input.shell_command()?;
    let result = evaluator.evaluate(command);
    logging::log_decision(command, &result);
    HookOutput::from_result(&result)
}
