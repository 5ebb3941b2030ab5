//! Session history mining.
//!
//! Scans recorded Claude Code sessions for Bash commands, counts them by base
//! command, and suggests allow patterns. Nothing here takes part in deciding
//! a live command; it only produces a starting configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use crate::config::expand_path;
use crate::hook::SHELL_TOOL;
use crate::parse;

/// Where session transcripts are stored, one directory per project.
pub const PROJECTS_DIR: &str = "~/.claude/projects";

/// Well-known commands and the patterns suggested for them.
static SAFE_PATTERNS: &[(&str, &[&str])] = &[
    ("git", &["git *"]),
    ("npm", &["npm *"]),
    ("yarn", &["yarn *"]),
    ("pnpm", &["pnpm *"]),
    ("cargo", &["cargo *"]),
    ("make", &["make *"]),
    ("just", &["just *"]),
    ("python", &["python *", "python3 *"]),
    ("pip", &["pip *", "pip3 *"]),
    ("poetry", &["poetry *"]),
    ("go", &["go *"]),
    ("rustc", &["rustc *"]),
    ("node", &["node *"]),
    ("deno", &["deno *"]),
    ("bun", &["bun *"]),
    ("docker", &["docker *"]),
    ("kubectl", &["kubectl *"]),
    ("ls", &["ls *"]),
    ("cat", &["cat *"]),
    ("head", &["head *"]),
    ("tail", &["tail *"]),
    ("grep", &["grep *"]),
    ("find", &["find *"]),
    ("rg", &["rg *"]),
    ("fd", &["fd *"]),
    ("tree", &["tree *"]),
    ("pwd", &["pwd"]),
    ("which", &["which *"]),
    ("echo", &["echo *"]),
    ("env", &["env"]),
    ("printenv", &["printenv *"]),
];

/// Deny patterns every generated config starts with.
/// The regexes cover flags that make `find`, `rg` and `fd` delete files or run programs.
const DEFAULT_DENY: &[&str] = &[
    "rm -rf *",
    "sudo *",
    "chmod 777 *",
    r"/\s-(delete|exec|execdir|ok|okdir)\b/",
    r"/\s--pre(\s|=)/",
    r"/\s--exec(-batch)?(\s|=)/",
];

const SAFE_CONFIDENCE: f64 = 0.9;
const UNKNOWN_CONFIDENCE: f64 = 0.5;
const MAX_BASES: usize = 50;
const MAX_EXAMPLES: usize = 5;
const MAX_CHAINED: usize = 50;

fn safe_patterns(base: &str) -> Option<&'static [&'static str]> {
    SAFE_PATTERNS
        .iter()
        .find(|(name, _)| *name == base)
        .map(|(_, patterns)| *patterns)
}

/// Occurrence counts keyed by command text, in first-seen order.
pub type Tally = IndexMap<String, usize>;

fn bump(tally: &mut Tally, key: &str) {
    *tally.entry(key.to_string()).or_insert(0) += 1;
}

/// The `n` highest counts, highest first. Ties keep first-seen order.
pub fn most_common(tally: &Tally, n: usize) -> Vec<(&str, usize)> {
    let mut ranked: Vec<(&str, usize)> = tally
        .iter()
        .map(|(key, count)| (key.as_str(), *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// A Bash command found in a session transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    pub command: String,
    pub session_id: String,
    pub project: String,
}

#[derive(Debug, Clone)]
pub struct PatternSuggestion {
    pub pattern: String,
    pub examples: Vec<String>,
    pub frequency: usize,
    /// 0–1, how likely the pattern is safe to auto-approve.
    pub confidence: f64,
}

impl PatternSuggestion {
    fn score(&self) -> f64 {
        self.frequency as f64 * self.confidence
    }
}

#[derive(Debug, Clone)]
pub struct HistoryAnalysis {
    pub total_commands: usize,
    pub base_commands: Tally,
    pub suggestions: Vec<PatternSuggestion>,
    /// Commands that were not simple, capped for display.
    pub chained_commands: Vec<String>,
}

/// Project directories under `root`, sorted.
pub fn session_dirs(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(root) else {
        debug!("no session directory at {}", root.display());
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Session transcripts (`*.jsonl`, excluding `sessions-*`) in a project directory.
pub fn session_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "jsonl"))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with("sessions-"))
        })
        .collect();
    files.sort();
    files
}

fn bash_block(block: &Value) -> Option<String> {
    if block.get("type")?.as_str()? != "tool_use" || block.get("name")?.as_str()? != SHELL_TOOL {
        return None;
    }
    block.get("input")?.get("command")?.as_str().map(String::from)
}

fn first_bash_block(content: Option<&Value>) -> Option<String> {
    content?.as_array()?.iter().find_map(bash_block)
}

/// Pull a Bash command out of one transcript record.
///
/// Recognizes tool_use blocks under `message.content`, a top-level
/// `{"type":"tool_use","tool_name":"Bash","tool_input":{...}}` record, and
/// tool_use blocks under a top-level `content` (older and assistant-role records).
pub fn extract_command(record: &Value) -> Option<String> {
    first_bash_block(record.get("message").and_then(|m| m.get("content")))
        .or_else(|| {
            let is_bash_use = record.get("type").and_then(Value::as_str) == Some("tool_use")
                && record.get("tool_name").and_then(Value::as_str) == Some(SHELL_TOOL);
            if !is_bash_use {
                return None;
            }
            record
                .get("tool_input")?
                .get("command")?
                .as_str()
                .map(String::from)
        })
        .or_else(|| first_bash_block(record.get("content")))
}

/// Read every Bash command from one transcript. Unreadable files and
/// malformed lines are skipped.
pub fn read_session(path: &Path) -> Vec<CommandRecord> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            debug!("skipping {}: {e}", path.display());
            return Vec::new();
        }
    };
    let session_id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let project = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter_map(|record| extract_command(&record))
        .map(|command| CommandRecord {
            command,
            session_id: session_id.clone(),
            project: project.clone(),
        })
        .collect()
}

/// Commands from every session under `root`, reading at most `max_sessions` files.
pub fn collect_commands(root: &Path, max_sessions: Option<usize>) -> Vec<CommandRecord> {
    session_dirs(root)
        .iter()
        .flat_map(|dir| session_files(dir))
        .take(max_sessions.unwrap_or(usize::MAX))
        .flat_map(|file| read_session(&file))
        .collect()
}

/// Analyze the session history under `root` (normally [`PROJECTS_DIR`]).
pub fn analyze(root: &Path, max_sessions: Option<usize>, min_frequency: usize) -> HistoryAnalysis {
    let records = collect_commands(root, max_sessions);
    debug!("found {} commands under {}", records.len(), root.display());
    analyze_commands(records.iter().map(|r| r.command.as_str()), min_frequency)
}

/// The default history location with `~` expanded.
pub fn default_root() -> PathBuf {
    expand_path(PROJECTS_DIR)
}

/// Count commands by base command and suggest patterns for the frequent ones.
pub fn analyze_commands<I>(commands: I, min_frequency: usize) -> HistoryAnalysis
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut total_commands = 0;
    let mut base_commands = Tally::default();
    let mut full_commands = Tally::default();
    let mut chained_commands = Vec::new();

    for command in commands {
        let command = command.as_ref();
        total_commands += 1;

        let parsed = parse::segment(command);
        if !parsed.is_simple() && chained_commands.len() < MAX_CHAINED {
            chained_commands.push(command.to_string());
        }
        for seg in &parsed.segments {
            bump(&mut base_commands, &parse::base_command(&seg.command));
            bump(&mut full_commands, &seg.command);
        }
    }

    let suggestions = suggest(&base_commands, &full_commands, min_frequency);

    HistoryAnalysis {
        total_commands,
        base_commands,
        suggestions,
        chained_commands,
    }
}

fn suggest(base_commands: &Tally, full_commands: &Tally, min_frequency: usize) -> Vec<PatternSuggestion> {
    let frequent_full = most_common(full_commands, 100);
    let mut suggestions = Vec::new();

    for (base, count) in most_common(base_commands, MAX_BASES) {
        if count < min_frequency || base.is_empty() {
            continue;
        }

        let examples: Vec<String> = frequent_full
            .iter()
            .filter(|(cmd, _)| parse::base_command(cmd) == base)
            .take(MAX_EXAMPLES)
            .map(|(cmd, _)| cmd.to_string())
            .collect();

        let (patterns, confidence) = match safe_patterns(base) {
            Some(known) => (
                known.iter().map(|p| p.to_string()).collect(),
                SAFE_CONFIDENCE,
            ),
            None => (vec![format!("{base} *")], UNKNOWN_CONFIDENCE),
        };

        for pattern in patterns {
            suggestions.push(PatternSuggestion {
                pattern,
                examples: examples.clone(),
                frequency: count,
                confidence,
            });
        }
    }

    suggestions.sort_by(|a, b| b.score().total_cmp(&a.score()));
    suggestions
}

fn toml_string(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

fn comment_safe(s: &str) -> String {
    s.chars().map(|c| if c.is_control() { ' ' } else { c }).collect()
}

/// Render a configuration file from the suggestions at or above `min_confidence`.
pub fn export_suggested_config(analysis: &HistoryAnalysis, min_confidence: f64) -> String {
    let mut lines: Vec<String> = vec![
        "# Auto-generated by cc-patterngate".into(),
        "# Based on analysis of recorded session history".into(),
        String::new(),
        "[settings]".into(),
        "mode = \"smart\"  # allow a chain only if every segment is allowed".into(),
        String::new(),
        "# Allow patterns (generated from history)".into(),
    ];

    let mut seen = HashSet::new();
    for suggestion in &analysis.suggestions {
        if suggestion.confidence < min_confidence || !seen.insert(suggestion.pattern.as_str()) {
            continue;
        }
        let examples: Vec<String> = suggestion
            .examples
            .iter()
            .take(3)
            .map(|e| comment_safe(e))
            .collect();
        lines.push(String::new());
        lines.push(format!("# Used {} times", suggestion.frequency));
        lines.push(format!("# Examples: {}", examples.join(" | ")));
        lines.push("[[allow]]".into());
        lines.push(format!("pattern = {}", toml_string(&suggestion.pattern)));
    }

    lines.push(String::new());
    lines.push("# Deny patterns (safety defaults)".into());
    for pattern in DEFAULT_DENY {
        lines.push(String::new());
        lines.push("[[deny]]".into());
        lines.push(format!("pattern = {}", toml_string(pattern)));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
