use std::path::PathBuf;

use log::{LevelFilter, info};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use crate::config::expand_path;
use crate::eval::MatchResult;

/// Log target carrying one record per decision.
pub const DECISION_TARGET: &str = "decision";

/// Directory holding `decisions.log`.
const DATA_DIR: &str = "~/.local/share/cc-patterngate";

/// Path of the decision log.
pub fn decision_log_path() -> PathBuf {
    expand_path(DATA_DIR).join("decisions.log")
}

/// Install the global logger: warnings (or everything, when verbose) on
/// stderr, plus decision records appended to the decision log.
/// Best-effort: failures are silently ignored (logging must never block the hook).
pub fn init(verbose: bool) {
    let term_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        term_level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Never,
    ));

    let path = decision_log_path();
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    if let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        loggers.push(WriteLogger::new(LevelFilter::Info, config, file));
    }

    let _ = CombinedLogger::init(loggers);
}

/// Emit one tab-separated decision record: decision, command, reason.
pub fn log_decision(command: &str, result: &MatchResult) {
    info!(target: DECISION_TARGET, "{}", decision_record(command, result));
}

fn decision_record(command: &str, result: &MatchResult) -> String {
    // Compact single-line fields for the log
    let reason_oneline = result.reason.replace('\n', "; ");
    let cmd_truncated: String = command
        .chars()
        .take(200)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    format!(
        "{decision}\t{cmd}\t{reason}",
        decision = result.decision.as_str(),
        cmd = cmd_truncated,
        reason = reason_oneline,
    )
}
