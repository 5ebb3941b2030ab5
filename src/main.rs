//! cc-patterngate: PreToolUse hook for Claude Code.
//!
//! `hook` reads one tool call as JSON from stdin and writes a permission
//! decision to stdout. `test` explains how a command would be decided.
//! `analyze` and `init` build a starting config from session history.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use cc_patterngate::config::{self, Config};
use cc_patterngate::eval::PolicyEvaluator;
use cc_patterngate::{diagnose, history, hook, logging};

#[derive(Parser)]
#[command(version, about = "Pattern-based permission hook for Bash tool calls")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run as a PreToolUse hook (JSON on stdin, decision on stdout)
    Hook {
        /// Config file (default: ~/.config/cc-patterngate/config.toml, else built-in)
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Show how a command is segmented and decided
    Test {
        #[arg(short, long)]
        config: Option<String>,
        /// Command to evaluate
        command: String,
    },
    /// Analyze session history and suggest patterns
    Analyze {
        /// Max session files to read
        #[arg(long)]
        max_sessions: Option<usize>,
        /// Min times a command must appear to be suggested
        #[arg(long, default_value_t = 2)]
        min_frequency: usize,
        /// Write the suggested config here
        #[arg(short, long)]
        output: Option<String>,
        /// Show example commands per suggestion
        #[arg(long)]
        examples: bool,
    },
    /// Generate a config from session history
    Init {
        /// Output path (default: ~/.config/cc-patterngate/config.toml)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Confidence a suggestion needs to be written into a generated config.
const EXPORT_CONFIDENCE: f64 = 0.5;

fn load_evaluator(config_path: Option<&str>) -> Result<PolicyEvaluator, String> {
    let path = config_path.map(config::expand_path);
    let config = Config::resolve(path.as_deref()).map_err(|e| e.to_string())?;
    PolicyEvaluator::from_config(&config).map_err(|e| e.to_string())
}

fn run_hook(config_path: Option<&str>) -> Result<(), String> {
    let evaluator = load_evaluator(config_path)?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| format!("failed to read stdin: {e}"))?;
    let hook_input: hook::HookInput =
        serde_json::from_str(&input).map_err(|e| format!("JSON parse error: {e}"))?;

    if let Some(output) = hook::respond(&evaluator, &hook_input) {
        let json = serde_json::to_string(&output).map_err(|e| e.to_string())?;
        println!("{json}");
    }
    Ok(())
}

fn run_test(config_path: Option<&str>, command: &str) -> Result<(), String> {
    let evaluator = load_evaluator(config_path)?;
    print!("{}", diagnose::explain(&evaluator, command));
    Ok(())
}

fn write_config(path: &Path, text: &str) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| format!("{}: {e}", dir.display()))?;
    }
    std::fs::write(path, text).map_err(|e| format!("{}: {e}", path.display()))
}

fn confidence_label(confidence: f64) -> &'static str {
    if confidence > 0.7 {
        "HIGH"
    } else if confidence > 0.4 {
        "MED"
    } else {
        "LOW"
    }
}

fn run_analyze(
    max_sessions: Option<usize>,
    min_frequency: usize,
    output: Option<&str>,
    examples: bool,
) -> Result<(), String> {
    println!("Analyzing session history...");
    println!();

    let analysis = history::analyze(&history::default_root(), max_sessions, min_frequency);

    println!("Total commands found: {}", analysis.total_commands);
    println!("Unique base commands: {}", analysis.base_commands.len());
    println!(
        "Chained commands (with &&, ||, etc.): {}",
        analysis.chained_commands.len()
    );
    println!();

    println!("Top commands:");
    for (cmd, count) in history::most_common(&analysis.base_commands, 20) {
        println!("  {cmd}: {count}");
    }
    println!();

    println!("Suggested patterns:");
    for suggestion in analysis.suggestions.iter().take(15) {
        println!(
            "  [{}] {} (used {}x)",
            confidence_label(suggestion.confidence),
            suggestion.pattern,
            suggestion.frequency
        );
        if examples {
            for example in suggestion.examples.iter().take(2) {
                let short: String = example.chars().take(60).collect();
                println!("        e.g. {short}");
            }
        }
    }
    println!();

    if !analysis.chained_commands.is_empty() {
        println!("Sample chained commands:");
        for cmd in analysis.chained_commands.iter().take(5) {
            let short: String = cmd.chars().take(80).collect();
            println!("  {short}");
        }
        println!();
    }

    match output {
        Some(path) => {
            let path = config::expand_path(path);
            write_config(
                &path,
                &history::export_suggested_config(&analysis, EXPORT_CONFIDENCE),
            )?;
            println!("Config written to: {}", path.display());
        }
        None => println!("Use --output FILE.toml to save the suggested config"),
    }
    Ok(())
}

fn run_init(output: Option<&str>) -> Result<(), String> {
    println!("Analyzing session history to generate config...");
    let analysis = history::analyze(&history::default_root(), None, 2);
    let path: PathBuf = config::expand_path(output.unwrap_or(config::DEFAULT_CONFIG_PATH));
    write_config(
        &path,
        &history::export_suggested_config(&analysis, EXPORT_CONFIDENCE),
    )?;

    println!("Config written to: {}", path.display());
    println!();
    println!("To use it, add to your .claude/settings.json:");
    println!();
    let settings = serde_json::json!({
        "hooks": {
            "PreToolUse": [{
                "matcher": hook::SHELL_TOOL,
                "hooks": [{
                    "type": "command",
                    "command": format!("cc-patterngate hook --config {}", path.display()),
                }]
            }]
        }
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&settings).map_err(|e| e.to_string())?
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match &cli.command {
        Command::Hook { config } => run_hook(config.as_deref()),
        Command::Test { config, command } => run_test(config.as_deref(), command),
        Command::Analyze {
            max_sessions,
            min_frequency,
            output,
            examples,
        } => run_analyze(*max_sessions, *min_frequency, output.as_deref(), *examples),
        Command::Init { output } => run_init(output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("cc-patterngate: {e}");
            ExitCode::FAILURE
        }
    }
}
