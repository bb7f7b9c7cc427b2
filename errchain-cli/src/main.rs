//! # errchain CLI
//!
//! Command-line front end for the errchain reporting stack.
//!
//! Usage:
//!   errchain codes
//!   errchain validate <diagnostics.json> [--first] [--warn-only] [--no-session]
//!
//! Examples:
//!   errchain codes
//!   errchain --console-level warning validate diagnostics.json
//!   errchain --config log.json validate --first diagnostics.json
//!
//! `validate` reads a JSON array of diagnostics, e.g.
//! `[{"code": "validation", "message": "mandatory node missing", "path": "/a"}]`,
//! runs them through the engine adapter and the return gateway, prints the
//! resulting code and chain, and exits with the numeric code.

use anyhow::Context;
use clap::{Parser, Subcommand};
use errchain_error::{strerror, ErrorCode};
use errchain_log::{parse_threshold, LogConfig, LogLevel};
use errchain_session::{
    append_first, finish, from_external_context, Diagnostic, MemoryEngine, Session,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "errchain")]
#[command(author, version, about = "errchain - error chains and logging")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Console threshold (debug, info, warning, error, none)
    #[arg(long, global = true, value_parser = parse_threshold_flag)]
    console_level: Option<Threshold>,

    /// System log threshold (debug, info, warning, error, none)
    #[arg(long, global = true, value_parser = parse_threshold_flag)]
    syslog_level: Option<Threshold>,

    /// JSON log config file; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List error codes and their descriptions
    Codes,
    /// Replay engine diagnostics through the adapter and gateway
    Validate {
        /// Path to a JSON array of diagnostics
        #[arg(required = true)]
        file: PathBuf,

        /// Record only the first diagnostic
        #[arg(long, conflicts_with = "warn_only")]
        first: bool,

        /// Log every diagnostic as a warning instead of failing
        #[arg(long)]
        warn_only: bool,

        /// Finish without a session; the chain is logged and dropped
        #[arg(long)]
        no_session: bool,
    },
}

/// A threshold flag value; `none` disables the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Threshold(Option<LogLevel>);

fn parse_threshold_flag(value: &str) -> Result<Threshold, String> {
    parse_threshold(value)
        .map(Threshold)
        .map_err(|e| e.to_string())
}

/// How `validate` hands diagnostics to the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrainMode {
    All,
    First,
    WarnOnly,
}

impl Cli {
    fn log_config(&self) -> anyhow::Result<LogConfig> {
        let mut config = match &self.config {
            Some(path) => LogConfig::from_file(path)?,
            None => LogConfig::from_env()?,
        };
        if let Some(Threshold(level)) = self.console_level {
            config.console = level;
        }
        if let Some(Threshold(level)) = self.syslog_level {
            config.syslog = level;
        }
        Ok(config)
    }
}

fn show_codes() {
    for code in ErrorCode::ALL {
        println!(
            "{:3}  {:<18} {}",
            code.as_i32(),
            code.as_str(),
            strerror(code.as_i32())
        );
    }
}

fn load_diagnostics(file: &Path) -> anyhow::Result<Vec<Diagnostic>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse diagnostics in {}", file.display()))
}

/// Run the diagnostics through the reporting stack; returns the API code and
/// the chain left on the session as JSON.
fn replay(
    diagnostics: Vec<Diagnostic>,
    mode: DrainMode,
    with_session: bool,
) -> (ErrorCode, serde_json::Value) {
    let mut engine = MemoryEngine::from(diagnostics);
    let mut chain = None;

    match mode {
        DrainMode::All => from_external_context(&mut chain, &mut engine, false),
        DrainMode::First => append_first(&mut chain, &mut engine),
        DrainMode::WarnOnly => from_external_context(&mut chain, &mut engine, true),
    }

    if with_session {
        let mut session = Session::new();
        let code = finish(Some(&mut session), chain);
        (code, session.error_json())
    } else {
        (finish(None, chain), serde_json::Value::Null)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    errchain_log::configure(&cli.log_config()?);

    match cli.command {
        Commands::Codes => {
            show_codes();
            Ok(())
        }
        Commands::Validate {
            file,
            first,
            warn_only,
            no_session,
        } => {
            let mode = if warn_only {
                DrainMode::WarnOnly
            } else if first {
                DrainMode::First
            } else {
                DrainMode::All
            };

            let diagnostics = load_diagnostics(&file)?;
            let (code, errors) = replay(diagnostics, mode, !no_session);

            println!("{} ({}): {}", code.as_i32(), code, code.description());
            if !errors.is_null() {
                println!("{}", serde_json::to_string_pretty(&errors)?);
            }

            std::process::exit(code.as_i32());
        }
    }
}
