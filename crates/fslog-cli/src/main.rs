mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use tracing::debug;

use fslog::{ErrorRecord, Logger, Outcome};

use crate::config::{Overrides, ProjectConfig};

#[derive(Parser, Debug)]
#[command(
    name = "fslog",
    about = "Append log lines and error records to files",
    version,
    author
)]
struct Cli {
    /// Log directory (default: from fslog.toml, else the user data dir)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Write error stacks instead of messages
    #[arg(long, global = true, overrides_with = "no_debug")]
    debug: bool,

    /// Write error messages even if fslog.toml enables debug
    #[arg(long, global = true, overrides_with = "debug")]
    no_debug: bool,

    /// Write errors below code 500 too
    #[arg(long, global = true, overrides_with = "no_every")]
    every: bool,

    /// Skip errors below code 500 even if fslog.toml enables every
    #[arg(long, global = true, overrides_with = "every")]
    no_every: bool,

    /// Config file (default: ./fslog.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Diagnostic level for fslog itself
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output the result as JSON
    #[arg(long, global = true)]
    json_output: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append a line to logs.log
    Log {
        /// Values to join; JSON literals are kept as JSON, anything else is text
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Append an error record to errors.log
    Error {
        /// Error message
        #[arg(short, long)]
        message: Option<String>,

        /// Severity code (default: 500)
        #[arg(long)]
        code: Option<u16>,

        /// Stack or detail text, written with --debug
        #[arg(long)]
        stack: Option<String>,

        /// Context label placed before the message
        #[arg(long)]
        prefix: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    fslog::init_tracing(&cli.log_level);

    let project = match &cli.config {
        Some(path) => ProjectConfig::load_file(path)?,
        None => {
            let working_dir =
                std::env::current_dir().context("Failed to get current directory")?;
            ProjectConfig::load(&working_dir)?.unwrap_or_default()
        }
    };

    let logger_config = project.resolve(Overrides {
        path: cli.path.clone(),
        debug: switch(cli.debug, cli.no_debug),
        every: switch(cli.every, cli.no_every),
    })?;
    let logger = Logger::new(logger_config).context("Invalid logger configuration")?;
    debug!(
        path = %logger.path().display(),
        debug = logger.debug(),
        every = logger.every(),
        "Logger configured"
    );

    match cli.command {
        Command::Log { values } => {
            let values: Vec<Value> = values.iter().map(|v| parse_value(v)).collect();
            logger
                .write_log(&values)
                .await
                .context("Failed to write log line")?;

            if cli.json_output {
                println!("{}", serde_json::json!({ "status": "written" }));
            } else {
                eprintln!(
                    "{} {}",
                    "✓".bright_green(),
                    logger.logs_path()?.display().to_string().dimmed()
                );
            }
        }
        Command::Error {
            message,
            code,
            stack,
            prefix,
        } => {
            let mut record = ErrorRecord {
                code,
                message,
                stack,
                ..Default::default()
            };
            let outcome = logger
                .error(&mut record, prefix.as_deref())
                .await
                .context("Failed to write error record")?;

            if cli.json_output {
                let json = serde_json::json!({ "outcome": outcome, "record": record });
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                print_outcome(&logger, &outcome)?;
            }
        }
    }

    Ok(())
}

/// Fold an `--x`/`--no-x` pair into an override; neither given defers to the config file.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Interpret an argument as a JSON literal when it is one, else as text.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_outcome(logger: &Logger, outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::Written => eprintln!(
            "{} {}",
            "✓".bright_green(),
            logger.errors_path()?.display().to_string().dimmed()
        ),
        Outcome::Skipped(reason) => eprintln!(
            "{} Not logged: {}",
            "⚠".bright_yellow(),
            reason
        ),
    }
    Ok(())
}
