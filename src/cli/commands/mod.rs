//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod run;
mod text;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use agendex::config::Settings;

#[derive(Parser)]
#[command(name = "agendex")]
#[command(about = "Convert a meeting agenda PDF into structured JSON")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "AGENDEX_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, structure and write the agenda record (default)
    Run {
        /// Input PDF (default: Board-of-Supervisors-Agenda.pdf)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output JSON file (default: extracted_document.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the extracted text without calling the model
    Text {
        /// Input PDF (default: Board-of-Supervisors-Agenda.pdf)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Check tool availability and model credentials
    Check,
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Run {
        input: None,
        output: None,
    }) {
        Commands::Run { input, output } => {
            let input = input.unwrap_or_else(|| settings.input.clone());
            let output = output.unwrap_or_else(|| settings.output.clone());
            run::cmd_run(&settings, &input, &output).await
        }
        Commands::Text { input } => {
            let input = input.unwrap_or_else(|| settings.input.clone());
            text::cmd_text(&settings, &input)
        }
        Commands::Check => check::cmd_check(&settings),
    }
}
