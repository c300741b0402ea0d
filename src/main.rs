//! Binary entry point for redflag.
//!
//! Builds obscured lexicon files and runs detection against them.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{cmd_build, cmd_detect, cmd_obscure, cmd_reveal, cmd_terms, cmd_vector};
use redflag::config::RedflagConfig;
use redflag::observability;
use std::path::PathBuf;
use std::process::ExitCode;

/// Redflag - flagged-term lexicon builder and detector.
#[derive(Parser)]
#[command(name = "redflag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "REDFLAG_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Lexicon file, overriding config and environment.
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw term list and write it as an obscured lexicon.
    Build {
        /// Raw candidate terms, one per line.
        raw: PathBuf,

        /// Output lexicon file (default: the configured lexicon).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the decoded lexicon terms.
    Terms,

    /// Detect lexicon terms in text.
    Detect {
        /// Text to scan (default: stdin).
        text: Option<String>,

        /// Print only whether anything was flagged; exit 1 when not.
        #[arg(long = "bool")]
        flag_only: bool,
    },

    /// Print per-term occurrence counts as a JSON array.
    Vector {
        /// Text to scan (default: stdin).
        text: Option<String>,
    },

    /// Encode a single term into its at-rest record.
    Obscure {
        /// The term to encode.
        term: String,
    },

    /// Decode a single at-rest record.
    Reveal {
        /// The record to decode.
        record: String,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.lexicon.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(&config.logging_config(cli.verbose)) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: &RedflagConfig) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Build { raw, output } => cmd_build(config, &raw, output)?,
        Commands::Terms => cmd_terms(config)?,
        Commands::Detect { text, flag_only } => {
            let flagged = cmd_detect(config, text, flag_only)?;
            if flag_only && !flagged {
                return Ok(ExitCode::from(1));
            }
        },
        Commands::Vector { text } => cmd_vector(config, text)?,
        Commands::Obscure { term } => cmd_obscure(config, &term)?,
        Commands::Reveal { record } => cmd_reveal(config, &record)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration.
///
/// Precedence for the lexicon path: `--lexicon`, then `REDFLAG_LEXICON`, then
/// the config file, then the default.
fn load_config(
    path: Option<&std::path::Path>,
    lexicon: Option<PathBuf>,
) -> anyhow::Result<RedflagConfig> {
    let config = match path {
        Some(config_path) => RedflagConfig::load_from_file(config_path)
            .with_context(|| format!("loading {}", config_path.display()))?,
        None => RedflagConfig::load_default()?,
    };

    let config = config.apply_env();
    Ok(match lexicon {
        Some(lexicon) => config.with_lexicon_path(lexicon),
        None => config,
    })
}
