//! Command-line interface for gh-evidence.
//!
//! Provides commands for validating evidence files, computing evidence IDs,
//! normalizing timestamps, and inspecting the loader configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::ResolvedConfig;
use crate::evidence::{format_timestamp, generate_id, parse_lenient, parse_strict};

pub mod load;

/// gh-evidence - typed evidence for GitHub forensics
#[derive(Parser, Debug)]
#[command(name = "gh-evidence")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to .gh-evidence/config.yaml discovery)
    #[arg(long, global = true, env = "GH_EVIDENCE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate evidence records (JSON object, JSON array or JSONL)
    Load {
        /// Input file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Print each loaded record as canonical JSON
        #[arg(long)]
        json: bool,

        /// Report every invalid record instead of stopping at the first
        #[arg(short, long)]
        keep_going: bool,
    },

    /// Compute a deterministic evidence ID
    Id {
        /// Type prefix (e.g. "commit", "ioc")
        prefix: String,

        /// Identifying parts, in order
        parts: Vec<String>,
    },

    /// Normalize a timestamp to UTC
    Time {
        /// Timestamp text
        value: String,

        /// Fail on unrecognized input instead of substituting the current time
        #[arg(long)]
        strict: bool,
    },

    /// List registered event and observation types
    Types,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self, config: &ResolvedConfig) -> Result<()> {
        match self.command {
            Commands::Load {
                input,
                json,
                keep_going,
            } => load::execute_load(&config.registry(), input, json, keep_going),
            Commands::Id { prefix, parts } => {
                println!("{}", generate_id(&prefix, &parts));
                Ok(())
            }
            Commands::Time { value, strict } => show_time(&value, strict),
            Commands::Types => list_types(config),
            Commands::Config => show_config(config),
        }
    }
}

fn show_time(value: &str, strict: bool) -> Result<()> {
    let ts = if strict {
        parse_strict(value)
            .with_context(|| format!("Strict parse failed for {:?}", value))?
            .context("No timestamp")?
    } else {
        parse_lenient(value)
    };
    println!("{}", format_timestamp(&ts));
    Ok(())
}

fn list_types(config: &ResolvedConfig) -> Result<()> {
    let registry = config.registry();
    println!("event_type:");
    for tag in registry.event_types() {
        println!("  {}", tag);
    }
    println!("observation_type:");
    for tag in registry.observation_types() {
        println!("  {}", tag);
    }
    Ok(())
}

fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("Configuration:");
    match &config.config_file {
        Some(path) => println!("  config_file: {}", path.display()),
        None => println!("  config_file: (none, using defaults)"),
    }
    println!(
        "  loader.verify_repository_names: {}",
        config.loader.verify_repository_names
    );
    println!("  log.level: {}", config.log_level);
    Ok(())
}
