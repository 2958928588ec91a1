//! `load` subcommand: validate a file of evidence records.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::error::SchemaError;
use crate::evidence::{Evidence, Registry};

/// One record's outcome, keyed by its position in the input
pub type LoadOutcome = (usize, Result<Evidence, SchemaError>);

/// Load every record in `text`.
///
/// A document that parses as a single JSON value is treated as one record
/// (object) or a list of records (array, 1-based element index). Anything
/// else is read as JSONL with 1-based line numbers.
pub fn load_records(registry: &Registry, text: &str) -> Vec<LoadOutcome> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| (idx + 1, registry.load(item)))
            .collect(),
        Ok(record) => vec![(1, registry.load(record))],
        Err(_) => registry.load_jsonl(text).collect(),
    }
}

fn read_input(input: Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Execute the load command
pub fn execute_load(
    registry: &Registry,
    input: Option<PathBuf>,
    json: bool,
    keep_going: bool,
) -> Result<()> {
    let text = read_input(input)?;
    let outcomes = load_records(registry, &text);
    let total = outcomes.len();
    let mut failed = 0usize;

    for (position, outcome) in outcomes {
        match outcome {
            Ok(evidence) => {
                if json {
                    println!("{}", serde_json::to_string(&evidence)?);
                } else {
                    println!(
                        "{}\t{}\t{}\t{}",
                        position,
                        evidence.family(),
                        evidence.type_tag(),
                        evidence.evidence_id()
                    );
                }
            }
            Err(e) => {
                if !keep_going {
                    return Err(e).with_context(|| format!("Record {} is invalid", position));
                }
                tracing::warn!(record = position, error = %e, "Invalid evidence record");
                failed += 1;
            }
        }
    }

    tracing::info!(total, failed, "Loaded evidence");

    if failed > 0 {
        anyhow::bail!("{} of {} records failed validation", failed, total);
    }
    Ok(())
}
