//! gh-evidence - Typed evidence for GitHub forensics
//!
//! A validation and normalization layer over data collected about GitHub
//! repositories: GH Archive events, API and git observations, web archive
//! snapshots and indicators of compromise.
//!
//! # Architecture
//!
//! - Every piece of evidence is an immutable value with a content-addressed ID
//! - Events (low trust) and observations (high trust) form one tagged union
//! - Persisted records are read back through an explicit loader registry
//!
//! # Modules
//!
//! - `evidence`: Evidence types, ID generation, timestamp parsing, loader
//! - `error`: `SchemaError` and `ParseError`
//! - `config`: Loader and logging settings
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Validate a JSONL file of evidence
//! gh-evidence load evidence.jsonl
//!
//! # Compute an evidence ID
//! gh-evidence id commit octocat/Hello-World 7fd1a60b01f91b314f59955a4e4d4e80d8edf11d
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod evidence;

// Re-export main types at crate root for convenience
pub use error::{ParseError, SchemaError};
pub use evidence::{
    generate_id, load_evidence, make_actor, make_repo, make_repo_from_full_name, parse_lenient,
    parse_strict, Event, Evidence, GitHubActor, GitHubRepository, Observation, Registry,
};
