//! Configuration for the loader and the CLI.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GH_EVIDENCE_VERIFY_REPOSITORIES)
//! 2. Config file (explicit path, else .gh-evidence/config.yaml in the current
//!    directory or a parent, else ~/.config/gh-evidence/config.yaml)
//! 3. Defaults
//!
//! Nothing is cached globally; callers load once and pass the result along.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::evidence::{LoaderOptions, Registry};

/// Environment override for `loader.verify_repository_names`
pub const ENV_VERIFY_REPOSITORIES: &str = "GH_EVIDENCE_VERIFY_REPOSITORIES";

/// Default log filter when neither RUST_LOG nor the config file set one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoaderConfig {
    pub verify_repository_names: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `debug` or `gh_evidence=trace`
    pub level: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub loader: LoaderOptions,
    pub log_level: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            loader: LoaderOptions::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ResolvedConfig {
    /// Build the evidence registry these settings describe
    pub fn registry(&self) -> Registry {
        Registry::with_options(self.loader)
    }
}

/// Find config file by searching current directory and parents, then the
/// user config directory
fn find_config_file() -> Option<PathBuf> {
    let current = std::env::current_dir().ok()?;

    for dir in current.ancestors() {
        let config_path = dir.join(".gh-evidence").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("gh-evidence").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("Invalid boolean in {}: {}", ENV_VERIFY_REPOSITORIES, other),
    }
}

/// Merge file settings and environment overrides over the defaults
fn resolve(
    file: Option<(PathBuf, ConfigFile)>,
    env_verify: Option<String>,
) -> Result<ResolvedConfig> {
    let mut config = ResolvedConfig::default();

    if let Some((path, file)) = file {
        if let Some(verify) = file.loader.verify_repository_names {
            config.loader.verify_repository_names = verify;
        }
        if let Some(level) = file.log.level {
            config.log_level = level;
        }
        config.config_file = Some(path);
    }

    if let Some(value) = env_verify {
        config.loader.verify_repository_names = parse_bool(&value)?;
    }

    Ok(config)
}

/// Load configuration from all sources
///
/// An explicit path must exist; otherwise discovery is best-effort and
/// defaults apply when nothing is found.
pub fn load_config(explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    let file = match path {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            Some((path, parsed))
        }
        None => None,
    };

    resolve(file, std::env::var(ENV_VERIFY_REPOSITORIES).ok())
}
