use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

/// How decoded calls are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented call tree
    #[default]
    Text,
    /// Call tree as JSON
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// ABI files or directories to load
    #[serde(default)]
    pub abi_paths: Vec<String>,

    /// Extra human-readable function signatures
    #[serde(default)]
    pub signatures: Vec<String>,

    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Nested calls expanded per decode before the rest is left opaque
    #[serde(default)]
    pub max_nested_calls: Option<usize>,

    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// tracing filter directive, e.g. "debug" or "calltree=trace"
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str::<Config>(content).context("invalid config")
    }

    /// ABI paths with a leading `~/` expanded against `$HOME`
    pub fn abi_paths(&self) -> Vec<PathBuf> {
        self.abi_paths.iter().map(|path| expand_home(path)).collect()
    }
}

/// Load the config from the default location; missing or broken files give defaults
pub fn load() -> Config {
    config_path()
        .and_then(|path| load_from(&path).ok())
        .unwrap_or_default()
}

/// Load the config from an explicit path
pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    Config::parse(&content).with_context(|| format!("parse config {}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CALLTREE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("calltree").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("calltree").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "calltree", "calltree")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
