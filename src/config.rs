use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, io, path::{Path, PathBuf}};
use thiserror::Error;

use crate::dashboard::registry::validate_name;

/// Per-user config file, relative to the home directory
pub const USER_CONFIG_FILE: &str = ".constatus/constatus.yaml";
/// System-wide config file
pub const SYSTEM_CONFIG_FILE: &str = "/etc/constatus.yaml";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{origin}: {message}")]
    Validation { origin: String, message: String },
    #[error("cannot serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Top-level app configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Module names, loaded in order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// File the settings came from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    pub fn modules(&self) -> &[String] {
        self.load.as_deref().unwrap_or_default()
    }

    fn origin(&self) -> String {
        match &self.source {
            Some(path) => path.display().to_string(),
            None => "command line".to_string(),
        }
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "constatus", version, about = "Console status dashboard")]
pub struct Cli {
    /// Load modules from DIR only
    #[arg(short = 'm', long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub module_dir: Option<PathBuf>,
    /// Path to a YAML config file (overrides search)
    #[arg(short = 'c', long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
    /// Write the log here; nothing is logged without it
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: read YAML, merge CLI overrides, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    load_from(cli, &search_paths(home_dir().as_deref()))
}

/// Same as [`load`], searching `candidates` when no file is named
pub fn load_from(cli: &Cli, candidates: &[PathBuf]) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config_file.as_ref() {
        if !p.exists() {
            return Err(ConfigError::NotFound(p.clone()));
        }
        merge(&mut cfg, read_yaml(p)?);
    } else if let Some(p) = find_config_file(candidates) {
        merge(&mut cfg, read_yaml(&p)?);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Pretty YAML of the effective config
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    serde_yaml::to_string(cfg).map_err(ConfigError::Serialize)
}

/// Config locations in search order
pub fn search_paths(home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(2);
    if let Some(home) = home {
        paths.push(home.join(USER_CONFIG_FILE));
    }
    paths.push(PathBuf::from(SYSTEM_CONFIG_FILE));
    paths
}

/// First hit wins.
fn find_config_file(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.is_file()).cloned()
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    // an empty file is an empty mapping
    let mut cfg: Config = if s.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&s).map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source })?
    };
    cfg.source = Some(path.to_path_buf());
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.load.is_some()        { dst.load = src.load; }
    if src.module_dir.is_some()  { dst.module_dir = src.module_dir; }
    if src.log_level.is_some()   { dst.log_level = src.log_level; }
    if src.log_file.is_some()    { dst.log_file = src.log_file; }
    if src.source.is_some()      { dst.source = src.source; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.module_dir.is_some()  { cfg.module_dir = cli.module_dir.clone(); }
    if cli.log_level.is_some()   { cfg.log_level = cli.log_level.clone(); }
    if cli.log_file.is_some()    { cfg.log_file = cli.log_file.clone(); }
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::Validation { origin: cfg.origin(), message };

    for name in cfg.modules() {
        if validate_name(name).is_err() {
            return Err(invalid(format!("invalid module name {:?}", name)));
        }
    }
    if let Some(level) = cfg.log_level.as_deref() {
        if level.parse::<log::LevelFilter>().is_err() {
            return Err(invalid(format!("unknown log_level {:?}", level)));
        }
    }
    if cfg.module_dir.as_deref().is_some_and(|d| d.as_os_str().is_empty()) {
        return Err(invalid("module_dir must not be empty".into()));
    }
    Ok(())
}
