//! Configuration file loading with precedence handling.

use crate::render::highlighter::DEFAULT_THEME;
use crate::render::{RenderOptions, DEFAULT_SUMMARY_MAX_CHARS};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "CCBOOK_CONFIG";
/// Environment variable overriding the syntax theme.
pub const THEME_ENV_VAR: &str = "CCBOOK_THEME";
/// Environment variable overriding the output directory.
pub const OUTPUT_DIR_ENV_VAR: &str = "CCBOOK_OUTPUT_DIR";

/// Output directory used when nothing else is configured.
pub const DEFAULT_OUTPUT_DIR: &str = ".ccbook";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/ccbook/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Syntax theme name (e.g., "base16-ocean-dark", "solarized-dark").
    #[serde(default)]
    pub theme: Option<String>,

    /// Directory receiving the HTML artifacts.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Root of the per-project session log directories.
    #[serde(default)]
    pub projects_dir: Option<PathBuf>,

    /// Path to log file for tracing output. Unset means stderr.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Character limit for sub-agent summaries on cards.
    #[serde(default)]
    pub summary_max_chars: Option<usize>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Syntax theme name.
    pub theme: String,
    /// Artifact destination.
    pub output_dir: PathBuf,
    /// Root of the per-project session log directories.
    pub projects_dir: PathBuf,
    /// Log file for tracing output, `None` for stderr.
    pub log_file_path: Option<PathBuf>,
    /// Character limit for sub-agent summaries.
    pub summary_max_chars: usize,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            projects_dir: default_projects_dir(),
            log_file_path: None,
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
        }
    }
}

impl ResolvedConfig {
    /// Render settings derived from this configuration.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            theme: self.theme.clone(),
            summary_max_chars: self.summary_max_chars,
        }
    }
}

/// Resolve the default projects directory.
///
/// Returns `~/.claude/projects`. If the home directory cannot be
/// determined, falls back to a path relative to the current directory.
pub fn default_projects_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".claude").join("projects"),
        None => PathBuf::from(".claude").join("projects"),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/ccbook/config.toml` on Linux, the platform config
/// directory elsewhere. `None` if it cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ccbook").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CCBOOK_CONFIG` environment variable
/// 3. Default path `~/.config/ccbook/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        theme: config.theme.unwrap_or(defaults.theme),
        output_dir: config.output_dir.unwrap_or(defaults.output_dir),
        projects_dir: config.projects_dir.unwrap_or(defaults.projects_dir),
        log_file_path: config.log_file_path.or(defaults.log_file_path),
        summary_max_chars: config
            .summary_max_chars
            .unwrap_or(defaults.summary_max_chars),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CCBOOK_THEME`: Override theme
/// - `CCBOOK_OUTPUT_DIR`: Override output directory
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(theme) = std::env::var(THEME_ENV_VAR) {
        config.theme = theme;
    }

    if let Some(dir) = std::env::var_os(OUTPUT_DIR_ENV_VAR) {
        config.output_dir = PathBuf::from(dir);
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// Only flags the user actually passed are applied.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    theme_override: Option<String>,
    output_dir_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(theme) = theme_override {
        config.theme = theme;
    }

    if let Some(dir) = output_dir_override {
        config.output_dir = dir;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
