//! Bootstrap configuration
//!
//! A small TOML file read once at startup. Every field has a built-in
//! default, so a missing file is not an error.
//!
//! # Config file resolution
//!
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`DNOTE_CONFIG`)
//! 3. `<user config dir>/dnote/config.toml`
//! 4. Built-in defaults (no file)

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::intake::parser::DEFAULT_CATEGORY;
use crate::intake::MassPolicy;
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "DNOTE_CONFIG";

/// Default HTTP port for dnote-svc
pub const DEFAULT_PORT: u16 = 5790;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TomlConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub intake: IntakeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub events: EventsConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            intake: IntakeConfig::default(),
            logging: LoggingConfig::default(),
            events: EventsConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse TOML text; absent keys take their defaults
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Intake pipeline settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IntakeConfig {
    /// Minimum gap between camera attempts reaching the parser
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    #[serde(default)]
    pub mass_policy: MassPolicy,

    /// Category for payloads that carry none
    #[serde(default = "default_category")]
    pub default_category: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            mass_policy: MassPolicy::default(),
            default_category: default_category(),
        }
    }
}

impl IntakeConfig {
    pub fn cooldown(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.cooldown_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Event bus sizing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventsConfig {
    /// Broadcast buffer per subscriber before lagging
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_cooldown_ms() -> u64 {
    3000
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_event_capacity() -> usize {
    256
}

/// Pick the config file path by priority
///
/// Returns `None` only when no CLI argument or env var is given and the
/// platform has no user config directory.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// `<user config dir>/dnote/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dnote").join("config.toml"))
}

/// Load configuration from `path`
///
/// A missing or unreadable file logs a warning and yields defaults. A file
/// that exists but does not parse is an [`Error::Config`].
pub fn load_config(path: &Path) -> Result<TomlConfig> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "Config file {} not readable ({}), using built-in defaults",
                path.display(),
                e
            );
            return Ok(TomlConfig::default());
        }
    };

    let config = TomlConfig::parse(&text)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve the config path and load it
pub fn load(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => load_config(&path),
        None => {
            warn!("No config directory on this platform, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}
