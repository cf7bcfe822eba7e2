//! Bootstrap configuration loading
//!
//! The TOML file is read once at startup. Resolution order for the file:
//! 1. Explicit path (command-line `--config`)
//! 2. Environment variable `WAVP_CONFIG`
//! 3. User config dir: `<config_dir>/wavp/config.toml`
//! 4. System config: `/etc/wavp/config.toml` (Linux only)
//! 5. Compiled defaults (no file)
//!
//! An explicitly named file (1 or 2) must exist. A missing file found by
//! searching (3 or 4) is not an error: startup continues with defaults.
//!
//! Loading happens before the tracing subscriber exists, so nothing here logs;
//! callers report the returned [`ConfigSource`] once logging is up.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "WAVP_CONFIG";

/// Default read chunk size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Volume applied at startup when nothing else is configured
pub const DEFAULT_VOLUME: i32 = 30;

/// Top-level bootstrap configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Playback settings
    #[serde(default)]
    pub player: PlayerSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[player]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSection {
    /// Bytes read per loop iteration (aligned down to whole frames at play time)
    pub chunk_size: usize,

    /// Initial volume level, clamped to 0-100
    pub default_volume: i32,

    /// Sample width handed to the sink for 24-bit sources
    pub output_width: OutputWidth,
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_volume: DEFAULT_VOLUME,
            output_width: OutputWidth::Native,
        }
    }
}

/// Sample width of the bytes emitted to the sink.
///
/// 16-bit sources are always emitted as 16-bit. For 24-bit sources:
/// - `Native`: volume-scaled samples are re-widened to 24-bit, so the emitted
///   frame size matches the file's block alignment.
/// - `Pcm16`: samples are emitted in the 16-bit working representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputWidth {
    #[default]
    Native,
    Pcm16,
}

impl FromStr for OutputWidth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(OutputWidth::Native),
            "pcm16" => Ok(OutputWidth::Pcm16),
            other => Err(format!(
                "invalid output width '{}' (expected 'native' or 'pcm16')",
                other
            )),
        }
    }
}

impl fmt::Display for OutputWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputWidth::Native => write!(f, "native"),
            OutputWidth::Pcm16 => write!(f, "pcm16"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text and check value ranges.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        let config: TomlConfig = toml::from_str(text).map_err(|source| Error::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    fn validate(&self) -> Result<()> {
        if self.player.chunk_size == 0 {
            return Err(Error::Config(
                "player.chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where a resolved configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` on the command line
    CommandLine(PathBuf),
    /// `WAVP_CONFIG` environment variable
    Environment(PathBuf),
    /// Found by searching the platform config locations
    Discovered(PathBuf),
    /// No file; compiled defaults
    Defaults,
}

/// Resolves and loads the bootstrap configuration file.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl ConfigResolver {
    /// Resolver searching the platform default locations
    pub fn new() -> Self {
        Self {
            cli_path: None,
            search_paths: default_search_paths(),
        }
    }

    /// Set the explicit path given on the command line
    pub fn with_cli_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_path = path;
        self
    }

    /// Replace the searched locations
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Determine which file (if any) should be loaded.
    pub fn resolve(&self) -> ConfigSource {
        if let Some(path) = &self.cli_path {
            return ConfigSource::CommandLine(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        self.search_paths
            .iter()
            .find(|p| p.is_file())
            .map(|p| ConfigSource::Discovered(p.clone()))
            .unwrap_or(ConfigSource::Defaults)
    }

    /// Resolve and load the configuration.
    ///
    /// # Errors
    /// - Explicitly named file missing or unreadable
    /// - Any loaded file is malformed
    pub fn load(&self) -> Result<(TomlConfig, ConfigSource)> {
        let source = self.resolve();
        let config = match &source {
            ConfigSource::CommandLine(path)
            | ConfigSource::Environment(path)
            | ConfigSource::Discovered(path) => TomlConfig::load_file(path)?,
            ConfigSource::Defaults => TomlConfig::default(),
        };
        Ok((config, source))
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform config file locations, most specific first
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("wavp").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/wavp/config.toml"));
    }
    paths
}
