//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/tonesmith/config.toml)
//! 3. Environment variables (TONESMITH_* prefix, plus OPENAI_API_KEY)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{Length, Strength};

/// Environment variable prefix
const ENV_PREFIX: &str = "TONESMITH";

/// Name of the state document inside the data directory
const STATE_FILE: &str = "state.json";

/// What to do when the state document cannot be parsed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CorruptPolicy {
    /// Continue with an empty document
    #[default]
    Reset,
    /// Copy the unreadable file aside, then continue with an empty document
    Backup,
}

impl std::str::FromStr for CorruptPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(CorruptPolicy::Reset),
            "backup" => Ok(CorruptPolicy::Backup),
            other => anyhow::bail!("Invalid on_corrupt value '{}'. Use 'reset' or 'backup'.", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the state document
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log file used when TONESMITH_LOG is set
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Recovery behavior for an unparseable state document
    #[serde(default)]
    pub on_corrupt: CorruptPolicy,

    /// Language model settings
    #[serde(default)]
    pub generation: GenerationSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_file: None,
            on_corrupt: CorruptPolicy::default(),
            generation: GenerationSettings::default(),
        }
    }
}

/// Settings for the generation client and prompt budget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    /// API key; generation returns a diagnostic when unset
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub max_tokens_short: u32,
    pub max_tokens_medium: u32,
    pub max_tokens_long: u32,
    pub temperature_subtle: f32,
    pub temperature_balanced: f32,
    pub temperature_strong: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            timeout_secs: 60,
            max_tokens_short: 150,
            max_tokens_medium: 400,
            max_tokens_long: 800,
            temperature_subtle: 0.3,
            temperature_balanced: 0.7,
            temperature_strong: 1.0,
        }
    }
}

impl GenerationSettings {
    /// Token budget for a target length
    pub fn max_tokens(&self, length: Length) -> u32 {
        match length {
            Length::Short => self.max_tokens_short,
            Length::Medium => self.max_tokens_medium,
            Length::Long => self.max_tokens_long,
        }
    }

    /// Sampling temperature for a rewrite strength
    pub fn temperature(&self, strength: Strength) -> f32 {
        match strength {
            Strength::Subtle => self.temperature_subtle,
            Strength::Balanced => self.temperature_balanced,
            Strength::Strong => self.temperature_strong,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file (~/.config/tonesmith/config.toml or TONESMITH_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env_overrides()?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Read only the config file, without environment overrides
    ///
    /// Used when writing the file back, so values that came from the
    /// environment (such as OPENAI_API_KEY) are never persisted.
    pub fn load_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        if let Ok(val) = std::env::var(format!("{}_ON_CORRUPT", ENV_PREFIX)) {
            self.on_corrupt = val
                .parse()
                .with_context(|| format!("Invalid {}_ON_CORRUPT", ENV_PREFIX))?;
        }

        if let Ok(val) = std::env::var(format!("{}_MODEL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.generation.model = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_API_BASE", ENV_PREFIX)) {
            if !val.is_empty() {
                self.generation.api_base = val;
            }
        }

        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            let val = val.trim().to_string();
            self.generation.api_key = if val.is_empty() { None } else { Some(val) };
        }

        Ok(())
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with TONESMITH_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tonesmith")
            .join("config.toml")
    }

    /// Get the path to the JSON state document
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    /// Get the log file path, falling back to the data directory
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tonesmith")
}
