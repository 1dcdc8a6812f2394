//! Configuration management for the evaluation runner
//!
//! Loads provider and run settings from a TOML file and provides runtime access.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// System instruction framing the task and constraining the answer format
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that analyzes pragmatic \
cues in Romanian. Your only task is to choose the most appropriate option between A and B \
based on the provided context.";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// Prediction oracle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// "openai" or "anthropic"
    #[serde(default = "default_provider")]
    pub name: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Override of the provider's API base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Environment variable holding the API key; provider default when unset
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Cap on response tokens; left to the provider when unset
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Evaluation run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
    /// Wait before retrying a rate-limited item
    #[serde(default = "default_rate_limit_cooldown_secs")]
    pub rate_limit_cooldown_secs: u64,
    #[serde(default = "default_max_rate_limit_retries")]
    pub max_rate_limit_retries: u32,
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub write_json_summary: bool,
}

fn default_provider() -> String { "openai".to_string() }
fn default_model() -> String { "gpt-4-1106-preview".to_string() }
fn default_timeout_ms() -> u64 { 120_000 }
fn default_system_instruction() -> String { DEFAULT_SYSTEM_INSTRUCTION.to_string() }
fn default_rate_limit_cooldown_secs() -> u64 { 60 }
fn default_max_rate_limit_retries() -> u32 { 1 }
fn default_input() -> PathBuf { PathBuf::from("data/items_all.csv") }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider(),
            model: default_model(),
            base_url: None,
            api_key_env: None,
            timeout_ms: default_timeout_ms(),
            max_tokens: None,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            system_instruction: default_system_instruction(),
            rate_limit_cooldown_secs: default_rate_limit_cooldown_secs(),
            max_rate_limit_retries: default_max_rate_limit_retries(),
            input: default_input(),
            output_dir: default_output_dir(),
            write_json_summary: false,
        }
    }
}

impl RunConfig {
    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_secs(self.rate_limit_cooldown_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from the default config locations or return defaults
    pub fn load_or_default() -> Self {
        let config_paths = ["config/eval.toml", "../config/eval.toml", "pragmatics-eval/config/eval.toml"];

        for path in &config_paths {
            if let Ok(config) = Self::from_file(path) {
                tracing::info!("Loaded configuration from {}", path);
                return config;
            }
        }

        tracing::info!("Using default configuration");
        Self::default()
    }

    /// Save configuration to a TOML file
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Results file for the configured model, e.g. `results_gpt_4_1106_preview.csv`
    pub fn results_path(&self) -> PathBuf {
        self.run.output_dir.join(results_file_name(&self.provider.model))
    }
}

pub fn results_file_name(model: &str) -> String {
    format!("results_{}.csv", model.replace('-', "_"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
