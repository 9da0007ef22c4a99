//! Configuration loading, validation, and management for emberchat.
//!
//! Loads configuration from `~/.emberchat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.emberchat/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Context source files or URLs, loaded in order at startup.
    #[serde(default = "default_context_sources")]
    pub context_sources: Vec<String>,

    /// Where the encrypted-key JSON lives (file path or URL).
    #[serde(default = "default_key_source")]
    pub key_source: String,

    /// Inference endpoints, tried strictly in this order.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Matcher configuration.
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// History buffer configuration.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Instruction preamble prepended to every assembled prompt.
    #[serde(default = "default_preamble")]
    pub preamble: String,
}

fn default_context_sources() -> Vec<String> {
    vec![
        "context.json".into(),
        "background.json".into(),
        "blogs.json".into(),
        "project.json".into(),
    ]
}

fn default_key_source() -> String {
    "encrypted_key.json".into()
}

fn default_endpoints() -> Vec<String> {
    vec![
        "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.3".into(),
        "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2".into(),
        "https://api-inference.huggingface.co/models/mistralai/Mixtral-8x7B-Instruct-v0.1".into(),
        "https://api-inference.huggingface.co/models/microsoft/Phi-3-mini-4k-instruct".into(),
    ]
}

fn default_preamble() -> String {
    concat!(
        "You are a helpful and engaging chatbot assistant.\n",
        "Keep the conversation natural. You can use the context provided (if relevant) ",
        "to answer the user's questions. If the user asks a question that is not related ",
        "to the context, you can politely ask for clarification or provide a general ",
        "response. Keep answers concise within 50 words."
    )
    .into()
}

/// Matcher tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Fuzzy distance threshold in [0, 1]; 0 is exact, higher is looser.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
}

fn default_fuzzy_threshold() -> f64 {
    0.72
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
        }
    }
}

/// History buffer caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Max buffered user inputs / generated responses.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Max buffered formatted-context entries.
    #[serde(default = "default_max_context_entries")]
    pub max_context_entries: usize,
}

fn default_max_turns() -> usize {
    10
}

fn default_max_context_entries() -> usize {
    3
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            max_context_entries: default_max_context_entries(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location with env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if let Ok(key_source) = std::env::var("EMBERCHAT_KEY_SOURCE") {
            config.key_source = key_source;
        }

        if let Ok(endpoint) = std::env::var("EMBERCHAT_ENDPOINT") {
            config.endpoints = vec![endpoint];
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".emberchat")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one inference endpoint is required".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.matcher.fuzzy_threshold) {
            return Err(ConfigError::ValidationError(
                "matcher.fuzzy_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for first-run setup).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            context_sources: default_context_sources(),
            key_source: default_key_source(),
            endpoints: default_endpoints(),
            matcher: MatcherConfig::default(),
            history: HistoryConfig::default(),
            preamble: default_preamble(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
