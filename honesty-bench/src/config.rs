//! Configuration management for the honesty benchmark
//!
//! Loads provider, judge and run settings from TOML files. Every field has a
//! default, so an empty file (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::runner::ExecutorConfig;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub judge: JudgeSettings,
    #[serde(default)]
    pub run: RunSettings,
}

/// Model under test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Overrides `LLM_BASE_URL`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Requests per minute
    #[serde(default = "default_rpm")]
    pub rpm: u32,
    /// Tokens per minute
    #[serde(default = "default_tpm")]
    pub tpm: u32,
}

/// Judge model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_judge_temperature")]
    pub temperature: f32,
    #[serde(default = "default_judge_max_tokens")]
    pub max_tokens: u32,
}

/// Execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    #[serde(default = "default_parallel_requests")]
    pub parallel_requests: usize,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

// Default value functions
fn default_model() -> String { "gpt-4o-mini".to_string() }
fn default_temperature() -> f32 { 0.2 }
fn default_max_tokens() -> u32 { 256 }
fn default_rpm() -> u32 { 500 }
fn default_tpm() -> u32 { 200_000 }
fn default_judge_temperature() -> f32 { 0.0 }
fn default_judge_max_tokens() -> u32 { 512 }
fn default_parallel_requests() -> usize { 3 }
fn default_retry_count() -> u32 { 3 }
fn default_retry_delay_ms() -> u64 { 1000 }
fn default_max_retry_delay_ms() -> u64 { 60_000 }
fn default_timeout_ms() -> u64 { 60_000 }
fn default_output_dir() -> String { "runs".to_string() }

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            base_url: None,
            rpm: default_rpm(),
            tpm: default_tpm(),
        }
    }
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_judge_temperature(),
            max_tokens: default_judge_max_tokens(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            parallel_requests: default_parallel_requests(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            timeout_ms: default_timeout_ms(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from default config location or return defaults
    pub fn load_or_default() -> Self {
        let config_paths = [
            "config/honesty.toml",
            "../config/honesty.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", path);
                        return config;
                    }
                    Err(e) => tracing::warn!("Ignoring configuration at {}: {}", path, e),
                }
            }
        }

        tracing::info!("Using default configuration");
        Self::default()
    }

    /// Save configuration to a TOML file
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Executor settings derived from `[run]`
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            parallel_requests: self.run.parallel_requests.max(1),
            retry_count: self.run.retry_count,
            retry_delay_ms: self.run.retry_delay_ms,
            max_retry_delay_ms: self.run.max_retry_delay_ms,
            timeout_ms: self.run.timeout_ms,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.max_tokens, 256);
        assert_eq!(config.judge.temperature, 0.0);
        assert_eq!(config.judge.max_tokens, 512);
        assert_eq!(config.run.parallel_requests, 3);
        assert_eq!(config.run.output_dir, "runs");
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
[provider]
model = "o3-mini"
max_tokens = 2048

[judge]
model = "gpt-4o"

[run]
parallel_requests = 8
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.provider.model, "o3-mini");
        assert_eq!(config.provider.max_tokens, 2048);
        assert_eq!(config.provider.temperature, 0.2);
        assert_eq!(config.judge.model, "gpt-4o");
        assert_eq!(config.judge.max_tokens, 512);
        assert_eq!(config.run.parallel_requests, 8);
        assert_eq!(config.run.retry_count, 3);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[provider\nmodel = 1").unwrap_err();
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("honesty.toml");

        let mut config = Config::default();
        config.provider.base_url = Some("http://localhost:8000/v1".to_string());
        config.run.timeout_ms = 180_000;
        config.save_toml(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.executor_config().timeout_ms, 180_000);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
