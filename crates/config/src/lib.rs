//! Configuration loading, validation, and management for Ragline.
//!
//! Loads configuration from `~/.ragline/config.toml` with environment
//! variable overrides. Validates all settings at startup. Everything here
//! is read-only after load — the pipeline never inspects the environment
//! itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Provider priority order. The first entry with a credential becomes the
/// primary provider for every request.
pub const PROVIDER_PRIORITY: &[&str] = &["groq", "huggingface"];

/// The root configuration structure.
///
/// Maps directly to `~/.ragline/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct RaglineConfig {
    /// Model identifier for the comparison branch, if comparison mode is
    /// ever requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_model: Option<String>,

    /// Document chunking thresholds
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Chat pipeline tuning
    #[serde(default)]
    pub chat: ChatConfig,

    /// Provider-specific configurations, keyed by provider id
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for RaglineConfig {
    fn default() -> Self {
        Self {
            comparison_model: None,
            chunking: ChunkingConfig::default(),
            chat: ChatConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Per-provider settings. API keys are the capability signal: a provider
/// with no key is simply not registered.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override the endpoint base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Override the model used when the caller does not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl ProviderConfig {
    /// Whether this provider has a usable credential.
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl std::fmt::Debug for RaglineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaglineConfig")
            .field("comparison_model", &self.comparison_model)
            .field("chunking", &self.chunking)
            .field("chat", &self.chat)
            .field("providers", &self.providers)
            .finish()
    }
}

/// Chunking thresholds. `min_chunk_len` is the canonical interactive-upload
/// minimum; `bulk_min_chunk_len` is the looser bulk-ingestion override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    #[serde(default = "default_min_chunk_len")]
    pub min_chunk_len: usize,

    #[serde(default = "default_bulk_min_chunk_len")]
    pub bulk_min_chunk_len: usize,
}

fn default_max_chunk_size() -> usize {
    1000
}
fn default_min_chunk_len() -> usize {
    50
}
fn default_bulk_min_chunk_len() -> usize {
    20
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            min_chunk_len: default_min_chunk_len(),
            bulk_min_chunk_len: default_bulk_min_chunk_len(),
        }
    }
}

/// Chat pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// How many trailing history messages feed a provider call
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// How many snippets the retriever asks for per turn
    #[serde(default = "default_retrieval_limit")]
    pub retrieval_limit: usize,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Bound on every external provider call
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

fn default_window_size() -> usize {
    20
}
fn default_retrieval_limit() -> usize {
    5
}
fn default_max_tokens() -> u32 {
    1500
}
fn default_temperature() -> f32 {
    0.7
}
fn default_call_timeout_secs() -> u64 {
    120
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            retrieval_limit: default_retrieval_limit(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl RaglineConfig {
    /// Load configuration from the default location with environment
    /// variable overrides:
    /// - `GROQ_API_KEY`, `HUGGINGFACE_API_KEY` fill provider credentials
    /// - `RAGLINE_COMPARISON_MODEL` (or `COMPARISON_MODEL`) sets the
    ///   comparison model
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        for (provider, var) in [("groq", "GROQ_API_KEY"), ("huggingface", "HUGGINGFACE_API_KEY")] {
            if let Ok(key) = std::env::var(var) {
                let entry = config.providers.entry(provider.to_string()).or_default();
                if entry.api_key.is_none() {
                    entry.api_key = Some(key);
                }
            }
        }

        if config.comparison_model.is_none() {
            config.comparison_model = std::env::var("RAGLINE_COMPARISON_MODEL")
                .ok()
                .or_else(|| std::env::var("COMPARISON_MODEL").ok());
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// The configuration directory (`~/.ragline`).
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ragline")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.chat.temperature < 0.0 || self.chat.temperature > 2.0 {
            return Err(ConfigError::Validation(
                "chat.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.chat.window_size == 0 {
            return Err(ConfigError::Validation(
                "chat.window_size must be at least 1".into(),
            ));
        }
        if self.chunking.max_chunk_size == 0 {
            return Err(ConfigError::Validation(
                "chunking.max_chunk_size must be at least 1".into(),
            ));
        }
        if self.chunking.min_chunk_len > self.chunking.max_chunk_size {
            return Err(ConfigError::Validation(
                "chunking.min_chunk_len cannot exceed chunking.max_chunk_size".into(),
            ));
        }
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = RaglineConfig::default();
        assert_eq!(config.chunking.max_chunk_size, 1000);
        assert_eq!(config.chunking.min_chunk_len, 50);
        assert_eq!(config.chunking.bulk_min_chunk_len, 20);
        assert_eq!(config.chat.window_size, 20);
        assert_eq!(config.chat.retrieval_limit, 5);
        assert_eq!(config.chat.max_tokens, 1500);
        config.validate().unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = RaglineConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert!(config.providers.is_empty());
    }

    #[test]
    fn parses_provider_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
comparison_model = "meta-llama/Llama-3.3-70B-Instruct"

[providers.groq]
api_key = "gsk-test"

[providers.huggingface]
api_key = "hf-test"
default_model = "meta-llama/Llama-3.1-8B-Instruct"

[chat]
window_size = 10
"#
        )
        .unwrap();

        let config = RaglineConfig::load_from(file.path()).unwrap();
        assert!(config.providers["groq"].has_credential());
        assert_eq!(
            config.providers["huggingface"].default_model.as_deref(),
            Some("meta-llama/Llama-3.1-8B-Instruct")
        );
        assert_eq!(config.chat.window_size, 10);
        assert_eq!(
            config.comparison_model.as_deref(),
            Some("meta-llama/Llama-3.3-70B-Instruct")
        );
    }

    #[test]
    fn rejects_invalid_temperature() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chat]\ntemperature = 5.0").unwrap();
        let err = RaglineConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn blank_credential_does_not_count() {
        let config = ProviderConfig {
            api_key: Some("   ".into()),
            api_url: None,
            default_model: None,
        };
        assert!(!config.has_credential());
    }

    #[test]
    fn debug_redacts_api_keys() {
        let config = ProviderConfig {
            api_key: Some("gsk-secret".into()),
            api_url: None,
            default_model: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("gsk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
