//! Configuration loading and the provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use adaptest_core::error::SourceError;
use adaptest_core::retry::RetryPolicy;
use adaptest_core::source::{GenerativeSource, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use adaptest_core::traits::LlmProvider;

use crate::anthropic::AnthropicProvider;
use crate::ollama::OllamaProvider;

/// Configuration for a single provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Anthropic {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level adaptest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptestConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider backing the generative source.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used for question generation.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Generation attempts per question, including the first.
    #[serde(default = "default_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Token cap for one generated question.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Static bank file or directory.
    #[serde(default)]
    pub bank: Option<PathBuf>,
    /// Output directory for session reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_provider() -> String {
    "anthropic".to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f64 {
    1.0
}
fn default_attempts() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1500
}
fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./adaptest-results")
}

impl Default for AdaptestConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_attempts: default_attempts(),
            retry_delay_ms: default_retry_delay(),
            max_tokens: default_max_tokens(),
            bank: None,
            output_dir: default_output_dir(),
        }
    }
}

impl AdaptestConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `adaptest.toml` in the current directory
/// 2. `~/.config/adaptest/config.toml`
///
/// `ADAPTEST_ANTHROPIC_KEY` overrides the anthropic API key.
pub fn load_config() -> Result<AdaptestConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AdaptestConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("adaptest.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => parse_config(path)?,
        None => AdaptestConfig::default(),
    };
    tracing::debug!(path = ?config_path, "configuration loaded");

    if let Ok(key) = std::env::var("ADAPTEST_ANTHROPIC_KEY") {
        let entry = config
            .providers
            .entry("anthropic".into())
            .or_insert(ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Anthropic { api_key, .. } = entry {
            *api_key = key;
        }
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn parse_config(path: &Path) -> Result<AdaptestConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<AdaptestConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("adaptest"))
}

/// Create a provider instance from its configuration.
///
/// Fails when a required credential is missing or empty.
pub fn create_provider(
    name: &str,
    config: &ProviderConfig,
) -> Result<Arc<dyn LlmProvider>, SourceError> {
    let unavailable = |e: adaptest_core::error::ProviderError| {
        SourceError::ProviderUnavailable(format!("{name}: {e}"))
    };
    match config {
        ProviderConfig::Anthropic { api_key, base_url } => {
            if api_key.trim().is_empty() {
                return Err(SourceError::ProviderUnavailable(format!(
                    "{name}: no API key (set ANTHROPIC_API_KEY or ADAPTEST_ANTHROPIC_KEY)"
                )));
            }
            let provider = AnthropicProvider::new(api_key, base_url.clone()).map_err(unavailable)?;
            Ok(Arc::new(provider))
        }
        ProviderConfig::Ollama { base_url } => {
            let provider = OllamaProvider::new(base_url).map_err(unavailable)?;
            Ok(Arc::new(provider))
        }
    }
}

/// Build the generative source for the configured default provider.
pub fn generative_source(config: &AdaptestConfig) -> Result<GenerativeSource, SourceError> {
    let name = config.default_provider.as_str();
    let provider_config = config.providers.get(name).ok_or_else(|| {
        SourceError::ProviderUnavailable(format!(
            "provider '{name}' is not configured (add [providers.{name}] to adaptest.toml)"
        ))
    })?;
    let provider = create_provider(name, provider_config)?;
    tracing::info!(provider = name, model = %config.default_model, "generative source ready");

    Ok(GenerativeSource::new(provider, config.default_model.clone())
        .with_policy(config.retry_policy())
        .with_max_tokens(config.max_tokens)
        .with_temperature(config.temperature))
}
