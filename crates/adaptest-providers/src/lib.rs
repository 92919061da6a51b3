//! adaptest-providers: Generative question providers.
//!
//! Implements the `LlmProvider` trait for Anthropic and Ollama, plus a
//! scripted mock for tests, and loads the `adaptest.toml` configuration
//! that decides which provider backs the generative question source.

pub mod anthropic;
pub mod config;
pub mod mock;
pub mod ollama;

pub use adaptest_core::error::ProviderError;
pub use config::{
    create_provider, generative_source, load_config, load_config_from, AdaptestConfig,
    ProviderConfig,
};
