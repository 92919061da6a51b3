//! Core trait definitions for generative providers and question sources.
//!
//! `LlmProvider` is implemented by the `adaptest-providers` crate;
//! `QuestionSource` is implemented by the sources in [`crate::source`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::model::{DifficultyTier, DomainId, Question};

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that write questions from prompts.
///
/// A provider is built once at startup and shared read-only
/// (`Arc<dyn LlmProvider>`) by every session that needs it.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Send one prompt and return the raw reply.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
}

/// Request sent to an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "claude-haiku-4-5-20251001").
    pub model: String,
    /// The user prompt.
    pub prompt: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Raw reply from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The reply text.
    pub content: String,
    /// Model that actually answered.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting for one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ---------------------------------------------------------------------------
// Question source trait
// ---------------------------------------------------------------------------

/// What the engine wants next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub domain_id: DomainId,
    pub tier: DifficultyTier,
    pub topic: String,
    /// Bank ids already asked in this session.
    #[serde(default)]
    pub exclude_ids: Vec<String>,
    /// Seed for any random choice the source makes, drawn from the session RNG.
    #[serde(default)]
    pub seed: u64,
}

/// Resolves a request into a concrete question.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Short name for logs ("bank", "generative", "hybrid").
    fn name(&self) -> &str;

    async fn fetch(&self, request: &QuestionRequest) -> Result<Question, SourceError>;
}

// ---------------------------------------------------------------------------
// Default system prompt
// ---------------------------------------------------------------------------

/// Default system prompt for question-writing providers.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a CISSP exam item writer. Reply ONLY with the requested JSON object. Do not add commentary or markdown formatting.";

// ---------------------------------------------------------------------------
// JSON reply extraction
// ---------------------------------------------------------------------------

/// Pull the JSON object out of an LLM reply.
///
/// Handles:
/// - ```json``` or generic ``` fences (removed)
/// - a sentence of prose before the object (dropped up to the first `{`)
///
/// Anything after the object is left in place so strict parsing rejects it.
pub fn extract_json_object(reply: &str) -> &str {
    let trimmed = reply.trim();
    let unfenced = strip_fences(trimmed);
    let unfenced = unfenced.trim();
    if unfenced.starts_with('{') {
        return unfenced;
    }
    match unfenced.find('{') {
        Some(idx) => &unfenced[idx..],
        None => unfenced,
    }
}

fn strip_fences(s: &str) -> &str {
    let Some(open) = s.find("```") else {
        return s;
    };
    let after_open = &s[open + 3..];
    // Skip the info string ("json") up to the end of the line.
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    match body.rfind("```") {
        Some(close) => &body[..close],
        None => body,
    }
}
