//! Generative question source.
//!
//! Builds a structured prompt, calls the shared provider, and validates
//! the reply strictly. Any failure on an attempt (transport, malformed
//! JSON, schema violation) is retried under the source's [`RetryPolicy`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog;
use crate::error::SourceError;
use crate::model::{DifficultyTier, Provenance, Question};
use crate::retry::RetryPolicy;
use crate::traits::{
    extract_json_object, GenerateRequest, LlmProvider, QuestionRequest, QuestionSource,
    DEFAULT_SYSTEM_PROMPT,
};

pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const DEFAULT_MAX_TOKENS: u32 = 600;
const DEFAULT_TEMPERATURE: f64 = 1.0;

/// The structured generation request before it is rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionPrompt {
    pub domain_name: String,
    pub topic: String,
    pub tier: DifficultyTier,
}

impl QuestionPrompt {
    pub fn render(&self) -> String {
        format!(
            "Write one CISSP exam question.\n\
             Domain: {domain}\n\
             Topic: {topic}\n\
             Difficulty: {tier} ({label}): {guidance}\n\n\
             Rules:\n\
             - exactly 4 options\n\
             - use qualifiers such as BEST / MOST / FIRST where appropriate\n\
             - all wrong options must be plausible\n\
             - answer = 0-based index of the correct option (0, 1, 2 or 3)\n\
             - explanation = 2-5 sentences: why the answer is correct and why the others are wrong\n\n\
             Reply with ONLY this JSON and nothing else:\n\
             {{\"question\":\"...\",\"options\":[\"A\",\"B\",\"C\",\"D\"],\"answer\":0,\"explanation\":\"...\",\"topic\":\"{topic}\"}}",
            domain = self.domain_name,
            topic = self.topic,
            tier = self.tier,
            label = self.tier.label(),
            guidance = self.tier.guidance(),
        )
    }
}

/// Asks a generative provider to write each question.
pub struct GenerativeSource {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    temperature: f64,
    policy: RetryPolicy,
}

impl GenerativeSource {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Build the provider request for `request`.
    pub fn build_request(&self, request: &QuestionRequest) -> Result<GenerateRequest, SourceError> {
        let domain = catalog::domain(request.domain_id).ok_or_else(|| {
            SourceError::Validation(format!("unknown domain {}", request.domain_id))
        })?;
        let prompt = QuestionPrompt {
            domain_name: domain.name.to_string(),
            topic: request.topic.clone(),
            tier: request.tier,
        };
        Ok(GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.render(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        })
    }
}

/// Validate a raw reply and turn it into a question.
pub fn parse_reply(reply: &str, request: &QuestionRequest) -> Result<Question, SourceError> {
    let invalid = |msg: &str| SourceError::Validation(msg.to_string());

    let json = extract_json_object(reply);
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SourceError::Validation(format!("malformed JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| invalid("reply is not a JSON object"))?;

    for field in ["question", "options", "answer", "explanation"] {
        if !obj.contains_key(field) {
            return Err(SourceError::Validation(format!("missing {field}")));
        }
    }

    let prompt = obj["question"]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| invalid("question must be a non-empty string"))?;

    let options = obj["options"]
        .as_array()
        .ok_or_else(|| invalid("options must be an array"))?;
    if options.len() != 4 {
        return Err(SourceError::Validation(format!(
            "need exactly 4 options, got {}",
            options.len()
        )));
    }
    let options: Vec<String> = options
        .iter()
        .map(|o| o.as_str().map(str::to_string))
        .collect::<Option<_>>()
        .ok_or_else(|| invalid("options must be strings"))?;
    let options: [String; 4] = options
        .try_into()
        .map_err(|_| invalid("need exactly 4 options"))?;

    let answer = obj["answer"]
        .as_u64()
        .filter(|a| *a <= 3)
        .ok_or_else(|| invalid("answer must be 0-3"))?;

    let explanation = obj["explanation"]
        .as_str()
        .ok_or_else(|| invalid("explanation must be a string"))?;

    let topic = obj
        .get("topic")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&request.topic);

    Ok(Question {
        domain_id: request.domain_id,
        tier: request.tier,
        topic: topic.to_string(),
        prompt: prompt.to_string(),
        options,
        correct_index: answer as u8,
        explanation: explanation.to_string(),
        provenance: Provenance::Generated,
        bank_id: None,
    })
}

#[async_trait]
impl QuestionSource for GenerativeSource {
    fn name(&self) -> &str {
        "generative"
    }

    async fn fetch(&self, request: &QuestionRequest) -> Result<Question, SourceError> {
        let generate = self.build_request(request)?;
        let generate = &generate;

        self.policy
            .run(|attempt| async move {
                tracing::debug!(
                    attempt,
                    provider = self.provider.name(),
                    topic = %request.topic,
                    "requesting generated question"
                );
                let response = self.provider.generate(generate).await?;
                tracing::debug!(
                    model = %response.model,
                    tokens = response.token_usage.total_tokens,
                    latency_ms = response.latency_ms,
                    "provider replied"
                );
                Ok::<_, anyhow::Error>(parse_reply(&response.content, request)?)
            })
            .await
    }
}
