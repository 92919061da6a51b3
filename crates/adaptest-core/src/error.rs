//! Error types for question sourcing and exam sessions.
//!
//! `ProviderError` is the transport-level failure raised by generative
//! provider implementations. `SourceError` is what crosses the question
//! source boundary: transient provider and validation failures are
//! absorbed by the retry loop, and only exhaustion escapes.

use thiserror::Error;

use crate::model::SourceMode;

/// Errors that can occur when talking to a generative provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Errors surfaced by a question source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A generated reply failed the schema checks.
    #[error("invalid generated question: {0}")]
    Validation(String),

    /// The generative provider could not be constructed.
    #[error("question provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Every generation attempt failed.
    #[error("could not generate question after {attempts} attempts. Last error: {last_error}")]
    ExhaustedRetries { attempts: u32, last_error: String },

    /// The static bank has nothing to serve.
    #[error("question bank is empty ({mode} mode)\n\nSuggestion: load a bank file with --bank, or switch to online mode")]
    EmptyBank { mode: SourceMode },
}

/// Errors raised by an exam session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session configuration was rejected.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),

    /// `answer` was called with no unanswered question.
    #[error("no question is waiting for an answer")]
    NoPendingQuestion,

    /// Options are 0..=3.
    #[error("answer option {0} is out of range (expected 0-3)")]
    OptionOutOfRange(usize),

    /// The session has already terminated.
    #[error("the session has already finished")]
    Finished,

    /// Fetching the next question failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}
