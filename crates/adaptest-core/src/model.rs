//! Core data model types for adaptest.
//!
//! Difficulty tiers, questions, static bank records and the per-session
//! configuration that the UI shell hands to the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::catalog;
use crate::error::SessionError;
use crate::traits::QuestionRequest;

/// Identifier of a catalog domain (1..=8).
pub type DomainId = u8;

/// Explanation used when a bank record does not carry one.
pub const PLACEHOLDER_EXPLANATION: &str = "No explanation was provided for this question.";

/// Difficulty tier of a question, bound to a fixed IRT anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    /// All tiers, easiest first.
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Easy,
        DifficultyTier::Medium,
        DifficultyTier::Hard,
    ];

    /// The θ-scale anchor used as the item difficulty parameter `b`.
    pub fn anchor(self) -> f64 {
        match self {
            DifficultyTier::Easy => -1.5,
            DifficultyTier::Medium => 0.0,
            DifficultyTier::Hard => 1.5,
        }
    }

    /// Display label shown to the learner.
    pub fn label(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Foundational",
            DifficultyTier::Medium => "Applied",
            DifficultyTier::Hard => "Expert",
        }
    }

    /// Guidance text for the generative provider.
    pub fn guidance(self) -> &'static str {
        match self {
            DifficultyTier::Easy => {
                "A basic recall or definition question. The correct answer is clear to anyone who has read the study material."
            }
            DifficultyTier::Medium => {
                "A scenario-based question. Describe a realistic workplace situation and ask what the security professional should do."
            }
            DifficultyTier::Hard => {
                "A complex question with competing priorities or subtle distinctions. Every option should look plausible."
            }
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyTier::Easy => write!(f, "easy"),
            DifficultyTier::Medium => write!(f, "medium"),
            DifficultyTier::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for DifficultyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" | "foundational" => Ok(DifficultyTier::Easy),
            "medium" | "applied" => Ok(DifficultyTier::Medium),
            "hard" | "expert" => Ok(DifficultyTier::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Where a question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Bank,
    Generated,
}

/// A concrete multiple-choice question ready to be asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Domain the question belongs to.
    pub domain_id: DomainId,
    /// Difficulty tier the question was asked at.
    pub tier: DifficultyTier,
    /// Topic within the domain.
    pub topic: String,
    /// The question stem.
    pub prompt: String,
    /// Exactly four answer options, in display order.
    pub options: [String; 4],
    /// Index of the correct option (0..=3).
    pub correct_index: u8,
    /// Why the correct answer is correct.
    pub explanation: String,
    /// Static bank or generative provider.
    pub provenance: Provenance,
    /// Bank record id, for bank questions.
    #[serde(default)]
    pub bank_id: Option<String>,
}

impl Question {
    /// Whether `option` is the correct answer.
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_index as usize
    }

    /// Letter of the correct option (A-D).
    pub fn correct_letter(&self) -> char {
        option_letter(self.correct_index as usize)
    }
}

/// Letter for an option index: 0 -> 'A', 3 -> 'D'.
pub fn option_letter(index: usize) -> char {
    match index {
        0 => 'A',
        1 => 'B',
        2 => 'C',
        3 => 'D',
        _ => '?',
    }
}

/// A record of the static question bank.
///
/// Domain and difficulty are optional; an absent value matches any
/// request and is filled from the request when the record is served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    /// Stable record id (synthesized at load time when absent).
    pub id: String,
    pub question: String,
    pub options: [String; 4],
    pub answer: u8,
    #[serde(default)]
    pub domain: Option<DomainId>,
    #[serde(default)]
    pub difficulty: Option<DifficultyTier>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl BankRecord {
    /// Whether the record belongs to `domain` (records without a domain match any).
    pub fn in_domain(&self, domain: DomainId) -> bool {
        self.domain.is_none_or(|d| d == domain)
    }

    /// Whether the record is at `tier` (records without a difficulty match any).
    pub fn at_tier(&self, tier: DifficultyTier) -> bool {
        self.difficulty.is_none_or(|t| t == tier)
    }

    /// Materialize the record as a question, defaulting absent fields from the request.
    pub fn to_question(&self, request: &QuestionRequest) -> Question {
        Question {
            domain_id: self.domain.unwrap_or(request.domain_id),
            tier: self.difficulty.unwrap_or(request.tier),
            topic: self
                .topic
                .clone()
                .unwrap_or_else(|| request.topic.clone()),
            prompt: self.question.clone(),
            options: self.options.clone(),
            correct_index: self.answer,
            explanation: self
                .explanation
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_EXPLANATION.to_string()),
            provenance: Provenance::Bank,
            bank_id: Some(self.id.clone()),
        }
    }
}

/// Which question sources a session may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Static bank only.
    Offline,
    /// Generative provider only.
    Online,
    /// Static bank first, generative provider when the bank is empty.
    Hybrid,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Offline => write!(f, "offline"),
            SourceMode::Online => write!(f, "online"),
            SourceMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "offline" | "bank" => Ok(SourceMode::Offline),
            "online" | "generate" => Ok(SourceMode::Online),
            "hybrid" => Ok(SourceMode::Hybrid),
            other => Err(format!("unknown source mode: {other}")),
        }
    }
}

/// Inputs for one exam session, supplied by the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Selected domains, in round-robin order.
    pub domains: Vec<DomainId>,
    /// Number of questions that completes the session.
    pub question_count: u32,
    /// Tier whose anchor seeds the ability estimate.
    #[serde(default = "default_starting_tier")]
    pub starting_tier: DifficultyTier,
    /// Countdown in seconds, when the timer is enabled.
    #[serde(default)]
    pub timer_secs: Option<u64>,
    /// Source mode, fixed for the whole session.
    #[serde(default = "default_mode")]
    pub mode: SourceMode,
}

fn default_starting_tier() -> DifficultyTier {
    DifficultyTier::Medium
}

fn default_mode() -> SourceMode {
    SourceMode::Hybrid
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            domains: catalog::DOMAINS.iter().map(|d| d.id).collect(),
            question_count: 25,
            starting_tier: default_starting_tier(),
            timer_secs: Some(3 * 3600),
            mode: default_mode(),
        }
    }
}

impl SessionConfig {
    /// The timer as a duration, when enabled.
    pub fn timer(&self) -> Option<Duration> {
        self.timer_secs.map(Duration::from_secs)
    }

    /// Check the configuration and drop duplicate domains (first occurrence wins).
    pub fn validated(mut self) -> Result<Self, SessionError> {
        if self.domains.is_empty() {
            return Err(SessionError::InvalidConfig(
                "pick at least one domain".into(),
            ));
        }
        if let Some(bad) = self.domains.iter().find(|d| catalog::domain(**d).is_none()) {
            return Err(SessionError::InvalidConfig(format!(
                "unknown domain {bad} (expected 1-{})",
                catalog::DOMAINS.len()
            )));
        }
        let mut seen = Vec::with_capacity(self.domains.len());
        self.domains.retain(|d| {
            if seen.contains(d) {
                false
            } else {
                seen.push(*d);
                true
            }
        });
        if self.question_count == 0 {
            return Err(SessionError::InvalidConfig(
                "question count must be at least 1".into(),
            ));
        }
        if self.timer_secs == Some(0) {
            return Err(SessionError::InvalidConfig(
                "timer duration must be positive".into(),
            ));
        }
        Ok(self)
    }
}
