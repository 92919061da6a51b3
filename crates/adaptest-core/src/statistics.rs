//! Session aggregation: score, per-tier and per-domain breakdown, trajectory.
//!
//! Everything here is a read-only computation over already collected
//! questions and responses.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::estimator::{AbilityEstimator, AbilityLabel, Tally};
use crate::model::{DifficultyTier, DomainId, Question};

/// Pass probability (percent) at or above which the learner is on track.
pub const PASS_TARGET: u8 = 65;

/// Aggregate view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: u32,
    pub correct: u32,
    /// Rounded percentage of correct answers (0 when nothing was answered).
    pub percent: u32,
    pub by_tier: BTreeMap<DifficultyTier, Tally>,
    /// Answered questions per domain; domains never answered are absent.
    pub by_domain: BTreeMap<DomainId, Tally>,
    /// θ before the first answer, then after every answer.
    pub trajectory: Vec<f64>,
    pub theta: f64,
    pub ability_label: AbilityLabel,
    pub pass_probability: u8,
    pub on_track: bool,
}

/// Build the summary for `questions` against the estimator's history.
///
/// Questions and responses are paired by position; a trailing question
/// without a response (still pending) is ignored.
pub fn summarize(questions: &[Question], estimator: &AbilityEstimator) -> SessionSummary {
    let stats = estimator.stats();

    let mut by_domain: BTreeMap<DomainId, Tally> = BTreeMap::new();
    for (question, response) in questions.iter().zip(estimator.responses()) {
        by_domain
            .entry(question.domain_id)
            .or_default()
            .record(response.correct);
    }

    let pass_probability = estimator.pass_probability();
    SessionSummary {
        total: stats.total,
        correct: stats.correct,
        percent: stats.percent,
        by_tier: stats.by_tier,
        by_domain,
        trajectory: stats.trajectory,
        theta: estimator.theta(),
        ability_label: estimator.ability_label(),
        pass_probability,
        on_track: pass_probability >= PASS_TARGET,
    }
}

/// Which answered questions to list in a review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFilter {
    #[default]
    All,
    CorrectOnly,
    IncorrectOnly,
}

impl ReviewFilter {
    pub fn admits(self, correct: bool) -> bool {
        match self {
            ReviewFilter::All => true,
            ReviewFilter::CorrectOnly => correct,
            ReviewFilter::IncorrectOnly => !correct,
        }
    }
}

impl fmt::Display for ReviewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewFilter::All => write!(f, "all"),
            ReviewFilter::CorrectOnly => write!(f, "correct"),
            ReviewFilter::IncorrectOnly => write!(f, "incorrect"),
        }
    }
}

impl FromStr for ReviewFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ReviewFilter::All),
            "correct" | "correct_only" => Ok(ReviewFilter::CorrectOnly),
            "incorrect" | "incorrect_only" | "wrong" => Ok(ReviewFilter::IncorrectOnly),
            other => Err(format!("unknown review filter: {other}")),
        }
    }
}
