//! Exam session context.
//!
//! One `ExamSession` owns all mutable state of a running exam: the ability
//! estimate, the domain and topic schedulers, and the questions asked so
//! far. Nothing here is shared between sessions; the question source is
//! borrowed per call.

use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::error::SessionError;
use crate::estimator::{AbilityEstimator, AbilityLabel};
use crate::model::{DifficultyTier, Question, SessionConfig};
use crate::policy::next_difficulty;
use crate::report::{ReportItem, SessionReport};
use crate::schedule::{DomainScheduler, TopicRotation};
use crate::statistics::{self, SessionSummary};
use crate::traits::{QuestionRequest, QuestionSource};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The target question count was reached.
    Completed,
    /// The learner stopped early.
    FinishedEarly,
    /// The timer ran out.
    TimedOut,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Completed => write!(f, "completed"),
            Termination::FinishedEarly => write!(f, "finished early"),
            Termination::TimedOut => write!(f, "time expired"),
        }
    }
}

/// Result of answering the pending question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_index: u8,
    /// θ after the update.
    pub theta: f64,
    pub ability_label: AbilityLabel,
    /// Tier the next question will be asked at.
    pub next_tier: DifficultyTier,
}

pub struct ExamSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    started: Instant,
    config: SessionConfig,
    estimator: AbilityEstimator,
    scheduler: DomainScheduler,
    rotation: TopicRotation,
    questions: Vec<Question>,
    selected: Vec<usize>,
    flagged: BTreeSet<usize>,
    termination: Option<Termination>,
    rng: StdRng,
}

impl ExamSession {
    /// Start a session. The configuration is validated first.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Start a session with a seeded topic RNG.
    pub fn with_seed(config: SessionConfig, seed: u64) -> Result<Self, SessionError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SessionConfig, rng: StdRng) -> Result<Self, SessionError> {
        let config = config.validated()?;
        let scheduler = DomainScheduler::new(config.domains.clone())?;
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            started: Instant::now(),
            estimator: AbilityEstimator::new(config.starting_tier),
            scheduler,
            rotation: TopicRotation::new(),
            questions: Vec::new(),
            selected: Vec::new(),
            flagged: BTreeSet::new(),
            termination: None,
            rng,
            config,
        };
        tracing::info!(
            session = %session.id,
            mode = %session.config.mode,
            questions = session.config.question_count,
            domains = ?session.config.domains,
            "exam session started"
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn estimator(&self) -> &AbilityEstimator {
        &self.estimator
    }

    /// Every question asked so far, including a pending one.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Selected option per answered question.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn answered(&self) -> usize {
        self.selected.len()
    }

    /// The question waiting for an answer, if any.
    pub fn pending(&self) -> Option<&Question> {
        self.questions.get(self.selected.len())
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn is_finished(&self) -> bool {
        self.termination.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left on the timer at `now`, when the timer is enabled.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let limit = self.config.timer()?;
        Some(limit.saturating_sub(now.saturating_duration_since(self.started)))
    }

    /// End the session if the timer has run out at `now`. Returns whether
    /// the session timed out.
    pub fn check_deadline(&mut self, now: Instant) -> bool {
        if self.termination.is_some() {
            return self.termination == Some(Termination::TimedOut);
        }
        match self.remaining(now) {
            Some(left) if left.is_zero() => {
                tracing::info!(session = %self.id, "timer expired");
                self.termination = Some(Termination::TimedOut);
                true
            }
            _ => false,
        }
    }

    /// Stop the session before the target count.
    pub fn finish(&mut self) {
        if self.termination.is_none() {
            tracing::info!(session = %self.id, answered = self.answered(), "finished early");
            self.termination = Some(Termination::FinishedEarly);
        }
    }

    /// Flag or unflag the question at `index` for review. Returns the new
    /// state, or `None` when no such question was asked.
    pub fn toggle_flag(&mut self, index: usize) -> Option<bool> {
        if index >= self.questions.len() {
            return None;
        }
        if self.flagged.remove(&index) {
            Some(false)
        } else {
            self.flagged.insert(index);
            Some(true)
        }
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.flagged.contains(&index)
    }

    pub fn flagged(&self) -> impl Iterator<Item = usize> + '_ {
        self.flagged.iter().copied()
    }

    /// The question to show next.
    ///
    /// Returns `None` once the session has ended. The timer is checked
    /// here and only here. A question that was fetched but not yet
    /// answered is returned again instead of fetching a new one.
    pub async fn next_question(
        &mut self,
        source: &dyn QuestionSource,
    ) -> Result<Option<&Question>, SessionError> {
        if self.termination.is_some() || self.check_deadline(Instant::now()) {
            return Ok(None);
        }
        if self.questions.len() > self.selected.len() {
            return Ok(self.questions.last());
        }

        let tier = next_difficulty(self.estimator.responses().len(), self.estimator.theta());
        let domain_id = self.scheduler.next_domain();
        let domain = catalog::domain(domain_id)
            .ok_or_else(|| SessionError::InvalidConfig(format!("unknown domain {domain_id}")))?;
        let topic = self
            .rotation
            .pick(domain.topics, &mut self.rng)
            .unwrap_or_else(|| domain.name.to_string());

        let request = QuestionRequest {
            domain_id,
            tier,
            topic,
            exclude_ids: self
                .questions
                .iter()
                .filter_map(|q| q.bank_id.clone())
                .collect(),
            seed: self.rng.random(),
        };
        tracing::debug!(
            number = self.questions.len() + 1,
            domain = domain_id,
            %tier,
            topic = %request.topic,
            source = source.name(),
            "fetching question"
        );

        let question = source.fetch(&request).await?;
        self.rotation.record(question.topic.clone());
        self.questions.push(question);
        Ok(self.questions.last())
    }

    /// Answer the pending question with option `option` (0-3).
    pub fn answer(&mut self, option: usize) -> Result<AnswerOutcome, SessionError> {
        if self.termination.is_some() {
            return Err(SessionError::Finished);
        }
        if option > 3 {
            return Err(SessionError::OptionOutOfRange(option));
        }
        let question = self
            .questions
            .get(self.selected.len())
            .ok_or(SessionError::NoPendingQuestion)?;

        let correct = question.is_correct(option);
        let correct_index = question.correct_index;
        let theta = self.estimator.update(question.tier, correct);
        self.selected.push(option);

        if self.selected.len() >= self.config.question_count as usize {
            tracing::info!(session = %self.id, theta, "all questions answered");
            self.termination = Some(Termination::Completed);
        }

        Ok(AnswerOutcome {
            correct,
            correct_index,
            theta,
            ability_label: self.estimator.ability_label(),
            next_tier: next_difficulty(self.estimator.responses().len(), theta),
        })
    }

    pub fn summary(&self) -> SessionSummary {
        statistics::summarize(&self.questions, &self.estimator)
    }

    /// Snapshot of the session for saving and rendering.
    pub fn report(&self) -> SessionReport {
        let items = self
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let selected = self.selected.get(i).copied();
                ReportItem {
                    number: i + 1,
                    question: q.clone(),
                    selected,
                    correct: selected.map(|s| q.is_correct(s)),
                    flagged: self.flagged.contains(&i),
                }
            })
            .collect();

        SessionReport {
            id: self.id,
            created_at: self.started_at,
            termination: self.termination,
            elapsed_secs: self.elapsed().as_secs(),
            config: self.config.clone(),
            summary: self.summary(),
            items,
        }
    }
}
