//! 3PL ability estimation.
//!
//! θ is nudged once per answer by a surprise-weighted step: a correct
//! answer moves it up by `STEP * (1 - p)`, an incorrect one down by
//! `STEP * p`, where `p` is the 3PL success probability for the item's
//! tier anchor. O(1) per answer and no item statistics are stored; this
//! is not an iterative maximum-likelihood estimate.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::DifficultyTier;

/// Item discrimination `a`.
pub const DISCRIMINATION: f64 = 1.2;
/// Pseudo-guessing floor `c` for a four-option item.
pub const GUESSING: f64 = 0.25;
/// Learning rate of the θ update.
pub const STEP: f64 = 0.4;
pub const THETA_MIN: f64 = -3.0;
pub const THETA_MAX: f64 = 3.0;

/// Baseline that every trajectory starts from, independent of the starting θ.
pub const TRAJECTORY_BASELINE: f64 = 0.0;

/// One answered item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub tier: DifficultyTier,
    pub correct: bool,
    /// θ after this response was applied.
    pub theta: f64,
}

/// 3PL success probability for ability `theta` on an item of difficulty `b`.
pub fn probability(theta: f64, b: f64, a: f64, c: f64) -> f64 {
    c + (1.0 - c) / (1.0 + (-a * (theta - b)).exp())
}

/// Heuristic pass probability in percent, never reporting certainty.
pub fn pass_probability(theta: f64) -> u8 {
    (50.0 + 20.0 * theta).round_ties_even().clamp(5.0, 97.0) as u8
}

/// Ability bucket for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbilityLabel {
    Foundational,
    Developing,
    Competent,
    Proficient,
    Expert,
}

impl AbilityLabel {
    pub fn from_theta(theta: f64) -> Self {
        if theta >= 1.5 {
            AbilityLabel::Expert
        } else if theta >= 0.7 {
            AbilityLabel::Proficient
        } else if theta >= -0.3 {
            AbilityLabel::Competent
        } else if theta >= -1.2 {
            AbilityLabel::Developing
        } else {
            AbilityLabel::Foundational
        }
    }
}

impl fmt::Display for AbilityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AbilityLabel::Foundational => "Foundational",
            AbilityLabel::Developing => "Developing",
            AbilityLabel::Competent => "Competent",
            AbilityLabel::Proficient => "Proficient",
            AbilityLabel::Expert => "Expert",
        };
        f.write_str(s)
    }
}

/// Correct/total counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Rounded percentage, 0 when empty.
    pub fn percent(&self) -> u32 {
        percent(self.correct, self.total)
    }
}

pub(crate) fn percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        (correct as f64 / total as f64 * 100.0).round_ties_even() as u32
    }
}

/// Snapshot of the response history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityStats {
    pub total: u32,
    pub correct: u32,
    pub percent: u32,
    /// Always holds all three tiers.
    pub by_tier: BTreeMap<DifficultyTier, Tally>,
    /// Baseline 0.0 followed by θ after each response.
    pub trajectory: Vec<f64>,
}

/// Running ability estimate for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityEstimator {
    theta: f64,
    responses: Vec<ResponseRecord>,
}

impl AbilityEstimator {
    /// Start at the anchor of `starting_tier`.
    pub fn new(starting_tier: DifficultyTier) -> Self {
        Self::with_theta(starting_tier.anchor())
    }

    pub fn with_theta(theta: f64) -> Self {
        Self {
            theta: theta.clamp(THETA_MIN, THETA_MAX),
            responses: Vec::new(),
        }
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn responses(&self) -> &[ResponseRecord] {
        &self.responses
    }

    /// Success probability for an item of difficulty `b` at the current θ.
    pub fn probability(&self, b: f64) -> f64 {
        probability(self.theta, b, DISCRIMINATION, GUESSING)
    }

    /// Apply one answer and return the new θ.
    pub fn update(&mut self, tier: DifficultyTier, correct: bool) -> f64 {
        let p = self.probability(tier.anchor());
        let step = if correct { STEP * (1.0 - p) } else { -STEP * p };
        self.theta = (self.theta + step).clamp(THETA_MIN, THETA_MAX);
        self.responses.push(ResponseRecord {
            tier,
            correct,
            theta: self.theta,
        });
        tracing::debug!(%tier, correct, p, theta = self.theta, "ability updated");
        self.theta
    }

    pub fn ability_label(&self) -> AbilityLabel {
        AbilityLabel::from_theta(self.theta)
    }

    pub fn pass_probability(&self) -> u8 {
        pass_probability(self.theta)
    }

    pub fn stats(&self) -> AbilityStats {
        let mut by_tier: BTreeMap<DifficultyTier, Tally> = DifficultyTier::ALL
            .iter()
            .map(|t| (*t, Tally::default()))
            .collect();
        let mut correct = 0u32;
        for r in &self.responses {
            by_tier.entry(r.tier).or_default().record(r.correct);
            if r.correct {
                correct += 1;
            }
        }
        let total = self.responses.len() as u32;

        let trajectory = std::iter::once(TRAJECTORY_BASELINE)
            .chain(self.responses.iter().map(|r| r.theta))
            .collect();

        AbilityStats {
            total,
            correct,
            percent: percent(correct, total),
            by_tier,
            trajectory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn probability_at_anchor_is_midpoint() {
        let est = AbilityEstimator::with_theta(0.0);
        assert!(close(est.probability(0.0), 0.625));
    }

    #[test]
    fn probability_monotonic_and_bounded() {
        for b in [-1.5, 0.0, 1.5] {
            let mut prev = 0.0;
            let mut theta = -3.0;
            while theta <= 3.0 {
                let p = probability(theta, b, DISCRIMINATION, GUESSING);
                assert!(p > 0.25 && p < 1.0, "p={p} out of bounds at θ={theta}");
                assert!(p > prev, "not increasing at θ={theta}");
                prev = p;
                theta += 0.05;
            }
        }
    }

    #[test]
    fn correct_medium_from_zero() {
        let mut est = AbilityEstimator::new(DifficultyTier::Medium);
        let theta = est.update(DifficultyTier::Medium, true);
        assert!(close(theta, 0.15), "got {theta}");
    }

    #[test]
    fn incorrect_medium_from_zero() {
        let mut est = AbilityEstimator::new(DifficultyTier::Medium);
        let theta = est.update(DifficultyTier::Medium, false);
        assert!(close(theta, -0.25), "got {theta}");
    }

    #[test]
    fn theta_clamped_under_mixed_sequences() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(2024);
        // Bias from mostly wrong to mostly right so runs hit both bounds.
        for bias in [0.05, 0.3, 0.5, 0.7, 0.95] {
            let start = rng.random_range(THETA_MIN..=THETA_MAX);
            let mut est = AbilityEstimator::with_theta(start);
            for step in 0..400 {
                let tier = DifficultyTier::ALL[rng.random_range(0..3)];
                let correct = rng.random_bool(bias);
                let theta = est.update(tier, correct);
                assert!(
                    (THETA_MIN..=THETA_MAX).contains(&theta),
                    "θ={theta} after step {step} (bias {bias})"
                );
                assert_eq!(theta, est.theta());
            }
            assert_eq!(est.responses().len(), 400);
            assert!(est
                .stats()
                .trajectory
                .iter()
                .all(|t| (THETA_MIN..=THETA_MAX).contains(t)));
        }
    }

    #[test]
    fn theta_stays_clamped() {
        let mut est = AbilityEstimator::with_theta(2.95);
        for _ in 0..50 {
            est.update(DifficultyTier::Easy, true);
            assert!(est.theta() <= THETA_MAX);
        }
        let mut est = AbilityEstimator::with_theta(-2.95);
        for _ in 0..50 {
            est.update(DifficultyTier::Hard, false);
            assert!(est.theta() >= THETA_MIN);
        }
        assert_eq!(est.responses().len(), 50);
    }

    #[test]
    fn five_correct_climb_to_proficient() {
        let mut est = AbilityEstimator::new(DifficultyTier::Medium);
        assert_eq!(est.ability_label(), AbilityLabel::Competent);
        let mut prev = est.theta();
        let mut crossed = false;
        // Five answers land near 0.63; the sixth crosses 0.7.
        for i in 0..6 {
            let theta = est.update(DifficultyTier::Medium, true);
            assert!(theta > prev && theta < 3.0);
            if i == 4 {
                assert!(theta < 0.7, "θ after five answers: {theta}");
            }
            let label = est.ability_label();
            if theta >= 0.7 {
                assert_eq!(label, AbilityLabel::Proficient);
                crossed = true;
            } else {
                assert_eq!(label, AbilityLabel::Competent);
            }
            prev = theta;
        }
        assert!(crossed, "θ={prev} never crossed 0.7");
    }

    #[test]
    fn labels_by_threshold() {
        assert_eq!(AbilityLabel::from_theta(1.5), AbilityLabel::Expert);
        assert_eq!(AbilityLabel::from_theta(0.7), AbilityLabel::Proficient);
        assert_eq!(AbilityLabel::from_theta(-0.3), AbilityLabel::Competent);
        assert_eq!(AbilityLabel::from_theta(-1.2), AbilityLabel::Developing);
        assert_eq!(AbilityLabel::from_theta(-1.21), AbilityLabel::Foundational);
    }

    #[test]
    fn pass_probability_clamps() {
        assert_eq!(pass_probability(0.0), 50);
        assert_eq!(pass_probability(1.0), 70);
        assert_eq!(pass_probability(3.0), 97);
        assert_eq!(pass_probability(-3.0), 5);
    }

    #[test]
    fn stats_trajectory_starts_at_fixed_baseline() {
        let mut est = AbilityEstimator::new(DifficultyTier::Hard);
        assert_eq!(est.theta(), 1.5);
        est.update(DifficultyTier::Medium, true);
        est.update(DifficultyTier::Hard, false);

        let stats = est.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.correct, 1);
        assert_eq!(stats.percent, 50);
        assert_eq!(stats.trajectory.len(), 3);
        assert_eq!(stats.trajectory[0], 0.0);
        assert_eq!(stats.trajectory[2], est.theta());
        assert_eq!(stats.by_tier[&DifficultyTier::Easy], Tally::default());
        assert_eq!(
            stats.by_tier[&DifficultyTier::Hard],
            Tally {
                correct: 0,
                total: 1
            }
        );
    }

    #[test]
    fn empty_stats() {
        let stats = AbilityEstimator::new(DifficultyTier::Medium).stats();
        assert_eq!(stats.percent, 0);
        assert_eq!(stats.trajectory, vec![0.0]);
        assert_eq!(stats.by_tier.len(), 3);
    }
}
