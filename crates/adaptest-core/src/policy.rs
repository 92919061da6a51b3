//! Difficulty selection policy.
//!
//! A stateless function of the response count and θ. The ±0.8 cut points
//! have no hysteresis band, so θ hovering near a cut point can flip the
//! tier on consecutive questions.

use crate::model::DifficultyTier;

/// Responses needed before the policy starts adapting.
pub const WARM_UP_RESPONSES: usize = 2;
/// θ at or above which items are hard.
pub const HARD_THRESHOLD: f64 = 0.8;
/// θ at or below which items are easy.
pub const EASY_THRESHOLD: f64 = -0.8;

/// Tier for the next item.
pub fn next_difficulty(response_count: usize, theta: f64) -> DifficultyTier {
    if response_count < WARM_UP_RESPONSES {
        return DifficultyTier::Medium;
    }
    if theta >= HARD_THRESHOLD {
        DifficultyTier::Hard
    } else if theta <= EASY_THRESHOLD {
        DifficultyTier::Easy
    } else {
        DifficultyTier::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warm_up_is_medium() {
        assert_eq!(next_difficulty(0, -2.9), DifficultyTier::Medium);
        assert_eq!(next_difficulty(1, 2.9), DifficultyTier::Medium);
    }

    #[test]
    fn adapts_after_warm_up() {
        assert_eq!(next_difficulty(2, 0.8), DifficultyTier::Hard);
        assert_eq!(next_difficulty(2, 0.79), DifficultyTier::Medium);
        assert_eq!(next_difficulty(5, -0.8), DifficultyTier::Easy);
        assert_eq!(next_difficulty(5, -0.79), DifficultyTier::Medium);
    }

    #[test]
    fn no_hysteresis_at_boundary() {
        assert_eq!(next_difficulty(10, 0.81), DifficultyTier::Hard);
        assert_eq!(next_difficulty(11, 0.79), DifficultyTier::Medium);
        assert_eq!(next_difficulty(12, 0.81), DifficultyTier::Hard);
    }
}
