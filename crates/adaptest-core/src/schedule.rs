//! Domain round robin and topic rotation.

use std::collections::VecDeque;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::DomainId;

/// Number of recently used topics excluded from reselection.
pub const TOPIC_WINDOW: usize = 4;

/// Deterministic round robin over the selected domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainScheduler {
    domains: Vec<DomainId>,
    counter: usize,
}

impl DomainScheduler {
    pub fn new(domains: Vec<DomainId>) -> Result<Self, SessionError> {
        if domains.is_empty() {
            return Err(SessionError::InvalidConfig(
                "pick at least one domain".into(),
            ));
        }
        Ok(Self {
            domains,
            counter: 0,
        })
    }

    /// The next domain; advances the counter.
    pub fn next_domain(&mut self) -> DomainId {
        let domain = self.domains[self.counter % self.domains.len()];
        self.counter += 1;
        domain
    }
}

/// Sliding window over the most recently used topics, global across domains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRotation {
    recent: VecDeque<String>,
}

impl TopicRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a used topic, evicting the oldest beyond the window.
    pub fn record(&mut self, topic: impl Into<String>) {
        self.recent.push_back(topic.into());
        while self.recent.len() > TOPIC_WINDOW {
            self.recent.pop_front();
        }
    }

    /// Topics currently excluded, oldest first.
    pub fn window(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    /// Topics of `topics` outside the window, or all of them if none are.
    pub fn candidates<'a>(&self, topics: &[&'a str]) -> Vec<&'a str> {
        let pool: Vec<&str> = topics
            .iter()
            .copied()
            .filter(|t| !self.recent.iter().any(|r| r == t))
            .collect();
        if pool.is_empty() {
            topics.to_vec()
        } else {
            pool
        }
    }

    /// Pick a topic uniformly from the candidates; `None` only for an empty topic list.
    pub fn pick<R: Rng + ?Sized>(&self, topics: &[&str], rng: &mut R) -> Option<String> {
        self.candidates(topics)
            .choose(rng)
            .map(|t| (*t).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn round_robin_visits_domains_evenly() {
        let mut sched = DomainScheduler::new(vec![2, 5, 7]).unwrap();
        let picks: Vec<DomainId> = (0..9).map(|_| sched.next_domain()).collect();
        assert_eq!(picks, vec![2, 5, 7, 2, 5, 7, 2, 5, 7]);
    }

    #[test]
    fn scheduler_rejects_empty() {
        assert!(DomainScheduler::new(vec![]).is_err());
    }

    #[test]
    fn window_keeps_last_four() {
        let mut rot = TopicRotation::new();
        for t in ["a", "b", "c", "d", "e", "f"] {
            rot.record(t);
        }
        let window: Vec<&str> = rot.window().collect();
        assert_eq!(window, vec!["c", "d", "e", "f"]);
    }

    #[test]
    fn full_window_leaves_remaining_topics() {
        let topics = ["t1", "t2", "t3", "t4", "t5", "t6", "t7", "t8"];
        let mut rot = TopicRotation::new();
        for t in ["t1", "t3", "t5", "t7"] {
            rot.record(t);
        }
        let pool = rot.candidates(&topics);
        assert_eq!(pool, vec!["t2", "t4", "t6", "t8"]);
    }

    #[test]
    fn exhausted_domain_falls_back_to_all_topics() {
        let topics = ["w", "x", "y", "z"];
        let mut rot = TopicRotation::new();
        for t in topics {
            rot.record(t);
        }
        assert_eq!(rot.candidates(&topics), topics.to_vec());

        let mut rng = StdRng::seed_from_u64(7);
        let picked = rot.pick(&topics, &mut rng).unwrap();
        assert!(topics.contains(&picked.as_str()));
    }

    #[test]
    fn pick_never_returns_recent_topic_when_alternatives_exist() {
        let topics = ["a", "b", "c", "d", "e"];
        let mut rot = TopicRotation::new();
        for t in ["a", "b", "c", "d"] {
            rot.record(t);
        }
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(rot.pick(&topics, &mut rng).as_deref(), Some("e"));
        }
    }

    #[test]
    fn window_is_global_across_domains() {
        let mut rot = TopicRotation::new();
        rot.record("VPN");
        let pool = rot.candidates(&["VPN", "TLS"]);
        assert_eq!(pool, vec!["TLS"]);
        assert!(rot.pick(&[], &mut StdRng::seed_from_u64(1)).is_none());
    }
}
