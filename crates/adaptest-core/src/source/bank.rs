//! Static question bank source.
//!
//! Records are searched through an ordered chain of filters and the first
//! non-empty pool wins:
//!
//! 1. exact domain and difficulty, unused ids
//! 2. same domain, any difficulty, unused ids
//! 3. any domain, unused ids
//! 4. the whole bank, repeats allowed
//!
//! Selection within the pool is uniform.

use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::error::SourceError;
use crate::model::{BankRecord, Question, SourceMode};
use crate::traits::{QuestionRequest, QuestionSource};

/// The loaded, immutable bank. Shared read-only across sessions.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    records: Vec<BankRecord>,
}

impl QuestionBank {
    pub fn new(records: Vec<BankRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[BankRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One step of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTier {
    ExactMatch,
    SameDomain,
    AnyDomain,
    Repeat,
}

impl FallbackTier {
    /// The chain, in evaluation order.
    pub const CHAIN: [FallbackTier; 4] = [
        FallbackTier::ExactMatch,
        FallbackTier::SameDomain,
        FallbackTier::AnyDomain,
        FallbackTier::Repeat,
    ];

    /// Whether `record` belongs to this tier's pool for `request`.
    pub fn admits(self, record: &BankRecord, request: &QuestionRequest) -> bool {
        let unused = !request.exclude_ids.iter().any(|id| *id == record.id);
        match self {
            FallbackTier::ExactMatch => {
                unused && record.in_domain(request.domain_id) && record.at_tier(request.tier)
            }
            FallbackTier::SameDomain => unused && record.in_domain(request.domain_id),
            FallbackTier::AnyDomain => unused,
            FallbackTier::Repeat => true,
        }
    }
}

/// Serves questions from a [`QuestionBank`].
#[derive(Debug, Clone)]
pub struct StaticBankSource {
    bank: Arc<QuestionBank>,
}

impl StaticBankSource {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn is_empty(&self) -> bool {
        self.bank.is_empty()
    }

    /// The first non-empty pool of the chain, with the tier that produced it.
    pub fn candidates(&self, request: &QuestionRequest) -> Option<(FallbackTier, Vec<&BankRecord>)> {
        FallbackTier::CHAIN.iter().find_map(|tier| {
            let pool: Vec<&BankRecord> = self
                .bank
                .records()
                .iter()
                .filter(|r| tier.admits(r, request))
                .collect();
            (!pool.is_empty()).then_some((*tier, pool))
        })
    }

    /// Pick one record with the given RNG.
    pub fn select_with<R: Rng + ?Sized>(
        &self,
        request: &QuestionRequest,
        rng: &mut R,
    ) -> Option<(FallbackTier, &BankRecord)> {
        let (tier, pool) = self.candidates(request)?;
        pool.choose(rng).map(|r| (tier, *r))
    }
}

#[async_trait]
impl QuestionSource for StaticBankSource {
    fn name(&self) -> &str {
        "bank"
    }

    async fn fetch(&self, request: &QuestionRequest) -> Result<Question, SourceError> {
        let mut rng = StdRng::seed_from_u64(request.seed);
        let selected = self.select_with(request, &mut rng);
        let Some((tier, record)) = selected else {
            return Err(SourceError::EmptyBank {
                mode: SourceMode::Offline,
            });
        };
        tracing::debug!(
            id = %record.id,
            fallback = ?tier,
            domain = request.domain_id,
            difficulty = %request.tier,
            "bank question selected"
        );
        Ok(record.to_question(request))
    }
}
