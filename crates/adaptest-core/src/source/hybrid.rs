//! Bank first, generation as a last resort.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::model::{Question, SourceMode};
use crate::source::{GenerativeSource, StaticBankSource};
use crate::traits::{QuestionRequest, QuestionSource};

/// Composes the bank and the generative source.
///
/// The bank's last fallback tier admits the whole bank, so any non-empty
/// bank always answers and the generative source is only reached when
/// the bank holds no records at all.
pub struct HybridSource {
    bank: StaticBankSource,
    generative: Option<GenerativeSource>,
}

impl HybridSource {
    pub fn new(bank: StaticBankSource, generative: Option<GenerativeSource>) -> Self {
        Self { bank, generative }
    }
}

#[async_trait]
impl QuestionSource for HybridSource {
    fn name(&self) -> &str {
        "hybrid"
    }

    async fn fetch(&self, request: &QuestionRequest) -> Result<Question, SourceError> {
        if !self.bank.is_empty() {
            return self.bank.fetch(request).await;
        }
        match &self.generative {
            Some(generative) => {
                tracing::debug!("bank is empty, delegating to generative source");
                generative.fetch(request).await
            }
            None => Err(SourceError::EmptyBank {
                mode: SourceMode::Hybrid,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use crate::model::{BankRecord, DifficultyTier, Provenance};
    use crate::source::QuestionBank;
    use crate::traits::{GenerateRequest, GenerateResponse, LlmProvider, TokenUsage};

    struct Counting {
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmProvider for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(GenerateResponse {
                content: r#"{"question":"Generated?","options":["a","b","c","d"],"answer":2,"explanation":"e"}"#.into(),
                model: request.model.clone(),
                token_usage: TokenUsage::default(),
                latency_ms: 0,
            })
        }
    }

    fn request() -> QuestionRequest {
        QuestionRequest {
            domain_id: 7,
            tier: DifficultyTier::Hard,
            topic: "Forensics".into(),
            exclude_ids: vec!["only".into()],
            seed: 0,
        }
    }

    fn bank(records: Vec<BankRecord>) -> StaticBankSource {
        StaticBankSource::new(Arc::new(QuestionBank::new(records)))
    }

    #[tokio::test]
    async fn mismatched_bank_still_starves_generation() {
        let provider = Arc::new(Counting {
            calls: AtomicU32::new(0),
        });
        let generative = GenerativeSource::new(provider.clone(), "m");
        let only = BankRecord {
            id: "only".into(),
            question: "Easy domain 1 question?".into(),
            options: ["a".into(), "b".into(), "c".into(), "d".into()],
            answer: 0,
            domain: Some(1),
            difficulty: Some(DifficultyTier::Easy),
            topic: None,
            explanation: None,
        };
        let hybrid = HybridSource::new(bank(vec![only]), Some(generative));

        let q = hybrid.fetch(&request()).await.unwrap();
        assert_eq!(q.provenance, Provenance::Bank);
        assert_eq!(q.bank_id.as_deref(), Some("only"));
        assert_eq!(provider.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn empty_bank_delegates_to_generation() {
        let provider = Arc::new(Counting {
            calls: AtomicU32::new(0),
        });
        let generative = GenerativeSource::new(provider.clone(), "m");
        let hybrid = HybridSource::new(bank(vec![]), Some(generative));

        let q = hybrid.fetch(&request()).await.unwrap();
        assert_eq!(q.provenance, Provenance::Generated);
        assert_eq!(q.correct_index, 2);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn empty_bank_without_provider_errors() {
        let hybrid = HybridSource::new(bank(vec![]), None);
        let err = hybrid.fetch(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::EmptyBank {
                mode: SourceMode::Hybrid
            }
        ));
    }
}
