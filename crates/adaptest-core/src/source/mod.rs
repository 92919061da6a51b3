//! Question sources.

mod bank;
mod generative;
mod hybrid;

use std::sync::Arc;

pub use bank::{FallbackTier, QuestionBank, StaticBankSource};
pub use generative::{
    parse_reply, GenerativeSource, QuestionPrompt, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
};
pub use hybrid::HybridSource;

use crate::error::SourceError;
use crate::model::SourceMode;
use crate::traits::QuestionSource;

/// Assemble the source for a session's mode.
///
/// Offline never touches the generative source, even when one is given.
pub fn build_source(
    mode: SourceMode,
    bank: Arc<QuestionBank>,
    generative: Option<GenerativeSource>,
) -> Result<Box<dyn QuestionSource>, SourceError> {
    let bank = StaticBankSource::new(bank);
    match mode {
        SourceMode::Offline => Ok(Box::new(bank)),
        SourceMode::Online => match generative {
            Some(generative) => Ok(Box::new(generative)),
            None => Err(SourceError::ProviderUnavailable(
                "online mode needs a configured provider".into(),
            )),
        },
        SourceMode::Hybrid => Ok(Box::new(HybridSource::new(bank, generative))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_without_provider_is_unavailable() {
        let err = build_source(SourceMode::Online, Arc::default(), None)
            .err()
            .unwrap();
        assert!(matches!(err, SourceError::ProviderUnavailable(_)));
    }

    #[test]
    fn offline_and_hybrid_build_without_provider() {
        let offline = build_source(SourceMode::Offline, Arc::default(), None).unwrap();
        assert_eq!(offline.name(), "bank");
        let hybrid = build_source(SourceMode::Hybrid, Arc::default(), None).unwrap();
        assert_eq!(hybrid.name(), "hybrid");
    }
}
