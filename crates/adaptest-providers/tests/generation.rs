use std::sync::Arc;
use std::time::Duration;

use adaptest_core::error::{SessionError, SourceError};
use adaptest_core::model::{DifficultyTier, Provenance, SessionConfig, SourceMode};
use adaptest_core::retry::RetryPolicy;
use adaptest_core::session::{ExamSession, Termination};
use adaptest_core::source::{build_source, GenerativeSource, QuestionBank, DEFAULT_MODEL};
use adaptest_core::traits::{QuestionRequest, QuestionSource};
use adaptest_providers::mock::MockProvider;
use adaptest_providers::ProviderError;

const VALID: &str = r#"```json
{"question": "Which document is developed FIRST in business continuity planning?",
 "options": ["BIA", "DRP", "Policy statement", "Test plan"],
 "answer": 2,
 "explanation": "Senior management's policy statement comes first. The BIA follows it."}
```"#;

fn request() -> QuestionRequest {
    QuestionRequest {
        domain_id: 1,
        tier: DifficultyTier::Medium,
        topic: "business continuity".into(),
        exclude_ids: vec![],
        seed: 0,
    }
}

#[tokio::test(start_paused = true)]
async fn transient_errors_are_absorbed() {
    let provider = Arc::new(MockProvider::scripted([
        Err(ProviderError::RateLimited {
            retry_after_ms: 5000,
        }),
        Ok("I cannot help with that.".to_string()),
        Ok(VALID.to_string()),
    ]));
    let source = GenerativeSource::new(provider.clone(), DEFAULT_MODEL);

    let question = source.fetch(&request()).await.unwrap();
    assert_eq!(question.correct_index, 2);
    assert_eq!(question.topic, "business continuity");
    assert_eq!(question.provenance, Provenance::Generated);
    assert_eq!(provider.call_count(), 3);

    let sent = provider.last_request().unwrap();
    assert_eq!(sent.model, DEFAULT_MODEL);
    assert!(sent.prompt.contains("Security & Risk Management"));
}

#[tokio::test(start_paused = true)]
async fn exhaustion_reports_last_failure() {
    let provider = Arc::new(MockProvider::scripted([
        Ok("nope".to_string()),
        Ok("still nope".to_string()),
        Ok(r#"{"question": "Q", "options": ["a", "b", "c", "d"], "answer": 9, "explanation": "e"}"#
            .to_string()),
    ]));
    let source = GenerativeSource::new(provider.clone(), DEFAULT_MODEL)
        .with_policy(RetryPolicy::new(3, Duration::from_millis(1500)));

    let start = tokio::time::Instant::now();
    let err = source.fetch(&request()).await.unwrap_err();
    assert_eq!(start.elapsed(), Duration::from_millis(3000));

    let msg = err.to_string();
    assert!(msg.starts_with("could not generate question after 3 attempts"));
    assert!(msg.contains("answer must be 0-3"), "got: {msg}");
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn online_session_runs_on_generated_questions() {
    let provider = Arc::new(MockProvider::with_fixed_response(VALID));
    let generative = GenerativeSource::new(provider.clone(), DEFAULT_MODEL);
    let source = build_source(
        SourceMode::Online,
        Arc::new(QuestionBank::default()),
        Some(generative),
    )
    .unwrap();

    let config = SessionConfig {
        domains: vec![1, 4],
        question_count: 3,
        starting_tier: DifficultyTier::Medium,
        timer_secs: None,
        mode: SourceMode::Online,
    };
    let mut session = ExamSession::new(config).unwrap();

    while session.next_question(source.as_ref()).await.unwrap().is_some() {
        session.answer(2).unwrap();
    }

    assert_eq!(session.termination(), Some(Termination::Completed));
    assert_eq!(provider.call_count(), 3);
    let summary = session.summary();
    assert_eq!(summary.correct, 3);
    assert_eq!(summary.by_domain[&1].total, 2);
    assert_eq!(summary.by_domain[&4].total, 1);
}

#[tokio::test]
async fn offline_session_with_empty_bank_fails_fast() {
    let provider = Arc::new(MockProvider::with_fixed_response(VALID));
    let generative = GenerativeSource::new(provider.clone(), DEFAULT_MODEL);
    let source = build_source(
        SourceMode::Offline,
        Arc::new(QuestionBank::default()),
        Some(generative),
    )
    .unwrap();

    let mut session = ExamSession::new(SessionConfig::default()).unwrap();
    let err = session.next_question(source.as_ref()).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Source(SourceError::EmptyBank {
            mode: SourceMode::Offline
        })
    ));
    assert!(err.to_string().contains("Suggestion"));
    assert_eq!(provider.call_count(), 0);
}
