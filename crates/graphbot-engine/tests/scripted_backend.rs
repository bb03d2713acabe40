//! `Conversation::submit` driven by a scripted backend.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use graphbot_engine::{
    BackendError, ChatBackend, CompletionStatus, Conversation, GenerateRequest, GenerateResponse,
    ImagePayload, MessagePart, RecordKind, FALLBACK_ERROR_TEXT,
};

/// Replays canned outcomes in order and records every query it receives.
#[derive(Default)]
struct ScriptedBackend {
    outcomes: Mutex<VecDeque<Result<GenerateResponse, BackendError>>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn new(outcomes: Vec<Result<GenerateResponse, BackendError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            queries: Mutex::default(),
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError> {
        self.queries.lock().unwrap().push(request.query.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted outcome left")
    }

    async fn fetch_image(&self, _image_id: &str) -> Result<ImagePayload, BackendError> {
        Err(BackendError::Status(404))
    }
}

#[tokio::test]
async fn test_multi_turn_conversation() {
    let backend = ScriptedBackend::new(vec![
        Ok(GenerateResponse::ok(vec![
            MessagePart::text("Here is your chart:"),
            MessagePart::graph("g1"),
        ])),
        Ok(GenerateResponse::failed(None)),
        Err(BackendError::Status(503)),
    ]);
    let mut conv = Conversation::default();

    let first = conv.submit(&backend, "bar chart of sales").await.unwrap();
    assert_eq!(first.status, CompletionStatus::Answered);

    let second = conv.submit(&backend, "  now a pie  ").await.unwrap();
    assert_eq!(second.status, CompletionStatus::Rejected);

    let third = conv.submit(&backend, "again").await.unwrap();
    assert_eq!(third.status, CompletionStatus::TransportFailed);

    let kinds: Vec<_> = conv.records().iter().map(|r| r.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            RecordKind::User,
            RecordKind::BotText,
            RecordKind::BotImage,
            RecordKind::User,
            RecordKind::Error,
            RecordKind::User,
            RecordKind::Error,
        ]
    );
    assert_eq!(conv.records()[4].text(), Some(FALLBACK_ERROR_TEXT));
    assert_eq!(
        backend.queries(),
        vec!["bar chart of sales", "now a pie", "again"]
    );
    assert!(!conv.awaiting_response());
}

#[tokio::test]
async fn test_blank_submit_issues_no_request() {
    let backend = ScriptedBackend::new(vec![]);
    let mut conv = Conversation::default();

    assert!(conv.submit(&backend, "   ").await.is_none());
    assert!(backend.queries().is_empty());
    assert!(conv.is_empty());
}
