use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sensetype_engine::{
    ApiError, CompletionClient, CompletionRequest, EngineEvent, ErrorKind, Orchestrator,
    PromptBook, PromptTemplate, RequestId, TransformMeta, TransformResult,
};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Scripted client: waits `delay` (honouring the token) and echoes the input.
struct EchoClient {
    delay: Duration,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl EchoClient {
    fn new(delay: Duration) -> (Arc<Self>, Arc<Mutex<Vec<CompletionRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let client = Arc::new(Self {
            delay,
            requests: requests.clone(),
        });
        (client, requests)
    }
}

#[async_trait]
impl CompletionClient for EchoClient {
    async fn complete(
        &self,
        request: CompletionRequest,
        token: &CancellationToken,
    ) -> Result<TransformResult, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        tokio::select! {
            () = token.cancelled() => {
                return Err(ApiError {
                    kind: ErrorKind::Cancelled,
                    message: "Request was cancelled".to_string(),
                    status: None,
                });
            }
            () = tokio::time::sleep(self.delay) => {}
        }
        Ok(TransformResult {
            text: format!("echo: {}", request.input),
            meta: TransformMeta::default(),
        })
    }
}

/// A client that ignores the cancellation token entirely and always answers.
struct StubbornClient {
    delay: Duration,
}

#[async_trait]
impl CompletionClient for StubbornClient {
    async fn complete(
        &self,
        _request: CompletionRequest,
        _token: &CancellationToken,
    ) -> Result<TransformResult, ApiError> {
        tokio::time::sleep(self.delay).await;
        Ok(TransformResult {
            text: "late".to_string(),
            meta: TransformMeta::default(),
        })
    }
}

fn prompt_book() -> PromptBook {
    PromptBook::new(
        vec![PromptTemplate {
            name: "Fix Grammar".to_string(),
            prompt: "Fix grammar only".to_string(),
        }],
        Some("DEFAULT".to_string()),
    )
}

async fn next_event(rx: &Receiver<EngineEvent>) -> EngineEvent {
    for _ in 0..500 {
        if let Ok(event) = rx.try_recv() {
            return event;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("no engine event arrived in time");
}

async fn next_completion(rx: &Receiver<EngineEvent>) -> (RequestId, Result<TransformResult, ApiError>) {
    loop {
        if let EngineEvent::TransformCompleted { request_id, result } = next_event(rx).await {
            return (request_id, result);
        }
    }
}

#[tokio::test]
async fn issues_request_and_reports_success() {
    let (client, requests) = EchoClient::new(Duration::from_millis(10));
    let (event_tx, event_rx) = mpsc::channel();
    let mut orchestrator = Orchestrator::new(client, prompt_book(), event_tx, Handle::current());

    orchestrator.process("Hello".to_string(), Some("Fix Grammar".to_string()));

    assert_eq!(
        next_event(&event_rx).await,
        EngineEvent::TransformStarted { request_id: 1 }
    );
    let (request_id, result) = next_completion(&event_rx).await;
    assert_eq!(request_id, 1);
    assert_eq!(result.expect("success").text, "echo: Hello");

    let recorded = requests.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].system_prompt.as_deref(), Some("Fix grammar only"));
}

#[tokio::test]
async fn blank_input_clears_without_calling_the_client() {
    let (client, requests) = EchoClient::new(Duration::from_millis(10));
    let (event_tx, event_rx) = mpsc::channel();
    let mut orchestrator = Orchestrator::new(client, prompt_book(), event_tx, Handle::current());

    orchestrator.process("   ".to_string(), None);

    assert_eq!(next_event(&event_rx).await, EngineEvent::OutputCleared);
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn new_request_supersedes_the_previous_one() {
    let (client, _requests) = EchoClient::new(Duration::from_millis(200));
    let (event_tx, event_rx) = mpsc::channel();
    let mut orchestrator = Orchestrator::new(client, prompt_book(), event_tx, Handle::current());

    orchestrator.process("first".to_string(), None);
    assert_eq!(
        next_event(&event_rx).await,
        EngineEvent::TransformStarted { request_id: 1 }
    );

    orchestrator.process("second".to_string(), None);
    assert_eq!(
        next_event(&event_rx).await,
        EngineEvent::TransformStarted { request_id: 2 }
    );

    let (first_id, first_result) = next_completion(&event_rx).await;
    let (second_id, second_result) = next_completion(&event_rx).await;

    // The superseded request resolves first (its token fires immediately).
    assert_eq!(first_id, 1);
    assert!(first_result.unwrap_err().is_cancelled());
    assert_eq!(second_id, 2);
    assert_eq!(second_result.expect("success").text, "echo: second");
}

#[tokio::test]
async fn unknown_selector_falls_back_to_the_default_prompt() {
    let (client, requests) = EchoClient::new(Duration::from_millis(10));
    let (event_tx, event_rx) = mpsc::channel();
    let mut orchestrator = Orchestrator::new(client, prompt_book(), event_tx, Handle::current());

    orchestrator.process("one".to_string(), Some("No Such Template".to_string()));
    next_completion(&event_rx).await;
    orchestrator.process("two".to_string(), None);
    next_completion(&event_rx).await;

    let recorded = requests.lock().unwrap();
    assert_eq!(recorded[0].system_prompt.as_deref(), Some("DEFAULT"));
    assert_eq!(recorded[1].system_prompt.as_deref(), Some("DEFAULT"));
}

#[tokio::test]
async fn late_result_after_cancellation_is_reported_cancelled() {
    // The client ignores the token, so the orchestrator's arrival-time check
    // is the only thing standing between the stale result and the display.
    let client = Arc::new(StubbornClient {
        delay: Duration::from_millis(50),
    });
    let (event_tx, event_rx) = mpsc::channel();
    let mut orchestrator = Orchestrator::new(client, prompt_book(), event_tx, Handle::current());

    orchestrator.process("text".to_string(), None);
    assert_eq!(
        next_event(&event_rx).await,
        EngineEvent::TransformStarted { request_id: 1 }
    );
    orchestrator.cancel_in_flight();

    let (request_id, result) = next_completion(&event_rx).await;
    assert_eq!(request_id, 1);
    assert!(result.unwrap_err().is_cancelled());
}

#[tokio::test]
async fn request_ids_advance_monotonically() {
    let (client, _requests) = EchoClient::new(Duration::from_millis(5));
    let (event_tx, event_rx) = mpsc::channel();
    let mut orchestrator = Orchestrator::new(client, prompt_book(), event_tx, Handle::current());

    for text in ["a", "b", "c"] {
        orchestrator.process(text.to_string(), None);
    }

    let mut started = Vec::new();
    while started.len() < 3 {
        if let EngineEvent::TransformStarted { request_id } = next_event(&event_rx).await {
            started.push(request_id);
        }
    }
    assert_eq!(started, vec![1, 2, 3]);
}
