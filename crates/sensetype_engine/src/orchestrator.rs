use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use engine_logging::engine_debug;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::client::{CompletionClient, CompletionRequest};
use crate::types::{ApiError, EngineEvent, PromptTemplate, RequestId};

/// Named system prompts plus the fallback used for unknown selectors.
#[derive(Debug, Clone, Default)]
pub struct PromptBook {
    prompts: HashMap<String, String>,
    default_prompt: Option<String>,
}

impl PromptBook {
    pub fn new(templates: Vec<PromptTemplate>, default_prompt: Option<String>) -> Self {
        let prompts = templates
            .into_iter()
            .map(|template| (template.name, template.prompt))
            .collect();
        Self {
            prompts,
            default_prompt,
        }
    }

    /// Resolves a selector to a system prompt. An absent or unknown selector
    /// falls back to the default prompt, when one is configured.
    pub fn resolve(&self, selector: Option<&str>) -> Option<String> {
        selector
            .and_then(|name| self.prompts.get(name).cloned())
            .or_else(|| self.default_prompt.clone())
    }
}

struct InFlightRequest {
    request_id: RequestId,
    token: CancellationToken,
}

/// Owns the single "current request" slot and enforces last-request-wins:
/// issuing a new request always cancels the previous one, and a superseded
/// request's outcome never reaches the display.
pub struct Orchestrator {
    client: Arc<dyn CompletionClient>,
    prompts: PromptBook,
    events: Sender<EngineEvent>,
    handle: Handle,
    current: Option<InFlightRequest>,
    next_request_id: RequestId,
}

impl Orchestrator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        prompts: PromptBook,
        events: Sender<EngineEvent>,
        handle: Handle,
    ) -> Self {
        Self {
            client,
            prompts,
            events,
            handle,
            current: None,
            next_request_id: 1,
        }
    }

    /// Cancels whatever is in flight, then either clears the output (blank
    /// input, no network call) or issues a fresh call under a new token.
    pub fn process(&mut self, text: String, selector: Option<String>) {
        self.cancel_in_flight();

        if text.trim().is_empty() {
            let _ = self.events.send(EngineEvent::OutputCleared);
            return;
        }

        let system_prompt = self.prompts.resolve(selector.as_deref());
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        let token = CancellationToken::new();
        self.current = Some(InFlightRequest {
            request_id,
            token: token.clone(),
        });
        let _ = self.events.send(EngineEvent::TransformStarted { request_id });
        engine_debug!(
            "transform request {} issued ({} input chars)",
            request_id,
            text.len()
        );

        let client = self.client.clone();
        let events = self.events.clone();
        self.handle.spawn(async move {
            let result = client
                .complete(
                    CompletionRequest {
                        input: text,
                        system_prompt,
                    },
                    &token,
                )
                .await;
            // The token is polled once at arrival: a superseded request's
            // outcome, success or failure, is reported as cancelled even if
            // the transport let the call run to completion.
            let result = if token.is_cancelled() {
                Err(ApiError::cancelled())
            } else {
                result
            };
            let _ = events.send(EngineEvent::TransformCompleted { request_id, result });
        });
    }

    /// Triggers the current request's token and empties the slot.
    /// Cancelling an already completed call is a no-op.
    pub fn cancel_in_flight(&mut self) {
        if let Some(previous) = self.current.take() {
            engine_debug!("cancelling request {}", previous.request_id);
            previous.token.cancel();
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}
