use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::types::{ApiError, ErrorKind, TransformMeta, TransformResult};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_REFERER: &str = "http://localhost";

const CLIENT_TITLE: &str = "SenseType AI";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub referer: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            referer: DEFAULT_REFERER.to_owned(),
        }
    }
}

/// One completion intent: the raw user text plus the resolved system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub input: String,
    pub system_prompt: Option<String>,
}

/// Seam between the orchestrator and the transport, so orchestration can be
/// exercised against a scripted fake.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        request: CompletionRequest,
        token: &CancellationToken,
    ) -> Result<TransformResult, ApiError>;
}

/// Chat-completions client for OpenRouter-compatible endpoints.
pub struct OpenRouterClient {
    http: Client,
    settings: ClientSettings,
}

impl OpenRouterClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ChatUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
    code: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(
        &self,
        request: CompletionRequest,
        token: &CancellationToken,
    ) -> Result<TransformResult, ApiError> {
        // Validation happens before any network I/O.
        if self.settings.api_key.is_empty() {
            return Err(ApiError::new(
                ErrorKind::MissingApiKey,
                "API key is required",
                Some(401),
            ));
        }
        if request.input.trim().is_empty() {
            return Err(ApiError::new(
                ErrorKind::EmptyInput,
                "Input text is required",
                Some(400),
            ));
        }

        let mut messages = Vec::with_capacity(2);
        if let Some(prompt) = request
            .system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
        {
            messages.push(ChatMessage {
                role: "system",
                content: prompt,
            });
        }
        // The user message carries the raw input, untrimmed.
        messages.push(ChatMessage {
            role: "user",
            content: &request.input,
        });

        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );

        let send = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .header("HTTP-Referer", &self.settings.referer)
            .header("X-Title", CLIENT_TITLE)
            .json(&json!({
                "model": self.settings.model,
                "messages": messages,
            }))
            .send();

        // Dropping the in-flight future is reqwest's native cancellation;
        // the select below wires it to the caller's token.
        let response = tokio::select! {
            biased;
            () = token.cancelled() => return Err(ApiError::cancelled()),
            result = send => result.map_err(|err| {
                ApiError::new(ErrorKind::Network, format!("Network error: {err}"), None)
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = tokio::select! {
                biased;
                () = token.cancelled() => return Err(ApiError::cancelled()),
                body = response.text() => body.unwrap_or_default(),
            };
            return Err(classify_http_error(status, &body));
        }

        let body = tokio::select! {
            biased;
            () = token.cancelled() => return Err(ApiError::cancelled()),
            body = response.json::<ChatResponse>() => body.map_err(|_| invalid_response())?,
        };

        normalize(body, &self.settings.model)
    }
}

fn normalize(body: ChatResponse, requested_model: &str) -> Result<TransformResult, ApiError> {
    let choice = body.choices.into_iter().next().ok_or_else(invalid_response)?;
    let finish_reason = choice.finish_reason;
    let text = choice
        .message
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(invalid_response)?;
    let usage = body.usage.unwrap_or_default();

    Ok(TransformResult {
        text,
        meta: TransformMeta {
            model: body
                .model
                .filter(|model| !model.is_empty())
                .unwrap_or_else(|| requested_model.to_owned()),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
            finish_reason,
        },
    })
}

fn invalid_response() -> ApiError {
    ApiError::new(
        ErrorKind::InvalidResponse,
        "Invalid response: missing content",
        Some(500),
    )
}

/// Maps a non-2xx response to the taxonomy. 401/429/404 get fixed
/// user-facing messages regardless of the server body; everything else
/// keeps the parsed message (or a generic status line) and whatever code
/// the server supplied.
fn classify_http_error(status: StatusCode, body: &str) -> ApiError {
    let mut message = format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    let mut code = None;

    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(detail) = parsed.error {
            if let Some(parsed_message) = detail.message {
                message = parsed_message;
            }
            code = detail.code.or(detail.kind);
        }
    }

    match status.as_u16() {
        401 => ApiError::new(
            ErrorKind::InvalidApiKey,
            "Invalid API key. Please check your OpenRouter API key in preferences.",
            Some(401),
        ),
        429 => ApiError::new(
            ErrorKind::RateLimit,
            "Rate limit exceeded. Please wait a moment and try again.",
            Some(429),
        ),
        404 => ApiError::new(
            ErrorKind::ModelNotFound,
            "Model not found. Please check the model name in preferences.",
            Some(404),
        ),
        other => ApiError::new(ErrorKind::Api { code }, message, Some(other)),
    }
}
