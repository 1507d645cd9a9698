use std::fmt;

use thiserror::Error;

pub type RequestId = u64;

/// Engine-side copy of a named system-prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: String,
    pub prompt: String,
}

/// Normalized success value of one completion call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub text: String,
    pub meta: TransformMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformMeta {
    pub model: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
    pub finish_reason: Option<String>,
}

/// Normalized failure value: a human-readable message tagged with the
/// taxonomy kind and, where known, the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl ApiError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            kind,
            message: message.into(),
            status,
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "Request was cancelled", None)
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }
}

/// Error taxonomy. Classification happens by matching on the variant,
/// never by probing message contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    MissingApiKey,
    EmptyInput,
    InvalidApiKey,
    RateLimit,
    ModelNotFound,
    InvalidResponse,
    Cancelled,
    /// Unclassified HTTP error; retains the server-supplied code, if any.
    Api { code: Option<String> },
    Network,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MissingApiKey => write!(f, "missing_api_key"),
            ErrorKind::EmptyInput => write!(f, "empty_input"),
            ErrorKind::InvalidApiKey => write!(f, "invalid_api_key"),
            ErrorKind::RateLimit => write!(f, "rate_limit"),
            ErrorKind::ModelNotFound => write!(f, "model_not_found"),
            ErrorKind::InvalidResponse => write!(f, "invalid_response"),
            ErrorKind::Cancelled => write!(f, "cancelled"),
            ErrorKind::Api { code: Some(code) } => write!(f, "api_error ({code})"),
            ErrorKind::Api { code: None } => write!(f, "api_error"),
            ErrorKind::Network => write!(f, "network"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A network call was issued for `request_id`.
    TransformStarted { request_id: RequestId },
    /// A blank input was processed; the display clears without a call.
    OutputCleared,
    /// The request resolved. Superseded requests always arrive here with
    /// an `ErrorKind::Cancelled` result, whatever the transport returned.
    TransformCompleted {
        request_id: RequestId,
        result: Result<TransformResult, ApiError>,
    },
}
