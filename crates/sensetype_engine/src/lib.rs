//! SenseType engine: debounce, request orchestration and the OpenRouter client.
mod client;
mod debounce;
mod engine;
mod orchestrator;
mod types;

pub use client::{
    ClientSettings, CompletionClient, CompletionRequest, OpenRouterClient, DEFAULT_BASE_URL,
    DEFAULT_MODEL, DEFAULT_REFERER,
};
pub use debounce::Debouncer;
pub use engine::{EngineConfig, EngineHandle, DEFAULT_DEBOUNCE};
pub use orchestrator::{Orchestrator, PromptBook};
pub use types::{
    ApiError, EngineEvent, ErrorKind, PromptTemplate, RequestId, TransformMeta, TransformResult,
};
