#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the input text (keystroke-level, pre-debounce).
    InputChanged(String),
    /// User picked a different prompt template.
    TemplateSelected(String),
    /// User asked to re-run the transform immediately.
    RegenerateRequested,
    /// Engine issued a network call for a request.
    TransformStarted { request_id: crate::RequestId },
    /// Engine delivered a successful transform.
    TransformSucceeded {
        request_id: crate::RequestId,
        text: String,
    },
    /// Engine delivered a failure (already classified as non-cancellation).
    TransformFailed {
        request_id: crate::RequestId,
        message: String,
    },
    /// Engine classified a request as cancelled; the display stays as-is.
    TransformCancelled { request_id: crate::RequestId },
    /// Engine processed a blank input and cleared the output.
    OutputCleared,
    /// The surface is closing; pending work must be cancelled.
    CloseRequested,
    /// Fallback for placeholder wiring.
    NoOp,
}
