use serde_json::json;
use thiserror::Error;

/// Top-level relay error. Each variant maps to one surface: validation
/// failures become a non-streaming HTTP 400, everything else becomes a
/// single terminal `event: error` SSE frame.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Ollama was unreachable, or answered with a non-success status
    /// before any token arrived. `status` is absent when the connection
    /// itself failed.
    #[error("ollama connect failed (status {status:?}): {detail}")]
    UpstreamConnect { status: Option<u16>, detail: String },

    /// The Ollama connection dropped or errored mid-stream.
    #[error("ollama stream failed: {detail}")]
    UpstreamStream { detail: String },
}

impl RelayError {
    /// Machine-readable kind, used as the `error` field on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidRequest { .. } => "invalid_request",
            RelayError::UpstreamConnect { .. } => "upstream_error",
            RelayError::UpstreamStream { .. } => "stream_error",
        }
    }

    /// JSON payload for the terminal `event: error` SSE frame.
    pub fn to_frame(&self) -> serde_json::Value {
        match self {
            RelayError::InvalidRequest { reason } => {
                json!({ "error": self.kind(), "message": reason })
            }
            RelayError::UpstreamConnect { status: Some(status), detail } => {
                json!({ "error": self.kind(), "status": status, "text": detail })
            }
            RelayError::UpstreamConnect { status: None, detail } => {
                json!({ "error": self.kind(), "text": detail })
            }
            RelayError::UpstreamStream { detail } => {
                json!({ "error": self.kind(), "message": detail })
            }
        }
    }
}
