use serde::{Deserialize, Serialize};

use crate::errors::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One entry of the caller-supplied conversation, forwarded to Ollama as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

// ── Ollama wire types ────────────────────────────────────────────────────────

/// Request body for `POST {base}/api/chat` with `stream: true`.
#[derive(Debug, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub keep_alive: String,
}

/// One NDJSON line of the streaming response. Both fields default so a
/// sparse final line still parses; unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct OllamaChatChunk {
    #[serde(default)]
    pub message: Option<OllamaChunkMessage>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct OllamaChunkMessage {
    #[serde(default)]
    pub content: String,
}

// ── Semantic stream events ───────────────────────────────────────────────────

/// What the upstream adapter yields to the relay. A session produces any
/// number of `Delta`s followed by exactly one terminal `Done` or `Error`
/// (or nothing further, if cancelled).
#[derive(Debug)]
pub enum StreamEvent {
    Delta(String),
    Done,
    Error(RelayError),
}
