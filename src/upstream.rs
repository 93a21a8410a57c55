use std::sync::OnceLock;
use std::time::Duration;

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::config::RelayConfig;
use crate::errors::RelayError;
use crate::models::{ChatMessage, OllamaChatChunk, OllamaChatRequest, StreamEvent};

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client. No overall request timeout:
/// a generation stream legitimately stays open for minutes.
fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Streaming client for Ollama's NDJSON chat endpoint.
///
/// One call to [`stream_chat`](OllamaClient::stream_chat) issues one
/// `POST {base}/api/chat` with `stream: true` and turns the response body
/// into a lazy sequence of [`StreamEvent`]s.
#[derive(Clone)]
pub struct OllamaClient {
    endpoint: String,
    model: String,
    keep_alive: String,
}

impl OllamaClient {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            endpoint: config.chat_endpoint(),
            model: config.model.clone(),
            keep_alive: config.keep_alive.clone(),
        }
    }

    /// Opens one streaming chat request and yields semantic events.
    ///
    /// The sequence always ends with exactly one terminal event (`Done` or
    /// `Error`) — unless `cancel` fires, in which case the in-flight request
    /// is aborted at the next read and the stream simply stops.
    pub fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        cancel: CancellationToken,
    ) -> BoxStream<'static, StreamEvent> {
        let endpoint = self.endpoint.clone();
        let body = OllamaChatRequest {
            model: self.model.clone(),
            messages,
            stream: true,
            keep_alive: self.keep_alive.clone(),
        };

        let stream = async_stream::stream! {
            let send = shared_client().post(&endpoint).json(&body).send();
            let resp = tokio::select! {
                _ = cancel.cancelled() => return,
                resp = send => resp,
            };

            let resp = match resp {
                Ok(resp) => resp,
                Err(e) => {
                    error!("failed to reach ollama at {endpoint}: {e}");
                    yield StreamEvent::Error(RelayError::UpstreamConnect {
                        status: None,
                        detail: e.to_string(),
                    });
                    return;
                }
            };

            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                error!("ollama answered {status}: {text}");
                yield StreamEvent::Error(RelayError::UpstreamConnect {
                    status: Some(status.as_u16()),
                    detail: text,
                });
                return;
            }

            let byte_stream = resp.bytes_stream();
            futures_util::pin_mut!(byte_stream);

            // Network chunks do not align with NDJSON line boundaries, and a
            // multi-byte character may be split across two chunks. Buffering
            // raw bytes and splitting on b'\n' first keeps every decoded
            // line a complete UTF-8 unit.
            let mut buffer: Vec<u8> = Vec::new();

            loop {
                let chunk = tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("upstream read cancelled, aborting ollama request");
                        return;
                    }
                    chunk = byte_stream.next() => chunk,
                };

                let chunk = match chunk {
                    None => break,
                    Some(Ok(chunk)) => chunk,
                    Some(Err(e)) => {
                        error!("ollama stream failed mid-read: {e}");
                        yield StreamEvent::Error(RelayError::UpstreamStream {
                            detail: e.to_string(),
                        });
                        return;
                    }
                };
                buffer.extend_from_slice(&chunk);

                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line_bytes: Vec<u8> = buffer.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line_bytes[..pos]);
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let parsed: OllamaChatChunk = match serde_json::from_str(line) {
                        Ok(parsed) => parsed,
                        Err(e) => {
                            debug!("skipping malformed ndjson line: {e}");
                            continue;
                        }
                    };

                    if let Some(message) = parsed.message {
                        if !message.content.is_empty() {
                            yield StreamEvent::Delta(message.content);
                        }
                    }
                    if parsed.done {
                        yield StreamEvent::Done;
                        return;
                    }
                }
            }

            // Ollama closed the connection without a done marker. Any partial
            // line left in the buffer is dropped.
            yield StreamEvent::Done;
        };

        Box::pin(stream)
    }
}
