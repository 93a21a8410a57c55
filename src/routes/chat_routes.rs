use std::convert::Infallible;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::RelayError;
use crate::models::{ChatMessage, StreamEvent};
use crate::upstream::OllamaClient;

/// GET `/healthz` — static liveness probe.
pub async fn healthz_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// POST `/chat/stream` — relays one chat turn to Ollama as Server-Sent Events.
///
/// The only non-streaming response is the 400 for a malformed payload;
/// once validation passes, everything (including backend failures) is
/// reported in-band as SSE frames on an HTTP 200.
pub async fn chat_stream_handler(
    State(client): State<OllamaClient>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let messages = match parse_messages(&body) {
        Ok(messages) => messages,
        Err(err) => {
            warn!("rejecting chat request: {err}");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response();
        }
    };

    info!("relay session started ({} messages)", messages.len());

    let cancel = CancellationToken::new();
    let events = client.stream_chat(messages, cancel.clone());

    let sse = Sse::new(relay_sse_stream(events, cancel)).keep_alive(KeepAlive::default());
    let mut resp = sse.into_response();
    // Defeats proxy buffering (nginx et al.); harmless elsewhere.
    resp.headers_mut()
        .insert("X-Accel-Buffering", HeaderValue::from_static("no"));
    resp
}

/// Translates semantic stream events into wire-level SSE frames.
///
/// The first frame out is a `: connected` comment, emitted before the
/// upstream stream is first polled, so the caller observes an open byte
/// stream even when Ollama is slow to answer. The stream ends right after
/// the terminal frame; if the caller disconnects instead, axum drops the
/// stream and the embedded drop guard trips `cancel`, aborting the
/// in-flight Ollama request at its next read.
pub fn relay_sse_stream(
    mut events: BoxStream<'static, StreamEvent>,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        let _guard = cancel.drop_guard();

        yield Ok(Event::default().comment("connected"));

        while let Some(event) = events.next().await {
            match event {
                StreamEvent::Delta(text) => {
                    yield Ok(Event::default().data(json!({ "delta": text }).to_string()));
                }
                StreamEvent::Done => {
                    debug!("relay session finished");
                    yield Ok(Event::default()
                        .event("done")
                        .data(json!({ "done": true }).to_string()));
                    return;
                }
                StreamEvent::Error(err) => {
                    warn!("relay session failed: {err}");
                    yield Ok(Event::default()
                        .event("error")
                        .data(err.to_frame().to_string()));
                    return;
                }
            }
        }
    }
}

/// The payload must be an object whose `messages` field is an array of
/// `{role, content}` pairs; anything else is a validation error.
fn parse_messages(body: &serde_json::Value) -> Result<Vec<ChatMessage>, RelayError> {
    let raw = body.get("messages").ok_or_else(|| RelayError::InvalidRequest {
        reason: "messages must be an array".to_string(),
    })?;
    if !raw.is_array() {
        return Err(RelayError::InvalidRequest {
            reason: "messages must be an array".to_string(),
        });
    }
    serde_json::from_value(raw.clone()).map_err(|e| RelayError::InvalidRequest {
        reason: format!("invalid message entry: {e}"),
    })
}
