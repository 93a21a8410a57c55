//! HTTP layer: opens the relay stream and folds its frames into a transcript.

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::sse::{SseDecoder, SseFrame};
use crate::transcript::Transcript;

/// Terminal outcome of one streamed chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The relay sent `event: done` (or closed the stream cleanly).
    Done,
    /// The relay sent `event: error`, or the connection failed; the
    /// description has replaced the open assistant entry.
    Failed(String),
    /// The caller cancelled. The transcript was not touched beyond
    /// detaching the open entry.
    Cancelled,
}

/// Sends the transcript to `POST {base_url}/chat/stream` and accumulates
/// the streamed reply into a fresh assistant entry.
///
/// `on_delta` fires once per appended delta, in arrival order — the hook
/// for whatever is rendering the transcript. Cancelling `cancel` aborts
/// the HTTP request at the next read and reports `Cancelled` instead of
/// an error.
pub async fn stream_chat(
    http: &reqwest::Client,
    base_url: &str,
    transcript: &mut Transcript,
    cancel: CancellationToken,
    mut on_delta: impl FnMut(&str),
) -> StreamOutcome {
    let body = serde_json::json!({ "messages": transcript.messages() });
    transcript.begin_assistant();

    let url = format!("{}/chat/stream", base_url.trim_end_matches('/'));
    let send = http.post(&url).json(&body).send();
    let resp = tokio::select! {
        _ = cancel.cancelled() => {
            transcript.finish();
            return StreamOutcome::Cancelled;
        }
        resp = send => resp,
    };

    let resp = match resp {
        Ok(resp) => resp,
        Err(e) => {
            if cancel.is_cancelled() {
                transcript.finish();
                return StreamOutcome::Cancelled;
            }
            return fail(transcript, format!("Error: {e}"));
        }
    };
    if !resp.status().is_success() {
        return fail(transcript, format!("Error: HTTP {}", resp.status().as_u16()));
    }

    let byte_stream = resp.bytes_stream();
    futures_util::pin_mut!(byte_stream);
    let mut decoder = SseDecoder::new();

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => {
                transcript.finish();
                return StreamOutcome::Cancelled;
            }
            chunk = byte_stream.next() => chunk,
        };

        let chunk = match chunk {
            // Clean close without a terminal frame: treat as finished.
            None => break,
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => {
                if cancel.is_cancelled() {
                    transcript.finish();
                    return StreamOutcome::Cancelled;
                }
                return fail(transcript, format!("Error: {e}"));
            }
        };

        for frame in decoder.feed(&chunk) {
            if let Some(outcome) = dispatch(transcript, &frame, &mut on_delta) {
                return outcome;
            }
        }
    }

    transcript.finish();
    StreamOutcome::Done
}

fn fail(transcript: &mut Transcript, description: String) -> StreamOutcome {
    transcript.fail(&description);
    StreamOutcome::Failed(description)
}

/// Applies one frame to the transcript; `Some` means the frame was terminal.
fn dispatch(
    transcript: &mut Transcript,
    frame: &SseFrame,
    on_delta: &mut impl FnMut(&str),
) -> Option<StreamOutcome> {
    match frame.event.as_str() {
        "done" => {
            transcript.finish();
            Some(StreamOutcome::Done)
        }
        "error" => Some(fail(transcript, render_error(&frame.data))),
        // Default "message" frames carry `{"delta": text}`. Frames that do
        // not parse, or parse to an empty delta, are skipped.
        _ => {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&frame.data) {
                if let Some(delta) = value.get("delta").and_then(|d| d.as_str()) {
                    if !delta.is_empty() {
                        transcript.append_delta(delta);
                        on_delta(delta);
                    }
                }
            }
            None
        }
    }
}

/// Turns the relay's error payload into a line fit for the transcript.
fn render_error(data: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(data) else {
        return format!("Error: {data}");
    };
    let kind = value
        .get("error")
        .and_then(|k| k.as_str())
        .unwrap_or("error");
    let detail = value
        .get("text")
        .or_else(|| value.get("message"))
        .and_then(|d| d.as_str())
        .unwrap_or("");
    match value.get("status").and_then(|s| s.as_u64()) {
        Some(status) if detail.is_empty() => format!("Error: {kind} (HTTP {status})"),
        Some(status) => format!("Error: {kind} (HTTP {status}): {detail}"),
        None if detail.is_empty() => format!("Error: {kind}"),
        None => format!("Error: {kind}: {detail}"),
    }
}
