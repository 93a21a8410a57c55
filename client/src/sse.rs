//! Incremental parser for the relay's Server-Sent-Events byte stream.

/// One parsed SSE frame: event name plus the concatenated `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Push-based SSE decoder.
///
/// Feed it raw network chunks in arrival order; it buffers bytes until a
/// blank line completes a frame, so frames split at any byte offset —
/// including inside a multi-byte character — decode identically to the
/// unsplit stream. Comment and keep-alive frames (empty `data`) are
/// swallowed.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk; returns every frame it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = find_blank_line(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            // The blank-line separator can never fall inside a multi-byte
            // character, so the block is a complete UTF-8 unit.
            let block = String::from_utf8_lossy(&block[..pos]);
            if let Some(frame) = parse_block(&block) {
                frames.push(frame);
            }
        }
        frames
    }
}

fn find_blank_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Splits a frame block into lines, taking the event name from an
/// `event:` line (defaulting to "message") and concatenating every
/// `data:` line. A block with no data is a heartbeat, not a frame.
fn parse_block(block: &str) -> Option<SseFrame> {
    let mut event = "message".to_string();
    let mut data = String::new();
    for line in block.split('\n') {
        if let Some(rest) = line.strip_prefix("event:") {
            event = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("data:") {
            data.push_str(rest.trim());
        }
    }
    if data.is_empty() {
        return None;
    }
    Some(SseFrame { event, data })
}
