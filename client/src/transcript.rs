//! In-memory conversation transcript.

use crate::models::{ChatMessage, Role};

/// Ordered message log with an explicit handle to the single in-progress
/// assistant entry. While a stream is open, every delta appends to that
/// entry; `finish` and `fail` both detach it, so at most one entry is ever
/// open.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    active: Option<usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::User,
            content: content.into(),
        });
    }

    /// Opens a fresh empty assistant entry and makes it the accumulation
    /// target. An entry left open by an interrupted turn is finalized as-is.
    pub fn begin_assistant(&mut self) {
        self.active = None;
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: String::new(),
        });
        self.active = Some(self.messages.len() - 1);
    }

    /// Appends a text delta to the open entry; a no-op once detached.
    pub fn append_delta(&mut self, delta: &str) {
        if let Some(index) = self.active {
            self.messages[index].content.push_str(delta);
        }
    }

    /// Detaches the open entry, keeping whatever text accumulated.
    pub fn finish(&mut self) {
        self.active = None;
    }

    /// Replaces the open entry's content with an error description, then
    /// detaches it. The conversation turn itself is kept.
    pub fn fail(&mut self, description: &str) {
        if let Some(index) = self.active {
            self.messages[index].content = description.to_string();
        }
        self.active = None;
    }
}
