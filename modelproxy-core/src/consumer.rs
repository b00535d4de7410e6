//! Caller-side reduction of a published stream into chat messages

use crate::decode::{extract_text_field, FrameSplitter};
use crate::protocol::{Message, MessageRole};
use crate::publisher::DONE_MARKER;
use crate::session::MISSING_TERMINAL_DETAIL;
use serde_json::Value;
use tracing::debug;

/// One event as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Delta(String),
    Done,
    Error(String),
}

impl ClientEvent {
    /// Interpret the payload of one `data:` frame. Blank payloads yield nothing.
    ///
    /// Anything that is neither the done marker nor a recognised JSON frame is
    /// taken literally as delta text.
    pub fn parse(data: &str) -> Option<Self> {
        let data = data.trim();
        if data.is_empty() {
            return None;
        }
        if data == DONE_MARKER {
            return Some(ClientEvent::Done);
        }

        let event = match serde_json::from_str::<Value>(data) {
            Ok(value) => match value.get("error") {
                Some(Value::String(detail)) => ClientEvent::Error(detail.clone()),
                Some(other) => ClientEvent::Error(other.to_string()),
                None => match extract_text_field(&value, &["delta", "text"]) {
                    Some(text) => ClientEvent::Delta(text.to_string()),
                    None => ClientEvent::Delta(data.to_string()),
                },
            },
            Err(_) => ClientEvent::Delta(data.to_string()),
        };
        Some(event)
    }
}

/// A message in the caller's transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub message: Message,
    /// Still receiving deltas
    pub streaming: bool,
}

impl TranscriptEntry {
    fn finished(message: Message) -> Self {
        Self {
            message,
            streaming: false,
        }
    }
}

/// Folds stream events into a transcript holding at most one pending
/// assistant message.
#[derive(Debug)]
pub struct ClientStreamConsumer {
    entries: Vec<TranscriptEntry>,
    pending: Option<usize>,
    splitter: FrameSplitter,
    terminated: bool,
    last_error: Option<String>,
}

impl ClientStreamConsumer {
    pub fn new() -> Self {
        Self::with_history(Vec::new())
    }

    /// Start from earlier, already finished turns
    pub fn with_history(history: Vec<Message>) -> Self {
        Self {
            entries: history.into_iter().map(TranscriptEntry::finished).collect(),
            pending: None,
            splitter: FrameSplitter::blank_line(),
            terminated: false,
            last_error: None,
        }
    }

    /// Record the user's next message and get ready for a new answer
    pub fn begin_turn(&mut self, user: Message) {
        self.close_pending();
        self.entries.push(TranscriptEntry::finished(user));
        self.splitter = FrameSplitter::blank_line();
        self.terminated = false;
        self.last_error = None;
    }

    /// Apply one event. Events after a terminal one are ignored.
    pub fn apply(&mut self, event: ClientEvent) {
        if self.terminated {
            debug!("ignoring {:?} after terminal event", event);
            return;
        }

        match event {
            ClientEvent::Delta(text) => {
                if text.is_empty() {
                    return;
                }
                match self.pending {
                    Some(index) => self.entries[index].message.content.push_str(&text),
                    None => {
                        self.entries.push(TranscriptEntry {
                            message: Message::new(MessageRole::Assistant, text),
                            streaming: true,
                        });
                        self.pending = Some(self.entries.len() - 1);
                    }
                }
            }
            ClientEvent::Done => {
                if self.pending.is_none() {
                    self.entries
                        .push(TranscriptEntry::finished(Message::assistant("")));
                }
                self.close_pending();
                self.terminated = true;
            }
            ClientEvent::Error(detail) => {
                self.close_pending();
                self.last_error = Some(detail);
                self.terminated = true;
            }
        }
    }

    /// Feed raw `text/event-stream` bytes in arbitrary chunks
    pub fn feed_bytes(&mut self, chunk: &[u8]) {
        for frame in self.splitter.push(chunk) {
            self.apply_frame(&frame);
        }
    }

    /// Handle the end of the byte stream.
    ///
    /// A stream that closes without a terminal frame counts as failed.
    pub fn finish(&mut self) {
        if let Some(rest) = self.splitter.take_remainder() {
            self.apply_frame(&rest);
        }
        if !self.terminated {
            self.apply(ClientEvent::Error(MISSING_TERMINAL_DETAIL.to_string()));
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// The assistant message currently receiving deltas
    pub fn pending(&self) -> Option<&Message> {
        self.pending.map(|index| &self.entries[index].message)
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Detail of the error that ended the current turn
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Plain messages, dropping the streaming flags
    pub fn into_messages(self) -> Vec<Message> {
        self.entries.into_iter().map(|entry| entry.message).collect()
    }

    fn apply_frame(&mut self, frame: &str) {
        let trimmed = frame.trim();
        let data = trimmed
            .strip_prefix("data:")
            .map(str::trim_start)
            .unwrap_or(trimmed);
        if let Some(event) = ClientEvent::parse(data) {
            self.apply(event);
        }
    }

    fn close_pending(&mut self) {
        if let Some(index) = self.pending.take() {
            self.entries[index].streaming = false;
        }
    }
}

impl Default for ClientStreamConsumer {
    fn default() -> Self {
        Self::new()
    }
}
