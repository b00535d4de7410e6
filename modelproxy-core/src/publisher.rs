//! Downstream re-framing of a streaming session
//!
//! Every session, whatever the backend's wire format, is published the same
//! way:
//!
//! ```text
//! data: {"delta":"Hel"}
//!
//! data: {"delta":"lo"}
//!
//! data: [DONE]
//! ```
//!
//! A failed session ends with a single `data: {"error":"…"}` frame instead of
//! `[DONE]`.

use crate::session::{DeltaStream, StreamEvent};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::json;
use tracing::debug;

/// Marker payload of the final frame of a successful session
pub const DONE_MARKER: &str = "[DONE]";

/// One downstream frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Delta(String),
    Done,
    Error(String),
}

impl Frame {
    /// Payload carried after `data: `
    pub fn data(&self) -> String {
        match self {
            Frame::Delta(text) => json!({ "delta": text }).to_string(),
            Frame::Done => DONE_MARKER.to_string(),
            Frame::Error(detail) => json!({ "error": detail }).to_string(),
        }
    }

    /// Complete wire form, including the blank-line terminator
    pub fn encode(&self) -> Bytes {
        Bytes::from(format!("data: {}\n\n", self.data()))
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Frame::Delta(_))
    }
}

impl From<StreamEvent> for Frame {
    fn from(event: StreamEvent) -> Self {
        match event {
            StreamEvent::Delta(text) => Frame::Delta(text),
            StreamEvent::Done => Frame::Done,
            StreamEvent::Error(detail) => Frame::Error(detail),
        }
    }
}

type CompletionHook = Box<dyn FnOnce(String) + Send>;

/// Republishes one session's events as downstream frames
pub struct SessionPublisher {
    events: DeltaStream,
    on_complete: Option<CompletionHook>,
}

impl SessionPublisher {
    pub fn new(events: DeltaStream) -> Self {
        Self {
            events,
            on_complete: None,
        }
    }

    /// Receive the full text once the session ends with `Done`.
    /// Never called for failed or abandoned sessions.
    pub fn on_complete<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(String) + Send + 'static,
    {
        self.on_complete = Some(Box::new(hook));
        self
    }

    /// Frames in order, ending after the first terminal frame
    pub fn frames(self) -> impl Stream<Item = Frame> + Send {
        let SessionPublisher {
            mut events,
            mut on_complete,
        } = self;

        async_stream::stream! {
            let mut text = String::new();
            while let Some(event) = events.next().await {
                match event {
                    StreamEvent::Delta(delta) => {
                        text.push_str(&delta);
                        yield Frame::Delta(delta);
                    }
                    StreamEvent::Done => {
                        if let Some(hook) = on_complete.take() {
                            debug!("session {} complete, {} bytes of text", events.id(), text.len());
                            hook(std::mem::take(&mut text));
                        }
                        yield Frame::Done;
                        break;
                    }
                    StreamEvent::Error(detail) => {
                        yield Frame::Error(detail);
                        break;
                    }
                }
            }
        }
    }

    /// Frames as raw `text/event-stream` bytes
    pub fn encoded(self) -> impl Stream<Item = Bytes> + Send {
        self.frames().map(|frame| frame.encode())
    }
}
