//! Streaming sessions
//!
//! One session exists per in-flight streaming request. Its events travel over
//! a bounded channel from the task reading upstream bytes to whoever publishes
//! them downstream:
//!
//! ```text
//! INIT -> CONNECTING -> STREAMING -> DONE | ERROR
//! ```
//!
//! The channel's own lifecycle enforces the single terminal event: the sending
//! half is consumed by [`DeltaSink::finish`], and the receiving half stops
//! after the first terminal event it sees (synthesizing an error if the sender
//! disappears without one).

mod channel;
mod driver;

pub use channel::{channel, DeltaSink, DeltaStream, SessionClosed, SessionOutcome};
pub use driver::StreamSession;

use serde::{Deserialize, Serialize};

/// Detail used when a session's sender vanished without a terminal event
pub const MISSING_TERMINAL_DETAIL: &str = "stream ended without a terminal signal";

/// One item of a session's event sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental, non-empty text fragment
    Delta(String),
    /// Successful end of the session
    Done,
    /// Failed end of the session
    Error(String),
}

impl StreamEvent {
    /// Whether this event ends the session
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error(_))
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalSignal {
    Done,
    Error(String),
}

impl From<TerminalSignal> for StreamEvent {
    fn from(signal: TerminalSignal) -> Self {
        match signal {
            TerminalSignal::Done => StreamEvent::Done,
            TerminalSignal::Error(detail) => StreamEvent::Error(detail),
        }
    }
}

/// Lifecycle of a streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Init,
    Connecting,
    Streaming,
    Done,
    Error,
}

impl SessionState {
    /// Whether no further events may follow
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Done | SessionState::Error)
    }
}
