//! The per-session event channel

use super::{SessionState, StreamEvent, TerminalSignal, MISSING_TERMINAL_DETAIL};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The downstream side of the session went away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session receiver was dropped")]
pub struct SessionClosed;

/// Create a connected sink/stream pair buffering at most `capacity` events
pub fn channel(capacity: usize) -> (DeltaSink, DeltaStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let id = Uuid::new_v4();
    (
        DeltaSink {
            tx,
            id,
            state: SessionState::Init,
            emitted: 0,
            terminated: false,
        },
        DeltaStream {
            rx,
            id,
            finished: false,
        },
    )
}

/// Sending half of a session.
///
/// Deltas go out through [`delta`](Self::delta); the session ends with
/// [`finish`](Self::finish), which consumes the sink.
#[derive(Debug)]
pub struct DeltaSink {
    tx: mpsc::Sender<StreamEvent>,
    id: Uuid,
    state: SessionState,
    emitted: usize,
    terminated: bool,
}

impl DeltaSink {
    /// Session identifier used in logs
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of deltas sent so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Record that the upstream request is being opened
    pub fn connecting(&mut self) {
        if self.state == SessionState::Init {
            debug!("session {} connecting", self.id);
            self.state = SessionState::Connecting;
        }
    }

    /// Send one delta. Empty text is not a delta and is dropped.
    pub async fn delta(&mut self, text: impl Into<String>) -> Result<(), SessionClosed> {
        let text = text.into();
        if text.is_empty() {
            return Ok(());
        }
        if self.state != SessionState::Streaming {
            debug!("session {} streaming", self.id);
            self.state = SessionState::Streaming;
        }
        self.tx
            .send(StreamEvent::Delta(text))
            .await
            .map_err(|_| SessionClosed)?;
        self.emitted += 1;
        Ok(())
    }

    /// End the session with its single terminal event
    pub async fn finish(mut self, signal: TerminalSignal) {
        self.terminated = true;
        match &signal {
            TerminalSignal::Done => {
                self.state = SessionState::Done;
                info!("session {} done after {} deltas", self.id, self.emitted);
            }
            TerminalSignal::Error(detail) => {
                self.state = SessionState::Error;
                warn!(
                    "session {} failed after {} deltas: {}",
                    self.id, self.emitted, detail
                );
            }
        }
        if self.tx.send(signal.into()).await.is_err() {
            debug!("session {} receiver gone before terminal event", self.id);
        }
    }

    /// Release the session because the downstream caller disconnected
    pub fn cancel(mut self) {
        self.terminated = true;
        info!(
            "session {} cancelled by downstream after {} deltas",
            self.id, self.emitted
        );
    }

    /// Whether the receiving half has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the receiving half has been dropped
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}

impl Drop for DeltaSink {
    fn drop(&mut self) {
        if !self.terminated {
            warn!("session {} dropped without a terminal event", self.id);
            let _ = self
                .tx
                .try_send(StreamEvent::Error(MISSING_TERMINAL_DETAIL.to_string()));
        }
    }
}

/// Receiving half of a session.
///
/// Yields deltas followed by exactly one terminal event, then ends. If the
/// sender disappears without a terminal event an `Error` is synthesized.
#[derive(Debug)]
pub struct DeltaStream {
    rx: mpsc::Receiver<StreamEvent>,
    id: Uuid,
    finished: bool,
}

impl DeltaStream {
    /// Session identifier used in logs
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Drain the session into its deltas and terminal signal
    pub async fn collect_outcome(mut self) -> SessionOutcome {
        let mut deltas = Vec::new();
        while let Some(event) = self.next().await {
            match event {
                StreamEvent::Delta(text) => deltas.push(text),
                StreamEvent::Done => {
                    return SessionOutcome {
                        deltas,
                        terminal: TerminalSignal::Done,
                    }
                }
                StreamEvent::Error(detail) => {
                    return SessionOutcome {
                        deltas,
                        terminal: TerminalSignal::Error(detail),
                    }
                }
            }
        }
        // Unreachable in practice: the stream always ends with a terminal event.
        SessionOutcome {
            deltas,
            terminal: TerminalSignal::Error(MISSING_TERMINAL_DETAIL.to_string()),
        }
    }
}

impl Stream for DeltaStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    self.finished = true;
                    self.rx.close();
                }
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(Some(StreamEvent::Error(
                    MISSING_TERMINAL_DETAIL.to_string(),
                )))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Everything a finished session produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub deltas: Vec<String>,
    pub terminal: TerminalSignal,
}

impl SessionOutcome {
    /// Concatenation of all deltas
    pub fn text(&self) -> String {
        self.deltas.concat()
    }
}
