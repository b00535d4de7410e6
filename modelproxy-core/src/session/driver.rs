//! Pumps an upstream byte stream through a decoder into a session

use super::{DeltaSink, TerminalSignal};
use crate::adapters::error::{AdapterError, AdapterResult};
use crate::decode::{FrameDecoder, FrameFormat};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// One streaming request in flight: a decoder plus the sink it feeds
pub struct StreamSession {
    decoder: Box<dyn FrameDecoder>,
    sink: DeltaSink,
    idle_timeout: Option<Duration>,
}

fn idle_error(limit: Duration) -> AdapterError {
    AdapterError::UpstreamTransport(format!(
        "no data from upstream for {}ms",
        limit.as_millis()
    ))
}

enum Step {
    Chunk(Bytes),
    End,
    Failed(String),
    Idle(Duration),
    Cancelled,
}

impl StreamSession {
    pub fn new(format: FrameFormat, sink: DeltaSink) -> Self {
        Self {
            decoder: format.decoder(),
            sink,
            idle_timeout: None,
        }
    }

    /// Fail the session when upstream sends nothing for this long
    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Open the upstream request and stream its body to completion.
    ///
    /// A failed open ends the session with an error before any delta. If the
    /// downstream side goes away at any point the upstream request is dropped.
    pub async fn run<F>(mut self, open: F)
    where
        F: Future<Output = AdapterResult<reqwest::Response>>,
    {
        self.sink.connecting();

        let idle_timeout = self.idle_timeout;
        let open = async move {
            match idle_timeout {
                Some(limit) => tokio::time::timeout(limit, open).await.unwrap_or_else(|_| {
                    warn!("no upstream response within {:?}", limit);
                    Err(idle_error(limit))
                }),
                None => open.await,
            }
        };

        let opened = tokio::select! {
            _ = self.sink.closed() => None,
            result = open => Some(result),
        };

        match opened {
            None => self.sink.cancel(),
            Some(Err(err)) => {
                self.sink
                    .finish(TerminalSignal::Error(err.to_string()))
                    .await
            }
            Some(Ok(response)) => self.pump(response.bytes_stream()).await,
        }
    }

    /// Drive an already opened byte stream to its terminal event
    pub async fn pump<S, E>(self, stream: S)
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let StreamSession {
            mut decoder,
            mut sink,
            idle_timeout,
        } = self;
        tokio::pin!(stream);

        loop {
            let read = async {
                let next = match idle_timeout {
                    Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
                        Ok(next) => next,
                        Err(_) => return Step::Idle(limit),
                    },
                    None => stream.next().await,
                };
                match next {
                    Some(Ok(chunk)) => Step::Chunk(chunk),
                    Some(Err(err)) => Step::Failed(err.to_string()),
                    None => Step::End,
                }
            };

            let step = tokio::select! {
                _ = sink.closed() => Step::Cancelled,
                step = read => step,
            };

            match step {
                Step::Chunk(chunk) => {
                    for delta in decoder.feed(&chunk) {
                        if sink.delta(delta).await.is_err() {
                            sink.cancel();
                            return;
                        }
                    }
                }
                Step::End => {
                    if let Some(last) = decoder.finish() {
                        if sink.delta(last).await.is_err() {
                            sink.cancel();
                            return;
                        }
                    }
                    sink.finish(TerminalSignal::Done).await;
                    return;
                }
                Step::Failed(detail) => {
                    if decoder.buffered_len() > 0 {
                        debug!(
                            "discarding {} undecoded bytes after transport failure",
                            decoder.buffered_len()
                        );
                    }
                    let err = AdapterError::UpstreamTransport(detail);
                    sink.finish(TerminalSignal::Error(err.to_string())).await;
                    return;
                }
                Step::Idle(limit) => {
                    warn!("upstream idle for {:?}, ending session {}", limit, sink.id());
                    sink.finish(TerminalSignal::Error(idle_error(limit).to_string()))
                        .await;
                    return;
                }
                Step::Cancelled => {
                    sink.cancel();
                    return;
                }
            }
        }
    }
}
