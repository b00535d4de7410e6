//! Frame decoders for upstream streaming responses
//!
//! A decoder turns an arbitrarily chunked byte stream into an ordered sequence
//! of text deltas. Every decoder is owned by exactly one streaming session and
//! keeps the unconsumed tail of the stream in its own buffer, so it can be fed
//! chunk by chunk without ever assuming that a read ends on a frame boundary.
//!
//! Three wire formats are supported:
//! - [`SseDecoder`]: blank-line separated events, optionally `data:` prefixed
//! - [`NdjsonDecoder`]: one JSON value per line
//! - [`RawDecoder`]: every chunk of text is a delta as-is
//!
//! Malformed frames are never an error: whatever cannot be parsed as JSON is
//! forwarded verbatim as a delta.

mod fields;
mod ndjson;
mod raw;
mod splitter;
mod sse;

pub use fields::extract_text_field;
pub use ndjson::NdjsonDecoder;
pub use raw::RawDecoder;
pub use splitter::FrameSplitter;
pub use sse::SseDecoder;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Incremental decoder bound to a single streaming session
pub trait FrameDecoder: Send {
    /// Feed the next chunk of upstream bytes, returning every delta that became
    /// complete. Incomplete trailing data is retained for the next call.
    fn feed(&mut self, chunk: &[u8]) -> Vec<String>;

    /// Flush whatever is left once the transport signals end of data.
    /// Returns at most one final delta and leaves the decoder empty.
    fn finish(&mut self) -> Option<String>;

    /// Bytes currently held back waiting for more input
    fn buffered_len(&self) -> usize;
}

/// Streaming wire format spoken by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    /// `data:` blocks separated by a blank line
    Sse,
    /// Newline-delimited JSON
    Ndjson,
    /// Unframed text
    Raw,
}

impl FrameFormat {
    /// Create a fresh decoder for one session
    pub fn decoder(&self) -> Box<dyn FrameDecoder> {
        match self {
            FrameFormat::Sse => Box::new(SseDecoder::new()),
            FrameFormat::Ndjson => Box::new(NdjsonDecoder::new()),
            FrameFormat::Raw => Box::new(RawDecoder::new()),
        }
    }

    /// Lowercase name used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameFormat::Sse => "sse",
            FrameFormat::Ndjson => "ndjson",
            FrameFormat::Raw => "raw",
        }
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sse" => Ok(FrameFormat::Sse),
            "ndjson" | "jsonl" => Ok(FrameFormat::Ndjson),
            "raw" | "text" => Ok(FrameFormat::Raw),
            other => Err(format!("unknown stream framing '{}'", other)),
        }
    }
}

/// Decode a complete sequence of chunks, including the end-of-stream flush
pub fn decode_chunks<I, B>(format: FrameFormat, chunks: I) -> Vec<String>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut decoder = format.decoder();
    let mut deltas = Vec::new();
    for chunk in chunks {
        deltas.extend(decoder.feed(chunk.as_ref()));
    }
    deltas.extend(decoder.finish());
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("SSE".parse::<FrameFormat>(), Ok(FrameFormat::Sse));
        assert_eq!("ndjson".parse::<FrameFormat>(), Ok(FrameFormat::Ndjson));
        assert_eq!(" raw ".parse::<FrameFormat>(), Ok(FrameFormat::Raw));
        assert!("websocket".parse::<FrameFormat>().is_err());
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        for format in [FrameFormat::Sse, FrameFormat::Ndjson, FrameFormat::Raw] {
            let deltas = decode_chunks(format, Vec::<&[u8]>::new());
            assert!(deltas.is_empty(), "{} produced {:?}", format, deltas);
        }
    }
}
