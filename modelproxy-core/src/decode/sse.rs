//! SSE-style event decoding

use super::fields::{delta_or_serialized, extract_text_field};
use super::splitter::FrameSplitter;
use super::FrameDecoder;
use serde_json::Value;
use tracing::debug;

const SSE_FIELDS: &[&str] = &["delta", "text", "chunk"];

/// Decoder for blank-line separated events, each optionally prefixed by `data:`.
///
/// JSON payloads yield their `delta`, `text` or `chunk` field (in that order),
/// then the joined `output[].content` of LocalAI responses, then the serialized
/// payload itself. Anything that is not JSON is forwarded verbatim.
#[derive(Debug, Clone)]
pub struct SseDecoder {
    splitter: FrameSplitter,
}

impl SseDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self {
            splitter: FrameSplitter::blank_line(),
        }
    }

    /// Decode one complete event. Blank events yield nothing.
    pub fn decode_event(event: &str) -> Option<String> {
        let trimmed = event.trim();
        let payload = match trimmed.strip_prefix("data:") {
            Some(rest) => rest.trim_start(),
            None => trimmed,
        };
        if payload.is_empty() {
            return None;
        }

        match serde_json::from_str::<Value>(payload) {
            Ok(value) => Some(sse_delta(&value)),
            Err(e) => {
                debug!("SSE event is not JSON, forwarding raw text: {}", e);
                Some(payload.to_string())
            }
        }
    }
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder for SseDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.splitter
            .push(chunk)
            .iter()
            .filter_map(|event| Self::decode_event(event))
            .collect()
    }

    fn finish(&mut self) -> Option<String> {
        self.splitter
            .take_remainder()
            .and_then(|rest| Self::decode_event(&rest))
    }

    fn buffered_len(&self) -> usize {
        self.splitter.buffered_len()
    }
}

fn sse_delta(value: &Value) -> String {
    if let Some(text) = extract_text_field(value, SSE_FIELDS) {
        return text.to_string();
    }
    if let Some(parts) = value.get("output").and_then(Value::as_array) {
        let joined: String = parts
            .iter()
            .filter_map(|part| extract_text_field(part, &["content", "text"]))
            .collect();
        if !joined.is_empty() {
            return joined;
        }
    }
    delta_or_serialized(value, &[])
}
