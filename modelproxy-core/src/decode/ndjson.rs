//! Newline-delimited JSON decoding

use super::fields::delta_or_serialized;
use super::splitter::FrameSplitter;
use super::FrameDecoder;
use serde_json::Value;
use tracing::debug;

const NDJSON_FIELDS: &[&str] = &["delta", "text", "generated_text"];

/// Decoder for one JSON value per line (TGI-style streams).
#[derive(Debug, Clone)]
pub struct NdjsonDecoder {
    splitter: FrameSplitter,
}

impl NdjsonDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self {
            splitter: FrameSplitter::newline(),
        }
    }

    /// Decode one complete line. Blank lines yield nothing.
    pub fn decode_line(line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(value) => Some(delta_or_serialized(&value, NDJSON_FIELDS)),
            Err(e) => {
                debug!("NDJSON line is not JSON, forwarding raw text: {}", e);
                Some(line.to_string())
            }
        }
    }
}

impl Default for NdjsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder for NdjsonDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.splitter
            .push(chunk)
            .iter()
            .filter_map(|line| Self::decode_line(line))
            .collect()
    }

    fn finish(&mut self) -> Option<String> {
        self.splitter
            .take_remainder()
            .and_then(|rest| Self::decode_line(&rest))
    }

    fn buffered_len(&self) -> usize {
        self.splitter.buffered_len()
    }
}
