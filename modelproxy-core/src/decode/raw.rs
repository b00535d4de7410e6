//! Unframed text passthrough

use super::FrameDecoder;

/// Forwards each chunk's text as a delta.
///
/// Only an incomplete UTF-8 sequence at the very end of a chunk is held back,
/// so the concatenation of deltas is the same for any chunking even though the
/// individual deltas follow the transport's boundaries.
#[derive(Debug, Clone, Default)]
pub struct RawDecoder {
    pending: Vec<u8>,
}

impl RawDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameDecoder for RawDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let complete = complete_prefix_len(&self.pending);
        if complete == 0 {
            return Vec::new();
        }
        let text: Vec<u8> = self.pending.drain(..complete).collect();
        vec![String::from_utf8_lossy(&text).into_owned()]
    }

    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }

    fn buffered_len(&self) -> usize {
        self.pending.len()
    }
}

/// Length of `bytes` without a trailing, still incomplete UTF-8 sequence
fn complete_prefix_len(bytes: &[u8]) -> usize {
    let len = bytes.len();
    for back in 1..=len.min(3) {
        let byte = bytes[len - back];
        if byte & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        let width = if byte & 0b1000_0000 == 0 {
            1
        } else if byte & 0b1110_0000 == 0b1100_0000 {
            2
        } else if byte & 0b1111_0000 == 0b1110_0000 {
            3
        } else if byte & 0b1111_1000 == 0b1111_0000 {
            4
        } else {
            1
        };
        return if width > back { len - back } else { len };
    }
    len
}
