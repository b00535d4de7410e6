//! Delimiter-based frame splitting over a byte buffer

const BLANK_LINE: &[&[u8]] = &[b"\n\n", b"\r\n\r\n"];
const NEWLINE: &[&[u8]] = &[b"\n"];

/// Splits an incoming byte stream into frames separated by a delimiter.
///
/// Delimiters are located on raw bytes, so a multibyte UTF-8 sequence that is
/// split across chunks is reassembled before any text conversion happens. The
/// resulting frames depend only on the concatenated input, never on where the
/// chunk boundaries fell. With several delimiters the earliest match wins.
#[derive(Debug, Clone)]
pub struct FrameSplitter {
    buffer: Vec<u8>,
    delimiters: &'static [&'static [u8]],
    // No complete delimiter starts before this offset in `buffer`.
    scan_from: usize,
}

impl FrameSplitter {
    /// Create a splitter for the given non-empty delimiters
    pub fn new(delimiters: &'static [&'static [u8]]) -> Self {
        debug_assert!(!delimiters.is_empty() && delimiters.iter().all(|d| !d.is_empty()));
        Self {
            buffer: Vec::new(),
            delimiters,
            scan_from: 0,
        }
    }

    /// Splitter for blank-line separated events, LF or CRLF
    pub fn blank_line() -> Self {
        Self::new(BLANK_LINE)
    }

    /// Splitter for newline separated records
    pub fn newline() -> Self {
        Self::new(NEWLINE)
    }

    /// Append a chunk and return every frame it completed, without delimiters
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        let mut cursor = self.scan_from;
        while let Some((pos, len)) = self.find_delimiter(cursor) {
            frames.push(String::from_utf8_lossy(&self.buffer[start..pos]).into_owned());
            start = pos + len;
            cursor = start;
        }

        self.buffer.drain(..start);
        self.scan_from = self.buffer.len().saturating_sub(self.longest() - 1);
        frames
    }

    /// Take the unterminated remainder, leaving the splitter empty
    pub fn take_remainder(&mut self) -> Option<String> {
        self.scan_from = 0;
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }

    /// Number of bytes waiting for a delimiter
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Earliest complete delimiter at or after `from`, as (offset, length)
    fn find_delimiter(&self, from: usize) -> Option<(usize, usize)> {
        self.delimiters
            .iter()
            .filter_map(|d| find(&self.buffer[from..], d).map(|pos| (from + pos, d.len())))
            .min_by_key(|&(pos, _)| pos)
    }

    fn longest(&self) -> usize {
        self.delimiters.iter().map(|d| d.len()).max().unwrap_or(1)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_split_across_chunks() {
        let mut splitter = FrameSplitter::blank_line();
        assert!(splitter.push(b"one\n").is_empty());
        assert_eq!(splitter.push(b"\ntwo"), vec!["one".to_string()]);
        assert_eq!(splitter.take_remainder(), Some("two".to_string()));
        assert_eq!(splitter.take_remainder(), None);
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut splitter = FrameSplitter::newline();
        let frames = splitter.push(b"a\nb\n\nc");
        assert_eq!(frames, vec!["a", "b", ""]);
        assert_eq!(splitter.buffered_len(), 1);
    }

    #[test]
    fn test_utf8_sequence_split_across_chunks() {
        let bytes = "héllo\n".as_bytes();
        let mut splitter = FrameSplitter::newline();
        // Split inside the two-byte encoding of 'é'
        assert!(splitter.push(&bytes[..2]).is_empty());
        assert_eq!(splitter.push(&bytes[2..]), vec!["héllo".to_string()]);
    }

    #[test]
    fn test_crlf_blank_line_split_across_chunks() {
        let mut splitter = FrameSplitter::blank_line();
        assert!(splitter.push(b"data: A\r\n\r").is_empty());
        assert_eq!(splitter.push(b"\ndata: B\r\n\r\n"), vec!["data: A", "data: B"]);
        assert_eq!(splitter.buffered_len(), 0);
    }
}
