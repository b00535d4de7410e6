//! Chunk-boundary invariance and reference scenarios for the frame decoders

use modelproxy_core::decode::{decode_chunks, FrameDecoder, FrameFormat, NdjsonDecoder};
use proptest::prelude::*;

/// Split `input` at the given (unsorted, possibly duplicate) offsets
fn split_at_points(input: &[u8], points: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts: Vec<usize> = points.iter().map(|p| p % (input.len() + 1)).collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(input[start..cut].to_vec());
        start = cut;
    }
    chunks.push(input[start..].to_vec());
    chunks
}

fn delta_text() -> impl Strategy<Value = String> {
    // Includes multibyte characters so that splits land inside UTF-8 sequences.
    prop::collection::vec(
        prop::sample::select(vec!["a", "Z", " ", "é", "日本", "🦀", "\\n", "{", "\""]),
        1..6,
    )
    .prop_map(|parts| parts.concat())
}

fn sse_body(deltas: &[String]) -> Vec<u8> {
    deltas
        .iter()
        .map(|d| format!("data: {}\n\n", serde_json::json!({ "delta": d })))
        .collect::<String>()
        .into_bytes()
}

fn ndjson_body(deltas: &[String]) -> Vec<u8> {
    deltas
        .iter()
        .map(|d| format!("{}\n", serde_json::json!({ "text": d })))
        .collect::<String>()
        .into_bytes()
}

proptest! {
    #[test]
    fn sse_any_split_matches_unsplit(
        deltas in prop::collection::vec(delta_text(), 1..8),
        points in prop::collection::vec(any::<usize>(), 0..12),
    ) {
        let body = sse_body(&deltas);
        let whole = decode_chunks(FrameFormat::Sse, [body.as_slice()]);
        let split = decode_chunks(FrameFormat::Sse, split_at_points(&body, &points));
        prop_assert_eq!(&whole, &deltas);
        prop_assert_eq!(split, whole);
    }

    #[test]
    fn ndjson_any_split_matches_unsplit(
        deltas in prop::collection::vec(delta_text(), 1..8),
        points in prop::collection::vec(any::<usize>(), 0..12),
    ) {
        let body = ndjson_body(&deltas);
        let whole = decode_chunks(FrameFormat::Ndjson, [body.as_slice()]);
        let split = decode_chunks(FrameFormat::Ndjson, split_at_points(&body, &points));
        prop_assert_eq!(&whole, &deltas);
        prop_assert_eq!(split, whole);
    }

    #[test]
    fn raw_any_split_preserves_text(
        text in "\\PC{0,40}",
        points in prop::collection::vec(any::<usize>(), 0..8),
    ) {
        let deltas = decode_chunks(FrameFormat::Raw, split_at_points(text.as_bytes(), &points));
        prop_assert_eq!(deltas.concat(), text);
    }

    #[test]
    fn garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        for format in [FrameFormat::Sse, FrameFormat::Ndjson, FrameFormat::Raw] {
            let _ = decode_chunks(format, [bytes.as_slice()]);
        }
    }
}

#[test]
fn scenario_ndjson_object_split_mid_key() {
    let deltas = decode_chunks(
        FrameFormat::Ndjson,
        [&b"{\"te"[..], &b"xt\":\"Hel\"}\n{\"text\":\"lo\"}\n"[..]],
    );
    assert_eq!(deltas, vec!["Hel", "lo"]);
}

#[test]
fn scenario_sse_two_events() {
    let deltas = decode_chunks(
        FrameFormat::Sse,
        [&b"data: {\"delta\":\"A\"}\n\ndata: {\"delta\":\"B\"}\n\n"[..]],
    );
    assert_eq!(deltas, vec!["A", "B"]);
}

#[test]
fn scenario_ndjson_non_json_line_is_forwarded() {
    let deltas = decode_chunks(FrameFormat::Ndjson, [&b"not-json-at-all\n"[..]]);
    assert_eq!(deltas, vec!["not-json-at-all"]);
}

#[test]
fn scenario_unterminated_tail_is_flushed() {
    let mut decoder = NdjsonDecoder::new();
    assert!(decoder.feed(b"{\"delta\":\"tail\"}").is_empty());
    assert_eq!(decoder.buffered_len(), 16);
    assert_eq!(decoder.finish(), Some("tail".to_string()));
    assert_eq!(decoder.buffered_len(), 0);
}

#[test]
fn sse_output_array_is_joined() {
    let deltas = decode_chunks(
        FrameFormat::Sse,
        [&b"{\"output\":[{\"content\":\"x\"},{\"text\":\"y\"}]}\n\n"[..]],
    );
    assert_eq!(deltas, vec!["xy"]);
}
