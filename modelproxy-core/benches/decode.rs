//! Decoder throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use modelproxy_core::decode::{decode_chunks, FrameFormat};

fn sse_body(events: usize) -> Vec<u8> {
    (0..events)
        .map(|i| format!("data: {{\"delta\":\"token {} \"}}\n\n", i))
        .collect::<String>()
        .into_bytes()
}

fn ndjson_body(lines: usize) -> Vec<u8> {
    (0..lines)
        .map(|i| format!("{{\"text\":\"token {} \"}}\n", i))
        .collect::<String>()
        .into_bytes()
}

/// Decode the same body under several transport chunk sizes
fn bench_chunk_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for (format, body) in [
        (FrameFormat::Sse, sse_body(2_000)),
        (FrameFormat::Ndjson, ndjson_body(2_000)),
        (FrameFormat::Raw, ndjson_body(2_000)),
    ] {
        group.throughput(Throughput::Bytes(body.len() as u64));
        for chunk_size in [7usize, 64, 4096] {
            group.bench_with_input(
                BenchmarkId::new(format.as_str(), chunk_size),
                &chunk_size,
                |b, &size| {
                    b.iter(|| decode_chunks(format, black_box(&body).chunks(size)));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_chunk_sizes);
criterion_main!(benches);
