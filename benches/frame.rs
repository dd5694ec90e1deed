//! Criterion benchmarks for the frame codec.
//!
//! Run with:
//!   cargo bench --bench frame

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lz4pack::frame::{self, BlockMode, BlockSizeId, FrameConfig, FrameDecoder};

mod corpus {
    include!("corpus.rs");
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let size = 1 << 20;
    let data = corpus::synthetic_data(size);
    group.throughput(Throughput::Bytes(size as u64));

    for (name, config) in [
        ("compress_64kb_linked", FrameConfig::default()),
        (
            "compress_256kb_independent",
            FrameConfig {
                block_size_id: BlockSizeId::Max256Kb,
                block_mode: BlockMode::Independent,
                ..FrameConfig::default()
            },
        ),
        (
            "compress_checksummed",
            FrameConfig {
                content_checksum: true,
                block_checksum: true,
                ..FrameConfig::default()
            },
        ),
    ] {
        group.bench_with_input(BenchmarkId::new(name, size), &data, |b, data| {
            b.iter(|| frame::compress(data, &config).unwrap())
        });
    }

    let framed = frame::compress(&data, &FrameConfig::default()).unwrap();
    group.bench_with_input(BenchmarkId::new("decompress", size), &framed, |b, framed| {
        b.iter(|| frame::decompress(framed).unwrap())
    });

    // Chunked decoding at a typical network read size.
    group.bench_with_input(
        BenchmarkId::new("decompress_chunked_8k", size),
        &framed,
        |b, framed| {
            b.iter(|| {
                let mut dec = FrameDecoder::new();
                let mut out = Vec::new();
                let mut rest = &framed[..];
                while !rest.is_empty() {
                    let feed = rest.len().min(8192);
                    let p = dec.decompress_chunk(&rest[..feed]).unwrap();
                    out.extend_from_slice(&p.output);
                    rest = &rest[p.bytes_consumed..];
                }
                out
            })
        },
    );

    group.finish();
}

criterion_group!(benches, bench_frame);
criterion_main!(benches);
