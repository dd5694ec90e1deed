//! E2E Test Suite: Double-Buffer Stream API
//!
//! Validates the length-prefixed streaming codec:
//! - Round trips across buffer sizes, prefix widths, and compression modes
//! - The record-by-record get_block/decompress API
//! - Window continuity between peers
//! - Configuration validation and prefix overflow

use lz4pack::block::CompressionMode;
use lz4pack::error::Error;
use lz4pack::stream::{PrefixLen, StreamCompressor, StreamConfig, StreamDecompressor};

fn sample(len: usize) -> Vec<u8> {
    b"Row, row, row your boat, gently down the stream; "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Round trips
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn round_trip_matrix() {
    let data = sample(40_000);
    for buffer_size in [32usize, 500, 4096, 64 * 1024] {
        for prefix_len in [PrefixLen::U16, PrefixLen::U32] {
            for mode in [CompressionMode::Default, CompressionMode::HighCompression { level: 4 }] {
                let config = StreamConfig { buffer_size, prefix_len, mode };
                let mut comp = StreamCompressor::new(config).unwrap();
                let mut decomp = StreamDecompressor::new(config).unwrap();
                let records = comp.compress(&data).unwrap();
                let (out, consumed) = decomp.decompress_chunk(&records).unwrap();
                assert_eq!(consumed, records.len(), "{buffer_size}/{prefix_len:?}/{mode:?}");
                assert_eq!(out, data, "{buffer_size}/{prefix_len:?}/{mode:?}");
            }
        }
    }
}

#[test]
fn incremental_feeding_matches_bulk() {
    let data = sample(10_000);
    let config = StreamConfig { buffer_size: 777, ..StreamConfig::default() };

    let mut bulk_comp = StreamCompressor::new(config).unwrap();
    let bulk = bulk_comp.compress(&data).unwrap();

    // Feeding the compressor piece-by-piece at exactly buffer_size per call
    // produces the same records as one bulk call.
    let mut inc_comp = StreamCompressor::new(config).unwrap();
    let mut incremental = Vec::new();
    for piece in data.chunks(777) {
        incremental.extend_from_slice(&inc_comp.compress(piece).unwrap());
    }
    assert_eq!(incremental, bulk);
}

#[test]
fn record_by_record_round_trip() {
    let config = StreamConfig { buffer_size: 1024, ..StreamConfig::default() };
    let mut comp = StreamCompressor::new(config).unwrap();
    let mut decomp = StreamDecompressor::new(config).unwrap();
    let data = sample(5000);
    let stream = comp.compress(&data).unwrap();

    let mut out = Vec::new();
    let mut rest = &stream[..];
    while !rest.is_empty() {
        let block = decomp.get_block(rest).unwrap().to_vec();
        rest = &rest[config.prefix_len.bytes() + block.len()..];
        out.extend_from_slice(&decomp.decompress(&block).unwrap());
    }
    assert_eq!(out, data);
}

#[test]
fn window_continuity_compresses_repeats_across_records() {
    let config = StreamConfig { buffer_size: 256, ..StreamConfig::default() };
    let mut comp = StreamCompressor::new(config).unwrap();
    let piece = sample(256);
    let first = comp.compress(&piece).unwrap();
    let second = comp.compress(&piece).unwrap();
    assert!(second.len() < first.len());
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation and failure modes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn zero_buffer_size_is_a_configuration_error() {
    let config = StreamConfig { buffer_size: 0, ..StreamConfig::default() };
    assert!(matches!(StreamCompressor::new(config), Err(Error::Configuration { .. })));
    assert!(matches!(StreamDecompressor::new(config), Err(Error::Configuration { .. })));
}

#[test]
fn oversized_buffer_size_is_a_buffer_size_error() {
    let config = StreamConfig { buffer_size: usize::MAX / 2, ..StreamConfig::default() };
    assert!(matches!(StreamCompressor::new(config), Err(Error::BufferSize { .. })));
}

#[test]
fn one_byte_prefix_overflow() {
    let config = StreamConfig {
        buffer_size: 1024,
        prefix_len: PrefixLen::U8,
        ..StreamConfig::default()
    };
    let mut comp = StreamCompressor::new(config).unwrap();
    // Incompressible kilobyte: the record cannot announce its own length.
    let data: Vec<u8> = (0..1024u32).map(|i| (i.wrapping_mul(2654435761) >> 24) as u8).collect();
    assert!(matches!(comp.compress(&data), Err(Error::Size { .. })));
}

#[test]
fn truncated_prefix_and_truncated_payload() {
    let config = StreamConfig::default();
    let mut comp = StreamCompressor::new(config).unwrap();
    let decomp = StreamDecompressor::new(config).unwrap();
    let records = comp.compress(b"enough data for one record").unwrap();
    assert!(matches!(decomp.get_block(&records[..2]), Err(Error::TruncatedInput { .. })));
    assert!(matches!(
        decomp.get_block(&records[..records.len() - 1]),
        Err(Error::TruncatedInput { .. })
    ));
}

#[test]
fn reset_forgets_the_window() {
    let config = StreamConfig { buffer_size: 128, ..StreamConfig::default() };
    let mut comp = StreamCompressor::new(config).unwrap();
    let mut decomp = StreamDecompressor::new(config).unwrap();
    let piece = sample(128);

    comp.compress(&piece).unwrap();
    comp.reset();
    let records = comp.compress(&piece).unwrap();
    // A fresh decompressor decodes records produced after a reset.
    let (out, _) = decomp.decompress_chunk(&records).unwrap();
    assert_eq!(out, piece);
}
