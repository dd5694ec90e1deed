//! E2E Test Suite: Frame One-Shot API
//!
//! Validates whole-buffer frame compression and decompression:
//! - Round trips across the frame configuration matrix
//! - Header introspection via get_frame_info
//! - Content-size recording and verification
//! - Skippable frames
//! - Trailing-data rejection

use lz4pack::block::CompressionMode;
use lz4pack::error::Error;
use lz4pack::frame::{
    compress, decompress, get_frame_info, write_skippable, BlockMode, BlockSizeId, FrameConfig,
    FrameDecoder,
};

fn sample(len: usize) -> Vec<u8> {
    b"Now is the winter of our discontent made glorious summer. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration matrix
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn round_trip_configuration_matrix() {
    let data = sample(300 * 1024); // spans several blocks at every size
    for block_size_id in [
        BlockSizeId::Max64Kb,
        BlockSizeId::Max256Kb,
        BlockSizeId::Max1Mb,
    ] {
        for block_mode in [BlockMode::Linked, BlockMode::Independent] {
            for (content_checksum, block_checksum) in [(false, false), (true, false), (true, true)] {
                let config = FrameConfig {
                    block_size_id,
                    block_mode,
                    content_checksum,
                    block_checksum,
                    ..FrameConfig::default()
                };
                let framed = compress(&data, &config).unwrap();
                assert_eq!(
                    decompress(&framed).unwrap(),
                    data,
                    "{block_size_id:?}/{block_mode:?}/cc={content_checksum}/bc={block_checksum}"
                );
            }
        }
    }
}

#[test]
fn round_trip_compression_modes() {
    let data = sample(100_000);
    for mode in [
        CompressionMode::Default,
        CompressionMode::Fast { acceleration: 7 },
        CompressionMode::HighCompression { level: 12 },
    ] {
        let config = FrameConfig { mode, ..FrameConfig::default() };
        let framed = compress(&data, &config).unwrap();
        assert_eq!(decompress(&framed).unwrap(), data, "{mode:?}");
    }
}

#[test]
fn empty_content_round_trip() {
    let framed = compress(b"", &FrameConfig::default()).unwrap();
    assert!(decompress(&framed).unwrap().is_empty());
}

#[test]
fn linked_mode_improves_on_independent_for_cross_block_redundancy() {
    // Repetitive data much longer than one 64 KiB block.
    let data = sample(256 * 1024);
    let linked = compress(&data, &FrameConfig { block_mode: BlockMode::Linked, ..FrameConfig::default() }).unwrap();
    let indep = compress(&data, &FrameConfig { block_mode: BlockMode::Independent, ..FrameConfig::default() }).unwrap();
    assert!(linked.len() <= indep.len());
}

// ─────────────────────────────────────────────────────────────────────────────
// Header introspection
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn get_frame_info_reflects_configuration() {
    let config = FrameConfig {
        block_size_id: BlockSizeId::Max256Kb,
        block_mode: BlockMode::Independent,
        content_checksum: true,
        dictionary_id: Some(0xBEEF),
        ..FrameConfig::default()
    };
    let framed = compress(&sample(10), &config).unwrap();
    let info = get_frame_info(&framed).unwrap();
    assert_eq!(info.block_size_id, BlockSizeId::Max256Kb);
    assert_eq!(info.block_mode, BlockMode::Independent);
    assert!(info.content_checksum);
    assert_eq!(info.dictionary_id, Some(0xBEEF));
    assert_eq!(info.content_size, Some(10));
}

#[test]
fn get_frame_info_needs_a_full_header() {
    let framed = compress(b"x", &FrameConfig::default()).unwrap();
    for len in 0..7 {
        assert!(matches!(
            get_frame_info(&framed[..len]),
            Err(Error::TruncatedInput { .. })
        ));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Skippable frames and trailing data
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn skippable_frame_is_consumed_silently() {
    let mut stream = write_skippable(b"user metadata here", 5).unwrap();
    let framed = compress(b"real content", &FrameConfig::default()).unwrap();
    stream.extend_from_slice(&framed);

    let mut dec = FrameDecoder::new();
    let p = dec.decompress_chunk(&stream).unwrap();
    assert!(p.frame_complete);
    assert!(p.output.is_empty());
    let p = dec.decompress_chunk(&stream[p.bytes_consumed..]).unwrap();
    assert_eq!(p.output, b"real content");
}

#[test]
fn single_shot_rejects_trailing_bytes() {
    let mut framed = compress(b"payload", &FrameConfig::default()).unwrap();
    framed.extend_from_slice(b"XY");
    let err = decompress(&framed).unwrap_err();
    match err {
        Error::TrailingData { trailing, .. } => assert_eq!(trailing, 2),
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn single_shot_rejects_a_second_frame() {
    let mut framed = compress(b"one", &FrameConfig::default()).unwrap();
    framed.extend_from_slice(&compress(b"two", &FrameConfig::default()).unwrap());
    assert!(matches!(decompress(&framed).unwrap_err(), Error::TrailingData { .. }));
}
