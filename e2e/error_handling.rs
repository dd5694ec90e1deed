//! E2E Test Suite: Error Handling
//!
//! Exercises the error taxonomy across all three codec layers:
//! - Size vs. size-mismatch vs. corruption classification in block decoding
//! - Truncation monotonicity (every strict prefix fails, and fails cleanly)
//! - Frame header, block checksum, and content checksum failures
//! - Trailing-data detection single-shot and chunked

use lz4pack::block::{self, CompressionMode};
use lz4pack::error::Error;
use lz4pack::frame::{self, FrameConfig, FrameDecoder};

fn digits(len: usize) -> Vec<u8> {
    b"0123456789".iter().copied().cycle().take(len).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Block layer
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn half_declared_size_is_a_size_error() {
    // 115 compressible bytes; decoding under a halved declaration must be
    // classified as a size problem, not corruption.
    let data = digits(115);
    let compressed = block::compress(&data, CompressionMode::Default, false, b"").unwrap();
    let err = block::decompress(&compressed, Some(data.len() / 2), b"").unwrap_err();
    assert!(matches!(err, Error::Size { .. }), "{err}");
    // The honest declaration still works.
    assert_eq!(block::decompress(&compressed, Some(data.len()), b"").unwrap(), data);
}

#[test]
fn astronomically_large_declaration_fails_fast() {
    let err = block::decompress(b"\x10\x20", Some((1usize << 32) + 64), b"").unwrap_err();
    assert!(matches!(err, Error::Size { .. }), "{err}");
}

#[test]
fn corrupt_block_payload_carries_an_offset() {
    let data = digits(500);
    let mut compressed = block::compress(&data, CompressionMode::Default, true, b"").unwrap();
    // Zero out the match offsets to break the sequence stream.
    for b in compressed.iter_mut().skip(20) {
        *b = 0;
    }
    match block::decompress(&compressed, None, b"") {
        Err(Error::CorruptInput { offset }) => assert!(offset >= 4),
        Err(Error::Size { .. }) | Err(Error::SizeMismatch { .. }) => {}
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn block_truncation_monotonicity() {
    let data = digits(200);
    let compressed = block::compress(&data, CompressionMode::Default, true, b"").unwrap();
    for len in 0..compressed.len() {
        assert!(
            block::decompress(&compressed[..len], None, b"").is_err(),
            "prefix {len} unexpectedly decoded"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame layer
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn frame_truncation_monotonicity() {
    let config = FrameConfig { content_checksum: true, block_checksum: true, ..FrameConfig::default() };
    let framed = frame::compress(&digits(5000), &config).unwrap();
    let mut dec = FrameDecoder::new();
    for len in 0..framed.len() {
        let err = dec.decompress(&framed[..len]).unwrap_err();
        assert!(matches!(err, Error::TruncatedInput { .. }), "prefix {len}: {err}");
    }
    // The complete frame still decodes with the same (reset) decoder.
    assert_eq!(dec.decompress(&framed).unwrap().0, digits(5000));
}

#[test]
fn bad_magic_is_a_corrupt_header() {
    let mut framed = frame::compress(b"x", &FrameConfig::default()).unwrap();
    framed[0] ^= 0xFF;
    assert!(matches!(
        frame::decompress(&framed).unwrap_err(),
        Error::CorruptHeader { .. }
    ));
}

#[test]
fn header_checksum_catches_descriptor_tampering() {
    let mut framed = frame::compress(b"x", &FrameConfig::default()).unwrap();
    framed[4] ^= 1 << 5; // flip the block-mode bit
    assert!(matches!(
        frame::decompress(&framed).unwrap_err(),
        Error::CorruptHeader { reason: "header checksum mismatch", .. }
    ));
}

#[test]
fn checksum_variants_carry_both_sides() {
    let config = FrameConfig { content_checksum: true, ..FrameConfig::default() };
    let mut framed = frame::compress(&digits(1000), &config).unwrap();
    let n = framed.len();
    framed[n - 2] ^= 0x10;
    match frame::decompress(&framed).unwrap_err() {
        Error::ContentChecksum { expected, actual } => assert_ne!(expected, actual),
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn block_checksum_failure_locates_the_block() {
    let config = FrameConfig { block_checksum: true, ..FrameConfig::default() };
    let mut framed = frame::compress(&digits(1000), &config).unwrap();
    // Header is 15 bytes (content size recorded); corrupt a byte inside the
    // first block payload, past its 4-byte block header.
    framed[15 + 4 + 1] ^= 0xFF;
    match frame::decompress(&framed).unwrap_err() {
        Error::BlockChecksum { offset, .. } => assert!(offset > 15),
        other => panic!("unexpected {other}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Trailing data
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn trailing_rejection_single_shot_vs_chunked() {
    let mut buf = frame::compress(b"the frame", &FrameConfig::default()).unwrap();
    let frame_len = buf.len();
    buf.extend_from_slice(b"###");

    // Single-shot: the whole buffer must be exactly one frame.
    assert!(matches!(
        frame::decompress(&buf).unwrap_err(),
        Error::TrailingData { trailing: 3, .. }
    ));

    // Chunked: the frame decodes, the junk is only rejected when fed.
    let mut dec = FrameDecoder::new();
    let p = dec.decompress_chunk(&buf).unwrap();
    assert!(p.frame_complete);
    assert_eq!(p.bytes_consumed, frame_len);
    assert_eq!(p.output, b"the frame");
    assert!(matches!(
        dec.decompress_chunk(&buf[frame_len..]).unwrap_err(),
        Error::TrailingData { trailing: 3, .. }
    ));
}

#[test]
fn errors_format_with_diagnostics() {
    let err = block::decompress(b"\x01\x00", None, b"").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains('4') || msg.contains("truncated"), "{msg}");
    assert!(std::error::Error::source(&err).is_none());
}
