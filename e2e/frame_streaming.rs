//! E2E Test Suite: Frame Streaming API
//!
//! Validates the stateful encoder/decoder pair under incremental use:
//! - Encoder lifecycle (begin → update → flush → finish → reset)
//! - Decoder progress contract under arbitrary input re-chunking
//! - Frame-boundary consumption stops
//! - auto_flush behavior
//! - Context reuse after reset

use lz4pack::error::Error;
use lz4pack::frame::{decompress, FrameConfig, FrameDecoder, FrameEncoder};

fn sample(len: usize) -> Vec<u8> {
    b"All work and no play makes for a dull compression corpus. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn encode_in_chunks(data: &[u8], config: FrameConfig, chunk: usize) -> Vec<u8> {
    let mut enc = FrameEncoder::new(config).unwrap();
    let mut out = enc.begin(Some(data.len() as u64)).unwrap();
    for piece in data.chunks(chunk) {
        out.extend_from_slice(&enc.update(piece).unwrap());
    }
    out.extend_from_slice(&enc.finish().unwrap());
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoder side
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn chunked_encoding_equals_one_shot_content() {
    let data = sample(200_000);
    for chunk in [1usize, 77, 4096, 65_536, 200_000] {
        let framed = encode_in_chunks(&data, FrameConfig::default(), chunk);
        assert_eq!(decompress(&framed).unwrap(), data, "chunk {chunk}");
    }
}

#[test]
fn flush_emits_partial_blocks_mid_stream() {
    let mut enc = FrameEncoder::new(FrameConfig::default()).unwrap();
    let mut framed = enc.begin(None).unwrap();
    framed.extend_from_slice(&enc.update(b"first part, ").unwrap());
    let flushed = enc.flush().unwrap();
    assert!(!flushed.is_empty());
    framed.extend_from_slice(&flushed);
    framed.extend_from_slice(&enc.update(b"second part").unwrap());
    framed.extend_from_slice(&enc.finish().unwrap());
    assert_eq!(decompress(&framed).unwrap(), b"first part, second part");
}

#[test]
fn auto_flush_produces_output_per_update() {
    let config = FrameConfig { auto_flush: true, ..FrameConfig::default() };
    let mut enc = FrameEncoder::new(config).unwrap();
    let mut framed = enc.begin(None).unwrap();
    for piece in [&b"tiny "[..], b"pieces ", b"always ", b"emit"] {
        let out = enc.update(piece).unwrap();
        assert!(!out.is_empty());
        framed.extend_from_slice(&out);
    }
    framed.extend_from_slice(&enc.finish().unwrap());
    assert_eq!(decompress(&framed).unwrap(), b"tiny pieces always emit");
}

#[test]
fn encoder_reset_allows_a_second_frame() {
    let mut enc = FrameEncoder::new(FrameConfig::default()).unwrap();
    let mut first = enc.begin(None).unwrap();
    first.extend_from_slice(&enc.update(b"frame one").unwrap());
    first.extend_from_slice(&enc.finish().unwrap());

    enc.reset();
    let mut second = enc.begin(None).unwrap();
    second.extend_from_slice(&enc.update(b"frame two").unwrap());
    second.extend_from_slice(&enc.finish().unwrap());

    assert_eq!(decompress(&first).unwrap(), b"frame one");
    assert_eq!(decompress(&second).unwrap(), b"frame two");
}

#[test]
fn out_of_order_calls_are_state_errors() {
    let mut enc = FrameEncoder::new(FrameConfig::default()).unwrap();
    assert!(matches!(enc.finish(), Err(Error::State { .. })));
    enc.begin(None).unwrap();
    assert!(matches!(enc.begin(None), Err(Error::State { .. })));
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoder side
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decoding_is_invariant_under_re_chunking() {
    let data = sample(150_000);
    let framed = encode_in_chunks(&data, FrameConfig { content_checksum: true, ..FrameConfig::default() }, 10_000);
    for chunk in [1usize, 3, 19, 1024, 65_537, framed.len()] {
        let mut dec = FrameDecoder::new();
        let mut out = Vec::new();
        let mut fed = 0;
        let mut completed = false;
        while fed < framed.len() {
            let end = (fed + chunk).min(framed.len());
            let mut slice = &framed[fed..end];
            while !slice.is_empty() {
                let p = dec.decompress_chunk(slice).unwrap();
                out.extend_from_slice(&p.output);
                completed |= p.frame_complete;
                slice = &slice[p.bytes_consumed..];
            }
            fed = end;
        }
        assert!(completed, "chunk {chunk}");
        assert_eq!(out, data, "chunk {chunk}");
    }
}

#[test]
fn partial_units_are_buffered_and_counted_consumed() {
    let framed = encode_in_chunks(&sample(10_000), FrameConfig::default(), 10_000);
    let mut dec = FrameDecoder::new();
    // Feed a split that cuts inside the header and inside a block.
    let p = dec.decompress_chunk(&framed[..3]).unwrap();
    assert_eq!(p.bytes_consumed, 3);
    assert!(p.output.is_empty());
    let p = dec.decompress_chunk(&framed[3..40]).unwrap();
    assert_eq!(p.bytes_consumed, 37);
    let p = dec.decompress_chunk(&framed[40..]).unwrap();
    assert!(p.frame_complete);
    let mut out = Vec::new();
    out.extend_from_slice(&p.output);
    assert_eq!(out, sample(10_000));
}

#[test]
fn consumption_stops_at_each_frame_boundary() {
    let frames: Vec<Vec<u8>> = (0..3)
        .map(|i| encode_in_chunks(&sample(1000 + i), FrameConfig::default(), 512))
        .collect();
    let joined: Vec<u8> = frames.iter().flatten().copied().collect();

    let mut dec = FrameDecoder::new();
    let mut cursor = 0;
    for (i, frame) in frames.iter().enumerate() {
        let p = dec.decompress_chunk(&joined[cursor..]).unwrap();
        assert!(p.frame_complete, "frame {i}");
        assert_eq!(p.bytes_consumed, frame.len(), "frame {i}");
        assert_eq!(p.output, sample(1000 + i), "frame {i}");
        cursor += p.bytes_consumed;
    }
    assert_eq!(cursor, joined.len());
    assert_eq!(dec.frames_completed(), 3);
}

#[test]
fn decoder_reset_recovers_from_errors() {
    let mut dec = FrameDecoder::new();
    assert!(dec.decompress_chunk(b"not a frame").is_err());
    dec.reset();
    let framed = encode_in_chunks(b"clean again", FrameConfig::default(), 64);
    let p = dec.decompress_chunk(&framed).unwrap();
    assert!(p.frame_complete);
    assert_eq!(p.output, b"clean again");
}
