//! Raw block codec.
//!
//! Single-shot compression and decompression of one LZ4 block, with an
//! optional 4-byte little-endian size prefix and an optional external
//! dictionary. A raw block is not self-describing: without the prefix, the
//! decompressor must be told the uncompressed size, and both sides must
//! agree on the dictionary out of band.

use crate::engine;
use crate::error::{Error, Result};

/// How hard the match finder works on a block.
///
/// Out-of-range tuning values saturate to the supported range rather than
/// erroring, so callers can pass tuning knobs through unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMode {
    /// The fast path at its default acceleration.
    #[default]
    Default,
    /// The fast path with an explicit acceleration in `0..=9`; higher trades
    /// ratio for speed. `0` behaves like `1`.
    Fast { acceleration: i32 },
    /// The multi-candidate path with a search depth in `0..=16`.
    HighCompression { level: i32 },
}

/// Run the engine path `mode` selects, with its tuning value saturated.
pub(crate) fn compress_with_mode(data: &[u8], dict: &[u8], mode: CompressionMode) -> Vec<u8> {
    match mode {
        CompressionMode::Default => engine::compress(data, dict, 1),
        CompressionMode::Fast { acceleration } => {
            engine::compress(data, dict, acceleration.clamp(0, 9).max(1))
        }
        CompressionMode::HighCompression { level } => {
            engine::compress_high(data, dict, level.clamp(0, 16))
        }
    }
}

/// Worst-case compressed size for `input_size` bytes, including nothing but
/// the sequence stream (no size prefix).
pub fn compress_bound(input_size: usize) -> Result<usize> {
    engine::compress_bound(input_size).ok_or(Error::Size {
        what: "input",
        size: input_size as u64,
        limit: engine::MAX_INPUT_SIZE as u64,
    })
}

/// Compress `data` as one raw block.
///
/// With `store_size`, the output is `[uncompressed len, LE u32][payload]`;
/// otherwise it is the bare payload. `dict` biases the match finder with
/// shared history (only its trailing 64 KiB window is reachable).
pub fn compress(data: &[u8], mode: CompressionMode, store_size: bool, dict: &[u8]) -> Result<Vec<u8>> {
    if data.len() > engine::MAX_INPUT_SIZE {
        return Err(Error::Size {
            what: "input",
            size: data.len() as u64,
            limit: engine::MAX_INPUT_SIZE as u64,
        });
    }
    if dict.len() > engine::MAX_INPUT_SIZE {
        return Err(Error::Size {
            what: "dictionary",
            size: dict.len() as u64,
            limit: engine::MAX_INPUT_SIZE as u64,
        });
    }

    let payload = compress_with_mode(data, dict, mode);

    if store_size {
        let mut out = Vec::with_capacity(4 + payload.len());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    } else {
        Ok(payload)
    }
}

/// Decompress one raw block.
///
/// When `uncompressed_size` is `None`, the input must begin with the 4-byte
/// size prefix written by [`compress`] with `store_size`. When it is `Some`,
/// the input is the bare payload and the given size is authoritative; a
/// payload that decodes to more bytes than declared is rejected with
/// [`Error::Size`], fewer with [`Error::SizeMismatch`].
pub fn decompress(compressed: &[u8], uncompressed_size: Option<usize>, dict: &[u8]) -> Result<Vec<u8>> {
    let (declared, payload, payload_base) = match uncompressed_size {
        Some(n) => (n as u64, compressed, 0u64),
        None => {
            if compressed.len() < 4 {
                return Err(Error::TruncatedInput {
                    needed: 4,
                    available: compressed.len(),
                });
            }
            let n = u32::from_le_bytes([compressed[0], compressed[1], compressed[2], compressed[3]]);
            (u64::from(n), &compressed[4..], 4u64)
        }
    };

    if declared > engine::MAX_INPUT_SIZE as u64 {
        return Err(Error::Size {
            what: "declared uncompressed size",
            size: declared,
            limit: engine::MAX_INPUT_SIZE as u64,
        });
    }
    let declared = declared as usize;

    let out = engine::decompress(payload, declared, dict)
        .map_err(|failure| Error::from_engine_block(failure, declared as u64, payload_base))?;

    if out.len() != declared {
        return Err(Error::SizeMismatch {
            expected: declared as u64,
            actual: out.len() as u64,
        });
    }
    Ok(out)
}
