//! The raw LZ4 block engine.
//!
//! This module is the opaque primitive the codec layers sit on: it turns a
//! byte slice into one LZ4 sequence stream and back, knows nothing about
//! frames, prefixes, or checksums, and reports failures as positions rather
//! than as the crate error taxonomy (classification happens in the layer
//! that owns the context — see `error.rs`).

pub mod compress;
pub mod decompress;

pub use compress::{compress, compress_high};
pub use decompress::{decompress, EngineFailure};

/// Largest input (or dictionary) the engine accepts, in bytes.
pub const MAX_INPUT_SIZE: usize = 0x7E00_0000;

/// Minimum encodable match length.
pub(crate) const MIN_MATCH: usize = 4;

/// Maximum backward distance a match offset can express.
pub(crate) const MAX_DISTANCE: usize = 65_535;

/// Worst-case compressed size for an `input_size`-byte block.
///
/// Returns `None` when `input_size` exceeds [`MAX_INPUT_SIZE`].
pub fn compress_bound(input_size: usize) -> Option<usize> {
    if input_size > MAX_INPUT_SIZE {
        return None;
    }
    Some(input_size + input_size / 255 + 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_is_monotonic_and_covers_expansion() {
        assert_eq!(compress_bound(0), Some(16));
        let a = compress_bound(1000).unwrap();
        let b = compress_bound(2000).unwrap();
        assert!(a < b);
        // A bound must cover the worst case: incompressible data expands by
        // one literal-run header byte per 255-byte run plus the token.
        assert!(compress_bound(255).unwrap() >= 255 + 2);
    }

    #[test]
    fn bound_rejects_oversized_input() {
        assert_eq!(compress_bound(MAX_INPUT_SIZE + 1), None);
        assert!(compress_bound(MAX_INPUT_SIZE).is_some());
    }

    #[test]
    fn empty_round_trip() {
        let c = compress(b"", b"", 1);
        assert_eq!(c, vec![0x00]);
        let d = decompress(&c, 0, b"").unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn incompressible_round_trip() {
        // 256 distinct bytes: no 4-byte match exists, everything is literal.
        let data: Vec<u8> = (0u8..=255).collect();
        let c = compress(&data, b"", 1);
        assert!(c.len() > data.len()); // expanded, as expected
        assert_eq!(decompress(&c, data.len(), b"").unwrap(), data);
    }

    #[test]
    fn repetitive_round_trip_compresses() {
        let data = b"abcdabcdabcdabcd".repeat(512);
        let c = compress(&data, b"", 1);
        assert!(c.len() < data.len() / 4);
        assert_eq!(decompress(&c, data.len(), b"").unwrap(), data);
    }

    #[test]
    fn dictionary_round_trip() {
        let dict = b"the quick brown fox jumps over the lazy dog. ".repeat(10);
        let data = b"the quick brown fox jumps over the lazy dog. again and again.".to_vec();
        let c_with = compress(&data, &dict, 1);
        let c_without = compress(&data, b"", 1);
        // The dictionary lets the first words match immediately.
        assert!(c_with.len() <= c_without.len());
        assert_eq!(decompress(&c_with, data.len(), &dict).unwrap(), data);
    }

    #[test]
    fn high_mode_never_worse_than_fast_on_text() {
        let data = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(64);
        let fast = compress(&data, b"", 1);
        let high = compress_high(&data, b"", 16);
        assert!(high.len() <= fast.len());
        assert_eq!(decompress(&high, data.len(), b"").unwrap(), data);
    }
}
