//! lz4pack — stateful LZ4 codecs.
//!
//! Three layers over one compression engine:
//!
//! - [`block`]: single-shot raw blocks, optionally size-prefixed, optionally
//!   dictionary-biased. Smallest overhead, nothing self-describing.
//! - [`frame`]: the self-describing LZ4 frame container with its own header,
//!   block sizing, optional checksums, and end mark; stateful
//!   [`frame::FrameEncoder`]/[`frame::FrameDecoder`] plus one-shot helpers
//!   and the [`file`] `Read`/`Write` adapters.
//! - [`stream`]: double-buffer streaming of length-prefixed records for
//!   peers that share their configuration out of band.
//!
//! Every codec is a plain owned value; `&mut self` drives it, so a context
//! can never be entered from two threads at once.

pub mod block;
pub mod engine;
pub mod error;
pub mod file;
pub mod frame;
pub mod stream;
pub mod xxhash;

// ── Version constants ─────────────────────────────────────────────────────────
pub const VERSION_MAJOR: u32 = 1;
pub const VERSION_MINOR: u32 = 10;
pub const VERSION_RELEASE: u32 = 0;
pub const VERSION_NUMBER: u32 = VERSION_MAJOR * 100 * 100 + VERSION_MINOR * 100 + VERSION_RELEASE;
pub const VERSION_STRING: &str = "1.10.0";

/// Runtime engine version as a single number (`1.10.0` → `11000`).
pub fn version_number() -> u32 {
    VERSION_NUMBER
}

pub fn version_string() -> &'static str {
    VERSION_STRING
}

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use block::CompressionMode;
pub use error::{Error, Result};
pub use frame::{FrameConfig, FrameDecoder, FrameEncoder, FrameInfo, FrameProgress};
pub use stream::{PrefixLen, StreamCompressor, StreamConfig, StreamDecompressor};

#[cfg(test)]
mod tests {
    #[test]
    fn version_constants_agree() {
        assert_eq!(super::version_number(), 11000);
        assert_eq!(super::version_string(), "1.10.0");
    }
}
