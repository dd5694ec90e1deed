//! Double-buffer streaming codec.
//!
//! A [`StreamCompressor`] cuts its input into pieces of at most
//! `buffer_size` bytes and compresses each piece against the previous one,
//! emitting `[compressed length prefix][payload]` records. The matching
//! [`StreamDecompressor`] mirrors the two-buffer window, so both sides must
//! agree on `buffer_size` and the prefix width out of band — the records are
//! not self-describing the way frames are.

use crate::block::{compress_with_mode, CompressionMode};
use crate::engine;
use crate::error::{Error, Result};

/// Width of the compressed-length prefix in front of each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefixLen {
    U8,
    U16,
    #[default]
    U32,
}

impl PrefixLen {
    pub fn bytes(self) -> usize {
        match self {
            PrefixLen::U8 => 1,
            PrefixLen::U16 => 2,
            PrefixLen::U32 => 4,
        }
    }

    fn max_value(self) -> u64 {
        match self {
            PrefixLen::U8 => u8::MAX as u64,
            PrefixLen::U16 => u16::MAX as u64,
            PrefixLen::U32 => u32::MAX as u64,
        }
    }

    fn write(self, out: &mut Vec<u8>, value: usize) {
        match self {
            PrefixLen::U8 => out.push(value as u8),
            PrefixLen::U16 => out.extend_from_slice(&(value as u16).to_le_bytes()),
            PrefixLen::U32 => out.extend_from_slice(&(value as u32).to_le_bytes()),
        }
    }

    fn read(self, buf: &[u8]) -> usize {
        match self {
            PrefixLen::U8 => buf[0] as usize,
            PrefixLen::U16 => u16::from_le_bytes([buf[0], buf[1]]) as usize,
            PrefixLen::U32 => u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Largest uncompressed piece per record; also the window both sides
    /// keep. Must match between compressor and decompressor.
    pub buffer_size: usize,
    pub prefix_len: PrefixLen,
    pub mode: CompressionMode,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            buffer_size: 8 * 1024,
            prefix_len: PrefixLen::U32,
            mode: CompressionMode::Default,
        }
    }
}

impl StreamConfig {
    fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::Configuration {
                reason: "stream buffer size must be nonzero".to_string(),
            });
        }
        if self.buffer_size > engine::MAX_INPUT_SIZE {
            return Err(Error::BufferSize {
                size: self.buffer_size,
                limit: engine::MAX_INPUT_SIZE,
            });
        }
        Ok(())
    }
}

/// Two-buffer window shared by both directions: `bufs[index]` receives the
/// current piece, `bufs[1 - index]` holds the previous one and acts as the
/// dictionary.
#[derive(Debug, Default)]
struct DoubleBuffer {
    bufs: [Vec<u8>; 2],
    index: usize,
}

impl DoubleBuffer {
    fn previous(&self) -> &[u8] {
        &self.bufs[1 - self.index]
    }

    fn store_and_swap(&mut self, piece: &[u8]) {
        self.bufs[self.index].clear();
        self.bufs[self.index].extend_from_slice(piece);
        self.index = 1 - self.index;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compressor
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct StreamCompressor {
    config: StreamConfig,
    window: DoubleBuffer,
}

impl StreamCompressor {
    pub fn new(config: StreamConfig) -> Result<Self> {
        config.validate()?;
        Ok(StreamCompressor {
            config,
            window: DoubleBuffer::default(),
        })
    }

    /// Compress `chunk`, splitting it into `buffer_size` pieces. Returns the
    /// concatenated prefixed records.
    pub fn compress(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for piece in chunk.chunks(self.config.buffer_size) {
            let payload = compress_with_mode(piece, self.window.previous(), self.config.mode);
            if payload.len() as u64 > self.config.prefix_len.max_value() {
                return Err(Error::Size {
                    what: "compressed block",
                    size: payload.len() as u64,
                    limit: self.config.prefix_len.max_value(),
                });
            }
            self.config.prefix_len.write(&mut out, payload.len());
            out.extend_from_slice(&payload);
            self.window.store_and_swap(piece);
        }
        Ok(out)
    }

    /// Forget all history; the next piece compresses with no dictionary.
    pub fn reset(&mut self) {
        self.window = DoubleBuffer::default();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decompressor
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct StreamDecompressor {
    config: StreamConfig,
    window: DoubleBuffer,
}

impl StreamDecompressor {
    pub fn new(config: StreamConfig) -> Result<Self> {
        config.validate()?;
        Ok(StreamDecompressor {
            config,
            window: DoubleBuffer::default(),
        })
    }

    /// Strip one length prefix, returning the record payload it announces.
    pub fn get_block<'a>(&self, input: &'a [u8]) -> Result<&'a [u8]> {
        let prefix = self.config.prefix_len.bytes();
        if input.len() < prefix {
            return Err(Error::TruncatedInput {
                needed: prefix,
                available: input.len(),
            });
        }
        let payload_len = self.config.prefix_len.read(input);
        if input.len() < prefix + payload_len {
            return Err(Error::TruncatedInput {
                needed: prefix + payload_len,
                available: input.len(),
            });
        }
        Ok(&input[prefix..prefix + payload_len])
    }

    /// Decompress one record payload (as returned by [`get_block`]
    /// (Self::get_block)) against the mirrored window.
    pub fn decompress(&mut self, block: &[u8]) -> Result<Vec<u8>> {
        let piece = engine::decompress(block, self.config.buffer_size, self.window.previous())
            .map_err(|f| Error::from_engine_frame(f, 0))?;
        self.window.store_and_swap(&piece);
        Ok(piece)
    }

    /// Decode every complete prefixed record in `input`. Returns the
    /// concatenated output and how many input bytes were consumed; a partial
    /// trailing record is left unconsumed for the next call.
    pub fn decompress_chunk(&mut self, input: &[u8]) -> Result<(Vec<u8>, usize)> {
        let mut out = Vec::new();
        let mut consumed = 0;
        loop {
            let block = match self.get_block(&input[consumed..]) {
                Ok(block) => block,
                Err(Error::TruncatedInput { .. }) => break,
                Err(other) => return Err(other),
            };
            let record_len = self.config.prefix_len.bytes() + block.len();
            out.extend_from_slice(&self.decompress(block)?);
            consumed += record_len;
        }
        Ok((out, consumed))
    }

    /// Forget all history, mirroring [`StreamCompressor::reset`].
    pub fn reset(&mut self) {
        self.window = DoubleBuffer::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(config: StreamConfig, data: &[u8]) -> Vec<u8> {
        let mut comp = StreamCompressor::new(config).unwrap();
        let mut decomp = StreamDecompressor::new(config).unwrap();
        let records = comp.compress(data).unwrap();
        let (out, consumed) = decomp.decompress_chunk(&records).unwrap();
        assert_eq!(consumed, records.len());
        out
    }

    #[test]
    fn round_trip_across_buffer_sizes_and_prefixes() {
        let data = b"stream me gently down the stream, merrily merrily. ".repeat(100);
        for buffer_size in [64, 1024, 8 * 1024] {
            for prefix_len in [PrefixLen::U16, PrefixLen::U32] {
                let config = StreamConfig { buffer_size, prefix_len, ..StreamConfig::default() };
                assert_eq!(round_trip(config, &data), data, "{buffer_size}/{prefix_len:?}");
            }
        }
    }

    #[test]
    fn later_pieces_benefit_from_the_window() {
        let config = StreamConfig { buffer_size: 128, ..StreamConfig::default() };
        let mut comp = StreamCompressor::new(config).unwrap();
        let piece = b"a distinctive phrase that repeats across pieces, padded to length..!";
        let first = comp.compress(piece).unwrap();
        let second = comp.compress(piece).unwrap();
        // The second record matches against the first via the window.
        assert!(second.len() < first.len());
    }

    #[test]
    fn record_by_record_api() {
        let config = StreamConfig::default();
        let mut comp = StreamCompressor::new(config).unwrap();
        let mut decomp = StreamDecompressor::new(config).unwrap();
        let mut stream = Vec::new();
        for chunk in [&b"first chunk of data"[..], b"second chunk of data"] {
            stream.extend_from_slice(&comp.compress(chunk).unwrap());
        }
        let block = decomp.get_block(&stream).unwrap().to_vec();
        let first = decomp.decompress(&block).unwrap();
        assert_eq!(first, b"first chunk of data");
        let rest = &stream[config.prefix_len.bytes() + block.len()..];
        let block = decomp.get_block(rest).unwrap().to_vec();
        assert_eq!(decomp.decompress(&block).unwrap(), b"second chunk of data");
    }

    #[test]
    fn partial_record_is_left_unconsumed() {
        let config = StreamConfig::default();
        let mut comp = StreamCompressor::new(config).unwrap();
        let mut decomp = StreamDecompressor::new(config).unwrap();
        let records = comp.compress(b"some data worth a record").unwrap();
        let (out, consumed) = decomp.decompress_chunk(&records[..records.len() - 3]).unwrap();
        assert!(out.is_empty());
        assert_eq!(consumed, 0);
        let (out, consumed) = decomp.decompress_chunk(&records).unwrap();
        assert_eq!(out, b"some data worth a record");
        assert_eq!(consumed, records.len());
    }

    #[test]
    fn config_validation() {
        let bad = StreamConfig { buffer_size: 0, ..StreamConfig::default() };
        assert!(matches!(StreamCompressor::new(bad), Err(Error::Configuration { .. })));
        let bad = StreamConfig { buffer_size: engine::MAX_INPUT_SIZE + 1, ..StreamConfig::default() };
        assert!(matches!(StreamDecompressor::new(bad), Err(Error::BufferSize { .. })));
    }

    #[test]
    fn prefix_overflow_is_a_size_error() {
        // An incompressible 400-byte piece encodes past 255 bytes, which a
        // 1-byte length prefix cannot record.
        let config = StreamConfig {
            buffer_size: 400,
            prefix_len: PrefixLen::U8,
            ..StreamConfig::default()
        };
        let mut comp = StreamCompressor::new(config).unwrap();
        let data: Vec<u8> = (0..400u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
            .collect();
        assert!(matches!(comp.compress(&data), Err(Error::Size { .. })));
    }

    #[test]
    fn desynchronized_window_never_panics() {
        let config = StreamConfig { buffer_size: 64, ..StreamConfig::default() };
        let mut comp = StreamCompressor::new(config).unwrap();
        let data = b"window-dependent content that repeats, window-dependent content!".repeat(4);
        let records = comp.compress(&data).unwrap();
        // Fresh decompressor skips the first record: offsets reaching into
        // the missing window must fail cleanly, not crash.
        let mut decomp = StreamDecompressor::new(config).unwrap();
        let first = decomp.get_block(&records).unwrap();
        let second_start = config.prefix_len.bytes() + first.len();
        match decomp.decompress_chunk(&records[second_start..]) {
            Err(Error::CorruptInput { .. }) => {}
            Ok((out, _)) => assert_ne!(out, data[64..].to_vec()),
            Err(other) => panic!("unexpected {other}"),
        }
    }
}
