//! Frame production: the stateful [`FrameEncoder`] plus one-shot helpers.

use crate::block::{compress_with_mode, CompressionMode};
use crate::error::{Error, Result};
use crate::frame::header::{
    self, BlockMode, BlockSizeId, FrameInfo, BLOCK_UNCOMPRESSED_FLAG, END_MARK,
};
use crate::xxhash::{xxh32_oneshot, Xxh32State};

/// Window of prior input kept as the implicit dictionary in linked mode.
const LINKED_WINDOW: usize = 64 * 1024;

/// Everything that shapes the frames an encoder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameConfig {
    pub block_size_id: BlockSizeId,
    pub block_mode: BlockMode,
    /// Append an XXH32 of the whole uncompressed content after the end mark.
    pub content_checksum: bool,
    /// Append an XXH32 after each block's stored payload.
    pub block_checksum: bool,
    pub mode: CompressionMode,
    /// Emit every [`FrameEncoder::update`] call's input immediately instead
    /// of buffering up to a full block.
    pub auto_flush: bool,
    /// Advisory dictionary identifier recorded in the header.
    pub dictionary_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncoderState {
    Unstarted,
    Started,
    Finished,
}

/// Stateful producer of one frame at a time.
///
/// Drive it `begin` → `update`* → `flush`* → `finish`; each call returns the
/// bytes to append to the stream. `reset` returns a finished (or abandoned)
/// encoder to `Unstarted` so it can produce another frame.
pub struct FrameEncoder {
    config: FrameConfig,
    state: EncoderState,
    /// Buffered input waiting to fill a block.
    pending: Vec<u8>,
    /// Trailing window of prior input, linked mode only.
    window: Vec<u8>,
    hasher: Xxh32State,
    content_len: u64,
}

impl FrameEncoder {
    pub fn new(config: FrameConfig) -> Result<Self> {
        // Per-block checksums entered the format with engine 1.8.0.
        if config.block_checksum && crate::version_number() < 10800 {
            return Err(Error::Configuration {
                reason: format!(
                    "block checksums require engine 1.8.0 or newer, this is {}",
                    crate::version_string()
                ),
            });
        }
        Ok(FrameEncoder {
            config,
            state: EncoderState::Unstarted,
            pending: Vec::new(),
            window: Vec::new(),
            hasher: Xxh32State::new(0),
            content_len: 0,
        })
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Emit the frame header. `content_size` is recorded in the header when
    /// given; the decoder will then verify the frame decodes to exactly that
    /// many bytes.
    pub fn begin(&mut self, content_size: Option<u64>) -> Result<Vec<u8>> {
        match self.state {
            EncoderState::Unstarted => {}
            EncoderState::Started => {
                return Err(Error::State {
                    operation: "begin",
                    reason: "frame already started",
                })
            }
            EncoderState::Finished => {
                return Err(Error::State {
                    operation: "begin",
                    reason: "frame already finished; reset first",
                })
            }
        }
        self.state = EncoderState::Started;
        let info = FrameInfo {
            block_size_id: self.config.block_size_id,
            block_mode: self.config.block_mode,
            block_checksum: self.config.block_checksum,
            content_checksum: self.config.content_checksum,
            content_size,
            dictionary_id: self.config.dictionary_id,
        };
        Ok(header::write_header(&info))
    }

    /// Feed input, returning whatever complete blocks it produced. With
    /// `auto_flush` the remainder is emitted too and nothing stays buffered.
    pub fn update(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.require_started("update")?;
        self.hasher.update(data);
        self.content_len += data.len() as u64;

        let block_size = self.config.block_size_id.bytes();
        let mut out = Vec::new();
        let mut rest = data;
        while self.pending.len() + rest.len() >= block_size {
            let take = block_size - self.pending.len();
            if self.pending.is_empty() {
                // Whole block available without copying through the buffer.
                let (block, tail) = rest.split_at(block_size);
                self.emit_block(block, &mut out);
                rest = tail;
            } else {
                self.pending.extend_from_slice(&rest[..take]);
                rest = &rest[take..];
                let block = std::mem::take(&mut self.pending);
                self.emit_block(&block, &mut out);
            }
        }
        self.pending.extend_from_slice(rest);

        if self.config.auto_flush && !self.pending.is_empty() {
            let block = std::mem::take(&mut self.pending);
            self.emit_block(&block, &mut out);
        }
        Ok(out)
    }

    /// Emit any buffered partial block now.
    pub fn flush(&mut self) -> Result<Vec<u8>> {
        self.require_started("flush")?;
        let mut out = Vec::new();
        if !self.pending.is_empty() {
            let block = std::mem::take(&mut self.pending);
            self.emit_block(&block, &mut out);
        }
        Ok(out)
    }

    /// Emit the remaining buffered input, the end mark, and the content
    /// checksum when enabled. The encoder is `Finished` afterwards.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        self.require_started("finish")?;
        let mut out = self.flush()?;
        header::write_le32(&mut out, END_MARK);
        if self.config.content_checksum {
            header::write_le32(&mut out, self.hasher.digest());
        }
        self.state = EncoderState::Finished;
        Ok(out)
    }

    /// Discard all frame state and return to `Unstarted`.
    pub fn reset(&mut self) {
        self.state = EncoderState::Unstarted;
        self.pending.clear();
        self.window.clear();
        self.hasher = Xxh32State::new(0);
        self.content_len = 0;
    }

    /// Uncompressed bytes accepted since `begin`.
    pub fn content_len(&self) -> u64 {
        self.content_len
    }

    fn require_started(&self, operation: &'static str) -> Result<()> {
        match self.state {
            EncoderState::Started => Ok(()),
            EncoderState::Unstarted => Err(Error::State {
                operation,
                reason: "frame not started; call begin first",
            }),
            EncoderState::Finished => Err(Error::State {
                operation,
                reason: "frame already finished; reset first",
            }),
        }
    }

    /// Compress one block (≤ the configured block size) and append its
    /// header, payload, and optional checksum to `out`.
    fn emit_block(&mut self, data: &[u8], out: &mut Vec<u8>) {
        let dict: &[u8] = match self.config.block_mode {
            BlockMode::Linked => &self.window,
            BlockMode::Independent => b"",
        };
        let compressed = compress_with_mode(data, dict, self.config.mode);

        // Store verbatim when compression does not pay for itself.
        let (payload, flag): (&[u8], u32) = if compressed.len() >= data.len() {
            (data, BLOCK_UNCOMPRESSED_FLAG)
        } else {
            (&compressed, 0)
        };
        header::write_le32(out, payload.len() as u32 | flag);
        out.extend_from_slice(payload);
        if self.config.block_checksum {
            header::write_le32(out, xxh32_oneshot(payload, 0));
        }

        if matches!(self.config.block_mode, BlockMode::Linked) {
            if data.len() >= LINKED_WINDOW {
                self.window.clear();
                self.window.extend_from_slice(&data[data.len() - LINKED_WINDOW..]);
            } else {
                let keep = LINKED_WINDOW - data.len();
                if self.window.len() > keep {
                    self.window.drain(..self.window.len() - keep);
                }
                self.window.extend_from_slice(data);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Compress `data` into one complete frame, recording its content size.
pub fn compress(data: &[u8], config: &FrameConfig) -> Result<Vec<u8>> {
    let mut enc = FrameEncoder::new(*config)?;
    let mut out = enc.begin(Some(data.len() as u64))?;
    out.extend_from_slice(&enc.update(data)?);
    out.extend_from_slice(&enc.finish()?);
    Ok(out)
}

/// Wrap `payload` in a skippable frame with magic `0x184D2A50 + sub_magic`.
pub fn write_skippable(payload: &[u8], sub_magic: u8) -> Result<Vec<u8>> {
    if sub_magic > 0x0F {
        return Err(Error::Configuration {
            reason: format!("skippable sub-magic {sub_magic} outside 0..=15"),
        });
    }
    if payload.len() > u32::MAX as usize {
        return Err(Error::Size {
            what: "skippable payload",
            size: payload.len() as u64,
            limit: u32::MAX as u64,
        });
    }
    let mut out = Vec::with_capacity(8 + payload.len());
    header::write_le32(&mut out, header::SKIPPABLE_MAGIC_BASE + u32::from(sub_magic));
    header::write_le32(&mut out, payload.len() as u32);
    out.extend_from_slice(payload);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::header::{parse_header, ParsedHeader, FRAME_MAGIC};

    #[test]
    fn begin_emits_a_parseable_header() {
        let mut enc = FrameEncoder::new(FrameConfig::default()).unwrap();
        let hdr = enc.begin(Some(42)).unwrap();
        match parse_header(&hdr).unwrap() {
            ParsedHeader::Frame { info, header_len } => {
                assert_eq!(header_len, hdr.len());
                assert_eq!(info.content_size, Some(42));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn state_machine_rejects_out_of_order_calls() {
        let mut enc = FrameEncoder::new(FrameConfig::default()).unwrap();
        assert!(matches!(enc.update(b"x"), Err(Error::State { operation: "update", .. })));
        assert!(matches!(enc.flush(), Err(Error::State { .. })));
        enc.begin(None).unwrap();
        assert!(matches!(enc.begin(None), Err(Error::State { operation: "begin", .. })));
        enc.finish().unwrap();
        assert!(matches!(enc.update(b"x"), Err(Error::State { .. })));
        assert!(matches!(enc.begin(None), Err(Error::State { .. })));
        enc.reset();
        enc.begin(None).unwrap();
    }

    #[test]
    fn buffering_respects_block_size() {
        let mut enc = FrameEncoder::new(FrameConfig::default()).unwrap();
        enc.begin(None).unwrap();
        // Less than a block: nothing comes out until flush.
        assert!(enc.update(&[7u8; 1000]).unwrap().is_empty());
        assert!(!enc.flush().unwrap().is_empty());
        // A second flush has nothing left.
        assert!(enc.flush().unwrap().is_empty());
    }

    #[test]
    fn auto_flush_emits_immediately() {
        let config = FrameConfig { auto_flush: true, ..FrameConfig::default() };
        let mut enc = FrameEncoder::new(config).unwrap();
        enc.begin(None).unwrap();
        assert!(!enc.update(&[7u8; 1000]).unwrap().is_empty());
        assert!(enc.flush().unwrap().is_empty());
    }

    #[test]
    fn incompressible_block_is_stored_verbatim() {
        let mut enc = FrameEncoder::new(FrameConfig::default()).unwrap();
        enc.begin(None).unwrap();
        let data: Vec<u8> = (0..=255u8).collect();
        enc.update(&data).unwrap();
        let mut out = enc.finish().unwrap();
        let block_header = header::read_le32(&out);
        assert_ne!(block_header & BLOCK_UNCOMPRESSED_FLAG, 0);
        assert_eq!((block_header & !BLOCK_UNCOMPRESSED_FLAG) as usize, data.len());
        // End mark closes the frame.
        out.drain(..4 + data.len());
        assert_eq!(header::read_le32(&out), END_MARK);
    }

    #[test]
    fn one_shot_frame_opens_with_magic() {
        let out = compress(b"some content", &FrameConfig::default()).unwrap();
        assert_eq!(header::read_le32(&out), FRAME_MAGIC);
    }

    #[test]
    fn skippable_frame_layout() {
        let out = write_skippable(b"metadata", 3).unwrap();
        assert_eq!(header::read_le32(&out), header::SKIPPABLE_MAGIC_BASE + 3);
        assert_eq!(header::read_le32(&out[4..]), 8);
        assert_eq!(&out[8..], b"metadata");
        assert!(matches!(write_skippable(b"", 16), Err(Error::Configuration { .. })));
    }
}
