//! Frame consumption: the incremental [`FrameDecoder`] plus one-shot helpers.
//!
//! The decoder is fed arbitrary slices of the stream and walks it one
//! structural unit at a time (header, block, end mark, checksum). A unit
//! that straddles a feed boundary is buffered internally and still counted
//! as consumed, so callers never have to re-feed bytes. Consumption stops at
//! every frame boundary: the remainder of the slice is left for the caller,
//! who may hand it to the decoder again (concatenated frames) or treat it as
//! something else entirely.

use crate::engine;
use crate::error::{Error, Result};
use crate::frame::header::{
    self, parse_header, FrameInfo, ParsedHeader, BLOCK_UNCOMPRESSED_FLAG, END_MARK,
};
use crate::xxhash::{xxh32_oneshot, Xxh32State};

/// Window of prior output kept as the dictionary for linked-mode blocks.
const LINKED_WINDOW: usize = 64 * 1024;

/// Result of one [`FrameDecoder::decompress_chunk`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameProgress {
    /// Uncompressed bytes produced by this call.
    pub output: Vec<u8>,
    /// Bytes of the input slice consumed (including any buffered tail of a
    /// partial structural unit).
    pub bytes_consumed: usize,
    /// A frame boundary was reached; unconsumed input follows it.
    pub frame_complete: bool,
}

/// The structural unit the decoder expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Frame magic and header (or nothing, at a clean boundary).
    Header,
    /// Inside a skippable frame with this many payload bytes left.
    Skippable { remaining: u32 },
    /// A 4-byte block header or end mark.
    BlockHeader,
    /// A block payload (and its checksum, when enabled).
    BlockData { stored_len: usize, uncompressed: bool },
    /// The 4-byte whole-content checksum after the end mark.
    ContentChecksum,
}

/// Incremental decoder for a stream of frames.
pub struct FrameDecoder {
    stage: Stage,
    /// Descriptor of the frame currently being decoded.
    info: Option<FrameInfo>,
    /// Tail of a structural unit waiting for more input.
    pending: Vec<u8>,
    /// Prior output window for linked-mode match offsets.
    window: Vec<u8>,
    hasher: Xxh32State,
    content_len: u64,
    /// Absolute stream offset of the next byte to decode (counts buffered
    /// pending bytes as consumed).
    position: u64,
    frames_completed: u64,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        FrameDecoder {
            stage: Stage::Header,
            info: None,
            pending: Vec::new(),
            window: Vec::new(),
            hasher: Xxh32State::new(0),
            content_len: 0,
            position: 0,
            frames_completed: 0,
        }
    }

    /// Drop all state, including the completed-frame count.
    pub fn reset(&mut self) {
        *self = FrameDecoder::new();
    }

    /// Frames fully decoded since construction or [`reset`](Self::reset).
    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// Descriptor of the frame currently in progress, once its header has
    /// been decoded.
    pub fn current_frame_info(&self) -> Option<&FrameInfo> {
        self.info.as_ref()
    }

    /// Decode as much of `input` as possible, stopping at the first frame
    /// boundary.
    ///
    /// After an error the decoder's state is unspecified; [`reset`]
    /// (Self::reset) it before reuse.
    pub fn decompress_chunk(&mut self, input: &[u8]) -> Result<FrameProgress> {
        let pending_len = self.pending.len();
        // Absolute stream offset of `work[0]`.
        let base = self.position - pending_len as u64;

        let owned;
        let work: &[u8] = if pending_len == 0 {
            input
        } else {
            let mut buf = std::mem::take(&mut self.pending);
            buf.extend_from_slice(input);
            owned = buf;
            &owned
        };

        let mut output = Vec::new();
        let mut pos = 0usize;
        let mut frame_complete = false;

        loop {
            let avail = &work[pos..];
            match self.stage {
                Stage::Header => {
                    if avail.is_empty() {
                        break;
                    }
                    match parse_header(avail) {
                        Ok(ParsedHeader::Frame { info, header_len }) => {
                            self.begin_frame(info);
                            pos += header_len;
                        }
                        Ok(ParsedHeader::Skippable { payload_len }) => {
                            pos += 8;
                            if payload_len == 0 {
                                self.complete_frame(&mut frame_complete);
                                break;
                            }
                            self.stage = Stage::Skippable { remaining: payload_len };
                        }
                        Err(Error::TruncatedInput { .. }) => {
                            // After a completed frame a short prefix is only
                            // worth buffering if it can still grow into a
                            // magic number; anything else is trailing junk.
                            if self.frames_completed > 0 && !magic_prefix(avail) {
                                return Err(Error::TrailingData {
                                    offset: base + pos as u64,
                                    trailing: avail.len(),
                                });
                            }
                            self.stash(&work[pos..]);
                            pos = work.len();
                            break;
                        }
                        Err(Error::CorruptHeader { reason: "bad magic number", .. })
                            if self.frames_completed > 0 =>
                        {
                            return Err(Error::TrailingData {
                                offset: base + pos as u64,
                                trailing: avail.len(),
                            });
                        }
                        Err(Error::CorruptHeader { reason, offset }) => {
                            return Err(Error::CorruptHeader {
                                reason,
                                offset: base + pos as u64 + offset,
                            });
                        }
                        Err(other) => return Err(other),
                    }
                }
                Stage::Skippable { remaining } => {
                    if avail.is_empty() {
                        break;
                    }
                    let take = (remaining as usize).min(avail.len());
                    pos += take;
                    let remaining = remaining - take as u32;
                    if remaining == 0 {
                        self.complete_frame(&mut frame_complete);
                        break;
                    }
                    self.stage = Stage::Skippable { remaining };
                }
                Stage::BlockHeader => {
                    if avail.is_empty() {
                        break;
                    }
                    if avail.len() < 4 {
                        self.stash(avail);
                        pos = work.len();
                        break;
                    }
                    let word = header::read_le32(avail);
                    pos += 4;
                    if word == END_MARK {
                        if self.info().content_checksum {
                            self.stage = Stage::ContentChecksum;
                        } else {
                            self.check_content_size()?;
                            self.complete_frame(&mut frame_complete);
                            break;
                        }
                    } else {
                        let stored_len = (word & !BLOCK_UNCOMPRESSED_FLAG) as usize;
                        let max_block = self.info().block_size_id.bytes();
                        if stored_len > max_block {
                            return Err(Error::CorruptInput {
                                offset: base + pos as u64 - 4,
                            });
                        }
                        self.stage = Stage::BlockData {
                            stored_len,
                            uncompressed: word & BLOCK_UNCOMPRESSED_FLAG != 0,
                        };
                    }
                }
                Stage::BlockData { stored_len, uncompressed } => {
                    let checksum_len = if self.info().block_checksum { 4 } else { 0 };
                    if avail.len() < stored_len + checksum_len {
                        self.stash(avail);
                        pos = work.len();
                        break;
                    }
                    let payload = &avail[..stored_len];
                    if checksum_len != 0 {
                        let stored = header::read_le32(&avail[stored_len..]);
                        let computed = xxh32_oneshot(payload, 0);
                        if stored != computed {
                            return Err(Error::BlockChecksum {
                                expected: stored,
                                actual: computed,
                                offset: base + (pos + stored_len) as u64,
                            });
                        }
                    }
                    let decoded = if uncompressed {
                        payload.to_vec()
                    } else {
                        let max_block = self.info().block_size_id.bytes();
                        engine::decompress(payload, max_block, &self.window)
                            .map_err(|f| Error::from_engine_frame(f, base + pos as u64))?
                    };
                    pos += stored_len + checksum_len;

                    self.hasher.update(&decoded);
                    self.content_len += decoded.len() as u64;
                    if matches!(self.info().block_mode, header::BlockMode::Linked) {
                        self.slide_window(&decoded);
                    }
                    output.extend_from_slice(&decoded);
                    self.stage = Stage::BlockHeader;
                }
                Stage::ContentChecksum => {
                    if avail.is_empty() {
                        break;
                    }
                    if avail.len() < 4 {
                        self.stash(avail);
                        pos = work.len();
                        break;
                    }
                    let stored = header::read_le32(avail);
                    let computed = self.hasher.digest();
                    if stored != computed {
                        return Err(Error::ContentChecksum {
                            expected: stored,
                            actual: computed,
                        });
                    }
                    pos += 4;
                    self.check_content_size()?;
                    self.complete_frame(&mut frame_complete);
                    break;
                }
            }
        }

        let bytes_consumed = pos - pending_len;
        self.position += bytes_consumed as u64;
        Ok(FrameProgress {
            output,
            bytes_consumed,
            frame_complete,
        })
    }

    /// Decode exactly one complete frame occupying the whole buffer.
    pub fn decompress(&mut self, input: &[u8]) -> Result<(Vec<u8>, usize)> {
        self.reset();
        let progress = self.decompress_chunk(input)?;
        if !progress.frame_complete {
            return Err(Error::TruncatedInput {
                needed: input.len() + 1,
                available: input.len(),
            });
        }
        if progress.bytes_consumed < input.len() {
            return Err(Error::TrailingData {
                offset: progress.bytes_consumed as u64,
                trailing: input.len() - progress.bytes_consumed,
            });
        }
        Ok((progress.output, progress.bytes_consumed))
    }

    fn info(&self) -> &FrameInfo {
        // Set by `begin_frame` before any block stage is reachable.
        self.info.as_ref().unwrap_or(&DEFAULT_INFO)
    }

    fn begin_frame(&mut self, info: FrameInfo) {
        self.info = Some(info);
        self.window.clear();
        self.hasher = Xxh32State::new(0);
        self.content_len = 0;
        self.stage = Stage::BlockHeader;
    }

    fn complete_frame(&mut self, flag: &mut bool) {
        self.frames_completed += 1;
        self.info = None;
        self.window.clear();
        self.stage = Stage::Header;
        *flag = true;
    }

    fn check_content_size(&self) -> Result<()> {
        if let Some(expected) = self.info().content_size {
            if expected != self.content_len {
                return Err(Error::SizeMismatch {
                    expected,
                    actual: self.content_len,
                });
            }
        }
        Ok(())
    }

    fn stash(&mut self, tail: &[u8]) {
        self.pending.clear();
        self.pending.extend_from_slice(tail);
    }

    fn slide_window(&mut self, decoded: &[u8]) {
        if decoded.len() >= LINKED_WINDOW {
            self.window.clear();
            self.window.extend_from_slice(&decoded[decoded.len() - LINKED_WINDOW..]);
        } else {
            let keep = LINKED_WINDOW - decoded.len();
            if self.window.len() > keep {
                self.window.drain(..self.window.len() - keep);
            }
            self.window.extend_from_slice(decoded);
        }
    }
}

/// Whether `prefix` could still extend into a frame or skippable magic.
fn magic_prefix(prefix: &[u8]) -> bool {
    let frame = header::FRAME_MAGIC.to_le_bytes();
    let skippable = header::SKIPPABLE_MAGIC_BASE.to_le_bytes();
    let as_frame = prefix.iter().zip(frame).all(|(a, b)| *a == b);
    // Any of the 16 sub-magics may follow; only the low nibble varies.
    let as_skippable = prefix
        .iter()
        .zip(skippable)
        .enumerate()
        .all(|(n, (a, b))| if n == 0 { *a & 0xF0 == b } else { *a == b });
    as_frame || as_skippable
}

static DEFAULT_INFO: FrameInfo = FrameInfo {
    block_size_id: header::BlockSizeId::Default,
    block_mode: header::BlockMode::Linked,
    block_checksum: false,
    content_checksum: false,
    content_size: None,
    dictionary_id: None,
};

// ─────────────────────────────────────────────────────────────────────────────
// One-shot helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Decompress a buffer holding exactly one complete frame.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    let mut dec = FrameDecoder::new();
    let (output, _) = dec.decompress(input)?;
    Ok(output)
}

/// Parse a stream prefix far enough to describe the frame it opens.
pub fn get_frame_info(prefix: &[u8]) -> Result<FrameInfo> {
    match parse_header(prefix)? {
        ParsedHeader::Frame { info, .. } => Ok(info),
        ParsedHeader::Skippable { .. } => Err(Error::Configuration {
            reason: "skippable frame carries no descriptor".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode::{self, FrameConfig};

    fn sample() -> Vec<u8> {
        b"Round and round the rugged rock the ragged rascal ran. ".repeat(40)
    }

    #[test]
    fn one_shot_round_trip() {
        let data = sample();
        let framed = encode::compress(&data, &FrameConfig::default()).unwrap();
        assert_eq!(decompress(&framed).unwrap(), data);
    }

    #[test]
    fn byte_at_a_time_feeding() {
        let data = sample();
        let framed = encode::compress(&data, &FrameConfig::default()).unwrap();
        let mut dec = FrameDecoder::new();
        let mut out = Vec::new();
        let mut completed = false;
        for b in &framed {
            let p = dec.decompress_chunk(std::slice::from_ref(b)).unwrap();
            assert_eq!(p.bytes_consumed, 1);
            out.extend_from_slice(&p.output);
            completed |= p.frame_complete;
        }
        assert!(completed);
        assert_eq!(out, data);
    }

    #[test]
    fn consumption_stops_at_frame_boundary() {
        let a = encode::compress(b"first frame", &FrameConfig::default()).unwrap();
        let b = encode::compress(b"second frame", &FrameConfig::default()).unwrap();
        let mut joined = a.clone();
        joined.extend_from_slice(&b);

        let mut dec = FrameDecoder::new();
        let p1 = dec.decompress_chunk(&joined).unwrap();
        assert!(p1.frame_complete);
        assert_eq!(p1.bytes_consumed, a.len());
        assert_eq!(p1.output, b"first frame");

        let p2 = dec.decompress_chunk(&joined[p1.bytes_consumed..]).unwrap();
        assert!(p2.frame_complete);
        assert_eq!(p2.output, b"second frame");
        assert_eq!(dec.frames_completed(), 2);
    }

    #[test]
    fn junk_after_a_frame_is_trailing_data() {
        let framed = encode::compress(b"payload", &FrameConfig::default()).unwrap();
        let mut dec = FrameDecoder::new();
        let p = dec.decompress_chunk(&framed).unwrap();
        assert!(p.frame_complete);
        let err = dec.decompress_chunk(b"garbage!").unwrap_err();
        assert!(matches!(err, Error::TrailingData { .. }), "{err}");
    }

    #[test]
    fn short_junk_after_a_frame_is_trailing_data() {
        let framed = encode::compress(b"payload", &FrameConfig::default()).unwrap();
        let mut dec = FrameDecoder::new();
        assert!(dec.decompress_chunk(&framed).unwrap().frame_complete);
        // Too short to parse as a header, but no magic starts with 0x23.
        let err = dec.decompress_chunk(b"###").unwrap_err();
        assert!(matches!(err, Error::TrailingData { trailing: 3, .. }), "{err}");
    }

    #[test]
    fn buffered_magic_prefix_turning_to_junk_is_trailing_data() {
        let framed = encode::compress(b"payload", &FrameConfig::default()).unwrap();
        let mut dec = FrameDecoder::new();
        assert!(dec.decompress_chunk(&framed).unwrap().frame_complete);
        // One byte that is a valid magic prefix gets buffered...
        let p = dec.decompress_chunk(b"\x04").unwrap();
        assert_eq!(p.bytes_consumed, 1);
        // ...until the next byte rules the magic out.
        let err = dec.decompress_chunk(b"#").unwrap_err();
        assert!(matches!(err, Error::TrailingData { trailing: 2, .. }), "{err}");
    }

    #[test]
    fn junk_before_any_frame_is_a_corrupt_header() {
        let mut dec = FrameDecoder::new();
        let err = dec.decompress_chunk(b"garbage!").unwrap_err();
        assert!(matches!(err, Error::CorruptHeader { .. }), "{err}");
    }

    #[test]
    fn skippable_frame_counts_as_complete_with_no_output() {
        let skip = encode::write_skippable(b"sidecar metadata", 0).unwrap();
        let mut dec = FrameDecoder::new();
        let p = dec.decompress_chunk(&skip).unwrap();
        assert!(p.frame_complete);
        assert!(p.output.is_empty());
        assert_eq!(p.bytes_consumed, skip.len());
    }

    #[test]
    fn content_checksum_detects_payload_corruption() {
        let config = FrameConfig { content_checksum: true, ..FrameConfig::default() };
        let data = sample();
        let mut framed = encode::compress(&data, &config).unwrap();
        // Flip one bit in the stored content checksum (last 4 bytes).
        let n = framed.len();
        framed[n - 1] ^= 0x01;
        let err = decompress(&framed).unwrap_err();
        assert!(matches!(err, Error::ContentChecksum { .. }), "{err}");
    }

    #[test]
    fn block_checksum_detects_block_corruption() {
        let config = FrameConfig { block_checksum: true, ..FrameConfig::default() };
        let data = sample();
        let mut framed = encode::compress(&data, &config).unwrap();
        // The one-shot helper records the content size, so the header runs
        // 15 bytes; corrupt a payload byte past the 4-byte block header.
        let hdr = header::MIN_FRAME_HEADER_SIZE + 8;
        framed[hdr + 4 + 2] ^= 0xFF;
        let err = decompress(&framed).unwrap_err();
        assert!(matches!(err, Error::BlockChecksum { .. }), "{err}");
    }

    #[test]
    fn declared_content_size_is_verified() {
        let mut enc = crate::frame::FrameEncoder::new(FrameConfig::default()).unwrap();
        let mut framed = enc.begin(Some(999)).unwrap();
        framed.extend_from_slice(&enc.update(b"only a few bytes").unwrap());
        framed.extend_from_slice(&enc.finish().unwrap());
        let err = decompress(&framed).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 999, .. }), "{err}");
    }

    #[test]
    fn truncation_is_always_reported() {
        let data = sample();
        let framed = encode::compress(&data, &FrameConfig::default()).unwrap();
        let mut dec = FrameDecoder::new();
        for len in 0..framed.len() {
            let err = dec.decompress(&framed[..len]).unwrap_err();
            assert!(matches!(err, Error::TruncatedInput { .. }), "prefix {len}: {err}");
        }
    }

    #[test]
    fn oversized_block_length_is_corrupt() {
        let mut framed = Vec::new();
        framed.extend_from_slice(&header::write_header(&FrameInfo::default()));
        // Claims a 1 MiB block in a 64 KiB frame.
        header::write_le32(&mut framed, 1 << 20);
        let err = FrameDecoder::new().decompress_chunk(&framed).unwrap_err();
        assert!(matches!(err, Error::CorruptInput { .. }), "{err}");
    }

    #[test]
    fn frame_info_is_reported() {
        let config = FrameConfig {
            content_checksum: true,
            dictionary_id: Some(7),
            ..FrameConfig::default()
        };
        let framed = encode::compress(b"x", &config).unwrap();
        let info = get_frame_info(&framed).unwrap();
        assert!(info.content_checksum);
        assert_eq!(info.dictionary_id, Some(7));
        assert_eq!(info.content_size, Some(1));
    }
}
