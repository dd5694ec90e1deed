//! Frame header layout: magic numbers, descriptor flags, and the
//! parsing/serialization of everything that precedes the first data block.
//!
//! Layout of a frame header:
//!
//! ```text
//! [magic  LE u32] [FLG] [BD] ([content size LE u64]) ([dict id LE u32]) [HC]
//! ```
//!
//! `FLG` bits 7..6 carry the format version (`01`), bit 5 block independence,
//! bit 4 per-block checksums, bit 3 content-size presence, bit 2 content
//! checksum, bit 0 dictionary-id presence; bit 1 is reserved. `BD` bits 6..4
//! carry the block-size table id; the rest are reserved. `HC` is the second
//! byte of `xxh32(descriptor, 0)`.
//!
//! Skippable frames are `[magic LE u32][payload len LE u32][payload]` with a
//! magic in `0x184D2A50..=0x184D2A5F`.

use crate::error::{Error, Result};
use crate::xxhash::xxh32_oneshot;

/// Magic number opening a standard frame.
pub const FRAME_MAGIC: u32 = 0x184D_2204;

/// First of the 16 skippable-frame magic numbers.
pub const SKIPPABLE_MAGIC_BASE: u32 = 0x184D_2A50;

/// High bit of a block header: the block payload is stored uncompressed.
pub const BLOCK_UNCOMPRESSED_FLAG: u32 = 0x8000_0000;

/// A zero block header terminates the frame's block section.
pub const END_MARK: u32 = 0;

/// Shortest possible frame header: magic, FLG, BD, HC.
pub const MIN_FRAME_HEADER_SIZE: usize = 7;

/// Longest possible frame header: all optional fields present.
pub const MAX_FRAME_HEADER_SIZE: usize = MIN_FRAME_HEADER_SIZE + 8 + 4;

const VERSION_BITS: u8 = 0b01;

// ─────────────────────────────────────────────────────────────────────────────
// Little-endian field helpers
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
pub(crate) fn read_le32(buf: &[u8]) -> u32 {
    u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}

#[inline]
pub(crate) fn read_le64(buf: &[u8]) -> u64 {
    u64::from_le_bytes([buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7]])
}

#[inline]
pub(crate) fn write_le32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

#[inline]
pub(crate) fn write_le64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

// ─────────────────────────────────────────────────────────────────────────────
// Descriptor fields
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum uncompressed size of one data block, from the format's size table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockSizeId {
    /// Alias for [`BlockSizeId::Max64Kb`], the format default.
    #[default]
    Default,
    Max64Kb,
    Max256Kb,
    Max1Mb,
    Max4Mb,
}

impl BlockSizeId {
    /// The 3-bit table id stored in `BD`.
    pub fn code(self) -> u8 {
        match self {
            BlockSizeId::Default | BlockSizeId::Max64Kb => 4,
            BlockSizeId::Max256Kb => 5,
            BlockSizeId::Max1Mb => 6,
            BlockSizeId::Max4Mb => 7,
        }
    }

    /// Maximum uncompressed block size in bytes.
    pub fn bytes(self) -> usize {
        match self {
            BlockSizeId::Default | BlockSizeId::Max64Kb => 64 * 1024,
            BlockSizeId::Max256Kb => 256 * 1024,
            BlockSizeId::Max1Mb => 1024 * 1024,
            BlockSizeId::Max4Mb => 4 * 1024 * 1024,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(BlockSizeId::Max64Kb),
            5 => Some(BlockSizeId::Max256Kb),
            6 => Some(BlockSizeId::Max1Mb),
            7 => Some(BlockSizeId::Max4Mb),
            _ => None,
        }
    }
}

/// Whether blocks may reference the previous block's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockMode {
    /// Match offsets may reach into earlier blocks (better ratio).
    #[default]
    Linked,
    /// Every block decodes on its own.
    Independent,
}

/// Everything a frame header declares about the stream that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    pub block_size_id: BlockSizeId,
    pub block_mode: BlockMode,
    pub block_checksum: bool,
    pub content_checksum: bool,
    /// Total uncompressed size, when the producer declared it.
    pub content_size: Option<u64>,
    pub dictionary_id: Option<u32>,
}

impl FrameInfo {
    /// Byte length of the header this info serializes to.
    pub fn header_len(&self) -> usize {
        MIN_FRAME_HEADER_SIZE
            + if self.content_size.is_some() { 8 } else { 0 }
            + if self.dictionary_id.is_some() { 4 } else { 0 }
    }
}

/// A successfully parsed frame opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedHeader {
    /// A standard frame; `header_len` bytes were consumed.
    Frame { info: FrameInfo, header_len: usize },
    /// A skippable frame; 8 header bytes then `payload_len` bytes to skip.
    Skippable { payload_len: u32 },
}

/// The checksum byte closing a frame descriptor: second byte of the XXH32 of
/// the descriptor bytes (FLG through the last optional field), seed 0.
pub fn header_checksum(descriptor: &[u8]) -> u8 {
    ((xxh32_oneshot(descriptor, 0) >> 8) & 0xFF) as u8
}

/// Serialize `info` into a complete frame header.
pub fn write_header(info: &FrameInfo) -> Vec<u8> {
    let mut out = Vec::with_capacity(info.header_len());
    write_le32(&mut out, FRAME_MAGIC);

    let mut flg = VERSION_BITS << 6;
    if matches!(info.block_mode, BlockMode::Independent) {
        flg |= 1 << 5;
    }
    if info.block_checksum {
        flg |= 1 << 4;
    }
    if info.content_size.is_some() {
        flg |= 1 << 3;
    }
    if info.content_checksum {
        flg |= 1 << 2;
    }
    if info.dictionary_id.is_some() {
        flg |= 1;
    }
    out.push(flg);
    out.push(info.block_size_id.code() << 4);
    if let Some(size) = info.content_size {
        write_le64(&mut out, size);
    }
    if let Some(id) = info.dictionary_id {
        write_le32(&mut out, id);
    }
    let hc = header_checksum(&out[4..]);
    out.push(hc);
    out
}

/// Parse the opening of a frame from `input`.
///
/// Returns [`Error::TruncatedInput`] when `input` is too short to decide —
/// `needed` names the prefix length that would suffice — and
/// [`Error::CorruptHeader`] for anything structurally invalid.
pub fn parse_header(input: &[u8]) -> Result<ParsedHeader> {
    if input.len() < 4 {
        return Err(Error::TruncatedInput {
            needed: MIN_FRAME_HEADER_SIZE,
            available: input.len(),
        });
    }
    let magic = read_le32(input);
    if (magic & !0x0F) == SKIPPABLE_MAGIC_BASE {
        if input.len() < 8 {
            return Err(Error::TruncatedInput {
                needed: 8,
                available: input.len(),
            });
        }
        return Ok(ParsedHeader::Skippable {
            payload_len: read_le32(&input[4..]),
        });
    }
    if magic != FRAME_MAGIC {
        return Err(Error::CorruptHeader {
            reason: "bad magic number",
            offset: 0,
        });
    }
    if input.len() < MIN_FRAME_HEADER_SIZE {
        return Err(Error::TruncatedInput {
            needed: MIN_FRAME_HEADER_SIZE,
            available: input.len(),
        });
    }

    let flg = input[4];
    let bd = input[5];
    if flg >> 6 != VERSION_BITS {
        return Err(Error::CorruptHeader {
            reason: "unsupported frame version",
            offset: 4,
        });
    }
    if flg & 0b0000_0010 != 0 {
        return Err(Error::CorruptHeader {
            reason: "reserved FLG bit set",
            offset: 4,
        });
    }
    if bd & 0b1000_1111 != 0 {
        return Err(Error::CorruptHeader {
            reason: "reserved BD bit set",
            offset: 5,
        });
    }
    let block_size_id = BlockSizeId::from_code((bd >> 4) & 0x07).ok_or(Error::CorruptHeader {
        reason: "invalid block size id",
        offset: 5,
    })?;

    let has_content_size = flg & (1 << 3) != 0;
    let has_dict_id = flg & 1 != 0;
    let header_len = MIN_FRAME_HEADER_SIZE
        + if has_content_size { 8 } else { 0 }
        + if has_dict_id { 4 } else { 0 };
    if input.len() < header_len {
        return Err(Error::TruncatedInput {
            needed: header_len,
            available: input.len(),
        });
    }

    let mut pos = 6;
    let content_size = if has_content_size {
        let v = read_le64(&input[pos..]);
        pos += 8;
        Some(v)
    } else {
        None
    };
    let dictionary_id = if has_dict_id {
        let v = read_le32(&input[pos..]);
        pos += 4;
        Some(v)
    } else {
        None
    };

    let stored_hc = input[pos];
    let computed_hc = header_checksum(&input[4..pos]);
    if stored_hc != computed_hc {
        return Err(Error::CorruptHeader {
            reason: "header checksum mismatch",
            offset: pos as u64,
        });
    }

    let info = FrameInfo {
        block_size_id,
        block_mode: if flg & (1 << 5) != 0 {
            BlockMode::Independent
        } else {
            BlockMode::Linked
        },
        block_checksum: flg & (1 << 4) != 0,
        content_checksum: flg & (1 << 2) != 0,
        content_size,
        dictionary_id,
    };
    Ok(ParsedHeader::Frame {
        info,
        header_len: pos + 1,
    })
}
