//! The crate-wide error taxonomy.
//!
//! Every fallible operation in this crate reports through [`Error`]. Each
//! variant carries the diagnostics needed to reproduce the failure: byte
//! offsets are absolute within the input the caller handed in, sizes are in
//! bytes, checksum variants carry both sides of the comparison.
//!
//! The engine reports failures as bare positions ([`EngineFailure`]); the
//! classification into this taxonomy happens here, once per consumer layer,
//! because the meaning of an engine failure depends on who asked. A block
//! decode that overruns its capacity means the caller's declared size was
//! wrong ([`Error::Size`]); a frame block that overruns the negotiated
//! maximum means the stream itself is bad ([`Error::CorruptInput`]).

use std::fmt;

use crate::engine::EngineFailure;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A configuration or argument combination that can never work, detected
    /// before any data is touched.
    Configuration { reason: String },
    /// A size exceeds a hard limit of the format or the engine.
    Size {
        what: &'static str,
        size: u64,
        limit: u64,
    },
    /// A streaming buffer size outside the supported range.
    BufferSize { size: usize, limit: usize },
    /// An operation invoked in a state that does not permit it.
    State {
        operation: &'static str,
        reason: &'static str,
    },
    /// The input ends before a structural unit is complete.
    TruncatedInput { needed: usize, available: usize },
    /// The input is structurally invalid at the given byte offset.
    CorruptInput { offset: u64 },
    /// A frame header failed validation.
    CorruptHeader {
        reason: &'static str,
        offset: u64,
    },
    /// Decoding finished but produced a different number of bytes than the
    /// input declared.
    SizeMismatch { expected: u64, actual: u64 },
    /// The whole-content checksum did not match.
    ContentChecksum { expected: u32, actual: u32 },
    /// A per-block checksum did not match; `offset` locates the block.
    BlockChecksum {
        expected: u32,
        actual: u32,
        offset: u64,
    },
    /// Bytes remain after the structure that was being decoded ended.
    TrailingData { offset: u64, trailing: usize },
}

impl Error {
    /// Classify an engine failure raised while decoding a raw block whose
    /// output size was declared by the caller (stored prefix or explicit
    /// argument). An overflow means the declaration was too small.
    pub(crate) fn from_engine_block(failure: EngineFailure, declared: u64, payload_base: u64) -> Error {
        match failure {
            EngineFailure::Corrupt { offset } => Error::CorruptInput {
                offset: payload_base + offset as u64,
            },
            // The final size is unknowable once the capacity is exhausted;
            // all we can say is that it is past the declaration.
            EngineFailure::OutputOverflow { .. } => Error::Size {
                what: "decoded output",
                size: declared + 1,
                limit: declared,
            },
        }
    }

    /// Classify an engine failure raised while decoding a frame block. The
    /// capacity is the frame's negotiated maximum block size, so an overflow
    /// is corruption of the stream, not a bad caller claim.
    pub(crate) fn from_engine_frame(failure: EngineFailure, block_base: u64) -> Error {
        let offset = match failure {
            EngineFailure::Corrupt { offset } | EngineFailure::OutputOverflow { offset } => offset,
        };
        Error::CorruptInput {
            offset: block_base + offset as u64,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration { reason } => write!(f, "invalid configuration: {reason}"),
            Error::Size { what, size, limit } => {
                write!(f, "{what} of {size} bytes exceeds limit of {limit} bytes")
            }
            Error::BufferSize { size, limit } => {
                write!(f, "buffer size {size} outside supported range 1..={limit}")
            }
            Error::State { operation, reason } => {
                write!(f, "cannot {operation}: {reason}")
            }
            Error::TruncatedInput { needed, available } => {
                write!(f, "truncated input: need {needed} bytes, have {available}")
            }
            Error::CorruptInput { offset } => write!(f, "corrupt input at byte {offset}"),
            Error::CorruptHeader { reason, offset } => {
                write!(f, "corrupt frame header at byte {offset}: {reason}")
            }
            Error::SizeMismatch { expected, actual } => {
                write!(f, "decoded size mismatch: declared {expected} bytes, got {actual}")
            }
            Error::ContentChecksum { expected, actual } => {
                write!(
                    f,
                    "content checksum mismatch: stored {expected:#010x}, computed {actual:#010x}"
                )
            }
            Error::BlockChecksum { expected, actual, offset } => {
                write!(
                    f,
                    "block checksum mismatch at byte {offset}: stored {expected:#010x}, computed {actual:#010x}"
                )
            }
            Error::TrailingData { offset, trailing } => {
                write!(f, "{trailing} trailing bytes after frame end at byte {offset}")
            }
        }
    }
}

impl std::error::Error for Error {}
