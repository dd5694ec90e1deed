//! The LZ4 frame container: self-describing streams of compressed blocks.
//!
//! A frame carries everything needed to decompress it — block sizing, block
//! linkage, optional checksums, optional content size — so frames can be
//! exchanged between independent producers and consumers, unlike raw blocks.

pub mod decode;
pub mod encode;
pub mod header;

pub use decode::{decompress, get_frame_info, FrameDecoder, FrameProgress};
pub use encode::{compress, write_skippable, FrameConfig, FrameEncoder};
pub use header::{BlockMode, BlockSizeId, FrameInfo};
