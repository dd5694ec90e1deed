//! `std::io` adapters over the frame codec.
//!
//! [`FrameWriter`] compresses everything written through it into one frame;
//! [`FrameReader`] decompresses a stream of frames (concatenated frames are
//! read back to back, skippable frames vanish). All framing logic lives in
//! the frame module; these types only move bytes between the codec and the
//! wrapped reader/writer.

use std::io::{self, Read, Write};

use crate::error::Error;
use crate::frame::{FrameConfig, FrameDecoder, FrameEncoder};

/// Compressed bytes pulled from the inner reader per refill.
const READ_CHUNK: usize = 8 * 1024;

fn to_io(e: Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

// ─────────────────────────────────────────────────────────────────────────────
// FrameWriter<W>
// ─────────────────────────────────────────────────────────────────────────────

/// Streaming frame compressor backed by any `W: Write`.
///
/// The frame header is written on construction; call [`finish`]
/// (Self::finish) to emit the trailer and recover the inner writer. Dropping
/// without finishing completes the frame best-effort, discarding errors.
pub struct FrameWriter<W: Write> {
    encoder: FrameEncoder,
    /// `Option` so `finish` can take ownership out from under `Drop`.
    inner: Option<W>,
    /// Once a write fails the frame is unsalvageable; `Drop` stops trying.
    errored: bool,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(mut writer: W, config: FrameConfig) -> io::Result<Self> {
        let mut encoder = FrameEncoder::new(config).map_err(to_io)?;
        let header = encoder.begin(None).map_err(to_io)?;
        writer.write_all(&header)?;
        Ok(FrameWriter {
            encoder,
            inner: Some(writer),
            errored: false,
        })
    }

    /// Emit the end mark (and content checksum when configured) and return
    /// the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        let trailer = self.encoder.finish().map_err(to_io)?;
        let mut writer = match self.inner.take() {
            Some(w) => w,
            None => return Err(io::Error::other("inner writer already taken")),
        };
        writer.write_all(&trailer)?;
        Ok(writer)
    }

    fn inner_mut(&mut self) -> io::Result<&mut W> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::other("inner writer already taken"))
    }
}

impl<W: Write> Write for FrameWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let produced = self.encoder.update(buf).map_err(|e| {
            self.errored = true;
            to_io(e)
        })?;
        if !produced.is_empty() {
            if let Err(e) = self.inner_mut()?.write_all(&produced) {
                self.errored = true;
                return Err(e);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let produced = self.encoder.flush().map_err(to_io)?;
        let writer = self.inner_mut()?;
        writer.write_all(&produced)?;
        writer.flush()
    }
}

impl<W: Write> Drop for FrameWriter<W> {
    fn drop(&mut self) {
        if self.errored || self.inner.is_none() {
            return;
        }
        // Best-effort frame completion; finish() is the checked path.
        if let Ok(trailer) = self.encoder.finish() {
            if let Some(writer) = self.inner.as_mut() {
                let _ = writer.write_all(&trailer);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FrameReader<R>
// ─────────────────────────────────────────────────────────────────────────────

/// Streaming frame decompressor backed by any `R: Read`.
pub struct FrameReader<R: Read> {
    decoder: FrameDecoder,
    inner: R,
    /// Compressed bytes read but not yet fed to the decoder.
    src: Vec<u8>,
    src_pos: usize,
    /// Decoded bytes not yet handed to the caller.
    out: Vec<u8>,
    out_pos: usize,
    eof: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        FrameReader {
            decoder: FrameDecoder::new(),
            inner: reader,
            src: Vec::new(),
            src_pos: 0,
            out: Vec::new(),
            out_pos: 0,
            eof: false,
        }
    }

    /// Return the inner reader, abandoning any buffered state.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Refill `self.out`; `Ok(false)` means the stream is exhausted.
    fn fill(&mut self) -> io::Result<bool> {
        loop {
            if self.src_pos == self.src.len() {
                if self.eof {
                    return Ok(false);
                }
                self.src.resize(READ_CHUNK, 0);
                let n = self.inner.read(&mut self.src)?;
                self.src.truncate(n);
                self.src_pos = 0;
                if n == 0 {
                    self.eof = true;
                    return Ok(false);
                }
            }
            let progress = self
                .decoder
                .decompress_chunk(&self.src[self.src_pos..])
                .map_err(to_io)?;
            self.src_pos += progress.bytes_consumed;
            if !progress.output.is_empty() {
                self.out = progress.output;
                self.out_pos = 0;
                return Ok(true);
            }
        }
    }
}

impl<R: Read> Read for FrameReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.out_pos == self.out.len() && !self.fill()? {
            return Ok(0);
        }
        let n = (self.out.len() - self.out_pos).min(buf.len());
        buf[..n].copy_from_slice(&self.out[self.out_pos..self.out_pos + n]);
        self.out_pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(compressed: &[u8]) -> Vec<u8> {
        let mut reader = FrameReader::new(Cursor::new(compressed));
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn write_then_read_round_trip() {
        let original: Vec<u8> = (0u8..=255).cycle().take(200 * 1024).collect();
        let mut writer = FrameWriter::new(Vec::new(), FrameConfig::default()).unwrap();
        for chunk in original.chunks(1000) {
            writer.write_all(chunk).unwrap();
        }
        let compressed = writer.finish().unwrap();
        assert_eq!(read_all(&compressed), original);
    }

    #[test]
    fn empty_round_trip() {
        let writer = FrameWriter::new(Vec::new(), FrameConfig::default()).unwrap();
        let compressed = writer.finish().unwrap();
        assert!(read_all(&compressed).is_empty());
    }

    #[test]
    fn drop_completes_the_frame() {
        let mut sink = Vec::new();
        {
            let mut writer = FrameWriter::new(&mut sink, FrameConfig::default()).unwrap();
            writer.write_all(b"finished by drop").unwrap();
        }
        assert_eq!(read_all(&sink), b"finished by drop");
    }

    #[test]
    fn concatenated_frames_read_back_to_back() {
        let mut stream = crate::frame::compress(b"alpha ", &FrameConfig::default()).unwrap();
        stream.extend_from_slice(&crate::frame::compress(b"beta", &FrameConfig::default()).unwrap());
        assert_eq!(read_all(&stream), b"alpha beta");
    }

    #[test]
    fn corrupt_stream_reports_invalid_data() {
        let mut stream = crate::frame::compress(b"intact", &FrameConfig::default()).unwrap();
        stream[1] ^= 0xFF; // break the magic
        let mut reader = FrameReader::new(Cursor::new(&stream));
        let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
