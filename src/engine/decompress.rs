//! Safe LZ4 sequence decoding.
//!
//! The decoder walks the sequence stream with every read bounds-checked and
//! never writes past the declared capacity. Failures carry the input offset
//! at which the violation was detected; the codec layers above translate
//! them into the crate error taxonomy.

/// Why the engine refused a sequence stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFailure {
    /// The stream is not valid LZ4: truncated field, zero offset, or a match
    /// reaching before the start of history.
    Corrupt { offset: usize },
    /// The stream is well-formed so far but decodes to more bytes than the
    /// caller allowed.
    OutputOverflow { offset: usize },
}

/// Decode one sequence stream into at most `dst_capacity` bytes.
///
/// `dict` is treated as the history immediately preceding the output, so
/// match offsets may reach back into it. The decoder stops at the terminal
/// literal run. Input remaining after the output region fills is still
/// parsed: a well-formed continuation reports [`EngineFailure::OutputOverflow`]
/// (the stream decodes to more than the caller allowed), a malformed one
/// reports [`EngineFailure::Corrupt`].
pub fn decompress(src: &[u8], dst_capacity: usize, dict: &[u8]) -> Result<Vec<u8>, EngineFailure> {
    let mut out: Vec<u8> = Vec::with_capacity(dst_capacity);
    let mut i = 0usize;

    loop {
        if i >= src.len() {
            // Every stream ends with a terminal literal run; running out of
            // input before one is corruption (this also rejects empty input).
            return Err(EngineFailure::Corrupt { offset: i });
        }
        let token_off = i;
        let token = src[i];
        i += 1;

        let mut lit_len = (token >> 4) as usize;
        if lit_len == 15 {
            loop {
                if i >= src.len() {
                    return Err(EngineFailure::Corrupt { offset: i });
                }
                let b = src[i];
                i += 1;
                lit_len += b as usize;
                if b != 255 {
                    break;
                }
            }
        }

        if src.len() - i < lit_len {
            return Err(EngineFailure::Corrupt { offset: i });
        }
        if dst_capacity - out.len() < lit_len {
            return Err(EngineFailure::OutputOverflow { offset: token_off });
        }
        out.extend_from_slice(&src[i..i + lit_len]);
        i += lit_len;

        if i == src.len() {
            // Terminal literal run: no match part follows.
            return Ok(out);
        }

        if src.len() - i < 2 {
            return Err(EngineFailure::Corrupt { offset: i });
        }
        let offset = u16::from_le_bytes([src[i], src[i + 1]]) as usize;
        if offset == 0 {
            return Err(EngineFailure::Corrupt { offset: i });
        }
        i += 2;

        let mut match_len = (token & 0x0F) as usize + 4;
        if match_len == 19 {
            loop {
                if i >= src.len() {
                    return Err(EngineFailure::Corrupt { offset: i });
                }
                let b = src[i];
                i += 1;
                match_len += b as usize;
                if b != 255 {
                    break;
                }
            }
        }

        if offset > out.len() + dict.len() {
            return Err(EngineFailure::Corrupt { offset: token_off });
        }
        if dst_capacity - out.len() < match_len {
            return Err(EngineFailure::OutputOverflow { offset: token_off });
        }

        let mut remaining = match_len;
        if offset > out.len() {
            // The match begins in the dictionary tail.
            let from_dict = (offset - out.len()).min(remaining);
            let start = dict.len() - (offset - out.len());
            out.extend_from_slice(&dict[start..start + from_dict]);
            remaining -= from_dict;
        }
        if remaining > 0 {
            if offset >= remaining {
                let start = out.len() - offset;
                out.extend_from_within(start..start + remaining);
            } else {
                // Overlapped copy: the source advances as we write.
                for _ in 0..remaining {
                    let b = out[out.len() - offset];
                    out.push(b);
                }
            }
        }
        // A full output region is not terminal by itself: the next sequence
        // decides between a clean end (empty terminal run), overflow (more
        // literals or a match), and corruption (a malformed sequence).
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_corrupt() {
        assert_eq!(decompress(b"", 10, b""), Err(EngineFailure::Corrupt { offset: 0 }));
    }

    #[test]
    fn literal_only_stream() {
        // Token 0x10: one literal, then terminal.
        assert_eq!(decompress(&[0x10, 0x20], 1, b"").unwrap(), b" ");
        // Token 0x00: zero literals, empty output.
        assert!(decompress(&[0x00], 0, b"").unwrap().is_empty());
    }

    #[test]
    fn match_expansion() {
        // 4 literals "abcd", then a 16-byte match at offset 4, then one
        // terminal literal "!".
        let src = [0x4C, b'a', b'b', b'c', b'd', 0x04, 0x00, 0x10, b'!'];
        let out = decompress(&src, 21, b"").unwrap();
        assert_eq!(out, b"abcdabcdabcdabcdabcd!");
    }

    #[test]
    fn overlapped_offset_one() {
        // One literal 'x', match len 8 at offset 1, terminal 'y'.
        let src = [0x14, b'x', 0x01, 0x00, 0x10, b'y'];
        assert_eq!(decompress(&src, 10, b"").unwrap(), b"xxxxxxxxxy");
    }

    #[test]
    fn zero_offset_is_corrupt() {
        let src = [0x14, b'x', 0x00, 0x00, 0x10, b'y'];
        assert!(matches!(decompress(&src, 10, b""), Err(EngineFailure::Corrupt { .. })));
    }

    #[test]
    fn offset_before_history_is_corrupt() {
        // Offset 5 with only 1 byte of history and no dictionary.
        let src = [0x14, b'x', 0x05, 0x00, 0x10, b'y'];
        assert!(matches!(decompress(&src, 10, b""), Err(EngineFailure::Corrupt { .. })));
        // The same stream is fine once a dictionary supplies the history:
        // the copy drains the dict tail, then wraps into the output itself.
        assert_eq!(decompress(&src, 10, b"abcd").unwrap(), b"xabcdxabcy"[..].to_vec());
    }

    #[test]
    fn truncated_literal_run_is_corrupt() {
        // Token promises 4 literals, only 2 present.
        assert!(matches!(decompress(&[0x40, b'a', b'b'], 10, b""), Err(EngineFailure::Corrupt { .. })));
    }

    #[test]
    fn truncated_offset_is_corrupt() {
        // One literal then a single offset byte.
        assert!(matches!(decompress(&[0x10, b'a', 0x01], 10, b""), Err(EngineFailure::Corrupt { .. })));
    }

    #[test]
    fn unterminated_length_extension_is_corrupt() {
        // Literal nibble 15 followed by a lone 255 extension byte.
        assert!(matches!(decompress(&[0xF0, 0xFF], 1000, b""), Err(EngineFailure::Corrupt { .. })));
    }

    #[test]
    fn undersized_capacity_overflows() {
        let src = [0x4C, b'a', b'b', b'c', b'd', 0x04, 0x00, 0x10, b'!'];
        // The stream decodes to 21 bytes; 20 is not enough.
        assert!(matches!(
            decompress(&src, 20, b""),
            Err(EngineFailure::OutputOverflow { .. })
        ));
        // Even the literals alone do not fit in 3.
        assert!(matches!(
            decompress(&src, 3, b""),
            Err(EngineFailure::OutputOverflow { .. })
        ));
    }

    #[test]
    fn malformed_input_after_full_output_is_corrupt() {
        // "abcd" + 4-byte match fills 8 bytes exactly; what follows promises
        // 13 literals but carries 1, so it is junk rather than overflow.
        let src = [0x40, b'a', b'b', b'c', b'd', 0x04, 0x00, 0xDE, 0xAD];
        assert!(matches!(decompress(&src, 8, b""), Err(EngineFailure::Corrupt { .. })));
    }

    #[test]
    fn terminal_run_past_exact_fill_overflows() {
        // "abcd" + 4-byte match fills 8 bytes exactly; the terminal literal
        // run still follows, so capacity 8 is an undersized claim, not junk.
        let src = [0x40, b'a', b'b', b'c', b'd', 0x04, 0x00, 0x10, b'!'];
        assert!(matches!(
            decompress(&src, 8, b""),
            Err(EngineFailure::OutputOverflow { .. })
        ));
        assert_eq!(decompress(&src, 9, b"").unwrap(), b"abcdabcd!");
    }

    #[test]
    fn match_crossing_dict_boundary() {
        // No literals, match len 8 at offset 4: pulls the 4-byte dict tail
        // then wraps into the fresh output. Terminal run empty.
        let src = [0x04, 0x04, 0x00, 0x00];
        assert_eq!(decompress(&src, 8, b"wxyz").unwrap(), b"wxyzwxyz");
    }
}
