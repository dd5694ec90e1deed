//! LZ4 sequence emission: greedy fast path and deeper-searching high path.
//!
//! Both compressors operate over a virtual input of `dict ++ src` so match
//! offsets may reach back into the dictionary; only the `src` portion is
//! encoded. Emitted streams obey the block format rules: minimum match of 4,
//! offsets ≤ 65535, the last 5 bytes are literals, and no match starts
//! within the final 12 bytes.

use super::{MAX_DISTANCE, MIN_MATCH};

/// Inputs shorter than this are emitted as a single literal run.
const MIN_INPUT_FOR_MATCHES: usize = 13;

/// No match may start within this many bytes of the input end.
const MF_LIMIT: usize = 12;

/// The final bytes of a block are always literals.
const LAST_LITERALS: usize = 5;

const HASH_LOG: u32 = 12;

/// Skip-stride growth trigger for the fast path (doubles every 64 misses).
const SKIP_TRIGGER: u32 = 6;

/// Candidate slots per hash bucket in the high-compression path.
const BUCKET: usize = 32;

#[inline]
fn read_u32(input: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([input[pos], input[pos + 1], input[pos + 2], input[pos + 3]])
}

#[inline]
fn hash4(v: u32) -> usize {
    (v.wrapping_mul(2_654_435_761) >> (32 - HASH_LOG)) as usize
}

/// Length of the common run of `input[a..]` and `input[b..]`, with `b`
/// bounded by `limit`.
fn common_len(input: &[u8], mut a: usize, mut b: usize, limit: usize) -> usize {
    let start = b;
    while b < limit && input[a] == input[b] {
        a += 1;
        b += 1;
    }
    b - start
}

/// Only the trailing [`MAX_DISTANCE`] bytes of a dictionary are reachable.
#[inline]
fn tail_window(dict: &[u8]) -> &[u8] {
    &dict[dict.len().saturating_sub(MAX_DISTANCE)..]
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequence emission
// ─────────────────────────────────────────────────────────────────────────────

fn write_len_ext(out: &mut Vec<u8>, mut rem: usize) {
    while rem >= 255 {
        out.push(255);
        rem -= 255;
    }
    out.push(rem as u8);
}

/// One full sequence: token, literal run, 2-byte offset, match length.
fn emit_sequence(out: &mut Vec<u8>, literals: &[u8], offset: u16, match_len: usize) {
    let ll = literals.len();
    let ml = match_len - MIN_MATCH;
    let token = ((ll.min(15) as u8) << 4) | ml.min(15) as u8;
    out.push(token);
    if ll >= 15 {
        write_len_ext(out, ll - 15);
    }
    out.extend_from_slice(literals);
    out.extend_from_slice(&offset.to_le_bytes());
    if ml >= 15 {
        write_len_ext(out, ml - 15);
    }
}

/// Final sequence: literal run only, no offset field.
fn emit_last_literals(out: &mut Vec<u8>, literals: &[u8]) {
    let ll = literals.len();
    out.push((ll.min(15) as u8) << 4);
    if ll >= 15 {
        write_len_ext(out, ll - 15);
    }
    out.extend_from_slice(literals);
}

// ─────────────────────────────────────────────────────────────────────────────
// Fast path
// ─────────────────────────────────────────────────────────────────────────────

/// Greedy single-candidate compression.
///
/// `acceleration` widens the skip stride after repeated match misses; higher
/// values trade ratio for speed. Values are clamped to a sane range, never
/// rejected.
pub fn compress(src: &[u8], dict: &[u8], acceleration: i32) -> Vec<u8> {
    let accel = acceleration.clamp(1, 65_537) as u32;
    let dict = tail_window(dict);
    if src.is_empty() {
        return vec![0x00];
    }

    let mut input = Vec::with_capacity(dict.len() + src.len());
    input.extend_from_slice(dict);
    input.extend_from_slice(src);
    let base = dict.len();
    let end = input.len();

    let mut out = Vec::with_capacity(src.len() + src.len() / 255 + 16);
    if src.len() < MIN_INPUT_FOR_MATCHES {
        emit_last_literals(&mut out, &input[base..]);
        return out;
    }

    let mf_limit = end - MF_LIMIT;
    let match_limit = end - LAST_LITERALS;

    // Hash table stores position + 1; 0 means empty.
    let mut table = vec![0u32; 1 << HASH_LOG];
    for p in 0..base.saturating_sub(MIN_MATCH - 1) {
        table[hash4(read_u32(&input, p))] = (p + 1) as u32;
    }

    let mut ip = base;
    let mut anchor = base;
    'scan: loop {
        let mut search_nb = accel << SKIP_TRIGGER;
        let (mpos, mlen) = loop {
            if ip > mf_limit {
                break 'scan;
            }
            let h = hash4(read_u32(&input, ip));
            let cand = table[h];
            table[h] = (ip + 1) as u32;
            if cand != 0 {
                let c = (cand - 1) as usize;
                if c < ip && ip - c <= MAX_DISTANCE && read_u32(&input, c) == read_u32(&input, ip) {
                    let len = MIN_MATCH + common_len(&input, c + MIN_MATCH, ip + MIN_MATCH, match_limit);
                    break (c, len);
                }
            }
            let step = (search_nb >> SKIP_TRIGGER) as usize;
            search_nb += 1;
            ip += step;
        };

        emit_sequence(&mut out, &input[anchor..ip], (ip - mpos) as u16, mlen);
        ip += mlen;
        anchor = ip;
        if ip + MIN_MATCH <= end {
            // Keep the position just behind the cursor findable.
            let h = hash4(read_u32(&input, ip - 2));
            table[h] = (ip - 1) as u32;
        }
    }

    emit_last_literals(&mut out, &input[anchor..end]);
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// High-compression path
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
fn bucket_insert(table: &mut [u32], h: usize, pos: usize) {
    let s = h * BUCKET;
    table.copy_within(s..s + BUCKET - 1, s + 1);
    table[s] = (pos + 1) as u32;
}

/// Multi-candidate compression: every position is indexed and up to
/// `2 + 2*level` candidates per hash are examined, keeping the longest match.
///
/// `level` is clamped to `0..=16`.
pub fn compress_high(src: &[u8], dict: &[u8], level: i32) -> Vec<u8> {
    let attempts = ((2 + 2 * level.clamp(0, 16)) as usize).min(BUCKET);
    let dict = tail_window(dict);
    if src.is_empty() {
        return vec![0x00];
    }

    let mut input = Vec::with_capacity(dict.len() + src.len());
    input.extend_from_slice(dict);
    input.extend_from_slice(src);
    let base = dict.len();
    let end = input.len();

    let mut out = Vec::with_capacity(src.len() + src.len() / 255 + 16);
    if src.len() < MIN_INPUT_FOR_MATCHES {
        emit_last_literals(&mut out, &input[base..]);
        return out;
    }

    let mf_limit = end - MF_LIMIT;
    let match_limit = end - LAST_LITERALS;
    let insert_limit = end - MIN_MATCH + 1;

    let mut table = vec![0u32; (1 << HASH_LOG) * BUCKET];
    for p in 0..base.saturating_sub(MIN_MATCH - 1) {
        bucket_insert(&mut table, hash4(read_u32(&input, p)), p);
    }

    let mut ip = base;
    let mut anchor = base;
    while ip <= mf_limit {
        let h = hash4(read_u32(&input, ip));
        bucket_insert(&mut table, h, ip);

        // Slot 0 is the position we just inserted; candidates start at 1.
        let mut best_len = 0usize;
        let mut best_pos = 0usize;
        for slot in 1..=attempts.min(BUCKET - 1) {
            let cand = table[h * BUCKET + slot];
            if cand == 0 {
                break;
            }
            let c = (cand - 1) as usize;
            if ip - c > MAX_DISTANCE {
                break; // older entries are even farther away
            }
            if read_u32(&input, c) == read_u32(&input, ip) {
                let len = MIN_MATCH + common_len(&input, c + MIN_MATCH, ip + MIN_MATCH, match_limit);
                if len > best_len {
                    best_len = len;
                    best_pos = c;
                }
            }
        }

        if best_len < MIN_MATCH {
            ip += 1;
            continue;
        }

        emit_sequence(&mut out, &input[anchor..ip], (ip - best_pos) as u16, best_len);
        for p in ip + 1..(ip + best_len).min(insert_limit) {
            bucket_insert(&mut table, hash4(read_u32(&input, p)), p);
        }
        ip += best_len;
        anchor = ip;
    }

    emit_last_literals(&mut out, &input[anchor..end]);
    out
}
