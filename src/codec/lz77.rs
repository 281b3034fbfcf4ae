//! LZ77 sliding window compression.
//!
//! The encoder walks the input and, at each position, looks back through the window for the
//! longest run of bytes matching what comes next. Every step emits one token:
//! - a literal, when no match of at least MIN_MATCH bytes exists, or
//! - a back-reference (distance, length) followed by the literal byte that ended the match.
//!
//! Matches may run past the current position (distance < length). The decoder copies those byte
//! by byte, so each copied byte is available to the copies that follow it.
//!
//! Candidate positions are found through a hash index of 3 byte prefixes, trimmed to the window
//! as the encoder advances. The nearest candidate wins when lengths tie, which gives exactly the
//! tokens of a plain linear scan of the window.
//!
//! Layout: u64 original size, u8 window bits `w`, then the token stream, zero padded.
//! - literal: `0` + 8 bit byte
//! - match:   `1` + `w` bit distance + 8 bit length + 8 bit literal

use log::{debug, error, trace};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::collections::VecDeque;

use super::error::{DecodeError, Result};
use super::Codec;
use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;

pub const DEFAULT_WINDOW_BITS: u8 = 12;
pub const MIN_WINDOW_BITS: u8 = 8;
pub const MAX_WINDOW_BITS: u8 = 16;
/// Shorter matches cost more to write than the literals they replace.
pub const MIN_MATCH: usize = 3;
/// The length field is one byte.
pub const MAX_MATCH: usize = 255;

/// One encoder step. `distance == 0 && length == 0` marks a plain literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub distance: usize,
    pub length: usize,
    pub literal: u8,
}

impl Token {
    pub fn is_literal(&self) -> bool {
        self.length == 0
    }
}

/// LZ77 codec with a configurable window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77 {
    window_bits: u8,
}

impl Default for Lz77 {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_BITS)
    }
}

impl Lz77 {
    /// Window bits outside 8..=16 are clamped into that range.
    pub fn new(window_bits: u8) -> Self {
        Self {
            window_bits: window_bits.clamp(MIN_WINDOW_BITS, MAX_WINDOW_BITS),
        }
    }

    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }

    /// Largest distance a token can hold.
    pub fn window_size(&self) -> usize {
        (1 << self.window_bits) - 1
    }

    /// Iterate over the tokens for `data`.
    pub fn tokens<'a>(&self, data: &'a [u8]) -> Tokens<'a> {
        Tokens {
            finder: MatchFinder::new(data, self.window_size()),
            pos: 0,
        }
    }
}

/// Hash index of every 3 byte prefix seen in the window.
struct MatchFinder<'a> {
    data: &'a [u8],
    window: usize,
    chains: FxHashMap<[u8; MIN_MATCH], VecDeque<usize>>,
}

impl<'a> MatchFinder<'a> {
    fn new(data: &'a [u8], window: usize) -> Self {
        Self {
            data,
            window,
            chains: FxHashMap::default(),
        }
    }

    fn key(&self, pos: usize) -> Option<[u8; MIN_MATCH]> {
        self.data.get(pos..pos + MIN_MATCH)?.try_into().ok()
    }

    /// Record `pos` as a future match candidate, and forget the position that just slid out of
    /// the window. Positions arrive in order, so that one is always at the front of its chain.
    fn insert(&mut self, pos: usize) {
        if let Some(key) = self.key(pos) {
            self.chains.entry(key).or_default().push_back(pos);
        }
        let Some(old) = pos.checked_sub(self.window + 1) else {
            return;
        };
        if let Some(old_key) = self.key(old) {
            if let Entry::Occupied(mut chain) = self.chains.entry(old_key) {
                if chain.get().front() == Some(&old) {
                    chain.get_mut().pop_front();
                }
                if chain.get().is_empty() {
                    chain.remove();
                }
            }
        }
    }

    /// Returns (distance, length) of the longest match for `pos` no longer than `max_len`,
    /// or (0, 0) if there is none of at least MIN_MATCH bytes.
    fn longest(&mut self, pos: usize, max_len: usize) -> (usize, usize) {
        if max_len < MIN_MATCH {
            return (0, 0);
        }
        let Some(key) = self.key(pos) else {
            return (0, 0);
        };
        let Some(chain) = self.chains.get_mut(&key) else {
            return (0, 0);
        };
        // Drop candidates that have slid out of the window
        while chain.front().map_or(false, |&c| pos - c > self.window) {
            chain.pop_front();
        }

        let data = self.data;
        let mut best = (0, 0);
        // Newest first, so a tie keeps the nearest match
        for &candidate in chain.iter().rev() {
            let length = (0..max_len)
                .position(|l| data[candidate + l] != data[pos + l])
                .unwrap_or(max_len);
            if length > best.1 {
                best = (pos - candidate, length);
                if length == max_len {
                    break;
                }
            }
        }
        best
    }
}

/// Iteratable struct returning the tokens of the input in order.
pub struct Tokens<'a> {
    finder: MatchFinder<'a>,
    pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.finder.data;
        if self.pos >= data.len() {
            return None;
        }
        // Always leave a byte for the trailing literal
        let max_len = (data.len() - self.pos - 1).min(MAX_MATCH);
        let (distance, length) = self.finder.longest(self.pos, max_len);
        let token = Token {
            distance,
            length,
            literal: data[self.pos + length],
        };
        for p in self.pos..=self.pos + length {
            self.finder.insert(p);
        }
        self.pos += length + 1;
        Some(token)
    }
}

impl Codec for Lz77 {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        let mut bw = BitWriter::new(data.len() / 2 + 16);
        bw.out64(data.len() as u64);
        bw.out8(self.window_bits);

        let (mut literals, mut matches) = (0_usize, 0_usize);
        for token in self.tokens(data) {
            if token.is_literal() {
                bw.bit(false);
                literals += 1;
            } else {
                bw.bit(true);
                bw.out(self.window_bits, token.distance as u32);
                bw.out8(token.length as u8);
                matches += 1;
            }
            bw.out8(token.literal);
        }
        bw.flush();
        debug!(
            "LZ77 wrote {} literals and {} matches with a {} byte window.",
            literals,
            matches,
            self.window_size()
        );
        bw.output
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut br = BitReader::new(data);
        let size = br.u64().ok_or(DecodeError::TruncatedHeader {
            field: "original size",
        })?;
        let window_bits = br.byte().ok_or(DecodeError::TruncatedHeader {
            field: "window bits",
        })?;
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
            error!("LZ77 header has an unsupported window of {} bits.", window_bits);
            return Err(DecodeError::BadWindow(window_bits));
        }
        trace!("LZ77 header: {} bytes, {} window bits.", size, window_bits);

        // A token is at least 9 bits and yields at most MAX_MATCH + 1 bytes.
        let bound = (br.bits_left() / 9 + 1) * (MAX_MATCH + 1);
        let mut out: Vec<u8> = Vec::with_capacity(size.min(bound as u64) as usize);
        let truncated = |out: &Vec<u8>| DecodeError::TruncatedBody {
            produced: out.len() as u64,
            expected: size,
        };

        while (out.len() as u64) < size {
            let is_match = br.bool_bit().ok_or_else(|| truncated(&out))?;
            if is_match {
                let (Some(distance), Some(length), Some(literal)) =
                    (br.bint(window_bits as usize), br.byte(), br.byte())
                else {
                    return Err(truncated(&out));
                };
                let length = length as usize;
                if distance == 0 || distance > out.len() {
                    error!("LZ77 reference {} back with {} bytes written.", distance, out.len());
                    return Err(DecodeError::BadReference {
                        distance,
                        written: out.len(),
                    });
                }
                if length < MIN_MATCH {
                    return Err(DecodeError::BadLength(length));
                }
                if (out.len() + length + 1) as u64 > size {
                    return Err(DecodeError::Overrun(size));
                }
                // Copy forward one byte at a time: the source may overlap what we are writing.
                let start = out.len() - distance;
                for i in start..start + length {
                    let byte = out[i];
                    out.push(byte);
                }
                out.push(literal);
            } else {
                let literal = br.byte().ok_or_else(|| truncated(&out))?;
                out.push(literal);
            }
        }

        match br.untouched_bytes() {
            0 => Ok(out),
            extra => Err(DecodeError::TrailingData(extra)),
        }
    }
}
