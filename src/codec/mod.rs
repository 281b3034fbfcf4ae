//! The codec module holds the three lossless codecs and the dispatch between them.
//!
//! Each codec turns an arbitrary byte buffer into a self-describing compressed buffer and back:
//! - rle: Run-Length Encoding as (count, value) byte pairs.
//! - huffman: Canonical Huffman coding with a code length table header and a bit-packed body.
//! - lz77: Sliding window back-references with a bit-packed token stream.
//!
//! Compression never fails. Decompression fails with a DecodeError when the buffer was not
//! produced by the same codec's compress (truncated, corrupted, or foreign data).
//!
//! Codecs hold no state between calls, so a single value can be shared freely.
//!

pub mod error;
pub mod huffman;
pub mod lz77;
pub mod rle;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub use error::{DecodeError, Result};
pub use huffman::Huffman;
pub use lz77::Lz77;
pub use rle::Rle;

/// A paired compress/decompress implementation for one algorithm.
pub trait Codec {
    /// Compress the input data. Accepts any buffer, including an empty one.
    fn compress(&self, data: &[u8]) -> Vec<u8>;

    /// Restore the data that compress() was given.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Settings that change how data is compressed. Decompression needs none of them because
/// every compressed buffer describes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// LZ77 window size as a bit width: the window holds 2^bits - 1 bytes.
    pub window_bits: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_bits: lz77::DEFAULT_WINDOW_BITS,
        }
    }
}

/// The available compression algorithms
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Algorithm {
    /// Canonical Huffman coding of byte frequencies
    Huffman,
    /// Run-Length Encoding of repeated bytes
    Rle,
    /// LZ77 sliding window back-references
    Lz77,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Huffman, Algorithm::Rle, Algorithm::Lz77];

    /// Lower case name, also used as the file extension of compressed output.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Huffman => "huffman",
            Algorithm::Rle => "rle",
            Algorithm::Lz77 => "lz77",
        }
    }

    /// Find the algorithm whose name matches a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(ext))
    }

    /// Compress with default settings.
    pub fn compress(self, data: &[u8]) -> Vec<u8> {
        self.compress_with(data, &Settings::default())
    }

    pub fn compress_with(self, data: &[u8], settings: &Settings) -> Vec<u8> {
        match self {
            Algorithm::Huffman => Huffman.compress(data),
            Algorithm::Rle => Rle.compress(data),
            Algorithm::Lz77 => Lz77::new(settings.window_bits).compress(data),
        }
    }

    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Algorithm::Huffman => Huffman.decompress(data),
            Algorithm::Rle => Rle.decompress(data),
            Algorithm::Lz77 => Lz77::default().decompress(data),
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("unknown algorithm '{}'", s))
    }
}
