//! Three classical lossless compressors over raw bytes: Huffman coding, Run-Length Encoding
//! and LZ77.
//!
//! Every codec takes a whole buffer and returns a whole buffer. The compressed output carries its
//! own header, so decompression needs nothing but the compressed bytes and the algorithm that
//! made them. Any byte buffer can be compressed, including an empty one; decompression of bytes
//! that did not come from the same codec fails with a DecodeError.
//!
//! ```
//! use tricodec::{compress, decompress, Algorithm};
//!
//! let data = b"abracadabra abracadabra";
//! let packed = compress(data, Algorithm::Lz77);
//! assert_eq!(decompress(&packed, Algorithm::Lz77).unwrap(), data);
//! ```
//!
//! The tricodec binary wraps this in a file-oriented command line tool:
//!
//! `$> tricodec -a rle notes.txt`
//!
//! This will compress the file and create notes.txt.rle. `tricodec -d notes.txt.rle` restores it
//! as decompressed_notes.txt.
//!
pub mod bitstream;
pub mod codec;
pub mod tools;

pub use codec::{Algorithm, Codec, DecodeError, Settings};

/// Compress `input` with `algorithm` and default settings.
pub fn compress(input: &[u8], algorithm: Algorithm) -> Vec<u8> {
    algorithm.compress(input)
}

/// Restore what compress() was given.
pub fn decompress(input: &[u8], algorithm: Algorithm) -> Result<Vec<u8>, DecodeError> {
    algorithm.decompress(input)
}
