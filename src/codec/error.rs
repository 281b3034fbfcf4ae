use thiserror::Error;

/// Why a buffer could not be decoded. Compression has no error kind; every variant here
/// describes malformed or foreign compressed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The header ended before all of its fields were read.
    #[error("truncated header: expected {field}")]
    TruncatedHeader { field: &'static str },

    /// The body ran out before the declared length was produced.
    #[error("truncated body: produced {produced} of {expected} bytes")]
    TruncatedBody { produced: u64, expected: u64 },

    /// RLE bodies are made of 2 byte records.
    #[error("RLE body length {0} is not a multiple of 2")]
    OddLength(usize),

    /// A run record with a count of zero.
    #[error("zero run count at offset {0}")]
    ZeroRun(usize),

    /// The persisted Huffman code lengths do not describe a usable prefix code.
    #[error("inconsistent Huffman table: {0}")]
    BadTable(&'static str),

    /// An LZ77 token pointing outside the data written so far.
    #[error("invalid back-reference: distance {distance} with {written} bytes written")]
    BadReference { distance: usize, written: usize },

    /// An LZ77 match token with a length the encoder never emits.
    #[error("invalid match length {0}")]
    BadLength(usize),

    /// A token that would produce more bytes than the header declared.
    #[error("token overruns declared length {0}")]
    Overrun(u64),

    /// A header window size outside the supported range.
    #[error("unsupported window of {0} bits")]
    BadWindow(u8),

    /// Whole bytes left over after the declared length was produced.
    #[error("{0} bytes of trailing data")]
    TrailingData(usize),
}

/// Result type for decode operations
pub type Result<T> = std::result::Result<T, DecodeError>;
