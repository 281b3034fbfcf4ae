//! The bitstream module forms the bit-level I/O subsystem shared by the Huffman and LZ77 codecs.
//!
//! Both directions are MSB-first: the first bit written lands in the most significant bit of the
//! first output byte. The final byte of a stream is padded with zero bits, and the writer reports
//! how many padding bits it added so callers can account for them.
//!
//! RLE works on whole bytes and does not use this module.
//!
pub mod bitreader;
pub mod bitwriter;
