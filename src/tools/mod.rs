//! The tools module provides the helpers around the codecs.
//!
//! The tools are:
//! - cli: Command line interface and the resolved options.
//! - files: Input size policy, algorithm detection, output naming and per-file processing.
//! - freq_count: Byte frequency count for the Huffman codec.
//! - report: Size, ratio and timing summary of one run.
//!
pub mod cli;
pub mod files;
pub mod freq_count;
pub mod report;
