/*
Run Length Encoding over raw bytes.

Logic: Walk the input, and at each position count how many identical bytes follow (up to
MAX_RUN). Write the count and then the byte, and jump past the run. Every run is written,
including runs of one, so the output is always a whole number of 2 byte records and a count
of zero never appears. Runs longer than MAX_RUN are split across as many records as needed.

Decoding reads the records back and extends the output with `count` copies of each value.
*/

use log::{debug, error};

use super::error::{DecodeError, Result};
use super::Codec;

/// Longest run a single record can hold (the count is one byte).
pub const MAX_RUN: usize = 255;

/// Run-Length Encoding codec. Records are `count, value`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rle;

impl Codec for Rle {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len() / 2 + 2);
        let mut idx = 0;
        while idx < data.len() {
            let run = count_run(data, idx);
            out.push(run as u8);
            out.push(data[idx]);
            idx += run;
        }
        debug!("RLE wrote {} runs for {} bytes.", out.len() / 2, data.len());
        out
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() % 2 != 0 {
            error!("RLE input has an odd length of {} bytes.", data.len());
            return Err(DecodeError::OddLength(data.len()));
        }
        // Reserve for the common case; the true size is only known after the scan.
        let mut out = Vec::with_capacity(data.len());
        for (i, record) in data.chunks_exact(2).enumerate() {
            let (count, value) = (record[0], record[1]);
            if count == 0 {
                error!("RLE record {} has a zero count.", i);
                return Err(DecodeError::ZeroRun(i * 2));
            }
            out.extend(std::iter::repeat(value).take(count as usize));
        }
        Ok(out)
    }
}

/// Helper function for compress to count how many identical bytes start at `i` (1-255).
fn count_run(v: &[u8], i: usize) -> usize {
    let compare = v[i];
    v.iter()
        .skip(i)
        .take(MAX_RUN)
        .position(|&x| x != compare)
        .unwrap_or_else(|| (v.len() - i).min(MAX_RUN))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn three_a_is_one_record() {
        let packed = Rle.compress(&[0x41, 0x41, 0x41]);
        assert_eq!(packed, [3, 0x41]);
        assert_eq!(Rle.decompress(&packed).unwrap(), [0x41, 0x41, 0x41]);
    }

    #[test]
    fn empty_both_ways() {
        assert!(Rle.compress(&[]).is_empty());
        assert!(Rle.decompress(&[]).unwrap().is_empty());
    }

    #[test]
    fn long_run_is_split() {
        let data = vec![7_u8; 300];
        let packed = Rle.compress(&data);
        assert_eq!(packed, [255, 7, 45, 7]);
        assert_eq!(Rle.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn exact_multiple_of_max_run() {
        let data = vec![0_u8; 510];
        let packed = Rle.compress(&data);
        assert_eq!(packed, [255, 0, 255, 0]);
        assert_eq!(Rle.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn single_bytes_and_mixed_runs() {
        let data = b"abbcccd";
        let packed = Rle.compress(data);
        assert_eq!(packed, [1, b'a', 2, b'b', 3, b'c', 1, b'd']);
        assert_eq!(Rle.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn binary_round_trip() {
        let data: Vec<u8> = (0..=255_u8).chain((0..=255).rev()).chain([0; 1000]).collect();
        assert_eq!(Rle.decompress(&Rle.compress(&data)).unwrap(), data);
    }

    #[test]
    fn odd_length_is_rejected() {
        let mut packed = Rle.compress(b"hello");
        packed.pop();
        assert_eq!(
            Rle.decompress(&packed),
            Err(DecodeError::OddLength(packed.len()))
        );
    }

    #[test]
    fn zero_count_is_rejected() {
        assert_eq!(Rle.decompress(&[2, 9, 0, 9]), Err(DecodeError::ZeroRun(2)));
    }
}
