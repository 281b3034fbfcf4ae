//! BitReader: reads a packed MSB-first bitstream from an in-memory buffer.
//!
//! Every read is all-or-nothing. When the buffer cannot satisfy a request the reader returns
//! `None` and stays where it was, so callers can map exhaustion onto their own error.
//!

const BIT_MASK: u8 = 0xff;

/// Reads bits and bytes from a compressed buffer.
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
    bit_index: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader positioned on the first bit of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            cursor: 0,
            bit_index: 0,
        }
    }

    /// Number of unread bits.
    pub fn bits_left(&self) -> usize {
        (self.buffer.len() - self.cursor) * 8 - self.bit_index
    }

    /// Number of whole bytes that have not been touched at all. A partially consumed byte is
    /// padding territory and does not count.
    pub fn untouched_bytes(&self) -> usize {
        self.bits_left() / 8
    }

    /// Return bit as Option<usize> (1 or 0), or None if there is no more data to read
    pub fn bit(&mut self) -> Option<usize> {
        if self.cursor == self.buffer.len() {
            return None;
        }
        let bit =
            (self.buffer[self.cursor] & BIT_MASK >> self.bit_index) >> (7 - self.bit_index);
        self.bit_index += 1;
        self.bit_index %= 8;
        if self.bit_index == 0 {
            self.cursor += 1;
        }
        Some(bit as usize)
    }

    /// Return Option<Bool> *true* if the next bit is 1, *false* if 0, consuming the bit,
    /// or None if there is no more data to read
    pub fn bool_bit(&mut self) -> Option<bool> {
        self.bit().map(|bit| bit == 1)
    }

    /// Return Option<usize> of the next n bits (n <= 32), or None if fewer than n bits remain.
    pub fn bint(&mut self, mut n: usize) -> Option<usize> {
        debug_assert!(n <= 32);
        if self.bits_left() < n {
            return None;
        }
        let mut result = 0_usize;
        // Take what we can from each byte: first the tail of a partial byte, then whole bytes,
        // then the head of the last byte.
        while n > 0 {
            let avail = 8 - self.bit_index;
            let needed = n.min(avail);
            let byte = (self.buffer[self.cursor] & BIT_MASK >> self.bit_index) as usize;
            result = result << needed | byte >> (avail - needed);
            self.bit_index += needed;
            if self.bit_index == 8 {
                self.bit_index = 0;
                self.cursor += 1;
            }
            n -= needed;
        }
        Some(result)
    }

    /// Returns a byte as an Option<u8>, or None if there is no more data to read. This is
    /// a convenience function, and calls bint(8).
    pub fn byte(&mut self) -> Option<u8> {
        self.bint(8).map(|byte| byte as u8)
    }

    /// Returns a big-endian u16, or None if the data runs out.
    pub fn u16(&mut self) -> Option<u16> {
        self.bint(16).map(|word| word as u16)
    }

    /// Returns a big-endian u64, or None if the data runs out.
    pub fn u64(&mut self) -> Option<u64> {
        if self.bits_left() < 64 {
            return None;
        }
        let high = self.bint(32)? as u64;
        let low = self.bint(32)? as u64;
        Some(high << 32 | low)
    }

    /// Debugging function. Report current position in the buffer.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.cursor, self.bit_index)
    }
}

#[cfg(test)]
mod test {
    use super::BitReader;
    use crate::bitstream::bitwriter::BitWriter;

    #[test]
    fn basic_test() {
        let x = [0b10000001_u8];
        let mut br = BitReader::new(&x);
        assert_eq!(br.bit(), Some(1));
        for _ in 0..6 {
            assert_eq!(br.bit(), Some(0));
        }
        assert_eq!(br.bit(), Some(1));
        assert_eq!(br.bit(), None);
    }

    #[test]
    fn bint_test() {
        let x = [0b00011011];
        let mut br = BitReader::new(&x);
        assert_eq!(br.bint(5), Some(3));
        assert_eq!(br.bint(1), Some(0));
        assert_eq!(br.bint(2), Some(3));
        assert_eq!(br.bint(1), None);
    }

    #[test]
    fn bint_across_bytes_test() {
        let x = [0b1010_1010, 0b1111_0000, 0b0000_1111];
        let mut br = BitReader::new(&x);
        assert_eq!(br.bint(3), Some(0b101));
        assert_eq!(br.bint(12), Some(0b0_1010_1111_000));
        assert_eq!(br.bint(9), Some(0b0_0000_1111));
        assert_eq!(br.bits_left(), 0);
    }

    #[test]
    fn failed_read_does_not_consume() {
        let x = [0xab];
        let mut br = BitReader::new(&x);
        assert_eq!(br.bint(4), Some(0xa));
        assert_eq!(br.bint(5), None);
        assert_eq!(br.loc(), "[0.4]");
        assert_eq!(br.bint(4), Some(0xb));
    }

    #[test]
    fn byte_test() {
        let x = "Hello".as_bytes();
        let mut br = BitReader::new(x);
        let read: Option<Vec<u8>> = (0..4).map(|_| br.byte()).collect();
        assert_eq!(read, Some("Hell".as_bytes().to_vec()));
        assert_eq!(br.untouched_bytes(), 1);
        assert_eq!(br.bint(9), None);
        assert_eq!(br.byte(), Some(b'o'));
        assert_eq!(br.byte(), None);
    }

    #[test]
    fn loc_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = BitReader::new(x);
        br.bint(32);
        br.byte();
        br.bit();
        assert_eq!(br.loc(), "[5.1]");
        assert_eq!(br.untouched_bytes(), 7);
    }

    #[test]
    fn bool_bit_test() {
        let x = [0b01010000];
        let mut br = BitReader::new(&x);
        assert_eq!(br.bool_bit(), Some(false));
        assert_eq!(br.bool_bit(), Some(true));
        assert_eq!(br.bool_bit(), Some(false));
        assert_eq!(br.bool_bit(), Some(true));
        for _ in 0..4 {
            assert_eq!(br.bool_bit(), Some(false));
        }
        assert_eq!(br.bool_bit(), None);
    }

    #[test]
    fn reads_what_the_writer_wrote() {
        let mut bw = BitWriter::new(16);
        bw.out64(0xdead_beef_0bad_f00d);
        bw.out(3, 0b110);
        bw.out16(0x1234);
        bw.out(12, 0xabc);
        let packed = bw.finish();

        let mut br = BitReader::new(&packed);
        assert_eq!(br.u64(), Some(0xdead_beef_0bad_f00d));
        assert_eq!(br.bint(3), Some(0b110));
        assert_eq!(br.u16(), Some(0x1234));
        assert_eq!(br.bint(12), Some(0xabc));
        assert!(br.bits_left() < 8);
    }
}
