use log::error;

/// Creates a bitstream for output.
#[derive(Debug)]
pub struct BitWriter {
    pub output: Vec<u8>,
    /// Number of zero bits added to the last byte by flush().
    pub padding: u8,
    queue: u64,
    q_bits: u8,
}

impl BitWriter {
    /// Create a new BitWriter with an output buffer of the capacity specified. Call flush() to
    /// push the bit queue to the buffer before taking the output.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            padding: 0,
            queue: 0,
            q_bits: 0,
        }
    }

    /// Internal bitstream write function common to all out functions.
    fn write_stream(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
    }

    /// Writes the `len` least significant bits of `data` (0-32 bits).
    pub fn out(&mut self, len: u8, data: u32) {
        debug_assert!(len <= 32);
        if len == 0 {
            return;
        }
        self.queue <<= len; //shift queue by bit length
        self.queue |= data as u64 & ((1_u64 << len) - 1); //add data portion to queue
        self.q_bits += len; //update depth of queue bits
        self.write_stream();
    }

    /// Puts a single bit on the stream.
    pub fn bit(&mut self, bit: bool) {
        self.out(1, bit as u32);
    }

    /// Puts a byte on the stream.
    pub fn out8(&mut self, data: u8) {
        self.out(8, data as u32);
    }

    /// Puts a 16 bit word on the stream.
    pub fn out16(&mut self, data: u16) {
        self.out(16, data as u32);
    }

    /// Puts a 32 bit word on the stream.
    pub fn out32(&mut self, data: u32) {
        self.out(32, data);
    }

    /// Puts a 64 bit word on the stream, high half first.
    pub fn out64(&mut self, data: u64) {
        self.out32((data >> 32) as u32);
        self.out32(data as u32);
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the least
    /// signficant bits. Records how many padding bits were needed.
    pub fn flush(&mut self) {
        self.padding = 0;
        if self.q_bits > 0 {
            self.padding = 8 - self.q_bits;
            self.queue <<= self.padding; //pad the queue with zeros
            self.q_bits += self.padding;
            self.write_stream(); // write out all that is left
            if self.q_bits > 0 {
                error!("Stuff left in the BitWriter queue.");
            }
        }
    }

    /// Flushes and hands back the packed bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.output
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        let bits = self.output.len() * 8 + self.q_bits as usize;
        format!("[{}.{}]", bits / 8, bits % 8)
    }
}
