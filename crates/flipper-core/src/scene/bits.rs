//! Bit-precise cursor over a scene instruction buffer.
//!
//! The scene bytecode is not byte-aligned: opcodes are 4 bits and
//! operands anywhere from 1 to 8 bits, packed MSB-first. The cursor is
//! an explicit value (buffer + bit offset) threaded through the
//! interpreter, not hidden object state.

/// MSB-first bit reader.
pub struct BitReader<'a> {
    buf: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, bit: 0 }
    }

    /// Current read position in bits from the start of the buffer.
    pub fn bit_pos(&self) -> usize {
        self.bit
    }

    pub fn bits_left(&self) -> usize {
        self.buf.len() * 8 - self.bit
    }

    /// Read `n` bits (n <= 32), MSB-first. `None` once the stream is
    /// exhausted; the interpreter treats that as end-of-stream, not an
    /// error.
    pub fn read(&mut self, n: usize) -> Option<u32> {
        debug_assert!(n <= 32);
        if self.bits_left() < n {
            return None;
        }
        let mut out = 0u32;
        for _ in 0..n {
            let byte = self.buf[self.bit / 8];
            let bit = (byte >> (7 - self.bit % 8)) & 1;
            out = (out << 1) | bit as u32;
            self.bit += 1;
        }
        Some(out)
    }
}
