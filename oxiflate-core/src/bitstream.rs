//! Bit-level I/O for DEFLATE streams.
//!
//! This module provides `BitReader` and `BitWriter` for reading and writing
//! data at the bit level, which is what the variable-length Huffman codes of
//! DEFLATE need.
//!
//! # Bit Ordering
//!
//! DEFLATE packs bits LSB-first: the first bit of the stream is the least
//! significant bit of the first byte. Multi-bit values are also stored
//! LSB-first, except Huffman codes, which the encoder bit-reverses before
//! handing them to [`BitWriter::write_bits`].
//!
//! # Example
//!
//! ```
//! use oxiflate_core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0b1100, 4);
//! let output = writer.finish();
//!
//! let mut reader = BitReader::new(&output);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{FlateError, Result};

/// A bit-level reader over a borrowed byte slice.
///
/// Bytes are loaded into a 64-bit buffer ahead of use so that most reads
/// are a mask and a shift.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Input bytes.
    data: &'a [u8],
    /// Index of the next byte to load into the buffer.
    next_byte: usize,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Total bits consumed (for error reporting and alignment).
    total_bits_read: u64,
}

impl<'a> BitReader<'a> {
    /// Create a new `BitReader` over the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            next_byte: 0,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_read: 0,
        }
    }

    /// Get the current bit position (for error reporting).
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Number of whole or partial bytes consumed so far.
    ///
    /// After the final block of a stream this is the offset of the first
    /// byte following the stream.
    pub fn bytes_consumed(&self) -> usize {
        self.total_bits_read.div_ceil(8) as usize
    }

    /// Number of unread bits left in the input.
    pub fn bits_remaining(&self) -> u64 {
        self.bits_in_buffer as u64 + (self.data.len() - self.next_byte) as u64 * 8
    }

    /// Load whole bytes until the buffer holds at least 57 bits or the
    /// input is exhausted.
    #[inline]
    fn refill(&mut self) {
        while self.bits_in_buffer <= 56 && self.next_byte < self.data.len() {
            self.buffer |= (self.data[self.next_byte] as u64) << self.bits_in_buffer;
            self.next_byte += 1;
            self.bits_in_buffer += 8;
        }
    }

    /// Ensure at least `count` bits are buffered.
    #[inline]
    fn ensure(&mut self, count: u8) -> Result<()> {
        if self.bits_in_buffer < count {
            self.refill();
            if self.bits_in_buffer < count {
                return Err(FlateError::truncated(
                    self.total_bits_read + self.bits_in_buffer as u64,
                ));
            }
        }
        Ok(())
    }

    #[inline]
    fn consume(&mut self, count: u8) {
        self.buffer >>= count;
        self.bits_in_buffer -= count;
        self.total_bits_read += count as u64;
    }

    /// Read up to 32 bits from the stream.
    ///
    /// The first bit read lands in the LSB of the result.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        if count == 0 {
            return Ok(0);
        }

        self.ensure(count)?;

        let mask = (1u64 << count).wrapping_sub(1);
        let result = (self.buffer & mask) as u32;
        self.consume(count);

        Ok(result)
    }

    /// Peek at up to 32 bits without consuming them.
    ///
    /// Bits past the end of the input read as zero; callers that act on
    /// the peeked value must consume through [`skip_bits`](Self::skip_bits),
    /// which does check the bound.
    #[inline]
    pub fn peek_bits(&mut self, count: u8) -> u32 {
        debug_assert!(count <= 32, "Cannot peek more than 32 bits at once");

        if self.bits_in_buffer < count {
            self.refill();
        }

        let mask = (1u64 << count).wrapping_sub(1);
        (self.buffer & mask) as u32
    }

    /// Skip a number of bits.
    pub fn skip_bits(&mut self, count: u8) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        self.ensure(count)?;
        self.consume(count);

        Ok(())
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Align to the next byte boundary by discarding partial bits.
    pub fn align_to_byte(&mut self) {
        let remainder = (8 - (self.total_bits_read % 8) as u8) % 8;
        if remainder > 0 {
            // The buffer is always filled with whole bytes, so the padding
            // bits of the current byte are already buffered.
            self.consume(remainder);
        }
    }

    /// Read bytes into `buf`.
    ///
    /// The reader must be byte-aligned.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        debug_assert!(
            self.total_bits_read % 8 == 0,
            "read_bytes requires byte alignment"
        );

        if (buf.len() as u64) * 8 > self.bits_remaining() {
            return Err(FlateError::truncated(
                self.total_bits_read + self.bits_remaining(),
            ));
        }

        // Drain complete bytes held in the bit buffer first
        let mut offset = 0;
        while self.bits_in_buffer >= 8 && offset < buf.len() {
            buf[offset] = (self.buffer & 0xFF) as u8;
            self.consume(8);
            offset += 1;
        }

        // Copy the rest straight from the input
        let rest = buf.len() - offset;
        if rest > 0 {
            buf[offset..].copy_from_slice(&self.data[self.next_byte..self.next_byte + rest]);
            self.next_byte += rest;
            self.total_bits_read += rest as u64 * 8;
        }

        Ok(())
    }
}

/// A bit-level writer that accumulates into an owned buffer.
///
/// Call [`finish`](Self::finish) when done to pad the final partial byte and
/// take the bytes.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    /// Completed bytes.
    output: Vec<u8>,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl BitWriter {
    /// Create an empty `BitWriter`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `BitWriter` with an output capacity hint in bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Get the total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Bytes completed so far (excludes a trailing partial byte).
    pub fn as_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Move complete bytes from the bit buffer to the output.
    #[inline]
    fn flush_bytes(&mut self) {
        if self.bits_in_buffer >= 32 {
            self.output
                .extend_from_slice(&(self.buffer as u32).to_le_bytes());
            self.buffer >>= 32;
            self.bits_in_buffer -= 32;
        }

        while self.bits_in_buffer >= 8 {
            self.output.push((self.buffer & 0xFF) as u8);
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
    }

    /// Write up to 32 bits to the stream, LSB-first.
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        if count == 0 {
            return;
        }

        let mask = if count == 32 {
            u32::MAX
        } else {
            (1u32 << count).wrapping_sub(1)
        };

        self.buffer |= ((value & mask) as u64) << self.bits_in_buffer;
        self.bits_in_buffer += count;
        self.total_bits_written += count as u64;

        self.flush_bytes();
    }

    /// Write a single bit.
    #[inline(always)]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u32, 1);
    }

    /// Pad to the next byte boundary with zero bits.
    pub fn align_to_byte(&mut self) {
        let partial = (self.total_bits_written % 8) as u8;
        if partial != 0 {
            self.write_bits(0, 8 - partial);
        }
    }

    /// Write bytes to the stream.
    ///
    /// When the writer is byte-aligned the bytes are copied directly.
    pub fn write_bytes(&mut self, buf: &[u8]) {
        if self.bits_in_buffer == 0 {
            self.output.extend_from_slice(buf);
            self.total_bits_written += buf.len() as u64 * 8;
        } else {
            for &byte in buf {
                self.write_bits(byte as u32, 8);
            }
        }
    }

    /// Pad the final partial byte with zeros and return the bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.flush_bytes();
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitreader_basic() {
        // 0b10110101 = 0xB5
        let data = [0xB5];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(1).unwrap(), 1); // LSB first
        assert_eq!(reader.read_bits(1).unwrap(), 0);
        assert_eq!(reader.read_bits(1).unwrap(), 1);
        assert_eq!(reader.read_bits(1).unwrap(), 0);
        assert_eq!(reader.read_bits(1).unwrap(), 1);
        assert_eq!(reader.read_bits(1).unwrap(), 1);
        assert_eq!(reader.read_bits(1).unwrap(), 0);
        assert_eq!(reader.read_bits(1).unwrap(), 1);
    }

    #[test]
    fn test_bitreader_multi_byte() {
        let data = [0xFF, 0x00];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(4).unwrap(), 0xF);
        assert_eq!(reader.read_bits(8).unwrap(), 0x0F); // Crosses byte boundary
        assert_eq!(reader.read_bits(4).unwrap(), 0x0);
    }

    #[test]
    fn test_bitreader_truncated() {
        let data = [0xAB];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(6).unwrap(), 0x2B);
        let err = reader.read_bits(3).unwrap_err();
        assert_eq!(err, FlateError::TruncatedInput { bit_position: 8 });
        // A failed read leaves the cursor untouched
        assert_eq!(reader.read_bits(2).unwrap(), 0b10);
    }

    #[test]
    fn test_bitreader_peek_pads_with_zeros() {
        let data = [0xAB];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.peek_bits(4), 0xB);
        assert_eq!(reader.peek_bits(4), 0xB); // Same value
        assert_eq!(reader.read_bits(4).unwrap(), 0xB);
        assert_eq!(reader.peek_bits(9), 0xA);
        assert!(reader.skip_bits(9).is_err());
        assert!(reader.skip_bits(4).is_ok());
        assert_eq!(reader.bits_remaining(), 0);
    }

    #[test]
    fn test_bitwriter_basic() {
        let mut writer = BitWriter::new();
        for bit in [true, false, true, false, true, true, false, true] {
            writer.write_bit(bit);
        }
        assert_eq!(writer.finish(), vec![0xB5]);
    }

    #[test]
    fn test_bitwriter_multi_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        writer.write_bits(0b11001, 5);
        // 3 bits: 101, 5 bits: 11001 -> 11001_101 = 0xCD
        assert_eq!(writer.finish(), vec![0xCD]);
    }

    #[test]
    fn test_bitwriter_wide_values() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xDEAD_BEEF, 32);
        writer.write_bits(0x1, 1);
        assert_eq!(writer.bits_written(), 33);
        assert_eq!(writer.finish(), vec![0xEF, 0xBE, 0xAD, 0xDE, 0x01]);
    }

    #[test]
    fn test_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        writer.write_bits(0b1111, 4);
        writer.write_bits(0b10, 2);
        writer.write_bits(0b110011, 6);
        let output = writer.finish();

        let mut reader = BitReader::new(&output);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1111);
        assert_eq!(reader.read_bits(2).unwrap(), 0b10);
        assert_eq!(reader.read_bits(6).unwrap(), 0b110011);
    }

    #[test]
    fn test_align_to_byte() {
        let data = [0xFF, 0xAA];
        let mut reader = BitReader::new(&data);

        reader.read_bits(3).unwrap();
        reader.align_to_byte(); // Skip remaining 5 bits
        assert_eq!(reader.bit_position(), 8);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAA);
        assert_eq!(reader.bytes_consumed(), 2);
    }

    #[test]
    fn test_writer_align_and_bytes() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1, 1);
        writer.align_to_byte();
        writer.write_bytes(&[0x12, 0x34]);
        writer.write_bits(0b11, 2);
        writer.write_bytes(&[0xFF]);
        assert_eq!(writer.finish(), vec![0x01, 0x12, 0x34, 0xFF, 0x03]);
    }

    #[test]
    fn test_read_bytes() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A];
        let mut reader = BitReader::new(&data);

        let mut buf = [0u8; 2];
        reader.read_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34]);

        reader.read_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0x56, 0x78]);

        assert!(reader.read_bytes(&mut buf).is_err());
        assert_eq!(reader.read_bits(8).unwrap(), 0x9A);
    }

    #[test]
    fn test_bytes_consumed_rounds_up() {
        let data = [0xFF, 0xFF];
        let mut reader = BitReader::new(&data);
        reader.read_bits(9).unwrap();
        assert_eq!(reader.bytes_consumed(), 2);
    }
}
