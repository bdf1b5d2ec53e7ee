//! Bit field reading.
//!
//! A [`BitReader`] reads unsigned and signed fields of up to 64 bits that are packed most significant bit first without regard to byte boundaries, as in the data sections of GRIB messages.
//!
//! ```
//! # use nclayout::bit_reader::BitReader;
//! let bytes = [0b1011_0011u8, 0b0111_1100];
//! let mut reader = BitReader::new(&bytes[..], 0);
//! assert_eq!(reader.read_unsigned(3)?, 0b101);
//! assert_eq!(reader.read_unsigned(7)?, 0b10011_01);
//! assert_eq!(reader.read_signed(4)?, -7);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use thiserror::Error;

use crate::{
    config::global_config,
    storage::{ReadableStorageTraits, StorageError},
};

/// A bit reader error.
#[derive(Debug, Error)]
pub enum BitReaderError {
    /// The source ended before the requested bits.
    #[error("end of data")]
    EndOfData,
    /// More than 64 bits were requested.
    #[error("cannot read {0} bits, the maximum is 64")]
    TooManyBits(u32),
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
}

/// Reads bit fields from storage starting at a byte offset.
///
/// Bytes are read from the source in blocks of [bit reader buffer size](crate::config::Config#bit-reader-buffer-size) bytes.
pub struct BitReader<'a, S: ReadableStorageTraits + ?Sized> {
    source: &'a S,
    start_pos: u64,
    buffer: Vec<u8>,
    buffer_size: usize,
    /// The absolute position of the first byte of `buffer`.
    buffer_pos: u64,
    /// The position of the next byte to load relative to `start_pos`.
    byte_pos: u64,
    bit_buf: u8,
    /// Unread bits in the low end of `bit_buf`, 0 if a byte must be loaded.
    bits_left: u32,
}

impl<'a, S: ReadableStorageTraits + ?Sized> BitReader<'a, S> {
    /// Create a bit reader over `source` with bit offset 0 at byte `start_pos`.
    #[must_use]
    pub fn new(source: &'a S, start_pos: u64) -> Self {
        let buffer_size = global_config().bit_reader_buffer_size();
        Self::new_with_buffer_size(source, start_pos, buffer_size)
    }

    /// Create a bit reader over `source` with bit offset 0 at byte `start_pos`, reading `buffer_size` bytes at a time.
    #[must_use]
    pub fn new_with_buffer_size(source: &'a S, start_pos: u64, buffer_size: usize) -> Self {
        Self {
            source,
            start_pos,
            buffer: Vec::new(),
            buffer_size: buffer_size.max(1),
            buffer_pos: 0,
            byte_pos: 0,
            bit_buf: 0,
            bits_left: 0,
        }
    }

    /// Return the number of bits consumed since the start position.
    #[must_use]
    pub fn bit_position(&self) -> u64 {
        self.byte_pos * 8 - u64::from(self.bits_left)
    }

    /// Return the absolute byte position of the next unread bit.
    #[must_use]
    pub fn byte_position(&self) -> u64 {
        if self.bits_left == 0 {
            self.start_pos + self.byte_pos
        } else {
            self.start_pos + self.byte_pos - 1
        }
    }

    /// Seek so that the next read starts `bit_offset` bits after the start position.
    ///
    /// # Errors
    /// Returns a [`BitReaderError`] if `bit_offset` is not byte aligned and the byte containing it cannot be read.
    pub fn set_bit_offset(&mut self, bit_offset: u64) -> Result<(), BitReaderError> {
        self.byte_pos = bit_offset / 8;
        self.bits_left = 0;
        let consumed = (bit_offset % 8) as u32;
        if consumed != 0 {
            self.bit_buf = self.next_byte()? & (0xff >> consumed);
            self.bits_left = 8 - consumed;
        }
        Ok(())
    }

    /// Discard the unread bits of the current byte.
    pub fn align_to_byte(&mut self) {
        self.bits_left = 0;
    }

    /// Read an unsigned field of `nbits` bits.
    ///
    /// Reading 0 bits returns 0 and consumes nothing.
    ///
    /// # Errors
    /// Returns [`BitReaderError::TooManyBits`] if `nbits` exceeds 64, [`BitReaderError::EndOfData`] if the source ends first, or a [`BitReaderError::StorageError`] if the source cannot be read.
    pub fn read_unsigned(&mut self, nbits: u32) -> Result<u64, BitReaderError> {
        if nbits > 64 {
            return Err(BitReaderError::TooManyBits(nbits));
        }
        let mut value = 0u64;
        let mut remaining = nbits;
        while remaining > 0 {
            if self.bits_left == 0 {
                self.bit_buf = self.next_byte()?;
                self.bits_left = 8;
            }
            let take = remaining.min(self.bits_left);
            let shift = self.bits_left - take;
            let bits = (u32::from(self.bit_buf) >> shift) & ((1 << take) - 1);
            value = (value << take) | u64::from(bits);
            self.bits_left -= take;
            remaining -= take;
        }
        Ok(value)
    }

    /// Read a signed field of `nbits` bits.
    ///
    /// The most significant bit of the field is a sign flag and the remaining bits are the magnitude.
    /// This is not two's complement: a field of `1` followed by zeros is negative zero, which reads as 0.
    ///
    /// # Errors
    /// See [`read_unsigned`](BitReader::read_unsigned).
    pub fn read_signed(&mut self, nbits: u32) -> Result<i64, BitReaderError> {
        let field = self.read_unsigned(nbits)?;
        if nbits == 0 {
            return Ok(0);
        }
        let sign_bit = 1u64 << (nbits - 1);
        // below 2^63
        let magnitude = (field & !sign_bit) as i64;
        if field & sign_bit == 0 {
            Ok(magnitude)
        } else {
            Ok(-magnitude)
        }
    }

    fn next_byte(&mut self) -> Result<u8, BitReaderError> {
        let pos = self
            .start_pos
            .checked_add(self.byte_pos)
            .ok_or(BitReaderError::EndOfData)?;
        let in_buffer = pos
            .checked_sub(self.buffer_pos)
            .filter(|&i| i < self.buffer.len() as u64);
        let index = match in_buffer {
            Some(index) => index,
            None => {
                self.fill_buffer(pos)?;
                0
            }
        };
        self.byte_pos += 1;
        // index is within the buffer
        Ok(self.buffer[index as usize])
    }

    fn fill_buffer(&mut self, pos: u64) -> Result<(), BitReaderError> {
        let size = self.source.size()?;
        if pos >= size {
            return Err(BitReaderError::EndOfData);
        }
        let len = (size - pos).min(self.buffer_size as u64);
        // len is at most buffer_size
        self.buffer.resize(len as usize, 0);
        self.source.read_exact_at(pos, &mut self.buffer)?;
        self.buffer_pos = pos;
        tracing::trace!("bit reader buffered {len} bytes at {pos}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pack fields most significant bit first.
    #[derive(Default)]
    struct BitWriter {
        bytes: Vec<u8>,
        bits: u32,
    }

    impl BitWriter {
        fn write(&mut self, value: u64, nbits: u32) {
            for i in (0..nbits).rev() {
                if self.bits % 8 == 0 {
                    self.bytes.push(0);
                }
                let bit = ((value >> i) & 1) as u8;
                *self.bytes.last_mut().unwrap() |= bit << (7 - self.bits % 8);
                self.bits += 1;
            }
        }
    }

    const PATTERN: u64 = 0x9E37_79B9_7F4A_7C15;

    fn field(nbits: u32) -> u64 {
        if nbits == 0 {
            0
        } else {
            PATTERN >> (64 - nbits)
        }
    }

    #[test]
    fn bit_reader_unsigned_all_widths() {
        let mut writer = BitWriter::default();
        for nbits in 0..=64 {
            writer.write(field(nbits), nbits);
        }
        for buffer_size in [1, 3, 4096] {
            let mut reader = BitReader::new_with_buffer_size(&writer.bytes, 0, buffer_size);
            for nbits in 0..=64 {
                assert_eq!(reader.read_unsigned(nbits).unwrap(), field(nbits), "{nbits} bits");
            }
            assert_eq!(reader.bit_position(), u64::from(writer.bits));
        }
    }

    #[test]
    fn bit_reader_signed() {
        let mut writer = BitWriter::default();
        let mut expected = Vec::new();
        for nbits in 2..=64 {
            let magnitude = 0x5555_5555_5555_5555u64 >> (65 - nbits);
            let negative = nbits % 2 == 0;
            writer.write(u64::from(negative), 1);
            writer.write(magnitude, nbits - 1);
            let magnitude = i64::try_from(magnitude).unwrap();
            expected.push(if negative { -magnitude } else { magnitude });
        }
        let mut reader = BitReader::new(&writer.bytes, 0);
        for (nbits, expected) in (2..=64).zip(expected) {
            assert_eq!(reader.read_signed(nbits).unwrap(), expected, "{nbits} bits");
        }

        let bytes = [0b1011_0011u8, 0b1000_0000];
        let mut reader = BitReader::new(&bytes[..], 0);
        assert_eq!(reader.read_signed(4).unwrap(), -3);
        assert_eq!(reader.read_signed(4).unwrap(), 3);
        assert_eq!(reader.read_signed(0).unwrap(), 0);
        assert_eq!(reader.read_signed(8).unwrap(), 0);
    }

    #[test]
    fn bit_reader_seek() {
        let mut writer = BitWriter::default();
        for nbits in 1..=20 {
            writer.write(field(nbits), nbits);
        }
        let mut sequential = BitReader::new_with_buffer_size(&writer.bytes, 0, 2);
        let mut offset = 0;
        for nbits in 1..=20 {
            let value = sequential.read_unsigned(nbits).unwrap();
            let mut seeking = BitReader::new_with_buffer_size(&writer.bytes, 0, 2);
            seeking.set_bit_offset(offset).unwrap();
            assert_eq!(seeking.bit_position(), offset);
            assert_eq!(seeking.read_unsigned(nbits).unwrap(), value);
            offset += u64::from(nbits);
        }
    }

    #[test]
    fn bit_reader_positions() {
        let bytes = [0xffu8, 0xff, 0b1010_0000, 0x0f];
        let mut reader = BitReader::new(&bytes[..], 2);
        assert_eq!(reader.byte_position(), 2);
        assert_eq!(reader.read_unsigned(3).unwrap(), 0b101);
        assert_eq!(reader.bit_position(), 3);
        assert_eq!(reader.byte_position(), 2);
        reader.align_to_byte();
        assert_eq!(reader.bit_position(), 8);
        assert_eq!(reader.byte_position(), 3);
        assert_eq!(reader.read_unsigned(8).unwrap(), 0x0f);
        assert!(matches!(
            reader.read_unsigned(1),
            Err(BitReaderError::EndOfData)
        ));
        assert!(matches!(
            reader.read_unsigned(65),
            Err(BitReaderError::TooManyBits(65))
        ));
        assert!(matches!(
            reader.set_bit_offset(100),
            Err(BitReaderError::EndOfData)
        ));
    }
}
