use bitstream_io::{BitWrite, BitWriter, LittleEndian};
use std::io;

use super::huffman::Code;

/// Packs variable-length bit fields into a growable byte buffer, LSB-first,
/// the way RFC 1951 lays out a DEFLATE stream.
pub struct BitSink {
    writer: BitWriter<Vec<u8>, LittleEndian>,
    bits_written: u64,
}

impl BitSink {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(bytes: usize) -> Self {
        BitSink {
            writer: BitWriter::endian(Vec::with_capacity(bytes), LittleEndian),
            bits_written: 0,
        }
    }

    /// Write the low `count` bits of `value`, least significant bit first.
    /// Used for block headers and extra bits.
    pub fn write_bits(&mut self, count: u32, value: u32) -> io::Result<()> {
        if count == 0 {
            return Ok(());
        }
        debug_assert!(count <= 32);
        let value = if count < 32 { value & ((1 << count) - 1) } else { value };
        self.writer.write(count, value)?;
        self.bits_written += count as u64;
        Ok(())
    }

    /// Write a Huffman code, most significant bit first.
    pub fn write_code(&mut self, code: Code) -> io::Result<()> {
        self.write_bits(code.len as u32, reverse_bits(code.bits as u32, code.len as u32))
    }

    /// Number of bits written so far, padding excluded.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Zero-pad the final partial byte and hand back the bytes.
    pub fn finish(mut self) -> io::Result<Vec<u8>> {
        self.writer.byte_align()?;
        Ok(self.writer.into_writer())
    }
}

impl Default for BitSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Reverse the low `num` bits of `bits`.
pub fn reverse_bits(bits: u32, num: u32) -> u32 {
    assert!(num <= 32);
    if num == 0 {
        return 0;
    }
    bits.reverse_bits() >> (32 - num)
}
