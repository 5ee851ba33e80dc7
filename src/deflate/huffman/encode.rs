use tracing::trace;

use crate::deflate::bitstream::BitSink;
use crate::deflate::lz77::Token;
use crate::deflate::symbol::{
    distance_repr, length_repr, DISTANCE_CODES, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS,
    LENGTH_SYMBOL_BASE,
};
use crate::error::EncodeError;
use super::{END_OF_BLOCK, FIXED_DISTANCE_CODES, FIXED_LITERAL_CODES, FIXED_LITERAL_LENGTHS, LITERAL_CODES};

/// BFINAL = 1, BTYPE = 01 (fixed huffman codes), packed LSB-first.
const FIXED_BLOCK_HEADER: u32 = 0b011;
const BLOCK_HEADER_BITS: u32 = 3;

/// Occurrence counts of every literal/length and distance symbol in a block.
#[derive(Debug, Clone)]
pub struct SymbolFrequencies {
    pub literal: [u32; LITERAL_CODES],
    pub distance: [u32; DISTANCE_CODES],
}

impl SymbolFrequencies {
    /// Count the symbols `block` maps to. The end-of-block symbol is counted once.
    pub fn tally(block: &[Token]) -> Result<Self, EncodeError> {
        let mut freqs = SymbolFrequencies {
            literal: [0; LITERAL_CODES],
            distance: [0; DISTANCE_CODES],
        };

        for token in block {
            match *token {
                Token::Literal(lit) => {
                    freqs.literal[lit as usize] = freqs.literal[lit as usize].saturating_add(1);
                }
                Token::Match { length, distance } => {
                    let l = length_repr(length as usize)?.symbol as usize;
                    let d = distance_repr(distance as usize)?.symbol as usize;
                    freqs.literal[l] = freqs.literal[l].saturating_add(1);
                    freqs.distance[d] = freqs.distance[d].saturating_add(1);
                }
            }
        }
        freqs.literal[END_OF_BLOCK as usize] += 1;

        Ok(freqs)
    }

    /// Bits needed for the symbols and their extra bits when coded with the
    /// given code lengths. Block header and code tables are not included.
    pub fn payload_bits(&self, literal_lengths: &[u8], distance_lengths: &[u8]) -> u64 {
        let literal: u64 = self
            .literal
            .iter()
            .zip(literal_lengths)
            .enumerate()
            .map(|(symbol, (&freq, &len))| freq as u64 * (len as u64 + literal_extra_bits(symbol)))
            .sum();
        let distance: u64 = self
            .distance
            .iter()
            .zip(distance_lengths)
            .zip(DISTANCE_EXTRA_BITS)
            .map(|((&freq, &len), extra)| freq as u64 * (len as u64 + extra as u64))
            .sum();
        literal + distance
    }

    /// Exact size in bits of the block `fixed_huffman_encode_block` produces,
    /// before padding to a byte boundary.
    pub fn fixed_block_bits(&self) -> u64 {
        BLOCK_HEADER_BITS as u64 + self.payload_bits(&FIXED_LITERAL_LENGTHS[..], &[5; DISTANCE_CODES])
    }
}

fn literal_extra_bits(symbol: usize) -> u64 {
    match symbol.checked_sub(LENGTH_SYMBOL_BASE as usize) {
        Some(i) => LENGTH_EXTRA_BITS[i] as u64,
        None => 0,
    }
}

/// Compress the block using fixed huffman codes as the final block of a stream.
///
/// Return the compressed block, including the header, the compressed data and
/// the end of block symbol, zero-padded to a whole byte, together with the
/// number of bits written before padding.
pub fn fixed_huffman_encode_block(block: &[Token]) -> Result<(Vec<u8>, u64), EncodeError> {
    let mut sink = BitSink::with_capacity(block.len() + 2);

    sink.write_bits(BLOCK_HEADER_BITS, FIXED_BLOCK_HEADER)?;

    for token in block {
        match *token {
            Token::Literal(lit) => {
                FIXED_LITERAL_CODES.encode_char(&mut sink, lit as u16)?;
            }
            Token::Match { length, distance } => {
                trace!(length, distance, "pointer");
                let len = length_repr(length as usize)?;
                FIXED_LITERAL_CODES.encode_char(&mut sink, len.symbol)?;
                sink.write_bits(len.extra_bits as u32, len.extra_value as u32)?;

                let dist = distance_repr(distance as usize)?;
                FIXED_DISTANCE_CODES.encode_char(&mut sink, dist.symbol)?;
                sink.write_bits(dist.extra_bits as u32, dist.extra_value as u32)?;
            }
        }
    }

    // Write the end of block symbol
    FIXED_LITERAL_CODES.encode_char(&mut sink, END_OF_BLOCK)?;

    let bits = sink.bits_written();
    Ok((sink.finish()?, bits))
}
