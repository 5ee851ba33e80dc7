//! Single-block DEFLATE compression (RFC 1951) with the fixed huffman codes.

pub mod bitstream;
pub mod huffman;
pub mod lz77;
pub mod symbol;

use tracing::debug;

use crate::error::EncodeError;
use huffman::encode::{fixed_huffman_encode_block, SymbolFrequencies};
use huffman::{HuffmanTree, LITERAL_CODES};
use lz77::{lz77_encode, Token, DEFAULT_MAX_CHAIN};
use symbol::DISTANCE_CODES;

/// Tuning knobs of the compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Hash chain hops examined per match search. Larger values search the
    /// window more thoroughly at the cost of speed.
    pub max_chain: usize,
}

impl Default for CompressOptions {
    fn default() -> Self {
        CompressOptions { max_chain: DEFAULT_MAX_CHAIN }
    }
}

/// What one pass of the compressor did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeflateStats {
    pub tokens: usize,
    pub literals: usize,
    pub matches: usize,
    /// Size of the emitted block before the final padding.
    pub fixed_bits: u64,
    /// Symbol payload a dynamic block would need with code lengths taken from
    /// huffman trees over this block's frequencies. Only informational: the
    /// code length tables are not counted and nothing is emitted this way.
    pub dynamic_payload_bits: u64,
}

/// A raw DEFLATE stream and the statistics of the pass that produced it.
#[derive(Debug, Clone)]
pub struct Deflated {
    pub data: Vec<u8>,
    pub stats: DeflateStats,
}

/// Compress `input` into one final DEFLATE block using the fixed huffman codes.
///
/// The output carries no zlib/gzip wrapper and no checksum.
pub fn deflate(input: &[u8], options: &CompressOptions) -> Result<Deflated, EncodeError> {
    let tokens = lz77_encode(input, options.max_chain);
    let freqs = SymbolFrequencies::tally(&tokens)?;

    let literal_tree = HuffmanTree::build_from_freq(&freqs.literal)?;
    let distance_tree = HuffmanTree::build_from_freq(&freqs.distance)?;
    let dynamic_payload_bits = freqs.payload_bits(
        &literal_tree.code_lengths(LITERAL_CODES),
        &distance_tree.code_lengths(DISTANCE_CODES),
    );

    let (data, fixed_bits) = fixed_huffman_encode_block(&tokens)?;
    debug_assert_eq!(fixed_bits, freqs.fixed_block_bits());

    let matches = tokens.iter().filter(|t| matches!(t, Token::Match { .. })).count();
    let stats = DeflateStats {
        tokens: tokens.len(),
        literals: tokens.len() - matches,
        matches,
        fixed_bits,
        dynamic_payload_bits,
    };
    debug!(
        input = input.len(),
        output = data.len(),
        tokens = stats.tokens,
        matches = stats.matches,
        fixed_bits,
        dynamic_payload_bits,
        "deflate block encoded"
    );

    Ok(Deflated { data, stats })
}
