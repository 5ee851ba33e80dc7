pub mod encode;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use lazy_static::lazy_static;

use crate::error::EncodeError;
use super::bitstream::BitSink;
use super::symbol::DISTANCE_CODES;

/// The maximum number of bits in a huffman code
pub const MAX_BITS: u8 = 15;

/// Size of the literal/length alphabet that can appear in a block:
/// 256 literals, end-of-block and 29 length codes.
pub const LITERAL_CODES: usize = 286;

pub const END_OF_BLOCK: u16 = 256;


lazy_static! {
    pub static ref FIXED_LITERAL_LENGTHS: [u8; 288] = {
        let mut bits = [0; 288];
        bits[..144].fill(8);
        bits[144..256].fill(9);
        bits[256..280].fill(7);
        bits[280..].fill(8);
        bits
    };

    pub static ref FIXED_LITERAL_CODES: HuffmanCodes = HuffmanCodes::canonical(&*FIXED_LITERAL_LENGTHS);

    pub static ref FIXED_DISTANCE_CODES: HuffmanCodes = HuffmanCodes::canonical(&[5; DISTANCE_CODES]);
}


/// A huffman code: `len` bits, stored most significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    pub bits: u64,
    pub len: u8,
}

/// Per-symbol codes of one alphabet.
#[derive(Debug, Clone)]
pub struct HuffmanCodes {
    codes: Vec<Option<Code>>,
}

impl HuffmanCodes {
    /// Build canonical codes from code lengths, as described in RFC 1951, Section 3.2.2.
    /// `codelens[3] == 2` means that symbol 3 is encoded using 2 bits; 0 means unused.
    /// Lengths must not exceed `MAX_BITS`.
    fn canonical(codelens: &[u8]) -> Self {
        // Step 1: Count the number of codes for each code length
        let mut bl_count = [0_u32; MAX_BITS as usize + 1];
        for &bits in codelens {
            bl_count[bits as usize] += 1;
        }

        // Step 2: Find the numerical value for the smallest code for each code length
        bl_count[0] = 0;
        let mut next_code = [0_u64; MAX_BITS as usize + 1];
        let mut code = 0_u64;
        for bits in 1..=MAX_BITS as usize {
            code = (code + bl_count[bits - 1] as u64) << 1;
            next_code[bits] = code;
        }

        // Step 3: Assign consecutive values to all codes of the same length
        let codes = codelens
            .iter()
            .map(|&bits| {
                if bits == 0 {
                    return None;
                }
                let code = Code { bits: next_code[bits as usize], len: bits };
                next_code[bits as usize] += 1;
                Some(code)
            })
            .collect();

        HuffmanCodes { codes }
    }

    pub fn get(&self, symbol: u16) -> Option<Code> {
        self.codes.get(symbol as usize).copied().flatten()
    }

    /// Write the code of `symbol` into the bitstream.
    pub fn encode_char(&self, sink: &mut BitSink, symbol: u16) -> Result<(), EncodeError> {
        match self.get(symbol) {
            Some(code) => Ok(sink.write_code(code)?),
            None => Err(EncodeError::MissingCode(symbol)),
        }
    }
}


/// A prefix code tree built from symbol frequencies. Each node owns its children.
#[derive(Debug)]
pub struct HuffmanTree {
    symbol: Option<u16>,
    frequency: u64,
    left: Option<Box<HuffmanTree>>,
    right: Option<Box<HuffmanTree>>,
}

/// A root waiting to be merged, ordered so the heap pops the lowest
/// frequency first and, among equals, the root created first.
struct Root {
    frequency: u64,
    order: usize,
    node: Box<HuffmanTree>,
}

impl PartialEq for Root {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Root {}

impl PartialOrd for Root {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Root {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap is a max-heap
        (other.frequency, other.order).cmp(&(self.frequency, self.order))
    }
}

impl HuffmanTree {
    /// Create a new huffman tree node with no children
    pub fn new(symbol: Option<u16>, frequency: u64) -> Self {
        HuffmanTree {
            symbol,
            frequency,
            left: None,
            right: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn symbol(&self) -> Option<u16> {
        self.symbol
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn left(&self) -> Option<&HuffmanTree> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&HuffmanTree> {
        self.right.as_deref()
    }

    /// Build a huffman tree from `frequencies`, indexed by symbol.
    /// Symbols with frequency 0 are left out.
    ///
    /// The two lowest roots are merged until one remains, the first one popped
    /// becoming the left child. Frequency ties go to the root created earlier;
    /// leaves are created in symbol order, merged parents after all leaves.
    ///
    /// With no live symbols the result is a single dummy leaf for symbol 0.
    /// With one live symbol the leaf is hung under a parent so that it still
    /// gets a one-bit code.
    ///
    /// Symbols are `u16`, so `frequencies` may hold at most 65536 entries.
    pub fn build_from_freq(frequencies: &[u32]) -> Result<Self, EncodeError> {
        if frequencies.len() > u16::MAX as usize + 1 {
            return Err(EncodeError::AlphabetTooLarge(frequencies.len()));
        }

        let mut heap: BinaryHeap<Root> = frequencies
            .iter()
            .enumerate()
            .filter(|(_, freq)| **freq > 0)
            .enumerate()
            .map(|(order, (symbol, &freq))| Root {
                frequency: freq as u64,
                order,
                node: Box::new(HuffmanTree::new(Some(symbol as u16), freq as u64)),
            })
            .collect();
        let mut next_order = heap.len();

        match heap.len() {
            0 => return Ok(HuffmanTree::new(Some(0), 0)),
            1 => {
                let only = heap.pop().map(|root| root.node);
                return Ok(HuffmanTree {
                    symbol: None,
                    frequency: only.as_ref().map_or(0, |node| node.frequency),
                    left: only,
                    right: None,
                });
            }
            _ => {}
        }

        while heap.len() > 1 {
            let (Some(smallest), Some(second_smallest)) = (heap.pop(), heap.pop()) else {
                break;
            };
            let frequency = smallest.frequency + second_smallest.frequency;
            let combined_node = HuffmanTree {
                symbol: None,
                frequency,
                left: Some(smallest.node),
                right: Some(second_smallest.node),
            };
            heap.push(Root { frequency, order: next_order, node: Box::new(combined_node) });
            next_order += 1;
        }

        Ok(match heap.pop() {
            Some(root) => *root.node,
            None => HuffmanTree::new(Some(0), 0),
        })
    }

    /// Assign codes by a pre-order walk, `0` for left and `1` for right.
    /// Returns `(symbol, code)` for every leaf, in walk order.
    pub fn codes(&self) -> Vec<(u16, Code)> {
        let mut codes = Vec::new();
        self.collect_codes(0, 0, &mut codes);
        codes
    }

    fn collect_codes(&self, bits: u64, depth: u8, codes: &mut Vec<(u16, Code)>) {
        if self.is_leaf() {
            if let Some(symbol) = self.symbol {
                codes.push((symbol, Code { bits, len: depth }));
            }
            return;
        }
        if let Some(left) = &self.left {
            left.collect_codes(bits << 1, depth + 1, codes);
        }
        if let Some(right) = &self.right {
            right.collect_codes((bits << 1) | 1, depth + 1, codes);
        }
    }

    /// Code length of every symbol below `alphabet_size`, 0 for symbols not
    /// in the tree.
    pub fn code_lengths(&self, alphabet_size: usize) -> Vec<u8> {
        let mut lengths = vec![0; alphabet_size];
        for (symbol, code) in self.codes() {
            if let Some(len) = lengths.get_mut(symbol as usize) {
                *len = code.len;
            }
        }
        lengths
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf_symbols(tree: &HuffmanTree) -> Vec<u16> {
        tree.codes().into_iter().map(|(symbol, _)| symbol).collect()
    }

    /// Frequencies add up at every inner node.
    fn assert_sums(tree: &HuffmanTree) {
        if tree.is_leaf() {
            return;
        }
        let children = tree.left().map_or(0, |n| n.frequency()) + tree.right().map_or(0, |n| n.frequency());
        assert_eq!(tree.frequency(), children);
        tree.left().into_iter().chain(tree.right()).for_each(assert_sums);
    }

    fn is_prefix(a: Code, b: Code) -> bool {
        a.len <= b.len && (b.bits >> (b.len - a.len)) == a.bits
    }

    #[test]
    fn test_huffman_from_codelens() {
        // the example of RFC 1951, Section 3.2.2
        let codes = HuffmanCodes::canonical(&[3, 3, 3, 3, 3, 2, 4, 4]);
        let expected = [
            (0b010, 3), (0b011, 3), (0b100, 3), (0b101, 3),
            (0b110, 3), (0b00, 2), (0b1110, 4), (0b1111, 4),
        ];
        for (symbol, &(bits, len)) in expected.iter().enumerate() {
            assert_eq!(codes.get(symbol as u16), Some(Code { bits, len }));
        }
        assert_eq!(codes.get(8), None);
    }

    #[test]
    fn test_fixed_literal_codes() {
        assert_eq!(FIXED_LITERAL_CODES.get(0), Some(Code { bits: 0b0011_0000, len: 8 }));
        assert_eq!(FIXED_LITERAL_CODES.get(143), Some(Code { bits: 0b1011_1111, len: 8 }));
        assert_eq!(FIXED_LITERAL_CODES.get(144), Some(Code { bits: 0b1_1001_0000, len: 9 }));
        assert_eq!(FIXED_LITERAL_CODES.get(255), Some(Code { bits: 0b1_1111_1111, len: 9 }));
        assert_eq!(FIXED_LITERAL_CODES.get(256), Some(Code { bits: 0, len: 7 }));
        assert_eq!(FIXED_LITERAL_CODES.get(279), Some(Code { bits: 0b001_0111, len: 7 }));
        assert_eq!(FIXED_LITERAL_CODES.get(280), Some(Code { bits: 0b1100_0000, len: 8 }));
        assert_eq!(FIXED_LITERAL_CODES.get(287), Some(Code { bits: 0b1100_0111, len: 8 }));
    }

    #[test]
    fn test_fixed_distance_codes() {
        for symbol in 0..DISTANCE_CODES as u16 {
            assert_eq!(FIXED_DISTANCE_CODES.get(symbol), Some(Code { bits: symbol as u64, len: 5 }));
        }
        assert_eq!(FIXED_DISTANCE_CODES.get(30), None);
    }

    #[test]
    fn test_encode_missing_symbol() {
        let mut sink = BitSink::new();
        assert!(matches!(
            FIXED_DISTANCE_CODES.encode_char(&mut sink, 31),
            Err(EncodeError::MissingCode(31))
        ));
    }

    #[test]
    fn test_huffman_tree_empty() {
        let tree = HuffmanTree::build_from_freq(&[0; 30]).unwrap();
        assert!(tree.is_leaf());
        assert_eq!(tree.codes(), vec![(0, Code { bits: 0, len: 0 })]);
    }

    #[test]
    fn test_huffman_tree_single_symbol() {
        let mut freqs = [0; 30];
        freqs[7] = 42;
        let tree = HuffmanTree::build_from_freq(&freqs).unwrap();
        assert!(!tree.is_leaf());
        assert_eq!(tree.frequency(), 42);
        assert!(tree.right().is_none());
        assert_eq!(tree.codes(), vec![(7, Code { bits: 0, len: 1 })]);
        assert_eq!(tree.code_lengths(30)[7], 1);
    }

    #[test]
    fn test_huffman_tree_two_symbols() {
        let tree = HuffmanTree::build_from_freq(&[0, 5, 0, 3]).unwrap();
        // the lower frequency is popped first and goes left
        assert_eq!(tree.codes(), vec![
            (3, Code { bits: 0, len: 1 }),
            (1, Code { bits: 1, len: 1 }),
        ]);
        assert_eq!(tree.frequency(), 8);
    }

    #[test]
    fn test_huffman_tree_tie_break() {
        // all equal: symbols pair up in order, then the parents in creation order
        let tree = HuffmanTree::build_from_freq(&[1, 1, 1, 1]).unwrap();
        assert_eq!(leaf_symbols(&tree), vec![0, 1, 2, 3]);
        assert_eq!(tree.code_lengths(4), vec![2, 2, 2, 2]);

        // a merged parent of weight 2 loses the tie against the leaf of weight 2
        let tree = HuffmanTree::build_from_freq(&[1, 1, 2]).unwrap();
        assert_eq!(tree.codes(), vec![
            (2, Code { bits: 0b0, len: 1 }),
            (0, Code { bits: 0b10, len: 2 }),
            (1, Code { bits: 0b11, len: 2 }),
        ]);
    }

    #[test]
    fn test_huffman_tree_skewed() {
        let tree = HuffmanTree::build_from_freq(&[1, 2, 4, 8, 16]).unwrap();
        assert_eq!(tree.code_lengths(5), vec![4, 4, 3, 2, 1]);
        assert_sums(&tree);
    }

    #[test]
    fn test_alphabet_limit() {
        let mut freqs = vec![0u32; u16::MAX as usize + 1];
        freqs[u16::MAX as usize] = 4;
        freqs[1] = 1;
        let tree = HuffmanTree::build_from_freq(&freqs).unwrap();
        assert_eq!(tree.codes(), vec![
            (1, Code { bits: 0, len: 1 }),
            (u16::MAX, Code { bits: 1, len: 1 }),
        ]);

        freqs.push(1);
        assert!(matches!(
            HuffmanTree::build_from_freq(&freqs),
            Err(EncodeError::AlphabetTooLarge(65537))
        ));
    }

    #[test]
    fn test_code_lengths_ignores_absent_symbols() {
        let tree = HuffmanTree::build_from_freq(&[0, 3, 0, 3, 6]).unwrap();
        assert_eq!(tree.code_lengths(5), vec![0, 2, 0, 2, 1]);
    }

    proptest! {
        #[test]
        fn prop_tree_is_valid_prefix_code(freqs in prop::collection::vec(0u32..1000, 2..LITERAL_CODES)) {
            let live = freqs.iter().filter(|&&f| f > 0).count();
            prop_assume!(live >= 2);

            let tree = HuffmanTree::build_from_freq(&freqs).unwrap();
            assert_sums(&tree);
            prop_assert_eq!(tree.frequency(), freqs.iter().map(|&f| f as u64).sum::<u64>());

            let codes = tree.codes();
            prop_assert_eq!(codes.len(), live);

            // prefix-free
            for (i, &(_, a)) in codes.iter().enumerate() {
                for &(_, b) in &codes[i + 1..] {
                    prop_assert!(!is_prefix(a, b) && !is_prefix(b, a));
                }
            }

            // Kraft equality for a full binary tree
            let max_len = codes.iter().map(|(_, c)| c.len).max().unwrap_or(0) as u32;
            prop_assume!(max_len < 64);
            let kraft: u128 = codes.iter().map(|(_, c)| 1u128 << (max_len - c.len as u32)).sum();
            prop_assert_eq!(kraft, 1u128 << max_len);

            // more frequent symbols never get longer codes
            let lengths = tree.code_lengths(freqs.len());
            for a in 0..freqs.len() {
                for b in 0..freqs.len() {
                    if freqs[a] > 0 && freqs[b] > 0 && freqs[a] > freqs[b] {
                        prop_assert!(lengths[a] <= lengths[b], "symbol {} vs {}", a, b);
                    }
                }
            }
        }
    }
}
