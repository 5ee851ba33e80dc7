//! Mapping between LZ77 lengths/distances and the DEFLATE code alphabets
//! (RFC 1951, Section 3.2.5).

use crate::error::EncodeError;
use super::lz77::{MAX_MATCH, MIN_MATCH, WINDOW_SIZE};

/// First length symbol in the literal/length alphabet.
pub const LENGTH_SYMBOL_BASE: u16 = 257;

/// Number of length codes (257..=285).
pub const LENGTH_CODES: usize = 29;

/// Number of distance codes (0..=29).
pub const DISTANCE_CODES: usize = 30;

pub const LENGTH_BASE: [u16; LENGTH_CODES] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31,
    35, 43, 51, 59, 67, 83, 99, 115, 131, 163, 195, 227, 258,
];

pub const LENGTH_EXTRA_BITS: [u8; LENGTH_CODES] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2,
    3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

pub const DISTANCE_BASE: [u16; DISTANCE_CODES] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193,
    257, 385, 513, 769, 1025, 1537, 2049, 3073, 4097, 6145,
    8193, 12289, 16385, 24577,
];

pub const DISTANCE_EXTRA_BITS: [u8; DISTANCE_CODES] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6,
    7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13, 13,
];

/// A symbol of one of the DEFLATE alphabets together with the extra bits that
/// follow its Huffman code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRepr {
    pub symbol: u16,
    pub extra_bits: u8,
    pub extra_value: u16,
}

/// Find `i` with `base[i] <= value` and (`i` is last or `value < base[i + 1]`).
fn bucket(base: &[u16], value: usize) -> usize {
    // `base` is ascending, so the entries <= value form a prefix
    base.partition_point(|&b| b as usize <= value) - 1
}

/// Map a match length (3..=258) to its length symbol (257..=285).
pub fn length_repr(length: usize) -> Result<SymbolRepr, EncodeError> {
    if !(MIN_MATCH..=MAX_MATCH).contains(&length) {
        return Err(EncodeError::LengthOutOfRange(length));
    }
    let i = bucket(&LENGTH_BASE, length);
    Ok(SymbolRepr {
        symbol: LENGTH_SYMBOL_BASE + i as u16,
        extra_bits: LENGTH_EXTRA_BITS[i],
        extra_value: (length - LENGTH_BASE[i] as usize) as u16,
    })
}

/// Map a match distance (1..=32768) to its distance symbol (0..=29).
pub fn distance_repr(distance: usize) -> Result<SymbolRepr, EncodeError> {
    if !(1..=WINDOW_SIZE).contains(&distance) {
        return Err(EncodeError::DistanceOutOfRange(distance));
    }
    let i = bucket(&DISTANCE_BASE, distance);
    Ok(SymbolRepr {
        symbol: i as u16,
        extra_bits: DISTANCE_EXTRA_BITS[i],
        extra_value: (distance - DISTANCE_BASE[i] as usize) as u16,
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    fn repr(symbol: u16, extra_bits: u8, extra_value: u16) -> SymbolRepr {
        SymbolRepr { symbol, extra_bits, extra_value }
    }

    #[test]
    fn test_length_repr() {
        assert_eq!(length_repr(3).unwrap(), repr(257, 0, 0));
        assert_eq!(length_repr(10).unwrap(), repr(264, 0, 0));
        assert_eq!(length_repr(11).unwrap(), repr(265, 1, 0));
        assert_eq!(length_repr(12).unwrap(), repr(265, 1, 1));
        assert_eq!(length_repr(18).unwrap(), repr(268, 1, 1));
        assert_eq!(length_repr(130).unwrap(), repr(280, 4, 15));
        assert_eq!(length_repr(227).unwrap(), repr(284, 5, 0));
        assert_eq!(length_repr(257).unwrap(), repr(284, 5, 30));
        assert_eq!(length_repr(258).unwrap(), repr(285, 0, 0));
    }

    #[test]
    fn test_distance_repr() {
        assert_eq!(distance_repr(1).unwrap(), repr(0, 0, 0));
        assert_eq!(distance_repr(4).unwrap(), repr(3, 0, 0));
        assert_eq!(distance_repr(5).unwrap(), repr(4, 1, 0));
        assert_eq!(distance_repr(6).unwrap(), repr(4, 1, 1));
        assert_eq!(distance_repr(8191).unwrap(), repr(25, 11, 2046));
        assert_eq!(distance_repr(24577).unwrap(), repr(29, 13, 0));
        assert_eq!(distance_repr(32768).unwrap(), repr(29, 13, 8191));
    }

    #[test]
    fn test_extra_value_fits_extra_bits() {
        for length in MIN_MATCH..=MAX_MATCH {
            let r = length_repr(length).unwrap();
            assert!((r.extra_value as u32) < (1 << r.extra_bits), "length {}", length);
            assert_eq!(LENGTH_BASE[(r.symbol - LENGTH_SYMBOL_BASE) as usize] as usize + r.extra_value as usize, length);
        }
        for distance in 1..=WINDOW_SIZE {
            let r = distance_repr(distance).unwrap();
            assert!((r.extra_value as u32) < (1 << r.extra_bits), "distance {}", distance);
            assert_eq!(DISTANCE_BASE[r.symbol as usize] as usize + r.extra_value as usize, distance);
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(length_repr(2), Err(EncodeError::LengthOutOfRange(2))));
        assert!(matches!(length_repr(259), Err(EncodeError::LengthOutOfRange(259))));
        assert!(matches!(distance_repr(0), Err(EncodeError::DistanceOutOfRange(0))));
        assert!(matches!(distance_repr(32769), Err(EncodeError::DistanceOutOfRange(32769))));
    }
}
