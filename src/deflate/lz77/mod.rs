pub mod encode;

use std::fmt::Display;

use crate::error::EncodeError;

pub use encode::{lz77_encode, HashChain};

/// Largest distance a match may reach back.
pub const WINDOW_SIZE: usize = 32768;
pub const MIN_MATCH: usize = 3;
pub const MAX_MATCH: usize = 258;

/// Default cap on hash chain hops per search.
pub const DEFAULT_MAX_CHAIN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match {
        length: u16,  // 3-258
        distance: u16 // 1-32768
    }
}

impl Token {
    /// Number of input bytes this token stands for.
    pub fn span(&self) -> usize {
        match *self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => length as usize,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Literal(c) => write!(f, "{:02X}", c),
            Token::Match { length, distance } => write!(f, "({},{})", length, distance)
        }
    }
}

/// Replay a token stream back into bytes.
/// A match reaching back before the first byte is rejected.
pub fn expand_tokens(tokens: &[Token]) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(tokens.iter().map(Token::span).sum());
    for token in tokens {
        match *token {
            Token::Literal(c) => out.push(c),
            Token::Match { length, distance } => {
                let start = match out.len().checked_sub(distance as usize) {
                    Some(start) if distance > 0 => start,
                    _ => return Err(EncodeError::DistanceOutOfRange(distance as usize)),
                };
                // byte by byte, the source may overlap what is being copied
                for i in 0..length as usize {
                    out.push(out[start + i]);
                }
            }
        }
    }
    Ok(out)
}
