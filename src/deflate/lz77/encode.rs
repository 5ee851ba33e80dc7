use tracing::{debug, trace};

use super::{Token, MAX_MATCH, MIN_MATCH, WINDOW_SIZE};

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const HASH_MASK: usize = HASH_SIZE - 1;

/// Marks an empty head slot or the end of a chain.
const NIL: usize = usize::MAX;

fn hash3(data: &[u8], pos: usize) -> usize {
    (((data[pos] as usize) << 10) ^ ((data[pos + 1] as usize) << 5) ^ data[pos + 2] as usize) & HASH_MASK
}

/// Hash chains over a whole in-memory input.
///
/// `head` holds the most recent position for every 3-byte hash, `prev[p]` the
/// position inserted into the same bucket before `p`. Walking `prev` from a
/// head visits the candidates newest first.
pub struct HashChain {
    head: Vec<usize>,
    prev: Vec<usize>,
    max_chain: usize,
}

impl HashChain {
    /// Build an empty chain for an input of `len` bytes.
    pub fn new(len: usize, max_chain: usize) -> Self {
        HashChain {
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; len],
            max_chain,
        }
    }

    /// Record `pos` as the newest occurrence of its 3-byte prefix.
    /// Positions without a full prefix are skipped.
    pub fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH > data.len() {
            return;
        }
        let h = hash3(data, pos);
        self.prev[pos] = self.head[h];
        self.head[h] = pos;
    }

    /// Find the longest earlier occurrence of the bytes at `pos`.
    ///
    /// Returns `(length, distance)` for the best candidate, or `None` when
    /// nothing of at least `MIN_MATCH` bytes is found within the window.
    /// On equal lengths the nearest candidate wins.
    pub fn longest_match(&self, data: &[u8], pos: usize) -> Option<(usize, usize)> {
        if pos + MIN_MATCH > data.len() {
            return None;
        }

        let max_len = (data.len() - pos).min(MAX_MATCH);
        let mut best_match = (0, 0); // (length, distance)
        let mut candidate = self.head[hash3(data, pos)];
        let mut hops = 0;

        while candidate != NIL && hops < self.max_chain {
            // chains only ever point backwards
            debug_assert!(candidate < pos);
            let distance = pos - candidate;
            if distance > WINDOW_SIZE {
                // everything further down the chain is older still
                break;
            }

            let length = data[candidate..candidate + max_len]
                .iter()
                .zip(&data[pos..pos + max_len])
                .take_while(|(a, b)| a == b)
                .count();

            if length > best_match.0 {
                best_match = (length, distance);
                if length == max_len {
                    break;
                }
            }

            candidate = self.prev[candidate];
            hops += 1;
        }

        if best_match.0 >= MIN_MATCH {
            Some(best_match)
        } else {
            None
        }
    }
}

/// Split `data` into literals and back-references with a greedy hash chain
/// search. At most `max_chain` candidates are examined per position.
pub fn lz77_encode(data: &[u8], max_chain: usize) -> Vec<Token> {
    let mut output = Vec::with_capacity(data.len() / 2 + 1);
    let mut chain = HashChain::new(data.len(), max_chain);
    let mut matched_bytes = 0;
    let mut pos = 0;

    while pos < data.len() {
        match chain.longest_match(data, pos) {
            Some((length, distance)) => {
                trace!(pos, length, distance, "match");
                output.push(Token::Match { length: length as u16, distance: distance as u16 });
                // every covered position becomes a future match source
                for p in pos..pos + length {
                    chain.insert(data, p);
                }
                matched_bytes += length;
                pos += length;
            }
            None => {
                output.push(Token::Literal(data[pos]));
                chain.insert(data, pos);
                pos += 1;
            }
        }
    }

    debug!(
        input = data.len(),
        tokens = output.len(),
        matched_bytes,
        "lz77 pass complete"
    );
    output
}
