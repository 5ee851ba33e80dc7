//! A single-block DEFLATE compressor: greedy LZ77 over hash chains followed by
//! the fixed huffman codes of RFC 1951. Output is a raw DEFLATE stream, without
//! zlib or gzip framing.

pub mod compress;
pub mod deflate;
pub mod error;

pub use compress::{compress, CompressStats};
pub use deflate::{deflate, CompressOptions, Deflated, DeflateStats};
pub use error::{EncodeError, Error, Result};
