use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while turning a token stream into bits.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("match length {0} is outside 3..=258")]
    LengthOutOfRange(usize),

    #[error("match distance {0} is outside 1..=32768")]
    DistanceOutOfRange(usize),

    #[error("alphabet of {0} symbols does not fit 16-bit symbol ids")]
    AlphabetTooLarge(usize),

    #[error("symbol {0} has no code in the alphabet")]
    MissingCode(u16),

    #[error("bit writer failed: {0}")]
    Io(#[from] io::Error),
}

/// Everything that can abort a compression run. None of these are retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open input file '{}': not found", path.display())]
    InputNotFound { path: PathBuf },

    #[error("cannot read input file '{}': {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("short read on '{}': expected {expected} bytes, got {read}", path.display())]
    ShortRead {
        path: PathBuf,
        expected: u64,
        read: u64,
    },

    #[error("cannot write output file '{}': {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),
}
