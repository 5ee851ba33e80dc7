use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::deflate::{deflate, CompressOptions, DeflateStats};
use crate::error::{Error, Result};

/// Outcome of compressing one file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressStats {
    pub input_size: u64,
    pub output_size: u64,
    pub deflate: DeflateStats,
}

impl CompressStats {
    /// Output size as a percentage of the input size, `None` for empty input.
    pub fn ratio(&self) -> Option<f64> {
        if self.input_size == 0 {
            None
        } else {
            Some(self.output_size as f64 / self.input_size as f64 * 100.0)
        }
    }
}

/// Read the whole file, refusing to continue on a short read.
fn read_input(src_path: &Path) -> Result<Vec<u8>> {
    let src_file = File::open(src_path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => Error::InputNotFound { path: src_path.to_path_buf() },
        _ => Error::InputUnreadable { path: src_path.to_path_buf(), source },
    })?;
    let expected = src_file
        .metadata()
        .map_err(|source| Error::InputUnreadable { path: src_path.to_path_buf(), source })?
        .len();
    read_exact_len(src_file, expected, src_path)
}

/// Drain `reader`, which should hold `expected` bytes. Fewer bytes than
/// that is an error, more are kept.
fn read_exact_len(mut reader: impl Read, expected: u64, src_path: &Path) -> Result<Vec<u8>> {
    let mut raw_data = Vec::with_capacity(expected as usize);
    reader
        .read_to_end(&mut raw_data)
        .map_err(|source| Error::InputUnreadable { path: src_path.to_path_buf(), source })?;

    let read = raw_data.len() as u64;
    if read < expected {
        return Err(Error::ShortRead { path: src_path.to_path_buf(), expected, read });
    }
    Ok(raw_data)
}

fn write_output(dst_path: &Path, data: &[u8]) -> Result<()> {
    let unwritable = |source| Error::OutputUnwritable { path: dst_path.to_path_buf(), source };

    let dst_file = File::create(dst_path).map_err(unwritable)?;
    let mut writer = BufWriter::new(dst_file);
    writer.write_all(data).map_err(unwritable)?;
    writer.flush().map_err(unwritable)?;
    Ok(())
}

/// Compress `src_path` into a raw DEFLATE stream at `dst_path`.
///
/// The whole input is compressed in memory before the output file is created,
/// so a failing input never leaves an output file behind.
pub fn compress(src_path: impl AsRef<Path>, dst_path: impl AsRef<Path>, options: &CompressOptions) -> Result<CompressStats> {
    let (src_path, dst_path) = (src_path.as_ref(), dst_path.as_ref());

    let raw_data = read_input(src_path)?;
    debug!(path = %src_path.display(), bytes = raw_data.len(), "input loaded");

    let deflated = deflate(&raw_data, options)?;
    write_output(dst_path, &deflated.data)?;

    let stats = CompressStats {
        input_size: raw_data.len() as u64,
        output_size: deflated.data.len() as u64,
        deflate: deflated.stats,
    };
    info!(
        input = %src_path.display(),
        output = %dst_path.display(),
        input_size = stats.input_size,
        output_size = stats.output_size,
        "compressed"
    );
    Ok(stats)
}
