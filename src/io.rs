//! Input and output plumbing: record streams, compressed inputs, glob expansion
//! and atomic file publishing.

pub mod atomic;
pub mod compression;
pub mod glob;
pub mod reader;

use crate::io::reader::{RecordFormat, RecordReader};
use anyhow::Result;
use std::io::Read;
use std::path::Path;

/// Open a log file (optionally gzip/zstd compressed) as a record stream.
///
/// # Errors
/// Returns an error naming the file if it cannot be opened or decompressed.
pub fn open_log(
    path: impl AsRef<Path>,
    skip_header: bool,
    format: RecordFormat,
) -> Result<RecordReader<Box<dyn Read>>> {
    let source = compression::open_decompressed(path)?;
    Ok(RecordReader::new(source, skip_header, format))
}
