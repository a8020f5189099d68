//! Transparent decompression of log inputs.
//!
//! Rotated web-server logs usually arrive as `access.csv.gz` or `access.csv.zst`.
//! [`open_decompressed`] detects the codec from the file extension first and falls
//! back to the stream's magic bytes, so a renamed archive is still read correctly.
//!
//! | codec | extensions       | magic         | feature            |
//! |-------|------------------|---------------|--------------------|
//! | gzip  | `.gz`, `.gzip`   | `1f 8b`       | `compression-gzip` |
//! | zstd  | `.zst`, `.zstd`  | `28 b5 2f fd` | `compression-zstd` |

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Compression detected on an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

impl Compression {
    /// Detect from the path's extension (case-insensitive).
    #[must_use]
    pub fn from_extension(path: impl AsRef<Path>) -> Self {
        let name = path.as_ref().to_string_lossy().to_lowercase();
        if name.ends_with(".gz") || name.ends_with(".gzip") {
            Self::Gzip
        } else if name.ends_with(".zst") || name.ends_with(".zstd") {
            Self::Zstd
        } else {
            Self::None
        }
    }

    /// Detect from the first bytes of a stream.
    #[must_use]
    pub fn from_magic(head: &[u8]) -> Self {
        if head.starts_with(GZIP_MAGIC) {
            Self::Gzip
        } else if head.starts_with(ZSTD_MAGIC) {
            Self::Zstd
        } else {
            Self::None
        }
    }

    /// Wrap `reader` with the matching decoder.
    ///
    /// # Errors
    /// Fails when the codec's feature is disabled or the decoder cannot start.
    pub fn wrap_reader<R: Read + 'static>(self, reader: R) -> Result<Box<dyn Read>> {
        match self {
            Self::None => Ok(Box::new(reader)),
            #[cfg(feature = "compression-gzip")]
            Self::Gzip => Ok(Box::new(flate2::read::MultiGzDecoder::new(reader))),
            #[cfg(feature = "compression-zstd")]
            Self::Zstd => Ok(Box::new(
                zstd::stream::read::Decoder::new(reader).context("start zstd decoder")?,
            )),
            #[allow(unreachable_patterns)]
            other => anyhow::bail!("{other:?} input detected but support is not compiled in"),
        }
    }
}

/// Open `path` for reading, decompressing if needed.
///
/// # Errors
/// Returns an error naming the file if it cannot be opened or its decoder fails.
pub fn open_decompressed(path: impl AsRef<Path>) -> Result<Box<dyn Read>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;

    let by_ext = Compression::from_extension(path);
    if by_ext != Compression::None {
        return by_ext
            .wrap_reader(file)
            .with_context(|| format!("setup decompression for {}", path.display()));
    }

    let mut buffered = BufReader::new(file);
    let head = buffered
        .fill_buf()
        .with_context(|| format!("read {}", path.display()))?;
    Compression::from_magic(head)
        .wrap_reader(buffered)
        .with_context(|| format!("setup decompression for {}", path.display()))
}
