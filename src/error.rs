//! Error types for ingestion and configuration.
//!
//! Per-line problems ([`ParseError`]) are never fatal: they travel through the
//! record stream as [`IngestError::Parse`] and the consumer decides what to do.
//! Configuration problems ([`ConfigError`]) and I/O failures abort the run before
//! any output is published. Filesystem-facing APIs return [`anyhow::Result`] with
//! context naming the file involved.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single log line could not become a [`Record`](crate::Record).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected 5 fields, found {found}")]
    FieldCount { found: usize },

    #[error("status '{value}' is not an integer")]
    BadStatus { value: String },

    #[error("{field} contains a line break")]
    LineBreak { field: &'static str },
}

/// A fatal misconfiguration, raised before any analysis output is produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("top-n must be at least 1, got {0}")]
    TopN(i64),

    #[error("bucket precision must be between 1 and {max}, got {precision}")]
    BucketPrecision { precision: i64, max: usize },

    #[error("suspicious threshold must not be negative, got {0}")]
    Threshold(i64),

    #[error("status code {0} is outside 100..=599")]
    StatusCode(i64),

    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// An item-level failure surfaced by the [`RecordReader`](crate::io::reader::RecordReader).
///
/// `line` is 1-based and counts the header line when one is present.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("line {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: ParseError,
    },

    #[error("read failed at line {line}: {source}")]
    Io {
        line: u64,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// `true` when the stream cannot continue past this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    #[must_use]
    pub fn line(&self) -> u64 {
        match self {
            Self::Parse { line, .. } | Self::Io { line, .. } => *line,
        }
    }
}
