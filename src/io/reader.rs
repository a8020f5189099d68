//! Streaming ingestion of delimited log text into [`Record`]s.
//!
//! The reader yields one item per input line: `Ok(Record)` for a well-formed line
//! and `Err(IngestError::Parse { .. })` for a malformed one, after which it keeps
//! going. A failure of the underlying byte stream yields a single
//! `Err(IngestError::Io { .. })` and ends the sequence.
//!
//! # Example
//! ```
//! use logbeam::io::reader::read_records;
//!
//! let text = "ip,timestamp,url,status,user_agent\n\
//!             1.1.1.1,2024-02-01 10:15:00,/home,200,A\n\
//!             broken line\n\
//!             1.1.1.2,2024-02-01 10:15:01,/cart,404,B\n";
//!
//! let items: Vec<_> = read_records(text.as_bytes(), true).collect();
//! assert_eq!(items.len(), 3);
//! assert!(items[1].is_err());
//! ```
//!
//! # Notes
//! - Blank lines carry no record and are passed over without producing an item.
//! - Invalid UTF-8 is replaced lossily rather than rejected.
//! - Line numbers in errors are 1-based and count the header line.

use crate::error::{IngestError, ParseError};
use crate::record::Record;
use csv::{ByteRecord, ReaderBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Read;

/// How a line is split into fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// Every comma is a delimiter; quotes are literal characters.
    #[default]
    Strict,
    /// RFC 4180 quoting: `"Mozilla/5.0 (X11, Linux)"` is one field.
    Quoted,
}

/// Lazy, single-pass iterator over the records of a byte stream.
pub struct RecordReader<R> {
    inner: csv::Reader<R>,
    buf: ByteRecord,
    skip_header: bool,
    done: bool,
}

/// Read strict comma-delimited records from `source`.
///
/// When `skip_header` is `true` the first line is discarded without being parsed.
pub fn read_records<R: Read>(source: R, skip_header: bool) -> RecordReader<R> {
    RecordReader::new(source, skip_header, RecordFormat::Strict)
}

impl<R: Read> RecordReader<R> {
    pub fn new(source: R, skip_header: bool, format: RecordFormat) -> Self {
        let inner = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(format == RecordFormat::Quoted)
            .from_reader(source);
        Self {
            inner,
            buf: ByteRecord::new(),
            skip_header,
            done: false,
        }
    }

    fn parse_current(&self) -> Result<Record, ParseError> {
        let owned: Vec<Cow<'_, str>> = self.buf.iter().map(String::from_utf8_lossy).collect();
        let fields: Vec<&str> = owned.iter().map(AsRef::as_ref).collect();
        Record::from_fields(&fields)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.inner.read_byte_record(&mut self.buf) {
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Ok(true) => {
                    if self.skip_header {
                        self.skip_header = false;
                        continue;
                    }
                    let line = self.buf.position().map_or(0, csv::Position::line);
                    return Some(
                        self.parse_current()
                            .map_err(|source| IngestError::Parse { line, source }),
                    );
                }
                Err(e) => {
                    self.done = true;
                    let line = e.position().map_or(0, csv::Position::line);
                    let source = match e.into_kind() {
                        csv::ErrorKind::Io(io) => io,
                        other => std::io::Error::other(format!("{other:?}")),
                    };
                    return Some(Err(IngestError::Io { line, source }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct FailAfter<'a> {
        data: &'a [u8],
    }

    impl Read for FailAfter<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::other("disk gone"));
            }
            let n = buf.len().min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn header_is_skipped_unconditionally() {
        let items: Vec<_> = read_records("not,a,header\na,b,c,200,d\n".as_bytes(), true).collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_ok());
    }

    #[test]
    fn parse_error_carries_line_number() {
        let items: Vec<_> = read_records("a,b,c,200,d\na,b,c\n".as_bytes(), false).collect();
        match &items[1] {
            Err(IngestError::Parse { line, source }) => {
                assert_eq!(*line, 2);
                assert_eq!(*source, ParseError::FieldCount { found: 3 });
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[test]
    fn strict_mode_keeps_quotes_literal() {
        let line = "a,b,c,200,\"Mozilla/5.0 (X11, Linux)\"\n";
        let strict: Vec<_> = read_records(line.as_bytes(), false).collect();
        assert!(strict[0].is_err());

        let quoted: Vec<_> = RecordReader::new(line.as_bytes(), false, RecordFormat::Quoted).collect();
        let record = quoted[0].as_ref().unwrap();
        assert_eq!(record.user_agent(), "Mozilla/5.0 (X11, Linux)");
    }

    #[test]
    fn io_failure_ends_stream() {
        let src = FailAfter {
            data: b"a,b,c,200,d\n",
        };
        let items: Vec<_> = read_records(src, false).collect();
        assert!(items[0].is_ok());
        let last = items.last().unwrap();
        assert!(matches!(last, Err(e) if e.is_fatal()));
    }
}
