//! The typed log record and its line parser.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};

/// Number of comma-separated fields in one log line.
pub const FIELD_COUNT: usize = 5;

const FIELD_NAMES: [&str; FIELD_COUNT] = ["ip", "timestamp", "url", "status", "user_agent"];

/// Header line written by producers that label their columns.
pub const HEADER: &str = "ip,timestamp,url,status,user_agent";

/// One parsed log line.
///
/// Fields are private so a record cannot change after construction; use the
/// accessors to read them. Field order mirrors the source text:
/// `ip, timestamp, url, status, user_agent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Record {
    ip: String,
    timestamp: String,
    url: String,
    status: u16,
    user_agent: String,
}

impl Record {
    pub fn new(
        ip: impl Into<String>,
        timestamp: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            ip: ip.into(),
            timestamp: timestamp.into(),
            url: url.into(),
            status,
            user_agent: user_agent.into(),
        }
    }

    /// Build a record from already-split fields.
    ///
    /// # Errors
    /// [`ParseError::FieldCount`] unless exactly five fields are given,
    /// [`ParseError::LineBreak`] if a quoted field spans lines,
    /// [`ParseError::BadStatus`] if the fourth field is not an integer.
    pub fn from_fields(fields: &[&str]) -> Result<Self, ParseError> {
        let [ip, timestamp, url, status, user_agent] = fields else {
            return Err(ParseError::FieldCount {
                found: fields.len(),
            });
        };
        for (&field, value) in FIELD_NAMES.iter().zip(fields) {
            if value.contains(['\n', '\r']) {
                return Err(ParseError::LineBreak { field });
            }
        }
        let status = status.parse::<u16>().map_err(|_| ParseError::BadStatus {
            value: (*status).to_string(),
        })?;
        Ok(Self::new(*ip, *timestamp, *url, status, *user_agent))
    }

    #[must_use]
    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// `YYYY-MM-DD HH:MM:SS`, compared textually.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// The row without its status column, as stored inside a status partition.
    #[must_use]
    pub fn without_status(&self) -> [&str; 4] {
        [&self.ip, &self.timestamp, &self.url, &self.user_agent]
    }
}

/// Parse one raw line by splitting on every comma.
///
/// A trailing `\n` or `\r\n` is ignored. Fields are not trimmed and commas cannot
/// be escaped, so a user agent containing a comma produces
/// [`ParseError::FieldCount`] instead of a silently shifted record.
///
/// # Errors
/// See [`Record::from_fields`].
pub fn parse_record(raw_line: &str) -> Result<Record, ParseError> {
    let line = raw_line
        .strip_suffix('\n')
        .map_or(raw_line, |l| l.strip_suffix('\r').unwrap_or(l));
    let fields: Vec<&str> = line.split(',').collect();
    Record::from_fields(&fields)
}

/// Anything the aggregation functions can draw a record from.
///
/// Implemented for records, references to records, and reader results, so the
/// output of [`read_records`](crate::io::reader::read_records) can be fed to the
/// engine directly. Items without a record (parse errors) are skipped.
pub trait MaybeRecord {
    fn record(&self) -> Option<&Record>;
}

impl MaybeRecord for Record {
    fn record(&self) -> Option<&Record> {
        Some(self)
    }
}

impl<T: MaybeRecord + ?Sized> MaybeRecord for &T {
    fn record(&self) -> Option<&Record> {
        (**self).record()
    }
}

impl<E> MaybeRecord for Result<Record, E> {
    fn record(&self) -> Option<&Record> {
        self.as_ref().ok()
    }
}
