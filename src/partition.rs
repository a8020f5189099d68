//! Dynamic partitioning of records by a derived key.
//!
//! [`write_partitioned`] routes every record to the partition named by its key,
//! opening a partition the first time its key shows up, so the set of partitions
//! is discovered from the data rather than declared up front. Each row is stored
//! without its status column, which the partition name carries instead
//! (`status=404/part-00000.csv`).
//!
//! ```
//! use logbeam::partition::{MemorySink, by_status, write_partitioned};
//! use logbeam::Record;
//! # fn main() -> anyhow::Result<()> {
//!
//! let records = vec![
//!     Record::new("1.1.1.1", "2024-02-01 10:15:00", "/home", 200, "A"),
//!     Record::new("1.1.1.2", "2024-02-01 10:15:01", "/gone", 404, "B"),
//! ];
//!
//! let mut sink = MemorySink::default();
//! let report = write_partitioned(&records, by_status, &mut sink)?;
//!
//! assert_eq!(report.written, 2);
//! assert_eq!(sink.text("404"), Some("1.1.1.2,2024-02-01 10:15:01,/gone,B\n"));
//! # Ok(())
//! # }
//! ```

mod sink;

pub use sink::{DirectorySink, MemorySink, PartitionFile, PartitionSink};

use crate::record::{MaybeRecord, Record};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer, WriterBuilder};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::hash::Hash;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Partition key of the status-code table.
#[must_use]
pub fn by_status(record: &Record) -> Option<u16> {
    Some(record.status())
}

/// Outcome of one partitioned write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionReport {
    /// Rows written per partition name.
    pub partitions: BTreeMap<String, u64>,
    /// Total rows written across all partitions.
    pub written: u64,
    /// 0-based input positions of items whose key could not be derived.
    pub skipped: Vec<u64>,
}

struct OpenPartition<W: Write> {
    name: String,
    writer: Writer<W>,
    rows: u64,
}

/// Write each record to the partition named by `key_fn`.
///
/// Partitions are opened lazily, rows keep their input order inside a partition,
/// and every item is either written to exactly one partition or listed in
/// [`PartitionReport::skipped`]. An item is skipped when it carries no record
/// (a reader item whose line failed to parse) or when `key_fn` returns `None`.
/// Nothing is handed to [`PartitionSink::commit`] until every row has been
/// encoded and flushed.
///
/// # Errors
/// Stops at the first partition that cannot be opened, written or committed,
/// naming it.
pub fn write_partitioned<I, F, K, S>(
    records: I,
    mut key_fn: F,
    sink: &mut S,
) -> Result<PartitionReport>
where
    I: IntoIterator,
    I::Item: MaybeRecord,
    F: FnMut(&Record) -> Option<K>,
    K: Eq + Hash + Display,
    S: PartitionSink,
{
    let mut open: HashMap<K, usize> = HashMap::new();
    let mut partitions: Vec<OpenPartition<S::Writer>> = Vec::new();
    let mut skipped = Vec::new();

    for (position, item) in records.into_iter().enumerate() {
        let Some(record) = item.record() else {
            warn!(position, "unparseable line; no partition key");
            skipped.push(position as u64);
            continue;
        };
        let Some(key) = key_fn(record) else {
            warn!(position, "no partition key; record skipped");
            skipped.push(position as u64);
            continue;
        };

        let slot = match open.get(&key) {
            Some(slot) => *slot,
            None => {
                let name = key.to_string();
                let handle = sink
                    .open(&name)
                    .with_context(|| format!("open partition {name}"))?;
                debug!(partition = %name, "opened partition");
                partitions.push(OpenPartition {
                    writer: WriterBuilder::new().has_headers(false).from_writer(handle),
                    name,
                    rows: 0,
                });
                open.insert(key, partitions.len() - 1);
                partitions.len() - 1
            }
        };

        let part = &mut partitions[slot];
        part.writer
            .write_record(record.without_status())
            .with_context(|| format!("write row to partition {}", part.name))?;
        part.rows += 1;
    }

    let mut flushed = Vec::with_capacity(partitions.len());
    for part in partitions {
        let handle = part
            .writer
            .into_inner()
            .map_err(|e| e.into_error())
            .with_context(|| format!("flush partition {}", part.name))?;
        flushed.push((part.name, part.rows, handle));
    }

    let mut report = PartitionReport {
        skipped,
        ..PartitionReport::default()
    };
    for (name, rows, handle) in flushed {
        sink.commit(&name, handle)
            .with_context(|| format!("commit partition {name}"))?;
        report.written += rows;
        report.partitions.insert(name, rows);
    }

    info!(
        partitions = report.partitions.len(),
        written = report.written,
        skipped = report.skipped.len(),
        "partitioned write complete"
    );
    Ok(report)
}

/// Read a status-partitioned table written through a [`DirectorySink`] back into
/// records, re-inserting each partition's status.
///
/// Partitions are visited in directory-name order and rows keep their file order.
///
/// # Errors
/// Fails on unreadable files, partition names that are not `status=<code>`, or
/// rows that do not have four fields.
pub fn read_status_partitions(root: impl AsRef<Path>) -> Result<Vec<Record>> {
    let root = root.as_ref();
    let pattern = root.join("status=*").join("*.csv");
    let files = crate::io::glob::expand_pattern(&pattern.to_string_lossy())?;

    let mut out = Vec::new();
    for file in files {
        let dir_name = file
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let status: u16 = dir_name
            .strip_prefix("status=")
            .and_then(|s| s.parse().ok())
            .with_context(|| format!("bad partition directory {}", file.display()))?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .from_path(&file)
            .with_context(|| format!("open {}", file.display()))?;
        for (i, row) in rdr.records().enumerate() {
            let row = row.with_context(|| format!("read row #{} of {}", i + 1, file.display()))?;
            let [ip, timestamp, url, user_agent] = [0, 1, 2, 3].map(|j| row.get(j));
            match (ip, timestamp, url, user_agent, row.len()) {
                (Some(ip), Some(ts), Some(url), Some(ua), 4) => {
                    out.push(Record::new(ip, ts, url, status, ua));
                }
                _ => anyhow::bail!("row #{} of {} does not have 4 fields", i + 1, file.display()),
            }
        }
    }
    Ok(out)
}
