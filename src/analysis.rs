//! The aggregation engine.
//!
//! One function per question, each a single traversal of any record sequence:
//! plain records, references, or the `Result` items produced by
//! [`read_records`](crate::io::reader::read_records) (error items are skipped).
//!
//! | function              | combiner                 | output order                      |
//! |-----------------------|--------------------------|-----------------------------------|
//! | [`total_count`]       | [`Count`]                | -                                 |
//! | [`status_histogram`]  | [`CountByStatus`]        | map; see [`histogram_rows`]       |
//! | [`top_n`]             | [`TopN`]                 | count desc, first appearance      |
//! | [`suspicious_ips`]    | [`FailuresByIp`]         | count desc, IP asc                |
//! | [`time_trend`]        | [`TrendByBucket`]        | bucket asc                        |
//!
//! To answer every question in one pass, use [`LogAnalyzer`].
//!
//! # Example
//! ```
//! use logbeam::analysis::{suspicious_ips, time_trend, total_count};
//! use logbeam::Record;
//!
//! let records: Vec<Record> = (0..4)
//!     .map(|i| Record::new("9.9.9.9", format!("2024-02-01 10:1{i}:00"), "/x", 404, "bot"))
//!     .collect();
//!
//! assert_eq!(total_count(&records), 4);
//! assert_eq!(suspicious_ips(&records, &[404, 500], 3), vec![("9.9.9.9".to_string(), 4)]);
//! assert_eq!(time_trend(&records, 16).len(), 4);
//! assert_eq!(time_trend(&records, 13), vec![("2024-02-01 10".to_string(), 4)]);
//! ```
//!
//! [`histogram_rows`]: crate::combiners::histogram_rows

mod analyzer;
mod report;

pub use analyzer::{Accumulators, LogAnalyzer, analyze, analyze_files};
#[cfg(feature = "parallel")]
pub use analyzer::analyze_par;
pub use report::{AggregationResult, AnalysisReport, IngestStats, ReportKind};

use crate::combiners::{CombineFn, Count, CountByStatus, FailuresByIp, TopN, TrendByBucket};
use crate::record::{MaybeRecord, Record};
use std::collections::BTreeMap;
use std::hash::Hash;

/// Fold every record of `records` through `comb`.
pub fn combine<I, C, A, O>(records: I, comb: &C) -> O
where
    I: IntoIterator,
    I::Item: MaybeRecord,
    C: for<'r> CombineFn<&'r Record, A, O>,
{
    let mut acc = comb.create();
    for item in records {
        if let Some(r) = item.record() {
            comb.add_input(&mut acc, r);
        }
    }
    comb.finish(acc)
}

/// Number of well-formed records.
pub fn total_count<I>(records: I) -> u64
where
    I: IntoIterator,
    I::Item: MaybeRecord,
{
    combine(records, &Count)
}

/// Record count per status code.
pub fn status_histogram<I>(records: I) -> BTreeMap<u16, u64>
where
    I: IntoIterator,
    I::Item: MaybeRecord,
{
    combine(records, &CountByStatus)
}

/// The `n` most frequent values of `key_fn`, count descending, ties in order of
/// first appearance.
pub fn top_n<I, F, K>(records: I, key_fn: F, n: usize) -> Vec<(K, u64)>
where
    I: IntoIterator,
    I::Item: MaybeRecord,
    F: Fn(&Record) -> K + Send + Sync + 'static,
    K: Eq + Hash,
{
    combine(records, &TopN::new(key_fn, n))
}

/// IPs with more than `threshold` requests whose status is in `statuses`.
pub fn suspicious_ips<I>(records: I, statuses: &[u16], threshold: u64) -> Vec<(String, u64)>
where
    I: IntoIterator,
    I::Item: MaybeRecord,
{
    combine(records, &FailuresByIp::new(statuses.iter().copied(), threshold))
}

/// Request counts per timestamp prefix of `precision` characters, ascending.
pub fn time_trend<I>(records: I, precision: usize) -> Vec<(String, u64)>
where
    I: IntoIterator,
    I::Item: MaybeRecord,
{
    combine(records, &TrendByBucket::new(precision))
}
