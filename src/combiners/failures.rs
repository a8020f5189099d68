use super::{CombineFn, KeyCounts};
use crate::record::Record;
use std::collections::BTreeSet;

/* ===================== FailuresByIp ===================== */

/// Client IPs with more than `threshold` requests answered with one of `statuses`.
///
/// - Accumulator: [`KeyCounts<String>`] of matching requests per IP
/// - Output: `Vec<(String, u64)>`, count descending, then IP ascending
///
/// The comparison is strict: an IP with exactly `threshold` failures is left out.
/// An empty status set matches nothing.
#[derive(Clone, Debug)]
pub struct FailuresByIp {
    statuses: BTreeSet<u16>,
    threshold: u64,
}

impl FailuresByIp {
    pub fn new(statuses: impl IntoIterator<Item = u16>, threshold: u64) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
            threshold,
        }
    }

    #[must_use]
    pub fn statuses(&self) -> &BTreeSet<u16> {
        &self.statuses
    }

    #[must_use]
    pub const fn threshold(&self) -> u64 {
        self.threshold
    }
}

impl<'r> CombineFn<&'r Record, KeyCounts<String>, Vec<(String, u64)>> for FailuresByIp {
    fn create(&self) -> KeyCounts<String> {
        KeyCounts::new()
    }

    fn add_input(&self, acc: &mut KeyCounts<String>, r: &'r Record) {
        if self.statuses.contains(&r.status()) {
            acc.observe(r.ip().to_owned());
        }
    }

    fn merge(&self, acc: &mut KeyCounts<String>, other: KeyCounts<String>) {
        acc.merge(other);
    }

    fn finish(&self, acc: KeyCounts<String>) -> Vec<(String, u64)> {
        let mut rows: Vec<(String, u64)> = acc
            .into_counts()
            .filter(|(_, n)| *n > self.threshold)
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows
    }
}
