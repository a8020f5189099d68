use super::CombineFn;
use crate::record::Record;
use std::collections::BTreeMap;

/* ===================== CountByStatus ===================== */

/// Request count per HTTP status code.
///
/// - Accumulator: `BTreeMap<u16, u64>`
/// - Output: `BTreeMap<u16, u64>` (use [`histogram_rows`] for display order)
#[derive(Clone, Copy, Debug, Default)]
pub struct CountByStatus;

impl<'r> CombineFn<&'r Record, BTreeMap<u16, u64>, BTreeMap<u16, u64>> for CountByStatus {
    fn create(&self) -> BTreeMap<u16, u64> {
        BTreeMap::new()
    }

    fn add_input(&self, acc: &mut BTreeMap<u16, u64>, r: &'r Record) {
        *acc.entry(r.status()).or_insert(0) += 1;
    }

    fn merge(&self, acc: &mut BTreeMap<u16, u64>, other: BTreeMap<u16, u64>) {
        for (status, n) in other {
            *acc.entry(status).or_insert(0) += n;
        }
    }

    fn finish(&self, acc: BTreeMap<u16, u64>) -> BTreeMap<u16, u64> {
        acc
    }
}

/// Histogram rows in display order: count descending, then status ascending.
#[must_use]
pub fn histogram_rows(histogram: &BTreeMap<u16, u64>) -> Vec<(u16, u64)> {
    let mut rows: Vec<(u16, u64)> = histogram.iter().map(|(s, n)| (*s, *n)).collect();
    // BTreeMap iteration is already status-ascending; a stable sort keeps it for ties
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}
