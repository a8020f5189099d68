use super::CombineFn;
use crate::record::Record;
use std::collections::BTreeMap;

/// The first `precision` characters of `timestamp`, or all of it when shorter.
///
/// With `YYYY-MM-DD HH:MM:SS` timestamps, 10 buckets by day, 13 by hour and 16
/// by minute. Truncation respects character boundaries.
#[must_use]
pub fn bucket(timestamp: &str, precision: usize) -> &str {
    match timestamp.char_indices().nth(precision) {
        Some((end, _)) => &timestamp[..end],
        None => timestamp,
    }
}

/* ===================== TrendByBucket ===================== */

/// Request count per timestamp bucket.
///
/// - Accumulator: `BTreeMap<String, u64>`
/// - Output: `Vec<(String, u64)>`, bucket ascending
///
/// Lexical order of ISO-like buckets is chronological order.
#[derive(Clone, Copy, Debug)]
pub struct TrendByBucket {
    precision: usize,
}

impl TrendByBucket {
    pub const fn new(precision: usize) -> Self {
        Self { precision }
    }

    #[must_use]
    pub const fn precision(&self) -> usize {
        self.precision
    }
}

impl<'r> CombineFn<&'r Record, BTreeMap<String, u64>, Vec<(String, u64)>> for TrendByBucket {
    fn create(&self) -> BTreeMap<String, u64> {
        BTreeMap::new()
    }

    fn add_input(&self, acc: &mut BTreeMap<String, u64>, r: &'r Record) {
        let key = bucket(r.timestamp(), self.precision);
        match acc.get_mut(key) {
            Some(n) => *n += 1,
            None => {
                acc.insert(key.to_owned(), 1);
            }
        }
    }

    fn merge(&self, acc: &mut BTreeMap<String, u64>, other: BTreeMap<String, u64>) {
        for (key, n) in other {
            *acc.entry(key).or_insert(0) += n;
        }
    }

    fn finish(&self, acc: BTreeMap<String, u64>) -> Vec<(String, u64)> {
        acc.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_truncates_by_chars() {
        assert_eq!(bucket("2024-02-01 10:15:42", 16), "2024-02-01 10:15");
        assert_eq!(bucket("2024-02-01 10:15:42", 10), "2024-02-01");
        assert_eq!(bucket("2024-02-01", 16), "2024-02-01");
        assert_eq!(bucket("ééé", 2), "éé");
    }
}
