//! Assertions for ranked results and record collections.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that `(key, count)` rows are sorted by count, descending.
///
/// # Panics
/// Panics at the first pair of adjacent rows that is out of order.
pub fn assert_ranked_desc<K: Debug>(rows: &[(K, u64)]) {
    for (i, pair) in rows.windows(2).enumerate() {
        assert!(
            pair[0].1 >= pair[1].1,
            "Rows out of order at index {}:\n  {:?} before {:?}\n  Full rows: {rows:?}",
            i + 1,
            pair[0],
            pair[1]
        );
    }
}

/// Assert that two collections hold the same elements with the same
/// multiplicities, ignoring order.
///
/// # Panics
/// Panics listing every element whose count differs.
pub fn assert_multiset_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    let mut counts: HashMap<&T, i64> = HashMap::new();
    for e in expected {
        *counts.entry(e).or_insert(0) += 1;
    }
    for a in actual {
        *counts.entry(a).or_insert(0) -= 1;
    }
    let diff: Vec<(&T, i64)> = counts.into_iter().filter(|(_, n)| *n != 0).collect();
    assert!(
        diff.is_empty(),
        "Multiset mismatch (positive = missing, negative = extra): {diff:?}\n  Expected length: {}\n  Actual length: {}",
        expected.len(),
        actual.len()
    );
}
