use super::{CombineFn, KeyCounts};
use crate::record::Record;
use std::hash::Hash;

/* ===================== TopN<F> ===================== */

/// The `n` most frequent keys produced by `key_fn`.
///
/// - Accumulator: [`KeyCounts<K>`] over every distinct key
/// - Output: `Vec<(K, u64)>`, count descending, at most `n` entries
///
/// Keys with equal counts keep the order in which they first appeared in the
/// input. `n == 0` always yields an empty vector.
#[derive(Clone, Debug)]
pub struct TopN<F> {
    key_fn: F,
    n: usize,
}

impl<F> TopN<F> {
    pub const fn new(key_fn: F, n: usize) -> Self {
        Self { key_fn, n }
    }

    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }
}

impl<'r, F, K> CombineFn<&'r Record, KeyCounts<K>, Vec<(K, u64)>> for TopN<F>
where
    F: Fn(&Record) -> K + Send + Sync + 'static,
    K: Eq + Hash,
{
    fn create(&self) -> KeyCounts<K> {
        KeyCounts::new()
    }

    fn add_input(&self, acc: &mut KeyCounts<K>, r: &'r Record) {
        acc.observe((self.key_fn)(r));
    }

    fn merge(&self, acc: &mut KeyCounts<K>, other: KeyCounts<K>) {
        acc.merge(other);
    }

    fn finish(&self, acc: KeyCounts<K>) -> Vec<(K, u64)> {
        if self.n == 0 {
            return Vec::new();
        }
        let mut ranked = acc.into_ranked();
        ranked.truncate(self.n);
        ranked
    }
}
