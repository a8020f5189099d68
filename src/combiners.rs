//! Record combiners: the building blocks of every analysis.
//!
//! Each analysis is a [`CombineFn`] over `&Record` with its own accumulator (`A`)
//! and output (`O`). Accumulators are mergeable, so the same combiner can run
//! over one sequential pass or over independent chunks whose partial results are
//! merged afterwards:
//!
//! - [`Count`] -- total number of records.
//! - [`CountByStatus`] -- histogram of status codes.
//! - [`TopN<F>`] -- the `n` most frequent keys, ties broken by first appearance.
//! - [`FailuresByIp`] -- IPs whose error-status count exceeds a threshold.
//! - [`TrendByBucket`] -- counts per truncated-timestamp bucket.
//!
//! # Example
//! ```
//! use logbeam::Record;
//! use logbeam::combiners::{CombineFn, TopN};
//!
//! let records = vec![
//!     Record::new("1.1.1.1", "2024-02-01 10:15:00", "/a", 200, "curl"),
//!     Record::new("1.1.1.2", "2024-02-01 10:15:01", "/b", 200, "curl"),
//!     Record::new("1.1.1.3", "2024-02-01 10:15:02", "/b", 200, "curl"),
//! ];
//!
//! let top = TopN::new(|r: &Record| r.url().to_string(), 1);
//! let mut acc = top.create();
//! for r in &records {
//!     top.add_input(&mut acc, r);
//! }
//! assert_eq!(top.finish(acc), vec![("/b".to_string(), 2)]);
//! ```

mod counts;
mod failures;
mod status;
mod top_n;
mod trend;

pub use counts::KeyCounts;
pub use failures::FailuresByIp;
pub use status::{CountByStatus, histogram_rows};
pub use top_n::TopN;
pub use trend::{TrendByBucket, bucket};

/// An associative aggregation: build an accumulator, feed it inputs, merge
/// partial accumulators, then produce the output.
///
/// `merge(acc, other)` must treat `other` as covering inputs that came after
/// everything already in `acc`.
pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    fn create(&self) -> A;
    fn add_input(&self, acc: &mut A, v: V);
    fn merge(&self, acc: &mut A, other: A);
    fn finish(&self, acc: A) -> O;
}

/* ===================== Count ===================== */

/// Number of inputs.
///
/// - Accumulator: `u64`
/// - Output: `u64`
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl<V> CombineFn<V, u64, u64> for Count {
    fn create(&self) -> u64 {
        0
    }

    fn add_input(&self, acc: &mut u64, _v: V) {
        *acc += 1;
    }

    fn merge(&self, acc: &mut u64, other: u64) {
        *acc += other;
    }

    fn finish(&self, acc: u64) -> u64 {
        acc
    }
}
