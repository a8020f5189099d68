//! Test fixtures and assertions for code built on logbeam.
//!
//! ```
//! use logbeam::analysis::total_count;
//! use logbeam::testing::*;
//!
//! let records = scenario_records();
//! assert_eq!(total_count(&records), 5);
//! assert_ranked_desc(&[("a".to_string(), 3), ("b".to_string(), 1)]);
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::{assert_multiset_equal, assert_ranked_desc};
pub use fixtures::{sample_csv, sample_records, scenario_csv, scenario_records, write_log};
