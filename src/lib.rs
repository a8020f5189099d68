//! # logbeam
//!
//! An **embedded batch log-analytics engine** for comma-delimited web access
//! logs. logbeam ingests records of the form
//!
//! ```text
//! ip,timestamp,url,status,user_agent
//! 10.0.0.1,2024-02-01 09:00:01,/index.html,200,Mozilla/5.0
//! ```
//!
//! and answers the usual first questions about them directly, without a query
//! cluster:
//!
//! - **Total requests** - [`analysis::total_count`]
//! - **Status code histogram** - [`analysis::status_histogram`]
//! - **Most visited URLs / busiest user agents** - [`analysis::top_n`]
//! - **Suspicious IPs** (too many 404/500 answers) - [`analysis::suspicious_ips`]
//! - **Request trend** per minute, hour or day - [`analysis::time_trend`]
//! - **Status-partitioned export** - [`partition::write_partitioned`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use logbeam::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let config = AnalysisConfig::default();
//! let report = analyze_files(&["logs/access.csv.gz"], &config)?;
//!
//! // Writes output_total_requests, output_status_codes, output_most_visited, ...
//! export::export_all("results", &report)?;
//!
//! // Hive-style table: results/by_status/status=404/part-00000.csv, ...
//! let records: Vec<Record> = io::open_log("logs/access.csv.gz", true, RecordFormat::Strict)?
//!     .filter_map(|item| item.ok())
//!     .collect();
//! let mut sink = DirectorySink::new("results/by_status");
//! write_partitioned(&records, by_status, &mut sink)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Records and ingestion
//!
//! A [`Record`] is one immutable, parsed log line. [`read_records`] turns any byte
//! stream into a lazy sequence of `Result<Record, IngestError>`: malformed lines
//! are items of the sequence, not the end of it, so a run always covers every
//! good line. Only a failing byte stream stops ingestion.
//!
//! ### Combiners
//!
//! Every analysis is a [`CombineFn`] over `&Record` with a mergeable accumulator
//! (see [`combiners`]). The free functions in [`analysis`] run one combiner over
//! one traversal; [`LogAnalyzer`] fuses all six into a single pass, and
//! [`analysis::analyze_par`] splits in-memory input across the rayon pool and
//! merges the partial results in order.
//!
//! ### Determinism
//!
//! Results never depend on hash order: histograms render count-descending then
//! status-ascending, top-N ties keep first-appearance order, suspicious IPs sort
//! by count then address, and trends sort by bucket. Rendering the same report
//! twice produces byte-identical files.
//!
//! ### Output
//!
//! [`export`] renders `label: count` text artifacts and publishes each file
//! atomically (temporary file + rename), so a failed run never leaves a
//! truncated report behind.
//!
//! ## Known input limitation
//!
//! The default [`RecordFormat::Strict`] splits on every comma. A user agent that
//! contains a comma makes its line fail with [`ParseError::FieldCount`] rather
//! than being mis-assigned. Producers that quote such fields can be read with
//! [`RecordFormat::Quoted`].
//!
//! ## Feature Flags
//!
//! - `compression-gzip` - read `.gz` inputs
//! - `compression-zstd` - read `.zst` inputs
//! - `parallel` - [`analysis::analyze_par`]
//!
//! ## Module Overview
//!
//! - [`record`] - the [`Record`] type and line parser
//! - [`io`] - record streams, decompression, glob expansion, atomic writes
//! - [`combiners`] - mergeable aggregations
//! - [`analysis`] - the aggregation engine and report types
//! - [`partition`] - dynamic partitioning and partition sinks
//! - [`export`] - text and JSON rendering
//! - [`config`] - validated analysis settings
//! - [`error`] - parse, ingest and configuration errors
//! - [`logging`] - subscriber setup for binaries
//! - [`testing`] - fixtures and assertions for tests

pub mod analysis;
pub mod combiners;
pub mod config;
pub mod error;
pub mod export;
pub mod io;
pub mod logging;
pub mod partition;
pub mod record;
pub mod testing;

// General re-exports
pub use analysis::{
    AggregationResult, AnalysisReport, IngestStats, LogAnalyzer, ReportKind, analyze, analyze_files,
};
pub use combiners::CombineFn;
pub use config::AnalysisConfig;
pub use error::{ConfigError, IngestError, ParseError};
pub use io::reader::{RecordFormat, RecordReader, read_records};
pub use partition::{
    DirectorySink, MemorySink, PartitionReport, PartitionSink, by_status, write_partitioned,
};
pub use record::{MaybeRecord, Record, parse_record};
