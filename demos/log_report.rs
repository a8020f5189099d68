//! End-to-end walk through the log analytics workflow:
//! 1. **Load**: write a sample access log and stream it back as records
//! 2. **Analyze**: run the six reports in one pass
//! 3. **Export**: publish the report files and a status-partitioned table
//!
//! Run with: cargo run --example log_report

use anyhow::Result;
use logbeam::analysis::{analyze, top_n};
use logbeam::export::{export_all, render};
use logbeam::testing::{sample_csv, write_log};
use logbeam::*;

fn main() -> Result<()> {
    let work = tempfile::tempdir()?;
    let log_path = write_log(work.path(), "access.csv", &sample_csv())?;

    // =============================================================================
    // LOAD
    // =============================================================================
    println!("Loading {}", log_path.display());
    let config = AnalysisConfig::default();
    let records: Vec<Record> = io::open_log(&log_path, config.skip_header, config.format)?
        .filter_map(|item| item.ok())
        .collect();
    println!("  {} records\n", records.len());

    // =============================================================================
    // ANALYZE
    // =============================================================================
    let analyzer = LogAnalyzer::new(&config);
    let report = analyze(records.iter().cloned().map(Ok), &analyzer)?;

    for (kind, result) in report.results() {
        println!("[{kind}]");
        print!("{}", render(&result));
        println!();
    }

    // Ad-hoc question: which client IPs are busiest?
    let busiest = top_n(&records, |r: &Record| r.ip().to_string(), 2);
    println!("busiest clients: {busiest:?}\n");

    // =============================================================================
    // EXPORT
    // =============================================================================
    let out = work.path().join("results");
    for path in export_all(&out, &report)? {
        println!("wrote {}", path.display());
    }

    let mut sink = DirectorySink::new(out.join("by_status"));
    let partitions = write_partitioned(&records, by_status, &mut sink)?;
    for (status, rows) in &partitions.partitions {
        println!(
            "wrote {} ({rows} rows)",
            sink.partition_path(status).display()
        );
    }

    Ok(())
}
