#![cfg(feature = "parallel")]

use anyhow::Result;
use logbeam::analysis::analyze_par;
use logbeam::testing::{sample_records, scenario_records};
use logbeam::{AnalysisConfig, LogAnalyzer, Record, analyze};
use pretty_assertions::assert_eq;

fn many_records() -> Vec<Record> {
    let mut records = Vec::new();
    for _ in 0..50 {
        records.extend(sample_records());
        records.extend(scenario_records());
    }
    records
}

#[test]
fn parallel_report_equals_sequential() -> Result<()> {
    let records = many_records();
    let analyzer = LogAnalyzer::default();

    let sequential = analyze(records.iter().cloned().map(Ok), &analyzer)?;
    for chunks in [None, Some(1), Some(3), Some(7), Some(records.len()), Some(records.len() * 2)] {
        assert_eq!(analyze_par(&records, &analyzer, chunks), sequential, "chunks = {chunks:?}");
    }
    Ok(())
}

#[test]
fn ties_resolve_by_global_first_appearance() -> Result<()> {
    let records: Vec<Record> = ["/b", "/a", "/c", "/a", "/b", "/c"]
        .iter()
        .map(|url| Record::new("1.1.1.1", "2024-02-01 10:15:00", *url, 200, "A"))
        .collect();
    let config = AnalysisConfig {
        top_n: 3,
        ..AnalysisConfig::default()
    };
    let analyzer = LogAnalyzer::new(&config);

    let sequential = analyze(records.iter().cloned().map(Ok), &analyzer)?;
    assert_eq!(
        sequential.most_visited,
        vec![("/b".to_string(), 2), ("/a".to_string(), 2), ("/c".to_string(), 2)]
    );
    for chunks in 1..=records.len() {
        let par = analyze_par(&records, &analyzer, Some(chunks));
        assert_eq!(par.most_visited, sequential.most_visited, "chunks = {chunks}");
    }
    Ok(())
}

#[test]
fn empty_input_in_parallel() {
    let report = analyze_par(&[], &LogAnalyzer::default(), None);
    assert_eq!(report.total_requests, 0);
    assert!(report.status_codes.is_empty());
    assert!(report.most_visited.is_empty());
}
