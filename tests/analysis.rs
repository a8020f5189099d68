use anyhow::Result;
use logbeam::analysis::{status_histogram, suspicious_ips, time_trend, top_n, total_count};
use logbeam::combiners::histogram_rows;
use logbeam::testing::{assert_ranked_desc, sample_records, scenario_records};
use logbeam::{AnalysisConfig, LogAnalyzer, Record, analyze, read_records};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn hit(ip: &str, status: u16) -> Record {
    Record::new(ip, "2024-02-01 10:00:00", "/", status, "A")
}

#[test]
fn scenario_answers_every_question() {
    let records = scenario_records();

    assert_eq!(total_count(&records), 5);
    assert_eq!(
        status_histogram(&records),
        BTreeMap::from([(200, 1), (404, 4)])
    );
    assert_eq!(
        suspicious_ips(&records, &[404, 500], 3),
        vec![("1.1.1.1".to_string(), 4)]
    );
    assert_eq!(
        time_trend(&records, 16),
        vec![
            ("2024-02-01 10:15".to_string(), 2),
            ("2024-02-01 10:16".to_string(), 3),
        ]
    );
}

#[test]
fn histogram_counts_sum_to_total() {
    let records = sample_records();
    let histogram = status_histogram(&records);
    assert_eq!(histogram.values().sum::<u64>(), total_count(&records));
    assert_eq!(histogram, BTreeMap::from([(200, 7), (404, 5), (500, 2)]));
}

#[test]
fn histogram_rows_rank_by_count_then_status() {
    let histogram = BTreeMap::from([(500, 2), (404, 2), (200, 9)]);
    assert_eq!(histogram_rows(&histogram), vec![(200, 9), (404, 2), (500, 2)]);
}

#[test]
fn most_visited_urls_keep_first_seen_order_on_ties() {
    let records = sample_records();
    let urls = top_n(&records, |r: &Record| r.url().to_owned(), 3);

    assert_eq!(
        urls,
        vec![
            ("/index.html".to_string(), 5),
            ("/missing".to_string(), 3),
            ("/api/login".to_string(), 3),
        ]
    );
    assert_ranked_desc(&urls);
}

#[test]
fn top_n_length_is_bounded_by_distinct_keys() {
    let records = sample_records();
    let key = |r: &Record| r.user_agent().to_owned();

    assert_eq!(top_n(&records, key, 10).len(), 3);
    assert_eq!(top_n(&records, key, 1), vec![("Mozilla/5.0".to_string(), 7)]);
    assert!(top_n(&records, key, 0).is_empty());
}

#[test]
fn top_n_accepts_any_key_type() {
    let records = sample_records();
    let statuses = top_n(&records, Record::status, 2);
    assert_eq!(statuses, vec![(200, 7), (404, 5)]);
}

#[test]
fn suspicious_threshold_is_strict() {
    let mut records: Vec<Record> = (0..3).map(|_| hit("10.1.1.1", 404)).collect();
    assert!(suspicious_ips(&records, &[404, 500], 3).is_empty());

    records.push(hit("10.1.1.1", 500));
    assert_eq!(
        suspicious_ips(&records, &[404, 500], 3),
        vec![("10.1.1.1".to_string(), 4)]
    );
}

#[test]
fn suspicious_ips_ignore_other_statuses() {
    let records: Vec<Record> = (0..10).map(|_| hit("10.1.1.1", 403)).collect();
    assert!(suspicious_ips(&records, &[404, 500], 3).is_empty());
    assert!(suspicious_ips(&records, &[], 0).is_empty());
}

#[test]
fn suspicious_ips_break_ties_by_address() {
    let mut records = Vec::new();
    for ip in ["10.0.0.9", "10.0.0.10", "10.0.0.2"] {
        records.extend((0..2).map(|_| hit(ip, 404)));
    }
    records.extend((0..3).map(|_| hit("10.0.0.5", 500)));

    assert_eq!(
        suspicious_ips(&records, &[404, 500], 1),
        vec![
            ("10.0.0.5".to_string(), 3),
            ("10.0.0.10".to_string(), 2),
            ("10.0.0.2".to_string(), 2),
            ("10.0.0.9".to_string(), 2),
        ]
    );
}

#[test]
fn trend_precision_selects_granularity() {
    let records = sample_records();

    let per_minute = time_trend(&records, 16);
    assert_eq!(
        per_minute,
        vec![
            ("2024-02-01 09:00".to_string(), 4),
            ("2024-02-01 09:01".to_string(), 5),
            ("2024-02-01 09:02".to_string(), 5),
        ]
    );
    assert_eq!(time_trend(&records, 13), vec![("2024-02-01 09".to_string(), 14)]);
    assert_eq!(time_trend(&records, 10), vec![("2024-02-01".to_string(), 14)]);
    assert_eq!(time_trend(&records, 19).len(), 14);
}

#[test]
fn short_timestamps_form_their_own_bucket() {
    let records = vec![
        Record::new("1.1.1.1", "2024-02-01", "/", 200, "A"),
        Record::new("1.1.1.1", "2024-02-01 10:15:00", "/", 200, "A"),
    ];
    assert_eq!(
        time_trend(&records, 16),
        vec![
            ("2024-02-01".to_string(), 1),
            ("2024-02-01 10:15".to_string(), 1),
        ]
    );
}

#[test]
fn empty_input_yields_empty_results() {
    let records: Vec<Record> = Vec::new();

    assert_eq!(total_count(&records), 0);
    assert!(status_histogram(&records).is_empty());
    assert!(top_n(&records, |r: &Record| r.url().to_owned(), 3).is_empty());
    assert!(suspicious_ips(&records, &[404, 500], 3).is_empty());
    assert!(time_trend(&records, 16).is_empty());
}

#[test]
fn free_functions_skip_malformed_items() {
    let text = "ip,timestamp,url,status,user_agent\n\
                1.1.1.1,2024-02-01 10:15:00,/home,200,A\n\
                1.1.1.1,2024-02-01 10:15:01,/home,200\n\
                1.1.1.2,2024-02-01 10:15:02,/home,oops,B\n\
                1.1.1.3,2024-02-01 10:15:03,/cart,404,C\n";

    assert_eq!(total_count(read_records(text.as_bytes(), true)), 2);
    assert_eq!(
        status_histogram(read_records(text.as_bytes(), true)),
        BTreeMap::from([(200, 1), (404, 1)])
    );
}

#[test]
fn single_pass_matches_free_functions() -> Result<()> {
    let records = sample_records();
    let config = AnalysisConfig::default();
    let analyzer = LogAnalyzer::new(&config);

    let report = analyze(records.iter().cloned().map(Ok), &analyzer)?;

    assert_eq!(report.total_requests, total_count(&records));
    assert_eq!(report.status_codes, status_histogram(&records));
    assert_eq!(
        report.most_visited,
        top_n(&records, |r: &Record| r.url().to_owned(), config.top_n)
    );
    assert_eq!(
        report.user_agents,
        top_n(&records, |r: &Record| r.user_agent().to_owned(), config.top_n)
    );
    assert_eq!(
        report.suspicious_ips,
        vec![("10.0.0.66".to_string(), 6)]
    );
    assert_eq!(report.time_trend, time_trend(&records, 16));
    assert_eq!(report.stats.records, 14);
    assert_eq!(report.stats.malformed, 0);
    Ok(())
}

#[test]
fn results_are_stable_across_runs() {
    let records = sample_records();
    let key = |r: &Record| r.url().to_owned();
    let first = top_n(&records, key, 5);
    for _ in 0..20 {
        assert_eq!(top_n(&records, key, 5), first);
    }
}
