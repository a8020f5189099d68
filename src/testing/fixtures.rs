//! Ready-made log data.

use crate::record::{HEADER, Record};
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// One client hitting four 404s within two minutes.
///
/// Expected: total 5, histogram `{200: 1, 404: 4}`, suspicious `[("1.1.1.1", 4)]`
/// at threshold 3, minute trend `[("2024-02-01 10:15", 2), ("2024-02-01 10:16", 3)]`.
#[must_use]
pub fn scenario_records() -> Vec<Record> {
    vec![
        Record::new("1.1.1.1", "2024-02-01 10:15:00", "/home", 200, "A"),
        Record::new("1.1.1.1", "2024-02-01 10:15:30", "/x", 404, "A"),
        Record::new("1.1.1.1", "2024-02-01 10:16:00", "/y", 404, "A"),
        Record::new("1.1.1.1", "2024-02-01 10:16:10", "/z", 404, "A"),
        Record::new("1.1.1.1", "2024-02-01 10:16:20", "/w", 404, "A"),
    ]
}

/// [`scenario_records`] as CSV text with a header line.
#[must_use]
pub fn scenario_csv() -> String {
    to_csv(&scenario_records())
}

/// A small mixed access log: several clients, URLs, agents and error codes.
///
/// Expected highlights (defaults: top 3, statuses {404, 500}, threshold 3):
/// - 14 records; statuses `{200: 7, 404: 5, 500: 2}`
/// - most visited: `/index.html: 5`, `/missing: 3`, `/api/login: 3` (tie kept in
///   order of first appearance)
/// - user agents: `Mozilla/5.0: 7`, `curl/8.4.0: 5`, `python-requests/2.31: 2`
/// - suspicious: `10.0.0.66: 6` (10.0.0.7 has a single failure and is excluded)
/// - minute trend: `09:00: 4`, `09:01: 5`, `09:02: 5`
#[must_use]
pub fn sample_records() -> Vec<Record> {
    const ROWS: &[(&str, &str, &str, u16, &str)] = &[
        ("10.0.0.1", "2024-02-01 09:00:01", "/index.html", 200, "Mozilla/5.0"),
        ("10.0.0.2", "2024-02-01 09:00:12", "/index.html", 200, "Mozilla/5.0"),
        ("10.0.0.66", "2024-02-01 09:00:15", "/missing", 404, "curl/8.4.0"),
        ("10.0.0.1", "2024-02-01 09:00:40", "/api/login", 200, "Mozilla/5.0"),
        ("10.0.0.66", "2024-02-01 09:01:02", "/missing", 404, "curl/8.4.0"),
        ("10.0.0.3", "2024-02-01 09:01:05", "/index.html", 200, "python-requests/2.31"),
        ("10.0.0.66", "2024-02-01 09:01:09", "/admin", 500, "curl/8.4.0"),
        ("10.0.0.7", "2024-02-01 09:01:30", "/api/login", 404, "Mozilla/5.0"),
        ("10.0.0.66", "2024-02-01 09:01:41", "/missing", 404, "curl/8.4.0"),
        ("10.0.0.2", "2024-02-01 09:02:00", "/api/login", 200, "Mozilla/5.0"),
        ("10.0.0.66", "2024-02-01 09:02:03", "/admin", 500, "curl/8.4.0"),
        ("10.0.0.4", "2024-02-01 09:02:10", "/index.html", 200, "Mozilla/5.0"),
        ("10.0.0.66", "2024-02-01 09:02:11", "/wp-login.php", 404, "python-requests/2.31"),
        ("10.0.0.5", "2024-02-01 09:02:30", "/index.html", 200, "Mozilla/5.0"),
    ];
    ROWS.iter()
        .map(|(ip, ts, url, status, ua)| Record::new(*ip, *ts, *url, *status, *ua))
        .collect()
}

/// [`sample_records`] as CSV text with a header line.
#[must_use]
pub fn sample_csv() -> String {
    to_csv(&sample_records())
}

fn to_csv(records: &[Record]) -> String {
    let mut w = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    w.write_record(HEADER.split(','))
        .expect("Failed to encode CSV row");
    for r in records {
        let status = r.status().to_string();
        w.write_record([r.ip(), r.timestamp(), r.url(), status.as_str(), r.user_agent()])
            .expect("Failed to encode CSV row");
    }
    let bytes = w
        .into_inner()
        .map_err(|e| e.into_error())
        .expect("Failed to flush CSV buffer");
    String::from_utf8(bytes).expect("Failed to decode CSV buffer as UTF-8")
}

/// Write `contents` to `dir/name` and return the path.
///
/// # Errors
/// Returns an error naming the file if it cannot be written.
pub fn write_log(dir: impl AsRef<Path>, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.as_ref().join(name);
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
