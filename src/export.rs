//! Rendering results to text artifacts.
//!
//! Every artifact is plain text with one `<label>: <count>` row per line, in the
//! order given by [`AggregationResult::rows`]. Rendering is a pure function of the
//! result, so identical inputs always produce byte-identical files. Labels may
//! themselves contain `": "` (user agents often do); the count is always the text
//! after the **last** separator, which is how [`parse_rendered`] reads rows back.
//! Labels never contain line breaks, since ingestion rejects such fields.
//!
//! Files are named after their [`ReportKind`] (`output_most_visited`, ...) and
//! are published atomically.

use crate::analysis::{AggregationResult, AnalysisReport, ReportKind};
use crate::io::atomic::write_atomic;
use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use tracing::info;

/// Render a result as `<label>: <count>` lines.
#[must_use]
pub fn render(result: &AggregationResult) -> String {
    result
        .rows()
        .iter()
        .map(|(label, count)| format!("{label}: {count}\n"))
        .collect()
}

/// Parse text produced by [`render`] back into rows.
///
/// # Errors
/// Names the first line that has no `": "` separator or a non-numeric count.
pub fn parse_rendered(text: &str) -> Result<Vec<(String, u64)>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            let (label, count) = line
                .rsplit_once(": ")
                .ok_or_else(|| anyhow!("line {}: missing ': ' separator", i + 1))?;
            let count = count
                .parse::<u64>()
                .with_context(|| format!("line {}: bad count '{count}'", i + 1))?;
            Ok((label.to_string(), count))
        })
        .collect()
}

/// Write one report into `dir` under its [`ReportKind::file_name`].
///
/// # Errors
/// Returns an error naming the file if it cannot be written; no partial file is
/// left behind.
pub fn export_report(
    dir: impl AsRef<Path>,
    kind: ReportKind,
    result: &AggregationResult,
) -> Result<PathBuf> {
    let path = dir.as_ref().join(kind.file_name());
    let text = render(result);
    write_atomic(&path, |w| Ok(w.write_all(text.as_bytes())?))
        .with_context(|| format!("export {kind} report"))?;
    info!(report = %kind, path = %path.display(), rows = text.lines().count(), "wrote report");
    Ok(path)
}

/// Write all six reports into `dir`, returning their paths in
/// [`ReportKind::ALL`] order.
///
/// # Errors
/// Stops at the first report that cannot be written.
pub fn export_all(dir: impl AsRef<Path>, report: &AnalysisReport) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    report
        .results()
        .iter()
        .map(|(kind, result)| export_report(dir, *kind, result))
        .collect()
}

/// The whole report as pretty-printed JSON.
///
/// # Errors
/// Fails only if serialization fails.
pub fn render_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("serialize report to JSON")
}

/// Write [`render_json`] output to `path` atomically.
///
/// # Errors
/// Returns an error naming the file if it cannot be written.
pub fn export_json(path: impl AsRef<Path>, report: &AnalysisReport) -> Result<()> {
    let path = path.as_ref();
    let json = render_json(report)?;
    write_atomic(path, |w| {
        w.write_all(json.as_bytes())?;
        Ok(w.write_all(b"\n")?)
    })?;
    info!(path = %path.display(), "wrote JSON report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn renders_histogram_by_count() {
        let r = AggregationResult::StatusHistogram(BTreeMap::from([(200, 1), (404, 4)]));
        assert_eq!(render(&r), "404: 4\n200: 1\n");
    }

    #[test]
    fn renders_total() {
        assert_eq!(render(&AggregationResult::TotalCount(5)), "total_requests: 5\n");
    }

    #[test]
    fn parse_uses_last_separator() {
        let r = AggregationResult::TopN(vec![("Agent: v1".into(), 2), ("curl".into(), 1)]);
        assert_eq!(
            parse_rendered(&render(&r)).unwrap(),
            vec![("Agent: v1".to_string(), 2), ("curl".to_string(), 1)]
        );
        assert!(parse_rendered("no separator").is_err());
        assert!(parse_rendered("x: y").is_err());
    }

    #[test]
    fn empty_results_render_empty() {
        assert_eq!(render(&AggregationResult::TimeTrend(vec![])), "");
    }
}
