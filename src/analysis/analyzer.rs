use super::report::{AnalysisReport, IngestStats};
use crate::combiners::{CombineFn, CountByStatus, FailuresByIp, KeyCounts, TopN, TrendByBucket};
use crate::config::AnalysisConfig;
use crate::error::IngestError;
use crate::io::open_log;
use crate::record::Record;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

type KeyFn = fn(&Record) -> String;

fn url_key(r: &Record) -> String {
    r.url().to_owned()
}

fn user_agent_key(r: &Record) -> String {
    r.user_agent().to_owned()
}

/// All six analyses fused into one combiner, so a single traversal answers
/// every question.
///
/// - Accumulator: [`Accumulators`]
/// - Output: [`AnalysisReport`] (with empty [`IngestStats`]; the drivers below fill them)
#[derive(Clone, Debug)]
pub struct LogAnalyzer {
    urls: TopN<KeyFn>,
    agents: TopN<KeyFn>,
    failures: FailuresByIp,
    trend: TrendByBucket,
}

/// Partial state of a [`LogAnalyzer`] run.
#[derive(Clone, Debug, Default)]
pub struct Accumulators {
    total: u64,
    statuses: BTreeMap<u16, u64>,
    urls: KeyCounts<String>,
    agents: KeyCounts<String>,
    failures: KeyCounts<String>,
    trend: BTreeMap<String, u64>,
}

impl LogAnalyzer {
    #[must_use]
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            urls: TopN::new(url_key as KeyFn, config.top_n),
            agents: TopN::new(user_agent_key as KeyFn, config.top_n),
            failures: FailuresByIp::new(
                config.suspicious_statuses.iter().copied(),
                config.suspicious_threshold,
            ),
            trend: TrendByBucket::new(config.bucket_precision),
        }
    }
}

impl Default for LogAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl<'r> CombineFn<&'r Record, Accumulators, AnalysisReport> for LogAnalyzer {
    fn create(&self) -> Accumulators {
        Accumulators::default()
    }

    fn add_input(&self, acc: &mut Accumulators, r: &'r Record) {
        acc.total += 1;
        CountByStatus.add_input(&mut acc.statuses, r);
        self.urls.add_input(&mut acc.urls, r);
        self.agents.add_input(&mut acc.agents, r);
        self.failures.add_input(&mut acc.failures, r);
        self.trend.add_input(&mut acc.trend, r);
    }

    fn merge(&self, acc: &mut Accumulators, other: Accumulators) {
        acc.total += other.total;
        CountByStatus.merge(&mut acc.statuses, other.statuses);
        self.urls.merge(&mut acc.urls, other.urls);
        self.agents.merge(&mut acc.agents, other.agents);
        self.failures.merge(&mut acc.failures, other.failures);
        self.trend.merge(&mut acc.trend, other.trend);
    }

    fn finish(&self, acc: Accumulators) -> AnalysisReport {
        AnalysisReport {
            total_requests: acc.total,
            status_codes: CountByStatus.finish(acc.statuses),
            most_visited: self.urls.finish(acc.urls),
            user_agents: self.agents.finish(acc.agents),
            suspicious_ips: self.failures.finish(acc.failures),
            time_trend: self.trend.finish(acc.trend),
            stats: IngestStats::default(),
        }
    }
}

/// Feed reader items into `acc`, counting malformed lines and stopping at the
/// first fatal error.
fn ingest<I>(
    items: I,
    analyzer: &LogAnalyzer,
    acc: &mut Accumulators,
    stats: &mut IngestStats,
) -> Result<(), IngestError>
where
    I: IntoIterator<Item = Result<Record, IngestError>>,
{
    for item in items {
        match item {
            Ok(record) => {
                stats.lines += 1;
                stats.records += 1;
                analyzer.add_input(acc, &record);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                stats.lines += 1;
                stats.malformed += 1;
                warn!(line = e.line(), error = %e, "skipping malformed line");
            }
        }
    }
    Ok(())
}

/// Run every analysis over one record stream.
///
/// Malformed lines are counted in [`AnalysisReport::stats`] and logged; they never
/// stop the run.
///
/// # Errors
/// Returns the first fatal read error, with its line number.
pub fn analyze<I>(items: I, analyzer: &LogAnalyzer) -> Result<AnalysisReport>
where
    I: IntoIterator<Item = Result<Record, IngestError>>,
{
    let mut acc = analyzer.create();
    let mut stats = IngestStats::default();
    ingest(items, analyzer, &mut acc, &mut stats).context("ingest log records")?;
    let mut report = analyzer.finish(acc);
    report.stats = stats;
    info!(
        records = stats.records,
        malformed = stats.malformed,
        "analysis complete"
    );
    Ok(report)
}

/// Run every analysis over several log files as if they were one stream.
///
/// Files are read in the given order with the header and format settings of
/// `config`; compressed inputs are decoded transparently.
///
/// # Errors
/// Fails on an invalid `config`, or on the first file that cannot be opened or
/// read, naming it.
pub fn analyze_files<P: AsRef<Path>>(paths: &[P], config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;
    let analyzer = LogAnalyzer::new(config);
    let mut acc = analyzer.create();
    let mut stats = IngestStats::default();

    for path in paths {
        let path = path.as_ref();
        let mut file_stats = IngestStats::default();
        let reader = open_log(path, config.skip_header, config.format)?;
        ingest(reader, &analyzer, &mut acc, &mut file_stats)
            .with_context(|| format!("read {}", path.display()))?;
        debug!(
            path = %path.display(),
            records = file_stats.records,
            malformed = file_stats.malformed,
            "ingested file"
        );
        stats.merge(file_stats);
    }

    let mut report = analyzer.finish(acc);
    report.stats = stats;
    info!(
        files = paths.len(),
        records = stats.records,
        malformed = stats.malformed,
        "analysis complete"
    );
    Ok(report)
}

/// Run every analysis over in-memory records on the rayon pool.
///
/// The slice is cut into `chunks` contiguous pieces (default `2 * num_cpus`),
/// each folded into its own accumulator; partial results are merged in chunk
/// order, so the report is identical to a sequential run.
#[cfg(feature = "parallel")]
#[must_use]
pub fn analyze_par(records: &[Record], analyzer: &LogAnalyzer, chunks: Option<usize>) -> AnalysisReport {
    use rayon::prelude::*;

    let chunks = chunks.unwrap_or_else(|| 2 * num_cpus::get().max(2)).max(1);
    let chunk_len = records.len().div_ceil(chunks).max(1);

    let acc = records
        .par_chunks(chunk_len)
        .map(|chunk| {
            let mut acc = analyzer.create();
            for r in chunk {
                analyzer.add_input(&mut acc, r);
            }
            acc
        })
        .reduce(
            || analyzer.create(),
            |mut left, right| {
                analyzer.merge(&mut left, right);
                left
            },
        );

    let mut report = analyzer.finish(acc);
    let n = records.len() as u64;
    report.stats = IngestStats {
        lines: n,
        records: n,
        malformed: 0,
    };
    report
}
