use crate::combiners::histogram_rows;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The output of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AggregationResult {
    TotalCount(u64),
    StatusHistogram(BTreeMap<u16, u64>),
    TopN(Vec<(String, u64)>),
    SuspiciousIps(Vec<(String, u64)>),
    TimeTrend(Vec<(String, u64)>),
}

impl AggregationResult {
    /// `(label, count)` rows in the order they are presented.
    #[must_use]
    pub fn rows(&self) -> Vec<(String, u64)> {
        match self {
            Self::TotalCount(n) => vec![("total_requests".to_string(), *n)],
            Self::StatusHistogram(h) => histogram_rows(h)
                .into_iter()
                .map(|(status, n)| (status.to_string(), n))
                .collect(),
            Self::TopN(rows) | Self::SuspiciousIps(rows) | Self::TimeTrend(rows) => rows.clone(),
        }
    }
}

/// The six reports a full analysis produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    TotalRequests,
    StatusCodes,
    MostVisited,
    UserAgents,
    SuspiciousIps,
    TimeTrend,
}

impl ReportKind {
    pub const ALL: [Self; 6] = [
        Self::TotalRequests,
        Self::StatusCodes,
        Self::MostVisited,
        Self::UserAgents,
        Self::SuspiciousIps,
        Self::TimeTrend,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TotalRequests => "total_requests",
            Self::StatusCodes => "status_codes",
            Self::MostVisited => "most_visited",
            Self::UserAgents => "user_agents",
            Self::SuspiciousIps => "suspicious_ips",
            Self::TimeTrend => "time_trend",
        }
    }

    /// Artifact name, e.g. `output_most_visited`.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("output_{}", self.as_str())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line accounting for one ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Items seen: records plus malformed lines (headers and blank lines excluded).
    pub lines: u64,
    pub records: u64,
    pub malformed: u64,
}

impl IngestStats {
    pub fn merge(&mut self, other: Self) {
        self.lines += other.lines;
        self.records += other.records;
        self.malformed += other.malformed;
    }
}

/// Every result of a full analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_requests: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub most_visited: Vec<(String, u64)>,
    pub user_agents: Vec<(String, u64)>,
    pub suspicious_ips: Vec<(String, u64)>,
    pub time_trend: Vec<(String, u64)>,
    pub stats: IngestStats,
}

impl AnalysisReport {
    /// One report as an [`AggregationResult`].
    #[must_use]
    pub fn result(&self, kind: ReportKind) -> AggregationResult {
        match kind {
            ReportKind::TotalRequests => AggregationResult::TotalCount(self.total_requests),
            ReportKind::StatusCodes => AggregationResult::StatusHistogram(self.status_codes.clone()),
            ReportKind::MostVisited => AggregationResult::TopN(self.most_visited.clone()),
            ReportKind::UserAgents => AggregationResult::TopN(self.user_agents.clone()),
            ReportKind::SuspiciousIps => AggregationResult::SuspiciousIps(self.suspicious_ips.clone()),
            ReportKind::TimeTrend => AggregationResult::TimeTrend(self.time_trend.clone()),
        }
    }

    /// All six reports in [`ReportKind::ALL`] order.
    #[must_use]
    pub fn results(&self) -> Vec<(ReportKind, AggregationResult)> {
        ReportKind::ALL.iter().map(|k| (*k, self.result(*k))).collect()
    }
}
