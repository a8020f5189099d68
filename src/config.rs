//! Analysis configuration.
//!
//! Settings come from an optional TOML file and are validated into an
//! [`AnalysisConfig`] before anything is read or written:
//!
//! ```toml
//! top_n = 3
//! suspicious_statuses = [404, 500]
//! suspicious_threshold = 3
//! bucket_precision = 16
//! skip_header = true
//! format = "strict"
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use crate::error::ConfigError;
use crate::io::reader::RecordFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Length of a full `YYYY-MM-DD HH:MM:SS` timestamp.
pub const MAX_BUCKET_PRECISION: usize = 19;

/// Validated settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisConfig {
    /// Rows kept by the most-visited URL and user-agent reports.
    pub top_n: usize,
    /// Status codes that count as failures for the suspicious-IP report.
    pub suspicious_statuses: BTreeSet<u16>,
    /// An IP is reported when its failure count is strictly greater than this.
    pub suspicious_threshold: u64,
    /// Characters of the timestamp kept per trend bucket (16 = per minute).
    pub bucket_precision: usize,
    /// Discard the first line of every input.
    pub skip_header: bool,
    pub format: RecordFormat,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            suspicious_statuses: BTreeSet::from([404, 500]),
            suspicious_threshold: 3,
            bucket_precision: 16,
            skip_header: true,
            format: RecordFormat::Strict,
        }
    }
}

/// The file form of [`AnalysisConfig`], before validation.
///
/// Integers are signed here so out-of-range values reach validation with a
/// useful message instead of failing inside the TOML decoder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub top_n: Option<i64>,
    pub suspicious_statuses: Option<Vec<i64>>,
    pub suspicious_threshold: Option<i64>,
    pub bucket_precision: Option<i64>,
    pub skip_header: Option<bool>,
    pub format: Option<RecordFormat>,
}

impl RawConfig {
    /// Read and parse a TOML file.
    ///
    /// # Errors
    /// [`ConfigError::ReadFile`] or [`ConfigError::Parse`], naming the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply defaults and check every value.
    ///
    /// # Errors
    /// The first invalid setting found, as a [`ConfigError`].
    pub fn validate(self) -> Result<AnalysisConfig, ConfigError> {
        let defaults = AnalysisConfig::default();

        let top_n = match self.top_n {
            None => defaults.top_n,
            Some(n) if n >= 1 => usize::try_from(n).map_err(|_| ConfigError::TopN(n))?,
            Some(n) => return Err(ConfigError::TopN(n)),
        };

        let suspicious_statuses = match self.suspicious_statuses {
            None => defaults.suspicious_statuses,
            Some(codes) => codes
                .into_iter()
                .map(|code| match u16::try_from(code) {
                    Ok(s) if (100..=599).contains(&s) => Ok(s),
                    _ => Err(ConfigError::StatusCode(code)),
                })
                .collect::<Result<_, _>>()?,
        };

        let suspicious_threshold = match self.suspicious_threshold {
            None => defaults.suspicious_threshold,
            Some(t) => u64::try_from(t).map_err(|_| ConfigError::Threshold(t))?,
        };

        let bucket_precision = match self.bucket_precision {
            None => defaults.bucket_precision,
            Some(p) => usize::try_from(p)
                .ok()
                .filter(|p| (1..=MAX_BUCKET_PRECISION).contains(p))
                .ok_or(ConfigError::BucketPrecision {
                    precision: p,
                    max: MAX_BUCKET_PRECISION,
                })?,
        };

        Ok(AnalysisConfig {
            top_n,
            suspicious_statuses,
            suspicious_threshold,
            bucket_precision,
            skip_header: self.skip_header.unwrap_or(defaults.skip_header),
            format: self.format.unwrap_or(defaults.format),
        })
    }
}

impl AnalysisConfig {
    /// Load and validate a TOML file.
    ///
    /// # Errors
    /// See [`RawConfig::from_file`] and [`RawConfig::validate`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        RawConfig::from_file(path)?.validate()
    }

    /// Re-check a config that was built or modified in code.
    ///
    /// # Errors
    /// The first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::TopN(0));
        }
        if !(1..=MAX_BUCKET_PRECISION).contains(&self.bucket_precision) {
            return Err(ConfigError::BucketPrecision {
                precision: i64::try_from(self.bucket_precision).unwrap_or(i64::MAX),
                max: MAX_BUCKET_PRECISION,
            });
        }
        if let Some(bad) = self
            .suspicious_statuses
            .iter()
            .find(|s| !(100..=599).contains(*s))
        {
            return Err(ConfigError::StatusCode(i64::from(*bad)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawConfig {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(raw("").validate().unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn values_override_defaults() {
        let cfg = raw(
            "top_n = 5\nsuspicious_statuses = [403]\nsuspicious_threshold = 10\n\
             bucket_precision = 13\nskip_header = false\nformat = \"quoted\"\n",
        )
        .validate()
        .unwrap();
        assert_eq!(cfg.top_n, 5);
        assert_eq!(cfg.suspicious_statuses, BTreeSet::from([403]));
        assert_eq!(cfg.suspicious_threshold, 10);
        assert_eq!(cfg.bucket_precision, 13);
        assert!(!cfg.skip_header);
        assert_eq!(cfg.format, RecordFormat::Quoted);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(raw("top_n = 0").validate(), Err(ConfigError::TopN(_))));
        assert!(matches!(
            raw("suspicious_threshold = -1").validate(),
            Err(ConfigError::Threshold(-1))
        ));
        assert!(matches!(
            raw("bucket_precision = 20").validate(),
            Err(ConfigError::BucketPrecision { precision: 20, .. })
        ));
        assert!(matches!(
            raw("bucket_precision = 0").validate(),
            Err(ConfigError::BucketPrecision { .. })
        ));
        assert!(matches!(
            raw("suspicious_statuses = [404, 99]").validate(),
            Err(ConfigError::StatusCode(99))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<RawConfig>("treshold = 3").is_err());
    }
}
