use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use logbeam::config::{AnalysisConfig, RawConfig};
use logbeam::io::glob::expand_inputs;
use logbeam::io::open_log;
use logbeam::logging::init_logging;
use logbeam::{DirectorySink, RecordFormat, analyze_files, by_status, export, write_partitioned};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "logbeam",
    version,
    about = "logbeam: batch analytics for comma-delimited access logs"
)]
struct Cli {
    /// Emit logs as JSON lines instead of text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run all six analyses and write one report file each
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Directory that receives the output_* files
        #[arg(long, short)]
        out: PathBuf,

        /// TOML file with analysis settings; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Also write the whole report as output_report.json
        #[arg(long)]
        json: bool,
    },

    /// Split records into status=<code> partition directories
    Partition {
        #[command(flatten)]
        input: InputArgs,

        /// Root directory of the partitioned table
        #[arg(long, short)]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input files or glob patterns (.gz and .zst are decompressed)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Inputs have no header line
    #[arg(long)]
    no_header: bool,

    /// Honour double-quoted fields (commas inside quotes do not split)
    #[arg(long)]
    quoted: bool,
}

#[derive(Args, Debug, Default)]
struct Overrides {
    /// Rows kept in the URL and user-agent reports
    #[arg(long)]
    top_n: Option<i64>,

    /// Failure count an IP must exceed to be reported
    #[arg(long)]
    threshold: Option<i64>,

    /// Status codes that count as failures, e.g. 404,500
    #[arg(long, value_delimiter = ',')]
    statuses: Option<Vec<i64>>,

    /// Timestamp characters per trend bucket (16 = minute, 13 = hour)
    #[arg(long)]
    precision: Option<i64>,
}

impl Overrides {
    /// Flags win over values from the config file.
    fn apply(self, mut raw: RawConfig) -> RawConfig {
        raw.top_n = self.top_n.or(raw.top_n);
        raw.suspicious_threshold = self.threshold.or(raw.suspicious_threshold);
        raw.suspicious_statuses = self.statuses.or(raw.suspicious_statuses);
        raw.bucket_precision = self.precision.or(raw.bucket_precision);
        raw
    }
}

impl InputArgs {
    fn apply(&self, raw: &mut RawConfig) {
        if self.no_header {
            raw.skip_header = Some(false);
        }
        if self.quoted {
            raw.format = Some(RecordFormat::Quoted);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli.command) {
        eprintln!("logbeam error: {e:#}");
        std::process::exit(1);
    }
}

/// Defaults, then the config file, then command-line flags.
fn analysis_config(
    file: Option<&Path>,
    input: &InputArgs,
    overrides: Overrides,
) -> Result<AnalysisConfig> {
    let mut raw = match file {
        Some(path) => RawConfig::from_file(path)?,
        None => RawConfig::default(),
    };
    input.apply(&mut raw);
    let raw = overrides.apply(raw);
    raw.validate().context("invalid analysis settings")
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Analyze {
            input,
            out,
            config,
            overrides,
            json,
        } => {
            let config = analysis_config(config.as_deref(), &input, overrides)?;

            let files = expand_inputs(&input.inputs)?;
            let report = analyze_files(&files, &config)?;
            if report.stats.malformed > 0 {
                warn!(
                    malformed = report.stats.malformed,
                    "some lines were skipped as malformed"
                );
            }
            let written = export::export_all(&out, &report)?;
            if json {
                export::export_json(out.join("output_report.json"), &report)?;
            }
            info!(reports = written.len(), out = %out.display(), "done");
            Ok(())
        }

        Command::Partition { input, out } => {
            let mut raw = RawConfig::default();
            input.apply(&mut raw);
            let config: AnalysisConfig = raw.validate()?;

            let files = expand_inputs(&input.inputs)?;
            let mut items = Vec::new();
            for path in &files {
                for item in open_log(path, config.skip_header, config.format)? {
                    match item {
                        Err(e) if e.is_fatal() => {
                            return Err(e).with_context(|| format!("read {}", path.display()));
                        }
                        item => items.push(item),
                    }
                }
            }

            let mut sink = DirectorySink::new(&out);
            let report = write_partitioned(items, by_status, &mut sink)?;
            info!(
                partitions = report.partitions.len(),
                rows = report.written,
                skipped = report.skipped.len(),
                out = %out.display(),
                "done"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::fs;

    fn inputs() -> InputArgs {
        InputArgs {
            inputs: vec!["access.csv".to_string()],
            no_header: false,
            quoted: false,
        }
    }

    #[test]
    fn flags_override_config_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("logbeam.toml");
        fs::write(
            &path,
            "top_n = 5\nsuspicious_threshold = 9\nbucket_precision = 13\nsuspicious_statuses = [403]\n",
        )?;

        let overrides = Overrides {
            top_n: Some(7),
            statuses: Some(vec![404, 500]),
            ..Overrides::default()
        };
        let config = analysis_config(Some(&path), &inputs(), overrides)?;

        assert_eq!(config.top_n, 7);
        assert_eq!(config.suspicious_statuses, BTreeSet::from([404, 500]));
        assert_eq!(config.suspicious_threshold, 9);
        assert_eq!(config.bucket_precision, 13);
        Ok(())
    }

    #[test]
    fn defaults_apply_without_file_or_flags() -> Result<()> {
        let config = analysis_config(None, &inputs(), Overrides::default())?;
        assert_eq!(config, AnalysisConfig::default());
        Ok(())
    }

    #[test]
    fn input_flags_reach_the_config() -> Result<()> {
        let input = InputArgs {
            no_header: true,
            quoted: true,
            ..inputs()
        };
        let config = analysis_config(None, &input, Overrides::default())?;
        assert!(!config.skip_header);
        assert_eq!(config.format, RecordFormat::Quoted);
        Ok(())
    }

    #[test]
    fn invalid_flag_value_is_rejected() {
        let overrides = Overrides {
            precision: Some(0),
            ..Overrides::default()
        };
        assert!(analysis_config(None, &inputs(), overrides).is_err());
    }

    #[test]
    fn parses_analyze_command_line() {
        let cli = Cli::try_parse_from([
            "logbeam", "analyze", "a.csv", "b.csv.gz", "--out", "results", "--top-n", "4",
            "--statuses", "404,500,503",
        ])
        .expect("valid command line");
        match cli.command {
            Command::Analyze {
                input, overrides, ..
            } => {
                assert_eq!(input.inputs, vec!["a.csv", "b.csv.gz"]);
                assert_eq!(overrides.top_n, Some(4));
                assert_eq!(overrides.statuses, Some(vec![404, 500, 503]));
            }
            other => panic!("expected analyze, got {other:?}"),
        }
    }

    #[test]
    fn missing_input_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("*.csv").to_string_lossy().into_owned();
        let command = Command::Partition {
            input: InputArgs {
                inputs: vec![missing],
                ..inputs()
            },
            out: dir.path().join("out"),
        };
        assert!(run(command).is_err());
        Ok(())
    }

    #[test]
    fn partition_command_keeps_going_past_bad_lines() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let log = dir.path().join("access.csv");
        fs::write(
            &log,
            "ip,timestamp,url,status,user_agent\n\
             1.1.1.1,2024-02-01 10:15:00,/home,200,A\n\
             1.1.1.2,2024-02-01 10:15:01,/home,OK,B\n\
             1.1.1.3,2024-02-01 10:15:02,/gone,404,C\n",
        )?;
        let out = dir.path().join("out");
        let command = Command::Partition {
            input: InputArgs {
                inputs: vec![log.to_string_lossy().into_owned()],
                ..inputs()
            },
            out: out.clone(),
        };

        run(command)?;
        assert!(out.join("status=200").join("part-00000.csv").is_file());
        assert!(out.join("status=404").join("part-00000.csv").is_file());
        Ok(())
    }
}
