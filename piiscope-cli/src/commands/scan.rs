//! Scan command implementation

use crate::config::CliConfig;
use crate::error::CliError;
use crate::input::{resolve_patterns, FileReader};
use crate::output::{create_formatter, Finding, OutputFormat};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use piiscope_core::{AcceptAll, Input, LeafDocument, PiiDetector, PiiType};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Arguments for the scan command
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (default: the config file's, else text)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Comma-separated types to report, e.g. `emails,phones,names`
    #[arg(short, long, value_name = "TYPES", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Minimum confidence for proper nouns, in [0, 1]
    #[arg(long, value_name = "X", value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE", env = "PIISCOPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Report raw candidates with their scores instead of entities
    #[arg(long)]
    pub debug: bool,

    /// Scan files in parallel
    #[arg(short, long)]
    pub parallel: bool,

    /// Number of worker threads for --parallel (default: all cores)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(format!("{threshold} is outside [0, 1]"));
    }
    Ok(threshold)
}

impl ScanArgs {
    /// Execute the scan command
    pub fn execute(&self) -> Result<()> {
        self.init_logging();

        log::info!("Starting PII scan");
        log::debug!("Arguments: {:?}", self);

        let config = match &self.config {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };
        let format = self.resolve_format(&config)?;

        let mut detector =
            PiiDetector::with_config(config.detection.clone()).map_err(CliError::from)?;
        if let Some(threshold) = self.threshold {
            detector.set_proper_noun_threshold(threshold);
        }

        let types = self.enabled_types();
        let enabled: Option<Vec<&str>> = types
            .as_ref()
            .map(|names| names.iter().map(String::as_str).collect());

        let files = resolve_patterns(&self.input)?;
        log::info!("Scanning {} file(s)", files.len());

        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_files(files.len() as u64);

        let scanner = FileScanner {
            detector: &detector,
            enabled: enabled.as_deref(),
            debug: self.debug,
            include_context: config.output.include_context,
        };

        let per_file: Vec<Vec<Finding>> = if self.parallel && files.len() > 1 {
            let pool = self.build_pool()?;
            pool.install(|| {
                files
                    .par_iter()
                    .map(|path| scanner.scan_reporting(path, &progress))
                    .collect::<Result<Vec<_>>>()
            })?
        } else {
            files
                .iter()
                .map(|path| scanner.scan_reporting(path, &progress))
                .collect::<Result<Vec<_>>>()?
        };
        progress.finish();

        let total: usize = per_file.iter().map(Vec::len).sum();
        let mut formatter =
            create_formatter(format, self.open_output()?, config.output.pretty_json);
        for finding in per_file.iter().flatten() {
            formatter.format_finding(finding)?;
        }
        formatter.finish()?;

        log::info!("Reported {} finding(s) across {} file(s)", total, files.len());
        Ok(())
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        // A second init (e.g. from tests) is harmless
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(log_level),
        )
        .try_init();
    }

    fn resolve_format(&self, config: &CliConfig) -> Result<OutputFormat> {
        if let Some(format) = self.format {
            return Ok(format);
        }
        OutputFormat::from_name(&config.output.default_format).ok_or_else(|| {
            CliError::ConfigError(format!(
                "unknown output format `{}`",
                config.output.default_format
            ))
            .into()
        })
    }

    /// Type names to report, or `None` for every type
    fn enabled_types(&self) -> Option<Vec<String>> {
        let names: Vec<String> = self
            .types
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if names.is_empty() {
            return None;
        }

        for name in &names {
            if PiiType::from_ui_name(name).is_none() {
                log::warn!("Unknown type `{}` (see `piiscope list types`)", name);
            }
        }
        Some(names)
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool> {
        let threads = self.threads.unwrap_or_else(num_cpus::get).max(1);
        log::debug!("Scanning with {} worker threads", threads);
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to start worker threads")
    }

    fn open_output(&self) -> Result<Box<dyn Write + Send + Sync>> {
        match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output: {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
            None => Ok(Box::new(io::stdout())),
        }
    }
}

/// Per-file detection shared by the sequential and parallel paths
struct FileScanner<'a> {
    detector: &'a PiiDetector,
    enabled: Option<&'a [&'a str]>,
    debug: bool,
    include_context: bool,
}

impl FileScanner<'_> {
    fn scan_reporting(&self, path: &Path, progress: &ProgressReporter) -> Result<Vec<Finding>> {
        let findings = self.scan(path)?;
        progress.file_completed(&path.display().to_string(), findings.len());
        Ok(findings)
    }

    fn scan(&self, path: &Path) -> Result<Vec<Finding>> {
        let source = FileReader::load(path)?;
        let name = source.display_name();

        let findings: Vec<Finding> = if self.debug {
            // One leaf keeps candidate offsets equal to file offsets
            let doc = LeafDocument::new().text(name.clone(), source.text.as_str());
            self.detector
                .detect_with_debug(&doc, &AcceptAll, self.enabled)
                .iter()
                .map(|c| Finding::from_candidate(&name, c, self.include_context))
                .collect()
        } else {
            let output = self
                .detector
                .process_with_types(Input::from_text(source.text.as_str()), self.enabled)
                .map_err(CliError::from)?;
            log::debug!(
                "{}: {} candidates in {:?}",
                name,
                output.metadata.candidate_count,
                output.metadata.duration
            );

            let text = self.include_context.then_some(source.text.as_str());
            output
                .entities
                .iter()
                .map(|e| Finding::from_entity(&name, e, text))
                .collect()
        };

        log::debug!("{}: {} findings", name, findings.len());
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str) -> ScanArgs {
        ScanArgs {
            input: vec![input.to_string()],
            output: None,
            format: None,
            types: Vec::new(),
            threshold: None,
            config: None,
            debug: false,
            parallel: false,
            threads: None,
            quiet: true,
            verbose: 0,
        }
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("0.5"), Ok(0.5));
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("high").is_err());
    }

    #[test]
    fn test_enabled_types() {
        let mut scan = args("a.txt");
        assert_eq!(scan.enabled_types(), None);

        scan.types = vec!["emails".into(), " phones ".into(), "".into()];
        assert_eq!(
            scan.enabled_types(),
            Some(vec!["emails".to_string(), "phones".to_string()])
        );
    }

    #[test]
    fn test_format_falls_back_to_config() {
        let mut scan = args("a.txt");
        let mut config = CliConfig::default();
        config.output.default_format = "markdown".into();
        assert_eq!(scan.resolve_format(&config).unwrap(), OutputFormat::Markdown);

        scan.format = Some(OutputFormat::Json);
        assert_eq!(scan.resolve_format(&config).unwrap(), OutputFormat::Json);

        scan.format = None;
        config.output.default_format = "yaml".into();
        assert!(scan.resolve_format(&config).is_err());
    }

    #[test]
    fn test_scanner_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.txt");
        std::fs::write(&path, "Mail ops@example.com on 2026-01-17").unwrap();

        let detector = PiiDetector::new();
        let enabled = ["emails", "dates"];
        let scanner = FileScanner {
            detector: &detector,
            enabled: Some(&enabled),
            debug: false,
            include_context: true,
        };
        let findings = scanner.scan(&path).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].spans[0].start(), 5);
        assert!(findings[0].context.is_some());

        let debug = FileScanner { debug: true, ..scanner };
        let candidates = debug.scan(&path).unwrap();
        assert!(candidates.iter().all(|f| f.id.is_none()));
        assert!(candidates.iter().any(|f| f.pii_type == PiiType::Date));
    }
}
