//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::{CsvRecordSource, CsvSeriesSink, DEFAULT_PREFIX};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::tracing_reporter::TracingReporter;
use crate::domain::config_validation::validate_pipeline_config;
use crate::domain::error::PipelineError;
use crate::domain::pipeline::{self, PipelineConfig, PipelineSummary};
use crate::domain::record_store::{DuplicatePolicy, RecordStore};
use crate::domain::resample::resample_instrument;
use crate::domain::validation::ValidationPolicy;
use crate::ports::config_port::ConfigPort;
use crate::ports::record_source::RecordSource;

pub const DEFAULT_INPUT: &str = "input_files/input.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output_files";

#[derive(Parser, Debug)]
#[command(
    name = "monthbar",
    about = "Resample daily OHLCV data into monthly bars with moving averages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline and write one CSV per instrument
    Run(RunArgs),
    /// Show record counts, date ranges and month counts per instrument
    Info {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Keep the last of duplicate (ticker, date) rows instead of failing
        #[arg(long)]
        last_wins: bool,
    },
    /// Validate a configuration file
    CheckConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Daily records CSV
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Directory for result_<ticker>.csv files
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Required number of monthly bars per instrument
    #[arg(long)]
    pub expected_length: Option<usize>,
    /// Write complete instruments and report the rest instead of aborting
    #[arg(long)]
    pub collect_all: bool,
    /// Keep the last of duplicate (ticker, date) rows instead of failing
    #[arg(long)]
    pub last_wins: bool,
    /// Process instruments on a thread pool
    #[arg(long)]
    pub parallel: bool,
    /// Validate everything but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// Everything a run needs, after config file and flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub prefix: String,
    pub pipeline: PipelineConfig,
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run(args) => run_command(&args),
        Command::Info {
            config,
            input,
            last_wins,
        } => run_info(config.as_deref(), input, last_wins),
        Command::CheckConfig { config } => run_check_config(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PipelineError> {
    tracing::info!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_pipeline_config(&adapter)?;
    Ok(adapter)
}

pub fn build_pipeline_config(adapter: &dyn ConfigPort) -> Result<PipelineConfig, PipelineError> {
    let defaults = PipelineConfig::default();

    let expected_length = match adapter.get_string("pipeline", "expected_length") {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| PipelineError::ConfigInvalid {
                section: "pipeline".into(),
                key: "expected_length".into(),
                reason: format!("expected a positive integer, got '{}'", raw),
            })?,
        None => defaults.expected_length,
    };

    let validation = match adapter.get_string("pipeline", "validation") {
        Some(raw) => raw
            .parse::<ValidationPolicy>()
            .map_err(|reason| PipelineError::ConfigInvalid {
                section: "pipeline".into(),
                key: "validation".into(),
                reason,
            })?,
        None => defaults.validation,
    };

    let duplicates = match adapter.get_string("pipeline", "duplicates") {
        Some(raw) => raw
            .parse::<DuplicatePolicy>()
            .map_err(|reason| PipelineError::ConfigInvalid {
                section: "pipeline".into(),
                key: "duplicates".into(),
                reason,
            })?,
        None => defaults.duplicates,
    };

    Ok(PipelineConfig {
        expected_length,
        validation,
        duplicates,
        parallel: adapter.get_bool("pipeline", "parallel", defaults.parallel),
    })
}

/// Merge config file values (if any) with command-line overrides.
pub fn resolve_settings(
    config: Option<&dyn ConfigPort>,
    args: &RunArgs,
) -> Result<RunSettings, PipelineError> {
    let mut pipeline = match config {
        Some(c) => build_pipeline_config(c)?,
        None => PipelineConfig::default(),
    };
    let lookup = |section: &str, key: &str| config.and_then(|c| c.get_string(section, key));

    if let Some(n) = args.expected_length {
        if n == 0 {
            return Err(PipelineError::ConfigInvalid {
                section: "pipeline".into(),
                key: "expected_length".into(),
                reason: "expected a positive integer, got '0'".into(),
            });
        }
        pipeline.expected_length = n;
    }
    if args.collect_all {
        pipeline.validation = ValidationPolicy::CollectAll;
    }
    if args.last_wins {
        pipeline.duplicates = DuplicatePolicy::LastWins;
    }
    if args.parallel {
        pipeline.parallel = true;
    }

    let input = args
        .input
        .clone()
        .or_else(|| lookup("input", "path").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
    let output_dir = args
        .output
        .clone()
        .or_else(|| lookup("output", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let prefix = lookup("output", "prefix").unwrap_or_else(|| DEFAULT_PREFIX.to_string());

    Ok(RunSettings {
        input,
        output_dir,
        prefix,
        pipeline,
    })
}

pub fn run_command(args: &RunArgs) -> Result<(), PipelineError> {
    let adapter = args.config.as_deref().map(load_config).transpose()?;
    let settings = resolve_settings(adapter.as_ref().map(|a| a as &dyn ConfigPort), args)?;

    tracing::info!(
        input = %settings.input.display(),
        output = %settings.output_dir.display(),
        expected_length = settings.pipeline.expected_length,
        validation = %settings.pipeline.validation,
        duplicates = %settings.pipeline.duplicates,
        parallel = settings.pipeline.parallel,
        "Starting data pipeline"
    );

    let source = CsvRecordSource::new(settings.input.clone());
    let sink = CsvSeriesSink::new(settings.output_dir.clone()).with_prefix(settings.prefix.clone());
    let reporter = TracingReporter;

    if args.dry_run {
        return run_dry(&source, &sink, &settings, &reporter);
    }

    let summary = pipeline::run_pipeline(&source, &sink, &settings.pipeline, &reporter)?;
    print_summary(&summary);
    tracing::info!("Data pipeline completed successfully");
    Ok(())
}

fn run_dry(
    source: &CsvRecordSource,
    sink: &CsvSeriesSink,
    settings: &RunSettings,
    reporter: &TracingReporter,
) -> Result<(), PipelineError> {
    tracing::info!("Reading records from {}", source.describe());
    let records = source.load_records()?;
    let outcome = pipeline::transform(records, &settings.pipeline, reporter)?;
    pipeline::check_destinations(sink, outcome.accepted.keys())?;

    for (instrument, series) in &outcome.accepted {
        println!(
            "would write {} ({} rows)",
            sink.path_for(instrument).display(),
            series.len()
        );
    }
    for (instrument, actual) in &outcome.rejected {
        println!(
            "would skip {}: {} months, expected {}",
            instrument, actual, settings.pipeline.expected_length
        );
    }
    tracing::info!("Dry run complete: nothing written");
    Ok(())
}

fn print_summary(summary: &PipelineSummary) {
    for (_, destination) in &summary.written {
        println!("{}", destination);
    }
    if !summary.rejected.is_empty() {
        tracing::warn!(
            written = summary.written.len(),
            rejected = summary.rejected.len(),
            "some instruments were not written"
        );
    }
}

fn run_info(
    config_path: Option<&Path>,
    input: Option<PathBuf>,
    last_wins: bool,
) -> Result<(), PipelineError> {
    let adapter = config_path.map(load_config).transpose()?;
    let args = RunArgs {
        input,
        last_wins,
        ..RunArgs::default()
    };
    let settings = resolve_settings(adapter.as_ref().map(|a| a as &dyn ConfigPort), &args)?;

    let source = CsvRecordSource::new(settings.input.clone());
    let store = RecordStore::load(
        source.load_records()?,
        settings.pipeline.duplicates,
        &TracingReporter,
    )?;

    if store.is_empty() {
        println!("No records found in {}", source.describe());
        return Ok(());
    }

    for line in describe_instruments(&store, settings.pipeline.expected_length)? {
        println!("{}", line);
    }
    Ok(())
}

/// One line per instrument: record count, date range, months and whether the
/// month count meets `expected_length`.
pub fn describe_instruments(
    store: &RecordStore,
    expected_length: usize,
) -> Result<Vec<String>, PipelineError> {
    let mut lines = Vec::with_capacity(store.instrument_count());
    for partition in store.partitions() {
        let (Some(first), Some(last)) = (partition.first(), partition.last()) else {
            continue;
        };
        let months = resample_instrument(partition)?.len();
        let status = if months == expected_length {
            "OK"
        } else {
            "INCOMPLETE"
        };
        lines.push(format!(
            "{}: {} records, {} to {}, {} months [{}]",
            first.instrument_id,
            partition.len(),
            first.date,
            last.date,
            months,
            status
        ));
    }
    Ok(lines)
}

fn run_check_config(config_path: &Path) -> Result<(), PipelineError> {
    let adapter = load_config(config_path)?;
    let settings = resolve_settings(Some(&adapter as &dyn ConfigPort), &RunArgs::default())?;

    println!("input:           {}", settings.input.display());
    println!("output dir:      {}", settings.output_dir.display());
    println!("output prefix:   {}", settings.prefix);
    println!("expected length: {}", settings.pipeline.expected_length);
    println!("validation:      {}", settings.pipeline.validation);
    println!("duplicates:      {}", settings.pipeline.duplicates);
    println!("parallel:        {}", settings.pipeline.parallel);
    tracing::info!("Configuration is valid");
    Ok(())
}
