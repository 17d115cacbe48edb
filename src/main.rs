//! CLI entry point for the livability rater.
//!
//! Provides subcommands for scoring a directory of area measurements,
//! printing the effective weight configuration, and validating a run.

use anyhow::Result;
use clap::{Parser, Subcommand};
use livability_rater::{
    config::ScoringConfig,
    input::load_dir,
    output::{print_json, write_data_dictionary, write_json, write_scores, write_scores_only},
    scoring::{
        engine::score_areas,
        summary::RunSummary,
        validate::{validate, validate_config},
    },
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const TOP_N: usize = 10;
const BOTTOM_N: usize = 5;

#[derive(Parser)]
#[command(name = "livability_rater")]
#[command(about = "A tool to score ZIP-code areas for livability", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every area in an input directory and export the results
    Score {
        /// Directory containing areas.csv and the per-category CSVs
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        /// CSV file for the full scored table
        #[arg(short, long, default_value = "livability_scores.csv")]
        output: PathBuf,

        /// Optional: CSV file for id, composite, tier and category scores only
        #[arg(long)]
        scores_only: Option<PathBuf>,

        /// Optional: JSON file for the run summary
        #[arg(long)]
        summary_json: Option<PathBuf>,

        /// Optional: CSV file describing every column of the full table
        #[arg(long)]
        data_dictionary: Option<PathBuf>,

        /// Scoring config JSON (falls back to LIVABILITY_CONFIG, then defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the effective scoring configuration as JSON
    Weights {
        /// Scoring config JSON (falls back to LIVABILITY_CONFIG, then defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Score an input directory and report invariant violations without exporting
    Validate {
        /// Directory containing areas.csv and the per-category CSVs
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        /// Scoring config JSON (falls back to LIVABILITY_CONFIG, then defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Exit with an error when any violation is found
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/livability_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("livability_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            input_dir,
            output,
            scores_only,
            summary_json,
            data_dictionary,
            config,
        } => {
            let config = load_config(config)?;
            let inputs = load_dir(&input_dir)?;
            let records = score_areas(&inputs, &config)?;

            let report = validate(&records, &config);
            for violation in &report.violations {
                warn!(%violation, "Validation violation");
            }

            write_scores(&output, &records)?;
            info!(path = %output.display(), rows = records.len(), "Scores written");

            if let Some(path) = scores_only {
                write_scores_only(&path, &records)?;
                info!(path = %path.display(), "Scores-only table written");
            }

            if let Some(path) = data_dictionary {
                write_data_dictionary(&path)?;
                info!(path = %path.display(), "Data dictionary written");
            }

            let summary = RunSummary::from_records(&records, TOP_N, BOTTOM_N);
            info!(
                scored = summary.scored_areas,
                partial = summary.partial_areas,
                no_data = summary.no_data_areas,
                mean = summary.composite_mean,
                stddev = summary.composite_stddev,
                "Run summary"
            );
            if let Some(path) = summary_json {
                write_json(&path, &summary)?;
                info!(path = %path.display(), "Summary written");
            }
        }
        Commands::Weights { config } => {
            let config = load_config(config)?;
            print_json(&config)?;

            let report = validate_config(&config);
            for violation in &report.violations {
                warn!(%violation, "Weight table does not sum to 1.0");
            }
        }
        Commands::Validate {
            input_dir,
            config,
            strict,
        } => {
            let config = load_config(config)?;
            let inputs = load_dir(&input_dir)?;
            let records = score_areas(&inputs, &config)?;

            let report = validate(&records, &config);
            for violation in &report.violations {
                error!(%violation, "Validation violation");
            }
            info!(
                areas = report.areas_checked,
                violations = report.violations.len(),
                "Validation complete"
            );

            if strict {
                report.into_result()?;
            }
        }
    }

    Ok(())
}

/// Loads the scoring config from `path`, then `LIVABILITY_CONFIG`, else defaults.
fn load_config(path: Option<PathBuf>) -> Result<ScoringConfig> {
    let path = path.or_else(|| std::env::var_os("LIVABILITY_CONFIG").map(PathBuf::from));

    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading scoring config");
            ScoringConfig::load(&path)
        }
        None => Ok(ScoringConfig::default()),
    }
}
