//! skimdupe - Fast Duplicate File Finder
//!
//! Finds duplicate files without reading every byte of every file. Candidates
//! pass through three stages, each cheaper than the next one:
//!
//! 1. files are bucketed by exact size,
//! 2. each bucket is split by a fingerprint of the first chunk,
//! 3. survivors get a sampled fingerprint over a sparse, spreading subset
//!    of their remaining chunks.
//!
//! Files that agree on all three are reported as duplicate pairs.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, Commands, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application for parsed arguments.
///
/// # Errors
///
/// Returns an error for invalid configuration, an unusable root path, an
/// interrupted scan, a per-file failure under `--strict`, or a failure to
/// write the results.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan(ref args) => {
            args.apply_to(&mut config);
            config.validate().context("Invalid scan options")?;
            handle_scan(&cli, args, &config)
        }
    }
}

fn handle_scan(cli: &Cli, args: &ScanArgs, config: &Config) -> anyhow::Result<ExitCode> {
    let handler = signal::install_handler().context("Failed to install Ctrl+C handler")?;

    let mut finder_config = config
        .finder_config()
        .with_shutdown_flag(handler.get_flag());

    let show_progress = !cli.quiet && !args.no_progress && args.output == OutputFormat::Text;
    if show_progress {
        finder_config =
            finder_config.with_progress_callback(Arc::new(Progress::with_plain(false, cli.no_color)));
    }

    log::info!("Scanning {}", args.path.display());
    log::debug!(
        "Sampling: chunk_size={}, skip_interval={}, skip_size={}, policy={}, algorithm={}",
        config.chunk_size,
        config.skip_interval,
        config.skip_size,
        config.skip_policy,
        config.algorithm
    );

    let finder = DuplicateFinder::new(finder_config);
    let (pairs, summary) = finder
        .find_duplicates(&args.path)
        .with_context(|| format!("Scan of {} failed", args.path.display()))?;

    let exit_code = ExitCode::from_summary(&summary);

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    match args.output {
        OutputFormat::Text => {
            TextOutput::new(&pairs, &summary)
                .with_quiet(cli.quiet)
                .write_to(&mut stdout.lock(), &mut stderr.lock())
                .context("Failed to write results")?;
        }
        OutputFormat::Json => {
            JsonOutput::new(&pairs, &summary, exit_code)
                .write_to(&mut stdout.lock(), true)
                .context("Failed to write JSON output")?;
        }
        OutputFormat::Csv => {
            CsvOutput::new(&pairs)
                .write_to(stdout.lock())
                .context("Failed to write CSV output")?;
            let mut err = stderr.lock();
            for error in &summary.scan_errors {
                writeln!(
                    err,
                    "Error on file: {}, {}",
                    error.path().display(),
                    error.reason()
                )?;
            }
        }
    }

    log::info!(
        "Found {} duplicate pair(s) in {:.2}s",
        summary.duplicate_pairs,
        summary.scan_duration.as_secs_f64()
    );

    Ok(exit_code)
}
