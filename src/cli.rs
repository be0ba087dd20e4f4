//! Command-line interface definitions for skimdupe.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! The CLI follows standard conventions with global options (verbosity, color) and
//! subcommands for different operations.
//!
//! Scan flags left unset fall through to the layered [`Config`]; flags that
//! are given always win.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory and print duplicate pairs
//! skimdupe scan ~/Downloads
//!
//! # JSON output for scripting
//! skimdupe scan ~/Downloads --output json
//!
//! # Read every chunk instead of sampling
//! skimdupe scan ~/Downloads --skip-interval 0
//!
//! # Verbose mode for debugging
//! skimdupe -v scan ~/Downloads
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;
use crate::scanner::{FingerprintAlgorithm, SkipPolicy};

/// Fast duplicate file finder using sparse sampled fingerprints.
///
/// skimdupe groups files by size, compares a fingerprint of their first
/// chunk, and then fingerprints a sparse, spreading sample of the rest.
#[derive(Debug, Parser)]
#[command(name = "skimdupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Read configuration from this TOML file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for skimdupe.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format (text for humans, json/csv for scripting)
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// These patterns are added to any .gitignore patterns found.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Number of I/O threads for fingerprinting (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Chunk size in bytes (default: 1024)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub chunk_size: Option<u64>,

    /// Chunks read between skips; 0 reads whole files (default: 1024)
    #[arg(long, value_name = "N")]
    pub skip_interval: Option<u64>,

    /// Chunks jumped over per skip (default: 1024)
    #[arg(long, value_name = "N")]
    pub skip_size: Option<u64>,

    /// When the sampled reader skips
    #[arg(long, value_enum, value_name = "POLICY")]
    pub skip_policy: Option<SkipPolicy>,

    /// Digest used for fingerprints
    #[arg(long, value_enum, value_name = "ALGORITHM")]
    pub algorithm: Option<FingerprintAlgorithm>,

    /// Byte-by-byte verification of every reported pair
    ///
    /// Slower, but rules out sampling and digest collisions.
    #[arg(long)]
    pub verify: bool,

    /// Abort on the first unreadable file instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl ScanArgs {
    /// Apply the flags that were given on top of `config`.
    ///
    /// `--chunk-size` values beyond `usize::MAX` saturate and are then
    /// rejected by [`Config::validate`].
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(min) = self.min_size {
            config.min_size = Some(min);
        }
        if let Some(max) = self.max_size {
            config.max_size = Some(max);
        }
        config
            .ignore_patterns
            .extend(self.ignore_patterns.iter().cloned());
        if self.follow_symlinks {
            config.follow_symlinks = true;
        }
        if self.skip_hidden {
            config.skip_hidden = true;
        }
        if let Some(threads) = self.io_threads {
            config.io_threads = threads;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = usize::try_from(chunk_size).unwrap_or(usize::MAX);
        }
        if let Some(interval) = self.skip_interval {
            config.skip_interval = interval;
        }
        if let Some(size) = self.skip_size {
            config.skip_size = size;
        }
        if let Some(policy) = self.skip_policy {
            config.skip_policy = policy;
        }
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if self.verify {
            config.verify = true;
        }
        if self.strict {
            config.strict = true;
        }
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per duplicate pair
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use skimdupe::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
