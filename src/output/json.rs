//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "original": "/path/to/a.txt",
//!       "duplicate": "/path/to/b.txt",
//!       "size": 1024,
//!       "fingerprint": "aaf4c61d..."
//!     }
//!   ],
//!   "errors": [
//!     { "path": "/path/to/locked.bin", "message": "Permission denied: ..." }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "duplicate_pairs": 1,
//!     "reclaimable_space": 1024,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "SD000"
//!   }
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use skimdupe::duplicates::DuplicateFinder;
//! use skimdupe::output::json::JsonOutput;
//! use skimdupe::error::ExitCode;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (pairs, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let output = JsonOutput::new(&pairs, &summary, ExitCode::from_summary(&summary));
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicatePair, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate pair in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicatePair {
    /// Path of the first file seen
    pub original: String,
    /// Path of the later copy
    pub duplicate: String,
    /// File size in bytes
    pub size: u64,
    /// Sampled fingerprint as hexadecimal string (40 characters)
    pub fingerprint: String,
}

impl From<&DuplicatePair> for JsonDuplicatePair {
    fn from(pair: &DuplicatePair) -> Self {
        Self {
            original: pair.original.path.to_string_lossy().into_owned(),
            duplicate: pair.duplicate.path.to_string_lossy().into_owned(),
            size: pair.size(),
            fingerprint: pair.fingerprint_hex(),
        }
    }
}

/// A file skipped because of an error.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFileError {
    /// Path of the file that failed
    pub path: String,
    /// Error message
    pub message: String,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Files eliminated because their size was unique
    pub eliminated_by_size: usize,
    /// Files eliminated because their first chunk was unique
    pub eliminated_by_partial: usize,
    /// Files whose sampled fingerprint was computed
    pub files_sampled: usize,
    /// Number of duplicate pairs reported
    pub duplicate_pairs: usize,
    /// Fingerprint matches rejected by byte-by-byte verification
    pub verify_mismatches: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "SD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            eliminated_by_partial: summary.eliminated_by_partial,
            files_sampled: summary.files_sampled,
            duplicate_pairs: summary.duplicate_pairs,
            verify_mismatches: summary.verify_mismatches,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate pairs in report order
    pub duplicates: Vec<JsonDuplicatePair>,
    /// Files skipped because of errors
    pub errors: Vec<JsonFileError>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from duplicate pairs, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use skimdupe::duplicates::{DuplicatePair, ScanSummary};
    /// use skimdupe::output::json::JsonOutput;
    /// use skimdupe::error::ExitCode;
    /// use skimdupe::scanner::FileEntry;
    /// use std::path::PathBuf;
    ///
    /// let pairs = vec![DuplicatePair {
    ///     original: FileEntry::new(PathBuf::from("/file1.txt"), 1024),
    ///     duplicate: FileEntry::new(PathBuf::from("/file2.txt"), 1024),
    ///     fingerprint: [0u8; 20],
    /// }];
    ///
    /// let output = JsonOutput::new(&pairs, &ScanSummary::default(), ExitCode::Success);
    /// assert_eq!(output.duplicates.len(), 1);
    /// ```
    #[must_use]
    pub fn new(pairs: &[DuplicatePair], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: pairs.iter().map(JsonDuplicatePair::from).collect(),
            errors: summary
                .scan_errors
                .iter()
                .map(|e| JsonFileError {
                    path: e.path().to_string_lossy().into_owned(),
                    message: e.to_string(),
                })
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    ///
    /// # Example
    ///
    /// ```
    /// use skimdupe::duplicates::ScanSummary;
    /// use skimdupe::output::json::JsonOutput;
    /// use skimdupe::error::ExitCode;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default(), ExitCode::NoDuplicates);
    /// let json = output.to_json_pretty().unwrap();
    /// assert!(json.contains('\n'));
    /// ```
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
