//! CSV output formatter for duplicate scan results.
//!
//! One row is generated for each duplicate pair.
//!
//! # Columns
//!
//! - `original`: Path of the first file seen
//! - `duplicate`: Path of the later copy
//! - `size`: File size in bytes
//! - `fingerprint`: Sampled fingerprint (hexadecimal)
//!
//! # Example
//!
//! ```no_run
//! use skimdupe::duplicates::DuplicateFinder;
//! use skimdupe::output::csv::CsvOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (pairs, _) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let output = CsvOutput::new(&pairs);
//! output.write_to(std::io::stdout()).unwrap();
//! ```

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicatePair;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A single row in the CSV output.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    original: &'a str,
    duplicate: &'a str,
    size: u64,
    fingerprint: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    pairs: &'a [DuplicatePair],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(pairs: &'a [DuplicatePair]) -> Self {
        Self { pairs }
    }

    /// Write the CSV output to the given writer.
    ///
    /// The header row is always written, even with no pairs.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(["original", "duplicate", "size", "fingerprint"])?;

        for pair in self.pairs {
            let original = pair.original.path.to_string_lossy();
            let duplicate = pair.duplicate.path.to_string_lossy();
            csv_writer.serialize(CsvRow {
                original: &original,
                duplicate: &duplicate,
                size: pair.size(),
                fingerprint: pair.fingerprint_hex(),
            })?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    ///
    /// # Example
    ///
    /// ```
    /// use skimdupe::output::csv::CsvOutput;
    ///
    /// let csv = CsvOutput::new(&[]).to_string().unwrap();
    /// assert_eq!(csv, "original,duplicate,size,fingerprint\n");
    /// ```
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
